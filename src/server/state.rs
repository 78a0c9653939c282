use std::sync::Arc;

use crate::ImageIndexer;
use crate::cli::server::ServerCommand;
use crate::config::SearchOptions;
use crate::server::error::AppError;

/// 应用状态
pub struct AppState {
    /// 图片索引器
    pub indexer: ImageIndexer,
    /// 搜索配置选项
    pub search: SearchOptions,
    /// 鉴权 token
    pub token: String,
}

impl AppState {
    /// 创建新的应用状态
    pub fn new(indexer: ImageIndexer, opts: ServerCommand) -> Arc<Self> {
        Arc::new(AppState { indexer, search: opts.search, token: opts.token })
    }

    /// 校验请求 token
    pub fn check_token(&self, token: &str) -> Result<(), AppError> {
        if token != self.token {
            return Err(AppError::unauthorized());
        }
        Ok(())
    }
}

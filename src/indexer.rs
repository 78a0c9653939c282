use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Result;
use log::{debug, info};
use rand::distr::{Alphanumeric, SampleString};
use serde::Serialize;
use tokio::sync::RwLock;
use utoipa::ToSchema;

use crate::config::OllamaOptions;
use crate::hnsw::CaptionIndex;
use crate::ollama::OllamaClient;
use crate::store::ImageStore;

/// 描述文档，即一张图片的一句话描述
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CaptionDocument {
    /// 文档 ID
    pub id: String,
    /// 描述文本
    pub text: String,
}

/// 进程内的索引状态，三者必须在同一把锁下保持一致
struct IndexState {
    index: CaptionIndex,
    id_to_image: HashMap<String, String>,
    id_to_document: HashMap<String, CaptionDocument>,
}

/// 图片索引器
///
/// 上传：保存图片 → 生成描述 → 计算嵌入 → 写入索引
/// 检索：文本查询直接计算嵌入，以图搜图则先生成描述再按文本查询
pub struct ImageIndexer {
    store: ImageStore,
    ollama: OllamaClient,
    ef_search: usize,
    state: RwLock<IndexState>,
}

impl ImageIndexer {
    pub fn new(images_dir: PathBuf, ollama: &OllamaOptions, ef_search: usize) -> Result<Self> {
        Ok(Self {
            store: ImageStore::new(images_dir),
            ollama: OllamaClient::new(ollama)?,
            ef_search,
            state: RwLock::new(IndexState {
                index: CaptionIndex::new(),
                id_to_image: HashMap::new(),
                id_to_document: HashMap::new(),
            }),
        })
    }

    /// 上传一张图片，返回新分配的文档 ID
    ///
    /// 模型调用在锁外进行，索引和映射表的更新在同一把写锁下完成。
    /// 文件名冲突时图片内容被覆盖，但旧的索引记录不会被清理，
    /// 它仍然指向被覆盖后的文件
    pub async fn upload_image(&self, filename: &str, data: &[u8]) -> Result<String> {
        let path = self.store.save(filename, data).await?;
        let image = tokio::fs::read(&path).await?;
        let caption = self.ollama.describe(&image).await?;
        debug!("生成描述: {} -> {}", filename, caption);
        let vector = self.ollama.embed(&caption).await?;

        let mut state = self.state.write().await;
        let id = generate_document_id(&state.id_to_document);
        state.index.add(id.clone(), &vector);
        state.id_to_image.insert(id.clone(), filename.to_string());
        state
            .id_to_document
            .insert(id.clone(), CaptionDocument { id: id.clone(), text: caption });

        info!("已索引图片: {} ({})", filename, id);
        Ok(id)
    }

    /// 按文本查询检索最相似的描述文档
    pub async fn retrieve_document_by_query(
        &self,
        query: &str,
        count: usize,
    ) -> Result<Vec<CaptionDocument>> {
        let vector = self.ollama.embed(query).await?;

        let state = self.state.read().await;
        let docs = state
            .index
            .search(&vector, count, self.ef_search)
            .into_iter()
            .filter_map(|(id, _)| state.id_to_document.get(&id).cloned())
            .collect();
        Ok(docs)
    }

    /// 以图搜图：为上传的图片生成描述，再按描述检索
    ///
    /// 对比图片与上传图片走同一条保存路径，因此也会被写入存储目录，
    /// 但不会被加入索引
    pub async fn retrieve_documents_by_image(
        &self,
        filename: &str,
        data: &[u8],
        count: usize,
    ) -> Result<Vec<CaptionDocument>> {
        let path = self.store.save(filename, data).await?;
        let image = tokio::fs::read(&path).await?;
        let caption = self.ollama.describe(&image).await?;
        debug!("对比图片描述: {}", caption);

        self.retrieve_document_by_query(&caption, count).await
    }

    /// 根据文档 ID 查询描述文档
    pub async fn get_document_by_id(&self, id: &str) -> Option<CaptionDocument> {
        self.state.read().await.id_to_document.get(id).cloned()
    }

    /// 根据文档 ID 查询图片路径
    pub async fn get_image_path_by_id(&self, id: &str) -> Option<PathBuf> {
        let state = self.state.read().await;
        state.id_to_image.get(id).map(|filename| self.store.path_for(filename))
    }

    /// 已索引的文档数量
    pub async fn total_documents(&self) -> usize {
        self.state.read().await.index.ntotal()
    }
}

/// 生成文档 ID，碰撞时重新生成
fn generate_document_id(existing: &HashMap<String, CaptionDocument>) -> String {
    loop {
        let id = Alphanumeric.sample_string(&mut rand::rng(), 16);
        if !existing.contains_key(&id) {
            return id;
        }
    }
}

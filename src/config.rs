use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::LazyLock;

use clap::{Parser, Subcommand};
use directories::ProjectDirs;

use crate::cli::*;

static DATA_DIR: LazyLock<DataDir> = LazyLock::new(|| {
    let proj_dirs = ProjectDirs::from("", "", "capsearch").expect("failed to get project dir");
    DataDir { path: proj_dirs.data_dir().to_path_buf() }
});

fn default_data_dir() -> &'static str {
    DATA_DIR.path().to_str().unwrap()
}

#[derive(Parser, Debug, Clone)]
pub struct OllamaOptions {
    /// Ollama 服务地址
    #[arg(long, value_name = "URL", default_value = "http://127.0.0.1:11434")]
    pub ollama_url: String,
    /// 生成图片描述使用的视觉模型
    #[arg(long, value_name = "MODEL", default_value = "llava:34b")]
    pub caption_model: String,
    /// 计算文本嵌入使用的模型
    #[arg(long, value_name = "MODEL", default_value = "llama3.3")]
    pub embedding_model: String,
    /// 模型请求超时时间，单位为秒
    #[arg(long, value_name = "SECS", default_value_t = 120)]
    pub ollama_timeout: u64,
}

#[derive(Parser, Debug, Clone)]
pub struct SearchOptions {
    /// 显示的结果数量
    #[arg(long, value_name = "COUNT", default_value_t = 1)]
    pub count: usize,
    /// HNSW 搜索时每次访问的节点数量
    #[arg(long, default_value = "16")]
    pub ef_search: usize,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "capsearch", version)]
pub struct Opts {
    #[command(subcommand)]
    pub subcmd: SubCommand,
    /// capsearch 数据目录，上传的图片保存于此
    #[arg(short, long, default_value = default_data_dir())]
    pub data_dir: DataDir,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SubCommand {
    /// 为目录下的图片生成描述并建立索引，然后在其中搜索
    Search(SearchCommand),
    /// 启动 HTTP 搜索服务
    Server(ServerCommand),
    /// 为单张图片生成一句话描述
    Describe(DescribeCommand),
}

#[derive(Debug, Clone)]
pub struct DataDir {
    path: PathBuf,
}

impl DataDir {
    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    /// 返回图片存储目录
    pub fn images(&self) -> PathBuf {
        self.path.join("images")
    }
}

impl FromStr for DataDir {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self { path: PathBuf::from(s) })
    }
}

use std::convert::Infallible;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use futures::StreamExt;
use indicatif::ProgressBar;
use log::info;
use regex::Regex;
use serde_json::json;
use walkdir::WalkDir;

use crate::cli::SubCommandExtend;
use crate::config::{OllamaOptions, Opts, SearchOptions};
use crate::indexer::{CaptionDocument, ImageIndexer};
use crate::utils::{pb_style, read_line};

#[derive(Parser, Debug, Clone)]
pub struct SearchCommand {
    #[command(flatten)]
    pub ollama: OllamaOptions,
    #[command(flatten)]
    pub search: SearchOptions,
    /// 图片所在目录
    pub path: PathBuf,
    /// 文本查询内容
    #[arg(short, long, value_name = "TEXT")]
    pub query: Option<String>,
    /// 以图搜图使用的对比图片
    #[arg(short, long, value_name = "FILE", conflicts_with = "query")]
    pub image: Option<PathBuf>,
    /// 扫描的文件后缀名，多个后缀用逗号分隔
    #[arg(short, long, default_value = "jpg,jpeg,png")]
    pub suffix: String,
    /// 同时进行的模型请求数量
    #[arg(short, long, default_value_t = 4)]
    pub jobs: usize,
    /// 输出格式
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    pub output_format: OutputFormat,
}

impl SubCommandExtend for SearchCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        let indexer = Arc::new(ImageIndexer::new(
            opts.data_dir.images(),
            &self.ollama,
            self.search.ef_search,
        )?);

        let re_suf = format!("(?i)^({})$", self.suffix.replace(',', "|"));
        let re_suf = Regex::new(&re_suf).expect("failed to build regex");

        info!("开始扫描目录: {}", self.path.display());
        let entries = WalkDir::new(&self.path)
            .into_iter()
            .filter_map(|entry| {
                let entry = entry.ok()?.into_path();
                let ext = entry.extension()?.to_string_lossy();
                (entry.is_file() && re_suf.is_match(&ext)).then_some(entry)
            })
            .collect::<Vec<_>>();
        info!("扫描完成，共 {} 张图片", entries.len());

        let pb = ProgressBar::new(entries.len() as u64).with_style(pb_style());
        futures::stream::iter(&entries)
            .for_each_concurrent(self.jobs, |entry| {
                let indexer = indexer.clone();
                let pb = pb.clone();
                async move {
                    let filename = entry.file_name().unwrap_or_default().to_string_lossy();
                    let result = async {
                        let data = tokio::fs::read(&entry).await?;
                        indexer.upload_image(&filename, &data).await
                    }
                    .await;
                    match result {
                        Ok(_) => pb.set_message(filename.to_string()),
                        Err(e) => pb.println(format!("[ERR] {}: {}", entry.display(), e)),
                    }
                    pb.inc(1);
                }
            })
            .await;
        pb.finish_and_clear();
        info!("索引完成，共 {} 个文档", indexer.total_documents().await);

        match (&self.query, &self.image) {
            (Some(query), _) => {
                let docs = indexer.retrieve_document_by_query(query, self.search.count).await?;
                print_result(&indexer, &docs, self).await
            }
            (None, Some(image)) => {
                let filename = image
                    .file_name()
                    .map(|s| s.to_string_lossy().to_string())
                    .context("无效的对比图片路径")?;
                let data = tokio::fs::read(image).await?;
                let docs = indexer
                    .retrieve_documents_by_image(&filename, &data, self.search.count)
                    .await?;
                print_result(&indexer, &docs, self).await
            }
            (None, None) => {
                // 交互模式，输入空行退出
                loop {
                    let query = read_line("查询> ")?;
                    if query.is_empty() {
                        return Ok(());
                    }
                    let docs =
                        indexer.retrieve_document_by_query(&query, self.search.count).await?;
                    print_result(&indexer, &docs, self).await?;
                }
            }
        }
    }
}

async fn print_result(
    indexer: &ImageIndexer,
    docs: &[CaptionDocument],
    opts: &SearchCommand,
) -> Result<()> {
    let mut result = vec![];
    for doc in docs {
        let image = match indexer.get_image_path_by_id(&doc.id).await {
            Some(path) => path.to_string_lossy().to_string(),
            None => continue,
        };
        result.push((image, doc));
    }

    match opts.output_format {
        OutputFormat::Json => {
            let result = result
                .iter()
                .map(|(image, doc)| json!({ "id": doc.id, "image": image, "caption": doc.text }))
                .collect::<Vec<_>>();
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        OutputFormat::Table => {
            for (image, doc) in &result {
                println!("{}\t{}", image, doc.text);
            }
        }
    }
    Ok(())
}

#[derive(ValueEnum, Debug, Clone)]
pub enum OutputFormat {
    Json,
    Table,
}

impl FromStr for OutputFormat {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Self::Json),
            "table" => Ok(Self::Table),
            _ => unreachable!(),
        }
    }
}

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::cli::SubCommandExtend;
use crate::config::{OllamaOptions, Opts};
use crate::ollama::OllamaClient;

#[derive(Parser, Debug, Clone)]
pub struct DescribeCommand {
    #[command(flatten)]
    pub ollama: OllamaOptions,
    /// 图片路径
    pub image: PathBuf,
}

impl SubCommandExtend for DescribeCommand {
    async fn run(&self, _opts: &Opts) -> Result<()> {
        let client = OllamaClient::new(&self.ollama)?;
        let image = tokio::fs::read(&self.image).await?;
        let caption = client.describe(&image).await?;
        println!("{}", caption);
        Ok(())
    }
}

use std::time::Duration;

use anyhow::{Context, Result};
use base64::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::OllamaOptions;

/// 图片描述的固定指令，temperature 为 0 以保证相同图片的描述可复现
const CAPTION_PROMPT: &str =
    "Tell me what you see in this picture in only one sentence. Be concise.";

/// Ollama API 客户端
#[derive(Clone)]
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    caption_model: String,
    embedding_model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    options: ModelOptions,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
    images: Vec<String>,
}

#[derive(Serialize)]
struct ModelOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

impl OllamaClient {
    pub fn new(opts: &OllamaOptions) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(opts.ollama_timeout))
            .build()
            .context("构建 HTTP 客户端失败")?;
        Ok(Self {
            client,
            base_url: opts.ollama_url.trim_end_matches('/').to_string(),
            caption_model: opts.caption_model.clone(),
            embedding_model: opts.embedding_model.clone(),
        })
    }

    /// 为图片生成一句话描述
    pub async fn describe(&self, image: &[u8]) -> Result<String> {
        let request = ChatRequest {
            model: &self.caption_model,
            messages: vec![ChatMessage {
                role: "user",
                content: CAPTION_PROMPT,
                images: vec![BASE64_STANDARD.encode(image)],
            }],
            options: ModelOptions { temperature: 0. },
            stream: false,
        };

        let response =
            self.client.post(format!("{}/api/chat", self.base_url)).json(&request).send().await?;
        if !response.status().is_success() {
            anyhow::bail!("Ollama 返回错误: {}", response.status());
        }

        let response = response.json::<ChatResponse>().await?;
        Ok(response.message.content.trim().to_string())
    }

    /// 计算文本的嵌入向量
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let request = EmbedRequest { model: &self.embedding_model, input: vec![text] };

        let response =
            self.client.post(format!("{}/api/embed", self.base_url)).json(&request).send().await?;
        if !response.status().is_success() {
            anyhow::bail!("Ollama 返回错误: {}", response.status());
        }

        let mut response = response.json::<EmbedResponse>().await?;
        response.embeddings.pop().context("嵌入响应为空")
    }
}

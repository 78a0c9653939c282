#![allow(dead_code)]

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use axum::routing::post;
use axum::{Json, Router};
use base64::prelude::*;
use capsearch::config::OllamaOptions;
use serde_json::{Value, json};

/// 词袋嵌入：共享词汇的文本向量相近，维度固定为 64
pub fn embed_text(text: &str) -> Vec<f32> {
    let mut vector = vec![0f32; 64];
    for token in text.to_lowercase().split_whitespace() {
        let mut hasher = DefaultHasher::new();
        token.hash(&mut hasher);
        vector[(hasher.finish() % 64) as usize] += 1.;
    }
    vector
}

async fn chat(Json(body): Json<Value>) -> Json<Value> {
    let image = body["messages"][0]["images"][0].as_str().unwrap();
    let caption = String::from_utf8(BASE64_STANDARD.decode(image).unwrap()).unwrap();
    Json(json!({"message": {"role": "assistant", "content": caption}}))
}

async fn embed(Json(body): Json<Value>) -> Json<Value> {
    let input = body["input"][0].as_str().unwrap();
    Json(json!({"embeddings": [embed_text(input)]}))
}

/// 启动模拟 Ollama 服务，图片描述即图片字节本身，返回服务地址
pub async fn spawn_mock_ollama() -> String {
    let app = Router::new().route("/api/chat", post(chat)).route("/api/embed", post(embed));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

pub fn mock_ollama_options(url: &str) -> OllamaOptions {
    OllamaOptions {
        ollama_url: url.to_string(),
        caption_model: "llava:34b".to_string(),
        embedding_model: "llama3.3".to_string(),
        ollama_timeout: 10,
    }
}

pub mod cli;
pub mod config;
pub mod hnsw;
pub mod indexer;
mod metrics;
pub mod ollama;
mod server;
pub mod store;
pub mod utils;

pub use config::Opts;
pub use indexer::{CaptionDocument, ImageIndexer};

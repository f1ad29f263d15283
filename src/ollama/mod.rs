// file: src/ollama/mod.rs
// description: Ollama HTTP API integration for generation and embeddings

pub mod client;
pub mod embeddings;
pub mod prompt;

pub use client::{GenerationResult, OllamaClient};
pub use embeddings::OllamaEmbeddingClient;
pub use prompt::build_rag_prompt;

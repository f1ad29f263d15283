// file: src/ollama/embeddings.rs
// description: Ollama embed API client with deterministic fallback
// reference: https://github.com/ollama/ollama/blob/main/docs/api.md

use crate::config::OllamaConfig;
use crate::error::{ChatError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Serialize)]
struct EmbedRequest {
    model: String,
    input: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

pub struct OllamaEmbeddingClient {
    client: Client,
    base_url: String,
    model: String,
    dim: usize,
}

impl OllamaEmbeddingClient {
    pub fn new(config: &OllamaConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: config.base_url.clone(),
            model: config.embedding_model.clone(),
            dim: config.embedding_dim,
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dim
    }

    pub fn model_name(&self) -> &str {
        &self.model
    }

    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| ChatError::Embedding("Empty response from Ollama".to_string()))
    }

    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/api/embed", self.base_url);
        let request = EmbedRequest {
            model: self.model.clone(),
            input: texts.to_vec(),
        };

        debug!(
            "Requesting {} embeddings from model {}",
            texts.len(),
            self.model
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ChatError::Embedding(format!("Failed to reach Ollama: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Embedding(format!(
                "Ollama embed failed with status {}: {}",
                status, body
            )));
        }

        let result: EmbedResponse = response
            .json()
            .await
            .map_err(|e| ChatError::Embedding(format!("Failed to parse embed response: {}", e)))?;

        if result.embeddings.len() != texts.len() {
            return Err(ChatError::Embedding(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                result.embeddings.len()
            )));
        }

        Ok(result.embeddings)
    }

    /// Embed one text, falling back to a deterministic vector when the API is
    /// unavailable or returns the wrong dimension.
    pub async fn embed_or_fallback(&self, text: &str) -> Vec<f32> {
        match self.embed(text).await {
            Ok(embedding) => {
                if embedding.len() != self.dim {
                    warn!(
                        "Ollama returned embedding with dimension {}, expected {}. Using fallback.",
                        embedding.len(),
                        self.dim
                    );
                    Self::generate_fallback_embedding(text, self.dim)
                } else {
                    embedding
                }
            }
            Err(e) => {
                warn!("Ollama embedding failed: {}. Using fallback.", e);
                Self::generate_fallback_embedding(text, self.dim)
            }
        }
    }

    /// Embed a batch, applying the same per-text fallback rules.
    pub async fn embed_batch_or_fallback(&self, texts: &[String]) -> Vec<Vec<f32>> {
        match self.embed_batch(texts).await {
            Ok(embeddings) => embeddings
                .into_iter()
                .zip(texts.iter())
                .map(|(embedding, text)| {
                    if embedding.len() == self.dim {
                        embedding
                    } else {
                        warn!(
                            "Embedding dimension mismatch ({} != {}), using fallback",
                            embedding.len(),
                            self.dim
                        );
                        Self::generate_fallback_embedding(text, self.dim)
                    }
                })
                .collect(),
            Err(e) => {
                warn!("Batch embedding failed: {}. Using fallback.", e);
                texts
                    .iter()
                    .map(|text| Self::generate_fallback_embedding(text, self.dim))
                    .collect()
            }
        }
    }

    /// Generate a fallback embedding when the API is unavailable
    pub fn generate_fallback_embedding(text: &str, dim: usize) -> Vec<f32> {
        // Simple deterministic embedding based on text hash
        let hash = text.bytes().fold(0u64, |acc, b| acc.wrapping_add(b as u64));
        (0..dim)
            .map(|i| (hash.wrapping_add(i as u64) % 1000) as f32 / 1000.0)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: String, dim: usize) -> OllamaEmbeddingClient {
        let mut config = Config::default_config().ollama;
        config.base_url = base_url;
        config.embedding_dim = dim;
        OllamaEmbeddingClient::new(&config)
    }

    #[test]
    fn test_fallback_embedding() {
        let embedding = OllamaEmbeddingClient::generate_fallback_embedding("test text", 384);
        assert_eq!(embedding.len(), 384);
        assert!(embedding.iter().all(|&x| (0.0..=1.0).contains(&x)));
    }

    #[test]
    fn test_fallback_embedding_deterministic() {
        let emb1 = OllamaEmbeddingClient::generate_fallback_embedding("same text", 128);
        let emb2 = OllamaEmbeddingClient::generate_fallback_embedding("same text", 128);
        assert_eq!(emb1, emb2);
    }

    #[tokio::test]
    async fn test_embed_batch_success() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/embed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "model": "nomic-embed-text",
                "embeddings": [[0.1, 0.2, 0.3], [0.4, 0.5, 0.6]]
            })))
            .mount(&server)
            .await;

        let client = test_client(server.uri(), 3);
        let embeddings = client
            .embed_batch(&["a".to_string(), "b".to_string()])
            .await
            .unwrap();

        assert_eq!(embeddings.len(), 2);
        assert_eq!(embeddings[0], vec![0.1, 0.2, 0.3]);
    }

    #[tokio::test]
    async fn test_embed_count_mismatch_is_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/embed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "embeddings": [[0.1, 0.2, 0.3]]
            })))
            .mount(&server)
            .await;

        let client = test_client(server.uri(), 3);
        let err = client
            .embed_batch(&["a".to_string(), "b".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Embedding(_)));
    }

    #[tokio::test]
    async fn test_dimension_mismatch_uses_fallback() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/embed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "embeddings": [[0.1, 0.2]]
            })))
            .mount(&server)
            .await;

        // Expecting dim 4, server returns dim 2
        let client = test_client(server.uri(), 4);
        let embedding = client.embed_or_fallback("text").await;

        assert_eq!(embedding.len(), 4);
        assert_eq!(
            embedding,
            OllamaEmbeddingClient::generate_fallback_embedding("text", 4)
        );
    }

    #[tokio::test]
    async fn test_unreachable_server_uses_fallback() {
        let client = test_client("http://127.0.0.1:1".to_string(), 8);
        let embedding = client.embed_or_fallback("offline").await;
        assert_eq!(
            embedding,
            OllamaEmbeddingClient::generate_fallback_embedding("offline", 8)
        );
    }
}

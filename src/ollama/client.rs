// file: src/ollama/client.rs
// description: Ollama generation API client with model availability checks
// reference: https://github.com/ollama/ollama/blob/main/docs/api.md

use crate::config::OllamaConfig;
use crate::error::{ChatError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

#[derive(Debug, Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
    top_p: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

/// A completed generation with timing.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub text: String,
    pub model: String,
    pub generation_time_ms: u64,
}

pub struct OllamaClient {
    client: Client,
    config: OllamaConfig,
}

impl OllamaClient {
    pub fn new(config: OllamaConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .unwrap_or_default();

        Self { client, config }
    }

    pub fn model(&self) -> &str {
        &self.config.chat_model
    }

    /// Generate a completion for a prompt, non-streaming.
    pub async fn generate(&self, prompt: &str) -> Result<GenerationResult> {
        let url = format!("{}/api/generate", self.config.base_url);
        let start = Instant::now();

        let request = GenerateRequest {
            model: self.config.chat_model.clone(),
            prompt: prompt.to_string(),
            stream: false,
            options: GenerateOptions {
                temperature: self.config.temperature,
                top_p: self.config.top_p,
                num_predict: self.config.max_tokens,
            },
        };

        debug!(
            "Requesting generation from {} ({} prompt chars)",
            self.config.chat_model,
            prompt.len()
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ChatError::Generation(format!("Failed to reach Ollama: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ChatError::Generation(format!(
                "Ollama generate failed with status {}: {}",
                status, error_text
            )));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ChatError::Generation(format!("Failed to parse response: {}", e)))?;

        let generation_time_ms = start.elapsed().as_millis() as u64;
        debug!("Generation complete in {}ms", generation_time_ms);

        Ok(GenerationResult {
            text: body.response,
            model: self.config.chat_model.clone(),
            generation_time_ms,
        })
    }

    /// List model names currently served by Ollama.
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/api/tags", self.config.base_url);

        let response = self
            .client
            .get(&url)
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .map_err(|e| ChatError::Generation(format!("Failed to reach Ollama: {}", e)))?;

        if !response.status().is_success() {
            return Err(ChatError::Generation(format!(
                "Ollama tags request failed with status {}",
                response.status()
            )));
        }

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| ChatError::Generation(format!("Failed to parse tags response: {}", e)))?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// Check that Ollama is reachable and the configured chat model is served.
    /// Returns false (with a warning) when the model is missing; errors only
    /// when the server itself is unreachable.
    pub async fn check_model_available(&self) -> Result<bool> {
        let models = self.list_models().await?;

        // Tags are reported as "name:tag"; match on the bare name too
        let available = models.iter().any(|name| {
            name == &self.config.chat_model
                || name
                    .split(':')
                    .next()
                    .is_some_and(|base| base == self.config.chat_model)
        });

        if available {
            info!(
                "Ollama connected. Model {} is available",
                self.config.chat_model
            );
        } else {
            warn!(
                "Model {} not found. Available models: {:?}",
                self.config.chat_model, models
            );
        }

        Ok(available)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: String) -> OllamaConfig {
        let mut config = Config::default_config().ollama;
        config.base_url = base_url;
        config
    }

    #[tokio::test]
    async fn test_generate_success() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(serde_json::json!({
                "model": "mistral",
                "stream": false
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "model": "mistral",
                "response": "The answer is 42.",
                "done": true
            })))
            .mount(&server)
            .await;

        let client = OllamaClient::new(test_config(server.uri()));
        let result = client.generate("What is the answer?").await.unwrap();

        assert_eq!(result.text, "The answer is 42.");
        assert_eq!(result.model, "mistral");
    }

    #[tokio::test]
    async fn test_generate_server_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(500).set_body_string("model load failed"))
            .mount(&server)
            .await;

        let client = OllamaClient::new(test_config(server.uri()));
        let err = client.generate("q").await.unwrap_err();

        assert!(matches!(err, ChatError::Generation(_)));
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_model_available_with_tag_suffix() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "models": [
                    {"name": "mistral:latest"},
                    {"name": "nomic-embed-text:latest"}
                ]
            })))
            .mount(&server)
            .await;

        let client = OllamaClient::new(test_config(server.uri()));
        assert!(client.check_model_available().await.unwrap());
    }

    #[tokio::test]
    async fn test_model_missing() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "models": [{"name": "llama3:latest"}]
            })))
            .mount(&server)
            .await;

        let client = OllamaClient::new(test_config(server.uri()));
        assert!(!client.check_model_available().await.unwrap());
    }

    #[tokio::test]
    async fn test_unreachable_server_is_error() {
        let client = OllamaClient::new(test_config("http://127.0.0.1:1".to_string()));

        // Transport failures surface as Generation errors, not panics
        let err = client.list_models().await.unwrap_err();
        assert!(matches!(err, ChatError::Generation(_)));

        let err = client.generate("q").await.unwrap_err();
        assert!(matches!(err, ChatError::Generation(_)));
    }
}

//! Ollama backend client (`/api/generate`).

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use anyhow::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{BackendError, BackendMetadata, LlmBackend};
use crate::config::Config;

const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Ollama generate request body.
#[derive(Serialize, Debug)]
struct GenerateRequest {
    model: String,
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    stream: bool,
    options: GenerateOptions,
}

/// Inference options forwarded from the configuration.
#[derive(Serialize, Debug, Clone, Copy)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
    num_ctx: u32,
    num_gpu: i32,
    num_batch: u32,
    num_thread: u32,
}

/// Ollama generate response body.
#[derive(Deserialize, Debug)]
struct GenerateResponse {
    response: String,
}

/// Client for a local or remote Ollama server.
pub struct OllamaBackend {
    client: Client,
    base_url: String,
    model: String,
    options: GenerateOptions,
}

impl OllamaBackend {
    /// Creates a client from the merged configuration. `base_url` must
    /// already be normalized (no trailing slash).
    pub fn new(base_url: String, config: &Config) -> Self {
        Self {
            client: Client::new(),
            base_url,
            model: config.model.clone(),
            options: GenerateOptions {
                temperature: config.temperature,
                num_predict: config.max_tokens,
                num_ctx: config.context_length,
                num_gpu: config.gpu_layers,
                num_batch: config.batch_size,
                num_thread: config.threads,
            },
        }
    }

    fn generate_url(&self) -> String {
        format!("{}/api/generate", self.base_url)
    }

    fn health_url(&self) -> String {
        format!("{}/api/tags", self.base_url)
    }
}

impl LlmBackend for OllamaBackend {
    fn send_request<'a>(
        &'a self,
        system_prompt: &'a str,
        user_prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(async move {
            let request = GenerateRequest {
                model: self.model.clone(),
                prompt: user_prompt.to_string(),
                system: (!system_prompt.is_empty()).then(|| system_prompt.to_string()),
                stream: false,
                options: self.options,
            };

            let url = self.generate_url();
            info!(url = %url, model = %self.model, "Sending request to Ollama");
            debug!(
                prompt_len = user_prompt.len(),
                system_len = system_prompt.len(),
                temperature = self.options.temperature,
                "Built Ollama request payload"
            );

            let response = self
                .client
                .post(&url)
                .json(&request)
                .send()
                .await
                .map_err(|e| BackendError::Unreachable {
                    url: self.base_url.clone(),
                    reason: e.to_string(),
                })?;

            if !response.status().is_success() {
                let status = response.status().as_u16();
                let body = response.text().await.unwrap_or_default();
                return Err(BackendError::RequestFailed { status, body }.into());
            }

            let generate_response: GenerateResponse = response
                .json()
                .await
                .map_err(|e| BackendError::MalformedResponse(e.to_string()))?;

            debug!(
                response_len = generate_response.response.len(),
                "Received Ollama response"
            );

            Ok(generate_response.response)
        })
    }

    fn check_health<'a>(&'a self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            let url = self.health_url();
            debug!(url = %url, "Probing Ollama health endpoint");

            let response = self
                .client
                .get(&url)
                .timeout(HEALTH_TIMEOUT)
                .send()
                .await
                .map_err(|e| BackendError::Unreachable {
                    url: self.base_url.clone(),
                    reason: e.to_string(),
                })?;

            if !response.status().is_success() {
                let status = response.status().as_u16();
                let body = response.text().await.unwrap_or_default();
                return Err(BackendError::RequestFailed { status, body }.into());
            }

            Ok(())
        })
    }

    fn metadata(&self) -> BackendMetadata {
        BackendMetadata {
            provider: "Ollama".to_string(),
            model: self.model.clone(),
        }
    }
}

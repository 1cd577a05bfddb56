//! OpenAI-compatible backend client (`/v1/chat/completions`).
//!
//! Works against OpenAI itself as well as llama.cpp's server, vLLM, and
//! anything else speaking the chat completions protocol.

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

#[derive(Serialize, Debug)]
struct Message {
    role: String,
    content: String,
}

#[derive(Serialize, Debug)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

#[derive(Deserialize, Debug)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize, Debug)]
struct ResponseMessage {
    content: String,
}

#[derive(Deserialize, Debug)]
struct ChatResponse {
    choices: Vec<Choice>,
}

/// Client for an OpenAI-compatible chat completions server.
pub struct OpenAiBackend {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl OpenAiBackend {
    /// Creates a client from the merged configuration. `base_url` must
    /// already be normalized (no trailing slash). The API key is optional:
    /// local servers typically accept unauthenticated requests.
    pub fn new(base_url: String, api_key: Option<String>, config: &Config) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    fn chat_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    fn health_url(&self) -> String {
        format!("{}/v1/models", self.base_url)
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => builder.header("Authorization", format!("Bearer {key}")),
            None => builder,
        }
    }
}

impl LlmBackend for OpenAiBackend {
    fn send_request<'a>(
        &'a self,
        system_prompt: &'a str,
        user_prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(async move {
            let mut messages = Vec::new();
            if !system_prompt.is_empty() {
                messages.push(Message {
                    role: "system".to_string(),
                    content: system_prompt.to_string(),
                });
            }
            messages.push(Message {
                role: "user".to_string(),
                content: user_prompt.to_string(),
            });

            let request = ChatRequest {
                model: self.model.clone(),
                messages,
                max_tokens: self.max_tokens,
                temperature: self.temperature,
                stream: false,
            };

            let url = self.chat_url();
            info!(url = %url, model = %self.model, "Sending request to OpenAI-compatible API");
            debug!(
                message_count = request.messages.len(),
                max_tokens = request.max_tokens,
                temperature = request.temperature,
                "Built chat completions payload"
            );

            let response = self
                .authorize(self.client.post(&url))
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

            let chat_response: ChatResponse = response
                .json()
                .await
                .map_err(|e| BackendError::MalformedResponse(e.to_string()))?;

            chat_response
                .choices
                .into_iter()
                .next()
                .map(|choice| choice.message.content)
                .ok_or_else(|| {
                    BackendError::MalformedResponse("no choices in response".to_string()).into()
                })
        })
    }

    fn check_health<'a>(&'a self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            let url = self.health_url();
            debug!(url = %url, "Probing OpenAI-compatible health endpoint");

            let response = self
                .authorize(self.client.get(&url))
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
            provider: "OpenAI-compatible".to_string(),
            model: self.model.clone(),
        }
    }
}

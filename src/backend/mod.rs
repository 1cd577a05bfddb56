//! LLM backend clients.
//!
//! Defines the [`LlmBackend`] trait plus the concrete clients for Ollama and
//! OpenAI-compatible servers. The generate command talks to backends only
//! through the trait, which keeps the message pipeline testable with a mock.

pub mod ollama;
pub mod openai;
#[cfg(test)]
pub(crate) mod test_utils;

pub use ollama::OllamaBackend;
pub use openai::OpenAiBackend;

use std::future::Future;
use std::pin::Pin;

use anyhow::Result;
use thiserror::Error;
use url::Url;

use crate::config::{BackendKind, Config};

/// Backend-specific errors.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The backend could not be reached at all.
    #[error("backend unreachable at {url}: {reason}")]
    Unreachable {
        /// Base URL that was probed.
        url: String,
        /// Transport-level failure description.
        reason: String,
    },

    /// The backend answered with a non-success HTTP status.
    #[error("backend request failed: HTTP {status}: {body}")]
    RequestFailed {
        /// HTTP status code.
        status: u16,
        /// Response body, if any.
        body: String,
    },

    /// The backend answered, but not in the expected shape.
    #[error("malformed backend response: {0}")]
    MalformedResponse(String),

    /// The configured base URL does not parse.
    #[error("invalid backend URL '{0}': {1}")]
    InvalidUrl(String, String),
}

/// Metadata about a backend client.
#[derive(Clone, Debug)]
pub struct BackendMetadata {
    /// Human-readable provider label.
    pub provider: String,
    /// Model identifier requested from the backend.
    pub model: String,
}

/// Trait for LLM backend clients.
pub trait LlmBackend: Send + Sync {
    /// Sends a prompt pair to the backend and returns the generated text.
    fn send_request<'a>(
        &'a self,
        system_prompt: &'a str,
        user_prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;

    /// Probes the backend's health endpoint. Used by doctor.
    fn check_health<'a>(&'a self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

    /// Returns metadata about the client.
    fn metadata(&self) -> BackendMetadata;
}

/// Creates the backend client selected by the configuration.
pub fn create_backend(config: &Config) -> Result<Box<dyn LlmBackend>> {
    let base_url = normalize_base_url(&config.backend_url)?;

    match config.backend {
        BackendKind::Ollama => Ok(Box::new(OllamaBackend::new(base_url, config))),
        BackendKind::OpenAi => {
            let api_key = config
                .api_key
                .clone()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok());
            Ok(Box::new(OpenAiBackend::new(base_url, api_key, config)))
        }
    }
}

/// Validates the configured base URL and strips any trailing slash.
pub(crate) fn normalize_base_url(raw: &str) -> Result<String, BackendError> {
    let parsed = Url::parse(raw)
        .map_err(|e| BackendError::InvalidUrl(raw.to_string(), e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(BackendError::InvalidUrl(
            raw.to_string(),
            format!("unsupported scheme '{}'", parsed.scheme()),
        ));
    }

    let mut base = raw.to_string();
    while base.ends_with('/') {
        base.pop();
    }
    Ok(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_trailing_slash() {
        assert_eq!(
            normalize_base_url("http://localhost:11434/").unwrap(),
            "http://localhost:11434"
        );
    }

    #[test]
    fn normalize_accepts_https() {
        assert_eq!(
            normalize_base_url("https://api.example.com").unwrap(),
            "https://api.example.com"
        );
    }

    #[test]
    fn normalize_rejects_garbage() {
        assert!(normalize_base_url("not a url").is_err());
    }

    #[test]
    fn normalize_rejects_non_http_scheme() {
        assert!(normalize_base_url("ftp://example.com").is_err());
    }

    #[test]
    fn factory_selects_backend_kind() {
        let config = Config::default();
        let backend = create_backend(&config).unwrap();
        assert_eq!(backend.metadata().provider, "Ollama");

        let config = Config {
            backend: crate::config::BackendKind::OpenAi,
            backend_url: "http://localhost:8080".to_string(),
            ..Config::default()
        };
        let backend = create_backend(&config).unwrap();
        assert_eq!(backend.metadata().provider, "OpenAI-compatible");
    }
}

//! Shared test utilities for backend consumers.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use anyhow::Result;

use super::{BackendMetadata, LlmBackend};

/// Mock backend with a pre-programmed queue of responses.
///
/// Responses are returned in FIFO order; once the queue is exhausted,
/// further calls fail. Every call records the `(system, user)` prompt pair
/// so tests can inspect what was dispatched.
pub(crate) struct MockBackend {
    responses: Arc<Mutex<VecDeque<Result<String>>>>,
    recorded_prompts: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockBackend {
    /// Creates a mock that returns the given responses in order.
    pub(crate) fn new(responses: Vec<Result<String>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::from(responses))),
            recorded_prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns a handle for inspecting recorded prompts after the mock has
    /// been moved behind a `Box<dyn LlmBackend>`.
    pub(crate) fn prompt_handle(&self) -> Arc<Mutex<Vec<(String, String)>>> {
        self.recorded_prompts.clone()
    }
}

impl LlmBackend for MockBackend {
    fn send_request<'a>(
        &'a self,
        system_prompt: &'a str,
        user_prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(async move {
            self.recorded_prompts
                .lock()
                .unwrap()
                .push((system_prompt.to_string(), user_prompt.to_string()));
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(anyhow::anyhow!("no more mock responses")))
        })
    }

    fn check_health<'a>(&'a self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move { Ok(()) })
    }

    fn metadata(&self) -> BackendMetadata {
        BackendMetadata {
            provider: "Mock".to_string(),
            model: "mock-model".to_string(),
        }
    }
}

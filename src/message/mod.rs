//! The message pipeline: prompt composition, backend invocation, and
//! response parsing.

pub mod fallback;
pub mod parser;
pub mod prompts;
pub mod splitter;

use std::fmt;

use anyhow::Result;
use tracing::{debug, warn};

use crate::backend::LlmBackend;
use crate::config::Config;
use crate::git::DiffSummary;

/// A structured conventional commit message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitMessage {
    /// Conventional commit type (feat, fix, docs, ...).
    pub commit_type: String,
    /// Optional scope.
    pub scope: Option<String>,
    /// Subject line.
    pub subject: String,
    /// Optional body, blank-line separated from the subject.
    pub body: Option<String>,
}

impl fmt::Display for CommitMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            Some(scope) => write!(f, "{}({}): {}", self.commit_type, scope, self.subject)?,
            None => write!(f, "{}: {}", self.commit_type, self.subject)?,
        }
        if let Some(body) = &self.body {
            write!(f, "\n\n{body}")?;
        }
        Ok(())
    }
}

/// Runs the pipeline once for a whole diff summary: build the prompt, call
/// the backend, and parse the response.
///
/// A response that doesn't match the conventional commit grammar is a
/// warning, not an error: the raw text becomes a `chore` subject. An empty
/// response falls back to a deterministic message built from the file list.
pub async fn generate_message(
    backend: &dyn LlmBackend,
    config: &Config,
    summary: &DiffSummary,
) -> Result<CommitMessage> {
    let description = prompts::change_description(summary);
    generate_from_description(backend, config, &description, &summary.file_paths()).await
}

/// Runs the pipeline once for a single logical unit, describing the unit by
/// its name, explanation, and file list instead of diff content.
pub async fn generate_for_unit(
    backend: &dyn LlmBackend,
    config: &Config,
    unit: &splitter::LogicalUnit,
) -> Result<CommitMessage> {
    let description = format!(
        "# {}\n\n{}\n\nFiles changed: {}",
        unit.name,
        unit.explanation,
        unit.files.join(", ")
    );
    let files: Vec<&str> = unit.files.iter().map(String::as_str).collect();
    generate_from_description(backend, config, &description, &files).await
}

async fn generate_from_description(
    backend: &dyn LlmBackend,
    config: &Config,
    description: &str,
    files: &[&str],
) -> Result<CommitMessage> {
    let user_prompt =
        prompts::commit_message_prompt(description, &config.commit_types, &config.commit_scopes);

    debug!(
        files = files.len(),
        prompt_len = user_prompt.len(),
        "Dispatching commit message request"
    );

    let raw = backend.send_request(prompts::SYSTEM_PROMPT, &user_prompt).await?;
    let cleaned = parser::clean_response(&raw);

    if cleaned.is_empty() {
        warn!("backend returned an empty message, using file-based fallback");
        return Ok(fallback::from_files(files));
    }

    match parser::parse(&cleaned, &config.commit_types) {
        Some(message) => Ok(message),
        None => {
            warn!(response = %cleaned, "response does not match conventional commit format");
            Ok(parser::chore_fallback(&cleaned))
        }
    }
}

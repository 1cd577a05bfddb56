//! Splits a diff into logical units of related files, each destined for its
//! own commit.
//!
//! The backend is asked for a JSON array of units. Model output is messy, so
//! parsing is forgiving: the array is located inside surrounding prose,
//! trailing commas are repaired, and near-identical units are deduplicated.
//! Anything unsalvageable yields an empty list, which callers treat as "make
//! one commit for everything".

use std::collections::HashSet;

use anyhow::Result;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::backend::LlmBackend;
use crate::message::prompts;

/// Two explanations sharing at least this fraction of words are duplicates.
const EXPLANATION_SIMILARITY: f64 = 0.7;

/// A group of files that belong in one commit.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LogicalUnit {
    /// Short descriptive name for the group.
    pub name: String,
    /// Paths involved, relative to the repository root.
    pub files: Vec<String>,
    /// One or two sentences on what the change accomplishes.
    pub explanation: String,
    /// Whether the model thinks this deserves its own commit.
    #[serde(default)]
    pub should_split: bool,
}

/// Asks the backend for a free-text analysis of the diff.
pub async fn analyze_diff(backend: &dyn LlmBackend, diff: &str) -> Result<String> {
    let user_prompt = prompts::diff_analysis_prompt(diff);
    let analysis = backend
        .send_request(prompts::ANALYSIS_SYSTEM_PROMPT, &user_prompt)
        .await?;
    Ok(analysis.trim().to_string())
}

/// Asks the backend to group the diff into logical units, feeding it the
/// prior analysis for context. Returns an empty list when the response
/// contains no usable JSON.
pub async fn split_changes(
    backend: &dyn LlmBackend,
    diff: &str,
    analysis: &str,
) -> Result<Vec<LogicalUnit>> {
    let user_prompt = prompts::change_splitting_prompt(diff, analysis);
    let raw = backend
        .send_request(prompts::SPLITTING_SYSTEM_PROMPT, &user_prompt)
        .await?;

    let units = parse_units(&raw);
    debug!(units = units.len(), "Parsed logical units");
    Ok(units)
}

/// Parses the model response into logical units. Unparseable responses
/// produce an empty list rather than an error.
fn parse_units(raw: &str) -> Vec<LogicalUnit> {
    let Some(json) = extract_json_array(raw) else {
        warn!("no JSON array found in split response");
        return Vec::new();
    };

    // Trailing commas are a common model slip.
    let repaired = json.replace(",]", "]").replace(",}", "}");

    match serde_json::from_str::<Vec<LogicalUnit>>(&repaired) {
        Ok(units) => dedup_units(units),
        Err(err) => {
            warn!(error = %err, "split response is not a valid unit array");
            Vec::new()
        }
    }
}

/// Extracts the outermost `[...]` from the text, honoring nesting.
fn extract_json_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let mut depth = 0usize;
    for (offset, ch) in text[start..].char_indices() {
        match ch {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Drops units that repeat an earlier unit's file set with a near-identical
/// explanation.
fn dedup_units(units: Vec<LogicalUnit>) -> Vec<LogicalUnit> {
    let mut kept: Vec<LogicalUnit> = Vec::new();
    for unit in units {
        let files: HashSet<&str> = unit.files.iter().map(String::as_str).collect();
        let duplicate = kept.iter().any(|existing| {
            let existing_files: HashSet<&str> =
                existing.files.iter().map(String::as_str).collect();
            existing_files == files
                && similar_explanations(&existing.explanation, &unit.explanation)
        });
        if !duplicate {
            kept.push(unit);
        }
    }
    kept
}

/// Word-overlap similarity between two explanations.
fn similar_explanations(a: &str, b: &str) -> bool {
    let words_a: HashSet<String> = a.to_lowercase().split_whitespace().map(String::from).collect();
    let words_b: HashSet<String> = b.to_lowercase().split_whitespace().map(String::from).collect();
    let longest = words_a.len().max(words_b.len());
    if longest == 0 {
        return true;
    }
    let common = words_a.intersection(&words_b).count();
    #[allow(clippy::cast_precision_loss)]
    let similarity = common as f64 / longest as f64;
    similarity > EXPLANATION_SIMILARITY
}

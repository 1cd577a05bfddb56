//! Parsing and cleanup of LLM responses into commit messages.

use std::sync::LazyLock;

use regex::Regex;

use super::CommitMessage;

// type(scope)!: subject, with scope and the breaking-change marker optional.
static SUBJECT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<type>[A-Za-z]+)(?:\((?P<scope>[^)]+)\))?!?:\s+(?P<subject>.+)$")
        .expect("subject regex is valid")
});

static MESSAGE_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(commit message:|message:)\s*").expect("prefix regex is valid")
});

/// Strips markdown fences, prompt echo, and boilerplate prefixes that models
/// tend to wrap around the actual commit message.
pub fn clean_response(raw: &str) -> String {
    let without_fences = raw.replace("```", "").replace('`', "");

    let kept: Vec<&str> = without_fences
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            // Separator lines and shouty instructions are prompt leakage.
            !(trimmed.chars().count() >= 3 && trimmed.chars().all(|c| c == '-'))
                && !trimmed.contains("IMPORTANT:")
        })
        .collect();

    let joined = kept.join("\n");
    MESSAGE_PREFIX_RE.replace(joined.trim(), "").trim().to_string()
}

/// Parses cleaned text against the conventional commit grammar.
///
/// Returns `None` when the first line doesn't match `type(scope): subject`
/// or the type isn't in the allowed vocabulary.
pub fn parse(text: &str, allowed_types: &[String]) -> Option<CommitMessage> {
    let mut lines = text.lines();
    let first = lines.next()?.trim();

    let captures = SUBJECT_RE.captures(first)?;
    let commit_type = captures.name("type")?.as_str().to_lowercase();

    if !allowed_types
        .iter()
        .any(|t| t.eq_ignore_ascii_case(&commit_type))
    {
        return None;
    }

    let scope = captures.name("scope").map(|m| m.as_str().to_string());
    let subject = captures.name("subject")?.as_str().trim().to_string();

    let body = lines.collect::<Vec<_>>().join("\n").trim().to_string();
    let body = (!body.is_empty()).then_some(body);

    Some(CommitMessage {
        commit_type,
        scope,
        subject,
        body,
    })
}

/// Fallback for responses that don't match the grammar: the entire text
/// becomes the subject with type "chore".
pub fn chore_fallback(text: &str) -> CommitMessage {
    CommitMessage {
        commit_type: "chore".to_string(),
        scope: None,
        subject: text.trim().to_string(),
        body: None,
    }
}

//! Deterministic fallback messages built from the changed file list.
//!
//! Used when the backend returns an empty response after cleanup; the user
//! still gets something reviewable rather than an error.

use std::collections::HashMap;
use std::path::Path;

use super::CommitMessage;

/// Builds a fallback commit message from changed file paths.
pub fn from_files(files: &[&str]) -> CommitMessage {
    if files.is_empty() {
        return message("chore", "update repository files");
    }

    let commit_type = type_from_extensions(files);

    let subject = match files.len() {
        1 => format!("update {}", base_name(files[0])),
        2 | 3 => {
            let names: Vec<&str> = files.iter().map(|f| base_name(f)).collect();
            format!("update {}", names.join(", "))
        }
        n => {
            let by_ext = group_by_extension(files);
            if by_ext.len() == 1 {
                let ext = by_ext.keys().next().map_or("", String::as_str);
                format!("update {n} {ext} files")
            } else {
                "update files across multiple components".to_string()
            }
        }
    };

    message(&commit_type, &subject)
}

/// Picks a commit type from the most common file extension.
fn type_from_extensions(files: &[&str]) -> String {
    let by_ext = group_by_extension(files);
    let most_common = by_ext
        .iter()
        .max_by_key(|(_, paths)| paths.len())
        .map(|(ext, _)| ext.as_str());

    match most_common {
        Some("md" | "txt") => "docs",
        Some("css" | "scss") => "style",
        Some("rs" | "py" | "js" | "ts" | "go") => "feat",
        _ => "chore",
    }
    .to_string()
}

fn group_by_extension<'a>(files: &[&'a str]) -> HashMap<String, Vec<&'a str>> {
    let mut groups: HashMap<String, Vec<&str>> = HashMap::new();
    for file in files {
        let ext = Path::new(file)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("(no extension)")
            .to_lowercase();
        groups.entry(ext).or_default().push(file);
    }
    groups
}

fn base_name(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path)
}

fn message(commit_type: &str, subject: &str) -> CommitMessage {
    CommitMessage {
        commit_type: commit_type.to_string(),
        scope: None,
        subject: subject.to_string(),
        body: None,
    }
}

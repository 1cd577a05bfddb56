//! Lightweight unified-diff summary.
//!
//! The pipeline never interprets hunks in depth; it only needs the list of
//! changed files and a sample of added lines per file to build the change
//! description for the prompt.

/// Changes to a single file extracted from a unified diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    /// Path of the file, relative to the repository root.
    pub path: String,
    /// Added lines, stripped of the leading `+`.
    pub additions: Vec<String>,
}

/// Summary of a raw `git diff` text blob.
#[derive(Debug, Clone, Default)]
pub struct DiffSummary {
    /// Per-file changes, in diff order.
    pub files: Vec<FileChange>,
}

impl DiffSummary {
    /// Parses a unified diff, tracking file headers and added lines.
    pub fn from_diff(diff: &str) -> Self {
        let mut files: Vec<FileChange> = Vec::new();

        for line in diff.lines() {
            if let Some(path) = parse_file_header(line) {
                files.push(FileChange {
                    path: path.to_string(),
                    additions: Vec::new(),
                });
            } else if line.starts_with('+') && !line.starts_with("+++") {
                if let Some(current) = files.last_mut() {
                    current.additions.push(line[1..].trim().to_string());
                }
            }
        }

        Self { files }
    }

    /// Returns the changed file paths, in diff order.
    pub fn file_paths(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.path.as_str()).collect()
    }

    /// Returns true when the diff contained no file headers.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Extracts the `b/`-side path from a `diff --git a/x b/x` header line.
fn parse_file_header(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("diff --git ")?;
    let b_side = rest.split(' ').nth(1)?;
    b_side.strip_prefix("b/").or(Some(b_side))
}

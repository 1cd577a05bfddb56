//! Prompt templates for commit message generation.

use crate::git::DiffSummary;

/// Per-file cap on added lines quoted in the change description.
const MAX_ADDITIONS_PER_FILE: usize = 5;

/// Cap on file names listed in the header line.
const MAX_FILES_LISTED: usize = 10;

/// Longest added line quoted verbatim; longer lines are truncated.
const MAX_LINE_LENGTH: usize = 80;

/// System prompt establishing the commit-writer role.
pub const SYSTEM_PROMPT: &str = "\
You are an expert Git commit message writer. You analyze code changes and \
write a single concise, informative commit message following the \
Conventional Commits specification. Your entire response must be the commit \
message itself, with no commentary, no markdown fences, and no prefix such \
as \"Commit message:\".";

/// System prompt for the free-text diff analysis step.
pub const ANALYSIS_SYSTEM_PROMPT: &str = "\
You are an expert software engineer analyzing git diffs to understand code \
changes. Focus on the underlying purpose of the changes, not surface-level \
textual edits. Keep your analysis brief but complete.";

/// System prompt for the logical-unit splitting step.
pub const SPLITTING_SYSTEM_PROMPT: &str = "\
You are an expert software engineer organizing code changes into logical \
units for separate commits. You respond ONLY with valid JSON, with no \
additional text or explanation.";

/// Builds the user prompt for the analysis step.
pub fn diff_analysis_prompt(diff: &str) -> String {
    format!(
        "Git diff:\n\
         ```\n\
         {diff}\n\
         ```\n\
         \n\
         Analyze the changes above and provide a CONCISE explanation of what \
         was changed and why, covering:\n\
         1. What files were changed\n\
         2. A summary of each file's changes\n\
         3. The overall purpose of these changes"
    )
}

/// Builds the user prompt for the splitting step, embedding the diff and the
/// analysis produced by [`diff_analysis_prompt`].
pub fn change_splitting_prompt(diff: &str, analysis: &str) -> String {
    format!(
        "Git diff:\n\
         ```\n\
         {diff}\n\
         ```\n\
         \n\
         Previous analysis:\n\
         {analysis}\n\
         \n\
         Split the above changes into separate logical units based on files \
         that should be committed together. Group files that serve a single \
         purpose or implement a related feature or fix.\n\
         \n\
         For each logical unit, provide:\n\
         1. A descriptive name (brief but clear)\n\
         2. The files involved\n\
         3. A brief explanation of what this change accomplishes (1-2 \
         sentences maximum)\n\
         4. Whether it should be split into a separate commit\n\
         \n\
         Output format:\n\
         [\n\
           {{\n\
             \"name\": \"Name of logical unit 1\",\n\
             \"files\": [\"file1.rs\", \"file2.rs\"],\n\
             \"explanation\": \"Brief explanation of what this change does\",\n\
             \"should_split\": true\n\
           }}\n\
         ]\n\
         \n\
         RESPOND ONLY WITH VALID JSON."
    )
}

/// Builds the change description embedded in the user prompt from the diff
/// summary: the changed file list plus a sample of added lines per file.
pub fn change_description(summary: &DiffSummary) -> String {
    let files = summary.file_paths();

    let mut file_list = files
        .iter()
        .take(MAX_FILES_LISTED)
        .copied()
        .collect::<Vec<_>>()
        .join(", ");
    if files.len() > MAX_FILES_LISTED {
        file_list.push_str(&format!(" and {} more files", files.len() - MAX_FILES_LISTED));
    }

    let mut description = format!("Changes to the following files: {file_list}\n");

    for file in &summary.files {
        if file.additions.is_empty() {
            continue;
        }
        description.push_str(&format!("\nFile: {}\n", file.path));
        for line in file.additions.iter().take(MAX_ADDITIONS_PER_FILE) {
            description.push_str(&format!("  + {}\n", truncate(line, MAX_LINE_LENGTH)));
        }
        if file.additions.len() > MAX_ADDITIONS_PER_FILE {
            description.push_str(&format!(
                "  ... and {} more changes\n",
                file.additions.len() - MAX_ADDITIONS_PER_FILE
            ));
        }
    }

    description
}

/// Truncates a line to at most `max` bytes, respecting char boundaries.
fn truncate(line: &str, max: usize) -> String {
    if line.len() <= max {
        return line.to_string();
    }
    let mut cut = max - 3;
    while !line.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...", &line[..cut])
}

/// Builds the user prompt embedding the change description and the allowed
/// type/scope vocabulary.
pub fn commit_message_prompt(
    change_description: &str,
    commit_types: &[String],
    commit_scopes: &[String],
) -> String {
    let types = commit_types.join(", ");
    let scopes = if commit_scopes.is_empty() {
        "None specified".to_string()
    } else {
        commit_scopes.join(", ")
    };

    format!(
        "The code changes to analyze are:\n\
         ```\n\
         {change_description}\n\
         ```\n\
         \n\
         Write ONE conventional commit message for THESE CHANGES.\n\
         \n\
         Available commit types: {types}\n\
         Available scopes: {scopes}\n\
         \n\
         Format your message like this:\n\
         <type>[(scope)]: <description>\n\
         \n\
         [optional body explaining why the change was made]\n\
         \n\
         Rules:\n\
         1. Choose ONE type from: {types}\n\
         2. Scope is optional, choose from: {scopes}\n\
         3. First line should be < 50 characters\n\
         4. Use imperative present tense (\"add\" not \"adds\")\n\
         5. No period at end of first line\n\
         6. Optional body should explain WHY, not HOW\n\
         \n\
         Respond with JUST the commit message and nothing else."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::diff::FileChange;

    fn summary(files: Vec<FileChange>) -> DiffSummary {
        DiffSummary { files }
    }

    #[test]
    fn description_lists_files_and_additions() {
        let s = summary(vec![FileChange {
            path: "src/lib.rs".to_string(),
            additions: vec!["pub mod backend;".to_string()],
        }]);
        let description = change_description(&s);
        assert!(description.contains("Changes to the following files: src/lib.rs"));
        assert!(description.contains("  + pub mod backend;"));
    }

    #[test]
    fn description_caps_additions_per_file() {
        let s = summary(vec![FileChange {
            path: "big.rs".to_string(),
            additions: (0..8).map(|i| format!("line {i}")).collect(),
        }]);
        let description = change_description(&s);
        assert!(description.contains("line 4"));
        assert!(!description.contains("line 5"));
        assert!(description.contains("... and 3 more changes"));
    }

    #[test]
    fn description_truncates_long_lines() {
        let s = summary(vec![FileChange {
            path: "long.rs".to_string(),
            additions: vec!["x".repeat(120)],
        }]);
        let description = change_description(&s);
        assert!(description.contains("..."));
        assert!(!description.contains(&"x".repeat(120)));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let line = "é".repeat(100);
        let shown = truncate(&line, 80);
        assert!(shown.ends_with("..."));
        assert!(shown.len() <= 80);
    }

    #[test]
    fn description_elides_long_file_lists() {
        let s = summary(
            (0..12)
                .map(|i| FileChange {
                    path: format!("file{i}.rs"),
                    additions: vec![],
                })
                .collect(),
        );
        let description = change_description(&s);
        assert!(description.contains("and 2 more files"));
    }

    #[test]
    fn prompt_embeds_types_and_scopes() {
        let prompt = commit_message_prompt(
            "desc",
            &["feat".to_string(), "fix".to_string()],
            &["ui".to_string()],
        );
        assert!(prompt.contains("Available commit types: feat, fix"));
        assert!(prompt.contains("Available scopes: ui"));
        assert!(prompt.contains("desc"));
    }

    #[test]
    fn analysis_prompt_embeds_diff() {
        let prompt = diff_analysis_prompt("diff --git a/x b/x");
        assert!(prompt.contains("diff --git a/x b/x"));
        assert!(prompt.contains("CONCISE"));
    }

    #[test]
    fn splitting_prompt_embeds_diff_and_analysis() {
        let prompt = change_splitting_prompt("diff --git a/x b/x", "Renames a field.");
        assert!(prompt.contains("diff --git a/x b/x"));
        assert!(prompt.contains("Renames a field."));
        assert!(prompt.contains("\"should_split\""));
    }

    #[test]
    fn prompt_notes_missing_scopes() {
        let prompt = commit_message_prompt("desc", &["feat".to_string()], &[]);
        assert!(prompt.contains("Available scopes: None specified"));
    }
}

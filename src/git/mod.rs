//! Git operations via the system git binary.

pub mod diff;

pub use diff::DiffSummary;

use std::path::PathBuf;
use std::process::Command;

use thiserror::Error;
use tracing::debug;

/// Errors from invoking the git binary.
#[derive(Error, Debug)]
pub enum GitError {
    /// The git binary could not be spawned at all.
    #[error("failed to run '{command}': {source}")]
    Spawn {
        /// The binary that was invoked.
        command: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Git ran but exited non-zero.
    #[error("git {args} failed: {stderr}")]
    CommandFailed {
        /// The arguments that were passed.
        args: String,
        /// Captured stderr, trimmed.
        stderr: String,
    },
}

/// Thin wrapper over shell invocations of the configured git binary.
///
/// Every operation spawns a fresh subprocess; there are no retries, and any
/// failure is terminal for the invocation.
pub struct GitAdapter {
    git_command: String,
    working_dir: PathBuf,
}

impl GitAdapter {
    /// Creates an adapter that runs the given git binary in the current
    /// directory.
    pub fn new(git_command: impl Into<String>) -> Self {
        Self {
            git_command: git_command.into(),
            working_dir: PathBuf::from("."),
        }
    }

    /// Sets the directory git commands run in. Used by tests; production
    /// invocations run where the user launched the tool.
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    /// Returns the diff of staged changes, or of the whole working tree when
    /// `staged` is false.
    pub fn diff(&self, staged: bool) -> Result<String, GitError> {
        if staged {
            self.run(&["diff", "--staged"])
        } else {
            self.run(&["diff"])
        }
    }

    /// Commits staged changes with the given message.
    pub fn commit(&self, message: &str) -> Result<(), GitError> {
        self.run(&["commit", "-m", message])?;
        Ok(())
    }

    /// Unstages everything, leaving the working tree untouched.
    pub fn reset(&self) -> Result<(), GitError> {
        self.run(&["reset"])?;
        Ok(())
    }

    /// Stages a single path.
    pub fn stage(&self, path: &str) -> Result<(), GitError> {
        self.run(&["add", "--", path])?;
        Ok(())
    }

    /// Runs `git --version`. Used by doctor to probe for the binary.
    pub fn version(&self) -> Result<String, GitError> {
        let output = self.run(&["--version"])?;
        Ok(output.trim().to_string())
    }

    fn run(&self, args: &[&str]) -> Result<String, GitError> {
        debug!(command = %self.git_command, ?args, "Running git command");

        let output = Command::new(&self.git_command)
            .args(args)
            .current_dir(&self.working_dir)
            .output()
            .map_err(|source| GitError::Spawn {
                command: self.git_command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(GitError::CommandFailed {
                args: args.join(" "),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_binary_is_spawn_error() {
        let adapter = GitAdapter::new("definitely-not-a-real-git-binary");
        let err = adapter.version().unwrap_err();
        assert!(matches!(err, GitError::Spawn { .. }));
        assert!(err.to_string().contains("definitely-not-a-real-git-binary"));
    }

    #[test]
    fn command_failure_carries_stderr() {
        let err = GitError::CommandFailed {
            args: "commit -m msg".to_string(),
            stderr: "nothing to commit".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("commit -m msg"));
        assert!(text.contains("nothing to commit"));
    }
}

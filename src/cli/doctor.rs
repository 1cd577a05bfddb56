//! Doctor command — diagnoses config, git, and backend problems.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::backend;
use crate::config::Config;
use crate::git::GitAdapter;

/// Doctor command options.
#[derive(Parser)]
pub struct DoctorCommand {
    /// Path to the config file.
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Outcome of a single diagnostic check.
struct CheckResult {
    name: &'static str,
    outcome: Result<String, String>,
}

impl DoctorCommand {
    /// Runs every check independently and reports pass/fail for each.
    /// Exits non-zero when any check failed. No remediation is attempted.
    pub async fn execute(self) -> Result<()> {
        println!("🩺 Running commit-buddy diagnostics...\n");

        // Config failures must not stop the other checks, so fall back
        // to defaults for the git and backend probes.
        let config_result = Config::load(self.config.as_deref());
        let (config, config_check) = match config_result {
            Ok((config, source)) => {
                let detail = format!("loaded from {source}");
                (config, CheckResult { name: "config", outcome: Ok(detail) })
            }
            Err(e) => (
                Config::default(),
                CheckResult {
                    name: "config",
                    outcome: Err(format!("{e:#}")),
                },
            ),
        };

        let git_check = CheckResult {
            name: "git",
            outcome: check_git(&GitAdapter::new(config.git_command.clone())),
        };

        let backend_check = CheckResult {
            name: "backend",
            outcome: check_backend(&config).await,
        };

        let checks = [config_check, git_check, backend_check];
        let mut failures = 0;
        for check in &checks {
            println!("{}", render_check(check));
            if check.outcome.is_err() {
                failures += 1;
            }
        }

        println!();
        if failures > 0 {
            println!("❌ {failures} of {} checks failed", checks.len());
            std::process::exit(1);
        }

        println!("✅ All checks passed");
        Ok(())
    }
}

/// Probes the git binary with `--version`.
fn check_git(adapter: &GitAdapter) -> Result<String, String> {
    adapter.version().map_err(|e| e.to_string())
}

/// Probes the configured backend's health endpoint.
async fn check_backend(config: &Config) -> Result<String, String> {
    let backend = backend::create_backend(config).map_err(|e| format!("{e:#}"))?;
    backend.check_health().await.map_err(|e| format!("{e:#}"))?;
    let meta = backend.metadata();
    Ok(format!(
        "{} reachable at {} (model: {})",
        meta.provider, config.backend_url, meta.model
    ))
}

/// Formats a check result as a single pass/fail line.
fn render_check(check: &CheckResult) -> String {
    match &check.outcome {
        Ok(detail) => format!("✅ {}: {detail}", check.name),
        Err(reason) => format!("❌ {}: {reason}", check.name),
    }
}

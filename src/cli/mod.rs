//! CLI interface for commit-buddy.

use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod doctor;
pub mod generate;

/// commit-buddy: AI-powered git commit assistant.
#[derive(Parser)]
#[command(name = "commit-buddy")]
#[command(about = "AI-powered git commit assistant", long_about = None)]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// The command to execute. Defaults to `generate` when omitted.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Generate flags accepted at the top level so plain `commit-buddy`
    /// behaves like `commit-buddy generate`.
    #[command(flatten)]
    pub generate: generate::GenerateCommand,
}

/// Main commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Generates a commit message from the current changes (default).
    Generate(generate::GenerateCommand),
    /// Checks config validity, git availability, and backend connectivity.
    Doctor(doctor::DoctorCommand),
}

impl Cli {
    /// Executes the CLI command.
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Some(Commands::Generate(cmd)) => cmd.execute().await,
            Some(Commands::Doctor(cmd)) => cmd.execute().await,
            None => self.generate.execute().await,
        }
    }

    /// Whether verbose output was requested, in any invocation form.
    pub fn verbose(&self) -> bool {
        match &self.command {
            Some(Commands::Generate(cmd)) => cmd.verbose,
            Some(Commands::Doctor(_)) => false,
            None => self.generate.verbose,
        }
    }

    /// The default tracing filter for this invocation. `RUST_LOG` still
    /// overrides it.
    pub fn default_log_filter(&self) -> &'static str {
        if self.verbose() {
            "commit_buddy=debug"
        } else {
            "warn"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_invocation_defaults_to_generate() {
        let cli = Cli::try_parse_from(["commit-buddy"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn generate_flags_accepted_at_top_level() {
        let cli = Cli::try_parse_from(["commit-buddy", "--unstaged", "--analyze"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.generate.unstaged);
        assert!(cli.generate.analyze);
    }

    #[test]
    fn explicit_generate_subcommand_parses() {
        let cli = Cli::try_parse_from(["commit-buddy", "generate", "--auto-commit"]).unwrap();
        match cli.command {
            Some(Commands::Generate(cmd)) => assert!(cmd.auto_commit),
            _ => panic!("expected generate subcommand"),
        }
    }

    #[test]
    fn doctor_subcommand_parses() {
        let cli = Cli::try_parse_from(["commit-buddy", "doctor"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Doctor(_))));
    }

    #[test]
    fn verbose_flag_lowers_the_default_log_filter() {
        let cli = Cli::try_parse_from(["commit-buddy", "--verbose"]).unwrap();
        assert!(cli.verbose());
        assert_eq!(cli.default_log_filter(), "commit_buddy=debug");

        let cli = Cli::try_parse_from(["commit-buddy", "generate", "-v"]).unwrap();
        assert!(cli.verbose());

        let cli = Cli::try_parse_from(["commit-buddy"]).unwrap();
        assert!(!cli.verbose());
        assert_eq!(cli.default_log_filter(), "warn");

        let cli = Cli::try_parse_from(["commit-buddy", "doctor"]).unwrap();
        assert!(!cli.verbose());
    }

    #[test]
    fn gpu_layers_takes_a_value() {
        let cli = Cli::try_parse_from(["commit-buddy", "--gpu-layers", "32"]).unwrap();
        assert_eq!(cli.generate.gpu_layers, Some(32));
    }
}

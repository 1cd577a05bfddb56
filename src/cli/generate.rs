//! Generate command — the default interactive workflow.

use std::collections::{BTreeSet, HashSet};
use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::warn;

use crate::backend::{self, LlmBackend};
use crate::config::Config;
use crate::git::{DiffSummary, GitAdapter};
use crate::message::splitter::{self, LogicalUnit};
use crate::message::{self, CommitMessage};

/// Lines of the analysis shown when not in verbose mode.
const ANALYSIS_PREVIEW_LINES: usize = 5;

/// Generate command options.
#[derive(Parser)]
pub struct GenerateCommand {
    /// Path to the config file.
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Model identifier, overriding the configured one.
    #[arg(long, short = 'm')]
    pub model: Option<String>,

    /// Shows the analysis and proposed messages without committing.
    #[arg(long, short = 'a')]
    pub analyze: bool,

    /// Analyzes the unstaged working-tree diff, splitting it into logical
    /// units that are committed separately.
    #[arg(long, short = 'u')]
    pub unstaged: bool,

    /// Commits without asking for confirmation.
    #[arg(long)]
    pub auto_commit: bool,

    /// Enables verbose output.
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Prints the merged configuration and exits.
    #[arg(long)]
    pub show_config: bool,

    /// Number of model layers to offload to the GPU.
    #[arg(long, short = 'g', value_name = "N")]
    pub gpu_layers: Option<i32>,
}

/// The user's verdict on a proposed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReviewChoice {
    /// Commit with the proposed message.
    Accept,
    /// Ask the backend for a new message.
    Regenerate,
    /// Stop without committing.
    Abort,
}

/// What to generate a message for.
pub(crate) enum Proposal<'a> {
    /// The whole diff, described by its summary.
    Summary(&'a DiffSummary),
    /// One logical unit of a split diff.
    Unit(&'a LogicalUnit),
}

/// How a review cycle ended.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum CycleOutcome {
    /// The user accepted and the commit was recorded.
    Committed,
    /// The user declined; nothing was committed.
    Aborted,
}

impl GenerateCommand {
    /// Executes the generate workflow: diff, generate, review, commit.
    pub async fn execute(self) -> Result<()> {
        let (mut config, source) = Config::load(self.config.as_deref())?;
        self.apply_overrides(&mut config);

        if self.show_config {
            println!("# Configuration source: {source}");
            print!("{}", config.to_yaml()?);
            return Ok(());
        }

        println!("🔍 Loading configuration ({source})");

        let adapter = GitAdapter::new(config.git_command.clone());

        let diff_kind = if self.unstaged { "working tree" } else { "staged" };
        println!("📄 Retrieving {diff_kind} diff...");
        let diff = adapter
            .diff(!self.unstaged)
            .context("Failed to retrieve git diff")?;

        if diff.trim().is_empty() {
            if self.unstaged {
                bail!("no changes detected in the working tree");
            }
            bail!("no staged changes found (stage your changes, or pass --unstaged)");
        }

        let summary = DiffSummary::from_diff(&diff);
        println!("   {} file(s) changed:", summary.files.len());
        for path in summary.file_paths() {
            println!("   - {path}");
        }

        let backend = backend::create_backend(&config)?;
        if self.verbose {
            let meta = backend.metadata();
            println!("🤖 Backend: {} (model: {})", meta.provider, meta.model);
        }

        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        let mut input = stdin.lock();
        let mut out = stdout.lock();

        if self.unstaged {
            self.run_split_workflow(
                backend.as_ref(),
                &adapter,
                &config,
                &diff,
                &summary,
                &mut input,
                &mut out,
            )
            .await
        } else {
            self.run_staged_workflow(
                backend.as_ref(),
                &adapter,
                &config,
                &summary,
                &mut input,
                &mut out,
            )
            .await
        }
    }

    /// The fast path for staged changes: one message, one commit.
    async fn run_staged_workflow<R: BufRead, W: Write>(
        &self,
        backend: &dyn LlmBackend,
        adapter: &GitAdapter,
        config: &Config,
        summary: &DiffSummary,
        input: &mut R,
        out: &mut W,
    ) -> Result<()> {
        if self.analyze {
            writeln!(out, "🤖 Generating commit message...")?;
            let proposed = message::generate_message(backend, config, summary).await?;
            print_message(out, &proposed)?;
            writeln!(out, "ℹ️  --analyze given, not committing.")?;
            return Ok(());
        }

        review_cycle(backend, adapter, config, Proposal::Summary(summary), None, input, out)
            .await?;
        Ok(())
    }

    /// The full path for unstaged changes: analyze the diff, split it into
    /// logical units, and commit each unit separately.
    #[allow(clippy::too_many_arguments)]
    async fn run_split_workflow<R: BufRead, W: Write>(
        &self,
        backend: &dyn LlmBackend,
        adapter: &GitAdapter,
        config: &Config,
        diff: &str,
        summary: &DiffSummary,
        input: &mut R,
        out: &mut W,
    ) -> Result<()> {
        writeln!(out, "🔬 Analyzing changes...")?;
        let analysis = splitter::analyze_diff(backend, diff)
            .await
            .context("diff analysis failed")?;
        print_analysis(out, &analysis, self.verbose)?;

        writeln!(out, "🧩 Splitting changes into logical units...")?;
        let units = splitter::split_changes(backend, diff, &analysis)
            .await
            .context("change splitting failed")?;

        if units.is_empty() {
            writeln!(out, "No logical units identified; generating a single commit message.")?;
            if self.analyze {
                writeln!(out, "🤖 Generating commit message...")?;
                let proposed = message::generate_message(backend, config, summary).await?;
                print_message(out, &proposed)?;
                writeln!(out, "ℹ️  --analyze given, not committing.")?;
                return Ok(());
            }
            let all_files: Vec<String> =
                summary.file_paths().iter().map(ToString::to_string).collect();
            review_cycle(
                backend,
                adapter,
                config,
                Proposal::Summary(summary),
                Some(&all_files),
                input,
                out,
            )
            .await?;
            return Ok(());
        }

        print_units(out, &units)?;

        if self.analyze {
            writeln!(out, "ℹ️  --analyze given, not committing.")?;
            return Ok(());
        }

        let mut committed_file_sets: HashSet<BTreeSet<String>> = HashSet::new();
        for (index, unit) in units.iter().enumerate() {
            let file_set: BTreeSet<String> = unit.files.iter().cloned().collect();
            if committed_file_sets.contains(&file_set) {
                writeln!(
                    out,
                    "Skipping unit {}/{}: {} (already committed these files)",
                    index + 1,
                    units.len(),
                    unit.name
                )?;
                continue;
            }

            writeln!(out, "\nProcessing unit {}/{}: {}", index + 1, units.len(), unit.name)?;
            let outcome = review_cycle(
                backend,
                adapter,
                config,
                Proposal::Unit(unit),
                Some(&unit.files),
                input,
                out,
            )
            .await?;

            if outcome == CycleOutcome::Committed {
                committed_file_sets.insert(file_set);
            }
        }

        Ok(())
    }

    /// Applies CLI flag overrides on top of the loaded configuration.
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(gpu_layers) = self.gpu_layers {
            config.gpu_layers = gpu_layers;
        }
        if self.auto_commit {
            config.auto_commit = true;
        }
    }
}

/// Generates a message for the proposal and walks the user through the
/// accept/regenerate/abort loop, committing on accept.
///
/// When `stage` is given, accepting first resets the index and stages only
/// those paths, so each logical unit lands in its own commit. Files that
/// fail to stage are warned about and skipped, matching how partially moved
/// or deleted paths behave.
pub(crate) async fn review_cycle<R: BufRead, W: Write>(
    backend: &dyn LlmBackend,
    adapter: &GitAdapter,
    config: &Config,
    proposal: Proposal<'_>,
    stage: Option<&[String]>,
    input: &mut R,
    out: &mut W,
) -> Result<CycleOutcome> {
    loop {
        writeln!(out, "🤖 Generating commit message...")?;
        let proposed = match &proposal {
            Proposal::Summary(summary) => {
                message::generate_message(backend, config, summary).await?
            }
            Proposal::Unit(unit) => message::generate_for_unit(backend, config, unit).await?,
        };

        print_message(out, &proposed)?;

        let choice = if config.auto_commit {
            ReviewChoice::Accept
        } else {
            prompt_choice(input, out)?
        };

        match choice {
            ReviewChoice::Accept => {
                if let Some(paths) = stage {
                    adapter.reset().context("git reset failed")?;
                    for path in paths {
                        if let Err(err) = adapter.stage(path) {
                            warn!(%path, error = %err, "could not stage file, skipping");
                        }
                    }
                }
                writeln!(out, "💾 Committing...")?;
                adapter
                    .commit(&proposed.to_string())
                    .context("git commit failed")?;
                writeln!(out, "✅ Successfully committed: {}", subject_line(&proposed))?;
                return Ok(CycleOutcome::Committed);
            }
            ReviewChoice::Regenerate => {
                writeln!(out, "🔄 Regenerating...")?;
            }
            ReviewChoice::Abort => {
                writeln!(out, "Aborted. No commit made.")?;
                return Ok(CycleOutcome::Aborted);
            }
        }
    }
}

/// Prints the proposed message in a bordered block.
fn print_message<W: Write>(out: &mut W, message: &CommitMessage) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "──────────── proposed commit message ────────────")?;
    writeln!(out, "{message}")?;
    writeln!(out, "──────────────────────────────────────────────────")?;
    writeln!(out)?;
    Ok(())
}

/// Prints the diff analysis, in full when verbose, otherwise the first few
/// lines.
fn print_analysis<W: Write>(out: &mut W, analysis: &str, verbose: bool) -> Result<()> {
    let lines: Vec<&str> = analysis.lines().collect();
    let shown = if verbose { lines.len() } else { lines.len().min(ANALYSIS_PREVIEW_LINES) };

    writeln!(out, "──────────────── analysis ────────────────")?;
    for line in &lines[..shown] {
        writeln!(out, "{line}")?;
    }
    if shown < lines.len() {
        writeln!(out, "...")?;
    }
    writeln!(out, "──────────────────────────────────────────")?;
    Ok(())
}

/// Lists the logical units with their files and explanations.
fn print_units<W: Write>(out: &mut W, units: &[LogicalUnit]) -> Result<()> {
    writeln!(out, "Identified {} logical unit(s):", units.len())?;
    for (index, unit) in units.iter().enumerate() {
        writeln!(out, "  {}. {}", index + 1, unit.name)?;
        writeln!(out, "     files: {}", unit.files.join(", "))?;
        writeln!(out, "     {}", unit.explanation)?;
    }
    Ok(())
}

fn subject_line(message: &CommitMessage) -> String {
    message.to_string().lines().next().unwrap_or_default().to_string()
}

/// Reads the accept/regenerate/abort choice, re-prompting on unrecognized
/// input. EOF on the input is treated as abort.
fn prompt_choice<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> Result<ReviewChoice> {
    loop {
        write!(out, "❓ [Y]es commit / [R]egenerate / [N]o abort? [Y/r/n] ")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(ReviewChoice::Abort);
        }

        match parse_choice(&line) {
            Some(choice) => return Ok(choice),
            None => writeln!(out, "Please enter 'y', 'r', or 'n'.")?,
        }
    }
}

/// Maps raw input to a review choice. Empty input defaults to accept.
fn parse_choice(input: &str) -> Option<ReviewChoice> {
    match input.trim().to_lowercase().as_str() {
        "" | "y" | "yes" => Some(ReviewChoice::Accept),
        "r" | "regenerate" | "retry" => Some(ReviewChoice::Regenerate),
        "n" | "no" | "q" | "quit" => Some(ReviewChoice::Abort),
        _ => None,
    }
}

//! Configuration management for commit-buddy.
//!
//! Settings are loaded from the first parseable file on a fixed search path
//! (explicit `--config` path, then the project directory, then the home
//! directory) and merged over hard-coded defaults. A missing file is not an
//! error; a malformed one is.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Supported LLM backend families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Ollama server (`/api/generate`).
    #[default]
    Ollama,
    /// Any OpenAI-compatible server (`/v1/chat/completions`).
    #[serde(rename = "openai")]
    OpenAi,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Ollama => write!(f, "Ollama"),
            BackendKind::OpenAi => write!(f, "OpenAI-compatible"),
        }
    }
}

/// Commit-buddy configuration. Loaded once per invocation and immutable
/// thereafter (CLI flag overrides are applied before the pipeline starts).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Backend family to talk to.
    pub backend: BackendKind,

    /// Base URL of the backend server.
    pub backend_url: String,

    /// Model identifier passed to the backend.
    pub model: String,

    /// API key for remote OpenAI-compatible servers. Falls back to the
    /// `OPENAI_API_KEY` environment variable when unset.
    pub api_key: Option<String>,

    /// Sampling temperature.
    pub temperature: f32,

    /// Maximum tokens to generate per response.
    pub max_tokens: u32,

    /// Context window requested from the backend.
    pub context_length: u32,

    /// Number of model layers to offload to the GPU (Ollama only).
    pub gpu_layers: i32,

    /// Prompt batch size (Ollama only).
    pub batch_size: u32,

    /// CPU threads for inference (Ollama only).
    pub threads: u32,

    /// Git binary to invoke.
    pub git_command: String,

    /// Commit without asking for confirmation.
    pub auto_commit: bool,

    /// Allowed conventional commit types.
    pub commit_types: Vec<String>,

    /// Allowed commit scopes. Empty means any scope is accepted.
    pub commit_scopes: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendKind::Ollama,
            backend_url: "http://localhost:11434".to_string(),
            model: "llama3.2".to_string(),
            api_key: None,
            temperature: 0.2,
            max_tokens: 1024,
            context_length: 4096,
            gpu_layers: 1,
            batch_size: 512,
            threads: 4,
            git_command: "git".to_string(),
            auto_commit: false,
            commit_types: [
                "feat", "fix", "docs", "style", "refactor", "perf", "test", "build", "ci",
                "chore", "revert",
            ]
            .iter()
            .map(ToString::to_string)
            .collect(),
            commit_scopes: Vec::new(),
        }
    }
}

/// Where the active configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Loaded from a settings file.
    File(PathBuf),
    /// No settings file found; hard-coded defaults in effect.
    Defaults,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "{}", path.display()),
            ConfigSource::Defaults => write!(f, "built-in defaults"),
        }
    }
}

impl Config {
    /// Loads configuration using the standard search path, or from an
    /// explicit path when one is given.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, ConfigSource)> {
        let project_dir = std::env::current_dir().context("Failed to determine current directory")?;
        Self::load_from_dirs(explicit, &project_dir, dirs::home_dir().as_deref())
    }

    /// Loads configuration searching the given project and home directories.
    ///
    /// Split out from [`Config::load`] so the search order is testable
    /// without touching the real filesystem layout.
    pub fn load_from_dirs(
        explicit: Option<&Path>,
        project_dir: &Path,
        home_dir: Option<&Path>,
    ) -> Result<(Self, ConfigSource)> {
        if let Some(path) = explicit {
            let config = Self::parse_file(path)?;
            return Ok((config, ConfigSource::File(path.to_path_buf())));
        }

        for candidate in candidate_paths(project_dir, home_dir) {
            if candidate.exists() {
                let config = Self::parse_file(&candidate)?;
                return Ok((config, ConfigSource::File(candidate)));
            }
        }

        Ok((Self::default(), ConfigSource::Defaults))
    }

    /// Parses a settings file, choosing the format by extension. Unknown
    /// extensions are treated as YAML (a superset of JSON).
    fn parse_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        } else {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        }
    }

    /// Renders the configuration as YAML for `--show-config`.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize configuration")
    }
}

/// Returns the ordered list of candidate settings files. Project-local files
/// take precedence over per-user ones.
fn candidate_paths(project_dir: &Path, home_dir: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = vec![
        project_dir.join("commit-buddy.yaml"),
        project_dir.join("commit-buddy.yml"),
        project_dir.join("commit-buddy.json"),
        project_dir.join(".commit-buddy.yaml"),
    ];

    if let Some(home) = home_dir {
        let config_dir = home.join(".commit-buddy");
        candidates.push(config_dir.join("config.yaml"));
        candidates.push(config_dir.join("config.yml"));
        candidates.push(config_dir.join("config.json"));
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_config_values() {
        let config = Config::default();
        assert_eq!(config.backend, BackendKind::Ollama);
        assert_eq!(config.git_command, "git");
        assert!(!config.auto_commit);
        assert!(config.commit_types.contains(&"feat".to_string()));
        assert!(config.commit_types.contains(&"chore".to_string()));
        assert!(config.commit_scopes.is_empty());
    }

    #[test]
    fn missing_files_fall_back_to_defaults() {
        let project = tempdir().unwrap();
        let home = tempdir().unwrap();

        let (config, source) =
            Config::load_from_dirs(None, project.path(), Some(home.path())).unwrap();

        assert_eq!(source, ConfigSource::Defaults);
        assert_eq!(config.model, Config::default().model);
    }

    #[test]
    fn project_file_overrides_home_file() {
        let project = tempdir().unwrap();
        let home = tempdir().unwrap();

        std::fs::create_dir_all(home.path().join(".commit-buddy")).unwrap();
        std::fs::write(
            home.path().join(".commit-buddy").join("config.yaml"),
            "model: home-model\n",
        )
        .unwrap();
        std::fs::write(
            project.path().join("commit-buddy.yaml"),
            "model: project-model\n",
        )
        .unwrap();

        let (config, source) =
            Config::load_from_dirs(None, project.path(), Some(home.path())).unwrap();

        assert_eq!(config.model, "project-model");
        assert_eq!(
            source,
            ConfigSource::File(project.path().join("commit-buddy.yaml"))
        );
    }

    #[test]
    fn home_file_used_when_project_has_none() {
        let project = tempdir().unwrap();
        let home = tempdir().unwrap();

        std::fs::create_dir_all(home.path().join(".commit-buddy")).unwrap();
        std::fs::write(
            home.path().join(".commit-buddy").join("config.yaml"),
            "model: home-model\ntemperature: 0.7\n",
        )
        .unwrap();

        let (config, _) =
            Config::load_from_dirs(None, project.path(), Some(home.path())).unwrap();

        assert_eq!(config.model, "home-model");
        assert!((config.temperature - 0.7).abs() < f32::EPSILON);
        // Unspecified fields keep their defaults
        assert_eq!(config.git_command, "git");
    }

    #[test]
    fn json_config_parses_by_extension() {
        let project = tempdir().unwrap();
        std::fs::write(
            project.path().join("commit-buddy.json"),
            r#"{"model": "json-model", "backend": "openai"}"#,
        )
        .unwrap();

        let (config, _) = Config::load_from_dirs(None, project.path(), None).unwrap();
        assert_eq!(config.model, "json-model");
        assert_eq!(config.backend, BackendKind::OpenAi);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let project = tempdir().unwrap();
        std::fs::write(
            project.path().join("commit-buddy.yaml"),
            "model: [unclosed\n",
        )
        .unwrap();

        let result = Config::load_from_dirs(None, project.path(), None);
        assert!(result.is_err());
    }

    #[test]
    fn explicit_path_must_exist() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.yaml");

        let result = Config::load_from_dirs(Some(&missing), dir.path(), None);
        assert!(result.is_err());
    }

    #[test]
    fn explicit_path_wins_over_search() {
        let project = tempdir().unwrap();
        std::fs::write(
            project.path().join("commit-buddy.yaml"),
            "model: project-model\n",
        )
        .unwrap();
        let explicit = project.path().join("other.yaml");
        std::fs::write(&explicit, "model: explicit-model\n").unwrap();

        let (config, _) =
            Config::load_from_dirs(Some(&explicit), project.path(), None).unwrap();
        assert_eq!(config.model, "explicit-model");
    }
}

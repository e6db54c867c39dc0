//! TOML-based configuration for Pliny
//!
//! This module loads `pliny.toml`: which backend plays the fast and slow
//! roles, their models and effort, research turn budgets and scheduling
//! policy, and per-backend executable overrides.
//!
//! `${VAR}` references anywhere in the file are replaced with the value of the
//! environment variable before parsing; unset variables become empty strings.

use crate::backends::{BackendKind, ReasoningEffort, SandboxMode};
use crate::research::latency::LatencyModel;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure loaded from pliny.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlinyConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub agents: AgentsConfig,

    #[serde(default)]
    pub research: ResearchConfig,

    /// Per-backend overrides keyed by backend id (`claude-code`, `codex`, `opencode`)
    #[serde(default)]
    pub backends: HashMap<String, BackendConfig>,
}

// ============= General Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default tracing filter; `RUST_LOG` takes precedence
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

// ============= Agent Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentsConfig {
    /// Backend used for planning, fast research and synthesis
    #[serde(default = "default_fast_backend")]
    pub fast: BackendKind,

    /// Backend used to cross-check a prefix of subtopics
    #[serde(default = "default_slow_backend")]
    pub slow: BackendKind,

    #[serde(default = "default_fast_model")]
    pub fast_model: String,

    /// Absent means the slow backend picks its own default model
    #[serde(default)]
    pub slow_model: Option<String>,

    /// Reasoning effort for the slow backend; unknown values fall back to the backend default
    #[serde(default = "default_slow_effort")]
    pub slow_effort: Option<String>,
}

fn default_fast_backend() -> BackendKind {
    BackendKind::ClaudeCode
}

fn default_slow_backend() -> BackendKind {
    BackendKind::Codex
}

fn default_fast_model() -> String {
    "claude-opus-4-6".to_string()
}

fn default_slow_effort() -> Option<String> {
    Some("high".to_string())
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            fast: default_fast_backend(),
            slow: default_slow_backend(),
            fast_model: default_fast_model(),
            slow_model: None,
            slow_effort: default_slow_effort(),
        }
    }
}

impl AgentsConfig {
    /// Parsed slow-backend effort; `None` when unset or unrecognised
    pub fn effort(&self) -> Option<ReasoningEffort> {
        self.slow_effort.as_deref().and_then(|s| s.parse().ok())
    }
}

// ============= Research Configuration =============

/// What to do when every backend assigned to a subtopic failed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TotalFailurePolicy {
    /// Keep going; the subtopic is rendered as "(not available)"
    #[default]
    Degrade,
    /// Fail the run before synthesis
    Abort,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchConfig {
    #[serde(default = "default_subtopic_count")]
    pub subtopic_count: usize,

    #[serde(default = "default_plan_max_turns")]
    pub plan_max_turns: u32,

    #[serde(default = "default_research_max_turns")]
    pub research_max_turns: u32,

    #[serde(default = "default_synthesis_max_turns")]
    pub synthesis_max_turns: u32,

    /// Upper bound on subtopics researched at once; absent means unbounded
    #[serde(default)]
    pub max_concurrent_subtopics: Option<usize>,

    #[serde(default)]
    pub on_total_failure: TotalFailurePolicy,

    /// Working directory handed to backends; defaults to the process directory
    #[serde(default)]
    pub working_dir: Option<PathBuf>,

    #[serde(default)]
    pub sandbox: SandboxMode,
}

fn default_subtopic_count() -> usize {
    3
}

fn default_plan_max_turns() -> u32 {
    3
}

fn default_research_max_turns() -> u32 {
    8
}

fn default_synthesis_max_turns() -> u32 {
    5
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            subtopic_count: default_subtopic_count(),
            plan_max_turns: default_plan_max_turns(),
            research_max_turns: default_research_max_turns(),
            synthesis_max_turns: default_synthesis_max_turns(),
            max_concurrent_subtopics: None,
            on_total_failure: TotalFailurePolicy::default(),
            working_dir: None,
            sandbox: SandboxMode::default(),
        }
    }
}

// ============= Backend Configuration =============

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Executable to run; defaults to the backend's standard CLI name
    #[serde(default)]
    pub binary: Option<String>,

    /// Extra arguments appended to every invocation
    #[serde(default)]
    pub extra_args: Vec<String>,
}

// ============= Configuration Loading & Validation =============

/// Configuration warnings that don't prevent operation but may indicate issues
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub kind: ConfigWarningKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigWarningKind {
    UnknownModel,
    UnknownEffort,
    UnimplementedBackend,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl PlinyConfig {
    /// Load, interpolate, parse and validate a configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let interpolated = interpolate_env(content)?;
        let config: PlinyConfig = toml::from_str(&interpolated)?;

        config.validate()?;

        Ok(config)
    }

    /// Validate the configuration for internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        let research = &self.research;

        if research.subtopic_count == 0 {
            return Err(ConfigError::ValidationError(
                "research.subtopic_count must be at least 1".to_string(),
            ));
        }

        for (name, turns) in [
            ("plan_max_turns", research.plan_max_turns),
            ("research_max_turns", research.research_max_turns),
            ("synthesis_max_turns", research.synthesis_max_turns),
        ] {
            if turns == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "research.{} must be at least 1",
                    name
                )));
            }
        }

        if research.max_concurrent_subtopics == Some(0) {
            return Err(ConfigError::ValidationError(
                "research.max_concurrent_subtopics must be at least 1 when set".to_string(),
            ));
        }

        if self.agents.fast == self.agents.slow {
            return Err(ConfigError::ValidationError(format!(
                "agents.fast and agents.slow must be different backends (both are '{}')",
                self.agents.fast
            )));
        }

        for name in self.backends.keys() {
            if name.parse::<BackendKind>().is_err() {
                return Err(ConfigError::ValidationError(format!(
                    "Unknown backend '{}' in [backends] (expected claude-code, codex or opencode)",
                    name
                )));
            }
        }

        Ok(())
    }

    /// Validate configuration and collect non-fatal warnings
    pub fn validate_with_warnings(&self) -> Result<Vec<ConfigWarning>, ConfigError> {
        self.validate()?;

        let mut warnings = Vec::new();
        let agents = &self.agents;

        if !LatencyModel::is_known(&agents.fast_model) {
            warnings.push(ConfigWarning {
                kind: ConfigWarningKind::UnknownModel,
                message: format!(
                    "Fast model '{}' has no latency profile; assuming {}",
                    agents.fast_model,
                    LatencyModel::DEFAULT_FAST_LATENCY
                ),
            });
        }

        if let Some(ref model) = agents.slow_model {
            if !LatencyModel::is_known(model) {
                warnings.push(ConfigWarning {
                    kind: ConfigWarningKind::UnknownModel,
                    message: format!(
                        "Slow model '{}' has no latency profile; assuming {}",
                        model,
                        LatencyModel::DEFAULT_SLOW_LATENCY
                    ),
                });
            }
        }

        if let Some(ref effort) = agents.slow_effort {
            if agents.effort().is_none() {
                warnings.push(ConfigWarning {
                    kind: ConfigWarningKind::UnknownEffort,
                    message: format!(
                        "Effort '{}' is not one of minimal, low, medium, high, xhigh; using the backend default",
                        effort
                    ),
                });
            }
        }

        for kind in [agents.fast, agents.slow] {
            if !kind.is_implemented() {
                warnings.push(ConfigWarning {
                    kind: ConfigWarningKind::UnimplementedBackend,
                    message: format!(
                        "Backend '{}' is not yet implemented; every call to it will fail",
                        kind
                    ),
                });
            }
        }

        Ok(warnings)
    }

    /// Overrides for one backend, if configured
    pub fn backend(&self, kind: BackendKind) -> Option<&BackendConfig> {
        self.backends
            .iter()
            .find(|(name, _)| name.parse::<BackendKind>().ok() == Some(kind))
            .map(|(_, config)| config)
    }
}

/// Replace `${VAR}` with the environment value (empty when unset)
fn interpolate_env(raw: &str) -> Result<String, ConfigError> {
    let pattern = Regex::new(r"\$\{(\w+)\}")
        .map_err(|e| ConfigError::ValidationError(format!("invalid interpolation pattern: {}", e)))?;

    Ok(pattern
        .replace_all(raw, |caps: &Captures| {
            std::env::var(&caps[1]).unwrap_or_default()
        })
        .into_owned())
}

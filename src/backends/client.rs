//! Agent backend abstractions
//!
//! Every research worker implements [`AgentBackend`]: it takes a natural-language
//! prompt plus [`RunOptions`] and settles to either text or a [`BackendError`].
//! The orchestrator never inspects which variant failed; all failures look alike.
//!
//! - **Claude Code**: fast, low-latency backend (planning, research, synthesis)
//! - **Codex**: slow, high-latency backend (cross-validation on a prefix of subtopics)
//! - **OpenCode**: placeholder (not yet implemented)

use crate::utils::toml_config::BackendConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

/// Outcome of a single backend dispatch: text on success, a message on failure.
pub type BackendResult = std::result::Result<String, BackendError>;

/// A callable research worker.
///
/// Implementations must tolerate concurrent independent calls; the coordinator
/// dispatches to the same backend for several subtopics at once.
#[async_trait]
pub trait AgentBackend: Send + Sync {
    /// Run a prompt to completion and return the final answer
    async fn run(&self, prompt: &str, options: &RunOptions) -> BackendResult;

    /// Which backend variant this is
    fn kind(&self) -> BackendKind;

    /// Human-readable name used in progress messages and attributions
    fn name(&self) -> &str {
        self.kind().name()
    }
}

/// Failure of a single backend call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{} error: {message}", .backend.name())]
pub struct BackendError {
    pub backend: BackendKind,
    pub message: String,
}

impl BackendError {
    pub fn new(backend: BackendKind, message: impl Into<String>) -> Self {
        Self {
            backend,
            message: message.into(),
        }
    }

    /// The call produced no final answer (e.g. it ran out of turns).
    pub fn no_result(backend: BackendKind) -> Self {
        Self::new(backend, format!("{} returned no result", backend.name()))
    }

    pub fn not_implemented(backend: BackendKind) -> Self {
        Self::new(
            backend,
            format!("{} backend is not yet implemented.", backend.name()),
        )
    }
}

/// Reasoning effort tiers, ordered from cheapest to most expensive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningEffort {
    Minimal,
    Low,
    Medium,
    High,
    Xhigh,
}

impl ReasoningEffort {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasoningEffort::Minimal => "minimal",
            ReasoningEffort::Low => "low",
            ReasoningEffort::Medium => "medium",
            ReasoningEffort::High => "high",
            ReasoningEffort::Xhigh => "xhigh",
        }
    }
}

impl fmt::Display for ReasoningEffort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReasoningEffort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "minimal" => Ok(ReasoningEffort::Minimal),
            "low" => Ok(ReasoningEffort::Low),
            "medium" => Ok(ReasoningEffort::Medium),
            "high" => Ok(ReasoningEffort::High),
            "xhigh" => Ok(ReasoningEffort::Xhigh),
            other => Err(format!(
                "unknown reasoning effort '{}' (expected minimal, low, medium, high or xhigh)",
                other
            )),
        }
    }
}

/// File-system access granted to a sandboxed backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SandboxMode {
    #[default]
    ReadOnly,
    WorkspaceWrite,
}

impl SandboxMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SandboxMode::ReadOnly => "read-only",
            SandboxMode::WorkspaceWrite => "workspace-write",
        }
    }
}

/// Per-call options. Each backend honours the fields that apply to it and
/// ignores the rest (Claude Code has no effort knob, Codex has no turn budget).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOptions {
    pub model: Option<String>,
    pub max_turns: Option<u32>,
    pub effort: Option<ReasoningEffort>,
    pub working_dir: Option<PathBuf>,
    pub sandbox: Option<SandboxMode>,
    pub system_prompt: Option<String>,
}

impl RunOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }

    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = Some(max_turns);
        self
    }

    pub fn with_effort(mut self, effort: Option<ReasoningEffort>) -> Self {
        self.effort = effort;
        self
    }

    pub fn with_working_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.working_dir = dir;
        self
    }

    pub fn with_sandbox(mut self, sandbox: SandboxMode) -> Self {
        self.sandbox = Some(sandbox);
        self
    }
}

/// Backend variants known to the orchestrator
///
/// | Backend | Status | Latency | Notes |
/// |---------|--------|---------|-------|
/// | Claude Code | ✅ Full | low | Default fast backend |
/// | Codex | ✅ Full | high | Default slow backend |
/// | OpenCode | ❌ Stub | - | Always reports "not implemented" |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    ClaudeCode,
    Codex,
    #[serde(rename = "opencode")]
    OpenCode,
}

impl BackendKind {
    /// Build the backend for this kind
    ///
    /// Placeholders are still constructed; they fail deterministically on
    /// every call instead of at construction.
    pub fn create_backend(&self, config: &BackendConfig) -> Arc<dyn AgentBackend> {
        match self {
            BackendKind::ClaudeCode => {
                Arc::new(super::claude::ClaudeCodeBackend::from_config(config))
            }
            BackendKind::Codex => Arc::new(super::codex::CodexBackend::from_config(config)),
            BackendKind::OpenCode => Arc::new(super::opencode::OpenCodeBackend),
        }
    }

    /// Check if this backend is fully implemented
    pub fn is_implemented(&self) -> bool {
        matches!(self, BackendKind::ClaudeCode | BackendKind::Codex)
    }

    /// Get a human-readable name for this backend
    pub fn name(&self) -> &'static str {
        match self {
            BackendKind::ClaudeCode => "Claude Code",
            BackendKind::Codex => "Codex",
            BackendKind::OpenCode => "OpenCode",
        }
    }

    /// Identifier used in configuration files
    pub fn id(&self) -> &'static str {
        match self {
            BackendKind::ClaudeCode => "claude-code",
            BackendKind::Codex => "codex",
            BackendKind::OpenCode => "opencode",
        }
    }

    /// Default executable for CLI-driven backends
    pub fn default_binary(&self) -> &'static str {
        match self {
            BackendKind::ClaudeCode => "claude",
            BackendKind::Codex => "codex",
            BackendKind::OpenCode => "opencode",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "claude-code" | "claude" => Ok(BackendKind::ClaudeCode),
            "codex" => Ok(BackendKind::Codex),
            "opencode" => Ok(BackendKind::OpenCode),
            other => Err(format!("unknown backend '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_is_implemented() {
        assert!(BackendKind::ClaudeCode.is_implemented());
        assert!(BackendKind::Codex.is_implemented());
        assert!(!BackendKind::OpenCode.is_implemented());
    }

    #[test]
    fn test_backend_name_and_id() {
        assert_eq!(BackendKind::ClaudeCode.name(), "Claude Code");
        assert_eq!(BackendKind::ClaudeCode.id(), "claude-code");
        assert_eq!(BackendKind::OpenCode.to_string(), "opencode");
    }

    #[test]
    fn test_backend_kind_from_str() {
        assert_eq!("claude".parse::<BackendKind>(), Ok(BackendKind::ClaudeCode));
        assert_eq!("Codex".parse::<BackendKind>(), Ok(BackendKind::Codex));
        assert!("gemini".parse::<BackendKind>().is_err());
    }

    #[test]
    fn test_effort_ordering_and_parsing() {
        assert!(ReasoningEffort::Minimal < ReasoningEffort::Xhigh);
        assert_eq!("HIGH".parse::<ReasoningEffort>(), Ok(ReasoningEffort::High));
        assert!("extreme".parse::<ReasoningEffort>().is_err());
        assert_eq!(ReasoningEffort::Xhigh.to_string(), "xhigh");
    }

    #[test]
    fn test_backend_error_messages() {
        let err = BackendError::not_implemented(BackendKind::OpenCode);
        assert_eq!(
            err.to_string(),
            "OpenCode error: OpenCode backend is not yet implemented."
        );

        let err = BackendError::no_result(BackendKind::ClaudeCode);
        assert!(err.message.contains("returned no result"));
    }

    #[test]
    fn test_run_options_builder() {
        let opts = RunOptions::new()
            .with_model(Some("gpt-5.2".to_string()))
            .with_effort(Some(ReasoningEffort::High))
            .with_max_turns(8)
            .with_sandbox(SandboxMode::ReadOnly);

        assert_eq!(opts.model.as_deref(), Some("gpt-5.2"));
        assert_eq!(opts.max_turns, Some(8));
        assert_eq!(opts.effort, Some(ReasoningEffort::High));
        assert_eq!(opts.sandbox, Some(SandboxMode::ReadOnly));
        assert!(opts.working_dir.is_none());
    }
}

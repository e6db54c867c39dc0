//! Agent Backends
//!
//! A backend is an opaque research worker: it receives a prompt and returns
//! text or a [`BackendError`]. Reasoning, retrieval and tool use all happen
//! inside the backend; the orchestrator only schedules calls.
//!
//! # Architecture
//!
//! - [`AgentBackend`] - The capability every backend implements
//! - [`BackendKind`] - Known variants, used in configuration
//! - [`BackendRegistry`] - Backends constructed once from `pliny.toml`
//!
//! # Supported Backends
//!
//! - `claude-code` - Claude Code CLI (`claude --print`), the fast backend
//! - `codex` - Codex CLI (`codex exec --json`), the slow backend
//! - `opencode` - placeholder that always reports "not implemented"
//!
//! # Example
//!
//! ```rust,ignore
//! use pliny::backends::{BackendKind, BackendRegistry, RunOptions};
//!
//! let registry = BackendRegistry::from_config(&config);
//! let codex = registry.get(BackendKind::Codex)?;
//! let text = codex.run("Compare QUIC and TCP", &RunOptions::default()).await?;
//! ```

/// Core backend trait, options and error types.
pub mod client;
/// Registry of constructed backends.
pub mod registry;

pub mod claude;
pub mod codex;
pub mod opencode;

mod process;

pub use claude::ClaudeCodeBackend;
pub use client::{
    AgentBackend, BackendError, BackendKind, BackendResult, ReasoningEffort, RunOptions,
    SandboxMode,
};
pub use codex::CodexBackend;
pub use opencode::OpenCodeBackend;
pub use registry::BackendRegistry;

//! # Pliny - Multi-Backend Research Orchestrator
//!
//! Pliny researches a topic by splitting it into subtopics, sending every
//! subtopic to a fast agent backend and a latency-proportional share of them
//! to a slow one, and synthesizing all findings into a single report.
//!
//! ## Overview
//!
//! Pliny can be used in three ways:
//!
//! 1. **From the command line** - `pliny research "<topic>"`
//! 2. **As MCP tools** - `pliny mcp` serves `pliny_research`, `pliny_search`
//!    and `pliny_ask_repos` over stdio
//! 3. **As a library** - build a [`ResearchOrchestrator`] over your own backends
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,ignore
//! use pliny::{BackendRegistry, PlinyConfig, ResearchOrchestrator};
//!
//! #[tokio::main]
//! async fn main() -> pliny::Result<()> {
//!     let config = PlinyConfig::load("pliny.toml")?;
//!     let registry = BackendRegistry::from_config(&config);
//!     let orchestrator = ResearchOrchestrator::from_config(&config, &registry)?;
//!
//!     let report = orchestrator.research("impact of WebAssembly on serverless").await?;
//!     println!("{}", report);
//!     Ok(())
//! }
//! ```
//!
//! ### Custom Backends
//!
//! Anything implementing [`AgentBackend`] can take the fast or slow role:
//!
//! ```rust,ignore
//! use pliny::{AgentBackend, ResearchOrchestrator, ResearchSettings};
//! use std::sync::Arc;
//!
//! let orchestrator = ResearchOrchestrator::new(
//!     Arc::new(MyFastBackend::new()),
//!     Arc::new(MySlowBackend::new()),
//!     ResearchSettings::default(),
//! );
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `mcp` | Model Context Protocol server (default) |
//!
//! ## Modules
//!
//! - [`backends`] - Agent backend trait and the Claude Code / Codex / OpenCode variants
//! - [`research`] - Decomposition, allocation, fan-out, aggregation and synthesis
//! - [`cli`] - Command-line parsing and terminal output
//! - [`types`] - Findings, run results and error handling
//! - [`utils`] - `pliny.toml` loading and validation

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

/// Agent backends and their registry.
pub mod backends;
/// Command-line interface.
pub mod cli;
/// Model Context Protocol (MCP) server integration.
#[cfg(feature = "mcp")]
pub mod mcp;
/// Multi-backend research orchestration.
pub mod research;
/// Core types (findings, runs, errors).
pub mod types;
/// Configuration utilities.
pub mod utils;

// Re-export commonly used types
pub use backends::{AgentBackend, BackendError, BackendKind, BackendRegistry, RunOptions};
pub use research::{
    NoopProgress, ProgressSink, ProgressStage, ResearchOrchestrator, ResearchSettings,
};
pub use types::{AppError, FindingEntry, ResearchRun, Result};
pub use utils::toml_config::PlinyConfig;

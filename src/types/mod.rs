use crate::backends::BackendError;
use crate::utils::toml_config::ConfigError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============= Research Types =============

/// Findings for one subtopic, index-aligned with the subtopic list.
///
/// A missing backend result is a normal state: the backend either was not
/// dispatched for this subtopic or its dispatch failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindingEntry {
    pub subtopic: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fast: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slow: Option<String>,
}

impl FindingEntry {
    /// An entry with no results yet.
    pub fn empty(subtopic: impl Into<String>) -> Self {
        Self {
            subtopic: subtopic.into(),
            fast: None,
            slow: None,
        }
    }

    /// True when neither backend produced a result.
    pub fn is_unavailable(&self) -> bool {
        self.fast.is_none() && self.slow.is_none()
    }
}

/// Everything a finished research run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchRun {
    pub run_id: String,
    pub query: String,
    pub subtopics: Vec<String>,
    pub allocation: usize,
    pub findings: Vec<FindingEntry>,
    pub report: String,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
}

/// JSON shape printed by `pliny research --format json`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ResearchResponse {
    pub run_id: String,
    pub query: String,
    pub report: String,
    pub subtopics: Vec<String>,
    pub allocation: usize,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl From<ResearchRun> for ResearchResponse {
    fn from(run: ResearchRun) -> Self {
        Self {
            run_id: run.run_id,
            query: run.query,
            report: run.report,
            subtopics: run.subtopics,
            allocation: run.allocation,
            started_at: run.started_at,
            duration_ms: run.duration_ms,
        }
    }
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Research failed: {0}")]
    Research(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

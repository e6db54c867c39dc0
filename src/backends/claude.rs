//! Claude Code backend
//!
//! Drives the `claude` CLI in non-interactive print mode and reads back the
//! single JSON result object it emits with `--output-format json`.
//!
//! # Example
//!
//! ```rust,ignore
//! use pliny::backends::{AgentBackend, ClaudeCodeBackend, RunOptions};
//!
//! let backend = ClaudeCodeBackend::new("claude");
//! let options = RunOptions::new()
//!     .with_model(Some("claude-opus-4-6".to_string()))
//!     .with_max_turns(3);
//! let text = backend.run("Summarise RFC 9000 in one paragraph", &options).await?;
//! ```

use super::client::{AgentBackend, BackendError, BackendKind, BackendResult, RunOptions};
use super::process::run_with_stdin;
use crate::utils::toml_config::BackendConfig;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

/// Turn budget applied when the caller does not set one
pub const DEFAULT_MAX_TURNS: u32 = 10;

/// Fast, low-latency research backend
pub struct ClaudeCodeBackend {
    binary: String,
    extra_args: Vec<String>,
}

impl ClaudeCodeBackend {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            extra_args: Vec::new(),
        }
    }

    pub fn from_config(config: &BackendConfig) -> Self {
        Self {
            binary: config
                .binary
                .clone()
                .unwrap_or_else(|| BackendKind::ClaudeCode.default_binary().to_string()),
            extra_args: config.extra_args.clone(),
        }
    }

    /// Command-line arguments for one call. The prompt itself goes over stdin.
    fn build_args(&self, options: &RunOptions) -> Vec<String> {
        let mut args = vec![
            "--print".to_string(),
            "--output-format".to_string(),
            "json".to_string(),
            "--max-turns".to_string(),
            options.max_turns.unwrap_or(DEFAULT_MAX_TURNS).to_string(),
            "--permission-mode".to_string(),
            "bypassPermissions".to_string(),
        ];

        if let Some(ref model) = options.model {
            args.push("--model".to_string());
            args.push(model.clone());
        }
        if let Some(ref system) = options.system_prompt {
            args.push("--system-prompt".to_string());
            args.push(system.clone());
        }

        args.extend(self.extra_args.iter().cloned());
        args
    }
}

#[async_trait]
impl AgentBackend for ClaudeCodeBackend {
    async fn run(&self, prompt: &str, options: &RunOptions) -> BackendResult {
        let args = self.build_args(options);
        let output = run_with_stdin(
            BackendKind::ClaudeCode,
            &self.binary,
            &args,
            prompt,
            options.working_dir.as_deref(),
        )
        .await?;

        match find_result_message(&output.stdout) {
            Some(message) => message.into_result(),
            None if !output.status.success() => Err(BackendError::new(
                BackendKind::ClaudeCode,
                output.failure_detail(),
            )),
            None => Err(BackendError::no_result(BackendKind::ClaudeCode)),
        }
    }

    fn kind(&self) -> BackendKind {
        BackendKind::ClaudeCode
    }
}

/// The `type: "result"` message closing a Claude Code run
#[derive(Debug, Deserialize)]
struct ResultMessage {
    #[serde(default)]
    subtype: Option<String>,
    #[serde(default)]
    is_error: bool,
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    errors: Vec<String>,
}

impl ResultMessage {
    fn into_result(self) -> BackendResult {
        let success = self.subtype.as_deref() == Some("success") && !self.is_error;
        if success {
            return self
                .result
                .ok_or_else(|| BackendError::no_result(BackendKind::ClaudeCode));
        }

        if !self.errors.is_empty() {
            return Err(BackendError::new(
                BackendKind::ClaudeCode,
                self.errors.join(", "),
            ));
        }

        let status = self.subtype.unwrap_or_else(|| "unknown".to_string());
        let detail = self.result.filter(|r| !r.trim().is_empty());
        Err(BackendError::new(
            BackendKind::ClaudeCode,
            match detail {
                Some(text) => format!("finished with status '{}': {}", status, text),
                None => format!("finished with status '{}'", status),
            },
        ))
    }
}

/// Locate the result message in CLI output.
///
/// Accepts a single JSON object, a JSON array of messages, or newline-delimited
/// messages; the last `result` message wins.
fn find_result_message(stdout: &str) -> Option<ResultMessage> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return None;
    }

    let candidates: Vec<Value> = match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Array(items)) => items,
        Ok(value) => vec![value],
        Err(_) => trimmed
            .lines()
            .filter_map(|line| serde_json::from_str::<Value>(line.trim()).ok())
            .collect(),
    };

    candidates
        .into_iter()
        .rev()
        .find(|v| v.get("type").and_then(Value::as_str) == Some("result"))
        .and_then(|v| serde_json::from_value(v).ok())
}

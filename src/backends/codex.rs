//! Codex backend
//!
//! Runs `codex exec --json` and folds its JSONL event stream into the final
//! agent message. Reasoning effort and sandbox mode come from [`RunOptions`].

use super::client::{
    AgentBackend, BackendError, BackendKind, BackendResult, RunOptions, SandboxMode,
};
use super::process::run_with_stdin;
use crate::utils::toml_config::BackendConfig;
use async_trait::async_trait;
use serde::Deserialize;

/// Slow, high-latency research backend
pub struct CodexBackend {
    binary: String,
    extra_args: Vec<String>,
}

impl CodexBackend {
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
                .unwrap_or_else(|| BackendKind::Codex.default_binary().to_string()),
            extra_args: config.extra_args.clone(),
        }
    }

    fn build_args(&self, options: &RunOptions) -> Vec<String> {
        let sandbox = options.sandbox.unwrap_or_default();
        let mut args = vec![
            "exec".to_string(),
            "--json".to_string(),
            "--skip-git-repo-check".to_string(),
            "--sandbox".to_string(),
            sandbox.as_str().to_string(),
        ];

        if let Some(ref dir) = options.working_dir {
            args.push("--cd".to_string());
            args.push(dir.display().to_string());
        }
        if let Some(ref model) = options.model {
            args.push("--model".to_string());
            args.push(model.clone());
        }
        if let Some(effort) = options.effort {
            args.push("-c".to_string());
            args.push(format!("model_reasoning_effort=\"{}\"", effort));
        }

        args.extend(self.extra_args.iter().cloned());
        // Read the prompt from stdin
        args.push("-".to_string());
        args
    }
}

#[async_trait]
impl AgentBackend for CodexBackend {
    async fn run(&self, prompt: &str, options: &RunOptions) -> BackendResult {
        let args = self.build_args(options);
        let output = run_with_stdin(
            BackendKind::Codex,
            &self.binary,
            &args,
            prompt,
            options.working_dir.as_deref(),
        )
        .await?;

        match fold_events(&output.stdout) {
            Err(e) => Err(e),
            Ok(Some(text)) => Ok(text),
            Ok(None) if !output.status.success() => Err(BackendError::new(
                BackendKind::Codex,
                output.failure_detail(),
            )),
            Ok(None) => Err(BackendError::no_result(BackendKind::Codex)),
        }
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Codex
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ThreadEvent {
    #[serde(rename = "item.completed")]
    ItemCompleted { item: ThreadItem },
    #[serde(rename = "turn.failed")]
    TurnFailed { error: EventError },
    #[serde(rename = "error")]
    Error { message: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct ThreadItem {
    #[serde(rename = "type", alias = "item_type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EventError {
    message: String,
}

/// Fold the event stream: last agent message wins, any failure event aborts.
fn fold_events(stdout: &str) -> Result<Option<String>, BackendError> {
    let mut final_response: Option<String> = None;

    for line in stdout.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let event = match serde_json::from_str::<ThreadEvent>(line) {
            Ok(event) => event,
            Err(e) => {
                tracing::debug!(error = %e, "skipping unparseable codex event");
                continue;
            }
        };

        match event {
            ThreadEvent::ItemCompleted { item }
                if item.kind == "agent_message" || item.kind == "assistant_message" =>
            {
                if let Some(text) = item.text.filter(|t| !t.trim().is_empty()) {
                    final_response = Some(text);
                }
            }
            ThreadEvent::TurnFailed { error } => {
                return Err(BackendError::new(
                    BackendKind::Codex,
                    format!("turn failed: {}", error.message),
                ));
            }
            ThreadEvent::Error { message } => {
                return Err(BackendError::new(
                    BackendKind::Codex,
                    format!("stream error: {}", message),
                ));
            }
            _ => {}
        }
    }

    Ok(final_response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::ReasoningEffort;
    use std::path::PathBuf;

    #[test]
    fn test_last_agent_message_wins() {
        let stdout = r#"{"type":"thread.started","thread_id":"t1"}
{"type":"turn.started"}
{"type":"item.completed","item":{"id":"item_0","type":"reasoning","text":"thinking"}}
{"type":"item.completed","item":{"id":"item_1","type":"agent_message","text":"draft"}}
{"type":"item.completed","item":{"id":"item_2","type":"agent_message","text":"final answer"}}
{"type":"turn.completed","usage":{"input_tokens":10,"output_tokens":5}}
"#;
        assert_eq!(fold_events(stdout), Ok(Some("final answer".to_string())));
    }

    #[test]
    fn test_empty_agent_message_keeps_earlier_answer() {
        let stdout = r#"{"type":"item.completed","item":{"id":"item_1","type":"agent_message","text":"the answer"}}
{"type":"item.completed","item":{"id":"item_2","type":"agent_message","text":"  "}}
{"type":"item.completed","item":{"id":"item_3","type":"agent_message"}}
{"type":"turn.completed"}
"#;
        assert_eq!(fold_events(stdout), Ok(Some("the answer".to_string())));
    }

    #[test]
    fn test_legacy_item_type_field() {
        let stdout = r#"{"type":"item.completed","item":{"id":"0","item_type":"assistant_message","text":"legacy"}}"#;
        assert_eq!(fold_events(stdout), Ok(Some("legacy".to_string())));
    }

    #[test]
    fn test_turn_failed_is_error() {
        let stdout = r#"{"type":"turn.started"}
{"type":"turn.failed","error":{"message":"quota exceeded"}}"#;
        let err = fold_events(stdout).unwrap_err();
        assert_eq!(err.backend, BackendKind::Codex);
        assert!(err.message.contains("quota exceeded"));
    }

    #[test]
    fn test_stream_error_event() {
        let stdout = r#"{"type":"error","message":"stream disconnected"}"#;
        assert!(fold_events(stdout).unwrap_err().message.contains("stream disconnected"));
    }

    #[test]
    fn test_no_agent_message() {
        let stdout = "warning: not json\n{\"type\":\"turn.completed\"}\n";
        assert_eq!(fold_events(stdout), Ok(None));
        assert_eq!(fold_events(""), Ok(None));
    }

    #[test]
    fn test_build_args() {
        let backend = CodexBackend::new("codex");
        let opts = RunOptions::new()
            .with_model(Some("gpt-5.2".to_string()))
            .with_effort(Some(ReasoningEffort::High))
            .with_working_dir(Some(PathBuf::from("/tmp/work")));
        let args = backend.build_args(&opts);

        assert_eq!(args.first().map(String::as_str), Some("exec"));
        assert_eq!(args.last().map(String::as_str), Some("-"));
        assert!(args.windows(2).any(|w| w == ["--sandbox", "read-only"]));
        assert!(args.windows(2).any(|w| w == ["--cd", "/tmp/work"]));
        assert!(args.windows(2).any(|w| w == ["--model", "gpt-5.2"]));
        assert!(args
            .windows(2)
            .any(|w| w == ["-c", "model_reasoning_effort=\"high\""]));
    }

    #[test]
    fn test_build_args_workspace_write() {
        let backend = CodexBackend::new("codex");
        let opts = RunOptions::new().with_sandbox(SandboxMode::WorkspaceWrite);
        let args = backend.build_args(&opts);
        assert!(args.windows(2).any(|w| w == ["--sandbox", "workspace-write"]));
        assert!(!args.contains(&"--model".to_string()));
    }
}

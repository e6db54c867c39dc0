//! Child-process plumbing shared by the CLI-driven backends

use super::client::{BackendError, BackendKind};
use std::io;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Captured result of one backend process
#[derive(Debug)]
pub struct ProcessOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    /// Short failure description: trimmed stderr, or the exit status when stderr is empty
    pub fn failure_detail(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            format!("process exited with {}", self.status)
        } else {
            truncate(stderr, 2000)
        }
    }
}

/// Spawn `binary args...`, feed `prompt` on stdin and wait for it to exit.
///
/// There is no timeout here; a run is bounded by the backend's own turn limit.
pub async fn run_with_stdin(
    backend: BackendKind,
    binary: &str,
    args: &[String],
    prompt: &str,
    working_dir: Option<&Path>,
) -> Result<ProcessOutput, BackendError> {
    let mut cmd = Command::new(binary);
    cmd.args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    if let Some(dir) = working_dir {
        cmd.current_dir(dir);
    }

    tracing::debug!(backend = %backend, binary, ?args, "spawning backend process");

    let mut child = cmd.spawn().map_err(|e| {
        BackendError::new(backend, format!("failed to start '{}': {}", binary, e))
    })?;

    // Feed stdin while collecting output, so a child that exits before reading
    // the whole prompt still reports its own stderr.
    let stdin = child.stdin.take();
    let feed = async move {
        if let Some(mut stdin) = stdin {
            stdin.write_all(prompt.as_bytes()).await?;
            stdin.shutdown().await?;
        }
        Ok::<(), io::Error>(())
    };

    let (fed, output) = tokio::join!(feed, child.wait_with_output());

    let output = output.map_err(|e| {
        BackendError::new(backend, format!("failed waiting for '{}': {}", binary, e))
    })?;

    match fed {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
            tracing::debug!(backend = %backend, "backend process closed stdin before reading the whole prompt");
        }
        Err(e) if output.status.success() => {
            return Err(BackendError::new(
                backend,
                format!("failed to write prompt: {}", e),
            ));
        }
        Err(e) => {
            tracing::debug!(backend = %backend, error = %e, "failed to write prompt");
        }
    }

    Ok(ProcessOutput {
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let head: String = text.chars().take(max_chars).collect();
    format!("{}...[truncated]", head)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_binary_is_backend_error() {
        let result = run_with_stdin(
            BackendKind::Codex,
            "pliny-definitely-not-a-real-binary",
            &[],
            "prompt",
            None,
        )
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.backend, BackendKind::Codex);
        assert!(err.message.contains("failed to start"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_early_exit_reports_stderr_not_broken_pipe() {
        let args = vec![
            "-c".to_string(),
            "echo 'not logged in' >&2; exit 1".to_string(),
        ];
        let prompt = "x".repeat(1024 * 1024);

        let output = run_with_stdin(BackendKind::ClaudeCode, "sh", &args, &prompt, None)
            .await
            .unwrap();

        assert!(!output.status.success());
        assert_eq!(output.failure_detail(), "not logged in");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_prompt_reaches_stdin() {
        let args = vec!["-c".to_string(), "wc -c".to_string()];
        let prompt = "y".repeat(200_000);

        let output = run_with_stdin(BackendKind::Codex, "sh", &args, &prompt, None)
            .await
            .unwrap();

        assert!(output.status.success());
        assert_eq!(output.stdout.trim(), "200000");
    }

    #[test]
    fn test_truncate_keeps_short_text() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc...[truncated]");
    }
}

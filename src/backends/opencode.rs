//! OpenCode backend placeholder
//!
//! # Status
//!
//! **Not yet implemented.** Selecting it is allowed so configurations can name
//! it ahead of time, but every call fails immediately without spawning anything.

use super::client::{AgentBackend, BackendError, BackendKind, BackendResult, RunOptions};
use async_trait::async_trait;

pub struct OpenCodeBackend;

#[async_trait]
impl AgentBackend for OpenCodeBackend {
    async fn run(&self, _prompt: &str, _options: &RunOptions) -> BackendResult {
        Err(BackendError::not_implemented(BackendKind::OpenCode))
    }

    fn kind(&self) -> BackendKind {
        BackendKind::OpenCode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_opencode_always_fails() {
        let backend = OpenCodeBackend;
        let err = backend
            .run("anything", &RunOptions::default())
            .await
            .unwrap_err();

        assert_eq!(err.backend, BackendKind::OpenCode);
        assert!(err.message.contains("not yet implemented"));
        assert_eq!(backend.name(), "OpenCode");
    }
}

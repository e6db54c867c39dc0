use crate::backends::{AgentBackend, BackendResult, RunOptions};
use crate::research::prompts;
use std::sync::Arc;

/// Final merge of all findings into one report.
///
/// The backend's text is returned untouched; a failed call has no fallback.
pub struct Synthesizer {
    backend: Arc<dyn AgentBackend>,
    options: RunOptions,
}

impl Synthesizer {
    pub fn new(backend: Arc<dyn AgentBackend>, options: RunOptions) -> Self {
        Self { backend, options }
    }

    pub async fn synthesize(&self, topic: &str, findings: &str) -> BackendResult {
        let prompt = prompts::synthesis_prompt(topic, findings);
        self.backend.run(&prompt, &self.options).await
    }
}

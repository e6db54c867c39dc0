use crate::backends::{AgentBackend, BackendError, RunOptions};
use crate::research::progress::{preview, ProgressSink, ProgressStage};
use crate::research::prompts;
use crate::types::FindingEntry;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Fans subtopics out to the fast and slow backends.
///
/// Every subtopic goes to the fast backend; the slow backend only sees the
/// first `allocation` subtopics. Each dispatch settles on its own, so one
/// failure never cancels a sibling.
pub struct ResearchCoordinator {
    fast: Arc<dyn AgentBackend>,
    slow: Arc<dyn AgentBackend>,
    fast_options: RunOptions,
    slow_options: RunOptions,
    progress: Arc<dyn ProgressSink>,
    limit: Option<Arc<Semaphore>>,
}

impl ResearchCoordinator {
    pub fn new(
        fast: Arc<dyn AgentBackend>,
        slow: Arc<dyn AgentBackend>,
        fast_options: RunOptions,
        slow_options: RunOptions,
        progress: Arc<dyn ProgressSink>,
    ) -> Self {
        Self {
            fast,
            slow,
            fast_options,
            slow_options,
            progress,
            limit: None,
        }
    }

    /// Bound the number of subtopics in flight at once
    pub fn with_max_concurrent(mut self, max_concurrent: Option<usize>) -> Self {
        self.limit = max_concurrent
            .filter(|n| *n > 0)
            .map(|n| Arc::new(Semaphore::new(n)));
        self
    }

    /// Research every subtopic; returns exactly one entry per subtopic, in order.
    ///
    /// Progress is reported as each fast or slow call settles, not once per
    /// subtopic after both calls are done, so a slow call never delays the
    /// fast call's event.
    pub async fn research(&self, subtopics: &[String], allocation: usize) -> Vec<FindingEntry> {
        let mut findings: Vec<FindingEntry> = subtopics
            .iter()
            .map(|s| FindingEntry::empty(s.as_str()))
            .collect();

        let mut set = JoinSet::new();

        for (index, subtopic) in subtopics.iter().enumerate() {
            let task = SubtopicTask {
                index,
                subtopic: subtopic.clone(),
                fast: Arc::clone(&self.fast),
                slow: (index < allocation).then(|| Arc::clone(&self.slow)),
                fast_options: self.fast_options.clone(),
                slow_options: self.slow_options.clone(),
                progress: Arc::clone(&self.progress),
            };
            let limit = self.limit.clone();

            set.spawn(async move {
                // The semaphore is never closed, so acquisition only fails if it is dropped
                let _permit = match limit {
                    Some(semaphore) => semaphore.acquire_owned().await.ok(),
                    None => None,
                };
                task.run().await
            });
        }

        while let Some(res) = set.join_next().await {
            match res {
                Ok((index, entry)) => {
                    if let Some(slot) = findings.get_mut(index) {
                        *slot = entry;
                    }
                }
                Err(e) => tracing::error!("Subtopic task panicked or was cancelled: {}", e),
            }
        }

        findings
    }
}

/// Everything one spawned subtopic task owns
struct SubtopicTask {
    index: usize,
    subtopic: String,
    fast: Arc<dyn AgentBackend>,
    slow: Option<Arc<dyn AgentBackend>>,
    fast_options: RunOptions,
    slow_options: RunOptions,
    progress: Arc<dyn ProgressSink>,
}

impl SubtopicTask {
    async fn run(self) -> (usize, FindingEntry) {
        let prompt = prompts::research_prompt(&self.subtopic);

        let fast_call = self.dispatch(self.fast.as_ref(), &prompt, &self.fast_options);
        let slow_call = async {
            match &self.slow {
                Some(slow) => Some(self.dispatch(slow.as_ref(), &prompt, &self.slow_options).await),
                None => None,
            }
        };

        let (fast, slow) = tokio::join!(fast_call, slow_call);

        let entry = FindingEntry {
            subtopic: self.subtopic.clone(),
            fast: fast.ok(),
            slow: slow.and_then(|res| res.ok()),
        };

        (self.index, entry)
    }

    async fn dispatch(
        &self,
        backend: &dyn AgentBackend,
        prompt: &str,
        options: &RunOptions,
    ) -> Result<String, BackendError> {
        let result = backend.run(prompt, options).await;
        let number = self.index + 1;

        match &result {
            Ok(_) => self.progress.report(
                ProgressStage::Research,
                &format!(
                    "{} finished subtopic {}: {}",
                    backend.name(),
                    number,
                    preview(&self.subtopic)
                ),
            ),
            Err(e) => {
                tracing::warn!(subtopic = number, backend = backend.name(), "Dispatch failed: {}", e);
                self.progress.report(
                    ProgressStage::Research,
                    &format!(
                        "{} failed subtopic {}: {} ({})",
                        backend.name(),
                        number,
                        preview(&self.subtopic),
                        e.message
                    ),
                );
            }
        }

        result
    }
}

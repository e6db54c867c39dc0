//! Progress reporting side channel
//!
//! Sinks are called synchronously from inside the orchestration, including
//! from concurrently running subtopic tasks, so implementations must be cheap
//! and must never block.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Orchestration stage a progress event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStage {
    Plan,
    Research,
    Synthesize,
}

impl ProgressStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgressStage::Plan => "plan",
            ProgressStage::Research => "research",
            ProgressStage::Synthesize => "synthesize",
        }
    }
}

impl fmt::Display for ProgressStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receiver of progress events
pub trait ProgressSink: Send + Sync {
    fn report(&self, stage: ProgressStage, detail: &str);
}

/// Forwards progress events to `tracing` at info level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn report(&self, stage: ProgressStage, detail: &str) {
        tracing::info!(stage = %stage, "{}", detail);
    }
}

/// Discards progress events
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn report(&self, _stage: ProgressStage, _detail: &str) {}
}

/// Adapts a closure into a [`ProgressSink`]
pub struct FnProgress<F>(F);

impl<F> FnProgress<F>
where
    F: Fn(ProgressStage, &str) + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> ProgressSink for FnProgress<F>
where
    F: Fn(ProgressStage, &str) + Send + Sync,
{
    fn report(&self, stage: ProgressStage, detail: &str) {
        (self.0)(stage, detail)
    }
}

/// First 60 characters of a subtopic, for progress lines
pub(crate) fn preview(subtopic: &str) -> String {
    subtopic.chars().take(60).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_fn_progress_forwards_events() {
        let events = Mutex::new(Vec::new());
        let sink = FnProgress::new(|stage, detail: &str| {
            events.lock().unwrap().push((stage, detail.to_string()));
        });

        sink.report(ProgressStage::Plan, "Decomposing");
        sink.report(ProgressStage::Synthesize, "Writing");
        drop(sink);

        let events = events.into_inner().unwrap();
        assert_eq!(
            events,
            vec![
                (ProgressStage::Plan, "Decomposing".to_string()),
                (ProgressStage::Synthesize, "Writing".to_string()),
            ]
        );
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(ProgressStage::Plan.to_string(), "plan");
        assert_eq!(ProgressStage::Research.as_str(), "research");
        assert_eq!(
            serde_json::to_string(&ProgressStage::Synthesize).unwrap(),
            "\"synthesize\""
        );
    }

    #[test]
    fn test_preview_counts_characters() {
        let long = "é".repeat(100);
        assert_eq!(preview(&long).chars().count(), 60);
        assert_eq!(preview("short"), "short");
    }
}

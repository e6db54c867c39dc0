//! Mock implementations for testing.
//!
//! This module provides a scriptable agent backend that can be shared across
//! test files without spawning real CLIs.

use async_trait::async_trait;
use pliny::backends::{AgentBackend, BackendError, BackendKind, BackendResult, RunOptions};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Substring present in every decomposition prompt
pub const PLAN: &str = "Break the following research topic";
/// Substring present in every synthesis prompt
pub const SYNTHESIS: &str = "research synthesis expert";

/// Substring identifying the research prompt for one subtopic
pub fn subtopic(name: &str) -> String {
    format!("Subtopic: {}", name)
}

enum Reply {
    Text(String),
    Fail(String),
}

struct Rule {
    pattern: String,
    reply: Reply,
}

/// Mock backend with scripted, prompt-matched replies.
///
/// Rules are checked in the order they were added; the first rule whose
/// pattern occurs in the prompt decides the reply. Unmatched prompts get the
/// default reply.
///
/// # Examples
///
/// ```ignore
/// let fast = MockBackend::new(BackendKind::ClaudeCode, "fast text")
///     .on(PLAN, r#"["A", "B"]"#)
///     .fail_on(&subtopic("B"));
///
/// let slow = MockBackend::failing(BackendKind::Codex);
/// ```
pub struct MockBackend {
    kind: BackendKind,
    rules: Vec<Rule>,
    default: Reply,
    delays: Vec<(String, Duration)>,
    calls: Mutex<Vec<(String, RunOptions)>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockBackend {
    /// Create a mock that answers every prompt with `reply`.
    pub fn new(kind: BackendKind, reply: &str) -> Self {
        Self::with_default(kind, Reply::Text(reply.to_string()))
    }

    /// Create a mock that fails every prompt.
    pub fn failing(kind: BackendKind) -> Self {
        Self::with_default(kind, Reply::Fail("Mock backend failure".to_string()))
    }

    fn with_default(kind: BackendKind, default: Reply) -> Self {
        Self {
            kind,
            rules: Vec::new(),
            default,
            delays: Vec::new(),
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Reply with `text` to prompts containing `pattern`.
    pub fn on(mut self, pattern: &str, text: &str) -> Self {
        self.rules.push(Rule {
            pattern: pattern.to_string(),
            reply: Reply::Text(text.to_string()),
        });
        self
    }

    /// Fail prompts containing `pattern`.
    pub fn fail_on(mut self, pattern: &str) -> Self {
        self.rules.push(Rule {
            pattern: pattern.to_string(),
            reply: Reply::Fail(format!("Mock failure for '{}'", pattern)),
        });
        self
    }

    /// Sleep before answering prompts containing `pattern`.
    pub fn delay_on(mut self, pattern: &str, delay: Duration) -> Self {
        self.delays.push((pattern.to_string(), delay));
        self
    }

    /// Sleep before answering every prompt.
    pub fn with_delay(self, delay: Duration) -> Self {
        self.delay_on("", delay)
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Every prompt received, in arrival order.
    pub fn prompts(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(p, _)| p.clone())
            .collect()
    }

    /// Options passed with the first prompt containing `pattern`.
    pub fn options_for(&self, pattern: &str) -> Option<RunOptions> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .find(|(p, _)| p.contains(pattern))
            .map(|(_, o)| o.clone())
    }

    /// Number of prompts containing `pattern`.
    pub fn count(&self, pattern: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| p.contains(pattern))
            .count()
    }

    /// First prompt containing `pattern`.
    pub fn prompt_containing(&self, pattern: &str) -> Option<String> {
        self.prompts().into_iter().find(|p| p.contains(pattern))
    }

    /// Highest number of calls that were running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AgentBackend for MockBackend {
    async fn run(&self, prompt: &str, options: &RunOptions) -> BackendResult {
        self.calls
            .lock()
            .unwrap()
            .push((prompt.to_string(), options.clone()));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some((_, delay)) = self.delays.iter().find(|(p, _)| prompt.contains(p.as_str())) {
            tokio::time::sleep(*delay).await;
        }

        let reply = self
            .rules
            .iter()
            .find(|rule| prompt.contains(rule.pattern.as_str()))
            .map(|rule| &rule.reply)
            .unwrap_or(&self.default);

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match reply {
            Reply::Text(text) => Ok(text.clone()),
            Reply::Fail(message) => Err(BackendError::new(self.kind, message.clone())),
        }
    }

    fn kind(&self) -> BackendKind {
        self.kind
    }
}

//! Topic decomposition
//!
//! The fast backend is asked for a JSON array of subtopics. Extraction is
//! tolerant: anything other than a usable array falls back to researching the
//! topic itself as the only subtopic.

use crate::backends::{AgentBackend, BackendError, RunOptions};
use crate::research::prompts;
use std::sync::Arc;

pub struct TopicDecomposer {
    backend: Arc<dyn AgentBackend>,
    options: RunOptions,
    subtopic_count: usize,
}

impl TopicDecomposer {
    pub fn new(backend: Arc<dyn AgentBackend>, options: RunOptions, subtopic_count: usize) -> Self {
        Self {
            backend,
            options,
            subtopic_count,
        }
    }

    /// Split a topic into an ordered, non-empty list of subtopics.
    ///
    /// Only a failed backend call is an error; unparseable output degrades to
    /// `[topic]`.
    pub async fn decompose(&self, topic: &str) -> Result<Vec<String>, BackendError> {
        let prompt = prompts::decompose_prompt(topic, self.subtopic_count);
        let response = self.backend.run(&prompt, &self.options).await?;

        let subtopics = parse_subtopics(&response, topic);
        tracing::debug!(count = subtopics.len(), "Parsed subtopics");

        Ok(subtopics)
    }
}

/// Extract the first bracketed list of strings from free text.
///
/// Falls back to a single-element list holding `topic` when no list is found,
/// it is not valid JSON, or it holds no non-blank strings. Whitespace inside
/// each entry, newlines included, collapses to single spaces.
pub fn parse_subtopics(text: &str, topic: &str) -> Vec<String> {
    match extract_list(text) {
        Some(subtopics) if !subtopics.is_empty() => subtopics,
        _ => {
            tracing::warn!("Could not parse subtopics, researching the topic as a whole");
            vec![topic.to_string()]
        }
    }
}

fn extract_list(text: &str) -> Option<Vec<String>> {
    let start = text.find('[')?;
    let end = start + text[start..].find(']')?;

    let items: Vec<String> = serde_json::from_str(&text[start..=end]).ok()?;

    Some(
        items
            .into_iter()
            .map(|s| s.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|s| !s.is_empty())
            .collect(),
    )
}

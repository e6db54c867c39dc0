//! Attributed findings text
//!
//! Renders the per-subtopic findings the synthesizer works from. This is the
//! only place an absent backend result becomes visible.

use crate::backends::ReasoningEffort;
use crate::types::FindingEntry;

/// Marker rendered in place of a missing fast-backend result
pub const UNAVAILABLE_MARKER: &str = "(not available)";

const SECTION_SEPARATOR: &str = "\n\n---\n\n";
const HEADING_PREFIX: &str = "### Subtopic ";

/// Who produced each side of a finding
#[derive(Debug, Clone)]
pub struct Attribution {
    pub fast_name: String,
    pub fast_model: String,
    pub slow_name: String,
    pub slow_model: Option<String>,
    pub slow_effort: Option<ReasoningEffort>,
}

impl Attribution {
    fn fast_label(&self) -> String {
        format!("**{} ({}) findings:**", self.fast_name, self.fast_model)
    }

    fn slow_label(&self) -> String {
        format!(
            "**{} ({}, {}) findings:**",
            self.slow_name,
            self.slow_model.as_deref().unwrap_or("default"),
            self.slow_effort.map(|e| e.as_str()).unwrap_or("default")
        )
    }
}

pub struct ResultAggregator {
    attribution: Attribution,
}

impl ResultAggregator {
    pub fn new(attribution: Attribution) -> Self {
        Self { attribution }
    }

    /// Render entries in order, one section per subtopic
    pub fn format(&self, entries: &[FindingEntry]) -> String {
        entries
            .iter()
            .enumerate()
            .map(|(i, entry)| self.format_entry(i + 1, entry))
            .collect::<Vec<_>>()
            .join(SECTION_SEPARATOR)
    }

    fn format_entry(&self, number: usize, entry: &FindingEntry) -> String {
        let mut section = format!(
            "{}{}: {}\n\n{}\n{}",
            HEADING_PREFIX,
            number,
            single_line(&entry.subtopic),
            self.attribution.fast_label(),
            entry
                .fast
                .as_deref()
                .map(escape_headings)
                .unwrap_or_else(|| UNAVAILABLE_MARKER.to_string())
        );

        if let Some(ref slow) = entry.slow {
            section.push_str("\n\n");
            section.push_str(&self.attribution.slow_label());
            section.push('\n');
            section.push_str(&escape_headings(slow));
        }

        section
    }
}

/// Headings are one line; any run of whitespace in a subtopic becomes a single space
fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Indent finding lines that would otherwise read as a subtopic heading
fn escape_headings(body: &str) -> String {
    body.split('\n')
        .map(|line| {
            if line.starts_with(HEADING_PREFIX) {
                format!(" {}", line)
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Recover subtopics, in order, from formatted findings.
///
/// Only unindented headings numbered consecutively from 1 are accepted.
/// Heading-like lines inside findings are indented when formatted.
pub fn subtopic_headings(text: &str) -> Vec<String> {
    let mut headings = Vec::new();

    for line in text.lines() {
        let Some(rest) = line.strip_prefix(HEADING_PREFIX) else {
            continue;
        };
        let Some((number, subtopic)) = rest.split_once(": ") else {
            continue;
        };
        if number.parse::<usize>().ok() == Some(headings.len() + 1) {
            headings.push(subtopic.to_string());
        }
    }

    headings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attribution() -> Attribution {
        Attribution {
            fast_name: "Claude Code".to_string(),
            fast_model: "claude-opus-4-6".to_string(),
            slow_name: "Codex".to_string(),
            slow_model: None,
            slow_effort: Some(ReasoningEffort::High),
        }
    }

    fn entry(subtopic: &str, fast: Option<&str>, slow: Option<&str>) -> FindingEntry {
        FindingEntry {
            subtopic: subtopic.to_string(),
            fast: fast.map(String::from),
            slow: slow.map(String::from),
        }
    }

    #[test]
    fn test_format_with_both_results() {
        let text = ResultAggregator::new(attribution())
            .format(&[entry("A", Some("fast on A"), Some("slow on A"))]);

        assert_eq!(
            text,
            "### Subtopic 1: A\n\n**Claude Code (claude-opus-4-6) findings:**\nfast on A\n\n**Codex (default, high) findings:**\nslow on A"
        );
    }

    #[test]
    fn test_missing_slow_result_has_no_slow_section() {
        let text = ResultAggregator::new(attribution()).format(&[entry("A", Some("fast"), None)]);

        assert!(text.contains("fast"));
        assert!(!text.contains("Codex"));
        assert!(!text.contains(UNAVAILABLE_MARKER));
    }

    #[test]
    fn test_total_failure_renders_marker_only() {
        let text = ResultAggregator::new(attribution()).format(&[
            entry("A", Some("fast A"), None),
            entry("B", None, None),
        ]);

        let sections: Vec<&str> = text.split(SECTION_SEPARATOR).collect();
        assert_eq!(sections.len(), 2);
        assert_eq!(
            sections[1],
            "### Subtopic 2: B\n\n**Claude Code (claude-opus-4-6) findings:**\n(not available)"
        );
    }

    #[test]
    fn test_slow_only_result_still_marks_fast_unavailable() {
        let text = ResultAggregator::new(attribution()).format(&[entry("A", None, Some("slow"))]);
        assert!(text.contains(UNAVAILABLE_MARKER));
        assert!(text.contains("**Codex (default, high) findings:**\nslow"));
    }

    #[test]
    fn test_slow_model_and_unset_effort_labels() {
        let mut attr = attribution();
        attr.slow_model = Some("gpt-5.2".to_string());
        attr.slow_effort = None;

        let text = ResultAggregator::new(attr).format(&[entry("A", Some("f"), Some("s"))]);
        assert!(text.contains("**Codex (gpt-5.2, default) findings:**"));
    }

    #[test]
    fn test_headings_round_trip() {
        let subtopics = ["History of X", "Economics: costs and benefits", "Outlook"];
        let entries: Vec<_> = subtopics
            .iter()
            .enumerate()
            .map(|(i, s)| {
                if i == 1 {
                    entry(s, None, None)
                } else {
                    entry(s, Some("### Subtopic 7: not a heading"), None)
                }
            })
            .collect();

        let text = ResultAggregator::new(attribution()).format(&entries);
        assert_eq!(subtopic_headings(&text), subtopics);
    }

    #[test]
    fn test_heading_like_finding_line_is_not_a_heading() {
        let entries = vec![
            entry("A", Some("### Subtopic 2: Overview\nbody"), None),
            entry("B", Some("fast B"), Some("### Subtopic 3: Elsewhere")),
            entry("C", Some("fast C"), None),
        ];

        let text = ResultAggregator::new(attribution()).format(&entries);
        assert_eq!(subtopic_headings(&text), vec!["A", "B", "C"]);
        assert!(text.contains("\n ### Subtopic 2: Overview\nbody"));
    }

    #[test]
    fn test_multiline_subtopic_stays_on_heading_line() {
        let entries = vec![
            entry("Costs\nand   benefits", Some("fast"), None),
            entry("B", Some("fast"), None),
        ];

        let text = ResultAggregator::new(attribution()).format(&entries);
        assert!(text.starts_with("### Subtopic 1: Costs and benefits\n"));
        assert_eq!(subtopic_headings(&text), vec!["Costs and benefits", "B"]);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(ResultAggregator::new(attribution()).format(&[]), "");
        assert!(subtopic_headings("").is_empty());
    }
}

//! Latency model and work allocation
//!
//! Relative latencies are dimensionless (1.0 is a baseline interactive model).
//! The slow backend is given a latency-proportional prefix of the subtopics so
//! the run finishes close to when the fast backend alone would.

use crate::backends::ReasoningEffort;

/// Relative latency per model identifier
static LATENCY_PROFILES: &[(&str, f64)] = &[
    // Claude
    ("claude-haiku-4-5", 0.5),
    ("claude-sonnet-4-5", 1.0),
    ("claude-opus-4-5", 1.0),
    ("claude-opus-4-6", 1.0),
    // OpenAI / Codex
    ("o4-mini", 3.0),
    ("gpt-5-mini", 4.0),
    ("gpt-5-codex", 8.0),
    ("gpt-5.1-codex", 8.0),
    ("gpt-5.2", 10.0),
    ("gpt-5.2-codex", 10.0),
    ("gpt-5.1-codex-max", 12.0),
];

/// Static latency and effort tables
pub struct LatencyModel;

impl LatencyModel {
    /// Latency assumed for an unknown fast model
    pub const DEFAULT_FAST_LATENCY: f64 = 1.0;
    /// Latency assumed for an unknown or unset slow model
    pub const DEFAULT_SLOW_LATENCY: f64 = 10.0;
    /// Multiplier for an unset effort level
    pub const DEFAULT_EFFORT_MULTIPLIER: f64 = 1.0;

    /// Profiled latency for a model, if it is in the table
    pub fn latency(model: &str) -> Option<f64> {
        LATENCY_PROFILES
            .iter()
            .find(|(id, _)| id.eq_ignore_ascii_case(model.trim()))
            .map(|(_, latency)| *latency)
    }

    pub fn is_known(model: &str) -> bool {
        Self::latency(model).is_some()
    }

    pub fn fast_latency(model: &str) -> f64 {
        Self::latency(model).unwrap_or(Self::DEFAULT_FAST_LATENCY)
    }

    pub fn slow_latency(model: Option<&str>) -> f64 {
        model
            .and_then(Self::latency)
            .unwrap_or(Self::DEFAULT_SLOW_LATENCY)
    }

    pub fn effort_multiplier(effort: Option<ReasoningEffort>) -> f64 {
        match effort {
            Some(ReasoningEffort::Minimal) => 0.25,
            Some(ReasoningEffort::Low) => 0.5,
            Some(ReasoningEffort::Medium) => 1.0,
            Some(ReasoningEffort::High) => 2.0,
            Some(ReasoningEffort::Xhigh) => 3.0,
            None => Self::DEFAULT_EFFORT_MULTIPLIER,
        }
    }
}

/// Number of leading subtopics the slow backend should cover.
///
/// Always in `[1, n]` for `n >= 1`. Unknown models and unset effort fall
/// back to the defaults in [`LatencyModel`].
pub fn allocate(
    n: usize,
    fast_model: &str,
    slow_model: Option<&str>,
    effort: Option<ReasoningEffort>,
) -> usize {
    allocate_by_latency(
        n,
        LatencyModel::fast_latency(fast_model),
        LatencyModel::slow_latency(slow_model),
        LatencyModel::effort_multiplier(effort),
    )
}

/// Allocation from raw latency figures.
///
/// Non-positive or non-finite inputs are replaced by the defaults. An empty
/// subtopic list allocates nothing.
pub fn allocate_by_latency(
    n: usize,
    fast_latency: f64,
    slow_base_latency: f64,
    effort_multiplier: f64,
) -> usize {
    if n == 0 {
        return 0;
    }

    let fast = positive_or(fast_latency, LatencyModel::DEFAULT_FAST_LATENCY);
    let slow = positive_or(slow_base_latency, LatencyModel::DEFAULT_SLOW_LATENCY);
    let multiplier = positive_or(effort_multiplier, LatencyModel::DEFAULT_EFFORT_MULTIPLIER);

    let ratio = fast / (slow * multiplier);
    let count = (n as f64 * ratio).round() as usize;

    count.clamp(1, n)
}

fn positive_or(value: f64, default: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        default
    }
}

//! Multi-Backend Research Orchestration
//!
//! Coordinates a fast and a slow agent backend to research a topic and
//! produce one synthesized report.
//!
//! # Architecture
//!
//! - [`decomposer::TopicDecomposer`] - Splits the topic into subtopics (fast backend)
//! - [`latency`] - Latency tables and the slow-backend allocation
//! - [`coordinator::ResearchCoordinator`] - Concurrent per-subtopic dispatch
//! - [`aggregator::ResultAggregator`] - Attributed, order-preserving findings text
//! - [`synthesizer::Synthesizer`] - Final report (fast backend)
//! - [`orchestrator::ResearchOrchestrator`] - Wires the stages together
//!
//! # Usage
//!
//! ```ignore
//! use pliny::research::ResearchOrchestrator;
//!
//! let orchestrator = ResearchOrchestrator::from_config(&config, &registry)?;
//! let report = orchestrator
//!     .research("What are the latest developments in quantum computing?")
//!     .await?;
//! println!("{}", report);
//! ```
//!
//! # Research Workflow
//!
//! 1. **Plan** - Decompose the topic into subtopics
//! 2. **Allocate** - Decide how many leading subtopics the slow backend covers
//! 3. **Research** - Fan out; failures are recorded, never fatal
//! 4. **Aggregate** - Render findings with attribution and "(not available)" gaps
//! 5. **Synthesize** - One fast-backend call produces the report

pub mod aggregator;
/// Per-subtopic fan-out across fast and slow backends.
pub mod coordinator;
pub mod decomposer;
pub mod latency;
pub mod orchestrator;
pub mod progress;
pub mod prompts;
pub mod synthesizer;

pub use aggregator::{subtopic_headings, Attribution, ResultAggregator, UNAVAILABLE_MARKER};
pub use coordinator::ResearchCoordinator;
pub use decomposer::{parse_subtopics, TopicDecomposer};
pub use latency::{allocate, allocate_by_latency, LatencyModel};
pub use orchestrator::{ResearchOrchestrator, ResearchSettings};
pub use progress::{FnProgress, NoopProgress, ProgressSink, ProgressStage, TracingProgress};
pub use synthesizer::Synthesizer;
pub use crate::utils::toml_config::TotalFailurePolicy;

//! Research orchestrator
//!
//! Wires decomposition, allocation, fan-out, aggregation and synthesis into a
//! single service object. Backends are resolved once, when the orchestrator
//! is constructed, and the orchestrator is shared by reference (`Arc`) with
//! whichever front end serves it.

use crate::backends::{AgentBackend, BackendRegistry, ReasoningEffort, RunOptions, SandboxMode};
use crate::research::aggregator::{Attribution, ResultAggregator};
use crate::research::coordinator::ResearchCoordinator;
use crate::research::decomposer::TopicDecomposer;
use crate::research::latency;
use crate::research::progress::{ProgressSink, ProgressStage, TracingProgress};
use crate::research::synthesizer::Synthesizer;
use crate::types::{AppError, FindingEntry, ResearchRun, Result};
use crate::utils::toml_config::{AgentsConfig, PlinyConfig, ResearchConfig, TotalFailurePolicy};
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

/// Models, budgets and policies for a research run
#[derive(Debug, Clone)]
pub struct ResearchSettings {
    pub fast_model: String,
    pub slow_model: Option<String>,
    pub slow_effort: Option<ReasoningEffort>,
    pub subtopic_count: usize,
    pub plan_max_turns: u32,
    pub research_max_turns: u32,
    pub synthesis_max_turns: u32,
    pub max_concurrent_subtopics: Option<usize>,
    pub on_total_failure: TotalFailurePolicy,
    pub working_dir: Option<PathBuf>,
    pub sandbox: SandboxMode,
}

impl Default for ResearchSettings {
    fn default() -> Self {
        Self::from_parts(&AgentsConfig::default(), &ResearchConfig::default())
    }
}

impl ResearchSettings {
    pub fn from_config(config: &PlinyConfig) -> Self {
        Self::from_parts(&config.agents, &config.research)
    }

    fn from_parts(agents: &AgentsConfig, research: &ResearchConfig) -> Self {
        Self {
            fast_model: agents.fast_model.clone(),
            slow_model: agents.slow_model.clone(),
            slow_effort: agents.effort(),
            subtopic_count: research.subtopic_count,
            plan_max_turns: research.plan_max_turns,
            research_max_turns: research.research_max_turns,
            synthesis_max_turns: research.synthesis_max_turns,
            max_concurrent_subtopics: research.max_concurrent_subtopics,
            on_total_failure: research.on_total_failure,
            working_dir: research.working_dir.clone(),
            sandbox: research.sandbox,
        }
    }

    /// Slow-backend allocation for `n` subtopics under these settings
    pub fn allocation_for(&self, n: usize) -> usize {
        latency::allocate(
            n,
            &self.fast_model,
            self.slow_model.as_deref(),
            self.slow_effort,
        )
    }

    fn fast_options(&self, max_turns: u32) -> RunOptions {
        RunOptions::new()
            .with_model(Some(self.fast_model.clone()))
            .with_max_turns(max_turns)
            .with_working_dir(self.working_dir.clone())
            .with_sandbox(self.sandbox)
    }

    fn slow_options(&self) -> RunOptions {
        RunOptions::new()
            .with_model(self.slow_model.clone())
            .with_max_turns(self.research_max_turns)
            .with_effort(self.slow_effort)
            .with_working_dir(self.working_dir.clone())
            .with_sandbox(self.sandbox)
    }
}

pub struct ResearchOrchestrator {
    fast: Arc<dyn AgentBackend>,
    slow: Arc<dyn AgentBackend>,
    settings: ResearchSettings,
    progress: Arc<dyn ProgressSink>,
}

impl ResearchOrchestrator {
    pub fn new(
        fast: Arc<dyn AgentBackend>,
        slow: Arc<dyn AgentBackend>,
        settings: ResearchSettings,
    ) -> Self {
        Self {
            fast,
            slow,
            settings,
            progress: Arc::new(TracingProgress),
        }
    }

    /// Resolve the configured fast and slow backends from a registry
    pub fn from_config(config: &PlinyConfig, registry: &BackendRegistry) -> Result<Self> {
        let fast = registry.get(config.agents.fast)?;
        let slow = registry.get(config.agents.slow)?;
        Ok(Self::new(fast, slow, ResearchSettings::from_config(config)))
    }

    /// Replace the progress sink (tracing by default)
    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    pub fn settings(&self) -> &ResearchSettings {
        &self.settings
    }

    pub fn fast_backend(&self) -> &dyn AgentBackend {
        self.fast.as_ref()
    }

    pub fn slow_backend(&self) -> &dyn AgentBackend {
        self.slow.as_ref()
    }

    /// Research a topic and return only the report
    pub async fn research(&self, topic: &str) -> Result<String> {
        Ok(self.run(topic).await?.report)
    }

    /// Research a topic end to end
    pub async fn run(&self, topic: &str) -> Result<ResearchRun> {
        let topic = validate_topic(topic)?;
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("research", run_id = %run_id);

        self.plan_and_execute(run_id, topic).instrument(span).await
    }

    async fn plan_and_execute(&self, run_id: Uuid, topic: &str) -> Result<ResearchRun> {
        let started_at = Utc::now();
        let timer = Instant::now();

        self.progress
            .report(ProgressStage::Plan, "Decomposing topic into subtopics...");

        let decomposer = TopicDecomposer::new(
            Arc::clone(&self.fast),
            self.settings.fast_options(self.settings.plan_max_turns),
            self.settings.subtopic_count,
        );
        let subtopics = decomposer.decompose(topic).await?;

        self.progress.report(
            ProgressStage::Plan,
            &format!("Subtopics: {}", subtopics.join(", ")),
        );

        self.execute(run_id, topic, subtopics, started_at, timer).await
    }

    /// Research a topic over caller-supplied subtopics, skipping decomposition.
    ///
    /// An empty list researches the topic itself as the only subtopic.
    pub async fn run_with_subtopics(
        &self,
        topic: &str,
        subtopics: Vec<String>,
    ) -> Result<ResearchRun> {
        let topic = validate_topic(topic)?;
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("research", run_id = %run_id);

        let subtopics: Vec<String> = subtopics
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let subtopics = if subtopics.is_empty() {
            vec![topic.to_string()]
        } else {
            subtopics
        };

        self.execute(run_id, topic, subtopics, Utc::now(), Instant::now())
            .instrument(span)
            .await
    }

    async fn execute(
        &self,
        run_id: Uuid,
        topic: &str,
        subtopics: Vec<String>,
        started_at: chrono::DateTime<Utc>,
        timer: Instant,
    ) -> Result<ResearchRun> {
        let settings = &self.settings;
        let allocation = settings.allocation_for(subtopics.len());

        self.progress.report(
            ProgressStage::Research,
            &format!(
                "Researching {} subtopics with {} + {} ({} of {} cross-checked by {})",
                subtopics.len(),
                self.fast.name(),
                self.slow.name(),
                allocation,
                subtopics.len(),
                self.slow.name()
            ),
        );

        let coordinator = ResearchCoordinator::new(
            Arc::clone(&self.fast),
            Arc::clone(&self.slow),
            settings.fast_options(settings.research_max_turns),
            settings.slow_options(),
            Arc::clone(&self.progress),
        )
        .with_max_concurrent(settings.max_concurrent_subtopics);

        let findings = coordinator.research(&subtopics, allocation).await;
        self.check_total_failures(&findings)?;

        self.progress
            .report(ProgressStage::Synthesize, "Synthesizing findings into report...");

        let aggregator = ResultAggregator::new(Attribution {
            fast_name: self.fast.name().to_string(),
            fast_model: settings.fast_model.clone(),
            slow_name: self.slow.name().to_string(),
            slow_model: settings.slow_model.clone(),
            slow_effort: settings.slow_effort,
        });
        let formatted = aggregator.format(&findings);

        let synthesizer = Synthesizer::new(
            Arc::clone(&self.fast),
            settings.fast_options(settings.synthesis_max_turns),
        );
        let report = synthesizer.synthesize(topic, &formatted).await?;

        let duration_ms = timer.elapsed().as_millis() as u64;
        tracing::info!(
            subtopics = subtopics.len(),
            allocation,
            duration_ms,
            "Research complete"
        );

        Ok(ResearchRun {
            run_id: run_id.to_string(),
            query: topic.to_string(),
            subtopics,
            allocation,
            findings,
            report,
            started_at,
            duration_ms,
        })
    }

    fn check_total_failures(&self, findings: &[FindingEntry]) -> Result<()> {
        let failed: Vec<String> = findings
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.is_unavailable())
            .map(|(i, entry)| format!("{} ({})", i + 1, entry.subtopic))
            .collect();

        if failed.is_empty() {
            return Ok(());
        }

        match self.settings.on_total_failure {
            TotalFailurePolicy::Degrade => {
                tracing::warn!(
                    "No backend produced findings for subtopic(s) {}; continuing",
                    failed.join(", ")
                );
                Ok(())
            }
            TotalFailurePolicy::Abort => Err(AppError::Research(format!(
                "No backend produced findings for subtopic(s) {}",
                failed.join(", ")
            ))),
        }
    }
}

fn validate_topic(topic: &str) -> Result<&str> {
    let trimmed = topic.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidInput(
            "Research topic must not be empty".to_string(),
        ));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_match_config_defaults() {
        let settings = ResearchSettings::default();
        assert_eq!(settings.fast_model, "claude-opus-4-6");
        assert_eq!(settings.slow_effort, Some(ReasoningEffort::High));
        assert_eq!(settings.subtopic_count, 3);
        assert_eq!(settings.on_total_failure, TotalFailurePolicy::Degrade);
        assert_eq!(settings.allocation_for(3), 1);
    }

    #[test]
    fn test_slow_options_carry_effort_and_sandbox() {
        let settings = ResearchSettings {
            slow_model: Some("gpt-5.2".to_string()),
            slow_effort: Some(ReasoningEffort::Low),
            sandbox: SandboxMode::WorkspaceWrite,
            ..ResearchSettings::default()
        };

        let options = settings.slow_options();
        assert_eq!(options.model.as_deref(), Some("gpt-5.2"));
        assert_eq!(options.effort, Some(ReasoningEffort::Low));
        assert_eq!(options.sandbox, Some(SandboxMode::WorkspaceWrite));

        let fast = settings.fast_options(3);
        assert_eq!(fast.model.as_deref(), Some("claude-opus-4-6"));
        assert_eq!(fast.max_turns, Some(3));
        assert_eq!(fast.effort, None);
    }

    #[test]
    fn test_blank_topic_rejected() {
        assert!(matches!(
            validate_topic("   \n"),
            Err(AppError::InvalidInput(_))
        ));
        assert_eq!(validate_topic("  impact of X ").unwrap(), "impact of X");
    }
}

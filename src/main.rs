//! Pliny CLI Entry Point
//!
//! - `pliny research <query>` - Research a topic and print the report
//! - `pliny mcp` - Serve research as MCP tools over stdio
//! - `pliny init [path]` - Scaffold pliny.toml
//! - `pliny config` - Show or validate the effective configuration

use clap::Parser;
use owo_colors::OwoColorize;
use pliny::cli::init::{self, InitConfig, InitResult};
use pliny::cli::output::{CliProgress, Output};
use pliny::cli::{query_text, Cli, Commands, OutputFormat};
use pliny::research::latency::LatencyModel;
use pliny::types::ResearchResponse;
use pliny::utils::toml_config::{ConfigError, GeneralConfig, LogFormat};
use pliny::{AppError, BackendRegistry, PlinyConfig, ResearchOrchestrator, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    match cli.command {
        Commands::Init { path, force } => {
            init_tracing(&GeneralConfig::default(), cli.verbose);
            match init::run(InitConfig { path, force }, &output) {
                InitResult::Success => Ok(()),
                InitResult::AlreadyExists => Err(AppError::InvalidInput(format!(
                    "{} already exists (use --force to overwrite)",
                    init::CONFIG_FILE_NAME
                ))),
                InitResult::Error(e) => Err(AppError::Internal(e)),
            }
        }

        Commands::Config { validate } => {
            let config = load_config(&cli.config, &output)?;
            init_tracing(&config.general, cli.verbose);
            show_config(&config, &cli.config, validate, &output)
        }

        Commands::Research {
            query,
            format,
            output: path,
        } => {
            let config = load_config(&cli.config, &output)?;
            init_tracing(&config.general, cli.verbose);
            research(&config, &query_text(&query), format, path, &output).await
        }

        Commands::Mcp => {
            let config = load_config(&cli.config, &output)?;
            init_tracing(&config.general, cli.verbose);
            serve_mcp(&config).await
        }
    }
}

/// Logs always go to stderr; stdout carries the report or the MCP stream
fn init_tracing(general: &GeneralConfig, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&general.log_level))
    };

    let registry = tracing_subscriber::registry().with(filter);
    let result = match general.log_format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init(),
    };

    if let Err(e) = result {
        eprintln!("Failed to initialize logging: {}", e);
    }
}

fn load_config(path: &Path, output: &Output) -> Result<PlinyConfig> {
    match PlinyConfig::load(path) {
        Ok(config) => Ok(config),
        Err(ConfigError::FileNotFound(p)) => {
            output.hint("Create one with `pliny init`, or point --config / PLINY_CONFIG at it");
            Err(ConfigError::FileNotFound(p).into())
        }
        Err(e) => Err(e.into()),
    }
}

fn build_orchestrator(config: &PlinyConfig) -> Result<ResearchOrchestrator> {
    for warning in config.validate_with_warnings()? {
        tracing::warn!("{}", warning);
    }

    let registry = BackendRegistry::from_config(config);
    ResearchOrchestrator::from_config(config, &registry)
}

async fn research(
    config: &PlinyConfig,
    query: &str,
    format: OutputFormat,
    path: Option<PathBuf>,
    output: &Output,
) -> Result<()> {
    let orchestrator =
        build_orchestrator(config)?.with_progress(Arc::new(CliProgress::new(*output)));

    output.progress("plan", &format!("Researching: {}", query));
    output.progress("plan", &agent_summary(&orchestrator));

    let run = orchestrator.run(query).await?;

    let rendered = match format {
        OutputFormat::Markdown => run.report,
        OutputFormat::Json => serde_json::to_string_pretty(&ResearchResponse::from(run))
            .map_err(|e| AppError::Internal(format!("Failed to serialize result: {}", e)))?,
    };

    match path {
        Some(path) => {
            tokio::fs::write(&path, rendered).await?;
            output.success(&format!("Report written to {}", path.display()));
        }
        None => println!("{}", rendered),
    }

    Ok(())
}

fn agent_summary(orchestrator: &ResearchOrchestrator) -> String {
    let settings = orchestrator.settings();
    format!(
        "Agents: {} ({}) + {} ({}, {})",
        orchestrator.fast_backend().name(),
        settings.fast_model,
        orchestrator.slow_backend().name(),
        settings.slow_model.as_deref().unwrap_or("default"),
        settings
            .slow_effort
            .map(|e| e.as_str())
            .unwrap_or("default")
    )
}

fn show_config(config: &PlinyConfig, path: &Path, validate: bool, output: &Output) -> Result<()> {
    output.header("Configuration");
    output.kv("File", &path.display().to_string());

    let agents = &config.agents;
    let settings = pliny::ResearchSettings::from_config(config);
    let slow_model = agents.slow_model.as_deref();

    output.header("Agents");
    output.kv(
        "Fast",
        &format!(
            "{} / {} (latency {})",
            agents.fast,
            agents.fast_model,
            LatencyModel::fast_latency(&agents.fast_model)
        ),
    );
    output.kv(
        "Slow",
        &format!(
            "{} / {} (latency {}, effort {})",
            agents.slow,
            slow_model.unwrap_or("default"),
            LatencyModel::slow_latency(slow_model),
            settings
                .slow_effort
                .map(|e| e.as_str())
                .unwrap_or("default")
        ),
    );

    let research = &config.research;
    output.header("Research");
    output.kv("Subtopics", &research.subtopic_count.to_string());
    output.kv(
        "Slow allocation",
        &format!(
            "{} of {}",
            settings.allocation_for(research.subtopic_count),
            research.subtopic_count
        ),
    );
    output.kv(
        "Turns (plan/research/synthesis)",
        &format!(
            "{}/{}/{}",
            research.plan_max_turns, research.research_max_turns, research.synthesis_max_turns
        ),
    );
    output.kv(
        "Max concurrent subtopics",
        &research
            .max_concurrent_subtopics
            .map(|n| n.to_string())
            .unwrap_or_else(|| "unbounded".to_string()),
    );
    output.kv("On total failure", &format!("{:?}", research.on_total_failure).to_lowercase());
    output.kv("Sandbox", research.sandbox.as_str());

    if validate {
        let warnings = config.validate_with_warnings()?;
        output.header("Validation");
        if warnings.is_empty() {
            output.success("Configuration is valid");
        } else {
            for warning in &warnings {
                output.warning(&warning.message);
            }
        }
    }

    Ok(())
}

#[cfg(feature = "mcp")]
async fn serve_mcp(config: &PlinyConfig) -> Result<()> {
    let orchestrator = Arc::new(build_orchestrator(config)?);
    tracing::info!("Starting MCP server on stdio");
    pliny::mcp::start_stdio_server(orchestrator).await
}

#[cfg(not(feature = "mcp"))]
async fn serve_mcp(_config: &PlinyConfig) -> Result<()> {
    Err(AppError::Configuration(
        "pliny was built without the `mcp` feature".to_string(),
    ))
}

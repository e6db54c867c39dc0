//! CLI module for Pliny
//!
//! Provides command-line interface parsing for the `pliny` binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod init;
pub mod output;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Pliny - multi-backend research orchestrator
///
/// Decomposes a topic into subtopics, researches them with a fast and a slow
/// agent backend in parallel, and synthesizes one report.
#[derive(Parser, Debug)]
#[command(
    name = "pliny",
    version,
    about = "Pliny - multi-backend research orchestrator",
    long_about = "Decomposes a research topic into subtopics, researches each one with a fast\n\
                  agent backend (Claude Code) and cross-checks a latency-proportional share with\n\
                  a slow one (Codex), then synthesizes a single markdown report.",
    after_help = "EXAMPLES:\n    \
                  pliny init                                 # Scaffold pliny.toml\n    \
                  pliny research \"impact of X\"               # Report to stdout\n    \
                  pliny research \"impact of X\" -f json       # JSON to stdout\n    \
                  pliny research \"impact of X\" -o report.md  # Report to a file\n    \
                  pliny mcp                                  # Serve as MCP tools over stdio"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(
        short,
        long,
        env = "PLINY_CONFIG",
        default_value = "pliny.toml",
        global = true
    )]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Research a topic and print the synthesized report
    Research {
        /// The research topic or question
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Markdown)]
        format: OutputFormat,

        /// Write the result to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Serve research as MCP tools over stdio
    Mcp,

    /// Create a pliny.toml with default settings
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite an existing pliny.toml
        #[arg(short, long)]
        force: bool,
    },

    /// Show the effective configuration
    Config {
        /// Validate the configuration and list warnings
        #[arg(long)]
        validate: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Markdown,
    Json,
}

/// Research query words joined into one topic
pub fn query_text(query: &[String]) -> String {
    query.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_research() {
        let cli = Cli::try_parse_from([
            "pliny", "research", "impact", "of", "X", "--format", "json", "--no-color",
        ])
        .unwrap();

        assert!(cli.no_color);
        match cli.command {
            Commands::Research {
                query,
                format,
                output,
            } => {
                assert_eq!(query_text(&query), "impact of X");
                assert_eq!(format, OutputFormat::Json);
                assert!(output.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_research_requires_query() {
        assert!(Cli::try_parse_from(["pliny", "research"]).is_err());
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_from(["pliny", "config", "--validate", "-c", "other.toml"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("other.toml"));
        assert!(matches!(cli.command, Commands::Config { validate: true }));
    }
}

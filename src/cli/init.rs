//! Init command implementation
//!
//! Scaffolds a commented `pliny.toml` with every setting at its default.

use super::output::Output;
use std::fs;
use std::path::PathBuf;

/// File name written by `pliny init`
pub const CONFIG_FILE_NAME: &str = "pliny.toml";

/// Result of the init operation
#[derive(Debug, PartialEq)]
pub enum InitResult {
    /// Initialization completed successfully
    Success,
    /// pliny.toml already exists and --force was not given
    AlreadyExists,
    /// An error occurred during initialization
    Error(String),
}

/// Configuration for the init command
pub struct InitConfig {
    /// Directory to initialize
    pub path: PathBuf,
    /// Overwrite an existing pliny.toml
    pub force: bool,
}

/// Run the init command
pub fn run(config: InitConfig, output: &Output) -> InitResult {
    output.banner();
    output.header("Initializing Pliny");

    let config_path = config.path.join(CONFIG_FILE_NAME);
    if config_path.exists() && !config.force {
        output.warning(&format!("{} already exists!", config_path.display()));
        output.hint("Use --force to overwrite it");
        return InitResult::AlreadyExists;
    }

    if !config.path.exists() {
        if let Err(e) = fs::create_dir_all(&config.path) {
            output.error(&format!("Failed to create {}: {}", config.path.display(), e));
            return InitResult::Error(e.to_string());
        }
    }

    if let Err(e) = fs::write(&config_path, CONFIG_TEMPLATE) {
        output.error(&format!("Failed to write {}: {}", CONFIG_FILE_NAME, e));
        return InitResult::Error(e.to_string());
    }
    output.created("config", &config_path.display().to_string());

    output.header("Next Steps");
    output.info("1. Make sure the backend CLIs are installed and logged in:");
    output.command("claude --version");
    output.command("codex --version");
    output.info("2. Run some research:");
    output.command("pliny research \"impact of WebAssembly on serverless\"");
    output.hint("Serve the same research as MCP tools with `pliny mcp`");

    InitResult::Success
}

pub const CONFIG_TEMPLATE: &str = r#"# Pliny Configuration
# ===================
# Generated by: pliny init
#
# ${VAR} references are replaced with environment variables (a .env file in
# the working directory is loaded first). Unset variables become "".

[general]
# Tracing filter; RUST_LOG takes precedence, --verbose forces "debug"
log_level = "info"
# pretty | json (logs always go to stderr)
log_format = "pretty"

# =============================================================================
# Agents
# =============================================================================
[agents]
# Fast, low-latency backend: plans, researches every subtopic, synthesizes
fast = "claude-code"
fast_model = "claude-opus-4-6"

# Slow, high-latency backend: cross-checks a latency-proportional prefix
slow = "codex"
# slow_model = "gpt-5.2"
# minimal | low | medium | high | xhigh
slow_effort = "high"

# =============================================================================
# Research
# =============================================================================
[research]
subtopic_count = 3
plan_max_turns = 3
research_max_turns = 8
synthesis_max_turns = 5

# Bound on subtopics researched at once (unbounded when unset)
# max_concurrent_subtopics = 4

# degrade: keep going and mark the subtopic "(not available)"
# abort:   fail the run when no backend produced findings for a subtopic
on_total_failure = "degrade"

# Directory the backends run in (defaults to the current directory)
# working_dir = "."

# read-only | workspace-write
sandbox = "read-only"

# =============================================================================
# Backend executables
# =============================================================================
# [backends.claude-code]
# binary = "claude"
# extra_args = []

# [backends.codex]
# binary = "codex"
# extra_args = []
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::toml_config::PlinyConfig;

    #[test]
    fn test_template_is_valid_config() {
        let config = PlinyConfig::from_toml_str(CONFIG_TEMPLATE).unwrap();
        assert_eq!(config.research.subtopic_count, 3);
        assert!(config.validate_with_warnings().unwrap().is_empty());
    }

    #[test]
    fn test_init_writes_config() {
        let dir = tempfile::tempdir().unwrap();
        let result = run(
            InitConfig {
                path: dir.path().to_path_buf(),
                force: false,
            },
            &Output::no_color(),
        );

        assert_eq!(result, InitResult::Success);
        let written = fs::read_to_string(dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(written, CONFIG_TEMPLATE);
    }

    #[test]
    fn test_init_refuses_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "# mine").unwrap();

        let result = run(
            InitConfig {
                path: dir.path().to_path_buf(),
                force: false,
            },
            &Output::no_color(),
        );
        assert_eq!(result, InitResult::AlreadyExists);
        assert_eq!(fs::read_to_string(&path).unwrap(), "# mine");

        let result = run(
            InitConfig {
                path: dir.path().to_path_buf(),
                force: true,
            },
            &Output::no_color(),
        );
        assert_eq!(result, InitResult::Success);
        assert_eq!(fs::read_to_string(&path).unwrap(), CONFIG_TEMPLATE);
    }

    #[test]
    fn test_init_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");

        let result = run(
            InitConfig {
                path: nested.clone(),
                force: false,
            },
            &Output::no_color(),
        );

        assert_eq!(result, InitResult::Success);
        assert!(nested.join(CONFIG_FILE_NAME).exists());
    }
}

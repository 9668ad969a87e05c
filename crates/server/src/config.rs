//! Configuration file support for agentdeck.
//!
//! Loads settings from `~/.agentdeck/config.toml` with the following precedence:
//! CLI arguments > Environment variables > Config file
//!
//! ## Configuration File Format
//!
//! ```toml
//! # ~/.agentdeck/config.toml
//!
//! [agents]
//! dir = "/home/me/agents"
//!
//! [stats]
//! persistence = true
//! file = "/home/me/.agentdeck/agent-stats.json"
//! interval_secs = 300
//!
//! [context]
//! max_entries = 1000
//! ttl_secs = 300
//! cleanup_secs = 300
//!
//! [serve]
//! # Bind address for the JSON dashboard
//! http = "127.0.0.1:8080"
//! ```

use agentdeck_state::env::{
    ENV_AGENT_DIR, ENV_CONTEXT_CLEANUP_SECS, ENV_CONTEXT_MAX_ENTRIES, ENV_CONTEXT_TTL_SECS,
    ENV_STATS_FILE, ENV_STATS_INTERVAL_SECS, ENV_STATS_PERSISTENCE,
};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable read by `serve --http`.
pub const ENV_HTTP_ADDR: &str = "AGENTDECK_HTTP";

/// Top-level configuration structure.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub agents: AgentsConfig,
    #[serde(default)]
    pub stats: StatsConfig,
    #[serde(default)]
    pub context: ContextConfig,
    #[serde(default)]
    pub serve: ServeConfig,
}

#[derive(Debug, Default, Deserialize)]
pub struct AgentsConfig {
    /// Directory scanned for agent markdown files.
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StatsConfig {
    pub persistence: Option<bool>,
    pub file: Option<PathBuf>,
    pub interval_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ContextConfig {
    pub max_entries: Option<usize>,
    pub ttl_secs: Option<u64>,
    pub cleanup_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ServeConfig {
    /// Bind address for the JSON dashboard.
    pub http: Option<String>,
}

/// Loads the configuration file if it exists.
///
/// Returns `Ok(None)` if the file doesn't exist.
/// Returns `Err` if the file exists but fails to parse.
pub fn load_config() -> Result<Option<Config>> {
    match agentdeck_state::config_file() {
        Some(path) => load_config_from(&path),
        None => Ok(None),
    }
}

/// Loads a configuration file from an explicit path.
pub fn load_config_from(path: &Path) -> Result<Option<Config>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let config: Config =
        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;

    tracing::debug!(
        target: "agentdeck::config",
        path = %path.display(),
        "Loaded configuration file"
    );

    Ok(Some(config))
}

/// Applies configuration file settings to environment variables.
///
/// Only sets environment variables that are not already set, preserving
/// the precedence: CLI > ENV > config file.
///
/// This should be called early in the application startup, before
/// parsing CLI arguments.
pub fn apply_config_to_env() {
    match load_config() {
        Ok(Some(config)) => apply(&config),
        Ok(None) => {}
        Err(e) => tracing::warn!(
            target: "agentdeck::config",
            error = %format!("{e:#}"),
            "ignoring unreadable config file"
        ),
    }
}

fn apply(config: &Config) {
    fn set_if_absent(key: &str, value: &str) {
        if std::env::var(key).is_err() {
            std::env::set_var(key, value);
            tracing::trace!(
                target: "agentdeck::config",
                key,
                "Set environment variable from config file"
            );
        }
    }

    if let Some(ref dir) = config.agents.dir {
        set_if_absent(ENV_AGENT_DIR, &dir.to_string_lossy());
    }

    if let Some(enabled) = config.stats.persistence {
        set_if_absent(ENV_STATS_PERSISTENCE, if enabled { "true" } else { "false" });
    }
    if let Some(ref file) = config.stats.file {
        set_if_absent(ENV_STATS_FILE, &file.to_string_lossy());
    }
    if let Some(secs) = config.stats.interval_secs {
        set_if_absent(ENV_STATS_INTERVAL_SECS, &secs.to_string());
    }

    if let Some(max) = config.context.max_entries {
        set_if_absent(ENV_CONTEXT_MAX_ENTRIES, &max.to_string());
    }
    if let Some(secs) = config.context.ttl_secs {
        set_if_absent(ENV_CONTEXT_TTL_SECS, &secs.to_string());
    }
    if let Some(secs) = config.context.cleanup_secs {
        set_if_absent(ENV_CONTEXT_CLEANUP_SECS, &secs.to_string());
    }

    if let Some(ref addr) = config.serve.http {
        set_if_absent(ENV_HTTP_ADDR, addr);
    }
}

//! Manages application state and configuration.
//!
//! This crate provides utilities for:
//! - Reading `AGENTDECK_*` environment variables.
//! - Resolving stats persistence, context cache, and agent directory settings.

pub mod env;
pub mod settings;

pub use env::{
    config_file, env_agent_dir, env_context_cleanup, env_context_max_entries, env_context_ttl,
    env_stats_file, env_stats_interval, env_stats_persistence, home_dir,
};
pub use settings::{agent_dir, CacheSettings, StatsSettings};

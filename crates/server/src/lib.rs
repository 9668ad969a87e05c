//! The agentdeck MCP server.
//!
//! Serves a catalog of specialized agents over MCP (stdio) and records how
//! each agent is used:
//!
//! - [`app`] - the invocation gateway ([`AgentService`])
//! - [`cache`] - bounded, access-expiring store for invocation context
//! - [`scheduler`] - periodic stats persistence and context cleanup
//! - [`handler`] - the rmcp `ServerHandler` with the tool surface
//! - `dashboard_api` - JSON dashboard (feature `http-dashboard`)
//!
//! Binaries call [`run`], which parses the command line and dispatches.

#![deny(unsafe_code)]

pub mod app;
pub mod cache;
pub mod cli;
mod commands;
pub mod config;
#[cfg(feature = "http-dashboard")]
pub mod dashboard_api;
pub mod handler;
pub mod scheduler;
mod tool_schemas;

pub use app::{
    build_guidance, AgentInvocation, AgentResponse, AgentService, InvocationStatus, RankBy,
};
pub use cache::{CacheStatsSnapshot, ContextCache};
pub use scheduler::Scheduler;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

/// Main entry point for the `agentdeck` binary.
///
/// Logs go to stderr; stdout belongs to the MCP transport.
pub fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // Config file values only fill environment variables that are unset, so
    // they rank below both the environment and CLI flags.
    config::apply_config_to_env();

    let cli = Cli::parse();
    match cli.command.unwrap_or(Commands::Serve {
        agent_dir: None,
        stats_file: None,
        no_persist: false,
        #[cfg(feature = "http-dashboard")]
        http: std::env::var(config::ENV_HTTP_ADDR)
            .ok()
            .filter(|s| !s.trim().is_empty()),
    }) {
        Commands::Serve {
            agent_dir,
            stats_file,
            no_persist,
            #[cfg(feature = "http-dashboard")]
            http,
        } => commands::handle_serve_command(
            agent_dir,
            stats_file,
            no_persist,
            #[cfg(feature = "http-dashboard")]
            http,
        ),
        Commands::Agents { query, agent_dir } => commands::handle_agents_command(query, agent_dir),
        Commands::Recommend { task, agent_dir } => {
            commands::handle_recommend_command(task, agent_dir)
        }
        Commands::Stats {
            agent,
            top,
            by,
            stats_file,
        } => commands::handle_stats_command(agent, top, by, stats_file),
        Commands::Report {
            format,
            agent_dir,
            stats_file,
        } => commands::handle_report_command(format, agent_dir, stats_file),
        Commands::ResetStats { stats_file } => commands::handle_reset_stats_command(stats_file),
    }
}

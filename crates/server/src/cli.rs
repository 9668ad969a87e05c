use crate::app::RankBy;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for `report`.
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum ReportFormat {
    /// Human-readable table.
    #[default]
    Text,
    /// The dashboard report as JSON.
    Json,
}

/// Command-line interface for the `agentdeck` application.
#[derive(Debug, Parser)]
#[command(
    name = "agentdeck",
    about = "Specialized-agent catalog served over MCP, with usage statistics"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available `agentdeck` commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Runs as an MCP server over stdio (default).
    Serve {
        /// Directory of agent markdown files (overrides `AGENTDECK_AGENT_DIR`).
        #[arg(long, value_name = "DIR")]
        agent_dir: Option<PathBuf>,
        /// Stats snapshot file (overrides `AGENTDECK_STATS_FILE`).
        #[arg(long, value_name = "FILE")]
        stats_file: Option<PathBuf>,
        /// Keep statistics in memory only.
        #[arg(long, default_value_t = false)]
        no_persist: bool,
        #[cfg(feature = "http-dashboard")]
        /// Also serve the JSON dashboard on this address (e.g. 127.0.0.1:8080).
        #[arg(long, env = "AGENTDECK_HTTP", value_name = "ADDR")]
        http: Option<String>,
    },
    /// Lists catalog agents, optionally filtered by a search query.
    #[command(alias = "list")]
    Agents {
        /// Case-insensitive text matched against name, description, and prompt.
        #[arg(long, short)]
        query: Option<String>,
        /// Directory of agent markdown files.
        #[arg(long, value_name = "DIR")]
        agent_dir: Option<PathBuf>,
    },
    /// Recommends up to three agents for a task description.
    Recommend {
        /// Task description.
        #[arg(required = true)]
        task: Vec<String>,
        /// Directory of agent markdown files.
        #[arg(long, value_name = "DIR")]
        agent_dir: Option<PathBuf>,
    },
    /// Prints persisted usage statistics.
    Stats {
        /// Show a single agent.
        #[arg(long, value_name = "NAME")]
        agent: Option<String>,
        /// Show the top N agents instead of the summary.
        #[arg(long, value_name = "N")]
        top: Option<usize>,
        /// Ranking used with `--top`.
        #[arg(long, value_enum, default_value_t = RankBy::Usage)]
        by: RankBy,
        /// Stats snapshot file.
        #[arg(long, value_name = "FILE")]
        stats_file: Option<PathBuf>,
    },
    /// Prints the catalog joined with persisted usage statistics.
    Report {
        #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
        /// Directory of agent markdown files.
        #[arg(long, value_name = "DIR")]
        agent_dir: Option<PathBuf>,
        /// Stats snapshot file.
        #[arg(long, value_name = "FILE")]
        stats_file: Option<PathBuf>,
    },
    /// Clears persisted usage statistics.
    ResetStats {
        /// Stats snapshot file.
        #[arg(long, value_name = "FILE")]
        stats_file: Option<PathBuf>,
    },
}

//! CLI command handlers for the agentdeck application.

mod agents;
mod recommend;
mod report;
mod reset;
mod serve;
mod stats;

pub(crate) use agents::handle_agents_command;
pub(crate) use recommend::handle_recommend_command;
pub(crate) use report::handle_report_command;
pub(crate) use reset::handle_reset_stats_command;
pub(crate) use serve::handle_serve_command;
pub(crate) use stats::handle_stats_command;

use agentdeck_discovery::{load_catalog, AgentCatalog};
use agentdeck_metrics::StatsService;
use agentdeck_state::StatsSettings;
use std::path::PathBuf;

/// Catalog from `--agent-dir`, falling back to `AGENTDECK_AGENT_DIR` and
/// then `./agents`.
fn catalog_from(agent_dir: Option<PathBuf>) -> AgentCatalog {
    let dir = agent_dir.unwrap_or_else(agentdeck_state::agent_dir);
    load_catalog(&dir)
}

/// Settings for the one-shot commands that inspect the snapshot file.
///
/// These always read the file, even when the server itself is configured
/// to run in memory.
fn offline_settings(stats_file: Option<PathBuf>) -> StatsSettings {
    let mut settings = StatsSettings::from_env();
    settings.persistence_enabled = true;
    if let Some(file) = stats_file {
        settings.file_path = file;
    }
    settings
}

/// Stats loaded from the snapshot file.
fn offline_stats(stats_file: Option<PathBuf>) -> StatsService {
    let stats = StatsService::from_settings(offline_settings(stats_file));
    stats.initialize();
    stats
}

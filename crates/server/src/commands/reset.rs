//! Handler for the `reset-stats` command.

use super::offline_stats;
use anyhow::{Context, Result};
use std::path::PathBuf;

pub(crate) fn handle_reset_stats_command(stats_file: Option<PathBuf>) -> Result<()> {
    let stats = offline_stats(stats_file);
    let cleared = stats.get_total_invocations();
    stats.clear_all_stats();
    stats.scheduled_persistence().with_context(|| {
        format!(
            "failed to write {}",
            stats.settings().file_path.display()
        )
    })?;
    println!(
        "Cleared {cleared} recorded invocations in {}",
        stats.settings().file_path.display()
    );
    Ok(())
}

//! Handler for the `report` command.

use super::{catalog_from, offline_stats};
use crate::cli::ReportFormat;
use anyhow::Result;
use std::path::PathBuf;

pub(crate) fn handle_report_command(
    format: ReportFormat,
    agent_dir: Option<PathBuf>,
    stats_file: Option<PathBuf>,
) -> Result<()> {
    let catalog = catalog_from(agent_dir);
    let stats = offline_stats(stats_file);
    let report = stats.generate_dashboard_report(&catalog.entries());
    match format {
        ReportFormat::Text => print!("{report}"),
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

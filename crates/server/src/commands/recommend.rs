//! Handler for the `recommend` command.

use super::catalog_from;
use anyhow::{bail, Result};
use std::path::PathBuf;

pub(crate) fn handle_recommend_command(task: Vec<String>, agent_dir: Option<PathBuf>) -> Result<()> {
    let task = task.join(" ");
    if task.trim().is_empty() {
        bail!("task description cannot be blank");
    }
    let catalog = catalog_from(agent_dir);
    let picks = catalog.recommend(&task);
    if picks.is_empty() {
        println!("No agents available.");
        return Ok(());
    }
    println!("Recommended agents for: {task}");
    for (i, agent) in picks.iter().enumerate() {
        println!("{}. {} - {}", i + 1, agent.name, agent.description);
    }
    Ok(())
}

//! Handler for the `agents` command.

use super::catalog_from;
use agentdeck_discovery::AgentProfile;
use anyhow::Result;
use std::fmt::Write as _;
use std::path::PathBuf;

pub(crate) fn handle_agents_command(query: Option<String>, agent_dir: Option<PathBuf>) -> Result<()> {
    let catalog = catalog_from(agent_dir);
    let agents: Vec<&AgentProfile> = match query.as_deref() {
        Some(q) => catalog.find(q),
        None => catalog.all().iter().collect(),
    };
    print!("{}", render_agents(&agents, query.as_deref()));
    Ok(())
}

fn render_agents(agents: &[&AgentProfile], query: Option<&str>) -> String {
    if agents.is_empty() {
        return match query {
            Some(q) => format!("No agents match '{q}'.\n"),
            None => "No agents found.\n".to_string(),
        };
    }
    let width = agents.iter().map(|a| a.name.len()).max().unwrap_or(0);
    let mut out = String::new();
    for agent in agents {
        let _ = writeln!(out, "{:<width$}  {}", agent.name, agent.description);
    }
    out
}

use serde::{Deserialize, Serialize};
use std::fmt;
use time::OffsetDateTime;

/// One catalog agent joined with its statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentUsageStats {
    pub agent_name: String,
    pub description: String,
    pub invocation_count: u64,
    pub success_count: u64,
    pub success_rate: f64,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_used: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub first_used: Option<OffsetDateTime>,
}

/// Catalog-wide usage view built from a single stats snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardReport {
    /// One row per catalog agent, in catalog order.
    pub usage_stats: Vec<AgentUsageStats>,
    pub total_invocations: u64,
    /// Catalog agents with at least one invocation.
    pub active_agents: usize,
    /// Mean success rate over active agents.
    pub overall_success_rate: f64,
}

impl fmt::Display for DashboardReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Total invocations: {}  Active agents: {}/{}  Overall success rate: {:.1}%",
            self.total_invocations,
            self.active_agents,
            self.usage_stats.len(),
            self.overall_success_rate
        )?;
        let width = self
            .usage_stats
            .iter()
            .map(|row| row.agent_name.len())
            .max()
            .unwrap_or(0)
            .max("AGENT".len());
        writeln!(
            f,
            "{:<width$}  {:>8}  {:>8}  {:>7}",
            "AGENT", "CALLS", "SUCCESS", "RATE"
        )?;
        for row in &self.usage_stats {
            writeln!(
                f,
                "{:<width$}  {:>8}  {:>8}  {:>6.1}%",
                row.agent_name, row.invocation_count, row.success_count, row.success_rate
            )?;
        }
        Ok(())
    }
}

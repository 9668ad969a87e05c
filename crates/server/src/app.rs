//! The invocation gateway: catalog queries, agent invocation, and the
//! bookkeeping (stats, stored context) that goes with each call.

use crate::cache::ContextCache;
use agentdeck_discovery::{approaches, AgentCatalog, AgentProfile};
use agentdeck_metrics::{DashboardReport, StatEntry, StatsService};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Instant;

/// Arguments of an `invoke_agent` call.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AgentInvocation {
    #[serde(default, alias = "agentName")]
    pub agent_name: String,
    #[serde(default)]
    pub task: String,
    #[serde(default)]
    pub context: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvocationStatus {
    Success,
    Error,
}

/// Result of an invocation. Errors are reported in-band through `status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentResponse {
    pub agent_name: String,
    pub model: String,
    pub content: String,
    pub status: InvocationStatus,
    /// Key under which the invocation context was stored, on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_key: Option<String>,
}

impl AgentResponse {
    fn error(agent_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            agent_name: agent_name.into(),
            model: "unknown".into(),
            content: content.into(),
            status: InvocationStatus::Error,
            context_key: None,
        }
    }
}

/// Ordering used by top-agent queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankBy {
    /// Most invocations first.
    #[default]
    Usage,
    /// Highest success rate first (invoked agents only).
    Success,
    /// Most recently used first.
    Recent,
}

impl std::str::FromStr for RankBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "usage" | "used" | "most-used" => Ok(RankBy::Usage),
            "success" | "success-rate" => Ok(RankBy::Success),
            "recent" | "recently-used" => Ok(RankBy::Recent),
            other => Err(format!(
                "unknown ranking '{other}' (expected usage, success, or recent)"
            )),
        }
    }
}

/// Serves the agent catalog and records what callers do with it.
#[derive(Debug, Clone)]
pub struct AgentService {
    catalog: Arc<AgentCatalog>,
    stats: Arc<StatsService>,
    contexts: Arc<ContextCache>,
}

impl AgentService {
    pub fn new(
        catalog: Arc<AgentCatalog>,
        stats: Arc<StatsService>,
        contexts: Arc<ContextCache>,
    ) -> Self {
        Self {
            catalog,
            stats,
            contexts,
        }
    }

    pub fn catalog(&self) -> &AgentCatalog {
        &self.catalog
    }

    pub fn stats(&self) -> &Arc<StatsService> {
        &self.stats
    }

    pub fn contexts(&self) -> &Arc<ContextCache> {
        &self.contexts
    }

    /// Produce task guidance from an agent.
    ///
    /// Validation failures and unknown agents come back as error responses;
    /// every call with a non-blank agent name is recorded in the stats.
    pub fn invoke_agent(&self, invocation: AgentInvocation) -> AgentResponse {
        let started = Instant::now();
        let agent_name = invocation.agent_name.trim();

        if agent_name.is_empty() {
            return AgentResponse::error("unknown", "Error: Agent name cannot be blank");
        }

        if invocation.task.trim().is_empty() {
            self.record(agent_name, false, started);
            return AgentResponse::error(agent_name, "Error: Task description cannot be blank");
        }

        let Some(agent) = self.catalog.get(agent_name) else {
            tracing::debug!(target: "agentdeck::invoke", agent = agent_name, "unknown agent");
            self.record(agent_name, false, started);
            return AgentResponse::error(
                agent_name,
                format!(
                    "Error: Agent '{agent_name}' not found. Use get_agents to see available agents."
                ),
            );
        };

        tracing::info!(
            target: "agentdeck::invoke",
            agent = agent_name,
            task = %invocation.task,
            "invoking agent"
        );

        let context = invocation.context.unwrap_or_default();
        let context_key = self.contexts.next_key(&agent.name);
        self.contexts.put(context_key.clone(), context.clone());

        let content = build_guidance(agent, &invocation.task, &context);
        self.record(&agent.name, true, started);

        AgentResponse {
            agent_name: agent.name.clone(),
            model: agent.model.clone(),
            content,
            status: InvocationStatus::Success,
            context_key: Some(context_key),
        }
    }

    fn record(&self, agent_name: &str, success: bool, started: Instant) {
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.stats.record_invocation(agent_name, success, elapsed_ms);
    }

    /// Context stored by an earlier successful invocation, if still cached.
    pub fn stored_context(&self, context_key: &str) -> Option<String> {
        self.contexts.get(context_key)
    }

    pub fn find_agents(&self, query: &str) -> Vec<&AgentProfile> {
        self.catalog.find(query)
    }

    pub fn recommend_agents(&self, task: &str) -> Vec<&AgentProfile> {
        self.catalog.recommend(task)
    }

    pub fn top_agents(&self, limit: usize, by: RankBy) -> Vec<StatEntry> {
        match by {
            RankBy::Usage => self.stats.get_most_used_agents(limit),
            RankBy::Success => self.stats.get_highest_success_rate_agents(limit),
            RankBy::Recent => self.stats.get_recently_used_agents(limit),
        }
    }

    pub fn dashboard_report(&self) -> DashboardReport {
        self.stats.generate_dashboard_report(&self.catalog.entries())
    }
}

/// Markdown guidance for `agent` working on `task`.
pub fn build_guidance(agent: &AgentProfile, task: &str, context: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "## {} SPECIALIST", agent.name.to_uppercase());
    let _ = writeln!(out, "> {}\n", agent.description);

    out.push_str("### Task Analysis\n");
    let _ = writeln!(out, "**Objective**: {task}");
    if !context.is_empty() {
        let _ = writeln!(out, "**Context**: {context}");
    }
    out.push('\n');

    out.push_str("### Recommended Approach\n");
    for (i, step) in approaches(agent).iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, step);
    }

    out.push_str("\n### Expert Context\n```\n");
    out.push_str(&agent.system_prompt);
    out.push_str("\n```");
    out
}

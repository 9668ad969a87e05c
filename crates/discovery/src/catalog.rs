//! The in-memory agent catalog: lookup, search, and task recommendation.

use crate::scanner::{default_agents, discover_agents};
use crate::types::AgentProfile;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Maximum number of agents returned by [`AgentCatalog::recommend`].
pub const MAX_RECOMMENDATIONS: usize = 3;

/// Agents recommended when no keyword group matches a task.
const VERSATILE_AGENTS: &[&str] = &["ai-engineer", "backend-architect", "code-reviewer"];

/// A keyword group: if the task mentions any keyword, the first agent whose
/// name contains any of the fragments is recommended.
struct KeywordGroup {
    keywords: &'static [&'static str],
    fragments: &'static [&'static str],
}

const KEYWORD_GROUPS: &[KeywordGroup] = &[
    KeywordGroup {
        keywords: &["api", "backend", "database"],
        fragments: &["backend", "architect"],
    },
    KeywordGroup {
        keywords: &["ui", "frontend", "react"],
        fragments: &["frontend"],
    },
    KeywordGroup {
        keywords: &["ai", "llm", "rag"],
        fragments: &["ai-engineer"],
    },
    KeywordGroup {
        keywords: &["review", "security", "audit"],
        fragments: &["code-reviewer", "security"],
    },
    KeywordGroup {
        keywords: &["bug", "debug", "error"],
        fragments: &["debugger"],
    },
    KeywordGroup {
        keywords: &[
            "requirements",
            "ticket",
            "story",
            "planning",
            "breakdown",
            "epic",
            "project management",
            "acceptance criteria",
        ],
        fragments: &["requirements-analyst"],
    },
];

/// Name and description of a catalog agent, in catalog order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogAgent {
    /// Agent name.
    pub name: String,
    /// Listing description.
    pub description: String,
}

/// Immutable set of agent profiles loaded at startup.
#[derive(Debug, Clone, Default)]
pub struct AgentCatalog {
    agents: Vec<AgentProfile>,
}

impl AgentCatalog {
    /// Wrap an ordered list of profiles.
    pub fn new(agents: Vec<AgentProfile>) -> Self {
        Self { agents }
    }

    /// Catalog containing only the built-in agents.
    pub fn with_defaults() -> Self {
        Self::new(default_agents())
    }

    /// All profiles in catalog order.
    pub fn all(&self) -> &[AgentProfile] {
        &self.agents
    }

    /// Number of agents.
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether the catalog holds no agents.
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Exact-name lookup.
    pub fn get(&self, name: &str) -> Option<&AgentProfile> {
        self.agents.iter().find(|a| a.name == name)
    }

    /// Case-insensitive substring search over name, description, and prompt.
    pub fn find(&self, query: &str) -> Vec<&AgentProfile> {
        let query = query.to_lowercase();
        self.agents
            .iter()
            .filter(|a| {
                a.name.to_lowercase().contains(&query)
                    || a.description.to_lowercase().contains(&query)
                    || a.system_prompt.to_lowercase().contains(&query)
            })
            .collect()
    }

    /// Suggest up to three agents for a task description.
    ///
    /// Each keyword group the task mentions contributes the first matching
    /// agent. With no matches, the versatile trio is returned instead.
    pub fn recommend(&self, task: &str) -> Vec<&AgentProfile> {
        let task = task.to_lowercase();
        let mut picked: Vec<&AgentProfile> = Vec::new();

        for group in KEYWORD_GROUPS {
            if !group.keywords.iter().any(|k| task.contains(k)) {
                continue;
            }
            let candidate = self
                .agents
                .iter()
                .find(|a| group.fragments.iter().any(|f| a.name.contains(f)));
            if let Some(agent) = candidate {
                if !picked.iter().any(|p| p.name == agent.name) {
                    picked.push(agent);
                }
            }
        }

        if picked.is_empty() {
            return self
                .agents
                .iter()
                .filter(|a| VERSATILE_AGENTS.iter().any(|v| a.name.contains(v)))
                .take(MAX_RECOMMENDATIONS)
                .collect();
        }

        picked.truncate(MAX_RECOMMENDATIONS);
        picked
    }

    /// Names and descriptions in catalog order.
    pub fn entries(&self) -> Vec<CatalogAgent> {
        self.agents
            .iter()
            .map(|a| CatalogAgent {
                name: a.name.clone(),
                description: a.description.clone(),
            })
            .collect()
    }
}

/// Three guidance lines suited to the agent's domain, chosen by name.
pub fn approaches(agent: &AgentProfile) -> [&'static str; 3] {
    let name = agent.name.as_str();
    if name.contains("backend") || name.contains("architect") {
        [
            "Design clear API contracts and system boundaries",
            "Plan for scalability with caching and data consistency",
            "Implement security patterns (auth, validation, rate limiting)",
        ]
    } else if name.contains("frontend") || name.contains("ui") {
        [
            "Focus on accessibility and responsive design",
            "Optimize state management and component patterns",
            "Ensure Core Web Vitals and comprehensive testing",
        ]
    } else if name.contains("ai") || name.contains("ml") {
        [
            "Design for production scalability and reliability",
            "Include monitoring, evaluation metrics, and observability",
            "Optimize for cost efficiency and resource usage",
        ]
    } else if name.contains("security") || name.contains("audit") {
        [
            "Apply OWASP principles and threat modeling",
            "Implement defense in depth and least privilege",
            "Include compliance and audit trail considerations",
        ]
    } else if name.contains("requirements") || name.contains("analyst") {
        [
            "Break features into actionable user stories with acceptance criteria",
            "Identify dependencies and integration points",
            "Provide estimation guidance and risk assessment",
        ]
    } else {
        [
            "Apply domain-specific best practices",
            "Focus on maintainability and testability",
            "Consider performance and scalability implications",
        ]
    }
}

/// Load agents from `dir`, falling back to the built-in set when the
/// directory is missing, unreadable, or holds no valid agents.
pub fn load_catalog(dir: &Path) -> AgentCatalog {
    match discover_agents(dir) {
        Ok(agents) if !agents.is_empty() => {
            tracing::info!(
                target: "agentdeck::discovery",
                count = agents.len(),
                dir = %dir.display(),
                "loaded agents from directory"
            );
            AgentCatalog::new(agents)
        }
        Ok(_) => {
            tracing::info!(
                target: "agentdeck::discovery",
                dir = %dir.display(),
                "no agents found; using built-in defaults"
            );
            AgentCatalog::with_defaults()
        }
        Err(e) => {
            tracing::warn!(
                target: "agentdeck::discovery",
                dir = %dir.display(),
                error = %e,
                "agent directory scan failed; using built-in defaults"
            );
            AgentCatalog::with_defaults()
        }
    }
}

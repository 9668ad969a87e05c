use serde::{Deserialize, Serialize};

use crate::Result;

/// Model label used when an agent file does not name one.
pub const DEFAULT_MODEL: &str = "mcp-optimized";

/// A parsed agent profile.
///
/// Profiles are read from markdown files: YAML frontmatter carries the
/// metadata and the markdown body becomes the system prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentProfile {
    /// Agent name (from frontmatter, falling back to the file stem).
    pub name: String,
    /// One-line description shown in listings.
    pub description: String,
    /// Model label.
    pub model: String,
    /// Tools the agent expects to use.
    pub tools: Vec<String>,
    /// System prompt content (markdown after frontmatter).
    pub system_prompt: String,
}

impl AgentProfile {
    /// Build a profile with no tools and the default model label.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            model: DEFAULT_MODEL.to_string(),
            tools: Vec::new(),
            system_prompt: system_prompt.into(),
        }
    }
}

/// `tools` may be written as a comma-separated string or as a YAML list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ToolsField {
    List(Vec<String>),
    Csv(String),
}

impl ToolsField {
    fn into_vec(self) -> Vec<String> {
        match self {
            ToolsField::List(items) => items
                .into_iter()
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect(),
            ToolsField::Csv(s) => parse_comma_list(&s),
        }
    }
}

/// Raw YAML frontmatter structure for agent files.
#[derive(Debug, Clone, Default, Deserialize)]
struct RawAgentFrontmatter {
    name: Option<String>,
    description: Option<String>,
    model: Option<String>,
    tools: Option<ToolsField>,
}

/// Split content into frontmatter YAML and body content.
///
/// Returns `None` when there is no opening fence or no closing fence.
fn split_agent_frontmatter(content: &str) -> Option<(String, String)> {
    let trimmed = content.trim_start();

    if !trimmed.starts_with("---") {
        return None;
    }

    let after_open = &trimmed[3..];
    let after_open = after_open.trim_start_matches(['\r', '\n']);

    if let Some(end_pos) = after_open.find("\n---") {
        let yaml = &after_open[..end_pos];
        let rest = &after_open[end_pos + 4..];
        let rest = rest.trim_start_matches(['\r', '\n']);
        Some((yaml.to_string(), rest.to_string()))
    } else if let Some(end_pos) = after_open.find("\r\n---") {
        let yaml = &after_open[..end_pos];
        let rest = &after_open[end_pos + 5..];
        let rest = rest.trim_start_matches(['\r', '\n']);
        Some((yaml.to_string(), rest.to_string()))
    } else {
        None
    }
}

/// Parse comma-separated string into a vector of trimmed strings.
fn parse_comma_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse an agent profile from markdown content.
///
/// Files without a frontmatter block are rejected; `fallback_name` is used
/// when the frontmatter omits `name`.
pub fn parse_agent_markdown(content: &str, fallback_name: &str) -> Result<AgentProfile> {
    let Some((yaml, body)) = split_agent_frontmatter(content) else {
        return Err(anyhow::anyhow!(
            "no frontmatter found in agent file: {fallback_name}"
        ));
    };

    let raw = if yaml.trim().is_empty() {
        RawAgentFrontmatter::default()
    } else {
        serde_yaml::from_str::<RawAgentFrontmatter>(&yaml)
            .map_err(|e| anyhow::anyhow!("Invalid YAML frontmatter: {e}"))?
    };

    Ok(AgentProfile {
        name: non_blank(raw.name).unwrap_or_else(|| fallback_name.to_string()),
        description: non_blank(raw.description).unwrap_or_default(),
        model: non_blank(raw.model).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        tools: raw.tools.map(ToolsField::into_vec).unwrap_or_default(),
        system_prompt: body.trim().to_string(),
    })
}

//! MCP tool definitions for the agent catalog.
//!
//! - Catalog tools: get_agents, find_agents, get_agent_info, get_recommended_agents
//! - Invocation tools: invoke_agent, get_agent_context
//! - Stats tools: get_agent_stats, get_top_agents, get_dashboard

use rmcp::model::{Tool, ToolAnnotations};
use serde_json::{json, Map as JsonMap, Value};
use std::sync::Arc;

type Schema = Arc<JsonMap<String, Value>>;

/// Returns an empty object schema for parameterless tools.
///
/// Some clients reject tool schemas without a JSON Schema "type", so
/// parameterless tools still declare an empty object.
pub(crate) fn empty_schema() -> Schema {
    object_schema(json!({}), &[])
}

fn object_schema(properties: Value, required: &[&str]) -> Schema {
    let mut schema = JsonMap::new();
    schema.insert("type".into(), json!("object"));
    schema.insert("properties".into(), properties);
    if !required.is_empty() {
        schema.insert("required".into(), json!(required));
    }
    schema.insert("additionalProperties".into(), json!(false));
    Arc::new(schema)
}

fn read_only() -> Option<ToolAnnotations> {
    Some(ToolAnnotations {
        read_only_hint: Some(true),
        ..ToolAnnotations::default()
    })
}

fn tool(
    name: &'static str,
    title: &'static str,
    description: &'static str,
    input_schema: Schema,
    annotations: Option<ToolAnnotations>,
) -> Tool {
    Tool {
        name: name.into(),
        title: Some(title.into()),
        description: Some(description.into()),
        input_schema,
        output_schema: None,
        annotations,
        icons: None,
        meta: None,
    }
}

pub(crate) fn catalog_tools() -> Vec<Tool> {
    vec![
        tool(
            "get_agents",
            "List agents",
            "Get all available specialized agents with their descriptions.",
            empty_schema(),
            read_only(),
        ),
        tool(
            "find_agents",
            "Search agents",
            "Find agents whose name, description, or prompt mentions the query (case-insensitive).",
            object_schema(
                json!({
                    "query": {
                        "type": "string",
                        "description": "Text to search for"
                    }
                }),
                &["query"],
            ),
            read_only(),
        ),
        tool(
            "get_agent_info",
            "Describe an agent",
            "Get the full profile of one agent, including its system prompt.",
            object_schema(
                json!({
                    "agent_name": {
                        "type": "string",
                        "description": "Exact agent name"
                    }
                }),
                &["agent_name"],
            ),
            read_only(),
        ),
        tool(
            "get_recommended_agents",
            "Recommend agents",
            "Get 1-3 best agents for your task. More efficient than browsing all agents.",
            object_schema(
                json!({
                    "task": {
                        "type": "string",
                        "description": "Description of the work to be done"
                    }
                }),
                &["task"],
            ),
            read_only(),
        ),
    ]
}

pub(crate) fn invocation_tools() -> Vec<Tool> {
    vec![
        tool(
            "invoke_agent",
            "Invoke an agent",
            "Get concise, task-specific guidance from a specialized agent. The returned context key can be passed to get_agent_context while it is cached.",
            object_schema(
                json!({
                    "agent_name": {
                        "type": "string",
                        "description": "Exact agent name"
                    },
                    "task": {
                        "type": "string",
                        "description": "What the agent should help with"
                    },
                    "context": {
                        "type": "string",
                        "description": "Optional background for the task"
                    }
                }),
                &["agent_name", "task"],
            ),
            Some(ToolAnnotations::default()),
        ),
        tool(
            "get_agent_context",
            "Fetch stored context",
            "Return the context stored by an earlier invoke_agent call, if it has not expired.",
            object_schema(
                json!({
                    "context_key": {
                        "type": "string",
                        "description": "Key returned by invoke_agent"
                    }
                }),
                &["context_key"],
            ),
            read_only(),
        ),
    ]
}

pub(crate) fn stats_tools() -> Vec<Tool> {
    vec![
        tool(
            "get_agent_stats",
            "Agent usage statistics",
            "Usage statistics for one agent, or for every agent when no name is given.",
            object_schema(
                json!({
                    "agent_name": {
                        "type": "string",
                        "description": "Agent to report on (optional)"
                    }
                }),
                &[],
            ),
            read_only(),
        ),
        tool(
            "get_top_agents",
            "Top agents",
            "Rank agents by usage, success rate, or recency.",
            object_schema(
                json!({
                    "limit": {
                        "type": "integer",
                        "minimum": 1,
                        "maximum": 50,
                        "description": "How many agents to return (default 5)"
                    },
                    "by": {
                        "type": "string",
                        "enum": ["usage", "success", "recent"],
                        "description": "Ranking order (default usage)"
                    }
                }),
                &[],
            ),
            read_only(),
        ),
        tool(
            "get_dashboard",
            "Usage dashboard",
            "Every catalog agent joined with its usage statistics, plus overall totals.",
            empty_schema(),
            read_only(),
        ),
    ]
}

/// Every tool the server exposes, in listing order.
pub(crate) fn all_tools() -> Vec<Tool> {
    let mut tools = catalog_tools();
    tools.extend(invocation_tools());
    tools.extend(stats_tools());
    tools
}

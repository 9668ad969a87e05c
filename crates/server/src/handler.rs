//! MCP ServerHandler implementation for AgentService.
//!
//! - `list_tools()` - lists the catalog, invocation, and stats tools
//! - `call_tool()` - dispatches tool calls to the gateway
//!
//! Bad arguments produce an error *result* (`is_error: Some(true)`) so the
//! calling model can correct itself; only an unknown tool name is a protocol
//! error.

use crate::app::{AgentInvocation, AgentService, InvocationStatus, RankBy};
use crate::tool_schemas::all_tools;
use agentdeck_discovery::AgentProfile;
use anyhow::{anyhow, Result};
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, InitializeResult, JsonObject, ListToolsResult,
    PaginatedRequestParam, ServerCapabilities,
};
use rmcp::ServerHandler;
use serde_json::{json, Value};

/// Default and maximum `limit` for `get_top_agents`.
pub(crate) const DEFAULT_TOP_LIMIT: usize = 5;
pub(crate) const MAX_TOP_LIMIT: usize = 50;

fn ok_result(text: impl Into<String>, structured: Value) -> CallToolResult {
    CallToolResult {
        content: vec![Content::text(text.into())],
        structured_content: Some(structured),
        is_error: Some(false),
        meta: None,
    }
}

fn error_result(text: impl Into<String>) -> CallToolResult {
    let text = text.into();
    CallToolResult {
        content: vec![Content::text(text.clone())],
        structured_content: Some(json!({ "error": text })),
        is_error: Some(true),
        meta: None,
    }
}

fn str_arg<'a>(args: Option<&'a JsonObject>, key: &str) -> Option<&'a str> {
    args.and_then(|a| a.get(key))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn agent_summary(agent: &AgentProfile) -> Value {
    json!({ "name": agent.name, "description": agent.description })
}

fn agent_lines(agents: &[&AgentProfile]) -> String {
    agents
        .iter()
        .map(|a| format!("- {}: {}", a.name, a.description))
        .collect::<Vec<_>>()
        .join("\n")
}

impl AgentService {
    fn dispatch(&self, request: &CallToolRequestParam) -> Result<CallToolResult> {
        let args = request.arguments.as_ref();
        tracing::debug!(target: "agentdeck::invoke", tool = %request.name, "tool call");

        match request.name.as_ref() {
            "get_agents" => {
                let agents: Vec<&AgentProfile> = self.catalog().all().iter().collect();
                let text = format!(
                    "{} agents available:\n{}",
                    agents.len(),
                    agent_lines(&agents)
                );
                let list: Vec<Value> = agents.iter().map(|a| agent_summary(a)).collect();
                Ok(ok_result(text, json!({ "agents": list, "count": list.len() })))
            }
            "find_agents" => {
                let Some(query) = str_arg(args, "query") else {
                    return Ok(error_result("find_agents requires a non-empty 'query'"));
                };
                let found = self.find_agents(query);
                let text = if found.is_empty() {
                    format!("No agents match '{query}'")
                } else {
                    agent_lines(&found)
                };
                let list: Vec<Value> = found.iter().map(|a| agent_summary(a)).collect();
                Ok(ok_result(
                    text,
                    json!({ "query": query, "agents": list, "count": list.len() }),
                ))
            }
            "get_agent_info" => {
                let Some(name) = str_arg(args, "agent_name") else {
                    return Ok(error_result("get_agent_info requires 'agent_name'"));
                };
                match self.catalog().get(name) {
                    Some(agent) => Ok(ok_result(
                        format!(
                            "{} ({})\n{}\n\n{}",
                            agent.name, agent.model, agent.description, agent.system_prompt
                        ),
                        json!({ "agent": agent }),
                    )),
                    None => Ok(error_result(format!("Agent '{name}' not found"))),
                }
            }
            "get_recommended_agents" => {
                let Some(task) = str_arg(args, "task") else {
                    return Ok(error_result("get_recommended_agents requires a non-empty 'task'"));
                };
                let picks = self.recommend_agents(task);
                let list: Vec<Value> = picks.iter().map(|a| agent_summary(a)).collect();
                Ok(ok_result(
                    format!("Recommended agents:\n{}", agent_lines(&picks)),
                    json!({ "task": task, "agents": list }),
                ))
            }
            "invoke_agent" => {
                let invocation: AgentInvocation = match args {
                    Some(obj) => match serde_json::from_value(Value::Object(obj.clone())) {
                        Ok(invocation) => invocation,
                        Err(e) => {
                            return Ok(error_result(format!(
                                "invalid invoke_agent arguments: {e}"
                            )))
                        }
                    },
                    None => AgentInvocation::default(),
                };
                let response = self.invoke_agent(invocation);
                let structured = serde_json::to_value(&response)?;
                let mut result = ok_result(response.content, structured);
                result.is_error = Some(response.status == InvocationStatus::Error);
                Ok(result)
            }
            "get_agent_context" => {
                let Some(key) = str_arg(args, "context_key") else {
                    return Ok(error_result("get_agent_context requires 'context_key'"));
                };
                match self.stored_context(key) {
                    Some(context) => Ok(ok_result(
                        context.clone(),
                        json!({ "contextKey": key, "context": context }),
                    )),
                    None => Ok(error_result(format!(
                        "No stored context for '{key}' (unknown or expired)"
                    ))),
                }
            }
            "get_agent_stats" => match str_arg(args, "agent_name") {
                Some(name) => match self.stats().get_agent_stats(name) {
                    Some(entry) => Ok(ok_result(
                        format!(
                            "{}: {} calls, {:.1}% success, {:.1} ms average",
                            entry.agent_name,
                            entry.invocation_count,
                            entry.success_rate(),
                            entry.average_response_time_ms
                        ),
                        serde_json::to_value(&entry)?,
                    )),
                    None => Ok(error_result(format!("No statistics recorded for '{name}'"))),
                },
                None => {
                    let all = self.stats().get_all_stats();
                    Ok(ok_result(
                        self.stats().stats_summary(),
                        json!({
                            "agents": all,
                            "totalInvocations": self.stats().get_total_invocations(),
                        }),
                    ))
                }
            },
            "get_top_agents" => {
                let limit = match args.and_then(|a| a.get("limit")) {
                    None | Some(Value::Null) => DEFAULT_TOP_LIMIT,
                    Some(v) => match v.as_u64() {
                        Some(n) if (1..=MAX_TOP_LIMIT as u64).contains(&n) => n as usize,
                        _ => {
                            return Ok(error_result(format!(
                                "limit must be between 1 and {MAX_TOP_LIMIT}"
                            )))
                        }
                    },
                };
                let by = match str_arg(args, "by") {
                    None => RankBy::default(),
                    Some(raw) => match raw.parse::<RankBy>() {
                        Ok(by) => by,
                        Err(e) => return Ok(error_result(e)),
                    },
                };
                let top = self.top_agents(limit, by);
                let text = top
                    .iter()
                    .enumerate()
                    .map(|(i, e)| {
                        format!(
                            "{}. {} ({} calls, {:.1}% success)",
                            i + 1,
                            e.agent_name,
                            e.invocation_count,
                            e.success_rate()
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                let text = if text.is_empty() {
                    "No agent usage data available yet".to_string()
                } else {
                    text
                };
                Ok(ok_result(
                    text,
                    json!({ "topAgents": top, "limit": limit, "actualCount": top.len() }),
                ))
            }
            "get_dashboard" => {
                let report = self.dashboard_report();
                Ok(ok_result(report.to_string(), serde_json::to_value(&report)?))
            }
            other => Err(anyhow!("unknown tool {other}")),
        }
    }
}

impl ServerHandler for AgentService {
    /// Lists the tools provided by this service.
    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, rmcp::ErrorData>> + Send + '_
    {
        std::future::ready(Ok(ListToolsResult {
            tools: all_tools(),
            next_cursor: None,
        }))
    }

    /// Executes a specific tool identified by `request.name`.
    fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> impl std::future::Future<Output = Result<CallToolResult, rmcp::ErrorData>> + Send + '_
    {
        let result = self
            .dispatch(&request)
            .map_err(|e| rmcp::ErrorData::internal_error(e.to_string(), None));
        std::future::ready(result)
    }

    fn get_info(&self) -> InitializeResult {
        InitializeResult {
            capabilities: ServerCapabilities {
                tools: Some(Default::default()),
                ..Default::default()
            },
            instructions: Some(
                "Catalog of specialized agents. Use get_recommended_agents to pick one, \
                 then invoke_agent for task guidance."
                    .into(),
            ),
            ..Default::default()
        }
    }
}

//! JSON dashboard over HTTP.
//!
//! Read-only views of the usage statistics plus a reset endpoint. Every
//! response is JSON; handlers never touch the disk.

use crate::app::AgentService;
use crate::handler::{DEFAULT_TOP_LIMIT, MAX_TOP_LIMIT};
use agentdeck_metrics::StatEntry;
use anyhow::{Context, Result};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

type Shared = State<Arc<AgentService>>;

fn timestamp() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}

/// Routes for the dashboard API.
pub fn router(service: Arc<AgentService>) -> Router {
    Router::new()
        .route("/api/stats/summary", get(summary))
        .route("/api/stats/agents", get(all_agents))
        .route("/api/stats/agents/{name}", get(agent_stats))
        .route("/api/stats/top", get(top_agents))
        .route("/api/dashboard/data", get(dashboard_data))
        .route("/api/dashboard/status", get(status))
        .route("/api/dashboard/stats/reset", post(reset))
        .with_state(service)
}

/// Bind `addr` and serve the dashboard until the task is dropped.
pub async fn serve_dashboard(addr: SocketAddr, service: Arc<AgentService>) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    tracing::info!(
        target: "agentdeck::http",
        bind = %addr,
        "dashboard listening"
    );

    axum::serve(listener, router(service))
        .await
        .context("HTTP server error")?;

    Ok(())
}

async fn summary(State(svc): Shared) -> Json<serde_json::Value> {
    tracing::debug!(target: "agentdeck::http", "summary requested");
    let stats = svc.stats();
    Json(json!({
        "totalInvocations": stats.get_total_invocations(),
        "uniqueAgents": stats.get_all_stats().len(),
        "currentTime": timestamp(),
        "statsSummary": stats.stats_summary(),
    }))
}

async fn all_agents(State(svc): Shared) -> Json<serde_json::Value> {
    let all = svc.stats().get_all_stats();
    if all.is_empty() {
        return Json(json!({
            "message": "No agent statistics available yet",
            "agents": [],
            "timestamp": timestamp(),
        }));
    }
    Json(json!({
        "count": all.len(),
        "agents": all,
        "timestamp": timestamp(),
    }))
}

async fn agent_stats(State(svc): Shared, Path(name): Path<String>) -> Response {
    let Some(agent) = svc.catalog().get(&name) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let stats = svc
        .stats()
        .get_agent_stats(&name)
        .unwrap_or_else(|| StatEntry::initial(name.as_str(), OffsetDateTime::now_utc()));

    Json(json!({
        "agentName": stats.agent_name,
        "totalInvocations": stats.invocation_count,
        "successCount": stats.success_count,
        "failureCount": stats.failure_count,
        "successRate": stats.success_rate(),
        "averageResponseTime": stats.average_response_time_ms,
        "lastUsed": stats.last_used.format(&Rfc3339).ok(),
        "firstUsed": stats.first_used.format(&Rfc3339).ok(),
        "agentInfo": agent,
        "timestamp": timestamp(),
    }))
    .into_response()
}

#[derive(Debug, Deserialize)]
struct TopParams {
    limit: Option<i64>,
}

async fn top_agents(State(svc): Shared, Query(params): Query<TopParams>) -> Response {
    let limit = params.limit.unwrap_or(DEFAULT_TOP_LIMIT as i64);
    if !(1..=MAX_TOP_LIMIT as i64).contains(&limit) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": format!("Limit must be between 1 and {MAX_TOP_LIMIT}") })),
        )
            .into_response();
    }

    let top = svc.stats().get_most_used_agents(limit as usize);
    if top.is_empty() {
        return Json(json!({
            "message": "No agent usage data available yet",
            "topAgents": [],
            "limit": limit,
            "timestamp": timestamp(),
        }))
        .into_response();
    }
    Json(json!({
        "actualCount": top.len(),
        "topAgents": top,
        "limit": limit,
        "timestamp": timestamp(),
    }))
    .into_response()
}

async fn dashboard_data(State(svc): Shared) -> Json<agentdeck_metrics::DashboardReport> {
    Json(svc.dashboard_report())
}

async fn status(State(svc): Shared) -> Json<serde_json::Value> {
    Json(json!({
        "health": "UP",
        "timestamp": timestamp(),
        "agentCount": svc.catalog().len(),
        "totalInvocations": svc.stats().get_total_invocations(),
        "contextCache": svc.contexts().stats(),
    }))
}

async fn reset(State(svc): Shared) -> Json<serde_json::Value> {
    tracing::info!(target: "agentdeck::http", "statistics reset requested");
    svc.stats().clear_all_stats();
    Json(json!({
        "message": "Statistics reset successfully",
        "timestamp": timestamp(),
    }))
}

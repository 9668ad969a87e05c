//! Handler for the `serve` command.

use super::catalog_from;
use crate::app::AgentService;
use crate::cache::ContextCache;
use crate::scheduler::Scheduler;
use agentdeck_metrics::StatsService;
use agentdeck_state::{CacheSettings, StatsSettings};
use anyhow::{anyhow, Result};
use rmcp::service::serve_server;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;

/// Handle the `serve` command.
pub(crate) fn handle_serve_command(
    agent_dir: Option<PathBuf>,
    stats_file: Option<PathBuf>,
    no_persist: bool,
    #[cfg(feature = "http-dashboard")] http: Option<String>,
) -> Result<()> {
    let mut stats_settings = StatsSettings::from_env();
    if let Some(file) = stats_file {
        stats_settings.file_path = file;
    }
    if no_persist {
        stats_settings.persistence_enabled = false;
    }
    let cache_settings = CacheSettings::from_env();

    #[cfg(feature = "http-dashboard")]
    let http_addr = http
        .map(|addr| {
            addr.parse::<std::net::SocketAddr>()
                .map_err(|e| anyhow!("invalid --http address '{addr}': {e}"))
        })
        .transpose()?;

    let catalog = Arc::new(catalog_from(agent_dir));
    let persist_every = stats_settings
        .persistence_enabled
        .then_some(stats_settings.persistence_interval);
    let stats = Arc::new(StatsService::from_settings(stats_settings));
    let contexts = Arc::new(ContextCache::from_settings(&cache_settings));
    let service = AgentService::new(catalog, Arc::clone(&stats), Arc::clone(&contexts));

    tracing::info!(
        target: "agentdeck::startup",
        agents = service.catalog().len(),
        persistence = persist_every.is_some(),
        context_max = contexts.max_entries(),
        context_ttl = ?contexts.ttl(),
        "starting agentdeck MCP server"
    );

    let rt = Runtime::new()?;
    rt.block_on(async move {
        let loader = Arc::clone(&stats);
        tokio::task::spawn_blocking(move || loader.initialize()).await?;

        let scheduler = Scheduler::start(
            Arc::clone(&stats),
            Arc::clone(&contexts),
            persist_every,
            cache_settings.cleanup_interval,
        );

        #[cfg(feature = "http-dashboard")]
        let dashboard = http_addr.map(|addr| {
            let service = Arc::new(service.clone());
            tokio::spawn(async move {
                if let Err(e) = crate::dashboard_api::serve_dashboard(addr, service).await {
                    tracing::error!(target: "agentdeck::http", error = %format!("{e:#}"), "dashboard stopped");
                }
            })
        });

        let result = serve_stdio(service).await;

        #[cfg(feature = "http-dashboard")]
        if let Some(handle) = dashboard {
            handle.abort();
        }

        scheduler.stop().await;
        let closing = Arc::clone(&stats);
        if let Err(e) = tokio::task::spawn_blocking(move || closing.shutdown()).await {
            tracing::warn!(target: "agentdeck::startup", error = %e, "stats shutdown task failed");
        }
        contexts.invalidate_all();
        tracing::info!(target: "agentdeck::startup", "agentdeck stopped");

        result
    })
}

/// Serve MCP over stdio until the client disconnects or an interrupt arrives.
async fn serve_stdio(service: AgentService) -> Result<()> {
    let running = serve_server(service, rmcp::transport::stdio())
        .await
        .map_err(|e| anyhow!("failed to start server: {e}"))?;

    tokio::select! {
        ended = running.waiting() => {
            ended.map_err(|e| anyhow!("server task ended: {e}"))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!(target: "agentdeck::startup", "interrupt received, shutting down");
        }
    }
    Ok(())
}

//! Stats survive a server restart when persistence is enabled.

use agentdeck_discovery::AgentCatalog;
use agentdeck_metrics::StatsService;
use agentdeck_server::{AgentInvocation, AgentService, ContextCache, Scheduler};
use agentdeck_state::StatsSettings;
use agentdeck_test_utils::TestFixture;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

fn boot(stats_path: &Path) -> AgentService {
    let settings = StatsSettings {
        persistence_enabled: true,
        file_path: stats_path.to_path_buf(),
        ..StatsSettings::default()
    };
    let stats = Arc::new(StatsService::from_settings(settings));
    stats.initialize();
    AgentService::new(
        Arc::new(AgentCatalog::with_defaults()),
        stats,
        Arc::new(ContextCache::new(100, Duration::from_secs(60))),
    )
}

fn invoke(service: &AgentService, agent: &str) {
    service.invoke_agent(AgentInvocation {
        agent_name: agent.into(),
        task: "Tidy up error handling".into(),
        context: None,
    });
}

#[tokio::test]
async fn restart_restores_recorded_invocations() -> anyhow::Result<()> {
    let fixture = TestFixture::new()?;

    let first = boot(&fixture.stats_path);
    invoke(&first, "debugger");
    invoke(&first, "debugger");
    invoke(&first, "code-reviewer");

    let scheduler = Scheduler::start(
        Arc::clone(first.stats()),
        Arc::clone(first.contexts()),
        Some(Duration::from_secs(3600)),
        Duration::from_secs(3600),
    );
    scheduler.stop().await;
    first.stats().shutdown();

    let second = boot(&fixture.stats_path);
    assert_eq!(second.stats().get_total_invocations(), 3);
    assert_eq!(
        second.stats().get_agent_stats("debugger").map(|e| e.invocation_count),
        Some(2)
    );

    // Context is not persisted.
    assert_eq!(second.contexts().approximate_size(), 0);
    Ok(())
}

#[test]
fn corrupt_snapshot_starts_fresh() -> anyhow::Result<()> {
    let fixture = TestFixture::new()?;
    fixture.write_stats_file("{ not json")?;

    let service = boot(&fixture.stats_path);
    assert_eq!(service.stats().get_total_invocations(), 0);

    invoke(&service, "debugger");
    service.stats().shutdown();

    let restarted = boot(&fixture.stats_path);
    assert_eq!(restarted.stats().get_total_invocations(), 1);
    Ok(())
}

#[test]
fn dashboard_report_lists_unused_agents() -> anyhow::Result<()> {
    let fixture = TestFixture::new()?;
    let service = boot(&fixture.stats_path);
    invoke(&service, "debugger");

    let report = service.dashboard_report();
    assert_eq!(report.usage_stats.len(), 5);
    assert_eq!(report.active_agents, 1);
    assert_eq!(report.total_invocations, 1);
    let unused = report
        .usage_stats
        .iter()
        .find(|row| row.agent_name == "ai-engineer")
        .expect("catalog agent row");
    assert_eq!(unused.invocation_count, 0);
    assert!(unused.last_used.is_none());
    Ok(())
}

//! CLI integration tests for the commands that work on local files.

use std::process::{Command, Output};

use agentdeck_test_utils::TestFixture;
use anyhow::{Context, Result};

const SNAPSHOT: &str = r#"{
  "debugger": {
    "agentName": "debugger",
    "invocationCount": 3,
    "successCount": 2,
    "failureCount": 1,
    "averageResponseTimeMs": 20.0,
    "totalResponseTimeMs": 60,
    "lastUsed": "2026-01-02T10:00:00Z",
    "firstUsed": "2026-01-01T10:00:00Z"
  }
}"#;

/// Run the binary with HOME pointed at the fixture so no user config leaks in.
fn agentdeck(fixture: &TestFixture, args: &[&str]) -> Result<Output> {
    let output = Command::new(env!("CARGO_BIN_EXE_agentdeck"))
        .args(args)
        .env("HOME", fixture.home_path())
        .env_remove("AGENTDECK_AGENT_DIR")
        .env_remove("AGENTDECK_STATS_FILE")
        .env_remove("AGENTDECK_HTTP")
        .output()
        .with_context(|| format!("failed to run agentdeck {args:?}"))?;

    if cfg!(debug_assertions) {
        eprintln!("stderr:\n{}", String::from_utf8_lossy(&output.stderr));
    }
    assert!(
        output.status.success(),
        "agentdeck {args:?} failed with {:?}",
        output.status
    );
    Ok(output)
}

fn path_arg(path: &std::path::Path) -> &str {
    path.to_str().expect("utf-8 temp path")
}

#[test]
fn agents_lists_directory_agents() -> Result<()> {
    let fixture = TestFixture::new()?;
    fixture.create_agent_with_frontmatter(
        "sql-tuner",
        "Speeds up slow queries",
        "You tune SQL.",
    )?;

    let out = agentdeck(
        &fixture,
        &["agents", "--agent-dir", path_arg(&fixture.agents_dir)],
    )?;
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("sql-tuner"));
    assert!(stdout.contains("Speeds up slow queries"));
    Ok(())
}

#[test]
fn stats_reads_snapshot_file() -> Result<()> {
    let fixture = TestFixture::new()?;
    let stats = fixture.write_stats_file(SNAPSHOT)?;

    let out = agentdeck(
        &fixture,
        &["stats", "--agent", "debugger", "--stats-file", path_arg(&stats)],
    )?;
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("invocations:   3"), "{stdout}");
    assert!(stdout.contains("succeeded:     2"), "{stdout}");
    Ok(())
}

#[test]
fn report_json_joins_catalog_and_stats() -> Result<()> {
    let fixture = TestFixture::new()?;
    let stats = fixture.write_stats_file(SNAPSHOT)?;

    let out = agentdeck(
        &fixture,
        &[
            "report",
            "--format",
            "json",
            "--agent-dir",
            path_arg(&fixture.agents_dir),
            "--stats-file",
            path_arg(&stats),
        ],
    )?;
    let report: serde_json::Value = serde_json::from_slice(&out.stdout)?;
    assert_eq!(report["usageStats"].as_array().map(Vec::len), Some(5));
    assert_eq!(report["totalInvocations"], 3);
    assert_eq!(report["activeAgents"], 1);
    Ok(())
}

#[test]
fn reset_stats_empties_snapshot_file() -> Result<()> {
    let fixture = TestFixture::new()?;
    let stats = fixture.write_stats_file(SNAPSHOT)?;

    agentdeck(&fixture, &["reset-stats", "--stats-file", path_arg(&stats)])?;

    let saved: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&stats)?)?;
    assert_eq!(saved, serde_json::json!({}));
    Ok(())
}

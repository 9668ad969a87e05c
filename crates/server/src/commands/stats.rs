//! Handler for the `stats` command.

use super::offline_stats;
use crate::app::RankBy;
use agentdeck_metrics::{StatEntry, StatsService};
use anyhow::{bail, Result};
use std::fmt::Write as _;
use std::path::PathBuf;
use time::format_description::well_known::Rfc3339;

pub(crate) fn handle_stats_command(
    agent: Option<String>,
    top: Option<usize>,
    by: RankBy,
    stats_file: Option<PathBuf>,
) -> Result<()> {
    let stats = offline_stats(stats_file);
    print!("{}", render_stats(&stats, agent.as_deref(), top, by)?);
    Ok(())
}

fn render_stats(
    stats: &StatsService,
    agent: Option<&str>,
    top: Option<usize>,
    by: RankBy,
) -> Result<String> {
    let mut out = String::new();

    if let Some(name) = agent {
        match stats.get_agent_stats(name) {
            Some(entry) => render_entry(&mut out, &entry),
            None => {
                let _ = writeln!(out, "No statistics recorded for '{name}'.");
            }
        }
        return Ok(out);
    }

    if let Some(limit) = top {
        if limit == 0 {
            bail!("--top must be at least 1");
        }
        let ranked = match by {
            RankBy::Usage => stats.get_most_used_agents(limit),
            RankBy::Success => stats.get_highest_success_rate_agents(limit),
            RankBy::Recent => stats.get_recently_used_agents(limit),
        };
        if ranked.is_empty() {
            out.push_str("No agent usage data available yet.\n");
        }
        for (i, entry) in ranked.iter().enumerate() {
            let _ = writeln!(
                out,
                "{}. {} ({} calls, {:.1}% success)",
                i + 1,
                entry.agent_name,
                entry.invocation_count,
                entry.success_rate()
            );
        }
        return Ok(out);
    }

    let _ = writeln!(out, "{}", stats.stats_summary());
    Ok(out)
}

fn render_entry(out: &mut String, entry: &StatEntry) {
    let _ = writeln!(out, "{}", entry.agent_name);
    let _ = writeln!(out, "  invocations:   {}", entry.invocation_count);
    let _ = writeln!(
        out,
        "  succeeded:     {} ({:.1}%)",
        entry.success_count,
        entry.success_rate()
    );
    let _ = writeln!(out, "  failed:        {}", entry.failure_count);
    let _ = writeln!(
        out,
        "  avg response:  {:.1} ms",
        entry.average_response_time_ms
    );
    let _ = writeln!(
        out,
        "  first used:    {}",
        entry.first_used.format(&Rfc3339).unwrap_or_default()
    );
    let _ = writeln!(
        out,
        "  last used:     {}",
        entry.last_used.format(&Rfc3339).unwrap_or_default()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> StatsService {
        let stats = StatsService::in_memory();
        stats.record_invocation("debugger", true, 10);
        stats.record_invocation("debugger", false, 30);
        stats.record_invocation("code-reviewer", true, 5);
        stats
    }

    #[test]
    fn summary_by_default() {
        let text = render_stats(&sample(), None, None, RankBy::Usage).unwrap();
        assert!(text.starts_with("Agents: 2, Total Invocations: 3"));
    }

    #[test]
    fn single_agent_details() {
        let text = render_stats(&sample(), Some("debugger"), None, RankBy::Usage).unwrap();
        assert!(text.contains("invocations:   2"));
        assert!(text.contains("succeeded:     1 (50.0%)"));
        assert!(text.contains("avg response:  20.0 ms"));
    }

    #[test]
    fn top_by_success() {
        let text = render_stats(&sample(), None, Some(1), RankBy::Success).unwrap();
        assert_eq!(text, "1. code-reviewer (1 calls, 100.0% success)\n");
    }

    #[test]
    fn top_zero_is_rejected() {
        assert!(render_stats(&sample(), None, Some(0), RankBy::Usage).is_err());
    }
}

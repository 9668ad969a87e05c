use crate::entry::StatEntry;
use crate::error::PersistenceError;
use crate::persistence::{JsonFileStore, SnapshotStore};
use crate::report::{AgentUsageStats, DashboardReport};
use crate::store::{Snapshot, StatsStore};
use agentdeck_discovery::CatalogAgent;
use agentdeck_state::StatsSettings;
use parking_lot::Mutex;
use std::cmp::Ordering;
use std::sync::Arc;
use time::OffsetDateTime;

/// Whether [`StatsService::initialize`] has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Active,
}

/// Records agent invocations and answers aggregate queries.
///
/// Recording never fails from the caller's point of view. Persistence only
/// happens when it is enabled in the settings and a [`SnapshotStore`] was
/// supplied; file I/O is synchronous, so async callers should run
/// [`initialize`](Self::initialize), [`scheduled_persistence`](Self::scheduled_persistence)
/// and [`shutdown`](Self::shutdown) on a blocking thread.
pub struct StatsService {
    settings: StatsSettings,
    store: StatsStore,
    persistence: Option<Arc<dyn SnapshotStore>>,
    state: Mutex<LifecycleState>,
}

impl std::fmt::Debug for StatsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatsService")
            .field("settings", &self.settings)
            .field("agents", &self.store.len())
            .field("state", &*self.state.lock())
            .finish()
    }
}

impl StatsService {
    pub fn new(settings: StatsSettings, persistence: Option<Arc<dyn SnapshotStore>>) -> Self {
        Self {
            settings,
            store: StatsStore::new(),
            persistence,
            state: Mutex::new(LifecycleState::Uninitialized),
        }
    }

    /// Service persisting to the JSON file named in `settings`.
    pub fn from_settings(settings: StatsSettings) -> Self {
        let file = JsonFileStore::new(settings.file_path.clone())
            .with_max_bytes(settings.max_snapshot_bytes);
        Self::new(settings, Some(Arc::new(file)))
    }

    /// Service that never touches the filesystem.
    pub fn in_memory() -> Self {
        Self::new(StatsSettings::in_memory(), None)
    }

    pub fn settings(&self) -> &StatsSettings {
        &self.settings
    }

    pub fn state(&self) -> LifecycleState {
        *self.state.lock()
    }

    fn active_persistence(&self) -> Option<&Arc<dyn SnapshotStore>> {
        if self.settings.persistence_enabled {
            self.persistence.as_ref()
        } else {
            None
        }
    }

    /// Load persisted stats (when enabled) and become active.
    ///
    /// Calling this again after the first success is a no-op. A missing or
    /// unreadable snapshot is logged and the service starts empty.
    pub fn initialize(&self) {
        let mut state = self.state.lock();
        if *state == LifecycleState::Active {
            return;
        }

        match self.active_persistence() {
            Some(persistence) => match persistence.load() {
                Ok(snapshot) => {
                    let agents = snapshot.len();
                    self.store.replace_all(snapshot);
                    tracing::info!(
                        target: "agentdeck::stats",
                        agents,
                        total = self.store.total_invocations(),
                        file = %self.settings.file_path.display(),
                        "stats service initialized"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        target: "agentdeck::stats",
                        error = %e,
                        "failed to load existing stats, starting fresh"
                    );
                }
            },
            None => {
                tracing::info!(
                    target: "agentdeck::stats",
                    "stats persistence disabled, starting with empty stats"
                );
            }
        }

        *state = LifecycleState::Active;
    }

    /// Record one invocation. Blank names are ignored and counter faults are
    /// logged at debug level; the caller is never affected.
    pub fn record_invocation(&self, agent_name: &str, success: bool, response_time_ms: u64) {
        self.record_invocation_at(agent_name, success, response_time_ms, OffsetDateTime::now_utc());
    }

    /// [`record_invocation`](Self::record_invocation) with an explicit timestamp.
    pub fn record_invocation_at(
        &self,
        agent_name: &str,
        success: bool,
        response_time_ms: u64,
        at: OffsetDateTime,
    ) {
        if agent_name.trim().is_empty() {
            return;
        }
        if let Err(e) = self
            .store
            .upsert_at(agent_name, success, response_time_ms, at)
        {
            tracing::debug!(
                target: "agentdeck::stats",
                agent = agent_name,
                error = %e,
                "failed to record invocation"
            );
        }
    }

    pub fn get_agent_stats(&self, agent_name: &str) -> Option<StatEntry> {
        self.store.get(agent_name)
    }

    /// Owned copy of every entry, ordered by agent name.
    pub fn get_all_stats(&self) -> Snapshot {
        self.store.snapshot()
    }

    pub fn get_total_invocations(&self) -> u64 {
        self.store.total_invocations()
    }

    /// Rank a single snapshot. The snapshot is name-ordered and the sort is
    /// stable, so ties come out alphabetically.
    fn ranked<K, C>(&self, limit: usize, keep: K, mut cmp: C) -> Vec<StatEntry>
    where
        K: Fn(&StatEntry) -> bool,
        C: FnMut(&StatEntry, &StatEntry) -> Ordering,
    {
        let mut rows: Vec<StatEntry> = self
            .store
            .snapshot()
            .into_values()
            .filter(|e| keep(e))
            .collect();
        rows.sort_by(|a, b| cmp(a, b));
        rows.truncate(limit);
        rows
    }

    pub fn get_most_used_agents(&self, limit: usize) -> Vec<StatEntry> {
        self.ranked(
            limit,
            |_| true,
            |a, b| b.invocation_count.cmp(&a.invocation_count),
        )
    }

    /// Agents with at least one invocation, best success rate first.
    pub fn get_highest_success_rate_agents(&self, limit: usize) -> Vec<StatEntry> {
        self.ranked(
            limit,
            |e| e.invocation_count > 0,
            |a, b| b.success_rate().total_cmp(&a.success_rate()),
        )
    }

    pub fn get_recently_used_agents(&self, limit: usize) -> Vec<StatEntry> {
        self.ranked(limit, |_| true, |a, b| b.last_used.cmp(&a.last_used))
    }

    /// Save the current snapshot if persistence is enabled.
    ///
    /// Failures are logged and returned; the stored file is left as it was.
    pub fn scheduled_persistence(&self) -> Result<(), PersistenceError> {
        let Some(persistence) = self.active_persistence() else {
            return Ok(());
        };
        let snapshot = self.store.snapshot();
        match persistence.save(&snapshot) {
            Ok(()) => {
                tracing::debug!(
                    target: "agentdeck::stats",
                    agents = snapshot.len(),
                    "scheduled stats persistence completed"
                );
                Ok(())
            }
            Err(e) => {
                tracing::warn!(
                    target: "agentdeck::stats",
                    error = %e,
                    "scheduled stats persistence failed"
                );
                Err(e)
            }
        }
    }

    /// Drop every entry and reset the running total.
    pub fn clear_all_stats(&self) {
        self.store.clear();
        tracing::info!(target: "agentdeck::stats", "all agent statistics cleared");
    }

    /// One-line summary for logs and the CLI.
    pub fn stats_summary(&self) -> String {
        let snapshot = self.store.snapshot();
        if snapshot.is_empty() {
            return "No agent statistics available".to_string();
        }
        let (total, successes) = snapshot.values().fold((0u64, 0u64), |(t, s), e| {
            (
                t.saturating_add(e.invocation_count),
                s.saturating_add(e.success_count),
            )
        });
        let rate = if total > 0 {
            successes as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        format!(
            "Agents: {}, Total Invocations: {}, Overall Success Rate: {:.1}%",
            snapshot.len(),
            total,
            rate
        )
    }

    /// Join `catalog` against one snapshot.
    ///
    /// Agents that were never invoked get zero-filled rows. The overall
    /// success rate is the mean of per-agent rates over active agents.
    pub fn generate_dashboard_report(&self, catalog: &[CatalogAgent]) -> DashboardReport {
        let snapshot = self.store.snapshot();

        let usage_stats: Vec<AgentUsageStats> = catalog
            .iter()
            .map(|agent| match snapshot.get(&agent.name) {
                Some(entry) => AgentUsageStats {
                    agent_name: agent.name.clone(),
                    description: agent.description.clone(),
                    invocation_count: entry.invocation_count,
                    success_count: entry.success_count,
                    success_rate: entry.success_rate(),
                    last_used: Some(entry.last_used),
                    first_used: Some(entry.first_used),
                },
                None => AgentUsageStats {
                    agent_name: agent.name.clone(),
                    description: agent.description.clone(),
                    invocation_count: 0,
                    success_count: 0,
                    success_rate: 0.0,
                    last_used: None,
                    first_used: None,
                },
            })
            .collect();

        let active: Vec<&AgentUsageStats> = usage_stats
            .iter()
            .filter(|row| row.invocation_count > 0)
            .collect();
        let overall_success_rate = if active.is_empty() {
            0.0
        } else {
            active.iter().map(|row| row.success_rate).sum::<f64>() / active.len() as f64
        };
        let total_invocations = snapshot
            .values()
            .fold(0u64, |acc, e| acc.saturating_add(e.invocation_count));

        DashboardReport {
            active_agents: active.len(),
            usage_stats,
            total_invocations,
            overall_success_rate,
        }
    }

    /// Final save on the way out. Errors are logged, never returned.
    pub fn shutdown(&self) {
        if self.active_persistence().is_none() {
            tracing::info!(
                target: "agentdeck::stats",
                "stats service shutdown, persistence disabled"
            );
            return;
        }
        match self.scheduled_persistence() {
            Ok(()) => tracing::info!(
                target: "agentdeck::stats",
                agents = self.store.len(),
                "stats service shutdown, stats persisted"
            ),
            Err(e) => tracing::error!(
                target: "agentdeck::stats",
                error = %e,
                "failed to persist stats during shutdown"
            ),
        }
    }
}

use crate::entry::StatEntry;
use crate::error::StatsError;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use time::OffsetDateTime;

/// Point-in-time copy of every entry, ordered by agent name.
pub type Snapshot = BTreeMap<String, StatEntry>;

/// Concurrent map from agent name to its latest [`StatEntry`].
///
/// Writers serialize on one lock; the read-compute-replace of an upsert
/// happens entirely under it, so no update is lost and readers never see a
/// partially applied invocation. The running total is only modified while
/// the write lock is held.
#[derive(Debug, Default)]
pub struct StatsStore {
    entries: RwLock<HashMap<String, StatEntry>>,
    total: AtomicU64,
}

impl StatsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one invocation into `agent_name`'s entry, creating it if needed.
    pub fn upsert(
        &self,
        agent_name: &str,
        success: bool,
        response_time_ms: u64,
    ) -> Result<StatEntry, StatsError> {
        self.upsert_at(agent_name, success, response_time_ms, OffsetDateTime::now_utc())
    }

    /// [`upsert`](Self::upsert) with an explicit timestamp.
    pub fn upsert_at(
        &self,
        agent_name: &str,
        success: bool,
        response_time_ms: u64,
        now: OffsetDateTime,
    ) -> Result<StatEntry, StatsError> {
        let mut entries = self.entries.write();
        let next = match entries.get(agent_name) {
            Some(current) => current.with_invocation(success, response_time_ms, now)?,
            None => StatEntry::initial(agent_name, now).with_invocation(
                success,
                response_time_ms,
                now,
            )?,
        };
        entries.insert(agent_name.to_string(), next.clone());
        self.total.fetch_add(1, Ordering::Relaxed);
        Ok(next)
    }

    pub fn get(&self, agent_name: &str) -> Option<StatEntry> {
        self.entries.read().get(agent_name).cloned()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.entries
            .read()
            .iter()
            .map(|(name, entry)| (name.clone(), entry.clone()))
            .collect()
    }

    /// Install a previously saved snapshot, discarding current state.
    ///
    /// The running total becomes the sum of the loaded invocation counts.
    pub fn replace_all(&self, snapshot: Snapshot) {
        let mut entries = self.entries.write();
        let total = snapshot
            .values()
            .fold(0u64, |acc, e| acc.saturating_add(e.invocation_count));
        *entries = snapshot.into_iter().collect();
        self.total.store(total, Ordering::Relaxed);
    }

    pub fn clear(&self) {
        let mut entries = self.entries.write();
        entries.clear();
        self.total.store(0, Ordering::Relaxed);
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Invocations recorded since start (or since the last load or clear).
    pub fn total_invocations(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn upsert_creates_then_merges() {
        let store = StatsStore::new();
        let first = store.upsert("alpha", true, 10).unwrap();
        assert_eq!(first.invocation_count, 1);

        let second = store.upsert("alpha", false, 30).unwrap();
        assert_eq!(second.invocation_count, 2);
        assert_eq!(second.failure_count, 1);
        assert_eq!(second.average_response_time_ms, 20.0);
        assert_eq!(second.first_used, first.first_used);

        assert_eq!(store.get("alpha"), Some(second));
        assert_eq!(store.total_invocations(), 2);
    }

    #[test]
    fn failed_upsert_leaves_entry_and_total_unchanged() {
        let store = StatsStore::new();
        let t = datetime!(2024-05-01 00:00:00 UTC);
        let mut loaded = StatEntry::initial("hot", t);
        loaded.invocation_count = 1;
        loaded.success_count = 1;
        loaded.total_response_time_ms = u64::MAX;
        store.replace_all(Snapshot::from([("hot".to_string(), loaded.clone())]));

        assert!(store.upsert("hot", true, 1).is_err());
        assert_eq!(store.get("hot"), Some(loaded));
        assert_eq!(store.total_invocations(), 1);
    }

    #[test]
    fn snapshot_is_ordered_and_detached() {
        let store = StatsStore::new();
        store.upsert("zeta", true, 1).unwrap();
        store.upsert("alpha", true, 1).unwrap();

        let snap = store.snapshot();
        store.upsert("alpha", true, 1).unwrap();

        let names: Vec<_> = snap.keys().cloned().collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
        assert_eq!(snap["alpha"].invocation_count, 1);
    }

    #[test]
    fn replace_all_recomputes_total() {
        let store = StatsStore::new();
        store.upsert("stale", true, 1).unwrap();

        let t = datetime!(2024-05-01 00:00:00 UTC);
        let mut a = StatEntry::initial("a", t);
        a.invocation_count = 7;
        let mut b = StatEntry::initial("b", t);
        b.invocation_count = 3;
        store.replace_all(Snapshot::from([("a".into(), a), ("b".into(), b)]));

        assert_eq!(store.len(), 2);
        assert!(store.get("stale").is_none());
        assert_eq!(store.total_invocations(), 10);
    }

    #[test]
    fn clear_resets_map_and_total() {
        let store = StatsStore::new();
        store.upsert("a", true, 1).unwrap();
        store.upsert("b", false, 1).unwrap();
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.total_invocations(), 0);
    }
}

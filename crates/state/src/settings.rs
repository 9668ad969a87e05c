//! Resolved settings for the stats subsystem, the context cache, and agent discovery.
//!
//! Each settings struct has a `Default` carrying the built-in values and a
//! `from_env` constructor that layers `AGENTDECK_*` variables on top.

use crate::env::{
    env_agent_dir, env_context_cleanup, env_context_max_entries, env_context_ttl,
    env_stats_file, env_stats_interval, env_stats_persistence,
};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_STATS_FILE: &str = "agent-stats.json";
pub const DEFAULT_PERSISTENCE_INTERVAL: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_CONTEXT_MAX_ENTRIES: usize = 1000;
pub const DEFAULT_CONTEXT_TTL: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_CONTEXT_CLEANUP_INTERVAL: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_AGENT_DIR: &str = "agents";
/// Upper bound on a serialized stats snapshot.
pub const DEFAULT_MAX_SNAPSHOT_BYTES: u64 = 32 * 1024 * 1024;

/// Stats persistence settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsSettings {
    /// Whether snapshots are loaded at startup and saved periodically.
    pub persistence_enabled: bool,
    /// Destination of the persisted snapshot.
    pub file_path: PathBuf,
    /// Interval between scheduled saves.
    pub persistence_interval: Duration,
    /// Snapshots that serialize larger than this are refused.
    pub max_snapshot_bytes: u64,
}

impl Default for StatsSettings {
    fn default() -> Self {
        Self {
            persistence_enabled: true,
            file_path: PathBuf::from(DEFAULT_STATS_FILE),
            persistence_interval: DEFAULT_PERSISTENCE_INTERVAL,
            max_snapshot_bytes: DEFAULT_MAX_SNAPSHOT_BYTES,
        }
    }
}

impl StatsSettings {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            persistence_enabled: env_stats_persistence(),
            file_path: env_stats_file().unwrap_or(defaults.file_path),
            persistence_interval: env_stats_interval().unwrap_or(defaults.persistence_interval),
            max_snapshot_bytes: defaults.max_snapshot_bytes,
        }
    }

    /// Settings with persistence turned off (in-memory only).
    pub fn in_memory() -> Self {
        Self {
            persistence_enabled: false,
            ..Self::default()
        }
    }
}

/// Context cache bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSettings {
    pub max_entries: usize,
    /// Time-to-live measured from last access.
    pub ttl: Duration,
    pub cleanup_interval: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_CONTEXT_MAX_ENTRIES,
            ttl: DEFAULT_CONTEXT_TTL,
            cleanup_interval: DEFAULT_CONTEXT_CLEANUP_INTERVAL,
        }
    }
}

impl CacheSettings {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_entries: env_context_max_entries().unwrap_or(defaults.max_entries),
            ttl: env_context_ttl().unwrap_or(defaults.ttl),
            cleanup_interval: env_context_cleanup().unwrap_or(defaults.cleanup_interval),
        }
    }
}

/// Where agent definitions are read from.
pub fn agent_dir() -> PathBuf {
    env_agent_dir().unwrap_or_else(|| PathBuf::from(DEFAULT_AGENT_DIR))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{
        ENV_AGENT_DIR, ENV_CONTEXT_MAX_ENTRIES, ENV_CONTEXT_TTL_SECS, ENV_STATS_FILE,
        ENV_STATS_INTERVAL_SECS, ENV_STATS_PERSISTENCE,
    };
    use agentdeck_test_utils::{env_guard, set_env_var};

    #[test]
    fn defaults_match_documented_values() {
        let stats = StatsSettings::default();
        assert!(stats.persistence_enabled);
        assert_eq!(stats.file_path, PathBuf::from("agent-stats.json"));
        assert_eq!(stats.persistence_interval, Duration::from_secs(300));

        let cache = CacheSettings::default();
        assert_eq!(cache.max_entries, 1000);
        assert_eq!(cache.ttl, Duration::from_secs(300));
    }

    #[test]
    fn stats_settings_read_environment() {
        let _g = env_guard();
        let _p = set_env_var(ENV_STATS_PERSISTENCE, Some("false"));
        let _f = set_env_var(ENV_STATS_FILE, Some("/tmp/custom-stats.json"));
        let _i = set_env_var(ENV_STATS_INTERVAL_SECS, Some("30"));

        let stats = StatsSettings::from_env();
        assert!(!stats.persistence_enabled);
        assert_eq!(stats.file_path, PathBuf::from("/tmp/custom-stats.json"));
        assert_eq!(stats.persistence_interval, Duration::from_secs(30));
    }

    #[test]
    fn cache_settings_fall_back_on_unparsable_values() {
        let _g = env_guard();
        let _m = set_env_var(ENV_CONTEXT_MAX_ENTRIES, Some("lots"));
        let _t = set_env_var(ENV_CONTEXT_TTL_SECS, Some("60"));

        let cache = CacheSettings::from_env();
        assert_eq!(cache.max_entries, DEFAULT_CONTEXT_MAX_ENTRIES);
        assert_eq!(cache.ttl, Duration::from_secs(60));
    }

    #[test]
    fn agent_dir_defaults_to_relative_agents() {
        let _g = env_guard();
        let _unset = set_env_var(ENV_AGENT_DIR, None);
        assert_eq!(agent_dir(), PathBuf::from("agents"));
    }
}

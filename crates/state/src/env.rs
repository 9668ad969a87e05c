use anyhow::Result;
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_STATS_PERSISTENCE: &str = "AGENTDECK_STATS_PERSISTENCE";
pub const ENV_STATS_FILE: &str = "AGENTDECK_STATS_FILE";
pub const ENV_STATS_INTERVAL_SECS: &str = "AGENTDECK_STATS_INTERVAL_SECS";
pub const ENV_CONTEXT_MAX_ENTRIES: &str = "AGENTDECK_CONTEXT_MAX_ENTRIES";
pub const ENV_CONTEXT_TTL_SECS: &str = "AGENTDECK_CONTEXT_TTL_SECS";
pub const ENV_CONTEXT_CLEANUP_SECS: &str = "AGENTDECK_CONTEXT_CLEANUP_SECS";
pub const ENV_AGENT_DIR: &str = "AGENTDECK_AGENT_DIR";

/// Returns the user's home directory.
pub fn home_dir() -> Result<PathBuf> {
    #[cfg(unix)]
    if let Ok(home) = std::env::var("HOME") {
        return Ok(PathBuf::from(home));
    }
    dirs::home_dir().ok_or_else(|| anyhow::anyhow!("home directory not found"))
}

/// Reads a boolean flag. `1`/`true` enable, `0`/`false` disable; anything else
/// (or unset) yields `default`.
fn env_flag(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(s) if s == "1" || s.eq_ignore_ascii_case("true") => true,
        Ok(s) if s == "0" || s.eq_ignore_ascii_case("false") => false,
        _ => default,
    }
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

/// Checks `AGENTDECK_STATS_PERSISTENCE` (default: true).
pub fn env_stats_persistence() -> bool {
    env_flag(ENV_STATS_PERSISTENCE, true)
}

/// Returns the stats snapshot path from `AGENTDECK_STATS_FILE`, if set.
pub fn env_stats_file() -> Option<PathBuf> {
    std::env::var(ENV_STATS_FILE)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from)
}

/// Returns the persistence interval from `AGENTDECK_STATS_INTERVAL_SECS`.
///
/// Zero is ignored so a misconfigured interval cannot spin the scheduler.
pub fn env_stats_interval() -> Option<Duration> {
    env_u64(ENV_STATS_INTERVAL_SECS)
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}

/// Returns the context cache capacity from `AGENTDECK_CONTEXT_MAX_ENTRIES`.
pub fn env_context_max_entries() -> Option<usize> {
    env_u64(ENV_CONTEXT_MAX_ENTRIES).map(|n| n as usize)
}

/// Returns the context cache TTL from `AGENTDECK_CONTEXT_TTL_SECS`.
pub fn env_context_ttl() -> Option<Duration> {
    env_u64(ENV_CONTEXT_TTL_SECS)
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}

/// Returns the context cleanup interval from `AGENTDECK_CONTEXT_CLEANUP_SECS`.
pub fn env_context_cleanup() -> Option<Duration> {
    env_u64(ENV_CONTEXT_CLEANUP_SECS)
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}

/// Returns the agent directory from `AGENTDECK_AGENT_DIR`, if set.
pub fn env_agent_dir() -> Option<PathBuf> {
    std::env::var(ENV_AGENT_DIR)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from)
}

/// Returns the path to the optional config file (`~/.agentdeck/config.toml`).
pub fn config_file() -> Option<PathBuf> {
    home_dir()
        .ok()
        .map(|h| h.join(".agentdeck").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentdeck_test_utils::{env_guard, set_env_var};

    #[test]
    fn persistence_flag_defaults_to_enabled() {
        let _g = env_guard();
        let _unset = set_env_var(ENV_STATS_PERSISTENCE, None);
        assert!(env_stats_persistence());
    }

    #[test]
    fn persistence_flag_accepts_false_and_zero() {
        let _g = env_guard();
        {
            let _v = set_env_var(ENV_STATS_PERSISTENCE, Some("false"));
            assert!(!env_stats_persistence());
        }
        {
            let _v = set_env_var(ENV_STATS_PERSISTENCE, Some("0"));
            assert!(!env_stats_persistence());
        }
        {
            let _v = set_env_var(ENV_STATS_PERSISTENCE, Some("garbage"));
            assert!(env_stats_persistence());
        }
    }

    #[test]
    fn zero_interval_is_ignored() {
        let _g = env_guard();
        let _v = set_env_var(ENV_STATS_INTERVAL_SECS, Some("0"));
        assert_eq!(env_stats_interval(), None);
    }

    #[test]
    fn blank_stats_file_is_ignored() {
        let _g = env_guard();
        let _v = set_env_var(ENV_STATS_FILE, Some("   "));
        assert_eq!(env_stats_file(), None);
    }

    #[test]
    fn config_file_lives_under_home() {
        let _g = env_guard();
        let tmp = tempfile::tempdir().unwrap();
        let _home = set_env_var("HOME", Some(tmp.path().to_str().unwrap()));
        assert_eq!(
            config_file(),
            Some(tmp.path().join(".agentdeck/config.toml"))
        );
    }
}

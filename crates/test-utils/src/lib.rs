//! Shared test utilities for agentdeck crates.
//!
//! This crate provides common test fixtures and utilities used across
//! multiple crates in the agentdeck workspace.

use std::path::PathBuf;
use std::sync::{LazyLock, Mutex, MutexGuard};

/// Serialize tests that mutate process-global state (env vars, cwd, etc).
///
/// Acquire this guard at the start of any test that modifies environment
/// variables to prevent race conditions between parallel tests.
pub fn env_guard() -> MutexGuard<'static, ()> {
    static TEST_SERIAL: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));
    TEST_SERIAL.lock().unwrap_or_else(|e| e.into_inner())
}

/// RAII guard for environment variables - restores original value on drop.
pub struct EnvVarGuard {
    key: &'static str,
    previous: Option<String>,
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        if let Some(v) = &self.previous {
            std::env::set_var(self.key, v);
        } else {
            std::env::remove_var(self.key);
        }
    }
}

/// Set an environment variable and return a guard that restores the original on drop.
///
/// # Example
/// ```
/// let _guard = agentdeck_test_utils::set_env_var("MY_VAR", Some("value"));
/// // MY_VAR is set to "value"
/// // When _guard drops, MY_VAR is restored to its original value
/// ```
pub fn set_env_var(key: &'static str, value: Option<&str>) -> EnvVarGuard {
    let previous = std::env::var(key).ok();
    if let Some(val) = value {
        std::env::set_var(key, val);
    } else {
        std::env::remove_var(key);
    }
    EnvVarGuard { key, previous }
}

/// Standard test fixture with a pre-created agent directory.
///
/// Holds the tempdir and provides access to common paths.
/// The tempdir is automatically cleaned up when this struct is dropped.
pub struct TestFixture {
    pub tempdir: tempfile::TempDir,
    /// Directory scanned for agent markdown files.
    pub agents_dir: PathBuf,
    /// Location for the persisted stats snapshot (not created).
    pub stats_path: PathBuf,
}

impl TestFixture {
    /// Create a new test fixture.
    ///
    /// Creates `<tmp>/agents/`. The stats file is left absent so that
    /// cold-start behaviour is the default.
    pub fn new() -> std::io::Result<Self> {
        let tempdir = tempfile::tempdir()?;
        let agents_dir = tempdir.path().join("agents");
        let stats_path = tempdir.path().join("agent-stats.json");

        std::fs::create_dir_all(&agents_dir)?;

        Ok(Self {
            tempdir,
            agents_dir,
            stats_path,
        })
    }

    /// Get the path that should be set as HOME.
    pub fn home_path(&self) -> &std::path::Path {
        self.tempdir.path()
    }

    /// Create an RAII guard that sets HOME to this fixture's temp directory.
    pub fn home_guard(&self) -> EnvVarGuard {
        set_env_var("HOME", Some(self.home_path().to_str().unwrap()))
    }

    /// Write a raw agent markdown file named `<name>.md`.
    pub fn create_agent(&self, name: &str, content: &str) -> std::io::Result<PathBuf> {
        let path = self.agents_dir.join(format!("{name}.md"));
        std::fs::write(&path, content)?;
        Ok(path)
    }

    /// Write an agent file with standard frontmatter.
    pub fn create_agent_with_frontmatter(
        &self,
        name: &str,
        description: &str,
        body: &str,
    ) -> std::io::Result<PathBuf> {
        let content = format!(
            "---\nname: {}\ndescription: {}\n---\n{}",
            name, description, body
        );
        self.create_agent(name, &content)
    }

    /// Write the stats snapshot file verbatim.
    pub fn write_stats_file(&self, contents: &str) -> std::io::Result<PathBuf> {
        std::fs::write(&self.stats_path, contents)?;
        Ok(self.stats_path.clone())
    }
}

//! Saving and reloading stats snapshots.
//!
//! A snapshot is written to a temporary file in the destination directory,
//! flushed to disk, and renamed over the destination. A crash or error at
//! any point leaves the previous file intact.

use crate::error::PersistenceError;
use crate::store::Snapshot;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Durable storage for full stats snapshots.
pub trait SnapshotStore: Send + Sync {
    /// Replace the stored snapshot with `snapshot`.
    fn save(&self, snapshot: &Snapshot) -> Result<(), PersistenceError>;

    /// Read the stored snapshot; a store that was never written is empty.
    fn load(&self) -> Result<Snapshot, PersistenceError>;
}

/// Pretty-printed JSON file holding one snapshot.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    max_bytes: u64,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_bytes: agentdeck_state::settings::DEFAULT_MAX_SNAPSHOT_BYTES,
        }
    }

    /// Refuse to write or read snapshots larger than `max_bytes`.
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for JsonFileStore {
    fn save(&self, snapshot: &Snapshot) -> Result<(), PersistenceError> {
        let body = serde_json::to_vec_pretty(snapshot).map_err(PersistenceError::Serialize)?;
        let size = body.len() as u64;
        if size > self.max_bytes {
            return Err(PersistenceError::TooLarge {
                size,
                limit: self.max_bytes,
            });
        }
        write_atomic(&self.path, |file| file.write_all(&body))?;
        tracing::debug!(
            target: "agentdeck::persist",
            path = %self.path.display(),
            agents = snapshot.len(),
            bytes = size,
            "saved stats snapshot"
        );
        Ok(())
    }

    fn load(&self) -> Result<Snapshot, PersistenceError> {
        let size = match fs::metadata(&self.path) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(
                    target: "agentdeck::persist",
                    path = %self.path.display(),
                    "no stats file yet"
                );
                return Ok(Snapshot::new());
            }
            Err(e) => return Err(PersistenceError::io(&self.path)(e)),
        };
        if size > self.max_bytes {
            return Err(PersistenceError::TooLarge {
                size,
                limit: self.max_bytes,
            });
        }

        let text = fs::read_to_string(&self.path).map_err(PersistenceError::io(&self.path))?;
        let raw: Snapshot =
            serde_json::from_str(&text).map_err(|source| PersistenceError::Parse {
                path: self.path.clone(),
                source,
            })?;

        Ok(raw
            .into_iter()
            .map(|(name, entry)| {
                let entry = entry.normalized(&name);
                (name, entry)
            })
            .collect())
    }
}

/// Write `path` atomically, with `write_body` producing the contents.
///
/// The body goes to a temporary sibling of `path` which is synced and then
/// renamed into place. If `write_body` or any later step fails, the
/// temporary file is removed and `path` keeps its previous contents.
pub fn write_atomic<F>(path: &Path, write_body: F) -> Result<(), PersistenceError>
where
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).map_err(PersistenceError::io(&dir))?;

    let mut tmp = tempfile::Builder::new()
        .prefix(".agent-stats")
        .suffix(".tmp")
        .tempfile_in(&dir)
        .map_err(PersistenceError::io(&dir))?;

    write_body(tmp.as_file_mut()).map_err(PersistenceError::io(tmp.path()))?;
    tmp.as_file()
        .sync_all()
        .map_err(PersistenceError::io(tmp.path()))?;
    tmp.persist(path)
        .map_err(|e| PersistenceError::io(path)(e.error))?;
    if let Err(e) = sync_dir(&dir) {
        tracing::debug!(
            target: "agentdeck::persist",
            dir = %dir.display(),
            error = %e,
            "directory sync after rename failed"
        );
    }
    Ok(())
}

/// Flush a directory entry so a completed rename survives a crash.
#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::StatEntry;
    use time::macros::datetime;

    fn sample() -> Snapshot {
        let t = datetime!(2024-06-01 08:30:00.123456789 UTC);
        let entry = StatEntry::initial("alpha", t)
            .with_invocation(true, 12, t)
            .unwrap();
        Snapshot::from([("alpha".to_string(), entry)])
    }

    #[test]
    fn missing_file_loads_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(tmp.path().join("absent.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn save_creates_parent_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(tmp.path().join("nested/deeper/stats.json"));
        store.save(&sample()).unwrap();
        assert_eq!(store.load().unwrap(), sample());
    }

    #[test]
    fn write_atomic_replaces_existing_file_and_leaves_no_temp() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("fresh/stats.json");
        write_atomic(&path, |f| f.write_all(b"first")).unwrap();
        write_atomic(&path, |f| f.write_all(b"second")).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        let names: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("stats.json")]);
    }

    #[test]
    fn failed_body_keeps_previous_contents() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("stats.json");
        fs::write(&path, "old").unwrap();
        let err = write_atomic(&path, |_| Err(io::Error::other("boom"))).unwrap_err();
        assert!(matches!(err, PersistenceError::Io { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "old");
    }

    #[cfg(unix)]
    #[test]
    fn directory_sync_succeeds_on_existing_dir() {
        let tmp = tempfile::tempdir().unwrap();
        sync_dir(tmp.path()).unwrap();
    }

    #[test]
    fn oversized_snapshot_is_refused() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(tmp.path().join("stats.json")).with_max_bytes(16);
        let err = store.save(&sample()).unwrap_err();
        assert!(matches!(err, PersistenceError::TooLarge { limit: 16, .. }));
        assert!(!store.path().exists());
    }

    #[test]
    fn oversized_file_is_not_read() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("stats.json");
        fs::write(&path, "{}                                ").unwrap();
        let store = JsonFileStore::new(&path).with_max_bytes(4);
        assert!(matches!(
            store.load(),
            Err(PersistenceError::TooLarge { .. })
        ));
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("stats.json");
        fs::write(&path, "{ not json").unwrap();
        let err = JsonFileStore::new(&path).load().unwrap_err();
        assert!(matches!(err, PersistenceError::Parse { .. }));
        assert!(err.to_string().contains("stats.json"));
    }

    #[test]
    fn loaded_entries_are_normalized() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("stats.json");
        fs::write(
            &path,
            r#"{"beta":{"invocationCount":4,"successCount":1,"totalResponseTimeMs":100,
                "averageResponseTimeMs":1.0,
                "lastUsed":"2024-01-02T00:00:00Z","firstUsed":"2024-01-01T00:00:00Z"}}"#,
        )
        .unwrap();

        let snap = JsonFileStore::new(&path).load().unwrap();
        let beta = &snap["beta"];
        assert_eq!(beta.agent_name, "beta");
        assert_eq!(beta.failure_count, 3);
        assert_eq!(beta.average_response_time_ms, 25.0);
    }
}

//! Snapshot persistence backends
//!
//! The default store keeps the snapshot in `~/.config/tabdeck/last_session.yaml`.

use super::SessionSnapshot;
use anyhow::{Context, Result, bail};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};

/// Where snapshots are kept between runs
pub trait SnapshotStore: Send + Sync + 'static {
    /// Read the stored snapshot. `Ok(None)` when nothing is stored.
    fn load(&self) -> Result<Option<SessionSnapshot>>;

    fn save(&self, snapshot: &SessionSnapshot) -> Result<()>;

    /// Remove the stored snapshot. Clearing an empty store succeeds.
    fn clear(&self) -> Result<()>;
}

/// Snapshot stored as a YAML file
#[derive(Debug, Clone)]
pub struct YamlSnapshotStore {
    path: PathBuf,
}

impl YamlSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for YamlSnapshotStore {
    fn load(&self) -> Result<Option<SessionSnapshot>> {
        let path = &self.path;
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read session snapshot from {:?}", path))?;

        if contents.trim().is_empty() {
            return Ok(None);
        }

        let snapshot: SessionSnapshot = serde_yaml_ng::from_str(&contents)
            .with_context(|| format!("Failed to parse session snapshot from {:?}", path))?;

        log::info!(
            "Loaded session snapshot ({} tabs) from {:?}",
            snapshot.tabs.len(),
            path
        );
        Ok(Some(snapshot))
    }

    fn save(&self, snapshot: &SessionSnapshot) -> Result<()> {
        let path = &self.path;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        let contents =
            serde_yaml_ng::to_string(snapshot).context("Failed to serialize session snapshot")?;

        let temp_path = path.with_extension("yaml.tmp");
        std::fs::write(&temp_path, contents)
            .with_context(|| format!("Failed to write session snapshot to {:?}", temp_path))?;
        std::fs::rename(&temp_path, path)
            .with_context(|| format!("Failed to move session snapshot into place at {:?}", path))?;

        log::info!(
            "Saved session snapshot ({} tabs) to {:?}",
            snapshot.tabs.len(),
            path
        );
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let path = &self.path;
        if path.exists() {
            std::fs::remove_file(path)
                .with_context(|| format!("Failed to remove session snapshot {:?}", path))?;
            log::info!("Cleared session snapshot {:?}", path);
        }
        Ok(())
    }
}

/// In-process store that counts calls, for embedding and tests
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    state: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    snapshot: Option<SessionSnapshot>,
    loads: usize,
    saves: usize,
    clears: usize,
    fail_writes: bool,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with `snapshot`
    pub fn with_snapshot(snapshot: SessionSnapshot) -> Self {
        let store = Self::default();
        store.state.lock().snapshot = Some(snapshot);
        store
    }

    /// Make subsequent `save` and `clear` calls fail
    pub fn set_fail_writes(&self, fail: bool) {
        self.state.lock().fail_writes = fail;
    }

    pub fn snapshot(&self) -> Option<SessionSnapshot> {
        self.state.lock().snapshot.clone()
    }

    pub fn load_count(&self) -> usize {
        self.state.lock().loads
    }

    pub fn save_count(&self) -> usize {
        self.state.lock().saves
    }

    pub fn clear_count(&self) -> usize {
        self.state.lock().clears
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self) -> Result<Option<SessionSnapshot>> {
        let mut state = self.state.lock();
        state.loads += 1;
        Ok(state.snapshot.clone())
    }

    fn save(&self, snapshot: &SessionSnapshot) -> Result<()> {
        let mut state = self.state.lock();
        state.saves += 1;
        if state.fail_writes {
            bail!("snapshot store is read-only");
        }
        state.snapshot = Some(snapshot.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut state = self.state.lock();
        state.clears += 1;
        if state.fail_writes {
            bail!("snapshot store is read-only");
        }
        state.snapshot = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SnapshotTab;
    use tempfile::tempdir;

    fn sample_snapshot() -> SessionSnapshot {
        SessionSnapshot {
            saved_at: "2025-01-01T00:00:00Z".to_string(),
            tabs: vec![
                SnapshotTab::Terminal {
                    cwd: PathBuf::from("/home/user/work"),
                    name: "Terminal 1".to_string(),
                    user_named: false,
                    project_id: None,
                    project_name: None,
                },
                SnapshotTab::Editor {
                    path: PathBuf::from("/home/user/work/src/lib.rs"),
                    file_name: "lib.rs".to_string(),
                    project_path: Some(PathBuf::from("/home/user/work")),
                },
            ],
            active_index: Some(1),
        }
    }

    #[test]
    fn test_load_nonexistent_file() {
        let temp = tempdir().unwrap();
        let store = YamlSnapshotStore::new(temp.path().join("nonexistent.yaml"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_load_empty_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("empty.yaml");
        std::fs::write(&path, "").unwrap();
        assert!(YamlSnapshotStore::new(path).load().unwrap().is_none());
    }

    #[test]
    fn test_load_corrupt_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("corrupt.yaml");
        std::fs::write(&path, "not: valid: yaml: [[[").unwrap();
        assert!(YamlSnapshotStore::new(path).load().is_err());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp = tempdir().unwrap();
        let store = YamlSnapshotStore::new(temp.path().join("nested").join("session.yaml"));

        store.save(&sample_snapshot()).unwrap();
        assert!(store.path().exists());
        assert!(!store.path().with_extension("yaml.tmp").exists());

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded, sample_snapshot());
    }

    #[test]
    fn test_clear() {
        let temp = tempdir().unwrap();
        let store = YamlSnapshotStore::new(temp.path().join("to_clear.yaml"));
        store.save(&sample_snapshot()).unwrap();
        store.clear().unwrap();
        assert!(!store.path().exists());
        // Clearing again is fine
        store.clear().unwrap();
    }

    #[test]
    fn test_memory_store_counts_and_failures() {
        let store = MemorySnapshotStore::with_snapshot(sample_snapshot());
        assert!(store.load().unwrap().is_some());
        store.set_fail_writes(true);
        assert!(store.clear().is_err());
        assert!(store.snapshot().is_some());
        store.set_fail_writes(false);
        store.clear().unwrap();
        assert_eq!(store.load_count(), 1);
        assert_eq!(store.clear_count(), 2);
        assert_eq!(store.save_count(), 0);
        assert!(store.snapshot().is_none());
    }
}

use crate::app_dirs::AppDirs;
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;

/// The two logical keys the timer persists. Start is epoch milliseconds,
/// work is minutes. There is no transactional guarantee across them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreKey {
    Start,
    Work,
}

/// Durable key-value storage for the timer.
///
/// `get` resolves storage errors to absent (logging them here, not at the
/// caller); `set` and `remove` are best-effort and never gate a state
/// transition in the engine.
pub trait SessionStore {
    fn get(&self, key: StoreKey) -> Option<u64>;
    fn set(&self, key: StoreKey, value: u64) -> io::Result<()>;
    fn remove(&self, key: StoreKey) -> io::Result<()>;
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
struct SessionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    start_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    work_minutes: Option<u64>,
}

impl SessionData {
    fn slot(&mut self, key: StoreKey) -> &mut Option<u64> {
        match key {
            StoreKey::Start => &mut self.start_ms,
            StoreKey::Work => &mut self.work_minutes,
        }
    }

    fn value(&self, key: StoreKey) -> Option<u64> {
        match key {
            StoreKey::Start => self.start_ms,
            StoreKey::Work => self.work_minutes,
        }
    }
}

/// JSON-file-backed store under the platform state directory.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::session_path()
            .unwrap_or_else(|| PathBuf::from("pausa_session.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    fn read(&self) -> SessionData {
        match fs::read(&self.path) {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(data) => data,
                Err(err) => {
                    warn!(path = %self.path.display(), error = %err,
                        "unreadable session file, treating as empty");
                    SessionData::default()
                }
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => SessionData::default(),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err,
                    "failed to read session file, treating as empty");
                SessionData::default()
            }
        }
    }

    fn write(&self, data: &SessionData) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let bytes = serde_json::to_vec_pretty(data).map_err(io::Error::other)?;
        fs::write(&self.path, bytes)
    }
}

impl Default for FileSessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: StoreKey) -> Option<u64> {
        self.read().value(key)
    }

    fn set(&self, key: StoreKey, value: u64) -> io::Result<()> {
        let mut data = self.read();
        *data.slot(key) = Some(value);
        self.write(&data)
    }

    fn remove(&self, key: StoreKey) -> io::Result<()> {
        let mut data = self.read();
        if data.slot(key).take().is_none() {
            return Ok(());
        }
        self.write(&data)
    }
}

/// In-memory store for tests, with a toggle to make writes fail so the
/// engine's swallow-and-continue semantics stay covered.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RefCell<SessionData>,
    fail_writes: Cell<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    fn check_writable(&self) -> io::Result<()> {
        if self.fail_writes.get() {
            Err(io::Error::other("store unavailable"))
        } else {
            Ok(())
        }
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: StoreKey) -> Option<u64> {
        self.data.borrow().value(key)
    }

    fn set(&self, key: StoreKey, value: u64) -> io::Result<()> {
        self.check_writable()?;
        *self.data.borrow_mut().slot(key) = Some(value);
        Ok(())
    }

    fn remove(&self, key: StoreKey) -> io::Result<()> {
        self.check_writable()?;
        self.data.borrow_mut().slot(key).take();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_resolves_to_absent() {
        let dir = tempdir().unwrap();
        let store = FileSessionStore::with_path(dir.path().join("session.json"));

        assert_eq!(store.get(StoreKey::Start), None);
        assert_eq!(store.get(StoreKey::Work), None);
    }

    #[test]
    fn set_then_get_roundtrips_each_key() {
        let dir = tempdir().unwrap();
        let store = FileSessionStore::with_path(dir.path().join("session.json"));

        store.set(StoreKey::Start, 1_700_000_000_000).unwrap();
        store.set(StoreKey::Work, 25).unwrap();

        assert_eq!(store.get(StoreKey::Start), Some(1_700_000_000_000));
        assert_eq!(store.get(StoreKey::Work), Some(25));
    }

    #[test]
    fn remove_clears_only_the_named_key() {
        let dir = tempdir().unwrap();
        let store = FileSessionStore::with_path(dir.path().join("session.json"));

        store.set(StoreKey::Start, 42).unwrap();
        store.set(StoreKey::Work, 25).unwrap();
        store.remove(StoreKey::Start).unwrap();

        assert_eq!(store.get(StoreKey::Start), None);
        assert_eq!(store.get(StoreKey::Work), Some(25));
    }

    #[test]
    fn remove_of_an_absent_key_is_ok() {
        let dir = tempdir().unwrap();
        let store = FileSessionStore::with_path(dir.path().join("session.json"));
        store.remove(StoreKey::Start).unwrap();
    }

    #[test]
    fn corrupt_file_resolves_to_absent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, b"{not json").unwrap();

        let store = FileSessionStore::with_path(&path);
        assert_eq!(store.get(StoreKey::Start), None);
    }

    #[test]
    fn set_recovers_a_corrupt_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, b"garbage").unwrap();

        let store = FileSessionStore::with_path(&path);
        store.set(StoreKey::Work, 30).unwrap();
        assert_eq!(store.get(StoreKey::Work), Some(30));
    }

    #[test]
    fn two_stores_over_the_same_path_observe_each_other() {
        // A restart constructs a new store over the same file.
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");

        FileSessionStore::with_path(&path)
            .set(StoreKey::Start, 7)
            .unwrap();
        assert_eq!(
            FileSessionStore::with_path(&path).get(StoreKey::Start),
            Some(7)
        );
    }

    #[test]
    fn write_failures_surface_as_io_errors() {
        // A regular file where the parent directory should be makes every
        // write path fail; the error must reach the caller, never produce
        // a truncated session file.
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"").unwrap();

        let store = FileSessionStore::with_path(blocker.join("session.json"));
        assert!(store.set(StoreKey::Work, 25).is_err());
        assert_eq!(std::fs::read(&blocker).unwrap(), b"");
    }

    #[test]
    fn memory_store_write_failures_are_reported() {
        let store = MemoryStore::new();
        store.set(StoreKey::Work, 25).unwrap();
        store.fail_writes(true);

        assert!(store.set(StoreKey::Work, 30).is_err());
        assert!(store.remove(StoreKey::Work).is_err());
        // Reads still serve the last good value.
        assert_eq!(store.get(StoreKey::Work), Some(25));
    }
}

//! On-device key-value store.
//!
//! # Responsibility
//! - Persist a small string-to-string map as one JSON file.
//! - Guarantee atomic single-key replacement via temp-file rename.
//!
//! # Invariants
//! - A missing file is an empty store; a corrupt file is rejected at open.
//! - `set`/`remove` persist before mutating the in-memory view, so the
//!   in-memory map never claims state the medium did not accept.

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

pub type KvResult<T> = Result<T, KvError>;

/// Key-value medium failure.
#[derive(Debug)]
pub enum KvError {
    /// Medium unreachable (file system rejected the read or write).
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Stored file exists but does not parse as the expected map shape.
    Corrupt { path: PathBuf, detail: String },
    /// The shared handle was poisoned by a panicking holder.
    Poisoned,
}

impl Display for KvError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "key-value store `{}` unreachable: {source}", path.display())
            }
            Self::Corrupt { path, detail } => {
                write!(f, "key-value store `{}` is corrupt: {detail}", path.display())
            }
            Self::Poisoned => write!(f, "key-value store handle is poisoned"),
        }
    }
}

impl Error for KvError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Corrupt { .. } | Self::Poisoned => None,
        }
    }
}

/// Shared handle over one key-value store.
///
/// The design is single-active-caller; the mutex exists to satisfy `Send`
/// at the FFI boundary and is uncontended in practice.
pub type SharedKv = Arc<Mutex<KvStore>>;

/// Wraps a store into the shared handle form consumed by the state layer.
pub fn shared(store: KvStore) -> SharedKv {
    Arc::new(Mutex::new(store))
}

/// Locks a shared handle, converting poisoning into a medium error.
pub fn lock(kv: &SharedKv) -> KvResult<MutexGuard<'_, KvStore>> {
    kv.lock().map_err(|_| KvError::Poisoned)
}

/// File-backed string-to-string store.
#[derive(Debug)]
pub struct KvStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl KvStore {
    /// Opens the store at `path`, loading existing entries.
    ///
    /// A missing file yields an empty store (first run). A present but
    /// unparseable file is rejected instead of being silently replaced.
    pub fn open(path: impl Into<PathBuf>) -> KvResult<Self> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).map_err(|err| KvError::Corrupt {
                path: path.clone(),
                detail: err.to_string(),
            })?,
            Err(err) if err.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(KvError::Io { path, source: err }),
        };
        Ok(Self { path, entries })
    }

    /// Returns the stored value for `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Replaces the value under `key`, persisting before adopting.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> KvResult<()> {
        let mut next = self.entries.clone();
        next.insert(key.to_string(), value.into());
        self.persist(&next)?;
        self.entries = next;
        Ok(())
    }

    /// Removes `key` if present, persisting before adopting.
    pub fn remove(&mut self, key: &str) -> KvResult<()> {
        if !self.entries.contains_key(key) {
            return Ok(());
        }
        let mut next = self.entries.clone();
        next.remove(key);
        self.persist(&next)?;
        self.entries = next;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> KvResult<()> {
        let serialized = serde_json::to_string(entries).map_err(|err| KvError::Corrupt {
            path: self.path.clone(),
            detail: format!("serialization failed: {err}"),
        })?;

        // Replacement through a sibling temp file keeps a single-key write
        // atomic at the file level.
        let staging = self.path.with_extension("tmp");
        fs::write(&staging, serialized).map_err(|err| KvError::Io {
            path: staging.clone(),
            source: err,
        })?;
        fs::rename(&staging, &self.path).map_err(|err| KvError::Io {
            path: self.path.clone(),
            source: err,
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::KvStore;
    use tempfile::TempDir;

    #[test]
    fn missing_file_opens_as_empty_store() {
        let dir = TempDir::new().unwrap();
        let store = KvStore::open(dir.path().join("store.json")).unwrap();
        assert_eq!(store.get("anything"), None);
    }

    #[test]
    fn set_get_and_reopen_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");

        let mut store = KvStore::open(&path).unwrap();
        store.set("alpha", "1").unwrap();
        store.set("beta", "2").unwrap();
        store.set("alpha", "3").unwrap();
        assert_eq!(store.get("alpha"), Some("3"));

        let reopened = KvStore::open(&path).unwrap();
        assert_eq!(reopened.get("alpha"), Some("3"));
        assert_eq!(reopened.get("beta"), Some("2"));
    }

    #[test]
    fn remove_is_idempotent_and_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");

        let mut store = KvStore::open(&path).unwrap();
        store.set("alpha", "1").unwrap();
        store.remove("alpha").unwrap();
        store.remove("alpha").unwrap();

        let reopened = KvStore::open(&path).unwrap();
        assert_eq!(reopened.get("alpha"), None);
    }

    #[test]
    fn corrupt_file_is_rejected_at_open() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "not json at all").unwrap();

        let err = KvStore::open(&path).unwrap_err();
        assert!(err.to_string().contains("corrupt"));
    }

    #[test]
    fn failed_persist_leaves_memory_unchanged() {
        let dir = TempDir::new().unwrap();
        let data_dir = dir.path().join("data");
        std::fs::create_dir_all(&data_dir).unwrap();

        let mut store = KvStore::open(data_dir.join("store.json")).unwrap();
        store.set("alpha", "1").unwrap();

        std::fs::remove_dir_all(&data_dir).unwrap();
        assert!(store.set("alpha", "2").is_err());
        assert_eq!(store.get("alpha"), Some("1"));
    }
}

//! # wearsync-adapter-memory
//!
//! In-process implementations of the store ports backed by hash maps.
//!
//! [`MemoryStore`] stands in for the device-scoped local store;
//! [`MemoryRemoteStore`] stands in for the account-scoped synced store and
//! can simulate writes arriving from other devices via
//! [`MemoryRemoteStore::push_external`].
//!
//! ## Dependency rule
//!
//! Depends on `wearsync-app` (port traits) and `wearsync-domain` only.

use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

use tokio::sync::broadcast;

use wearsync_app::ports::store::{ExternalChange, LocalStore, RemoteStore};
use wearsync_domain::error::StoreError;

const CHANGE_CAPACITY: usize = 16;

/// Device-scoped in-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    map: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw bytes currently stored under `key`, for inspection in tests.
    #[must_use]
    pub fn bytes(&self, key: &str) -> Option<Vec<u8>> {
        self.map.lock().unwrap().get(key).cloned()
    }
}

impl LocalStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.map.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        self.map.lock().unwrap().insert(key.to_owned(), bytes);
        Ok(())
    }
}

/// Account-scoped in-memory store with change notifications.
///
/// Writes through [`RemoteStore::set`] are *not* echoed on the change
/// channel; only [`push_external`](Self::push_external) and
/// [`notify`](Self::notify) emit, mirroring a substrate that reports
/// externally-originated changes only.
#[derive(Debug)]
pub struct MemoryRemoteStore {
    map: Mutex<HashMap<String, Vec<u8>>>,
    changes: broadcast::Sender<ExternalChange>,
    /// Per-value size limit, like a synced-store quota.
    quota: Option<usize>,
}

impl Default for MemoryRemoteStore {
    fn default() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        Self {
            map: Mutex::new(HashMap::new()),
            changes,
            quota: None,
        }
    }
}

impl MemoryRemoteStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that rejects values larger than `bytes`.
    #[must_use]
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            quota: Some(bytes),
            ..Self::default()
        }
    }

    /// Raw bytes currently stored under `key`, for inspection in tests.
    #[must_use]
    pub fn bytes(&self, key: &str) -> Option<Vec<u8>> {
        self.map.lock().unwrap().get(key).cloned()
    }

    /// Simulate another device on the account writing `bytes` under `key`:
    /// stores the value and emits a change notification for it.
    pub fn push_external(&self, key: &str, bytes: Vec<u8>) {
        self.map.lock().unwrap().insert(key.to_owned(), bytes);
        self.notify([key.to_owned()]);
    }

    /// Emit a change notification without touching stored bytes.
    pub fn notify(&self, keys: impl IntoIterator<Item = String>) {
        let change = ExternalChange {
            changed_keys: keys.into_iter().collect::<BTreeSet<_>>(),
        };
        // No receivers is fine; the event is simply dropped.
        let _ = self.changes.send(change);
    }
}

impl RemoteStore for MemoryRemoteStore {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.map.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        if let Some(quota) = self.quota
            && bytes.len() > quota
        {
            return Err(format!("value of {} bytes exceeds {quota}-byte quota", bytes.len()).into());
        }
        self.map.lock().unwrap().insert(key.to_owned(), bytes);
        Ok(())
    }

    fn changes(&self) -> broadcast::Receiver<ExternalChange> {
        self.changes.subscribe()
    }
}

//! Store ports — the two key-value substrates the sync engine reconciles.
//!
//! Reads and writes are bounded, synchronous calls into the substrate; the
//! substrate's own latency (network sync, disk IO) is the adapter's concern.
//! The engine never deletes or mutates keys it does not own.

use std::collections::BTreeSet;

use tokio::sync::broadcast;

use wearsync_domain::error::StoreError;

/// Keys another process or device changed on the shared account.
///
/// Notifications cover the whole account, not one key; consumers filter for
/// the keys they own before reading any bytes.
#[derive(Debug, Clone)]
pub struct ExternalChange {
    pub changed_keys: BTreeSet<String>,
}

impl ExternalChange {
    /// A change event for a single key.
    #[must_use]
    pub fn single(key: impl Into<String>) -> Self {
        Self {
            changed_keys: BTreeSet::from([key.into()]),
        }
    }

    /// Whether `key` is among the changed keys.
    #[must_use]
    pub fn includes(&self, key: &str) -> bool {
        self.changed_keys.contains(key)
    }
}

/// Device-scoped store: always available, synchronous.
pub trait LocalStore {
    /// Raw bytes stored under `key`, if any.
    fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Store `bytes` under `key`.
    ///
    /// # Errors
    ///
    /// Returns the substrate's own error when the write is rejected
    /// (quota, IO).
    fn set(&self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError>;
}

/// Account-scoped store: eventually consistent, shared with other devices
/// and processes, and able to report externally-originated changes.
pub trait RemoteStore {
    /// Raw bytes stored under `key`, if any.
    fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Store `bytes` under `key`.
    ///
    /// # Errors
    ///
    /// Returns the substrate's own error when the write is rejected
    /// (quota, IO).
    fn set(&self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError>;

    /// Subscribe to change notifications for the whole account.
    ///
    /// Only changes made by *other* processes or devices are reported; an
    /// implementation must not echo back writes made through [`Self::set`].
    fn changes(&self) -> broadcast::Receiver<ExternalChange>;
}

impl<T: LocalStore + Send + Sync> LocalStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        (**self).set(key, bytes)
    }
}

impl<T: RemoteStore + Send + Sync> RemoteStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        (**self).set(key, bytes)
    }

    fn changes(&self) -> broadcast::Receiver<ExternalChange> {
        (**self).changes()
    }
}

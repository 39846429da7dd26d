//! Dual-store sync engine — reconciles a local and a remote key-value store
//! into one load/save contract.
//!
//! Loads prefer the remote store and fall back to the local one; saves write
//! local-then-remote so a remote failure still leaves the local store
//! consistent. Externally-originated changes on the remote store re-trigger
//! a decode-and-publish cycle without an explicit `load()` call.

use std::sync::Arc;

use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;

use wearsync_domain::error::{StoreSide, WearSyncError};
use wearsync_domain::loadable::KnownDevices;

use crate::codec;
use crate::ports::loader::KnownDevicesLoader;
use crate::ports::store::{ExternalChange, LocalStore, RemoteStore};

/// Default storage key for the synced device/group aggregate.
///
/// One fixed key, shared by both stores, exclusively engine-owned within the
/// account namespace.
pub const SYNCED_METADATA_KEY: &str = "wearsync.known-devices";

const FEED_CAPACITY: usize = 16;

/// Production [`KnownDevicesLoader`] backed by a local and a remote store.
///
/// One watcher task per engine instance listens for the remote store's
/// external-change notifications; the subscription is torn down when the
/// engine is dropped. Load, save, and external-change handling are
/// serialized behind one internal lock, so interleaved reads of the two
/// stores cannot occur.
///
/// Construction registers the watcher task and therefore requires a running
/// tokio runtime.
pub struct DualStoreLoader<L, R> {
    key: String,
    local: L,
    remote: Arc<R>,
    feed: broadcast::Sender<KnownDevices>,
    gate: Arc<Mutex<()>>,
    watcher: JoinHandle<()>,
}

impl<L, R> DualStoreLoader<L, R>
where
    L: LocalStore,
    R: RemoteStore + Send + Sync + 'static,
{
    /// Create an engine for `key` over the two given stores.
    #[must_use]
    pub fn new(key: impl Into<String>, local: L, remote: Arc<R>) -> Self {
        let key = key.into();
        let (feed, _) = broadcast::channel(FEED_CAPACITY);
        let gate = Arc::new(Mutex::new(()));
        // Subscribe before spawning so no notification can slip between
        // construction and the watcher's first poll.
        let changes = remote.changes();
        let watcher = tokio::spawn(watch_remote(
            key.clone(),
            changes,
            Arc::clone(&remote),
            feed.clone(),
            Arc::clone(&gate),
        ));
        Self {
            key,
            local,
            remote,
            feed,
            gate,
            watcher,
        }
    }

    /// Create an engine over the default storage key,
    /// [`SYNCED_METADATA_KEY`].
    #[must_use]
    pub fn with_default_key(local: L, remote: Arc<R>) -> Self {
        Self::new(SYNCED_METADATA_KEY, local, remote)
    }

    /// The storage key this engine owns.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl<L, R> Drop for DualStoreLoader<L, R> {
    fn drop(&mut self) {
        // Unregister the external-change subscription with the engine.
        self.watcher.abort();
    }
}

impl<L, R> KnownDevicesLoader for DualStoreLoader<L, R>
where
    L: LocalStore + Send + Sync,
    R: RemoteStore + Send + Sync + 'static,
{
    #[tracing::instrument(skip_all, fields(key = %self.key))]
    async fn load(&self) -> Result<(), WearSyncError> {
        let _guard = self.gate.lock().await;
        let bytes = self
            .remote
            .get(&self.key)
            .filter(|bytes| !bytes.is_empty())
            .or_else(|| self.local.get(&self.key))
            .filter(|bytes| !bytes.is_empty());
        let Some(bytes) = bytes else {
            // Nothing persisted anywhere: an empty aggregate, no emission.
            return Ok(());
        };
        // Decode errors propagate unmasked. A mismatch or corruption in the
        // preferred store is not papered over with the other store's
        // possibly-older bytes.
        let aggregate = codec::decode(&bytes)?;
        let _ = self.feed.send(aggregate);
        Ok(())
    }

    #[tracing::instrument(skip_all, fields(key = %self.key))]
    async fn save(&self, aggregate: KnownDevices) -> Result<(), WearSyncError> {
        let _guard = self.gate.lock().await;
        let bytes = codec::encode(&aggregate)?;
        self.local
            .set(&self.key, bytes.clone())
            .map_err(|source| WearSyncError::PersistenceWriteFailed {
                store: StoreSide::Local,
                source,
            })?;
        self.remote
            .set(&self.key, bytes)
            .map_err(|source| WearSyncError::PersistenceWriteFailed {
                store: StoreSide::Remote,
                source,
            })?;
        Ok(())
    }

    fn loaded(&self) -> broadcast::Receiver<KnownDevices> {
        self.feed.subscribe()
    }
}

/// Consume the remote store's account-wide change notifications.
///
/// Runs until the notification channel closes or the engine is dropped.
/// Failures on this path are logged and dropped: there is no synchronous
/// caller to report to, and a malformed externally-originated payload must
/// not disturb the last good in-memory aggregate.
async fn watch_remote<R>(
    key: String,
    mut changes: broadcast::Receiver<ExternalChange>,
    remote: Arc<R>,
    feed: broadcast::Sender<KnownDevices>,
    gate: Arc<Mutex<()>>,
) where
    R: RemoteStore + Send + Sync,
{
    loop {
        match changes.recv().await {
            Ok(change) => {
                if !change.includes(&key) {
                    continue;
                }
                let _guard = gate.lock().await;
                let Some(bytes) = remote.get(&key) else {
                    // An unrelated external event must not regress local
                    // state to empty.
                    continue;
                };
                match codec::decode(&bytes) {
                    Ok(aggregate) => {
                        let _ = feed.send(aggregate);
                    }
                    Err(error) => {
                        tracing::warn!(key = %key, %error, "dropping undecodable external update");
                    }
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(key = %key, skipped, "external change feed lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    use tokio::time::timeout;

    use wearsync_domain::device::{DeviceMetadata, DeviceModel};
    use wearsync_domain::group::Group;

    struct TestLocal {
        map: StdMutex<HashMap<String, Vec<u8>>>,
        reject_writes: bool,
    }

    impl TestLocal {
        fn new() -> Self {
            Self {
                map: StdMutex::new(HashMap::new()),
                reject_writes: false,
            }
        }

        fn rejecting_writes() -> Self {
            Self {
                map: StdMutex::new(HashMap::new()),
                reject_writes: true,
            }
        }

        fn put(&self, key: &str, bytes: Vec<u8>) {
            self.map.lock().unwrap().insert(key.into(), bytes);
        }

        fn bytes(&self, key: &str) -> Option<Vec<u8>> {
            self.map.lock().unwrap().get(key).cloned()
        }
    }

    impl LocalStore for TestLocal {
        fn get(&self, key: &str) -> Option<Vec<u8>> {
            self.map.lock().unwrap().get(key).cloned()
        }

        fn set(&self, key: &str, bytes: Vec<u8>) -> Result<(), wearsync_domain::error::StoreError> {
            if self.reject_writes {
                return Err("disk full".into());
            }
            self.map.lock().unwrap().insert(key.into(), bytes);
            Ok(())
        }
    }

    struct TestRemote {
        map: StdMutex<HashMap<String, Vec<u8>>>,
        changes: broadcast::Sender<ExternalChange>,
        reject_writes: bool,
    }

    impl TestRemote {
        fn new() -> Self {
            let (changes, _) = broadcast::channel(16);
            Self {
                map: StdMutex::new(HashMap::new()),
                changes,
                reject_writes: false,
            }
        }

        fn rejecting_writes() -> Self {
            Self {
                reject_writes: true,
                ..Self::new()
            }
        }

        fn put(&self, key: &str, bytes: Vec<u8>) {
            self.map.lock().unwrap().insert(key.into(), bytes);
        }

        fn bytes(&self, key: &str) -> Option<Vec<u8>> {
            self.map.lock().unwrap().get(key).cloned()
        }

        /// Simulate another device writing to the account.
        fn push_external(&self, key: &str, bytes: Vec<u8>) {
            self.put(key, bytes);
            let _ = self.changes.send(ExternalChange::single(key));
        }

        /// Simulate a change notification with no backing bytes.
        fn notify_only(&self, key: &str) {
            let _ = self.changes.send(ExternalChange::single(key));
        }

        fn subscriber_count(&self) -> usize {
            self.changes.receiver_count()
        }
    }

    impl RemoteStore for TestRemote {
        fn get(&self, key: &str) -> Option<Vec<u8>> {
            self.map.lock().unwrap().get(key).cloned()
        }

        fn set(&self, key: &str, bytes: Vec<u8>) -> Result<(), wearsync_domain::error::StoreError> {
            if self.reject_writes {
                return Err("over quota".into());
            }
            self.map.lock().unwrap().insert(key.into(), bytes);
            Ok(())
        }

        fn changes(&self) -> broadcast::Receiver<ExternalChange> {
            self.changes.subscribe()
        }
    }

    fn aggregate_named(device_name: &str) -> KnownDevices {
        let device = DeviceMetadata::builder()
            .mac("AA:BB:CC:DD:EE:FF")
            .serial("0421")
            .model(DeviceModel::WearC)
            .name(device_name)
            .build()
            .unwrap();
        let group = Group::builder()
            .name("Lab")
            .member("AA:BB:CC:DD:EE:FF")
            .build()
            .unwrap();
        KnownDevices {
            devices: vec![device],
            groups: vec![group],
            groups_recovery: Vec::new(),
        }
    }

    fn engine(local: TestLocal, remote: Arc<TestRemote>) -> DualStoreLoader<TestLocal, TestRemote> {
        DualStoreLoader::with_default_key(local, remote)
    }

    async fn recv(
        rx: &mut broadcast::Receiver<KnownDevices>,
    ) -> Result<KnownDevices, &'static str> {
        timeout(Duration::from_millis(500), rx.recv())
            .await
            .map_err(|_| "no emission within timeout")?
            .map_err(|_| "feed closed")
    }

    async fn assert_no_emission(rx: &mut broadcast::Receiver<KnownDevices>) {
        let result = timeout(Duration::from_millis(100), rx.recv()).await;
        assert!(result.is_err(), "feed emitted unexpectedly");
    }

    #[tokio::test]
    async fn should_prefer_remote_bytes_when_both_stores_have_data() {
        let local = TestLocal::new();
        local.put(SYNCED_METADATA_KEY, codec::encode(&aggregate_named("Stale")).unwrap());
        let remote = Arc::new(TestRemote::new());
        remote.put(SYNCED_METADATA_KEY, codec::encode(&aggregate_named("Fresh")).unwrap());

        let engine = engine(local, remote);
        let mut rx = engine.loaded();
        engine.load().await.unwrap();

        let loaded = recv(&mut rx).await.unwrap();
        assert_eq!(loaded.devices[0].name, "Fresh");
    }

    #[tokio::test]
    async fn should_fall_back_to_local_when_remote_has_no_bytes() {
        let local = TestLocal::new();
        local.put(SYNCED_METADATA_KEY, codec::encode(&aggregate_named("Offline")).unwrap());
        // Empty remote bytes count as absent, same as a missing key.
        let remote = Arc::new(TestRemote::new());
        remote.put(SYNCED_METADATA_KEY, Vec::new());

        let engine = engine(local, remote);
        let mut rx = engine.loaded();
        engine.load().await.unwrap();

        let loaded = recv(&mut rx).await.unwrap();
        assert_eq!(loaded.devices[0].name, "Offline");
    }

    #[tokio::test]
    async fn should_succeed_silently_when_no_store_has_bytes() {
        let engine = engine(TestLocal::new(), Arc::new(TestRemote::new()));
        let mut rx = engine.loaded();

        engine.load().await.unwrap();

        assert_no_emission(&mut rx).await;
    }

    #[tokio::test]
    async fn should_write_both_stores_on_save() {
        let remote = Arc::new(TestRemote::new());
        let engine = engine(TestLocal::new(), Arc::clone(&remote));
        let aggregate = aggregate_named("Sensor1");

        engine.save(aggregate.clone()).await.unwrap();

        let local_bytes = engine.local.bytes(SYNCED_METADATA_KEY).unwrap();
        let remote_bytes = remote.bytes(SYNCED_METADATA_KEY).unwrap();
        assert_eq!(codec::decode(&local_bytes).unwrap(), aggregate);
        assert_eq!(codec::decode(&remote_bytes).unwrap(), aggregate);
    }

    #[tokio::test]
    async fn should_observe_saved_aggregate_on_subsequent_load() {
        let engine = engine(TestLocal::new(), Arc::new(TestRemote::new()));
        let mut rx = engine.loaded();
        let aggregate = aggregate_named("Sensor1");

        engine.save(aggregate.clone()).await.unwrap();
        engine.load().await.unwrap();

        assert_eq!(recv(&mut rx).await.unwrap(), aggregate);
    }

    #[tokio::test]
    async fn should_propagate_unknown_sentinel_error_without_masking() {
        // The local store holds perfectly good bytes, but the preferred
        // remote copy carries an unknown sentinel: load must fail rather
        // than silently substitute the older local data.
        let local = TestLocal::new();
        local.put(SYNCED_METADATA_KEY, codec::encode(&aggregate_named("Good")).unwrap());
        let remote = Arc::new(TestRemote::new());
        let envelope = serde_json::json!({ "versionSentinel": 7, "payload": [1] });
        remote.put(SYNCED_METADATA_KEY, serde_json::to_vec(&envelope).unwrap());

        let engine = engine(local, remote);
        let mut rx = engine.loaded();

        let result = engine.load().await;
        assert!(matches!(
            result,
            Err(WearSyncError::SchemaVersionMismatch { sentinel: 7 })
        ));
        assert_no_emission(&mut rx).await;
    }

    #[tokio::test]
    async fn should_report_local_side_when_local_write_rejected() {
        let remote = Arc::new(TestRemote::new());
        let engine = engine(TestLocal::rejecting_writes(), Arc::clone(&remote));

        let result = engine.save(aggregate_named("Sensor1")).await;

        assert!(matches!(
            result,
            Err(WearSyncError::PersistenceWriteFailed {
                store: StoreSide::Local,
                ..
            })
        ));
        // Local failed first, so the remote store was never written.
        assert!(remote.bytes(SYNCED_METADATA_KEY).is_none());
    }

    #[tokio::test]
    async fn should_report_remote_side_and_keep_local_write() {
        let remote = Arc::new(TestRemote::rejecting_writes());
        let engine = engine(TestLocal::new(), Arc::clone(&remote));
        let aggregate = aggregate_named("Sensor1");

        let result = engine.save(aggregate.clone()).await;

        assert!(matches!(
            result,
            Err(WearSyncError::PersistenceWriteFailed {
                store: StoreSide::Remote,
                ..
            })
        ));
        // No rollback: the side that succeeded stays written.
        let local_bytes = engine.local.bytes(SYNCED_METADATA_KEY).unwrap();
        assert_eq!(codec::decode(&local_bytes).unwrap(), aggregate);
    }

    #[tokio::test]
    async fn should_emit_update_when_external_change_names_our_key() {
        let remote = Arc::new(TestRemote::new());
        let engine = engine(TestLocal::new(), Arc::clone(&remote));
        let mut rx = engine.loaded();
        let updated = aggregate_named("Renamed");

        remote.push_external(SYNCED_METADATA_KEY, codec::encode(&updated).unwrap());

        assert_eq!(recv(&mut rx).await.unwrap(), updated);
        // The local store stays untouched until the next explicit save.
        assert!(engine.local.bytes(SYNCED_METADATA_KEY).is_none());
    }

    #[tokio::test]
    async fn should_ignore_external_change_for_unrelated_keys() {
        let remote = Arc::new(TestRemote::new());
        let engine = engine(TestLocal::new(), Arc::clone(&remote));
        let mut rx = engine.loaded();

        remote.push_external("someone.elses.key", b"whatever".to_vec());

        assert_no_emission(&mut rx).await;
    }

    #[tokio::test]
    async fn should_ignore_external_change_when_bytes_absent() {
        let remote = Arc::new(TestRemote::new());
        let engine = engine(TestLocal::new(), Arc::clone(&remote));
        let mut rx = engine.loaded();

        remote.notify_only(SYNCED_METADATA_KEY);

        assert_no_emission(&mut rx).await;
    }

    #[tokio::test]
    async fn should_keep_quiet_when_external_bytes_are_malformed() {
        let remote = Arc::new(TestRemote::new());
        let engine = engine(TestLocal::new(), Arc::clone(&remote));
        let mut rx = engine.loaded();

        remote.push_external(SYNCED_METADATA_KEY, b"corrupted by another device".to_vec());
        assert_no_emission(&mut rx).await;

        // The engine still works after skipping the bad update.
        let aggregate = aggregate_named("Sensor1");
        engine.save(aggregate.clone()).await.unwrap();
        engine.load().await.unwrap();
        assert_eq!(recv(&mut rx).await.unwrap(), aggregate);
    }

    #[tokio::test]
    async fn should_unsubscribe_from_changes_on_drop() {
        let remote = Arc::new(TestRemote::new());
        let engine = engine(TestLocal::new(), Arc::clone(&remote));
        assert_eq!(remote.subscriber_count(), 1);

        drop(engine);
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        assert_eq!(remote.subscriber_count(), 0);
    }
}

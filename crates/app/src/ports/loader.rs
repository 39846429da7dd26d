//! Loader contract — the boundary between the sync engine and calling code.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::broadcast;

use wearsync_domain::error::WearSyncError;
use wearsync_domain::loadable::KnownDevices;

/// Load, save, and observe the persisted device/group aggregate.
///
/// There is exactly one production implementation
/// ([`DualStoreLoader`](crate::services::DualStoreLoader)); the trait exists
/// so test doubles are substitutable without touching engine logic.
pub trait KnownDevicesLoader {
    /// Trigger one load cycle. A successful decode is published on the
    /// [`loaded`](Self::loaded) feed; when no stored bytes exist anywhere
    /// this succeeds silently without emitting.
    ///
    /// # Errors
    ///
    /// Propagates the codec's errors for malformed or version-mismatched
    /// stored bytes.
    fn load(&self) -> impl Future<Output = Result<(), WearSyncError>> + Send;

    /// Trigger one save cycle, replacing the stored aggregate wholesale.
    ///
    /// # Errors
    ///
    /// Returns [`WearSyncError::EncodingFailed`] when the aggregate cannot
    /// be serialized, or [`WearSyncError::PersistenceWriteFailed`] when a
    /// store rejects the write.
    fn save(
        &self,
        aggregate: KnownDevices,
    ) -> impl Future<Output = Result<(), WearSyncError>> + Send;

    /// The decoded-aggregate notification feed.
    ///
    /// Emits once per successful load, whether triggered by an explicit
    /// [`load`](Self::load) or by an external change. No replay: a
    /// subscriber only observes aggregates decoded after it subscribed.
    fn loaded(&self) -> broadcast::Receiver<KnownDevices>;
}

impl<T: KnownDevicesLoader + Send + Sync> KnownDevicesLoader for Arc<T> {
    fn load(&self) -> impl Future<Output = Result<(), WearSyncError>> + Send {
        (**self).load()
    }

    fn save(
        &self,
        aggregate: KnownDevices,
    ) -> impl Future<Output = Result<(), WearSyncError>> + Send {
        (**self).save(aggregate)
    }

    fn loaded(&self) -> broadcast::Receiver<KnownDevices> {
        (**self).loaded()
    }
}

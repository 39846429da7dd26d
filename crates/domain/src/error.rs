//! Common error types used across the workspace.
//!
//! One base enum, [`WearSyncError`], with typed sub-errors converted via
//! `#[from]`. Explicit caller actions (`load`, `save`) surface these
//! synchronously; asynchronous external-change handling logs and drops them
//! instead (see the sync engine in the `app` crate).

use std::fmt;

/// Error raised by a key-value store implementation.
///
/// Store substrates are externally owned, so their failures arrive as opaque
/// boxed errors and are wrapped into
/// [`WearSyncError::PersistenceWriteFailed`] by the sync engine.
pub type StoreError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Which of the two reconciled stores an operation touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreSide {
    /// The device-scoped, always-available store.
    Local,
    /// The account-scoped, eventually-consistent store.
    Remote,
}

impl fmt::Display for StoreSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("local"),
            Self::Remote => f.write_str("remote"),
        }
    }
}

/// Base error enum for the wearsync workspace.
#[derive(Debug, thiserror::Error)]
pub enum WearSyncError {
    /// A domain invariant was violated while constructing a model value.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// Stored bytes carry a version sentinel this build does not recognize.
    ///
    /// The payload is left untouched; a best-effort parse of an unknown
    /// schema would risk silent data loss.
    #[error("unrecognized schema version sentinel {sentinel}")]
    SchemaVersionMismatch {
        /// The offending sentinel value found in the envelope.
        sentinel: u32,
    },

    /// Bytes failed structural deserialization (truncated, corrupt, or
    /// missing a required field).
    #[error("malformed envelope: {cause}")]
    MalformedEnvelope {
        /// Human-readable description of the structural failure.
        cause: String,
    },

    /// The current aggregate could not be serialized.
    #[error("encoding failed: {cause}")]
    EncodingFailed {
        /// Human-readable description of the serialization failure.
        cause: String,
    },

    /// A store rejected a write (quota, I/O). The side that succeeded stays
    /// written; no rollback is attempted.
    #[error("{store} store rejected the write")]
    PersistenceWriteFailed {
        /// Which store failed.
        store: StoreSide,
        /// The substrate's own error.
        #[source]
        source: StoreError,
    },
}

/// Domain invariant violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A display name must not be empty.
    #[error("name must not be empty")]
    EmptyName,

    /// A device's MAC address is its stable key and must not be empty.
    #[error("MAC address must not be empty")]
    EmptyMac,
}

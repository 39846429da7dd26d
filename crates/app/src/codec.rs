//! Versioned container codec.
//!
//! The unit actually written to a store is an [`Envelope`]: a small integer
//! version sentinel plus opaque payload bytes. The sentinel identifies
//! exactly one payload schema; each schema version keeps its own pinned DTO
//! module (`v1`, …) so the in-memory model is free to evolve across releases
//! without breaking the ability to read data written by older ones.
//!
//! Decoding is stateless: whatever sentinel is present, the current model is
//! re-derived fresh from that version's DTO. No stored bytes are ever
//! migrated destructively.

mod v1;

use serde::{Deserialize, Serialize};

use wearsync_domain::error::WearSyncError;
use wearsync_domain::loadable::KnownDevices;

/// Schema version written by this build.
pub const CURRENT_VERSION: u32 = 1;

/// The tagged wrapper written to both stores.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    version_sentinel: u32,
    payload: Vec<u8>,
}

/// Decode stored bytes into the current in-memory aggregate.
///
/// Empty input yields an empty aggregate: absence of data is not an error.
///
/// # Errors
///
/// - [`WearSyncError::SchemaVersionMismatch`] when the envelope carries a
///   sentinel this build does not recognize. The payload is not parsed.
/// - [`WearSyncError::MalformedEnvelope`] when the envelope or the payload
///   fails structural deserialization.
pub fn decode(bytes: &[u8]) -> Result<KnownDevices, WearSyncError> {
    if bytes.is_empty() {
        return Ok(KnownDevices::default());
    }
    let envelope: Envelope = serde_json::from_slice(bytes).map_err(malformed)?;
    match envelope.version_sentinel {
        1 => {
            if envelope.payload.is_empty() {
                return Ok(KnownDevices::default());
            }
            let dto: v1::KnownDevicesDto =
                serde_json::from_slice(&envelope.payload).map_err(malformed)?;
            Ok(dto.into_model())
        }
        sentinel => Err(WearSyncError::SchemaVersionMismatch { sentinel }),
    }
}

/// Encode the aggregate with the current schema version.
///
/// The mapping from model to DTO is total; failures can only come from the
/// serialization format itself.
///
/// # Errors
///
/// Returns [`WearSyncError::EncodingFailed`] when serialization fails.
pub fn encode(model: &KnownDevices) -> Result<Vec<u8>, WearSyncError> {
    let dto = v1::KnownDevicesDto::from_model(model);
    let payload = serde_json::to_vec(&dto).map_err(encoding_failed)?;
    let envelope = Envelope {
        version_sentinel: CURRENT_VERSION,
        payload,
    };
    serde_json::to_vec(&envelope).map_err(encoding_failed)
}

fn malformed(err: serde_json::Error) -> WearSyncError {
    WearSyncError::MalformedEnvelope {
        cause: err.to_string(),
    }
}

fn encoding_failed(err: serde_json::Error) -> WearSyncError {
    WearSyncError::EncodingFailed {
        cause: err.to_string(),
    }
}

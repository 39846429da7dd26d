//! Application services — production implementations of the driving ports.

pub mod sync_loader;

pub use sync_loader::{DualStoreLoader, SYNCED_METADATA_KEY};

//! # wearsync-domain
//!
//! Pure domain model for the wearsync device-metadata persistence system.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers and error conventions
//! - Define **DeviceMetadata** (identifying information for a previously-seen
//!   sensor, keyed by MAC address)
//! - Define **Modules** (sensing capabilities detected on a device, with their
//!   hardware variants)
//! - Define **Groups** (user-defined collections of devices by MAC address)
//! - Define **KnownDevices** (the aggregate persisted and loaded as one unit)
//! - Contain all invariant enforcement and domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;

pub mod device;
pub mod group;
pub mod loadable;
pub mod module;

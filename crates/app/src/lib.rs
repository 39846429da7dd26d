//! # wearsync-app
//!
//! Application layer — the versioned container codec, **port definitions**
//! (traits), and the dual-store sync engine.
//!
//! ## Responsibilities
//! - Define the **codec** that maps the in-memory aggregate to and from
//!   schema-versioned envelope bytes, with one pinned DTO module per
//!   historical schema version
//! - Define **port traits** that adapters must implement (driven/outbound
//!   ports): [`ports::LocalStore`], [`ports::RemoteStore`]
//! - Define the **loader contract** (driving/inbound port):
//!   [`ports::KnownDevicesLoader`] — load, save, and a decoded-aggregate
//!   notification feed
//! - Provide the production loader implementation,
//!   [`services::DualStoreLoader`], which reconciles the two stores
//!
//! ## Dependency rule
//! Depends on `wearsync-domain` only (plus `tokio::sync` for channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the
//! reverse.

pub mod codec;
pub mod ports;
pub mod services;

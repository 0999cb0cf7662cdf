//! Client-side state synchronization for streaming proxy administration.
//!
//! This crate sits between `relaydeck-api` and its consumers (the CLI):
//!
//! - **[`ProxyStore`]**: in-memory mirror of the server's proxy collection.
//!   CRUD-shaped operations round-trip through the API and apply the
//!   server's answer; failures are reported both as a returned
//!   [`StoreError`] and in an observable error slot. Snapshots live in
//!   `tokio::sync::watch` channels, so readers never block writers.
//!
//! - **[`ProxyStream`]**: subscription handle vended by the store, exposing
//!   `current()` / `latest()` / `changed()` or a `Stream`.
//!
//! - **[`RealtimeBridge`]**: routes pushed [`PushMessage`]s into
//!   [`ProxyStore::update_proxy_in_state`] and publishes aggregate stats.
//!
//! - **[`ProxyFilter`]**, **[`ProxySummary`]** and the [`Validate`] trait:
//!   pure helpers over records and requests.

pub mod bridge;
pub mod config;
pub mod error;
pub mod filter;
pub mod requests;
pub mod store;
pub mod stream;
pub mod summary;

// ── Primary re-exports ──────────────────────────────────────────────
pub use bridge::RealtimeBridge;
pub use config::StoreConfig;
pub use error::StoreError;
pub use filter::ProxyFilter;
pub use requests::Validate;
pub use store::{ProxyStore, StoreOptions};
pub use stream::{ProxyStream, ProxyWatchStream};
pub use summary::ProxySummary;

// Wire types consumers need alongside the store.
pub use relaydeck_api::{
    CreateProxyRequest, HealthCheckResult, HealthStatus, ProxyId, ProxyRecord, ProxyStatus,
    PushMessage, ReconnectConfig, StreamingStats, TlsMode, UpdateProxyRequest,
};

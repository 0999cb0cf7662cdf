// relaydeck-api: Async Rust client for the streaming proxy administration API

pub mod auth;
pub mod client;
pub mod error;
pub mod push;
pub mod transport;
pub mod types;

pub use auth::SessionToken;
pub use client::ApiClient;
pub use error::Error;
pub use push::{PushHandle, PushMessage, ReconnectConfig};
pub use transport::{TlsMode, TransportConfig};
pub use types::{
    ApiResponse, CreateProxyRequest, HealthCheckResult, HealthStatus, ProxyId, ProxyQuery,
    ProxyRecord, ProxyStatus, StreamingStats, UpdateProxyRequest,
};

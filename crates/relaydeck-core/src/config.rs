// ── Runtime store configuration ──
//
// Describes how a `ProxyStore` reaches the dashboard API and its push
// channel. Carries token material and connection tuning but never touches
// disk; the CLI builds one from a config profile and hands it in.

use std::time::Duration;

use relaydeck_api::{ReconnectConfig, SessionToken, TlsMode, TransportConfig};
use secrecy::SecretString;
use url::Url;

/// Configuration for one store instance.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Base URL of the proxy collection (the `/proxies` segment is appended).
    pub api_url: Url,
    /// WebSocket endpoint for pushed updates. `None` disables the bridge.
    pub push_url: Option<Url>,
    /// Bearer token for the dashboard session.
    pub token: Option<SecretString>,
    /// TLS verification strategy.
    pub tls: TlsMode,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Push channel reconnect policy.
    pub reconnect: ReconnectConfig,
}

impl StoreConfig {
    /// Config for `api_url` with every other field at its default.
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url,
            push_url: None,
            token: None,
            tls: TlsMode::default(),
            timeout: Duration::from_secs(30),
            reconnect: ReconnectConfig::default(),
        }
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: self.tls.clone(),
            timeout: self.timeout,
        }
    }

    pub(crate) fn session(&self) -> Option<SessionToken> {
        self.token.clone().map(SessionToken::new)
    }
}

use thiserror::Error;

/// Top-level error type for the `relaydeck-api` crate.
///
/// Covers every failure mode of the REST client and the push channel.
/// `relaydeck-core` normalizes these into a single user-facing message.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The server rejected the request with HTTP 401.
    #[error("{message}")]
    Unauthorized { message: String },

    /// The local session token is past its expiry; nothing was sent.
    #[error("Session expired. Please log in again.")]
    SessionExpired,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The base URL cannot carry path segments (e.g. `mailto:`).
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── API envelope ────────────────────────────────────────────────
    /// The server answered `success: false`, or a non-2xx status.
    ///
    /// `message` is the server-provided `error` text, when there was one.
    #[error(
        "API request failed (HTTP {status}){}",
        .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default()
    )]
    Api { message: Option<String>, status: u16 },

    /// A successful envelope arrived without the `data` payload.
    #[error("Response for {operation} carried no data")]
    MissingData { operation: &'static str },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    // ── Push channel ────────────────────────────────────────────────
    /// WebSocket connection failed.
    #[error("WebSocket connection failed: {0}")]
    WebSocketConnect(String),
}

impl Error {
    /// The explicit message the server attached to this failure, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Api { message, .. } => message.as_deref(),
            Self::Unauthorized { message } => Some(message),
            _ => None,
        }
    }
}

//! Real-time push channel with auto-reconnect.
//!
//! Connects to the dashboard's WebSocket endpoint and streams parsed
//! [`PushMessage`]s through a [`tokio::sync::broadcast`] channel.
//! Reconnects with exponential backoff + jitter automatically.
//!
//! Each text frame is one JSON object tagged by `type`:
//!
//! ```json
//! { "type": "proxy_update", "data": { "id": "p1", "name": "...", ... } }
//! { "type": "stats_update", "data": { "totalProxies": 4, ... } }
//! ```
//!
//! `proxy_update` carries a full [`ProxyRecord`]; frames that fail to
//! decode (including partial records) are logged and skipped.
//!
//! # Example
//!
//! ```rust,ignore
//! use relaydeck_api::push::{PushHandle, ReconnectConfig};
//! use tokio_util::sync::CancellationToken;
//! use url::Url;
//!
//! let cancel = CancellationToken::new();
//! let url = Url::parse("wss://dash.example.org/ws/streaming-proxies")?;
//!
//! let handle = PushHandle::connect(url, ReconnectConfig::default(), cancel.clone(), None);
//! let mut rx = handle.subscribe();
//!
//! while let Ok(message) = rx.recv().await {
//!     println!("{message:?}");
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_tungstenite::tungstenite::{self, ClientRequestBuilder};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::auth::SessionToken;
use crate::error::Error;
use crate::types::{ProxyRecord, StreamingStats};

// ── Broadcast channel capacity ───────────────────────────────────────

const PUSH_CHANNEL_CAPACITY: usize = 256;

// ── PushMessage ──────────────────────────────────────────────────────

/// One decoded push notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PushMessage {
    /// A proxy record changed server-side. Always a full record.
    #[serde(rename = "proxy_update")]
    ProxyUpdated(ProxyRecord),

    /// Aggregate stats refreshed.
    #[serde(rename = "stats_update")]
    StatsUpdated(StreamingStats),
}

// ── ReconnectConfig ──────────────────────────────────────────────────

/// Backoff schedule for the push reconnect loop.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// First retry waits this long (1s unless overridden).
    pub initial_delay: Duration,

    /// Doubling stops here (30s unless overridden).
    pub max_delay: Duration,

    /// Failed attempts tolerated in a row; unbounded when `None`.
    pub max_retries: Option<u32>,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_retries: None,
        }
    }
}

// ── PushHandle ───────────────────────────────────────────────────────

/// Handle to a running push connection.
///
/// Call [`shutdown`](Self::shutdown) (or cancel the token passed to
/// [`connect`](Self::connect)) to tear down the background task.
pub struct PushHandle {
    message_rx: broadcast::Receiver<Arc<PushMessage>>,
    cancel: CancellationToken,
}

impl PushHandle {
    /// Spawn the connect/reconnect loop and return immediately.
    ///
    /// The first connection attempt happens asynchronously; subscribe to
    /// start consuming messages.
    pub fn connect(
        url: Url,
        reconnect: ReconnectConfig,
        cancel: CancellationToken,
        session: Option<SessionToken>,
    ) -> Self {
        let (message_tx, message_rx) = broadcast::channel(PUSH_CHANNEL_CAPACITY);

        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            push_loop(url, message_tx, reconnect, task_cancel, session).await;
        });

        Self { message_rx, cancel }
    }

    /// Get a new receiver for the message stream.
    ///
    /// A consumer that falls behind receives
    /// [`broadcast::error::RecvError::Lagged`].
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<PushMessage>> {
        self.message_rx.resubscribe()
    }

    /// Signal the background task to shut down.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

impl Drop for PushHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

// ── Background reconnection loop ─────────────────────────────────────

/// Reconnect until cancelled or out of retries.
///
/// Every reconnect waits out the backoff, including after a clean close.
/// The schedule only resets once a connection has delivered a frame, so a
/// server that accepts and immediately hangs up is retried at the same
/// pace as one that refuses outright.
async fn push_loop(
    url: Url,
    message_tx: broadcast::Sender<Arc<PushMessage>>,
    reconnect: ReconnectConfig,
    cancel: CancellationToken,
    session: Option<SessionToken>,
) {
    let mut attempt: u32 = 0;

    loop {
        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            result = connect_and_read(&url, &message_tx, &cancel, session.as_ref()) => result,
        };
        if cancel.is_cancelled() {
            break;
        }

        match result {
            Ok(frames) if frames > 0 => {
                tracing::info!(frames, "push channel disconnected, reconnecting");
                attempt = 0;
            }
            Ok(_) => {
                tracing::warn!(attempt, "push channel closed before any frame arrived");
            }
            Err(e) => {
                tracing::warn!(error = %e, attempt, "push channel error");
            }
        }

        if let Some(max) = reconnect.max_retries {
            if attempt >= max {
                tracing::error!(max_retries = max, "push reconnection limit reached, giving up");
                break;
            }
        }

        let delay = calculate_backoff(attempt, &reconnect);
        tracing::info!(
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            attempt,
            "waiting before reconnect"
        );

        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(delay) => {}
        }

        attempt = attempt.saturating_add(1);
    }

    tracing::debug!("push loop exiting");
}

// ── Single connection lifecycle ──────────────────────────────────────

/// Establish one WebSocket connection and read frames until it drops.
/// Returns how many text frames arrived before the close.
async fn connect_and_read(
    url: &Url,
    message_tx: &broadcast::Sender<Arc<PushMessage>>,
    cancel: &CancellationToken,
    session: Option<&SessionToken>,
) -> Result<u64, Error> {
    tracing::info!(url = %url, "connecting to push channel");

    let uri: tungstenite::http::Uri = url
        .as_str()
        .parse()
        .map_err(|e: tungstenite::http::uri::InvalidUri| Error::WebSocketConnect(e.to_string()))?;

    let mut request = ClientRequestBuilder::new(uri);
    if let Some(session) = session {
        if session.is_expired() {
            return Err(Error::SessionExpired);
        }
        request = request.with_header("Authorization", format!("Bearer {}", session.bearer()));
    }

    let (ws_stream, _response) = tokio_tungstenite::connect_async(request)
        .await
        .map_err(|e| Error::WebSocketConnect(e.to_string()))?;

    tracing::info!("push channel connected");

    let (_write, mut read) = ws_stream.split();
    let mut frames: u64 = 0;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => return Ok(frames),
            frame = read.next() => {
                match frame {
                    Some(Ok(tungstenite::Message::Text(text))) => {
                        frames += 1;
                        parse_and_broadcast(&text, message_tx);
                    }
                    Some(Ok(tungstenite::Message::Close(frame))) => {
                        if let Some(ref cf) = frame {
                            tracing::info!(code = %cf.code, reason = %cf.reason, "push close frame received");
                        } else {
                            tracing::info!("push close frame received (no payload)");
                        }
                        return Ok(frames);
                    }
                    Some(Err(e)) => {
                        return Err(Error::WebSocketConnect(e.to_string()));
                    }
                    None => {
                        tracing::info!("push stream ended");
                        return Ok(frames);
                    }
                    // Ping is answered by tungstenite; binary frames are not part of the protocol
                    Some(Ok(_)) => {}
                }
            }
        }
    }
}

// ── Message parsing ──────────────────────────────────────────────────

/// Decode one text frame and broadcast it. Undecodable frames are skipped.
fn parse_and_broadcast(text: &str, message_tx: &broadcast::Sender<Arc<PushMessage>>) {
    match serde_json::from_str::<PushMessage>(text) {
        Ok(message) => {
            // No active subscribers is not an error
            let _ = message_tx.send(Arc::new(message));
        }
        Err(e) => {
            tracing::debug!(error = %e, "skipping undecodable push frame");
        }
    }
}

// ── Backoff calculation ──────────────────────────────────────────────

/// `initial_delay * 2^attempt`, capped at `max_delay`, scaled by up to ±25%.
fn calculate_backoff(attempt: u32, config: &ReconnectConfig) -> Duration {
    let exponent = i32::try_from(attempt.min(30)).unwrap_or(30);
    let base = config.initial_delay.as_secs_f64() * 2.0_f64.powi(exponent);
    let capped = base.min(config.max_delay.as_secs_f64());

    // Deterministic jitter seeded from the attempt number.
    let jitter_factor = 1.0 + 0.25 * (f64::from(attempt) * 7.3).sin();
    let with_jitter = (capped * jitter_factor).max(0.0);

    Duration::from_secs_f64(with_jitter)
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{HealthStatus, ProxyStatus};

    #[test]
    fn retry_schedule_grows_then_plateaus() {
        let config = ReconnectConfig {
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
            max_retries: Some(3),
        };

        let delays: Vec<Duration> = (0..4).map(|n| calculate_backoff(n, &config)).collect();
        assert!(delays.windows(2).all(|w| w[1] > w[0]), "{delays:?}");

        for attempt in [20, 31, u32::MAX] {
            let d = calculate_backoff(attempt, &config);
            assert!(d <= Duration::from_millis(6_250), "attempt {attempt}: {d:?}");
        }
    }

    #[test]
    fn retry_schedule_is_deterministic() {
        let config = ReconnectConfig::default();
        assert_eq!(calculate_backoff(3, &config), calculate_backoff(3, &config));
        assert!(ReconnectConfig::default().max_retries.is_none());
    }

    #[test]
    fn decodes_proxy_update() {
        let raw = serde_json::json!({
            "type": "proxy_update",
            "data": {
                "id": "p2",
                "name": "Youth Hall",
                "serverLocation": "Accra",
                "status": "maintenance",
                "healthStatus": "warning",
                "currentActiveStreams": 0,
                "maxConcurrentStreams": 4
            }
        });

        let message: PushMessage = serde_json::from_value(raw).unwrap();
        let PushMessage::ProxyUpdated(record) = message else {
            panic!("expected a proxy update");
        };
        assert_eq!(record.id.as_str(), "p2");
        assert_eq!(record.status, ProxyStatus::Maintenance);
        assert_eq!(record.health_status, HealthStatus::Warning);
    }

    #[test]
    fn stats_frames_reach_subscribers() {
        let (tx, mut rx) = broadcast::channel(4);
        let frame = r#"{"type":"stats_update","data":{"totalProxies":3,"activeProxies":2,"totalActiveStreams":7}}"#;

        parse_and_broadcast(frame, &tx);

        let message = rx.try_recv().unwrap();
        let PushMessage::StatsUpdated(ref stats) = *message else {
            panic!("expected a stats update");
        };
        assert_eq!(stats.total_active_streams, 7);
    }

    #[test]
    fn partial_records_are_dropped() {
        let (tx, mut rx) = broadcast::channel::<Arc<PushMessage>>(4);

        parse_and_broadcast(r#"{"type":"proxy_update","data":{"id":"p2","status":"inactive"}}"#, &tx);
        assert!(matches!(rx.try_recv(), Err(broadcast::error::TryRecvError::Empty)));
    }

    #[test]
    fn unknown_types_and_garbage_are_dropped() {
        let (tx, mut rx) = broadcast::channel::<Arc<PushMessage>>(4);

        for frame in [r#"{"type":"session_started","data":{}}"#, "{{{", ""] {
            parse_and_broadcast(frame, &tx);
        }
        assert!(matches!(rx.try_recv(), Err(broadcast::error::TryRecvError::Empty)));
    }
}

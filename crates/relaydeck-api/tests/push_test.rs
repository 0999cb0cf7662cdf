// Reconnect behaviour of `PushHandle` against a live WebSocket server.

#![allow(clippy::unwrap_used)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use url::Url;

use relaydeck_api::{PushHandle, ReconnectConfig};

/// Accepts every WebSocket handshake and closes it straight away.
/// Returns the address and a counter of accepted connections.
async fn hang_up_server() -> (SocketAddr, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let accepted = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&accepted);
    tokio::spawn(async move {
        while let Ok((tcp, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            if let Ok(mut ws) = tokio_tungstenite::accept_async(tcp).await {
                let _ = ws.close(None).await;
            }
        }
    });

    (addr, accepted)
}

fn push_url(addr: SocketAddr) -> Url {
    Url::parse(&format!("ws://{addr}/ws/streaming-proxies")).unwrap()
}

#[tokio::test]
async fn clean_close_without_frames_still_backs_off() {
    let (addr, accepted) = hang_up_server().await;
    let reconnect = ReconnectConfig {
        initial_delay: Duration::from_secs(1),
        max_delay: Duration::from_secs(5),
        max_retries: None,
    };

    let handle = PushHandle::connect(push_url(addr), reconnect, CancellationToken::new(), None);
    tokio::time::sleep(Duration::from_millis(500)).await;
    handle.shutdown();

    let connections = accepted.load(Ordering::SeqCst);
    assert!(
        (1..=2).contains(&connections),
        "{connections} connections in 500ms with a 1s initial delay"
    );
}

#[tokio::test]
async fn clean_closes_count_toward_retry_limit() {
    let (addr, accepted) = hang_up_server().await;
    let reconnect = ReconnectConfig {
        initial_delay: Duration::from_millis(10),
        max_delay: Duration::from_millis(20),
        max_retries: Some(2),
    };

    let cancel = CancellationToken::new();
    let _handle = PushHandle::connect(push_url(addr), reconnect, cancel.clone(), None);
    tokio::time::sleep(Duration::from_millis(600)).await;

    // The first connection plus two retries, then the loop gives up.
    assert_eq!(accepted.load(Ordering::SeqCst), 3);
    assert!(!cancel.is_cancelled());
}

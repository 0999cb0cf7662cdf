// ── Reactive proxy stream ──
//
// Subscription type for consuming collection changes from a `ProxyStore`.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use relaydeck_api::ProxyRecord;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// A subscription to the proxy collection.
///
/// Provides both point-in-time snapshot access and change notification
/// via [`changed()`](Self::changed) or by converting to a `Stream`.
pub struct ProxyStream {
    current: Arc<Vec<ProxyRecord>>,
    receiver: watch::Receiver<Arc<Vec<ProxyRecord>>>,
}

impl ProxyStream {
    pub(crate) fn new(receiver: watch::Receiver<Arc<Vec<ProxyRecord>>>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// The snapshot seen at creation or at the last `changed()`.
    pub fn current(&self) -> &Arc<Vec<ProxyRecord>> {
        &self.current
    }

    /// The latest snapshot (may have changed since creation).
    pub fn latest(&self) -> Arc<Vec<ProxyRecord>> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next change, returning the new snapshot.
    /// Returns `None` once the store has been dropped.
    pub async fn changed(&mut self) -> Option<Arc<Vec<ProxyRecord>>> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }

    /// Convert into a `Stream` for use with `StreamExt` combinators.
    pub fn into_stream(self) -> ProxyWatchStream {
        ProxyWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter yielding a snapshot per collection change.
///
/// The first item is the snapshot current at conversion time.
pub struct ProxyWatchStream {
    inner: WatchStream<Arc<Vec<ProxyRecord>>>,
}

impl Stream for ProxyWatchStream {
    type Item = Arc<Vec<ProxyRecord>>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

// ── Real-time bridge ──
//
// Background task that feeds pushed updates into a `ProxyStore`.
// Proxy records replace their local entry wholesale (the same policy as
// `update_proxy`); stats land in their own watch slot and never touch the
// collection.

use std::sync::Arc;

use relaydeck_api::{PushHandle, PushMessage, StreamingStats};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::store::ProxyStore;

/// Handle to a running bridge task.
///
/// The task stops when the store is disposed, [`shutdown`](Self::shutdown)
/// is called, or the push sender closes.
pub struct RealtimeBridge {
    stats: watch::Receiver<Option<Arc<StreamingStats>>>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
    push: Option<PushHandle>,
}

impl RealtimeBridge {
    /// Route messages from `messages` into `store`.
    pub fn spawn(store: ProxyStore, messages: broadcast::Receiver<Arc<PushMessage>>) -> Self {
        let cancel = store.cancellation().child_token();
        let (stats_tx, stats) = watch::channel(None);

        let task = tokio::spawn(bridge_loop(store, messages, stats_tx, cancel.clone()));

        Self {
            stats,
            cancel,
            task,
            push: None,
        }
    }

    /// Open the push channel named in `config` and bridge it into `store`.
    pub fn connect(store: ProxyStore, config: &StoreConfig) -> Result<Self, StoreError> {
        let Some(ref url) = config.push_url else {
            return Err(StoreError::Validation {
                field: "push_url",
                reason: "no push endpoint configured".into(),
            });
        };

        let push_cancel = store.cancellation().child_token();
        let push = PushHandle::connect(
            url.clone(),
            config.reconnect.clone(),
            push_cancel,
            config.session(),
        );
        info!(url = %url, "push bridge starting");

        let mut bridge = Self::spawn(store, push.subscribe());
        bridge.push = Some(push);
        Ok(bridge)
    }

    /// Latest aggregate stats, if any have arrived.
    pub fn stats(&self) -> Option<Arc<StreamingStats>> {
        self.stats.borrow().clone()
    }

    pub fn subscribe_stats(&self) -> watch::Receiver<Option<Arc<StreamingStats>>> {
        self.stats.clone()
    }

    /// Stop the bridge (and its push channel, if it owns one).
    pub fn shutdown(&self) {
        self.cancel.cancel();
        if let Some(ref push) = self.push {
            push.shutdown();
        }
    }

    /// Wait for the bridge task to exit.
    pub async fn join(self) {
        if let Err(e) = self.task.await {
            warn!(error = %e, "push bridge task failed");
        }
    }
}

async fn bridge_loop(
    store: ProxyStore,
    mut messages: broadcast::Receiver<Arc<PushMessage>>,
    stats: watch::Sender<Option<Arc<StreamingStats>>>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            result = messages.recv() => match result {
                Ok(message) => apply(&store, &stats, &message),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "push bridge lagged behind");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }
    debug!("push bridge exiting");
}

fn apply(
    store: &ProxyStore,
    stats: &watch::Sender<Option<Arc<StreamingStats>>>,
    message: &PushMessage,
) {
    match message {
        PushMessage::ProxyUpdated(record) => {
            store.update_proxy_in_state(record.clone());
        }
        PushMessage::StatsUpdated(update) => {
            stats.send_replace(Some(Arc::new(update.clone())));
        }
    }
}

// ── Reactive proxy collection ──
//
// Ordered storage with push-based change notification via a `watch`
// channel. Every mutation swaps the whole snapshot in one step, so
// subscribers never observe a half-applied change.

use std::sync::Arc;

use relaydeck_api::{ProxyId, ProxyRecord};
use tokio::sync::watch;

/// The store's mirror of the server's proxy collection.
///
/// Order is fetch order, with creates appended. Ids are unique.
pub(crate) struct ProxyCollection {
    snapshot: watch::Sender<Arc<Vec<ProxyRecord>>>,
}

impl ProxyCollection {
    pub(crate) fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));
        Self { snapshot }
    }

    /// Replace the whole collection verbatim.
    pub(crate) fn replace_all(&self, proxies: Vec<ProxyRecord>) {
        self.snapshot.send_replace(Arc::new(proxies));
    }

    /// Append a record. An existing entry with the same id is replaced in
    /// place instead, keeping ids unique.
    pub(crate) fn append(&self, proxy: ProxyRecord) {
        self.snapshot.send_modify(|snap| {
            let list = Arc::make_mut(snap);
            match list.iter_mut().find(|p| p.id == proxy.id) {
                Some(slot) => *slot = proxy,
                None => list.push(proxy),
            }
        });
    }

    /// Replace the entry with `proxy.id`. Returns `false` (and notifies
    /// nobody) if no such entry exists.
    pub(crate) fn replace_by_id(&self, proxy: ProxyRecord) -> bool {
        let mut incoming = Some(proxy);
        self.snapshot.send_if_modified(|snap| {
            let Some(record) = incoming.take() else {
                return false;
            };
            let Some(index) = snap.iter().position(|p| p.id == record.id) else {
                return false;
            };
            Arc::make_mut(snap)[index] = record;
            true
        })
    }

    /// Remove the entry with `id`. Returns `true` if one was removed.
    pub(crate) fn remove_by_id(&self, id: &ProxyId) -> bool {
        self.snapshot.send_if_modified(|snap| {
            let Some(index) = snap.iter().position(|p| &p.id == id) else {
                return false;
            };
            Arc::make_mut(snap).remove(index);
            true
        })
    }

    pub(crate) fn get(&self, id: &ProxyId) -> Option<ProxyRecord> {
        self.snapshot.borrow().iter().find(|p| &p.id == id).cloned()
    }

    pub(crate) fn len(&self) -> usize {
        self.snapshot.borrow().len()
    }

    pub(crate) fn snapshot(&self) -> Arc<Vec<ProxyRecord>> {
        self.snapshot.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Arc<Vec<ProxyRecord>>> {
        self.snapshot.subscribe()
    }
}

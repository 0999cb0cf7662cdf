// ── Proxy state store ──
//
// In-memory mirror of the server's proxy collection. Network operations
// go through `ApiClient`, apply the server's answer to the collection, and
// report failures on two channels at once: the returned `StoreError` and
// the shared error slot. Both carry the same normalized message.

use std::future::Future;
use std::sync::Arc;

use futures_util::future::join_all;
use relaydeck_api::{
    ApiClient, CreateProxyRequest, Error as ApiError, HealthCheckResult, ProxyId, ProxyRecord,
    ProxyStatus, UpdateProxyRequest,
};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::collection::ProxyCollection;
use super::loading::LoadingTracker;
use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::filter::ProxyFilter;
use crate::stream::ProxyStream;
use crate::summary::ProxySummary;

const LOAD_FALLBACK: &str = "Failed to load proxies";
const FETCH_FALLBACK: &str = "Failed to fetch proxies";
const CREATE_FALLBACK: &str = "Failed to create proxy";
const UPDATE_FALLBACK: &str = "Failed to update proxy";
const DELETE_FALLBACK: &str = "Failed to delete proxy";
const HEALTH_CHECK_FALLBACK: &str = "Failed to run health check";

/// Construction options for a [`ProxyStore`].
#[derive(Debug, Clone, Default)]
pub struct StoreOptions {
    /// When set, [`ProxyStore::proxies`] returns only matching records.
    pub view_filter: Option<ProxyFilter>,
}

/// Client-side state for the streaming proxy collection.
///
/// Cheaply cloneable via `Arc<StoreInner>`; clones share one collection.
/// Independently constructed stores never share state.
///
/// Concurrent writes to the same id resolve last-response-wins: whichever
/// request completes later overwrites the entry.
#[derive(Clone)]
pub struct ProxyStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    client: ApiClient,
    view_filter: Option<ProxyFilter>,
    proxies: ProxyCollection,
    loading: LoadingTracker,
    error: watch::Sender<Option<String>>,
    cancel: CancellationToken,
}

impl ProxyStore {
    /// Create an empty store. Call [`refresh()`](Self::refresh) to load it.
    pub fn new(client: ApiClient) -> Self {
        Self::with_options(client, StoreOptions::default())
    }

    pub fn with_options(client: ApiClient, options: StoreOptions) -> Self {
        let (error, _) = watch::channel(None);
        Self {
            inner: Arc::new(StoreInner {
                client,
                view_filter: options.view_filter,
                proxies: ProxyCollection::new(),
                loading: LoadingTracker::new(),
                error,
                cancel: CancellationToken::new(),
            }),
        }
    }

    /// Build the API client from runtime config and wrap it in a store.
    pub fn from_config(config: &StoreConfig) -> Result<Self, StoreError> {
        let client = ApiClient::new(config.api_url.as_str(), config.session(), &config.transport())
            .map_err(|e| StoreError::normalize(&e, "Invalid store configuration"))?;
        Ok(Self::new(client))
    }

    // ── Network operations ───────────────────────────────────────

    /// Reload the whole collection from the server.
    ///
    /// Clears the error slot first; on success the collection is replaced
    /// verbatim with the server's list.
    pub async fn refresh(&self) -> Result<(), StoreError> {
        self.ensure_active()?;
        let _loading = self.inner.loading.enter();
        self.clear_error();

        let proxies = self
            .call(LOAD_FALLBACK, self.inner.client.list_proxies(None))
            .await?;
        debug!(count = proxies.len(), "proxy collection refreshed");
        self.inner.proxies.replace_all(proxies);
        Ok(())
    }

    /// Reload the collection with `filter` applied server-side.
    pub async fn fetch_proxies(&self, filter: &ProxyFilter) -> Result<(), StoreError> {
        self.ensure_active()?;
        let _loading = self.inner.loading.enter();
        self.clear_error();

        let query = filter.to_query();
        let proxies = self
            .call(FETCH_FALLBACK, self.inner.client.list_proxies(Some(&query)))
            .await?;
        debug!(count = proxies.len(), ?filter, "filtered proxy collection fetched");
        self.inner.proxies.replace_all(proxies);
        Ok(())
    }

    /// Create a proxy and append the server's record.
    pub async fn create_proxy(&self, req: &CreateProxyRequest) -> Result<ProxyRecord, StoreError> {
        self.ensure_active()?;
        let _loading = self.inner.loading.enter();

        let created = self
            .call(CREATE_FALLBACK, self.inner.client.create_proxy(req))
            .await?;
        debug!(id = %created.id, "proxy created");
        self.inner.proxies.append(created.clone());
        Ok(created)
    }

    /// Patch a proxy and replace the local entry with the server's record.
    ///
    /// Fields are not merged: the returned record wins wholesale. An id the
    /// store does not hold still round-trips but leaves the collection as is.
    pub async fn update_proxy(
        &self,
        id: &ProxyId,
        req: &UpdateProxyRequest,
    ) -> Result<ProxyRecord, StoreError> {
        self.ensure_active()?;
        let _loading = self.inner.loading.enter();

        let updated = self
            .call(UPDATE_FALLBACK, self.inner.client.update_proxy(id, req))
            .await?;
        if self.inner.proxies.replace_by_id(updated.clone()) {
            debug!(%id, "proxy updated");
        } else {
            debug!(%id, "updated proxy not held locally");
        }
        Ok(updated)
    }

    /// Delete a proxy and drop it from the collection.
    pub async fn delete_proxy(&self, id: &ProxyId) -> Result<(), StoreError> {
        self.ensure_active()?;
        let _loading = self.inner.loading.enter();

        self.call(DELETE_FALLBACK, self.inner.client.delete_proxy(id))
            .await?;
        let removed = self.inner.proxies.remove_by_id(id);
        debug!(%id, removed, "proxy deleted");
        Ok(())
    }

    /// Set `status` on every id concurrently.
    ///
    /// All updates are dispatched together and awaited together; one
    /// failure does not cancel the rest. Successful updates stay applied.
    /// Any failure yields a single [`StoreError::Aggregate`].
    pub async fn bulk_update_status(
        &self,
        ids: &[ProxyId],
        status: ProxyStatus,
    ) -> Result<(), StoreError> {
        self.ensure_active()?;
        if ids.is_empty() {
            return Ok(());
        }
        let _loading = self.inner.loading.enter();

        let patch = UpdateProxyRequest::status(status);
        let results = join_all(ids.iter().map(|id| self.update_proxy(id, &patch))).await;

        if self.is_disposed() {
            return Err(StoreError::Disposed);
        }

        let reasons: Vec<String> = results
            .into_iter()
            .filter_map(Result::err)
            .map(|e| e.message())
            .collect();

        if reasons.is_empty() {
            info!(count = ids.len(), %status, "bulk status update applied");
            return Ok(());
        }

        Err(self.record(StoreError::Aggregate {
            failed: reasons.len(),
            total: ids.len(),
            reasons,
        }))
    }

    /// Ask the server to probe one proxy. The collection is not touched.
    pub async fn run_health_check(&self, id: &ProxyId) -> Result<HealthCheckResult, StoreError> {
        self.ensure_active()?;
        let _loading = self.inner.loading.enter();

        let result = self
            .call(HEALTH_CHECK_FALLBACK, self.inner.client.run_health_check(id))
            .await?;
        debug!(%id, health = %result.status, "health check completed");
        Ok(result)
    }

    // ── Local reconciliation ─────────────────────────────────────

    /// Replace the entry with `proxy.id` without any network call.
    ///
    /// Returns `false` (and changes nothing) for an unknown id or a
    /// disposed store.
    pub fn update_proxy_in_state(&self, proxy: ProxyRecord) -> bool {
        if self.is_disposed() {
            return false;
        }
        let id = proxy.id.clone();
        let replaced = self.inner.proxies.replace_by_id(proxy);
        if replaced {
            debug!(%id, "proxy reconciled from push");
        } else {
            debug!(%id, "ignoring push for unknown proxy");
        }
        replaced
    }

    // ── Derived views ────────────────────────────────────────────

    /// The full collection as last applied.
    pub fn snapshot(&self) -> Arc<Vec<ProxyRecord>> {
        self.inner.proxies.snapshot()
    }

    /// The collection seen through the store's view filter, if any.
    pub fn proxies(&self) -> Vec<ProxyRecord> {
        let snap = self.snapshot();
        match self.inner.view_filter {
            Some(ref filter) => filter.apply(&snap),
            None => snap.as_ref().clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.proxies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn filter_proxies(&self, filter: &ProxyFilter) -> Vec<ProxyRecord> {
        filter.apply(&self.snapshot())
    }

    pub fn get_proxy_by_id(&self, id: &ProxyId) -> Option<ProxyRecord> {
        self.inner.proxies.get(id)
    }

    pub fn get_proxies_by_status(&self, status: ProxyStatus) -> Vec<ProxyRecord> {
        self.snapshot()
            .iter()
            .filter(|p| p.status == status)
            .cloned()
            .collect()
    }

    /// Active, healthy proxies with spare stream capacity.
    pub fn get_available_proxies(&self) -> Vec<ProxyRecord> {
        self.snapshot()
            .iter()
            .filter(|p| p.is_available())
            .cloned()
            .collect()
    }

    pub fn summary(&self) -> ProxySummary {
        ProxySummary::from_records(&self.snapshot())
    }

    // ── Observation ──────────────────────────────────────────────

    /// `true` while any network operation is in flight.
    pub fn is_loading(&self) -> bool {
        self.inner.loading.is_loading()
    }

    /// The most recent recorded failure message.
    pub fn error(&self) -> Option<String> {
        self.inner.error.borrow().clone()
    }

    pub fn clear_error(&self) {
        self.inner
            .error
            .send_if_modified(|slot| slot.take().is_some());
    }

    pub fn subscribe(&self) -> ProxyStream {
        ProxyStream::new(self.inner.proxies.subscribe())
    }

    pub fn subscribe_loading(&self) -> watch::Receiver<bool> {
        self.inner.loading.subscribe()
    }

    pub fn subscribe_error(&self) -> watch::Receiver<Option<String>> {
        self.inner.error.subscribe()
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Tear the store down.
    ///
    /// New operations fail with [`StoreError::Disposed`]; in-flight ones
    /// stop waiting on the network and discard whatever arrives later.
    pub fn dispose(&self) {
        if !self.inner.cancel.is_cancelled() {
            info!("proxy store disposed");
            self.inner.cancel.cancel();
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }

    /// Token cancelled on dispose; background tasks derive child tokens
    /// from it.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.inner.cancel
    }

    // ── Internals ────────────────────────────────────────────────

    fn ensure_active(&self) -> Result<(), StoreError> {
        if self.is_disposed() {
            return Err(StoreError::Disposed);
        }
        Ok(())
    }

    /// Await `request` unless the store is disposed first, recording a
    /// normalized failure in the error slot.
    async fn call<T, F>(&self, fallback: &str, request: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        let result = tokio::select! {
            biased;
            () = self.inner.cancel.cancelled() => return Err(StoreError::Disposed),
            result = request => result,
        };

        match result {
            Ok(_) if self.is_disposed() => Err(StoreError::Disposed),
            Ok(value) => Ok(value),
            Err(e) => Err(self.record(StoreError::normalize(&e, fallback))),
        }
    }

    fn record(&self, err: StoreError) -> StoreError {
        warn!(error = %err, "proxy store operation failed");
        self.inner.error.send_replace(Some(err.message()));
        err
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use relaydeck_api::HealthStatus;

    fn store() -> ProxyStore {
        let client =
            ApiClient::from_reqwest("http://127.0.0.1:9/api", reqwest::Client::new()).unwrap();
        ProxyStore::new(client)
    }

    fn proxy(id: &str, status: ProxyStatus) -> ProxyRecord {
        ProxyRecord {
            id: ProxyId::from(id),
            name: format!("Proxy {id}"),
            description: None,
            server_location: "Lusaka".into(),
            status,
            health_status: HealthStatus::Healthy,
            current_active_streams: 0,
            max_concurrent_streams: 2,
            church_branch_id: None,
        }
    }

    #[tokio::test]
    async fn disposed_store_rejects_without_network() {
        let store = store();
        store.dispose();

        assert_eq!(store.refresh().await, Err(StoreError::Disposed));
        assert_eq!(
            store.delete_proxy(&ProxyId::from("a")).await,
            Err(StoreError::Disposed)
        );
        assert!(!store.is_loading());
        assert!(store.error().is_none());
    }

    #[test]
    fn reconcile_ignored_after_dispose() {
        let store = store();
        store.inner.proxies.replace_all(vec![proxy("a", ProxyStatus::Active)]);
        store.dispose();

        assert!(!store.update_proxy_in_state(proxy("a", ProxyStatus::Inactive)));
        assert_eq!(store.snapshot()[0].status, ProxyStatus::Active);
    }

    #[test]
    fn view_filter_narrows_proxies_only() {
        let client =
            ApiClient::from_reqwest("http://127.0.0.1:9/api", reqwest::Client::new()).unwrap();
        let store = ProxyStore::with_options(
            client,
            StoreOptions {
                view_filter: Some(ProxyFilter {
                    status: Some(ProxyStatus::Maintenance),
                    ..ProxyFilter::default()
                }),
            },
        );
        store.inner.proxies.replace_all(vec![
            proxy("a", ProxyStatus::Active),
            proxy("b", ProxyStatus::Maintenance),
        ]);

        let view = store.proxies();
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].id.as_str(), "b");
        assert_eq!(store.snapshot().len(), 2);
        assert_eq!(store.get_proxies_by_status(ProxyStatus::Active).len(), 1);
    }

    #[tokio::test]
    async fn empty_bulk_update_is_a_no_op() {
        let store = store();
        let mut loading = store.subscribe_loading();
        loading.mark_unchanged();

        store
            .bulk_update_status(&[], ProxyStatus::Inactive)
            .await
            .unwrap();

        assert!(!loading.has_changed().unwrap());
        assert!(store.error().is_none());
    }

    #[test]
    fn clear_error_empties_the_slot() {
        let store = store();
        store.record(StoreError::Network {
            message: "offline".into(),
        });
        assert_eq!(store.error().as_deref(), Some("offline"));

        store.clear_error();
        assert!(store.error().is_none());
    }
}

// ── Client-side proxy filtering ──

use relaydeck_api::{HealthStatus, ProxyQuery, ProxyRecord, ProxyStatus};

/// Predicate over proxy records. Every set field must match; an empty
/// filter matches everything. An empty branch or search string counts as
/// unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyFilter {
    pub status: Option<ProxyStatus>,
    pub health_status: Option<HealthStatus>,
    pub church_branch_id: Option<String>,
    /// Case-insensitive substring over name, description and location.
    pub search: Option<String>,
}

impl ProxyFilter {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.health_status.is_none()
            && self.branch().is_none()
            && self.needle().is_none()
    }

    fn branch(&self) -> Option<&str> {
        self.church_branch_id.as_deref().filter(|b| !b.is_empty())
    }

    fn needle(&self) -> Option<&str> {
        self.search.as_deref().filter(|s| !s.is_empty())
    }

    pub fn matches(&self, proxy: &ProxyRecord) -> bool {
        if self.status.is_some_and(|s| s != proxy.status) {
            return false;
        }
        if self.health_status.is_some_and(|h| h != proxy.health_status) {
            return false;
        }
        if let Some(branch) = self.branch() {
            if proxy.church_branch_id.as_deref() != Some(branch) {
                return false;
            }
        }
        if let Some(needle) = self.needle() {
            let needle = needle.to_lowercase();
            let hit = proxy.name.to_lowercase().contains(&needle)
                || proxy.server_location.to_lowercase().contains(&needle)
                || proxy
                    .description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        true
    }

    /// Clone every matching record, preserving order.
    pub fn apply(&self, proxies: &[ProxyRecord]) -> Vec<ProxyRecord> {
        proxies.iter().filter(|p| self.matches(p)).cloned().collect()
    }

    /// The server-side form of this filter.
    pub fn to_query(&self) -> ProxyQuery {
        ProxyQuery {
            status: self.status,
            health_status: self.health_status,
            church_branch_id: self.branch().map(str::to_owned),
            search: self.needle().map(str::to_owned),
        }
    }
}

use relaydeck_api::{HealthStatus, ProxyRecord, ProxyStatus};
use serde::Serialize;

/// Dashboard counters derived from one collection snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProxySummary {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    pub maintenance: usize,
    pub healthy: usize,
    pub warnings: usize,
    pub errors: usize,
    pub available: usize,
    pub active_streams: u64,
    pub stream_capacity: u64,
}

impl ProxySummary {
    pub fn from_records(proxies: &[ProxyRecord]) -> Self {
        let mut summary = Self {
            total: proxies.len(),
            ..Self::default()
        };
        for proxy in proxies {
            match proxy.status {
                ProxyStatus::Active => summary.active += 1,
                ProxyStatus::Inactive => summary.inactive += 1,
                ProxyStatus::Maintenance => summary.maintenance += 1,
            }
            match proxy.health_status {
                HealthStatus::Healthy => summary.healthy += 1,
                HealthStatus::Warning => summary.warnings += 1,
                HealthStatus::Error => summary.errors += 1,
            }
            if proxy.is_available() {
                summary.available += 1;
            }
            summary.active_streams += u64::from(proxy.current_active_streams);
            summary.stream_capacity += u64::from(proxy.max_concurrent_streams);
        }
        summary
    }
}

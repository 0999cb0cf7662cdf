// Wire types for the streaming proxy administration API.
//
// Every payload is camelCase JSON. Enum values travel lowercase
// (`"active"`, `"healthy"`), matching what the dashboard server emits.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Identifiers ──────────────────────────────────────────────────────

/// Opaque, server-assigned proxy identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProxyId(String);

impl ProxyId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProxyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProxyId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for ProxyId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// ── Enums ────────────────────────────────────────────────────────────

/// Administrative state of a proxy.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ProxyStatus {
    Active,
    Inactive,
    Maintenance,
}

/// Operational health signal, independent of [`ProxyStatus`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum HealthStatus {
    Healthy,
    Warning,
    Error,
}

// ── Records ──────────────────────────────────────────────────────────

/// Administrative record of one streaming proxy server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyRecord {
    pub id: ProxyId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub server_location: String,
    pub status: ProxyStatus,
    pub health_status: HealthStatus,
    pub current_active_streams: u32,
    pub max_concurrent_streams: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub church_branch_id: Option<String>,
}

impl ProxyRecord {
    /// Active, healthy, and below stream capacity.
    ///
    /// A zero capacity is treated as one so a misconfigured record with
    /// no streams still counts as available.
    pub fn is_available(&self) -> bool {
        self.status == ProxyStatus::Active
            && self.health_status == HealthStatus::Healthy
            && self.current_active_streams < self.max_concurrent_streams.max(1)
    }
}

/// Result of an on-demand health probe. Never stored in the collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheckResult {
    pub proxy_id: ProxyId,
    pub status: HealthStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
    pub checked_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Aggregate streaming statistics pushed by the server.
///
/// Fields beyond the core counters are kept in `extra` so nothing the
/// server sends is silently dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamingStats {
    #[serde(default)]
    pub total_proxies: u32,
    #[serde(default)]
    pub active_proxies: u32,
    #[serde(default)]
    pub total_active_streams: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_bandwidth_mbps: Option<f64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── Requests ─────────────────────────────────────────────────────────

/// Body of `POST /proxies`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProxyRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub server_location: String,
    pub max_concurrent_streams: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub church_branch_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ProxyStatus>,
}

/// Body of `PATCH /proxies/{id}`. Absent fields are left untouched server-side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProxyRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ProxyStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_status: Option<HealthStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_concurrent_streams: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub church_branch_id: Option<String>,
}

impl UpdateProxyRequest {
    /// A patch that only changes the administrative status.
    pub fn status(status: ProxyStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// `true` when no field would be sent.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Server-side filter for `GET /proxies`. Empty fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyQuery {
    pub status: Option<ProxyStatus>,
    pub health_status: Option<HealthStatus>,
    pub church_branch_id: Option<String>,
    pub search: Option<String>,
}

impl ProxyQuery {
    pub(crate) fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(status) = self.status {
            params.push(("status", status.to_string()));
        }
        if let Some(health) = self.health_status {
            params.push(("healthStatus", health.to_string()));
        }
        if let Some(ref branch) = self.church_branch_id {
            params.push(("churchBranchId", branch.clone()));
        }
        if let Some(ref search) = self.search {
            params.push(("search", search.clone()));
        }
        params
    }
}

// ── Envelope ─────────────────────────────────────────────────────────

/// Generic response envelope: `{ success, data?, error? }`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
}

// ── Store error types ──
//
// Every failure a store operation can report. The `Display` text is the
// normalized user-facing message, so the value written to the error slot
// and the value returned to the caller always agree.

use relaydeck_api::Error as ApiError;
use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Transport failure: the request never produced a server answer.
    #[error("{message}")]
    Network { message: String },

    /// The server answered `success: false` or a non-2xx status.
    #[error("{message}")]
    Api { message: String, status: Option<u16> },

    /// HTTP 401, or a local session token past its expiry.
    #[error("{message}")]
    Unauthorized { message: String },

    /// A request was rejected before dispatch.
    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// One or more sub-requests of a bulk action failed.
    #[error("Failed to update {failed} proxies: {}", .reasons.join(", "))]
    Aggregate {
        failed: usize,
        total: usize,
        reasons: Vec<String>,
    },

    /// The store was disposed before or during the operation.
    #[error("Proxy store has been disposed")]
    Disposed,
}

impl StoreError {
    /// Normalize an API failure into a store error.
    ///
    /// The explicit server message wins; transport failures keep their own
    /// text; everything else gets the per-operation `fallback`.
    pub fn normalize(err: &ApiError, fallback: &str) -> Self {
        match err {
            ApiError::Unauthorized { message } => Self::Unauthorized {
                message: message.clone(),
            },
            ApiError::SessionExpired => Self::Unauthorized {
                message: err.to_string(),
            },
            ApiError::Api { status, .. } => Self::Api {
                message: err
                    .server_message()
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or(fallback)
                    .to_owned(),
                status: Some(*status),
            },
            ApiError::Transport(_)
            | ApiError::Tls(_)
            | ApiError::InvalidUrl(_)
            | ApiError::InvalidBaseUrl(_)
            | ApiError::WebSocketConnect(_) => Self::Network {
                message: err.to_string(),
            },
            ApiError::MissingData { .. } | ApiError::Deserialization { .. } => Self::Api {
                message: fallback.to_owned(),
                status: None,
            },
        }
    }

    /// The single normalized message for this failure.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Returns `true` for an `Api` error carrying HTTP 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: Some(404), .. })
    }
}

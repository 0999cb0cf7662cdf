//! CLI error types with miette diagnostics.
//!
//! Maps `StoreError` and `ConfigError` into user-facing errors with
//! actionable help text and a process exit code.

use miette::Diagnostic;
use thiserror::Error;

use relaydeck_config::ConfigError;
use relaydeck_core::StoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach the dashboard API: {message}")]
    #[diagnostic(
        code(relaydeck::connection_failed),
        help(
            "Check that the dashboard is running and the URL is right.\n\
             Use --insecure (-k) for self-signed certificates."
        )
    )]
    ConnectionFailed { message: String },

    // ── Authentication ───────────────────────────────────────────────

    #[error("{message}")]
    #[diagnostic(
        code(relaydeck::auth_failed),
        help(
            "Refresh your session token.\n\
             Run: relaydeck config set-token, or set RELAYDECK_TOKEN."
        )
    )]
    AuthFailed { message: String },

    #[error("No token configured for profile '{profile}'")]
    #[diagnostic(
        code(relaydeck::no_credentials),
        help(
            "Configure a token with: relaydeck config init\n\
             Or set RELAYDECK_TOKEN environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("proxy '{identifier}' not found")]
    #[diagnostic(
        code(relaydeck::not_found),
        help("Run: relaydeck proxies list to see available proxies")
    )]
    NotFound { identifier: String },

    /// The server answered 404; its message names what was missing.
    #[error("{message}")]
    #[diagnostic(
        code(relaydeck::not_found),
        help("Run: relaydeck proxies list to see available proxies")
    )]
    ServerNotFound { message: String },

    // ── API ──────────────────────────────────────────────────────────

    #[error("{message}")]
    #[diagnostic(code(relaydeck::api_error))]
    Api { message: String },

    #[error("{message}")]
    #[diagnostic(
        code(relaydeck::bulk_partial),
        help("{succeeded} of {total} proxies were updated. Re-run for the rest.")
    )]
    PartialFailure {
        message: String,
        succeeded: usize,
        total: usize,
    },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(relaydeck::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("No dashboard API configured")]
    #[diagnostic(
        code(relaydeck::no_config),
        help(
            "Create a profile with: relaydeck config init\n\
             Or pass --api-url. Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(relaydeck::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: relaydeck config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(relaydeck::config))]
    Config(ConfigError),

    // ── IO ───────────────────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(relaydeck::render))]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. }
            | Self::NoCredentials { .. }
            | Self::Config(ConfigError::NoCredentials { .. }) => exit_code::AUTH,
            Self::NotFound { .. } | Self::ServerNotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. }
            | Self::NoConfig { .. }
            | Self::ProfileNotFound { .. }
            | Self::Config(ConfigError::Validation { .. }) => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── StoreError → CliError mapping ────────────────────────────────────

impl From<StoreError> for CliError {
    fn from(err: StoreError) -> Self {
        let message = err.to_string();
        if err.is_not_found() {
            return Self::ServerNotFound { message };
        }
        match err {
            StoreError::Network { .. } => Self::ConnectionFailed { message },
            StoreError::Unauthorized { .. } => Self::AuthFailed { message },
            StoreError::Validation { field, reason } => Self::Validation {
                field: field.into(),
                reason,
            },
            StoreError::Aggregate { failed, total, .. } => Self::PartialFailure {
                message,
                succeeded: total.saturating_sub(failed),
                total,
            },
            StoreError::Api { .. } | StoreError::Disposed => Self::Api { message },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => Self::NoCredentials { profile },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(other),
        }
    }
}

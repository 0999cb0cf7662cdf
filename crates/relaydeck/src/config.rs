//! Flag overrides on top of `relaydeck-config`.
//!
//! Resolves the active profile and layers `--api-url`, `--token`,
//! `--timeout` and `--insecure` over it to produce the `StoreConfig`
//! handed to the core crate. Also applies the configured default output
//! format.

use std::time::Duration;

use clap::ValueEnum;
use secrecy::SecretString;
use url::Url;

use relaydeck_config::{self as config, Config};
use relaydeck_core::{StoreConfig, TlsMode};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, cfg: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| cfg.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Fill in the output format from `defaults.output` when neither
/// `--output` nor `RELAYDECK_OUTPUT` chose one.
pub fn apply_default_output(global: &mut GlobalOpts, cfg: &Config) -> Result<(), CliError> {
    if global.output.is_some() {
        return Ok(());
    }
    let format = <OutputFormat as ValueEnum>::from_str(&cfg.defaults.output, true).map_err(|_| {
        CliError::Validation {
            field: "defaults.output".into(),
            reason: format!("unknown output format '{}'", cfg.defaults.output),
        }
    })?;
    global.output = Some(format);
    Ok(())
}

/// Translate the active profile plus flag overrides into a `StoreConfig`.
///
/// Without a matching profile, `--api-url` alone is enough.
pub fn resolve_store_config(global: &GlobalOpts, cfg: &Config) -> Result<StoreConfig, CliError> {
    let profile_name = active_profile_name(global, cfg);

    let mut store = if let Some(profile) = cfg.profiles.get(&profile_name) {
        config::profile_to_store_config(profile, &profile_name, &cfg.defaults)?
    } else if let Some(ref raw) = global.api_url {
        let mut store = StoreConfig::new(parse_url("api-url", raw, &["http", "https"])?);
        store.timeout = Duration::from_secs(cfg.defaults.timeout);
        if cfg.defaults.insecure {
            store.tls = TlsMode::DangerAcceptInvalid;
        }
        store
    } else if global.profile.is_some() {
        let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
        available.sort();
        return Err(CliError::ProfileNotFound {
            name: profile_name,
            available: if available.is_empty() {
                "(none)".into()
            } else {
                available.join(", ")
            },
        });
    } else {
        return Err(CliError::NoConfig {
            path: config::config_path().display().to_string(),
        });
    };

    if let Some(ref raw) = global.api_url {
        store.api_url = parse_url("api-url", raw, &["http", "https"])?;
    }
    if let Some(ref token) = global.token {
        store.token = Some(SecretString::from(token.clone()));
    }
    if let Some(secs) = global.timeout {
        if secs == 0 {
            return Err(CliError::Validation {
                field: "timeout".into(),
                reason: "must be at least 1 second".into(),
            });
        }
        store.timeout = Duration::from_secs(secs);
    }
    if global.insecure {
        store.tls = TlsMode::DangerAcceptInvalid;
    }

    Ok(store)
}

/// Override the push endpoint from `watch --push-url`.
pub fn apply_push_url(store: &mut StoreConfig, raw: Option<&str>) -> Result<(), CliError> {
    if let Some(raw) = raw {
        store.push_url = Some(parse_url("push-url", raw, &["ws", "wss"])?);
    }
    Ok(())
}

fn parse_url(field: &str, raw: &str, schemes: &[&str]) -> Result<Url, CliError> {
    let url: Url = raw.parse().map_err(|_| CliError::Validation {
        field: field.into(),
        reason: format!("invalid URL: {raw}"),
    })?;
    if !schemes.contains(&url.scheme()) {
        return Err(CliError::Validation {
            field: field.into(),
            reason: format!("expected {} URL, got '{}'", schemes.join(" or "), url.scheme()),
        });
    }
    Ok(url)
}

//! Shared helpers for command handlers.

use relaydeck_core::{ProxyId, ProxyRecord, ProxyStore};

use crate::error::CliError;

/// Look a proxy up in the store's current snapshot.
pub fn find_proxy(store: &ProxyStore, identifier: &str) -> Result<ProxyRecord, CliError> {
    store
        .get_proxy_by_id(&ProxyId::from(identifier))
        .ok_or_else(|| CliError::NotFound {
            identifier: identifier.into(),
        })
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// `"3/8"` style stream occupancy.
pub fn streams(proxy: &ProxyRecord) -> String {
    format!(
        "{}/{}",
        proxy.current_active_streams, proxy.max_concurrent_streams
    )
}

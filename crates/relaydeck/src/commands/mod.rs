//! Command dispatch: bridges CLI args -> store operations -> output formatting.

pub mod config_cmd;
pub mod proxies;
pub mod util;
pub mod watch;

use relaydeck_core::{ProxyStore, StoreConfig};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a store-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    store_config: StoreConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Proxies(args) => {
            let store = ProxyStore::from_config(&store_config)?;
            let result = proxies::handle(&store, args, global).await;
            store.dispose();
            result
        }
        Command::Watch(args) => watch::handle(store_config, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}

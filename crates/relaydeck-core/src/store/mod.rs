// ── Proxy state store ──

mod collection;
mod loading;
mod proxy_store;

pub use proxy_store::{ProxyStore, StoreOptions};

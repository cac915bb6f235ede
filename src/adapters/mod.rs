// Adapters layer: concrete implementations of the domain ports
// (page fetch strategies, SQLite price store, sleeper).

#[cfg(feature = "browser")]
pub mod browser_fetcher;
pub mod clock;
pub mod sqlite_store;
pub mod static_fetcher;
pub mod strategy;

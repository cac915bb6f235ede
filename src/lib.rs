pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::cli::{Cli, Command};
pub use crate::config::TrackerConfig;

pub use crate::adapters::{clock::TokioSleeper, sqlite_store::SqliteStore, strategy::select_fetcher};
pub use crate::core::{
    orchestrator::RefreshOrchestrator, pipeline::PricePipeline, scheduler::Scheduler,
    search::PriceSearch,
};
pub use crate::utils::error::{FetchError, Result, TrackerError};

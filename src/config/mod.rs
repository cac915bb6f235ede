#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

pub use toml_config::{
    DatabaseConfig, FetchStrategy, FetcherConfig, LogFormat, LoggingConfig, SchedulerConfig,
    TrackerConfig,
};

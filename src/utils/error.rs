use thiserror::Error;

/// Why a single price lookup produced no price.
///
/// Every variant is recovered inside the pipeline; callers of
/// `fetch_price` only ever observe an absent price.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("URL is empty")]
    EmptyUrl,

    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Timed out after {timeout_ms} ms fetching {url}")]
    Timeout { url: String, timeout_ms: u64 },

    #[error("Browser automation error: {0}")]
    Browser(String),

    #[error("No price found on page")]
    NoPriceFound,
}

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Price lookup failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Database error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid configuration value for '{field}': {value} ({reason})")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Background task failed: {message}")]
    Task { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Storage,
    Configuration,
    Input,
    Runtime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl TrackerError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            TrackerError::Fetch(_) => ErrorCategory::Network,
            TrackerError::Store(_) | TrackerError::Io(_) | TrackerError::Serialization(_) => {
                ErrorCategory::Storage
            }
            TrackerError::Config { .. } | TrackerError::InvalidConfigValue { .. } => {
                ErrorCategory::Configuration
            }
            TrackerError::Validation { .. } => ErrorCategory::Input,
            TrackerError::Task { .. } => ErrorCategory::Runtime,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            TrackerError::Fetch(FetchError::NoPriceFound) => ErrorSeverity::Low,
            TrackerError::Fetch(_) => ErrorSeverity::Medium,
            TrackerError::Validation { .. } => ErrorSeverity::Medium,
            TrackerError::Config { .. } | TrackerError::InvalidConfigValue { .. } => {
                ErrorSeverity::High
            }
            TrackerError::Store(_) | TrackerError::Io(_) | TrackerError::Serialization(_) => {
                ErrorSeverity::High
            }
            TrackerError::Task { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check the vendor URL and network connectivity, then retry",
            ErrorCategory::Storage => "Check that the database file exists and is writable",
            ErrorCategory::Configuration => "Fix the configuration file and restart",
            ErrorCategory::Input => "Check the command arguments",
            ErrorCategory::Runtime => "Restart the process; inspect logs for the failing cycle",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            TrackerError::Fetch(_) => "Price unavailable".to_string(),
            TrackerError::Store(_) => "Could not read or write stored prices".to_string(),
            TrackerError::InvalidConfigValue { field, reason, .. } => {
                format!("Invalid setting '{}': {}", field, reason)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;

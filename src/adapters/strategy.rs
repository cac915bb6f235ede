use std::sync::Arc;

use crate::adapters::static_fetcher::StaticFetcher;
use crate::config::{FetchStrategy, TrackerConfig};
use crate::domain::ports::PageFetcher;
use crate::utils::error::{Result, TrackerError};

/// Picks the page fetcher once, at startup.
///
/// `auto` checks for browser automation and commits to the static fetcher
/// for the rest of the process when it is missing.
pub fn select_fetcher(config: &TrackerConfig) -> Result<Arc<dyn PageFetcher>> {
    let fetcher: Arc<dyn PageFetcher> = match config.fetcher.strategy {
        FetchStrategy::Static => Arc::new(static_fetcher(config)?),
        FetchStrategy::Browser => match detect_browser(config) {
            Some(browser) => browser,
            None => {
                return Err(TrackerError::Config {
                    message: "fetcher.strategy = \"browser\" but no Chromium executable was found"
                        .to_string(),
                })
            }
        },
        FetchStrategy::Auto => match detect_browser(config) {
            Some(browser) => browser,
            None => Arc::new(static_fetcher(config)?),
        },
    };

    tracing::info!("Using {} page fetcher", fetcher.name());
    Ok(fetcher)
}

fn static_fetcher(config: &TrackerConfig) -> Result<StaticFetcher> {
    StaticFetcher::new(&config.fetcher.user_agent, config.fetch_timeout())
}

#[cfg(feature = "browser")]
fn detect_browser(config: &TrackerConfig) -> Option<Arc<dyn PageFetcher>> {
    crate::adapters::browser_fetcher::BrowserFetcher::detect(
        config.fetcher.chrome_executable.as_deref(),
        &config.fetcher.user_agent,
        config.fetch_timeout(),
    )
    .map(|fetcher| Arc::new(fetcher) as Arc<dyn PageFetcher>)
}

#[cfg(not(feature = "browser"))]
fn detect_browser(_config: &TrackerConfig) -> Option<Arc<dyn PageFetcher>> {
    tracing::debug!("Built without the browser feature");
    None
}

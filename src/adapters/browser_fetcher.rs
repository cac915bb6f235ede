//! Browser-automation fetch strategy backed by headless Chromium.
//!
//! Each call launches its own browser with a throwaway profile and tears it
//! down before returning, whatever happened in between.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures_util::StreamExt;

use crate::domain::model::SelectorTarget;
use crate::domain::ports::PageFetcher;
use crate::utils::error::FetchError;

static SESSION_COUNTER: AtomicU64 = AtomicU64::new(0);

pub struct BrowserFetcher {
    chrome_executable: Option<PathBuf>,
    user_agent: String,
    timeout: Duration,
}

impl BrowserFetcher {
    /// Returns `None` when no Chromium executable can be located.
    pub fn detect(
        chrome_executable: Option<&str>,
        user_agent: &str,
        timeout: Duration,
    ) -> Option<Self> {
        if let Some(exe) = chrome_executable {
            if !Path::new(exe).is_file() {
                tracing::debug!("Configured Chromium executable {} does not exist", exe);
                return None;
            }
        }

        let fetcher = Self {
            chrome_executable: chrome_executable.map(PathBuf::from),
            user_agent: user_agent.to_string(),
            timeout,
        };

        match fetcher.browser_config(std::env::temp_dir().join("price-tracker-detect")) {
            Ok(_) => Some(fetcher),
            Err(e) => {
                tracing::debug!("Browser automation unavailable: {}", e);
                None
            }
        }
    }

    fn browser_config(&self, profile_dir: PathBuf) -> Result<BrowserConfig, String> {
        let mut builder = BrowserConfig::builder()
            .user_data_dir(profile_dir)
            .request_timeout(self.timeout)
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-blink-features=AutomationControlled")
            .arg(format!("--user-agent={}", self.user_agent));

        if let Some(exe) = &self.chrome_executable {
            builder = builder.chrome_executable(exe);
        }

        builder.build()
    }

    fn session_dir() -> PathBuf {
        let n = SESSION_COUNTER.fetch_add(1, Ordering::SeqCst);
        std::env::temp_dir().join(format!("price-tracker-session-{}-{}", std::process::id(), n))
    }

    /// Runs one browser session in `profile_dir` and removes the directory
    /// afterwards, including when the browser never started.
    async fn fetch_in_profile(
        &self,
        profile_dir: &Path,
        url: &str,
        selectors: &[SelectorTarget],
    ) -> Result<String, FetchError> {
        let result = self.launch_and_render(profile_dir, url, selectors).await;

        if let Err(e) = tokio::fs::remove_dir_all(profile_dir).await {
            tracing::trace!("Failed to remove {}: {}", profile_dir.display(), e);
        }

        result
    }

    async fn launch_and_render(
        &self,
        profile_dir: &Path,
        url: &str,
        selectors: &[SelectorTarget],
    ) -> Result<String, FetchError> {
        let config = self
            .browser_config(profile_dir.to_path_buf())
            .map_err(FetchError::Browser)?;

        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| FetchError::Browser(e.to_string()))?;

        let events = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::trace!("Browser handler event error: {}", e);
                }
            }
        });

        let result = self.render(&browser, url, selectors).await;

        if let Err(e) = browser.close().await {
            tracing::debug!("Failed to close browser: {}", e);
        }
        if let Err(e) = browser.wait().await {
            tracing::debug!("Failed to reap browser process: {}", e);
        }
        events.abort();

        result
    }

    async fn render(
        &self,
        browser: &Browser,
        url: &str,
        selectors: &[SelectorTarget],
    ) -> Result<String, FetchError> {
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| FetchError::Browser(e.to_string()))?;

        match tokio::time::timeout(self.timeout, page.goto(url)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                return Err(FetchError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                })
            }
            Err(_) => {
                return Err(FetchError::Timeout {
                    url: url.to_string(),
                    timeout_ms: self.timeout.as_millis() as u64,
                })
            }
        }

        for target in selectors {
            if let Some(text) = query_target(&page, *target).await {
                return Ok(text);
            }
        }

        tracing::debug!("No selector matched on {}, using whole page text", url);
        query_target(&page, SelectorTarget::WholePage)
            .await
            .ok_or(FetchError::NoPriceFound)
    }
}

async fn query_target(page: &Page, target: SelectorTarget) -> Option<String> {
    let value = match target {
        SelectorTarget::Text(css) => {
            let element = page.find_element(css).await.ok()?;
            element.inner_text().await
        }
        SelectorTarget::Attribute { css, attr } => {
            let element = page.find_element(css).await.ok()?;
            element.attribute(attr).await
        }
        SelectorTarget::WholePage => {
            let body = page.find_element("body").await.ok()?;
            body.inner_text().await
        }
    };

    value
        .ok()
        .flatten()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

#[async_trait]
impl PageFetcher for BrowserFetcher {
    fn name(&self) -> &'static str {
        "browser"
    }

    async fn fetch_rendered_text(
        &self,
        url: &str,
        selectors: &[SelectorTarget],
    ) -> Result<String, FetchError> {
        self.fetch_in_profile(&Self::session_dir(), url, selectors)
            .await
    }
}

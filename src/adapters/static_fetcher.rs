//! Static-HTML fetch strategy: one GET, parsed with `scraper`.
//!
//! No JavaScript runs, so prices injected client-side are only found when
//! the server also renders them (or exposes them as metadata).

use std::time::Duration;

use async_trait::async_trait;
use scraper::{Html, Selector};

use crate::domain::model::SelectorTarget;
use crate::domain::ports::PageFetcher;
use crate::utils::error::{FetchError, Result, TrackerError};

pub struct StaticFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl StaticFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            reqwest::header::HeaderValue::from_static("en-US,en;q=0.5"),
        );

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| TrackerError::Config {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client, timeout })
    }

    async fn fetch_html(&self, url: &str) -> std::result::Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response.text().await.map_err(|e| self.classify(url, e))
    }

    fn classify(&self, url: &str, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else {
            FetchError::Http(error)
        }
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn fetch_rendered_text(
        &self,
        url: &str,
        selectors: &[SelectorTarget],
    ) -> std::result::Result<String, FetchError> {
        let html = self.fetch_html(url).await?;
        let document = Html::parse_document(&html);

        if let Some(text) = select_text(&document, selectors) {
            return Ok(text);
        }

        tracing::debug!("No selector matched on {}, using whole page text", url);
        Ok(page_text(&document))
    }
}

/// First non-empty text among `selectors`, tried in order.
pub fn select_text(document: &Html, selectors: &[SelectorTarget]) -> Option<String> {
    selectors.iter().find_map(|target| match *target {
        SelectorTarget::Text(css) => {
            let selector = parse_selector(css)?;
            let element = document.select(&selector).next()?;
            non_empty(element.text().collect::<String>())
        }
        SelectorTarget::Attribute { css, attr } => {
            let selector = parse_selector(css)?;
            let element = document.select(&selector).next()?;
            non_empty(element.value().attr(attr)?.to_string())
        }
        SelectorTarget::WholePage => non_empty(page_text(document)),
    })
}

/// Body text with text nodes separated by spaces.
pub fn page_text(document: &Html) -> String {
    let body = parse_selector("body").and_then(|s| document.select(&s).next());
    let text: Vec<&str> = match body {
        Some(body) => body.text().collect(),
        None => document.root_element().text().collect(),
    };
    text.iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            tracing::warn!("Skipping invalid selector '{}': {:?}", css, e);
            None
        }
    }
}

fn non_empty(text: String) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

use std::sync::Arc;

use crate::core::extractor::extract_number;
use crate::core::selectors::resolve_selectors;
use crate::domain::model::PriceQuery;
use crate::domain::ports::PageFetcher;
use crate::utils::error::FetchError;

/// Fetcher + selector resolver + number extractor.
///
/// The fetcher is chosen once at startup and shared for the process lifetime.
#[derive(Clone)]
pub struct PricePipeline {
    fetcher: Arc<dyn PageFetcher>,
}

impl PricePipeline {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }

    /// Like [`fetch_price`](Self::fetch_price) but keeps the reason a price is missing.
    pub async fn try_fetch_price(&self, url: &str) -> Result<f64, FetchError> {
        let query = PriceQuery::parse(url)?;
        let selectors = resolve_selectors(&query.domain);

        tracing::debug!(
            "Fetching {} via {} ({} selector candidates)",
            query.url,
            self.fetcher.name(),
            selectors.len()
        );

        let text = self
            .fetcher
            .fetch_rendered_text(&query.url, selectors)
            .await?;

        extract_number(Some(text.as_str())).ok_or(FetchError::NoPriceFound)
    }

    /// Current price at `url`, or `None` when no confident price was found.
    pub async fn fetch_price(&self, url: &str) -> Option<f64> {
        match self.try_fetch_price(url).await {
            Ok(price) => Some(price),
            Err(FetchError::EmptyUrl) => None,
            Err(e) => {
                tracing::debug!("No price for {}: {}", url, e);
                None
            }
        }
    }
}

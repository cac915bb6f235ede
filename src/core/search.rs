use std::sync::Arc;

use url::form_urlencoded;

use crate::core::pipeline::PricePipeline;
use crate::domain::model::{PlatformQuote, SearchReport};
use crate::domain::ports::PriceStore;
use crate::utils::error::{Result, TrackerError};

/// Built-in search pages queried before any stored vendor.
const PLATFORMS: &[(&str, &str)] = &[
    ("Amazon", "https://www.amazon.in/s?k="),
    ("Flipkart", "https://www.flipkart.com/search?q="),
    ("Apple", "https://www.apple.com/search/?q="),
];

pub struct PriceSearch {
    pipeline: PricePipeline,
    store: Arc<dyn PriceStore>,
}

impl PriceSearch {
    pub fn new(pipeline: PricePipeline, store: Arc<dyn PriceStore>) -> Self {
        Self { pipeline, store }
    }

    /// Looks `query` up on every platform. A platform that fails reports no
    /// price instead of failing the search.
    pub async fn search_prices(&self, query: &str) -> Result<SearchReport> {
        let query = query.trim();
        if query.is_empty() {
            return Err(TrackerError::Validation {
                message: "Query required".to_string(),
            });
        }

        let encoded: String = form_urlencoded::byte_serialize(query.as_bytes()).collect();
        let mut platforms: Vec<(String, String)> = PLATFORMS
            .iter()
            .map(|(name, base)| (name.to_string(), format!("{}{}", base, encoded)))
            .collect();

        match self.store.list_vendor_links().await {
            Ok(links) => platforms.extend(
                links
                    .into_iter()
                    .map(|link| (link.vendor_name, link.website_url)),
            ),
            Err(e) => tracing::warn!("Searching without stored vendors: {}", e),
        }

        let mut results = Vec::with_capacity(platforms.len());
        for (platform, url) in platforms {
            let price = self.pipeline.fetch_price(&url).await;
            results.push(PlatformQuote {
                platform,
                url,
                price,
            });
        }

        Ok(SearchReport {
            query: query.to_string(),
            results,
        })
    }
}

use serde::{Deserialize, Serialize};
use url::Url;

use crate::utils::error::FetchError;

/// A single price lookup, built per fetch call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceQuery {
    pub url: String,
    pub domain: String,
}

impl PriceQuery {
    pub fn parse(url: &str) -> Result<Self, FetchError> {
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err(FetchError::EmptyUrl);
        }

        let parsed = Url::parse(trimmed).map_err(|e| FetchError::InvalidUrl {
            url: trimmed.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FetchError::InvalidUrl {
                url: trimmed.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        let domain = parsed
            .host_str()
            .map(|h| h.to_ascii_lowercase())
            .ok_or_else(|| FetchError::InvalidUrl {
                url: trimmed.to_string(),
                reason: "missing host".to_string(),
            })?;

        Ok(Self {
            url: trimmed.to_string(),
            domain,
        })
    }
}

/// One (product, vendor, url) association eligible for refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshTarget {
    pub product_id: i64,
    pub vendor_id: i64,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub price_id: i64,
    pub product_id: i64,
    pub vendor_id: i64,
    pub price: f64,
}

/// A stored vendor with a website, offered as a search platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorLink {
    pub vendor_name: String,
    pub website_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformQuote {
    pub platform: String,
    pub url: String,
    pub price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchReport {
    pub query: String,
    pub results: Vec<PlatformQuote>,
}

/// Where on a page a price is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SelectorTarget {
    /// Visible text of the first element matching the CSS selector.
    Text(&'static str),
    /// An attribute of the first element matching the CSS selector.
    Attribute {
        css: &'static str,
        attr: &'static str,
    },
    /// Whole rendered body text.
    WholePage,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefreshSummary {
    pub targets: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failed: usize,
}

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::model::{PriceRecord, RefreshTarget, SelectorTarget, VendorLink};
use crate::utils::error::{FetchError, Result};

/// Retrieves the text a price is read from.
///
/// Implementations try `selectors` in order and return the first non-empty
/// text, falling back to the whole page text when nothing matches.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch_rendered_text(
        &self,
        url: &str,
        selectors: &[SelectorTarget],
    ) -> std::result::Result<String, FetchError>;
}

/// Persistence collaborator holding products, vendors and prices.
#[async_trait]
pub trait PriceStore: Send + Sync {
    async fn list_refresh_targets(&self) -> Result<Vec<RefreshTarget>>;

    async fn find_price_record(&self, product_id: i64, vendor_id: i64)
        -> Result<Option<PriceRecord>>;

    async fn update_price_record(&self, price_id: i64, price: f64) -> Result<()>;

    async fn insert_price_record(&self, product_id: i64, vendor_id: i64, price: f64)
        -> Result<i64>;

    async fn list_vendor_links(&self) -> Result<Vec<VendorLink>>;

    /// Updates the (product, vendor) record in place, inserting it if missing.
    async fn upsert_price_record(&self, product_id: i64, vendor_id: i64, price: f64) -> Result<()> {
        match self.find_price_record(product_id, vendor_id).await? {
            Some(record) => self.update_price_record(record.price_id, price).await,
            None => self
                .insert_price_record(product_id, vendor_id, price)
                .await
                .map(|_| ()),
        }
    }
}

/// Suspension point for the background task.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

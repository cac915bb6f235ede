use std::sync::Arc;
use std::time::Duration;

use crate::core::pipeline::PricePipeline;
use crate::domain::model::{RefreshSummary, RefreshTarget};
use crate::domain::ports::{PriceStore, Sleeper};
use crate::utils::error::Result;

pub struct RefreshOrchestrator {
    pipeline: PricePipeline,
    store: Arc<dyn PriceStore>,
    sleeper: Arc<dyn Sleeper>,
    politeness_delay: Duration,
}

enum TargetOutcome {
    Updated,
    Skipped,
    Failed,
}

impl RefreshOrchestrator {
    pub fn new(
        pipeline: PricePipeline,
        store: Arc<dyn PriceStore>,
        sleeper: Arc<dyn Sleeper>,
        politeness_delay: Duration,
    ) -> Self {
        Self {
            pipeline,
            store,
            sleeper,
            politeness_delay,
        }
    }

    /// Refreshes every stored (product, vendor) price once, one target at a time.
    ///
    /// Only a failure to read the target list is returned; per-target
    /// failures are logged and counted.
    pub async fn refresh_all(&self) -> Result<RefreshSummary> {
        let targets = self.store.list_refresh_targets().await?;
        let mut summary = RefreshSummary {
            targets: targets.len(),
            ..RefreshSummary::default()
        };

        if targets.is_empty() {
            tracing::debug!("No refresh targets");
            return Ok(summary);
        }

        for target in &targets {
            match self.refresh_target(target).await {
                TargetOutcome::Updated => {
                    summary.updated += 1;
                    self.sleeper.sleep(self.politeness_delay).await;
                }
                TargetOutcome::Skipped => summary.skipped += 1,
                TargetOutcome::Failed => summary.failed += 1,
            }
        }

        Ok(summary)
    }

    async fn refresh_target(&self, target: &RefreshTarget) -> TargetOutcome {
        let Some(url) = target.url.as_deref().filter(|u| !u.trim().is_empty()) else {
            tracing::debug!(
                "Skipping product {} vendor {}: no url",
                target.product_id,
                target.vendor_id
            );
            return TargetOutcome::Skipped;
        };

        let price = match self.pipeline.try_fetch_price(url).await {
            Ok(price) => price,
            Err(e) => {
                tracing::warn!(
                    product_id = target.product_id,
                    vendor_id = target.vendor_id,
                    "No price from {}: {}",
                    url,
                    e
                );
                return TargetOutcome::Failed;
            }
        };

        match self
            .store
            .upsert_price_record(target.product_id, target.vendor_id, price)
            .await
        {
            Ok(()) => {
                tracing::debug!(
                    product_id = target.product_id,
                    vendor_id = target.vendor_id,
                    price,
                    "Price updated"
                );
                TargetOutcome::Updated
            }
            Err(e) => {
                tracing::warn!(
                    product_id = target.product_id,
                    vendor_id = target.vendor_id,
                    "Failed to store price {}: {}",
                    price,
                    e
                );
                TargetOutcome::Failed
            }
        }
    }
}

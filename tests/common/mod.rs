#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use price_tracker::core::{PageFetcher, PriceRecord, PriceStore, RefreshTarget, SelectorTarget, Sleeper};
use price_tracker::domain::model::VendorLink;
use price_tracker::{FetchError, Result, TrackerError};

/// In-memory store keyed by (product_id, vendor_id).
#[derive(Default)]
pub struct MockStore {
    pub targets: Mutex<Vec<RefreshTarget>>,
    pub records: Mutex<HashMap<(i64, i64), PriceRecord>>,
    pub vendors: Mutex<Vec<VendorLink>>,
    pub failing_writes: Mutex<HashSet<(i64, i64)>>,
    pub fail_listing: Mutex<bool>,
    pub list_calls: AtomicUsize,
    next_id: AtomicUsize,
}

impl MockStore {
    pub fn with_targets(targets: Vec<RefreshTarget>) -> Arc<Self> {
        let store = Self::default();
        *store.targets.lock().unwrap() = targets;
        Arc::new(store)
    }

    pub fn seed_price(&self, product_id: i64, vendor_id: i64, price: f64) {
        let price_id = self.next_id.fetch_add(1, Ordering::SeqCst) as i64 + 1;
        self.records.lock().unwrap().insert(
            (product_id, vendor_id),
            PriceRecord {
                price_id,
                product_id,
                vendor_id,
                price,
            },
        );
    }

    pub fn price(&self, product_id: i64, vendor_id: i64) -> Option<f64> {
        self.records
            .lock()
            .unwrap()
            .get(&(product_id, vendor_id))
            .map(|r| r.price)
    }

    pub fn fail_writes_for(&self, product_id: i64, vendor_id: i64) {
        self.failing_writes
            .lock()
            .unwrap()
            .insert((product_id, vendor_id));
    }
}

#[async_trait]
impl PriceStore for MockStore {
    async fn list_refresh_targets(&self) -> Result<Vec<RefreshTarget>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if *self.fail_listing.lock().unwrap() {
            return Err(TrackerError::Task {
                message: "store offline".to_string(),
            });
        }
        Ok(self.targets.lock().unwrap().clone())
    }

    async fn find_price_record(&self, product_id: i64, vendor_id: i64) -> Result<Option<PriceRecord>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .get(&(product_id, vendor_id))
            .cloned())
    }

    async fn update_price_record(&self, price_id: i64, price: f64) -> Result<()> {
        let mut records = self.records.lock().unwrap();
        let key = records
            .iter()
            .find(|(_, r)| r.price_id == price_id)
            .map(|(k, _)| *k);
        if let Some(key) = key {
            if self.failing_writes.lock().unwrap().contains(&key) {
                return Err(TrackerError::Task {
                    message: "write rejected".to_string(),
                });
            }
            if let Some(record) = records.get_mut(&key) {
                record.price = price;
            }
        }
        Ok(())
    }

    async fn insert_price_record(&self, product_id: i64, vendor_id: i64, price: f64) -> Result<i64> {
        if self
            .failing_writes
            .lock()
            .unwrap()
            .contains(&(product_id, vendor_id))
        {
            return Err(TrackerError::Task {
                message: "write rejected".to_string(),
            });
        }
        self.seed_price(product_id, vendor_id, price);
        Ok(self.records.lock().unwrap()[&(product_id, vendor_id)].price_id)
    }

    async fn list_vendor_links(&self) -> Result<Vec<VendorLink>> {
        Ok(self.vendors.lock().unwrap().clone())
    }
}

/// Serves canned page text per URL; unknown URLs fail like an unreachable host.
#[derive(Default)]
pub struct MapFetcher {
    pub pages: Mutex<HashMap<String, String>>,
    pub requested: Mutex<Vec<String>>,
}

impl MapFetcher {
    pub fn with_pages(pages: &[(&str, &str)]) -> Arc<Self> {
        let fetcher = Self::default();
        {
            let mut map = fetcher.pages.lock().unwrap();
            for (url, text) in pages {
                map.insert(url.to_string(), text.to_string());
            }
        }
        Arc::new(fetcher)
    }

    pub fn set_page(&self, url: &str, text: &str) {
        self.pages
            .lock()
            .unwrap()
            .insert(url.to_string(), text.to_string());
    }

    pub fn request_count(&self) -> usize {
        self.requested.lock().unwrap().len()
    }
}

#[async_trait]
impl PageFetcher for MapFetcher {
    fn name(&self) -> &'static str {
        "map"
    }

    async fn fetch_rendered_text(
        &self,
        url: &str,
        _selectors: &[SelectorTarget],
    ) -> std::result::Result<String, FetchError> {
        self.requested.lock().unwrap().push(url.to_string());
        self.pages
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Navigation {
                url: url.to_string(),
                message: "host unreachable".to_string(),
            })
    }
}

/// Records requested sleeps and returns immediately.
#[derive(Default)]
pub struct RecordingSleeper {
    pub sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn recorded(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        tokio::task::yield_now().await;
    }
}

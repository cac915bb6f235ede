use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};

use crate::domain::model::{PriceRecord, RefreshTarget, VendorLink};
use crate::domain::ports::PriceStore;
use crate::utils::error::{Result, TrackerError};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS vendors (
        vendor_id   INTEGER PRIMARY KEY,
        vendor_name TEXT NOT NULL,
        website_url TEXT
    );

    CREATE TABLE IF NOT EXISTS products (
        product_id   INTEGER PRIMARY KEY,
        product_name TEXT NOT NULL,
        category     TEXT
    );

    CREATE TABLE IF NOT EXISTS product_prices (
        price_id      INTEGER PRIMARY KEY,
        product_id    INTEGER NOT NULL REFERENCES products(product_id),
        vendor_id     INTEGER NOT NULL REFERENCES vendors(vendor_id),
        product_price REAL NOT NULL,
        updated_at    TEXT NOT NULL DEFAULT (datetime('now'))
    );
    CREATE UNIQUE INDEX IF NOT EXISTS idx_prices_product_vendor
        ON product_prices(product_id, vendor_id);
";

/// SQLite-backed price store. One connection, serialized behind a mutex.
///
/// Trait calls run on tokio's blocking pool so a slow write never parks a
/// runtime worker.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        lock(&self.conn)
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || f(&mut lock(&conn)))
            .await
            .map_err(|e| TrackerError::Task {
                message: format!("database task failed: {}", e),
            })?
    }

    pub fn add_vendor(&self, name: &str, website_url: Option<&str>) -> Result<i64> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO vendors (vendor_name, website_url) VALUES (?1, ?2)",
            params![name, website_url],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn add_product(&self, name: &str, category: Option<&str>) -> Result<i64> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO products (product_name, category) VALUES (?1, ?2)",
            params![name, category],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn count_price_records(&self) -> Result<i64> {
        let conn = self.conn();
        let count = conn.query_row("SELECT COUNT(*) FROM product_prices", [], |row| row.get(0))?;
        Ok(count)
    }
}

fn lock(conn: &Mutex<Connection>) -> MutexGuard<'_, Connection> {
    conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn find_record(conn: &Connection, product_id: i64, vendor_id: i64) -> Result<Option<PriceRecord>> {
    let record = conn
        .query_row(
            "SELECT price_id, product_id, vendor_id, product_price
             FROM product_prices
             WHERE product_id = ?1 AND vendor_id = ?2",
            params![product_id, vendor_id],
            |row| {
                Ok(PriceRecord {
                    price_id: row.get(0)?,
                    product_id: row.get(1)?,
                    vendor_id: row.get(2)?,
                    price: row.get(3)?,
                })
            },
        )
        .optional()?;
    Ok(record)
}

#[async_trait]
impl PriceStore for SqliteStore {
    async fn list_refresh_targets(&self) -> Result<Vec<RefreshTarget>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT DISTINCT pp.product_id, pp.vendor_id, v.website_url
                 FROM product_prices pp
                 JOIN products p ON p.product_id = pp.product_id
                 JOIN vendors v ON v.vendor_id = pp.vendor_id
                 ORDER BY pp.product_id, pp.vendor_id",
            )?;

            let targets = stmt
                .query_map([], |row| {
                    Ok(RefreshTarget {
                        product_id: row.get(0)?,
                        vendor_id: row.get(1)?,
                        url: row.get(2)?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            Ok(targets)
        })
        .await
    }

    async fn find_price_record(
        &self,
        product_id: i64,
        vendor_id: i64,
    ) -> Result<Option<PriceRecord>> {
        self.with_conn(move |conn| find_record(conn, product_id, vendor_id))
            .await
    }

    async fn update_price_record(&self, price_id: i64, price: f64) -> Result<()> {
        self.with_conn(move |conn| {
            conn.execute(
                "UPDATE product_prices SET product_price = ?1, updated_at = datetime('now')
                 WHERE price_id = ?2",
                params![price, price_id],
            )?;
            Ok(())
        })
        .await
    }

    async fn insert_price_record(&self, product_id: i64, vendor_id: i64, price: f64) -> Result<i64> {
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO product_prices (product_id, vendor_id, product_price) VALUES (?1, ?2, ?3)",
                params![product_id, vendor_id, price],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }

    async fn list_vendor_links(&self) -> Result<Vec<VendorLink>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT vendor_name, website_url FROM vendors
                 WHERE website_url IS NOT NULL AND website_url != ''
                 ORDER BY vendor_id",
            )?;

            let links = stmt
                .query_map([], |row| {
                    Ok(VendorLink {
                        vendor_name: row.get(0)?,
                        website_url: row.get(1)?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            Ok(links)
        })
        .await
    }

    /// Find-then-write inside one transaction scoped to this pair.
    async fn upsert_price_record(&self, product_id: i64, vendor_id: i64, price: f64) -> Result<()> {
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;

            match find_record(&tx, product_id, vendor_id)? {
                Some(record) => {
                    tx.execute(
                        "UPDATE product_prices SET product_price = ?1, updated_at = datetime('now')
                         WHERE price_id = ?2",
                        params![price, record.price_id],
                    )?;
                }
                None => {
                    tx.execute(
                        "INSERT INTO product_prices (product_id, vendor_id, product_price)
                         VALUES (?1, ?2, ?3)",
                        params![product_id, vendor_id, price],
                    )?;
                }
            }

            tx.commit()?;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upsert_updates_in_place() {
        let store = SqliteStore::open_in_memory().unwrap();
        let product = store.add_product("Laptop", Some("Electronics")).unwrap();
        let vendor = store.add_vendor("Shop", Some("https://shop.example/x")).unwrap();

        store.upsert_price_record(product, vendor, 1000.0).await.unwrap();
        store.upsert_price_record(product, vendor, 950.0).await.unwrap();

        let record = store.find_price_record(product, vendor).await.unwrap().unwrap();
        assert_eq!(record.price, 950.0);
        assert_eq!(store.count_price_records().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_refresh_targets_carry_vendor_url() {
        let store = SqliteStore::open_in_memory().unwrap();
        let product = store.add_product("Phone", None).unwrap();
        let with_url = store.add_vendor("A", Some("https://a.example/p")).unwrap();
        let without_url = store.add_vendor("B", None).unwrap();
        store.insert_price_record(product, with_url, 10.0).await.unwrap();
        store.insert_price_record(product, without_url, 12.0).await.unwrap();

        let targets = store.list_refresh_targets().await.unwrap();
        assert_eq!(
            targets,
            vec![
                RefreshTarget {
                    product_id: product,
                    vendor_id: with_url,
                    url: Some("https://a.example/p".to_string()),
                },
                RefreshTarget {
                    product_id: product,
                    vendor_id: without_url,
                    url: None,
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_pairs_without_price_link_are_not_targets() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.add_product("Unlinked", None).unwrap();
        store.add_vendor("Lonely", Some("https://lonely.example")).unwrap();

        assert!(store.list_refresh_targets().await.unwrap().is_empty());
        assert_eq!(store.list_vendor_links().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_pair_insert_is_rejected() {
        let store = SqliteStore::open_in_memory().unwrap();
        let product = store.add_product("Watch", None).unwrap();
        let vendor = store.add_vendor("V", None).unwrap();

        store.insert_price_record(product, vendor, 1.0).await.unwrap();
        assert!(store.insert_price_record(product, vendor, 2.0).await.is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_upserts_keep_one_row() {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let product = store.add_product("Tablet", None).unwrap();
        let vendor = store.add_vendor("Shop", Some("https://shop.example/t")).unwrap();

        let mut handles = Vec::new();
        for i in 0..16 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .upsert_price_record(product, vendor, 100.0 + i as f64)
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.count_price_records().unwrap(), 1);
        let record = store.find_price_record(product, vendor).await.unwrap().unwrap();
        assert!((100.0..116.0).contains(&record.price));
    }
}

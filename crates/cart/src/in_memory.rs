//! In-memory collaborators.
//!
//! Intended for tests/dev. The catalog and store support fault injection so
//! failure paths can be exercised without a network or a database.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, RwLock};
use std::time::Duration;

use rocketshoes_core::ProductId;

use crate::model::{CatalogProduct, Stock};
use crate::ports::{Catalog, CatalogError, KeyValueStore, Notice, Notifier, StorageError};

/// Catalog backed by seeded maps.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    products: RwLock<HashMap<ProductId, CatalogProduct>>,
    stock: RwLock<HashMap<ProductId, u32>>,
    unavailable: AtomicBool,
    latency: Option<Duration>,
    stock_lookups: AtomicUsize,
    product_lookups: AtomicUsize,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a product with its stock level.
    pub fn with_product(self, product: CatalogProduct, stock: u32) -> Self {
        self.insert(product, stock);
        self
    }

    /// Delay every lookup, to let overlapping operations interleave.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn insert(&self, product: CatalogProduct, stock: u32) {
        let id = product.id;
        if let Ok(mut products) = self.products.write() {
            products.insert(id, product);
        }
        self.set_stock(id, stock);
    }

    pub fn set_stock(&self, product_id: ProductId, amount: u32) {
        if let Ok(mut stock) = self.stock.write() {
            stock.insert(product_id, amount);
        }
    }

    /// Make every lookup fail with a network error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn stock_lookups(&self) -> usize {
        self.stock_lookups.load(Ordering::SeqCst)
    }

    pub fn product_lookups(&self) -> usize {
        self.product_lookups.load(Ordering::SeqCst)
    }

    async fn before_lookup(&self) -> Result<(), CatalogError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CatalogError::Network("catalog unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl Catalog for InMemoryCatalog {
    async fn product(&self, product_id: ProductId) -> Result<CatalogProduct, CatalogError> {
        self.product_lookups.fetch_add(1, Ordering::SeqCst);
        self.before_lookup().await?;

        let products = self
            .products
            .read()
            .map_err(|_| CatalogError::Network("lock poisoned".to_string()))?;
        products
            .get(&product_id)
            .cloned()
            .ok_or(CatalogError::NotFound(product_id))
    }

    async fn stock(&self, product_id: ProductId) -> Result<Stock, CatalogError> {
        self.stock_lookups.fetch_add(1, Ordering::SeqCst);
        self.before_lookup().await?;

        let stock = self
            .stock
            .read()
            .map_err(|_| CatalogError::Network("lock poisoned".to_string()))?;
        stock
            .get(&product_id)
            .map(|amount| Stock {
                id: product_id,
                amount: *amount,
            })
            .ok_or(CatalogError::NotFound(product_id))
    }
}

/// Key-value store kept in a map.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: RwLock<HashMap<String, String>>,
    fail_writes: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key.into(), value.into());
        }
        self
    }

    /// Make every `set` fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Raw stored value, bypassing the trait.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .ok()
            .and_then(|entries| entries.get(key).cloned())
    }
}

#[async_trait::async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| StorageError::Backend("lock poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("write rejected".to_string()));
        }
        let mut entries = self
            .entries
            .write()
            .map_err(|_| StorageError::Backend("lock poisoned".to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Notifier that keeps every notice it receives.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .map(|notices| notices.clone())
            .unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(notice);
        }
    }
}

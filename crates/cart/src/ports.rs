//! Collaborators consumed by `CartStore`.
//!
//! The store is constructed with explicit handles to these traits; adapters
//! for real services live in `rocketshoes-infra`.

use rocketshoes_core::ProductId;
use thiserror::Error;

use crate::model::{CatalogProduct, Stock};

/// Fixed durable-store key holding the cart snapshot.
pub const CART_STORAGE_KEY: &str = "@RocketShoes:cart";

/// Catalog/stock lookup error.
///
/// The store treats every variant the same way (the operation fails); the
/// split exists for logs and for adapters' own tests.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("network error: {0}")]
    Network(String),
    #[error("catalog API error ({0}): {1}")]
    Api(u16, String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("product {0} not found in catalog")]
    NotFound(ProductId),
}

/// Durable key-value store error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("storage backend error: {0}")]
    Backend(String),
    #[error("snapshot serialization failed: {0}")]
    Serialization(String),
}

/// Read-only catalog and inventory service.
#[async_trait::async_trait]
pub trait Catalog: Send + Sync {
    /// Product details (`GET /products/{id}`).
    async fn product(&self, product_id: ProductId) -> Result<CatalogProduct, CatalogError>;

    /// Maximum purchasable quantity (`GET /stock/{id}`).
    async fn stock(&self, product_id: ProductId) -> Result<Stock, CatalogError>;
}

/// Durable key-value store surviving restarts.
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// User-facing failure notice. Exactly one is emitted per failed operation
/// (except ignored amount updates, which emit none).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Notice {
    StockExceeded,
    AddFailed,
    RemoveFailed,
    UpdateFailed,
}

impl Notice {
    pub fn message(&self) -> &'static str {
        match self {
            Notice::StockExceeded => "Requested quantity is out of stock",
            Notice::AddFailed => "Failed to add product",
            Notice::RemoveFailed => "Failed to remove product",
            Notice::UpdateFailed => "Failed to change product quantity",
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Notice::StockExceeded => "stock_exceeded",
            Notice::AddFailed => "add_failed",
            Notice::RemoveFailed => "remove_failed",
            Notice::UpdateFailed => "update_failed",
        }
    }
}

impl core::fmt::Display for Notice {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.message())
    }
}

/// Sink for user-facing failure notices (toasts, logs, ...).
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

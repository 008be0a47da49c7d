//! Cart operation results.

use std::sync::Arc;

use rocketshoes_core::{DomainError, ProductId};
use thiserror::Error;

use crate::model::Cart;
use crate::ports::{CatalogError, StorageError};

/// Successful cart operation.
#[derive(Debug, Clone, PartialEq)]
pub enum CartOutcome {
    /// A new snapshot was committed to storage and memory.
    Updated(Arc<Cart>),
    /// Nothing to change (amount update on a product that is not in the cart).
    Unchanged,
}

impl CartOutcome {
    pub fn is_updated(&self) -> bool {
        matches!(self, CartOutcome::Updated(_))
    }
}

/// Why a cart operation was rejected. The cart is never mutated when one of
/// these is returned.
#[derive(Debug, Error)]
pub enum CartError {
    #[error("requested quantity {requested} of product {product_id} exceeds stock of {available}")]
    StockExceeded {
        product_id: ProductId,
        requested: u64,
        available: u32,
    },

    #[error("product {0} is not in the cart")]
    NotInCart(ProductId),

    #[error("invalid amount {0}; must be at least 1")]
    InvalidAmount(i64),

    #[error("catalog lookup failed: {0}")]
    Catalog(#[from] CatalogError),

    #[error("cart persistence failed: {0}")]
    Storage(#[from] StorageError),

    #[error("stored cart snapshot is unreadable: {0}")]
    CorruptSnapshot(String),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

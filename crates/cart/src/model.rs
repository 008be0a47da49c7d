//! Cart data model.
//!
//! `Cart` is a value: every mutation helper returns a brand-new cart built from
//! the previous one and never touches a line item in place. `CartStore` swaps
//! whole snapshots, so readers holding an older `Arc<Cart>` keep a consistent
//! view.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use rocketshoes_core::{DomainError, DomainResult, ProductId};

/// A cart line item: catalog product data plus the quantity in the cart.
///
/// `amount` is always >= 1 while the item is in a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub price: f64,
    pub image: String,
    pub amount: u32,
}

impl Product {
    /// Price of this line (`price * amount`).
    pub fn subtotal(&self) -> f64 {
        self.price * f64::from(self.amount)
    }

    fn with_amount(&self, amount: u32) -> Self {
        Self {
            amount,
            ..self.clone()
        }
    }
}

/// Product as served by `GET /products/{id}` (no cart quantity yet).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogProduct {
    pub id: ProductId,
    pub title: String,
    pub price: f64,
    pub image: String,
}

impl CatalogProduct {
    /// Turn a catalog product into a fresh line item with `amount = 1`.
    pub fn into_line_item(self) -> Product {
        Product {
            id: self.id,
            title: self.title,
            price: self.price,
            image: self.image,
            amount: 1,
        }
    }
}

/// Maximum purchasable quantity for a product (`GET /stock/{id}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    pub id: ProductId,
    pub amount: u32,
}

/// Ordered sequence of line items, unique by product id.
///
/// Serializes as a bare JSON array of [`Product`], which is also the
/// persisted snapshot format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<Product>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cart from line items, enforcing id uniqueness and `amount >= 1`.
    pub fn from_items(items: Vec<Product>) -> DomainResult<Self> {
        for (idx, item) in items.iter().enumerate() {
            if item.amount == 0 {
                return Err(DomainError::invariant(format!(
                    "line item {} has zero amount",
                    item.id
                )));
            }
            if items[..idx].iter().any(|other| other.id == item.id) {
                return Err(DomainError::invariant(format!(
                    "duplicate line item for product {}",
                    item.id
                )));
            }
        }
        Ok(Self { items })
    }

    /// Parse a persisted snapshot.
    pub fn from_snapshot(text: &str) -> DomainResult<Self> {
        let items: Vec<Product> = serde_json::from_str(text)
            .map_err(|e| DomainError::validation(format!("malformed cart snapshot: {e}")))?;
        Self::from_items(items)
    }

    /// Render the persisted snapshot.
    pub fn to_snapshot(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn items(&self) -> &[Product] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn find(&self, product_id: ProductId) -> Option<&Product> {
        self.items.iter().find(|p| p.id == product_id)
    }

    pub fn contains(&self, product_id: ProductId) -> bool {
        self.find(product_id).is_some()
    }

    /// Sum of all line subtotals.
    pub fn total(&self) -> f64 {
        self.items.iter().map(Product::subtotal).sum()
    }

    /// Total number of units across all line items.
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|p| u64::from(p.amount)).sum()
    }

    /// Quantity in cart per product, for listings that show "n in cart".
    pub fn amounts(&self) -> BTreeMap<ProductId, u32> {
        self.items.iter().map(|p| (p.id, p.amount)).collect()
    }

    /// New cart with `product` appended.
    pub fn with_appended(&self, product: Product) -> DomainResult<Self> {
        if self.contains(product.id) {
            return Err(DomainError::invariant(format!(
                "product {} is already in the cart",
                product.id
            )));
        }
        if product.amount == 0 {
            return Err(DomainError::validation("line item amount must be at least 1"));
        }
        let mut items = self.items.clone();
        items.push(product);
        Ok(Self { items })
    }

    /// New cart with the matching line item's amount bumped by one.
    ///
    /// The bumped item moves to the end of the sequence. Returns `None` when
    /// the product is not in the cart.
    pub fn with_incremented(&self, product_id: ProductId) -> Option<Self> {
        let existing = self.find(product_id)?;
        let bumped = existing.with_amount(existing.amount.saturating_add(1));
        let mut items: Vec<Product> = self
            .items
            .iter()
            .filter(|p| p.id != product_id)
            .cloned()
            .collect();
        items.push(bumped);
        Some(Self { items })
    }

    /// New cart without the matching line item, or `None` when it is absent.
    pub fn without(&self, product_id: ProductId) -> Option<Self> {
        if !self.contains(product_id) {
            return None;
        }
        let items = self
            .items
            .iter()
            .filter(|p| p.id != product_id)
            .cloned()
            .collect();
        Some(Self { items })
    }

    /// New cart with the matching line item set to `amount`.
    ///
    /// Items keep their positions. A cart without a matching item comes back
    /// equal to `self`.
    pub fn with_amount(&self, product_id: ProductId, amount: u32) -> DomainResult<Self> {
        if amount == 0 {
            return Err(DomainError::validation("line item amount must be at least 1"));
        }
        let items = self
            .items
            .iter()
            .map(|p| {
                if p.id == product_id {
                    p.with_amount(amount)
                } else {
                    p.clone()
                }
            })
            .collect();
        Ok(Self { items })
    }
}

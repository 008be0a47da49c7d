//! `CartStore`: validated, persisted cart mutations.
//!
//! Every operation is a single transaction. It validates the request (possibly
//! consulting the catalog), builds the next `Cart`, writes the durable
//! snapshot and only then swaps the in-memory snapshot. The first failure
//! short-circuits before any write.
//!
//! Mutations are serialized through an async operation lock that is held
//! across catalog lookups, so two overlapping calls never both build on the
//! same pre-mutation snapshot. `cart()` reads never wait on that lock.

use std::sync::{Arc, RwLock};

use rocketshoes_core::ProductId;
use tokio::sync::Mutex;

use crate::error::{CartError, CartOutcome};
use crate::model::Cart;
use crate::ports::{
    CART_STORAGE_KEY, Catalog, CatalogError, KeyValueStore, Notice, Notifier, StorageError,
};

/// Request to set a line item's quantity.
///
/// `amount` is signed so that out-of-range requests (0, negatives) coming
/// from the UI can be represented and ignored.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct UpdateProductAmount {
    pub product_id: ProductId,
    pub amount: i64,
}

#[derive(Debug, Copy, Clone)]
enum Operation {
    Add,
    Remove,
    Update,
}

impl Operation {
    fn name(self) -> &'static str {
        match self {
            Operation::Add => "add_product",
            Operation::Remove => "remove_product",
            Operation::Update => "update_product_amount",
        }
    }

    fn failure_notice(self) -> Notice {
        match self {
            Operation::Add => Notice::AddFailed,
            Operation::Remove => Notice::RemoveFailed,
            Operation::Update => Notice::UpdateFailed,
        }
    }
}

/// Session cart backed by a catalog, a durable store and a notice sink.
pub struct CartStore {
    catalog: Arc<dyn Catalog>,
    storage: Arc<dyn KeyValueStore>,
    notifier: Arc<dyn Notifier>,
    snapshot: RwLock<Arc<Cart>>,
    op_lock: Mutex<()>,
}

impl core::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CartStore")
            .field("cart", &self.cart())
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Seed the store from the persisted snapshot (empty cart when absent).
    ///
    /// An unreadable snapshot is a startup error; the store never clears it
    /// on its own.
    pub async fn load(
        catalog: Arc<dyn Catalog>,
        storage: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, CartError> {
        let cart = match storage.get(CART_STORAGE_KEY).await? {
            Some(text) => Cart::from_snapshot(&text)
                .map_err(|e| CartError::CorruptSnapshot(e.to_string()))?,
            None => Cart::new(),
        };

        tracing::debug!(items = cart.len(), "cart loaded from storage");

        Ok(Self {
            catalog,
            storage,
            notifier,
            snapshot: RwLock::new(Arc::new(cart)),
            op_lock: Mutex::new(()),
        })
    }

    /// Current cart snapshot.
    pub fn cart(&self) -> Arc<Cart> {
        match self.snapshot.read() {
            Ok(guard) => Arc::clone(&*guard),
            Err(poisoned) => Arc::clone(&*poisoned.into_inner()),
        }
    }

    /// Add one unit of a product, fetching it from the catalog when it is not
    /// in the cart yet.
    pub async fn add_product(&self, product_id: ProductId) -> Result<CartOutcome, CartError> {
        let _guard = self.op_lock.lock().await;
        let result = self.try_add(product_id).await;
        self.report(Operation::Add, product_id, result)
    }

    /// Drop a line item from the cart.
    pub async fn remove_product(&self, product_id: ProductId) -> Result<CartOutcome, CartError> {
        let _guard = self.op_lock.lock().await;
        let result = self.try_remove(product_id).await;
        self.report(Operation::Remove, product_id, result)
    }

    /// Set a line item's quantity, bounded by the catalog's stock.
    ///
    /// Amounts below 1 are ignored without a notice. A product that is not in
    /// the cart leaves it unchanged, also without a notice.
    pub async fn update_product_amount(
        &self,
        request: UpdateProductAmount,
    ) -> Result<CartOutcome, CartError> {
        let _guard = self.op_lock.lock().await;
        let result = self.try_update(request).await;
        self.report(Operation::Update, request.product_id, result)
    }

    async fn try_add(&self, product_id: ProductId) -> Result<CartOutcome, CartError> {
        let current = self.cart();

        let next = match current.find(product_id) {
            Some(existing) => {
                let requested = u64::from(existing.amount) + 1;
                let stock = self.catalog.stock(product_id).await?;
                if requested > u64::from(stock.amount) {
                    return Err(CartError::StockExceeded {
                        product_id,
                        requested,
                        available: stock.amount,
                    });
                }
                current
                    .with_incremented(product_id)
                    .ok_or(CartError::NotInCart(product_id))?
            }
            None => {
                let product = self.catalog.product(product_id).await?;
                if product.id != product_id {
                    return Err(CatalogError::Parse(format!(
                        "requested product {product_id}, catalog answered with {}",
                        product.id
                    ))
                    .into());
                }
                current.with_appended(product.into_line_item())?
            }
        };

        self.commit(next).await
    }

    async fn try_remove(&self, product_id: ProductId) -> Result<CartOutcome, CartError> {
        let next = self
            .cart()
            .without(product_id)
            .ok_or(CartError::NotInCart(product_id))?;

        self.commit(next).await
    }

    async fn try_update(&self, request: UpdateProductAmount) -> Result<CartOutcome, CartError> {
        let UpdateProductAmount { product_id, amount } = request;
        if amount < 1 {
            return Err(CartError::InvalidAmount(amount));
        }

        let stock = self.catalog.stock(product_id).await?;
        if amount > i64::from(stock.amount) {
            return Err(CartError::StockExceeded {
                product_id,
                requested: amount.unsigned_abs(),
                available: stock.amount,
            });
        }
        // amount is within 1..=stock.amount here, so it fits.
        let amount = u32::try_from(amount).map_err(|_| CartError::InvalidAmount(amount))?;

        let current = self.cart();
        if !current.contains(product_id) {
            return Ok(CartOutcome::Unchanged);
        }

        let next = current.with_amount(product_id, amount)?;
        self.commit(next).await
    }

    /// Persist `next`, then publish it as the in-memory snapshot.
    async fn commit(&self, next: Cart) -> Result<CartOutcome, CartError> {
        let text = next
            .to_snapshot()
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.storage.set(CART_STORAGE_KEY, &text).await?;

        let next = Arc::new(next);
        match self.snapshot.write() {
            Ok(mut guard) => *guard = Arc::clone(&next),
            Err(poisoned) => {
                let mut guard = poisoned.into_inner();
                *guard = Arc::clone(&next);
            }
        }
        Ok(CartOutcome::Updated(next))
    }

    /// Log the outcome and drive the notifier for failures.
    fn report(
        &self,
        op: Operation,
        product_id: ProductId,
        result: Result<CartOutcome, CartError>,
    ) -> Result<CartOutcome, CartError> {
        match &result {
            Ok(CartOutcome::Updated(cart)) => {
                tracing::debug!(op = op.name(), %product_id, items = cart.len(), "cart updated");
            }
            Ok(CartOutcome::Unchanged) => {
                tracing::debug!(op = op.name(), %product_id, "product not in cart; nothing to update");
            }
            Err(err) => {
                let notice = match err {
                    CartError::InvalidAmount(_) => None,
                    CartError::StockExceeded { .. } => Some(Notice::StockExceeded),
                    _ => Some(op.failure_notice()),
                };
                match err {
                    CartError::Catalog(_) | CartError::Storage(_) | CartError::Domain(_) => {
                        tracing::error!(op = op.name(), %product_id, error = %err, "cart operation failed");
                    }
                    _ => {
                        tracing::warn!(op = op.name(), %product_id, error = %err, "cart operation rejected");
                    }
                }
                if let Some(notice) = notice {
                    self.notifier.notify(notice);
                }
            }
        }
        result
    }
}

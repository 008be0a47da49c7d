use std::sync::Arc;
use std::time::Duration;

use rocketshoes_cart::in_memory::{InMemoryCatalog, InMemoryStore, RecordingNotifier};
use rocketshoes_cart::{
    CART_STORAGE_KEY, Cart, CartError, CartOutcome, CartStore, Catalog, CatalogError,
    CatalogProduct, Notice, Product, Stock, UpdateProductAmount,
};
use rocketshoes_core::ProductId;

struct Harness {
    catalog: Arc<InMemoryCatalog>,
    storage: Arc<InMemoryStore>,
    notifier: Arc<RecordingNotifier>,
    store: CartStore,
}

impl Harness {
    async fn new(catalog: InMemoryCatalog, storage: InMemoryStore) -> Self {
        let catalog = Arc::new(catalog);
        let storage = Arc::new(storage);
        let notifier = Arc::new(RecordingNotifier::new());
        let store = CartStore::load(catalog.clone(), storage.clone(), notifier.clone())
            .await
            .expect("failed to load cart store");
        Self {
            catalog,
            storage,
            notifier,
            store,
        }
    }

    async fn empty(catalog: InMemoryCatalog) -> Self {
        Self::new(catalog, InMemoryStore::new()).await
    }

    async fn seeded(catalog: InMemoryCatalog, items: Vec<Product>) -> Self {
        let snapshot = Cart::from_items(items).unwrap().to_snapshot().unwrap();
        Self::new(
            catalog,
            InMemoryStore::new().with_entry(CART_STORAGE_KEY, snapshot),
        )
        .await
    }

    fn persisted(&self) -> Cart {
        let text = self
            .storage
            .raw(CART_STORAGE_KEY)
            .expect("cart snapshot missing from storage");
        Cart::from_snapshot(&text).unwrap()
    }

    fn assert_persisted_matches_memory(&self) {
        let mut persisted: Vec<(u64, u32)> = self
            .persisted()
            .items()
            .iter()
            .map(|p| (p.id.get(), p.amount))
            .collect();
        let mut memory: Vec<(u64, u32)> = self
            .store
            .cart()
            .items()
            .iter()
            .map(|p| (p.id.get(), p.amount))
            .collect();
        persisted.sort();
        memory.sort();
        assert_eq!(persisted, memory);
    }
}

fn catalog_shoe(id: u64) -> CatalogProduct {
    CatalogProduct {
        id: ProductId::new(id),
        title: format!("Shoe {id}"),
        price: 10.0,
        image: format!("https://cdn.example/shoes/{id}.jpg"),
    }
}

fn line(id: u64, amount: u32) -> Product {
    Product {
        amount,
        ..catalog_shoe(id).into_line_item()
    }
}

fn pid(id: u64) -> ProductId {
    ProductId::new(id)
}

#[tokio::test]
async fn adding_to_empty_cart_creates_single_unit_line_item() {
    let catalog = InMemoryCatalog::new().with_product(
        CatalogProduct {
            id: pid(1),
            title: "Shoe".to_string(),
            price: 10.0,
            image: "shoe.jpg".to_string(),
        },
        5,
    );
    let h = Harness::empty(catalog).await;

    let outcome = h.store.add_product(pid(1)).await.unwrap();

    assert!(outcome.is_updated());
    let cart = h.store.cart();
    assert_eq!(
        cart.items(),
        &[Product {
            id: pid(1),
            title: "Shoe".to_string(),
            price: 10.0,
            image: "shoe.jpg".to_string(),
            amount: 1,
        }]
    );
    assert!(h.notifier.notices().is_empty());
    h.assert_persisted_matches_memory();
}

#[tokio::test]
async fn adding_existing_item_increments_within_stock() {
    let catalog = InMemoryCatalog::new()
        .with_product(catalog_shoe(1), 3)
        .with_product(catalog_shoe(2), 3);
    let h = Harness::seeded(catalog, vec![line(1, 2), line(2, 1)]).await;

    h.store.add_product(pid(1)).await.unwrap();

    let cart = h.store.cart();
    assert_eq!(cart.find(pid(1)).unwrap().amount, 3);
    assert_eq!(cart.find(pid(2)).unwrap().amount, 1);
    assert_eq!(cart.len(), 2);
    assert_eq!(h.catalog.stock_lookups(), 1);
    assert_eq!(h.catalog.product_lookups(), 0);
    h.assert_persisted_matches_memory();
}

#[tokio::test]
async fn adding_beyond_stock_leaves_cart_unchanged_and_notifies() {
    let catalog = InMemoryCatalog::new().with_product(catalog_shoe(1), 2);
    let h = Harness::seeded(catalog, vec![line(1, 2)]).await;
    let before = h.storage.raw(CART_STORAGE_KEY);

    let err = h.store.add_product(pid(1)).await.unwrap_err();

    assert!(matches!(
        err,
        CartError::StockExceeded {
            requested: 3,
            available: 2,
            ..
        }
    ));
    assert_eq!(h.store.cart().items(), &[line(1, 2)]);
    assert_eq!(h.storage.raw(CART_STORAGE_KEY), before);
    assert_eq!(h.notifier.notices(), vec![Notice::StockExceeded]);
}

#[tokio::test]
async fn add_failure_from_catalog_notifies_add_failed() {
    let catalog = InMemoryCatalog::new().with_product(catalog_shoe(1), 5);
    let h = Harness::empty(catalog).await;
    h.catalog.set_unavailable(true);

    let err = h.store.add_product(pid(1)).await.unwrap_err();

    assert!(matches!(err, CartError::Catalog(_)));
    assert!(h.store.cart().is_empty());
    assert!(h.storage.raw(CART_STORAGE_KEY).is_none());
    assert_eq!(h.notifier.notices(), vec![Notice::AddFailed]);
}

#[tokio::test]
async fn adding_unknown_product_notifies_add_failed() {
    let h = Harness::empty(InMemoryCatalog::new()).await;

    let err = h.store.add_product(pid(42)).await.unwrap_err();

    assert!(matches!(err, CartError::Catalog(_)));
    assert_eq!(h.notifier.notices(), vec![Notice::AddFailed]);
}

/// Catalog that answers every product lookup with product 2.
struct SkewedCatalog;

#[async_trait::async_trait]
impl Catalog for SkewedCatalog {
    async fn product(&self, _product_id: ProductId) -> Result<CatalogProduct, CatalogError> {
        Ok(catalog_shoe(2))
    }

    async fn stock(&self, product_id: ProductId) -> Result<Stock, CatalogError> {
        Ok(Stock {
            id: product_id,
            amount: 5,
        })
    }
}

#[tokio::test]
async fn catalog_answering_for_another_product_is_rejected() {
    let storage = Arc::new(InMemoryStore::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let store = CartStore::load(Arc::new(SkewedCatalog), storage.clone(), notifier.clone())
        .await
        .unwrap();

    let err = store.add_product(pid(1)).await.unwrap_err();

    assert!(matches!(err, CartError::Catalog(CatalogError::Parse(_))));
    assert!(store.cart().is_empty());
    assert!(storage.raw(CART_STORAGE_KEY).is_none());
    assert_eq!(notifier.notices(), vec![Notice::AddFailed]);
}

#[tokio::test]
async fn failed_write_keeps_memory_snapshot() {
    let catalog = InMemoryCatalog::new().with_product(catalog_shoe(1), 5);
    let h = Harness::seeded(catalog, vec![line(1, 1)]).await;
    h.storage.set_fail_writes(true);

    let err = h.store.add_product(pid(1)).await.unwrap_err();

    assert!(matches!(err, CartError::Storage(_)));
    assert_eq!(h.store.cart().items(), &[line(1, 1)]);
    assert_eq!(h.notifier.notices(), vec![Notice::AddFailed]);
}

#[tokio::test]
async fn removing_existing_item_keeps_the_rest() {
    let h = Harness::seeded(
        InMemoryCatalog::new(),
        vec![line(1, 1), line(2, 4), line(3, 2)],
    )
    .await;

    h.store.remove_product(pid(2)).await.unwrap();

    assert_eq!(h.store.cart().items(), &[line(1, 1), line(3, 2)]);
    assert!(h.notifier.notices().is_empty());
    h.assert_persisted_matches_memory();
}

#[tokio::test]
async fn removing_twice_fails_cleanly_the_second_time() {
    let h = Harness::seeded(InMemoryCatalog::new(), vec![line(1, 1), line(2, 1)]).await;

    h.store.remove_product(pid(1)).await.unwrap();
    let snapshot_after_first = h.storage.raw(CART_STORAGE_KEY);

    let err = h.store.remove_product(pid(1)).await.unwrap_err();

    assert!(matches!(err, CartError::NotInCart(id) if id == pid(1)));
    assert_eq!(h.store.cart().items(), &[line(2, 1)]);
    assert_eq!(h.storage.raw(CART_STORAGE_KEY), snapshot_after_first);
    assert_eq!(h.notifier.notices(), vec![Notice::RemoveFailed]);
}

#[tokio::test]
async fn remove_write_failure_notifies_remove_failed() {
    let h = Harness::seeded(InMemoryCatalog::new(), vec![line(1, 1)]).await;
    h.storage.set_fail_writes(true);

    assert!(h.store.remove_product(pid(1)).await.is_err());
    assert_eq!(h.store.cart().items(), &[line(1, 1)]);
    assert_eq!(h.notifier.notices(), vec![Notice::RemoveFailed]);
}

#[tokio::test]
async fn update_below_one_is_ignored_silently() {
    let catalog = InMemoryCatalog::new().with_product(catalog_shoe(1), 5);
    let h = Harness::seeded(catalog, vec![line(1, 2)]).await;

    for amount in [0, -1, i64::MIN] {
        let err = h
            .store
            .update_product_amount(UpdateProductAmount {
                product_id: pid(1),
                amount,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::InvalidAmount(a) if a == amount));
    }

    assert_eq!(h.store.cart().items(), &[line(1, 2)]);
    assert!(h.notifier.notices().is_empty());
    assert_eq!(h.catalog.stock_lookups(), 0);
}

#[tokio::test]
async fn update_within_stock_sets_exact_amount() {
    let catalog = InMemoryCatalog::new()
        .with_product(catalog_shoe(1), 5)
        .with_product(catalog_shoe(2), 5);
    let h = Harness::seeded(catalog, vec![line(1, 1), line(2, 3)]).await;

    h.store
        .update_product_amount(UpdateProductAmount {
            product_id: pid(1),
            amount: 5,
        })
        .await
        .unwrap();

    assert_eq!(h.store.cart().items(), &[line(1, 5), line(2, 3)]);
    h.assert_persisted_matches_memory();
}

#[tokio::test]
async fn update_beyond_stock_notifies_stock_exceeded() {
    let catalog = InMemoryCatalog::new().with_product(catalog_shoe(1), 3);
    let h = Harness::seeded(catalog, vec![line(1, 1)]).await;

    let err = h
        .store
        .update_product_amount(UpdateProductAmount {
            product_id: pid(1),
            amount: 4,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, CartError::StockExceeded { available: 3, .. }));
    assert_eq!(h.store.cart().items(), &[line(1, 1)]);
    assert_eq!(h.notifier.notices(), vec![Notice::StockExceeded]);
}

#[tokio::test]
async fn update_for_product_not_in_cart_is_a_silent_no_op() {
    let catalog = InMemoryCatalog::new().with_product(catalog_shoe(9), 10);
    let h = Harness::seeded(catalog, vec![line(1, 1)]).await;

    let outcome = h
        .store
        .update_product_amount(UpdateProductAmount {
            product_id: pid(9),
            amount: 2,
        })
        .await
        .unwrap();

    assert_eq!(outcome, CartOutcome::Unchanged);
    assert_eq!(h.store.cart().items(), &[line(1, 1)]);
    assert!(h.notifier.notices().is_empty());
}

#[tokio::test]
async fn update_write_failure_notifies_update_failed() {
    let catalog = InMemoryCatalog::new().with_product(catalog_shoe(1), 5);
    let h = Harness::seeded(catalog, vec![line(1, 1)]).await;
    let before = h.storage.raw(CART_STORAGE_KEY);
    h.storage.set_fail_writes(true);

    let err = h
        .store
        .update_product_amount(UpdateProductAmount {
            product_id: pid(1),
            amount: 3,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, CartError::Storage(_)));
    assert_eq!(h.store.cart().items(), &[line(1, 1)]);
    assert_eq!(h.storage.raw(CART_STORAGE_KEY), before);
    assert_eq!(h.notifier.notices(), vec![Notice::UpdateFailed]);
}

#[tokio::test]
async fn update_stock_failure_notifies_update_failed() {
    let catalog = InMemoryCatalog::new().with_product(catalog_shoe(1), 3);
    let h = Harness::seeded(catalog, vec![line(1, 1)]).await;
    h.catalog.set_unavailable(true);

    let err = h
        .store
        .update_product_amount(UpdateProductAmount {
            product_id: pid(1),
            amount: 2,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, CartError::Catalog(_)));
    assert_eq!(h.notifier.notices(), vec![Notice::UpdateFailed]);
}

#[tokio::test]
async fn reloading_from_storage_restores_the_cart() {
    let catalog = Arc::new(
        InMemoryCatalog::new()
            .with_product(catalog_shoe(1), 5)
            .with_product(catalog_shoe(2), 5),
    );
    let storage = Arc::new(InMemoryStore::new());
    let notifier = Arc::new(RecordingNotifier::new());

    let store = CartStore::load(catalog.clone(), storage.clone(), notifier.clone())
        .await
        .unwrap();
    store.add_product(pid(1)).await.unwrap();
    store.add_product(pid(2)).await.unwrap();
    store.add_product(pid(1)).await.unwrap();
    let expected = store.cart();
    drop(store);

    let reloaded = CartStore::load(catalog, storage, notifier).await.unwrap();

    assert_eq!(reloaded.cart().amounts(), expected.amounts());
}

#[tokio::test]
async fn corrupt_snapshot_fails_startup() {
    let storage = Arc::new(InMemoryStore::new().with_entry(CART_STORAGE_KEY, "not json"));

    let err = CartStore::load(
        Arc::new(InMemoryCatalog::new()),
        storage,
        Arc::new(RecordingNotifier::new()),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, CartError::CorruptSnapshot(_)));
}

#[tokio::test]
async fn overlapping_adds_are_serialized() {
    let catalog = InMemoryCatalog::new()
        .with_product(catalog_shoe(1), 10)
        .with_latency(Duration::from_millis(20));
    let h = Harness::seeded(catalog, vec![line(1, 1)]).await;

    let (a, b) = tokio::join!(h.store.add_product(pid(1)), h.store.add_product(pid(1)));

    assert!(a.is_ok());
    assert!(b.is_ok());
    assert_eq!(h.store.cart().find(pid(1)).unwrap().amount, 3);
    h.assert_persisted_matches_memory();
}

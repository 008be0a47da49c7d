//! Wiring: build a `CartStore` from configuration.

use std::sync::Arc;

use anyhow::Context;
use rocketshoes_cart::{CartStore, Catalog, KeyValueStore, Notifier};

use crate::catalog::HttpCatalog;
use crate::config::CartConfig;
use crate::notifier::TracingNotifier;
use crate::sqlite_store::SqliteStore;

/// Build the production cart store: HTTP catalog, SQLite durable store and
/// tracing notices.
pub async fn build_cart_store(config: &CartConfig) -> anyhow::Result<CartStore> {
    let catalog = match config.http_timeout {
        Some(timeout) => HttpCatalog::with_timeout(&config.api_url, timeout)
            .context("failed to build catalog HTTP client")?,
        None => HttpCatalog::new(&config.api_url),
    };
    let catalog: Arc<dyn Catalog> = Arc::new(catalog);
    let storage: Arc<dyn KeyValueStore> = Arc::new(SqliteStore::new(&config.db_path));
    let notifier: Arc<dyn Notifier> = Arc::new(TracingNotifier::new());

    tracing::info!(api_url = %config.api_url, db_path = ?config.db_path, "building cart store");

    CartStore::load(catalog, storage, notifier)
        .await
        .context("failed to load cart from durable store")
}

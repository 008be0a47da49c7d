//! `rocketshoes-cart`
//!
//! **Responsibility:** shopping-cart state for the storefront.
//!
//! This crate provides:
//! - The cart data model (`Product`, `Stock`, `Cart`) with value semantics
//! - Collaborator traits for the catalog service, durable storage and user notices
//! - `CartStore`, which validates mutations against stock and mirrors every
//!   committed cart into durable storage
//!
//! Concrete HTTP/SQLite adapters live in `rocketshoes-infra`; in-memory
//! collaborators for tests and local runs live in [`in_memory`].

pub mod error;
pub mod in_memory;
pub mod model;
pub mod ports;
pub mod store;

pub use error::{CartError, CartOutcome};
pub use model::{Cart, CatalogProduct, Product, Stock};
pub use ports::{
    CART_STORAGE_KEY, Catalog, CatalogError, KeyValueStore, Notice, Notifier, StorageError,
};
pub use store::{CartStore, UpdateProductAmount};

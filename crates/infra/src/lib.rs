//! `rocketshoes-infra`
//!
//! **Responsibility:** concrete adapters for the cart's collaborators.
//!
//! - [`catalog::HttpCatalog`]: catalog/stock lookups over HTTP (`reqwest`)
//! - [`sqlite_store::SqliteStore`]: durable key-value store on SQLite (`sqlx`)
//! - [`notifier::TracingNotifier`]: user notices emitted as tracing events
//! - [`config::CartConfig`]: environment-driven configuration
//! - [`services::build_cart_store`]: wires the above into a `CartStore`

pub mod catalog;
pub mod config;
pub mod notifier;
pub mod services;
pub mod sqlite_store;

pub use catalog::HttpCatalog;
pub use config::{CartConfig, ConfigError};
pub use notifier::TracingNotifier;
pub use services::build_cart_store;
pub use sqlite_store::SqliteStore;

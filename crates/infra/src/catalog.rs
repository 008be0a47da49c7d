//! Catalog/stock client over the storefront HTTP API.

use std::time::Duration;

use rocketshoes_cart::{Catalog, CatalogError, CatalogProduct, Stock};
use rocketshoes_core::ProductId;
use serde::de::DeserializeOwned;

/// Client for `GET /products/{id}` and `GET /stock/{id}`.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCatalog {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Build a client whose requests give up after `timeout`.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CatalogError::Network(e.to_string()))?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    async fn get_json<T>(&self, path: &str, product_id: ProductId) -> Result<T, CatalogError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}/{}/{}", self.base_url, path, product_id);
        tracing::debug!(%url, "catalog request");

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(product_id));
        }
        if !status.is_success() {
            return Err(CatalogError::Api(
                status.as_u16(),
                resp.text().await.unwrap_or_default(),
            ));
        }

        resp.json().await.map_err(|e| CatalogError::Parse(e.to_string()))
    }
}

#[async_trait::async_trait]
impl Catalog for HttpCatalog {
    async fn product(&self, product_id: ProductId) -> Result<CatalogProduct, CatalogError> {
        self.get_json("products", product_id).await
    }

    async fn stock(&self, product_id: ProductId) -> Result<Stock, CatalogError> {
        self.get_json("stock", product_id).await
    }
}

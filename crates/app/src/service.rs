use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use product_catalog_core::types::{NewProduct, Product};
use product_catalog_storage::{Database, ProductError};

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Orchestrates the catalog use cases on top of the product repository.
#[derive(Clone)]
pub struct ProductService {
    database: Database,
    clock: Clock,
}

impl ProductService {
    pub fn new(database: Database, clock: Clock) -> Self {
        Self { database, clock }
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    /// Persists a new product after checking that its name is free.
    ///
    /// The existence check only short-circuits the common case; two concurrent
    /// requests can both pass it, and the loser is then rejected by the unique
    /// index, which surfaces as the same [`CreateProductError::DuplicateName`].
    pub async fn create_product(&self, input: NewProduct) -> Result<Product, CreateProductError> {
        let products = self.database.products();

        if products.exists_by_name(input.name()).await? {
            return Err(CreateProductError::DuplicateName);
        }

        let created_at = self.now();
        let product = products.insert(&input, created_at).await?;
        Ok(product)
    }

    /// Returns every product, most recent first.
    pub async fn list_products(&self) -> Result<Vec<Product>, ProductError> {
        self.database.products().list_recent().await
    }
}

#[derive(Debug, Error)]
pub enum CreateProductError {
    #[error("a product with this name already exists")]
    DuplicateName,
    #[error("failed to persist product: {0}")]
    Storage(#[source] ProductError),
}

impl From<ProductError> for CreateProductError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::DuplicateName => Self::DuplicateName,
            other => Self::Storage(other),
        }
    }
}

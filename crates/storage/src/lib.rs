use std::{str::FromStr, time::Duration};

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{
    migrate::MigrateError,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous},
    Row, SqlitePool,
};
use thiserror::Error;

use product_catalog_core::types::{NewProduct, Product, ProductType, UnknownProductType};

const BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Top-level database handle that owns the SQLite connection pool.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Establishes a new SQLite connection pool for the provided connection string.
    ///
    /// WAL journaling, `synchronous = NORMAL` and the busy timeout are part of
    /// the connect options, so every pooled connection starts with them.
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(StorageError::Connect)?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(StorageError::Connect)?;

        Ok(Self { pool })
    }

    /// Applies migrations located under `migrations/`.
    pub async fn run_migrations(&self) -> Result<(), StorageError> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(StorageError::Migration)?;
        Ok(())
    }

    /// Returns a handle to interact with the products table.
    pub fn products(&self) -> ProductRepository {
        ProductRepository {
            pool: self.pool.clone(),
        }
    }

    /// Round-trips a trivial statement to prove the database is reachable.
    pub async fn ping(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Exposes the inner pool when lower level access is required.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// General storage level errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to connect to sqlite: {0}")]
    Connect(sqlx::Error),
    #[error("failed to run database migrations: {0}")]
    Migration(MigrateError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Repository responsible for the `products` table.
#[derive(Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Returns `true` when a product with exactly this name is stored.
    pub async fn exists_by_name(&self, name: &str) -> Result<bool, ProductError> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM products WHERE name = ?) AS present")
            .bind(name)
            .fetch_one(&self.pool)
            .await?;

        let present: i64 = row.get("present");
        Ok(present != 0)
    }

    /// Inserts a product and returns the stored row.
    ///
    /// A violated unique index on `name` is reported as
    /// [`ProductError::DuplicateName`], independently of any prior
    /// existence check.
    pub async fn insert(
        &self,
        product: &NewProduct,
        created_at: DateTime<Utc>,
    ) -> Result<Product, ProductError> {
        let row = sqlx::query_as::<_, ProductRow>(
            "INSERT INTO products (name, description, type, created_at) \
             VALUES (?, ?, ?, ?) \
             RETURNING id, name, description, type, created_at",
        )
        .bind(product.name())
        .bind(product.description())
        .bind(product.product_type().as_str())
        .bind(to_rfc3339(created_at))
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                ProductError::DuplicateName
            }
            other => ProductError::Database(other),
        })?;

        row.into_domain()
    }

    /// Loads a single product by identifier.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Product>, ProductError> {
        let row = sqlx::query_as::<_, ProductRow>(
            "SELECT id, name, description, type, created_at FROM products WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ProductRow::into_domain).transpose()
    }

    /// Lists every product, most recently created first.
    pub async fn list_recent(&self) -> Result<Vec<Product>, ProductError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            "SELECT id, name, description, type, created_at \
               FROM products \
              ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ProductRow::into_domain).collect()
    }

    /// Counts stored products.
    pub async fn count(&self) -> Result<u64, ProductError> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM products")
            .fetch_one(&self.pool)
            .await?;

        let total: i64 = row.get("total");
        Ok(total as u64)
    }
}

/// Raw `products` row as stored in SQLite.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    description: String,
    #[sqlx(rename = "type")]
    product_type: String,
    created_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_domain(self) -> Result<Product, ProductError> {
        let product_type = self
            .product_type
            .parse::<ProductType>()
            .map_err(|source| ProductError::UnknownType {
                id: self.id,
                source,
            })?;

        Ok(Product {
            id: self.id,
            name: self.name,
            description: self.description,
            product_type,
            created_at: self.created_at,
        })
    }
}

/// Errors that can occur while reading or writing products.
#[derive(Debug, Error)]
pub enum ProductError {
    #[error("a product with this name already exists")]
    DuplicateName,
    #[error("product {id} has an unreadable type: {source}")]
    UnknownType {
        id: i64,
        source: UnknownProductType,
    },
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for ProductError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err)
    }
}

/// Fixed-width nanosecond precision keeps the text column sortable and
/// lossless on read-back.
fn to_rfc3339(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

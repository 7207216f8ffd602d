//! Product persistence abstraction.
//!
//! One trait, one implementation per backing store. The in-memory store doubles as the
//! fake used by tests.

use async_trait::async_trait;

use catalog_core::PageRequest;
use catalog_products::{PartialUpdate, Product, ProductFilter, ProductId};

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryProductRepository;
pub use postgres::PostgresProductRepository;

/// Persistence failure.
///
/// `NotFound` is the typed sentinel callers branch on; everything else is an
/// infrastructure problem.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("not found")]
    NotFound,

    #[error("storage error: {0}")]
    Storage(String),

    #[error("failed to decode stored document: {0}")]
    Decode(String),
}

/// Document store for products.
///
/// Stores own identity assignment and run the entity lifecycle hooks
/// (`before_create` / `before_update`).
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Insert a new product, assigning its id. Any id on the input is ignored.
    async fn create(&self, product: Product) -> Result<Product, RepositoryError>;

    /// All products ordered by id.
    async fn find_all(&self) -> Result<Vec<Product>, RepositoryError>;

    async fn find_by_id(&self, id: ProductId) -> Result<Product, RepositoryError>;

    /// Replace the stored document for `id`, keeping its `created_at`.
    async fn update(&self, id: ProductId, product: Product) -> Result<Product, RepositoryError>;

    /// Overwrite only the fields present in `update`; returns the document after the change.
    async fn patch(&self, id: ProductId, update: &PartialUpdate) -> Result<Product, RepositoryError>;

    async fn delete(&self, id: ProductId) -> Result<(), RepositoryError>;

    /// Number of products matching `filter`.
    async fn count(&self, filter: &ProductFilter) -> Result<u64, RepositoryError>;

    /// One page of products matching `filter`, ordered by id.
    async fn find_page(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<Vec<Product>, RepositoryError>;

    /// Liveness probe.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

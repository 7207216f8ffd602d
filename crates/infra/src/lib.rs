//! Infrastructure layer: persistence, caching, configuration and the product service.

pub mod cache;
pub mod config;
pub mod repository;
pub mod service;

pub use cache::{Cache, CacheError, InMemoryCache};
pub use config::{Config, ConfigError};
pub use repository::{InMemoryProductRepository, PostgresProductRepository, ProductRepository, RepositoryError};
pub use service::ProductService;

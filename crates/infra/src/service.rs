//! Product service (application-level orchestration).
//!
//! Sits between the HTTP handlers and the persistence/cache collaborators:
//!
//! ```text
//! request DTO (already validated at the wire layer)
//!   ↓
//! 1. id check (id > 0)                 → InvalidId, no I/O
//!   ↓
//! 2. business rules (nome, preco > 0)  → ValidationFailed, no I/O
//!   ↓
//! 3. repository call under the request deadline
//!      NotFound sentinel               → NotFound
//!      anything else                   → DatabaseError (cause logged, not returned)
//!   ↓
//! 4. cache: read-through on FindByID, invalidate on every successful write
//! ```
//!
//! The cache is advisory. Its failures are logged at `warn` and swallowed.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error, warn};

use catalog_core::pagination::DEFAULT_MAX_PAGE_SIZE;
use catalog_core::{AppError, AppResult, Entity, Page, PageInfo, PageRequest, RequestContext};
use catalog_observability::metrics;
use catalog_products::{PartialUpdate, Product, ProductFilter, ProductId, COLLECTION};

use crate::cache::{Cache, CacheError};
use crate::repository::{ProductRepository, RepositoryError};

const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, thiserror::Error)]
#[error("deadline exceeded during {operation}")]
struct DeadlineExceeded {
    operation: &'static str,
}

/// Product use cases.
///
/// Cheap to clone; collaborators are shared behind `Arc`.
#[derive(Clone)]
pub struct ProductService {
    repo: Arc<dyn ProductRepository>,
    cache: Option<Arc<dyn Cache>>,
    cache_ttl: Duration,
    max_page_size: i64,
}

impl ProductService {
    pub fn new(repo: Arc<dyn ProductRepository>) -> Self {
        Self {
            repo,
            cache: None,
            cache_ttl: DEFAULT_CACHE_TTL,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }

    /// Enable the look-aside cache for single-product reads.
    pub fn with_cache(mut self, cache: Arc<dyn Cache>, ttl: Duration) -> Self {
        self.cache = Some(cache);
        self.cache_ttl = ttl;
        self
    }

    pub fn with_max_page_size(mut self, max_page_size: i64) -> Self {
        self.max_page_size = max_page_size.max(1);
        self
    }

    pub async fn create(&self, ctx: &RequestContext, product: Product) -> AppResult<Product> {
        product.check_rules()?;

        let created = self.db(ctx, "create", self.repo.create(product)).await?;
        self.invalidate(ctx, created.id).await;
        debug!(request_id = %ctx.request_id(), id = %created.id, "product created");
        Ok(created)
    }

    pub async fn find_all(&self, ctx: &RequestContext) -> AppResult<Vec<Product>> {
        self.db(ctx, "find_all", self.repo.find_all()).await
    }

    pub async fn find_by_id(&self, ctx: &RequestContext, id: ProductId) -> AppResult<Product> {
        check_id(id)?;

        if let Some(hit) = self.cache_get(ctx, id).await {
            return Ok(hit);
        }

        let product = self.db(ctx, "find_by_id", self.repo.find_by_id(id)).await?;
        self.cache_set(ctx, &product).await;
        Ok(product)
    }

    /// Full replace. The id comes from the path; any id on `product` is ignored.
    pub async fn update(&self, ctx: &RequestContext, id: ProductId, product: Product) -> AppResult<Product> {
        check_id(id)?;
        product.check_rules()?;

        let updated = self.db(ctx, "update", self.repo.update(id, product)).await?;
        self.invalidate(ctx, id).await;
        debug!(request_id = %ctx.request_id(), id = %id, "product updated");
        Ok(updated)
    }

    pub async fn patch(&self, ctx: &RequestContext, id: ProductId, update: PartialUpdate) -> AppResult<Product> {
        check_id(id)?;
        update.check_rules()?;

        let patched = self.db(ctx, "patch", self.repo.patch(id, &update)).await?;
        self.invalidate(ctx, id).await;
        debug!(
            request_id = %ctx.request_id(),
            id = %id,
            fields = ?update.keys().collect::<Vec<_>>(),
            "product patched"
        );
        Ok(patched)
    }

    pub async fn delete(&self, ctx: &RequestContext, id: ProductId) -> AppResult<()> {
        check_id(id)?;

        self.db(ctx, "delete", self.repo.delete(id)).await?;
        self.invalidate(ctx, id).await;
        debug!(request_id = %ctx.request_id(), id = %id, "product deleted");
        Ok(())
    }

    /// Count + bounded page read. `page` is defaulted and clamped first.
    pub async fn find_all_paginated(
        &self,
        ctx: &RequestContext,
        page: PageRequest,
        filter: ProductFilter,
    ) -> AppResult<Page<Product>> {
        let page = page.validate(self.max_page_size);
        let filter = filter.normalized();

        let total = self.db(ctx, "count", self.repo.count(&filter)).await?;
        let items = self.db(ctx, "find_page", self.repo.find_page(&filter, page)).await?;

        Ok(Page {
            items,
            pagination: PageInfo::new(page, total),
        })
    }

    /// Liveness of the persistence collaborator.
    pub async fn health_check(&self, ctx: &RequestContext) -> AppResult<()> {
        self.db(ctx, "ping", self.repo.ping()).await
    }

    async fn db<T>(
        &self,
        ctx: &RequestContext,
        operation: &'static str,
        fut: impl Future<Output = Result<T, RepositoryError>>,
    ) -> AppResult<T> {
        let started = Instant::now();
        let outcome = tokio::time::timeout(ctx.remaining(), fut).await;

        let (status, result) = match outcome {
            Ok(Ok(value)) => ("success", Ok(value)),
            Ok(Err(RepositoryError::NotFound)) => ("not_found", Err(AppError::not_found())),
            Ok(Err(e)) => {
                error!(
                    request_id = %ctx.request_id(),
                    operation,
                    collection = COLLECTION,
                    error = %e,
                    "database operation failed"
                );
                ("error", Err(AppError::database(e)))
            }
            Err(_) => {
                error!(
                    request_id = %ctx.request_id(),
                    operation,
                    collection = COLLECTION,
                    "database operation exceeded request deadline"
                );
                ("error", Err(AppError::database(DeadlineExceeded { operation })))
            }
        };

        metrics::record_database_operation(operation, COLLECTION, status, started.elapsed());
        result
    }

    async fn cache_call<T>(
        &self,
        ctx: &RequestContext,
        fut: impl Future<Output = Result<T, CacheError>>,
    ) -> Result<T, CacheError> {
        match tokio::time::timeout(ctx.remaining(), fut).await {
            Ok(r) => r,
            Err(_) => Err(CacheError::Timeout),
        }
    }

    async fn cache_get(&self, ctx: &RequestContext, id: ProductId) -> Option<Product> {
        let cache = self.cache.as_ref()?;
        let key = Product::cache_key(id);

        match self.cache_call(ctx, cache.get(&key)).await {
            Ok(Some(raw)) => match serde_json::from_str::<Product>(&raw) {
                Ok(product) => {
                    debug!(request_id = %ctx.request_id(), key = %key, "cache hit");
                    Some(product)
                }
                Err(e) => {
                    warn!(request_id = %ctx.request_id(), key = %key, error = %e, "discarding undecodable cache entry");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(request_id = %ctx.request_id(), key = %key, error = %e, "cache get failed");
                None
            }
        }
    }

    async fn cache_set(&self, ctx: &RequestContext, product: &Product) {
        let Some(cache) = self.cache.as_ref() else {
            return;
        };
        let key = Product::cache_key(product.id);

        let raw = match serde_json::to_string(product) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(request_id = %ctx.request_id(), key = %key, error = %e, "failed to encode cache entry");
                return;
            }
        };

        if let Err(e) = self.cache_call(ctx, cache.set(&key, raw, self.cache_ttl)).await {
            warn!(request_id = %ctx.request_id(), key = %key, error = %e, "cache set failed");
        }
    }

    async fn invalidate(&self, ctx: &RequestContext, id: ProductId) {
        let Some(cache) = self.cache.as_ref() else {
            return;
        };
        let key = Product::cache_key(id);

        if let Err(e) = self.cache_call(ctx, cache.delete(&key)).await {
            warn!(request_id = %ctx.request_id(), key = %key, error = %e, "cache invalidation failed");
        }
    }
}

fn check_id(id: ProductId) -> AppResult<()> {
    if !id.is_valid() {
        return Err(AppError::invalid_id());
    }
    Ok(())
}

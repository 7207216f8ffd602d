use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use catalog_infra::{
    Cache, Config, InMemoryCache, InMemoryProductRepository, PostgresProductRepository,
    ProductRepository, ProductService,
};

/// Everything the handlers need, shared behind an `Arc` extension.
#[derive(Clone)]
pub struct AppServices {
    pub products: ProductService,
    pub request_timeout: Duration,
}

impl AppServices {
    /// Wire a product service around explicit collaborators.
    pub fn new(
        repo: Arc<dyn ProductRepository>,
        cache: Option<Arc<dyn Cache>>,
        config: &Config,
    ) -> Self {
        let mut products = ProductService::new(repo).with_max_page_size(config.max_page_size);
        if let Some(cache) = cache {
            products = products.with_cache(cache, config.cache_ttl);
        }
        Self {
            products,
            request_timeout: config.request_timeout,
        }
    }

    /// In-memory store and cache (dev/test).
    pub fn in_memory(config: &Config) -> Self {
        let cache: Option<Arc<dyn Cache>> = if config.cache_enabled {
            Some(Arc::new(InMemoryCache::new()))
        } else {
            None
        };
        Self::new(Arc::new(InMemoryProductRepository::new()), cache, config)
    }
}

pub async fn build_services(config: &Config) -> anyhow::Result<AppServices> {
    let repo: Arc<dyn ProductRepository> = if config.use_persistent_stores {
        let url = config
            .database_url
            .as_deref()
            .context("DATABASE_URL must be set when USE_PERSISTENT_STORES=true")?;
        let store = PostgresProductRepository::connect(url)
            .await
            .context("failed to connect to postgres")?;
        store
            .ensure_schema()
            .await
            .context("failed to create produtos table")?;
        tracing::info!("using postgres product store");
        Arc::new(store)
    } else {
        tracing::info!("using in-memory product store");
        Arc::new(InMemoryProductRepository::new())
    };

    let cache = build_cache(config).await;
    Ok(AppServices::new(repo, cache, config))
}

async fn build_cache(config: &Config) -> Option<Arc<dyn Cache>> {
    if !config.cache_enabled {
        tracing::info!("look-aside cache disabled");
        return None;
    }

    if let Some(url) = config.redis_url.as_deref() {
        #[cfg(feature = "redis")]
        {
            match catalog_infra::cache::RedisCache::connect(url).await {
                Ok(cache) => {
                    tracing::info!("using redis cache");
                    return Some(Arc::new(cache));
                }
                Err(e) => {
                    tracing::warn!(error = %e, "redis unavailable, falling back to in-memory cache");
                }
            }
        }
        #[cfg(not(feature = "redis"))]
        {
            tracing::warn!(
                url,
                "REDIS_URL set but redis feature not enabled, falling back to in-memory cache"
            );
        }
    }

    Some(Arc::new(InMemoryCache::new()))
}

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use super::{Cache, CacheError};

/// In-process cache for tests/dev.
///
/// Expired entries are dropped lazily on read; there is no background sweep.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    inner: RwLock<HashMap<String, (String, Instant)>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.inner.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn poisoned() -> CacheError {
        CacheError::Backend("lock poisoned".to_string())
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = Instant::now();
        {
            let map = self.inner.read().map_err(|_| Self::poisoned())?;
            match map.get(key) {
                None => return Ok(None),
                Some((value, expires_at)) if *expires_at > now => return Ok(Some(value.clone())),
                Some(_) => {}
            }
        }

        let mut map = self.inner.write().map_err(|_| Self::poisoned())?;
        if map.get(key).is_some_and(|(_, expires_at)| *expires_at <= now) {
            map.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let mut map = self.inner.write().map_err(|_| Self::poisoned())?;
        map.insert(key.to_string(), (value, Instant::now() + ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut map = self.inner.write().map_err(|_| Self::poisoned())?;
        map.remove(key);
        Ok(())
    }
}

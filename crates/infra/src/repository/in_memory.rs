use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use catalog_core::PageRequest;
use catalog_products::{PartialUpdate, Product, ProductFilter, ProductId};

use super::{ProductRepository, RepositoryError};

#[derive(Debug, Default)]
struct State {
    last_id: i64,
    rows: BTreeMap<ProductId, Product>,
}

/// In-memory product store for tests/dev.
///
/// Ids come from a counter bumped under the write lock, so concurrent creates never
/// collide and ids are never reused.
#[derive(Debug, Default)]
pub struct InMemoryProductRepository {
    inner: RwLock<State>,
    offline: AtomicBool,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an unreachable store: every call fails with a storage error.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<(), RepositoryError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(RepositoryError::Storage("store offline".to_string()));
        }
        Ok(())
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, State>, RepositoryError> {
        self.check_online()?;
        self.inner
            .read()
            .map_err(|_| RepositoryError::Storage("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, State>, RepositoryError> {
        self.check_online()?;
        self.inner
            .write()
            .map_err(|_| RepositoryError::Storage("lock poisoned".to_string()))
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, mut product: Product) -> Result<Product, RepositoryError> {
        let mut state = self.write()?;
        state.last_id += 1;
        product.id = ProductId(state.last_id);
        product.before_create(Utc::now());
        state.rows.insert(product.id, product.clone());
        Ok(product)
    }

    async fn find_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let state = self.read()?;
        Ok(state.rows.values().cloned().collect())
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Product, RepositoryError> {
        let state = self.read()?;
        state.rows.get(&id).cloned().ok_or(RepositoryError::NotFound)
    }

    async fn update(&self, id: ProductId, mut product: Product) -> Result<Product, RepositoryError> {
        let mut state = self.write()?;
        let existing = state.rows.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        product.id = id;
        product.created_at = existing.created_at;
        product.before_update(Utc::now());
        *existing = product.clone();
        Ok(product)
    }

    async fn patch(&self, id: ProductId, update: &PartialUpdate) -> Result<Product, RepositoryError> {
        let mut state = self.write()?;
        let existing = state.rows.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        update.apply_to(existing);
        existing.before_update(Utc::now());
        Ok(existing.clone())
    }

    async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let mut state = self.write()?;
        state
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    async fn count(&self, filter: &ProductFilter) -> Result<u64, RepositoryError> {
        let state = self.read()?;
        Ok(state.rows.values().filter(|p| filter.matches(p)).count() as u64)
    }

    async fn find_page(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<Vec<Product>, RepositoryError> {
        let state = self.read()?;
        Ok(state
            .rows
            .values()
            .filter(|p| filter.matches(p))
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .cloned()
            .collect())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        self.check_online()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(nome: &str, preco: f64) -> Product {
        Product::new(nome, preco, None)
    }

    #[tokio::test]
    async fn create_assigns_increasing_ids_and_timestamps() {
        let repo = InMemoryProductRepository::new();
        let a = repo.create(product("a", 1.0)).await.unwrap();
        let b = repo.create(product("b", 2.0)).await.unwrap();

        assert_eq!(a.id, ProductId(1));
        assert_eq!(b.id, ProductId(2));
        assert!(a.created_at.is_some());
        assert_eq!(a.created_at, a.updated_at);
    }

    #[tokio::test]
    async fn client_supplied_id_is_ignored() {
        let repo = InMemoryProductRepository::new();
        let mut p = product("a", 1.0);
        p.id = ProductId(999);
        let created = repo.create(p).await.unwrap();
        assert_eq!(created.id, ProductId(1));
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let repo = InMemoryProductRepository::new();
        repo.create(product("a", 1.0)).await.unwrap();
        let b = repo.create(product("b", 1.0)).await.unwrap();
        repo.delete(b.id).await.unwrap();
        let c = repo.create(product("c", 1.0)).await.unwrap();
        assert_eq!(c.id, ProductId(3));
    }

    #[tokio::test]
    async fn missing_rows_yield_not_found() {
        let repo = InMemoryProductRepository::new();
        let id = ProductId(42);
        assert_eq!(repo.find_by_id(id).await.unwrap_err(), RepositoryError::NotFound);
        assert_eq!(
            repo.update(id, product("x", 1.0)).await.unwrap_err(),
            RepositoryError::NotFound
        );
        assert_eq!(
            repo.patch(id, &PartialUpdate::new()).await.unwrap_err(),
            RepositoryError::NotFound
        );
        assert_eq!(repo.delete(id).await.unwrap_err(), RepositoryError::NotFound);
    }

    #[tokio::test]
    async fn update_keeps_created_at() {
        let repo = InMemoryProductRepository::new();
        let created = repo.create(product("a", 1.0)).await.unwrap();
        let updated = repo.update(created.id, product("b", 2.0)).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.nome, "b");
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn patch_overwrites_only_present_fields() {
        let repo = InMemoryProductRepository::new();
        let created = repo
            .create(Product::new("Mouse", 10.0, Some("usb".into())))
            .await
            .unwrap();
        let mut upd = PartialUpdate::new();
        upd.set_preco(12.5);

        let patched = repo.patch(created.id, &upd).await.unwrap();
        assert_eq!(patched.nome, "Mouse");
        assert_eq!(patched.preco, 12.5);
        assert_eq!(patched.descricao.as_deref(), Some("usb"));
        assert_eq!(repo.find_by_id(created.id).await.unwrap(), patched);
    }

    #[tokio::test]
    async fn paging_applies_filter_then_window() {
        let repo = InMemoryProductRepository::new();
        for i in 1..=7 {
            repo.create(product(&format!("item {i}"), i as f64)).await.unwrap();
        }
        let filter = ProductFilter {
            preco_min: Some(2.0),
            ..Default::default()
        };

        assert_eq!(repo.count(&filter).await.unwrap(), 6);
        let page = repo
            .find_page(&filter, PageRequest { page: 2, page_size: 4 })
            .await
            .unwrap();
        let ids: Vec<i64> = page.iter().map(|p| p.id.get()).collect();
        assert_eq!(ids, vec![6, 7]);
    }

    #[tokio::test]
    async fn offline_store_fails_every_call() {
        let repo = InMemoryProductRepository::new();
        repo.set_offline(true);
        assert!(matches!(repo.ping().await, Err(RepositoryError::Storage(_))));
        assert!(matches!(repo.find_all().await, Err(RepositoryError::Storage(_))));

        repo.set_offline(false);
        assert!(repo.ping().await.is_ok());
    }
}

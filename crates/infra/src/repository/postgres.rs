//! Postgres-backed product store.
//!
//! Products are kept as JSONB documents keyed by a database identity column:
//!
//! ```text
//! produtos(id BIGINT IDENTITY PRIMARY KEY, doc JSONB)
//! ```
//!
//! Identity comes from the database, so concurrent inserts never share an id. PATCH
//! is a document merge (`doc || $patch`), the equivalent of a `$set`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::Row;
use tracing::instrument;

use catalog_core::PageRequest;
use catalog_products::{PartialUpdate, Product, ProductFilter, ProductId, COLLECTION};

use super::{ProductRepository, RepositoryError};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS produtos (
    id  BIGINT GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY,
    doc JSONB NOT NULL
)
"#;

const FILTER_PREDICATE: &str = r#"
    ($1::text IS NULL OR doc->>'nome' ILIKE $1)
    AND ($2::float8 IS NULL OR (doc->>'preco')::float8 >= $2)
    AND ($3::float8 IS NULL OR (doc->>'preco')::float8 <= $3)
"#;

/// Stored document (everything but the id).
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProductDocument {
    nome: String,
    preco: f64,
    #[serde(default)]
    descricao: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl From<&Product> for ProductDocument {
    fn from(p: &Product) -> Self {
        Self {
            nome: p.nome.clone(),
            preco: p.preco,
            descricao: p.descricao.clone(),
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

impl ProductDocument {
    fn into_product(self, id: i64) -> Product {
        Product {
            id: ProductId(id),
            nome: self.nome,
            preco: self.preco,
            descricao: self.descricao,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

fn storage(e: sqlx::Error) -> RepositoryError {
    match e {
        sqlx::Error::RowNotFound => RepositoryError::NotFound,
        other => RepositoryError::Storage(other.to_string()),
    }
}

fn decode(row: &PgRow) -> Result<Product, RepositoryError> {
    let id: i64 = row
        .try_get("id")
        .map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let Json(doc): Json<ProductDocument> = row
        .try_get("doc")
        .map_err(|e| RepositoryError::Decode(e.to_string()))?;
    Ok(doc.into_product(id))
}

/// `%term%` with LIKE metacharacters escaped.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

/// Postgres product store.
#[derive(Debug, Clone)]
pub struct PostgresProductRepository {
    pool: PgPool,
}

impl PostgresProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect a pool to `database_url`.
    pub async fn connect(database_url: &str) -> Result<Self, RepositoryError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(storage)?;
        Ok(Self::new(pool))
    }

    /// Create the backing table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        sqlx::query(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(storage)?;
        Ok(())
    }
}

#[async_trait]
impl ProductRepository for PostgresProductRepository {
    #[instrument(skip_all, fields(collection = COLLECTION))]
    async fn create(&self, mut product: Product) -> Result<Product, RepositoryError> {
        product.before_create(Utc::now());
        let doc = ProductDocument::from(&product);

        let row = sqlx::query("INSERT INTO produtos (doc) VALUES ($1) RETURNING id, doc")
            .bind(Json(&doc))
            .fetch_one(&self.pool)
            .await
            .map_err(storage)?;
        decode(&row)
    }

    #[instrument(skip_all, fields(collection = COLLECTION))]
    async fn find_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query("SELECT id, doc FROM produtos ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(storage)?;
        rows.iter().map(decode).collect()
    }

    #[instrument(skip(self), fields(collection = COLLECTION))]
    async fn find_by_id(&self, id: ProductId) -> Result<Product, RepositoryError> {
        let row = sqlx::query("SELECT id, doc FROM produtos WHERE id = $1")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?
            .ok_or(RepositoryError::NotFound)?;
        decode(&row)
    }

    #[instrument(skip(self, product), fields(collection = COLLECTION))]
    async fn update(&self, id: ProductId, mut product: Product) -> Result<Product, RepositoryError> {
        product.before_update(Utc::now());
        let doc = ProductDocument::from(&product);

        // Right-hand side of `||` wins: the stored created_at survives the replace.
        let row = sqlx::query(
            r#"
            UPDATE produtos
            SET doc = $2::jsonb || jsonb_build_object('created_at', doc->'created_at')
            WHERE id = $1
            RETURNING id, doc
            "#,
        )
        .bind(id.get())
        .bind(Json(&doc))
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?
        .ok_or(RepositoryError::NotFound)?;
        decode(&row)
    }

    #[instrument(skip(self, update), fields(collection = COLLECTION, fields = update.len()))]
    async fn patch(&self, id: ProductId, update: &PartialUpdate) -> Result<Product, RepositoryError> {
        let mut set = update.to_document();
        set.insert(
            "updated_at".to_string(),
            serde_json::to_value(Utc::now()).map_err(|e| RepositoryError::Storage(e.to_string()))?,
        );

        let row = sqlx::query(
            "UPDATE produtos SET doc = doc || $2::jsonb WHERE id = $1 RETURNING id, doc",
        )
        .bind(id.get())
        .bind(Json(serde_json::Value::Object(set)))
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?
        .ok_or(RepositoryError::NotFound)?;
        decode(&row)
    }

    #[instrument(skip(self), fields(collection = COLLECTION))]
    async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let res = sqlx::query("DELETE FROM produtos WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(storage)?;
        if res.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip_all, fields(collection = COLLECTION))]
    async fn count(&self, filter: &ProductFilter) -> Result<u64, RepositoryError> {
        let sql = format!("SELECT COUNT(*) AS total FROM produtos WHERE {FILTER_PREDICATE}");
        let row = sqlx::query(&sql)
            .bind(filter.nome.as_deref().map(like_pattern))
            .bind(filter.preco_min)
            .bind(filter.preco_max)
            .fetch_one(&self.pool)
            .await
            .map_err(storage)?;
        let total: i64 = row
            .try_get("total")
            .map_err(|e| RepositoryError::Decode(e.to_string()))?;
        Ok(total.max(0) as u64)
    }

    #[instrument(skip_all, fields(collection = COLLECTION, page = page.page, page_size = page.page_size))]
    async fn find_page(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!(
            "SELECT id, doc FROM produtos WHERE {FILTER_PREDICATE} ORDER BY id LIMIT $4 OFFSET $5"
        );
        let rows = sqlx::query(&sql)
            .bind(filter.nome.as_deref().map(like_pattern))
            .bind(filter.preco_min)
            .bind(filter.preco_max)
            .bind(page.limit().min(i64::MAX as u64) as i64)
            .bind(page.offset().min(i64::MAX as u64) as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(storage)?;
        rows.iter().map(decode).collect()
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(storage)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("mouse"), "%mouse%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn document_round_trips_without_id() {
        let mut p = Product::new("Mouse", 99.9, Some("usb".into()));
        p.id = ProductId(3);
        let json = serde_json::to_value(ProductDocument::from(&p)).unwrap();
        assert!(json.get("id").is_none());

        let doc: ProductDocument = serde_json::from_value(json).unwrap();
        assert_eq!(doc.into_product(3), p);
    }

    #[test]
    fn document_tolerates_missing_timestamps() {
        let doc: ProductDocument =
            serde_json::from_value(serde_json::json!({"nome": "a", "preco": 1.0, "created_at": null}))
                .unwrap();
        assert!(doc.created_at.is_none());
        assert!(doc.descricao.is_none());
    }
}

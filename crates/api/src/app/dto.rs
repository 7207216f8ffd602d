use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use catalog_products::{PartialUpdate, Product, ProductFilter};

// -------------------------
// Request DTOs
// -------------------------

/// Body of `POST /api/produtos` and `PUT /api/produtos/{id}`.
///
/// Fields are `Option` so a missing key is reported as a rule violation instead of a
/// decode failure. The wire layer accepts `preco == 0`; the service then rejects it.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CreateProdutoRequest {
    #[validate(
        required(message = "nome é obrigatório"),
        length(min = 1, message = "nome é obrigatório")
    )]
    pub nome: Option<String>,

    #[validate(
        required(message = "preço é obrigatório"),
        range(min = 0.0, message = "preço não pode ser negativo")
    )]
    pub preco: Option<f64>,

    pub descricao: Option<String>,
}

/// Full replacement has the same wire shape as creation.
pub type UpdateProdutoRequest = CreateProdutoRequest;

impl CreateProdutoRequest {
    /// Field-for-field conversion. No id, no timestamps. Call after validation.
    pub fn to_model(self) -> Product {
        Product::new(
            self.nome.unwrap_or_default(),
            self.preco.unwrap_or_default(),
            self.descricao,
        )
    }
}

/// Body of `PATCH /api/produtos/{id}`. Every field is optional.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct PatchProdutoRequest {
    /// Accepted and discarded; the id always comes from the path.
    #[serde(default)]
    pub id: Option<serde_json::Value>,

    #[validate(length(min = 1, message = "nome não pode ser vazio"))]
    pub nome: Option<String>,

    #[validate(range(min = 0.0, message = "preço não pode ser negativo"))]
    pub preco: Option<f64>,

    pub descricao: Option<String>,
}

impl PatchProdutoRequest {
    /// Only the keys present in the body; `id` never makes it through.
    pub fn to_map(&self) -> PartialUpdate {
        let mut update = PartialUpdate::new();
        if let Some(nome) = &self.nome {
            update.set_nome(nome.clone());
        }
        if let Some(preco) = self.preco {
            update.set_preco(preco);
        }
        if let Some(descricao) = &self.descricao {
            update.set_descricao(descricao.clone());
        }
        update
    }
}

/// Query string of `GET /api/produtos`.
#[derive(Debug, Default, Deserialize)]
pub struct ListProdutosQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub nome: Option<String>,
    pub preco_min: Option<f64>,
    pub preco_max: Option<f64>,
}

impl ListProdutosQuery {
    /// Any paging or filter parameter switches the response to the paginated envelope.
    pub fn wants_page(&self) -> bool {
        self.page.is_some()
            || self.page_size.is_some()
            || self.nome.is_some()
            || self.preco_min.is_some()
            || self.preco_max.is_some()
    }

    pub fn filter(&self) -> ProductFilter {
        ProductFilter {
            nome: self.nome.clone(),
            preco_min: self.preco_min,
            preco_max: self.preco_max,
        }
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProdutoResponse {
    pub id: i64,
    pub nome: String,
    pub preco: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descricao: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Product> for ProdutoResponse {
    fn from(p: Product) -> Self {
        Self {
            id: p.id.get(),
            nome: p.nome,
            preco: p.preco,
            descricao: p.descricao,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use catalog_core::{AppError, Entity};

/// Collection (table / key prefix) the products live in.
pub const COLLECTION: &str = "produtos";

/// Product identifier.
///
/// Assigned by the persistence layer; positive once assigned. Values coming from a
/// request path may be anything and are checked with [`ProductId::is_valid`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub i64);

impl ProductId {
    /// Placeholder for entities not yet persisted.
    pub const UNASSIGNED: ProductId = ProductId(0);

    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn get(self) -> i64 {
        self.0
    }

    pub fn is_valid(self) -> bool {
        self.0 > 0
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl core::str::FromStr for ProductId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(ProductId)
            .map_err(|_| AppError::invalid_id())
    }
}

/// Business rule violations raised before anything is persisted.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProductRuleError {
    #[error("nome do produto é obrigatório")]
    NomeObrigatorio,

    #[error("preço deve ser maior que zero")]
    PrecoInvalido,
}

impl ProductRuleError {
    /// Wire field the rule is attached to.
    pub fn field(self) -> &'static str {
        match self {
            ProductRuleError::NomeObrigatorio => "nome",
            ProductRuleError::PrecoInvalido => "preco",
        }
    }
}

impl From<ProductRuleError> for AppError {
    fn from(value: ProductRuleError) -> Self {
        AppError::field(value.field(), value.to_string())
    }
}

pub(crate) fn check_nome(nome: &str) -> Result<(), ProductRuleError> {
    if nome.is_empty() {
        return Err(ProductRuleError::NomeObrigatorio);
    }
    Ok(())
}

pub(crate) fn check_preco(preco: f64) -> Result<(), ProductRuleError> {
    // Written so NaN is rejected too.
    if !(preco > 0.0) {
        return Err(ProductRuleError::PrecoInvalido);
    }
    Ok(())
}

/// Product entity (the stored document).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub nome: String,
    pub preco: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descricao: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    /// New, not-yet-persisted product. Identity and timestamps are left unset.
    pub fn new(nome: impl Into<String>, preco: f64, descricao: Option<String>) -> Self {
        Self {
            id: ProductId::UNASSIGNED,
            nome: nome.into(),
            preco,
            descricao,
            created_at: None,
            updated_at: None,
        }
    }

    /// Create/update rules: name non-empty, price strictly positive.
    ///
    /// Stops at the first violation, name before price.
    pub fn check_rules(&self) -> Result<(), ProductRuleError> {
        check_nome(&self.nome)?;
        check_preco(self.preco)
    }

    /// Lifecycle hook run by stores right before the first insert.
    pub fn before_create(&mut self, now: DateTime<Utc>) {
        self.created_at = Some(now);
        self.updated_at = Some(now);
    }

    /// Lifecycle hook run by stores right before every mutation.
    pub fn before_update(&mut self, now: DateTime<Utc>) {
        self.updated_at = Some(now);
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn cache_key(id: Self::Id) -> String {
        format!("{COLLECTION}:{id}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::ErrorKind;
    use chrono::TimeZone;

    fn test_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn new_product_has_no_identity_or_timestamps() {
        let p = Product::new("Mouse", 99.9, None);
        assert_eq!(p.id, ProductId::UNASSIGNED);
        assert!(!p.id.is_valid());
        assert!(p.created_at.is_none());
        assert!(p.updated_at.is_none());
    }

    #[test]
    fn rules_accept_valid_product() {
        assert_eq!(Product::new("Mouse", 0.01, None).check_rules(), Ok(()));
    }

    #[test]
    fn rules_reject_empty_name_first() {
        let p = Product::new("", -1.0, None);
        assert_eq!(p.check_rules(), Err(ProductRuleError::NomeObrigatorio));
    }

    #[test]
    fn rules_reject_zero_and_negative_price() {
        assert_eq!(
            Product::new("Mouse", 0.0, None).check_rules(),
            Err(ProductRuleError::PrecoInvalido)
        );
        assert_eq!(
            Product::new("Mouse", -5.0, None).check_rules(),
            Err(ProductRuleError::PrecoInvalido)
        );
        assert_eq!(
            Product::new("Mouse", f64::NAN, None).check_rules(),
            Err(ProductRuleError::PrecoInvalido)
        );
    }

    #[test]
    fn rule_error_converts_to_validation_failure_on_its_field() {
        let err: AppError = ProductRuleError::PrecoInvalido.into();
        assert_eq!(err.kind(), ErrorKind::ValidationFailed);
        assert_eq!(err.message(), "preço deve ser maior que zero");
        assert_eq!(err.fields()[0].field, "preco");
    }

    #[test]
    fn lifecycle_hooks_set_timestamps() {
        let mut p = Product::new("Mouse", 10.0, None);
        p.before_create(test_time());
        assert_eq!(p.created_at, Some(test_time()));
        assert_eq!(p.updated_at, Some(test_time()));

        let later = test_time() + chrono::Duration::minutes(5);
        p.before_update(later);
        assert_eq!(p.created_at, Some(test_time()));
        assert_eq!(p.updated_at, Some(later));
    }

    #[test]
    fn id_parsing_rejects_non_numeric() {
        assert_eq!("42".parse::<ProductId>().unwrap(), ProductId(42));
        assert_eq!("-3".parse::<ProductId>().unwrap(), ProductId(-3));
        let err = "abc".parse::<ProductId>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidId);
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let mut p = Product::new("Mouse", 99.9, Some("sem fio".into()));
        p.id = ProductId(7);
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["nome"], "Mouse");
        assert_eq!(json["preco"], 99.9);
        assert_eq!(json["descricao"], "sem fio");
    }

    #[test]
    fn cache_key_is_namespaced() {
        assert_eq!(Product::cache_key(ProductId(5)), "produtos:5");
    }
}

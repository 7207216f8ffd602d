//! Partial-update map for PATCH.
//!
//! Holds only the fields a request explicitly set. Keys are a closed enum, so the
//! identity field can never be part of an update.

use std::collections::BTreeMap;

use serde_json::{Map, Value as JsonValue};

use crate::product::{check_nome, check_preco, Product, ProductRuleError};

/// Product fields that may be patched.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProductField {
    Nome,
    Preco,
    Descricao,
}

impl ProductField {
    /// Wire/document name.
    pub fn as_str(self) -> &'static str {
        match self {
            ProductField::Nome => "nome",
            ProductField::Preco => "preco",
            ProductField::Descricao => "descricao",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
}

impl FieldValue {
    pub fn to_json(&self) -> JsonValue {
        match self {
            FieldValue::Text(s) => JsonValue::String(s.clone()),
            FieldValue::Number(n) => serde_json::json!(n),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialUpdate {
    fields: BTreeMap<ProductField, FieldValue>,
}

impl PartialUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_nome(&mut self, nome: impl Into<String>) -> &mut Self {
        self.fields.insert(ProductField::Nome, FieldValue::Text(nome.into()));
        self
    }

    pub fn set_preco(&mut self, preco: f64) -> &mut Self {
        self.fields.insert(ProductField::Preco, FieldValue::Number(preco));
        self
    }

    pub fn set_descricao(&mut self, descricao: impl Into<String>) -> &mut Self {
        self.fields
            .insert(ProductField::Descricao, FieldValue::Text(descricao.into()));
        self
    }

    pub fn get(&self, field: ProductField) -> Option<&FieldValue> {
        self.fields.get(&field)
    }

    pub fn contains(&self, field: ProductField) -> bool {
        self.fields.contains_key(&field)
    }

    /// Field names present in the update, in a stable order.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.keys().map(|f| f.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn nome(&self) -> Option<&str> {
        match self.fields.get(&ProductField::Nome) {
            Some(FieldValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    pub fn preco(&self) -> Option<f64> {
        match self.fields.get(&ProductField::Preco) {
            Some(FieldValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn descricao(&self) -> Option<&str> {
        match self.fields.get(&ProductField::Descricao) {
            Some(FieldValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    /// Rules only apply to the fields that are present.
    pub fn check_rules(&self) -> Result<(), ProductRuleError> {
        if let Some(nome) = self.nome() {
            check_nome(nome)?;
        }
        if let Some(preco) = self.preco() {
            check_preco(preco)?;
        }
        Ok(())
    }

    /// Overwrite only the present fields of `product`.
    pub fn apply_to(&self, product: &mut Product) {
        if let Some(nome) = self.nome() {
            product.nome = nome.to_string();
        }
        if let Some(preco) = self.preco() {
            product.preco = preco;
        }
        if let Some(descricao) = self.descricao() {
            product.descricao = Some(descricao.to_string());
        }
    }

    /// JSON object of the present fields (a document `$set`).
    pub fn to_document(&self) -> Map<String, JsonValue> {
        self.fields
            .iter()
            .map(|(k, v)| (k.as_str().to_string(), v.to_json()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn only_present_fields_are_kept() {
        let mut upd = PartialUpdate::new();
        upd.set_preco(10.0);
        assert_eq!(upd.keys().collect::<Vec<_>>(), vec!["preco"]);
        assert_eq!(upd.len(), 1);
        assert!(!upd.contains(ProductField::Nome));
    }

    #[test]
    fn document_never_carries_id() {
        let mut upd = PartialUpdate::new();
        upd.set_nome("Mouse").set_preco(1.0).set_descricao("usb");
        let doc = upd.to_document();
        assert!(!doc.contains_key("id"));
        assert_eq!(doc.len(), 3);
    }

    #[test]
    fn rules_apply_only_to_present_fields() {
        assert_eq!(PartialUpdate::new().check_rules(), Ok(()));

        let mut upd = PartialUpdate::new();
        upd.set_nome("");
        assert_eq!(upd.check_rules(), Err(ProductRuleError::NomeObrigatorio));

        let mut upd = PartialUpdate::new();
        upd.set_preco(-1.0);
        assert_eq!(upd.check_rules(), Err(ProductRuleError::PrecoInvalido));

        let mut upd = PartialUpdate::new();
        upd.set_descricao("");
        assert_eq!(upd.check_rules(), Ok(()));
    }

    #[test]
    fn apply_leaves_absent_fields_untouched() {
        let mut product = Product::new("Mouse", 50.0, Some("usb".into()));
        let mut upd = PartialUpdate::new();
        upd.set_preco(45.0);
        upd.apply_to(&mut product);

        assert_eq!(product.nome, "Mouse");
        assert_eq!(product.preco, 45.0);
        assert_eq!(product.descricao.as_deref(), Some("usb"));
    }

    #[test]
    fn document_contains_present_fields_only() {
        let mut upd = PartialUpdate::new();
        upd.set_nome("Teclado").set_descricao("");
        let doc = upd.to_document();
        assert_eq!(doc.len(), 2);
        assert_eq!(doc["nome"], "Teclado");
        assert_eq!(doc["descricao"], "");
        assert!(!doc.contains_key("id"));
    }

    proptest! {
        #[test]
        fn empty_update_is_identity(nome in ".*", preco in any::<f64>()) {
            let original = Product::new(nome, preco, None);
            let mut patched = original.clone();
            PartialUpdate::new().apply_to(&mut patched);
            prop_assert_eq!(format!("{original:?}"), format!("{patched:?}"));
        }
    }
}

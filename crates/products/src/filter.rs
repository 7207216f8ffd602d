use serde::{Deserialize, Serialize};

use crate::product::Product;

/// List filter. Every set criterion must hold (logical AND).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductFilter {
    /// Case-insensitive substring of `nome`.
    pub nome: Option<String>,
    /// Inclusive lower price bound.
    pub preco_min: Option<f64>,
    /// Inclusive upper price bound.
    pub preco_max: Option<f64>,
}

impl ProductFilter {
    /// Drop blank criteria so they don't constrain the query.
    pub fn normalized(self) -> Self {
        Self {
            nome: self
                .nome
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            ..self
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nome.is_none() && self.preco_min.is_none() && self.preco_max.is_none()
    }

    /// In-process evaluation of the predicate (stores without a query language).
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(nome) = &self.nome {
            if !product.nome.to_lowercase().contains(&nome.to_lowercase()) {
                return false;
            }
        }
        if let Some(min) = self.preco_min {
            if product.preco < min {
                return false;
            }
        }
        if let Some(max) = self.preco_max {
            if product.preco > max {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_matches_everything() {
        let f = ProductFilter::default();
        assert!(f.is_empty());
        assert!(f.matches(&Product::new("x", 1.0, None)));
    }

    #[test]
    fn name_match_is_case_insensitive_substring() {
        let f = ProductFilter {
            nome: Some("MOU".into()),
            ..Default::default()
        };
        assert!(f.matches(&Product::new("Mouse Gamer", 1.0, None)));
        assert!(!f.matches(&Product::new("Teclado", 1.0, None)));
    }

    #[test]
    fn price_bounds_are_inclusive() {
        let f = ProductFilter {
            preco_min: Some(10.0),
            preco_max: Some(20.0),
            ..Default::default()
        };
        assert!(f.matches(&Product::new("a", 10.0, None)));
        assert!(f.matches(&Product::new("a", 20.0, None)));
        assert!(!f.matches(&Product::new("a", 9.99, None)));
        assert!(!f.matches(&Product::new("a", 20.01, None)));
    }

    #[test]
    fn blank_name_is_dropped_by_normalize() {
        let f = ProductFilter {
            nome: Some("   ".into()),
            ..Default::default()
        }
        .normalized();
        assert!(f.is_empty());
    }
}

//! Products domain module.
//!
//! The `Product` entity, its business rules, the partial-update map used by PATCH and
//! the list filter predicate. Pure domain logic (no IO, no HTTP, no storage).

pub mod filter;
pub mod patch;
pub mod product;

pub use filter::ProductFilter;
pub use patch::{FieldValue, PartialUpdate, ProductField};
pub use product::{Product, ProductId, ProductRuleError, COLLECTION};

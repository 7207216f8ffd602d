//! `catalog-core`: foundation shared by every layer.
//!
//! Error taxonomy, request validation, pagination and request context. No I/O here.

pub mod context;
pub mod entity;
pub mod error;
pub mod id;
pub mod pagination;
pub mod validation;

pub use context::RequestContext;
pub use entity::Entity;
pub use error::{AppError, AppResult, BoxError, ErrorKind, FieldError};
pub use id::RequestId;
pub use pagination::{Page, PageInfo, PageRequest};

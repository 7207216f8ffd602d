//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: infrastructure wiring (repository, cache, product service)
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: wire DTOs, their validation rules and conversion to domain types
//! - `errors.rs`: uniform error bodies

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use crate::middleware::{self, RequestState};

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs` and the black-box tests).
pub fn build_app(services: Arc<AppServices>) -> Router {
    // No-op when the binary already installed it through `catalog_observability::init`.
    let _ = catalog_observability::metrics::install_prometheus();

    let request_state = RequestState {
        timeout: services.request_timeout,
    };

    Router::new()
        .route("/health", get(routes::system::health))
        .route("/metrics", get(routes::system::metrics))
        .merge(routes::router())
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    request_state,
                    middleware::request_middleware,
                ))
                .layer(Extension(services)),
        )
}

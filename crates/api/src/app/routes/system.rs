use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::Extension,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::json;

use catalog_core::RequestContext;

use crate::app::errors;
use crate::app::services::AppServices;

/// Upper bound for the persistence probe, independent of the request timeout.
const HEALTH_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn health(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
) -> axum::response::Response {
    let probe = RequestContext::with_id(ctx.request_id(), HEALTH_PROBE_TIMEOUT.min(ctx.remaining()));

    match services.products.health_check(&probe).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "message": "API e banco de dados estão funcionando",
            })),
        )
            .into_response(),
        Err(_) => {
            tracing::warn!(request_id = %ctx.request_id(), "health probe failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unhealthy",
                    "message": "Conexão com banco de dados falhou",
                })),
            )
                .into_response()
        }
    }
}

/// Prometheus text exposition of every recorded series.
pub async fn metrics() -> axum::response::Response {
    match catalog_observability::metrics::install_prometheus() {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => errors::json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "metrics_unavailable",
            "métricas indisponíveis",
        ),
    }
}

pub async fn not_found() -> axum::response::Response {
    errors::json_error(StatusCode::NOT_FOUND, "not_found", "rota não encontrada")
}

use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use catalog_core::AppError;

/// Render an [`AppError`] as `{"erro", "codigo", "campos"?}` with the kind's status.
///
/// Only the client-safe message is rendered. Wrapped causes were already logged by the
/// service that produced them and are dropped here.
pub fn error_response(err: AppError) -> axum::response::Response {
    let status = StatusCode::from_u16(err.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let mut body = json!({
        "erro": err.message(),
        "codigo": err.kind().code(),
    });
    if !err.fields().is_empty() {
        body["campos"] = json!(err.fields());
    }

    (status, axum::Json(body)).into_response()
}

/// Handler-facing wrapper so `?` on an [`AppError`] renders through [`error_response`].
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        error_response(self.0)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "erro": message.into(),
            "codigo": code,
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use catalog_core::{ErrorKind, FieldError};
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    /// Counts `ERROR` events emitted while installed.
    struct ErrorEvents(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> Layer<S> for ErrorEvents {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == tracing::Level::ERROR {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    async fn body_json(resp: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn validation_errors_carry_field_list() {
        let resp = error_response(AppError::validation(vec![FieldError::new("preco", "inválido")]));
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body = body_json(resp).await;
        assert_eq!(body["codigo"], "validation_failed");
        assert_eq!(body["campos"][0]["campo"], "preco");
        assert_eq!(body["campos"][0]["mensagem"], "inválido");
    }

    #[tokio::test]
    async fn database_errors_hide_the_cause() {
        let resp = error_response(AppError::database("connection reset by peer"));
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(resp).await;
        assert_eq!(body["erro"], ErrorKind::DatabaseError.default_message());
        assert!(!body.to_string().contains("connection reset"));
        assert!(body.get("campos").is_none());
    }

    #[tokio::test]
    async fn not_found_maps_to_404() {
        let resp = error_response(AppError::not_found());
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(resp).await["erro"], "produto não encontrado");
    }

    #[test]
    fn rendering_does_not_log_the_cause_again() {
        let errors = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(ErrorEvents(errors.clone()));

        tracing::subscriber::with_default(subscriber, || {
            let resp = error_response(AppError::database("connection reset by peer"));
            assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        });

        assert_eq!(errors.load(Ordering::SeqCst), 0);
    }
}

use std::time::{Duration, Instant};

use axum::{
    extract::{MatchedPath, Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use tracing::Instrument;

use catalog_core::{RequestContext, RequestId};
use catalog_observability::metrics;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Debug, Clone, Copy)]
pub struct RequestState {
    pub timeout: Duration,
}

/// Attach a [`RequestContext`] to every request, then log and meter the outcome.
///
/// An incoming `x-request-id` is reused when it parses; otherwise a fresh id is minted.
/// The id is echoed back on the response.
pub async fn request_middleware(
    State(state): State<RequestState>,
    mut req: Request,
    next: Next,
) -> Response {
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<RequestId>().ok())
        .unwrap_or_default();
    req.extensions_mut()
        .insert(RequestContext::with_id(request_id, state.timeout));

    let method = req.method().clone();
    // Route template, not the raw URI, to keep metric labels bounded.
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        path = %path
    );

    let active = metrics::track_active_request();
    let started = Instant::now();
    let mut response = next.run(req).instrument(span.clone()).await;
    let elapsed = started.elapsed();
    drop(active);
    let status = response.status().as_u16();

    span.in_scope(|| {
        if status >= 500 {
            tracing::warn!(status, latency_ms = elapsed.as_millis() as u64, "request failed");
        } else {
            tracing::info!(status, latency_ms = elapsed.as_millis() as u64, "request completed");
        }
    });
    metrics::record_http_request(method.as_str(), &path, status, elapsed);

    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

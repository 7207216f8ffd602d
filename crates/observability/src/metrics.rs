//! Request and database metrics.
//!
//! Recorded through the `metrics` facade and exported in the Prometheus text format
//! once [`install_prometheus`] has run.

use std::sync::OnceLock;
use std::time::Duration;

use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};

pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";
pub const HTTP_REQUEST_ERRORS_TOTAL: &str = "http_request_errors_total";
pub const DATABASE_OPERATIONS_TOTAL: &str = "database_operations_total";
pub const DATABASE_OPERATION_DURATION_SECONDS: &str = "database_operation_duration_seconds";
pub const HTTP_ACTIVE_CONNECTIONS: &str = "http_active_connections";

const HTTP_DURATION_BUCKETS: &[f64] = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];
const DATABASE_DURATION_BUCKETS: &[f64] =
    &[0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

static PROMETHEUS: OnceLock<Option<PrometheusHandle>> = OnceLock::new();

/// Install the process-wide Prometheus recorder and return its handle.
///
/// Only the first call installs; later calls return the same handle. `None` means
/// another recorder was already installed, in which case nothing is exported.
pub fn install_prometheus() -> Option<PrometheusHandle> {
    PROMETHEUS
        .get_or_init(|| match build_prometheus() {
            Ok(handle) => Some(handle),
            Err(err) => {
                tracing::warn!(error = %err, "prometheus recorder not installed");
                None
            }
        })
        .clone()
}

fn build_prometheus() -> Result<PrometheusHandle, metrics_exporter_prometheus::BuildError> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(HTTP_REQUEST_DURATION_SECONDS.to_string()),
            HTTP_DURATION_BUCKETS,
        )?
        .set_buckets_for_metric(
            Matcher::Full(DATABASE_OPERATION_DURATION_SECONDS.to_string()),
            DATABASE_DURATION_BUCKETS,
        )?
        .install_recorder()
}

/// Counts one in-flight request in `http_active_connections` until dropped.
#[must_use]
pub struct ActiveRequest(());

pub fn track_active_request() -> ActiveRequest {
    ::metrics::gauge!(HTTP_ACTIVE_CONNECTIONS).increment(1.0);
    ActiveRequest(())
}

impl Drop for ActiveRequest {
    fn drop(&mut self) {
        ::metrics::gauge!(HTTP_ACTIVE_CONNECTIONS).decrement(1.0);
    }
}

/// Record one finished HTTP request. Statuses >= 400 also count as errors.
pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    let method = method.to_string();
    let path = path.to_string();
    let status_label = status.to_string();

    ::metrics::counter!(
        HTTP_REQUESTS_TOTAL,
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => status_label.clone()
    )
    .increment(1);

    ::metrics::histogram!(
        HTTP_REQUEST_DURATION_SECONDS,
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => status_label.clone()
    )
    .record(duration.as_secs_f64());

    if status >= 400 {
        ::metrics::counter!(
            HTTP_REQUEST_ERRORS_TOTAL,
            "method" => method,
            "path" => path,
            "status" => status_label
        )
        .increment(1);
    }
}

/// Record one persistence call. `status` is `"success"`, `"not_found"` or `"error"`.
pub fn record_database_operation(operation: &str, collection: &str, status: &str, duration: Duration) {
    ::metrics::counter!(
        DATABASE_OPERATIONS_TOTAL,
        "operation" => operation.to_string(),
        "collection" => collection.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    ::metrics::histogram!(
        DATABASE_OPERATION_DURATION_SECONDS,
        "operation" => operation.to_string(),
        "collection" => collection.to_string()
    )
    .record(duration.as_secs_f64());
}

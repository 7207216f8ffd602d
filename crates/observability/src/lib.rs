//! Logging and metrics shared by the binary and the service layer.

/// Install the process-wide tracing subscriber (`RUST_LOG`, `LOG_FORMAT`) and the
/// Prometheus recorder.
///
/// Subsequent calls are no-ops.
pub fn init() {
    tracing::init();
    let _ = metrics::install_prometheus();
}

pub mod tracing;

/// Metric names and recording helpers.
pub mod metrics;

pub use self::tracing::LogFormat;

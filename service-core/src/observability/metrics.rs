//! Metrics collection and Prometheus export.
//!
//! Installs the global recorder and renders the /metrics payload.

use crate::error::AppError;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

/// Global handle to the Prometheus recorder. `None` records a failed install.
static METRICS_HANDLE: OnceLock<Option<PrometheusHandle>> = OnceLock::new();

/// Initialize the metrics recorder.
///
/// Only the first call installs a recorder; later calls report its outcome,
/// so test binaries that build several applications can call it freely.
pub fn init_metrics() -> Result<(), AppError> {
    let handle = METRICS_HANDLE.get_or_init(|| match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            tracing::error!("Failed to install Prometheus recorder: {}", e);
            None
        }
    });

    match handle {
        Some(_) => Ok(()),
        None => Err(AppError::InternalError(anyhow::anyhow!(
            "Prometheus recorder is not installed"
        ))),
    }
}

/// Get the current metrics in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .and_then(Option::as_ref)
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized".to_string())
}

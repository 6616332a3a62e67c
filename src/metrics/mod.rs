//! Phase-organised metrics for the merge pipeline
//!
//! Each phase owns its metric names in a dedicated submodule. Everything is
//! recorded through the `metrics` facade into an in-process Prometheus
//! recorder; the binary renders a snapshot into the log when the run ends.

pub mod core;
pub mod ingestion;
pub mod query;
pub mod registry;

pub use ingestion::IngestionMetrics;
pub use query::QueryMetrics;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::{Once, OnceLock};
use tracing::{info, warn};

static INIT: Once = Once::new();
static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder and register every phase's metrics.
///
/// Idempotent. No HTTP listener is started; read the values with
/// [`render_snapshot`]. If another recorder is already installed the
/// metrics stay registered but no snapshot is available.
pub fn init_metrics() {
    INIT.call_once(|| {
        match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                if HANDLE.set(handle).is_err() {
                    warn!("Metrics handle was already set");
                }
                info!("Prometheus recorder installed");
            }
            Err(e) => warn!("Failed to install Prometheus recorder: {}", e),
        }
        registry::register_all_metrics();
    });
}

/// Prometheus text exposition of everything recorded so far
pub fn render_snapshot() -> Option<String> {
    HANDLE.get().map(|handle| handle.render())
}

/// Trait for phase-specific metrics collections
///
/// Each pipeline phase implements this trait to provide:
/// - Metric registration at startup
/// - Consistent naming conventions
/// - Documentation of what each metric measures
pub trait PhaseMetrics {
    /// Register all metrics for this phase
    fn register_metrics();

    /// Get the phase name for prefixing metrics
    fn phase_name() -> &'static str;

    /// Get documentation for all metrics in this phase
    fn metrics_documentation() -> Vec<MetricDoc>;
}

/// Documentation for a single metric
#[derive(Debug, Clone)]
pub struct MetricDoc {
    pub name: &'static str,
    pub metric_type: MetricType,
    pub help: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricType {
    Counter,
    Histogram,
    Gauge,
}

/// Build a metric name following the convention
/// guild_overlap_{phase}_{metric_name}[_total]
macro_rules! phase_metric {
    (counter, $phase:literal, $name:literal) => {
        concat!("guild_overlap_", $phase, "_", $name, "_total")
    };
    (histogram, $phase:literal, $name:literal) => {
        concat!("guild_overlap_", $phase, "_", $name)
    };
    (gauge, $phase:literal, $name:literal) => {
        concat!("guild_overlap_", $phase, "_", $name)
    };
}

pub(crate) use phase_metric;

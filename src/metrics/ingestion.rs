//! Ingestion Phase Metrics
//!
//! Discovery results, per-file ingestion outcomes and row volumes.

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

/// Metrics collection for discovery and ingestion
pub struct IngestionMetrics;

impl IngestionMetrics {
    pub fn record_files_discovered(count: usize) {
        ::metrics::gauge!(phase_metric!(gauge, "ingestion", "files_discovered"))
            .set(count as f64);
    }

    /// Record a source file whose rows were merged
    pub fn record_file_ingested(rows: usize) {
        ::metrics::counter!(phase_metric!(counter, "ingestion", "files_ingested")).increment(1);
        ::metrics::counter!(phase_metric!(counter, "ingestion", "rows_merged"))
            .increment(rows as u64);
        ::metrics::histogram!(phase_metric!(histogram, "ingestion", "rows_per_file"))
            .record(rows as f64);
    }

    /// Record a source file that was skipped
    pub fn record_file_failed() {
        ::metrics::counter!(phase_metric!(counter, "ingestion", "files_failed")).increment(1);
    }

    pub fn duration_histogram() -> &'static str {
        phase_metric!(histogram, "ingestion", "duration_seconds")
    }
}

impl PhaseMetrics for IngestionMetrics {
    fn register_metrics() {
        use metrics::{counter, gauge, histogram};

        let _ = gauge!(phase_metric!(gauge, "ingestion", "files_discovered"));
        let _ = counter!(phase_metric!(counter, "ingestion", "files_ingested"));
        let _ = counter!(phase_metric!(counter, "ingestion", "files_failed"));
        let _ = counter!(phase_metric!(counter, "ingestion", "rows_merged"));
        let _ = histogram!(phase_metric!(histogram, "ingestion", "rows_per_file"));
        let _ = histogram!(phase_metric!(histogram, "ingestion", "duration_seconds"));
    }

    fn phase_name() -> &'static str {
        "ingestion"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(gauge, "ingestion", "files_discovered"),
                metric_type: MetricType::Gauge,
                help: "Number of source files found by discovery in the last run",
            },
            MetricDoc {
                name: phase_metric!(counter, "ingestion", "files_ingested"),
                metric_type: MetricType::Counter,
                help: "Source files whose rows were merged",
            },
            MetricDoc {
                name: phase_metric!(counter, "ingestion", "files_failed"),
                metric_type: MetricType::Counter,
                help: "Source files skipped because they could not be opened or read",
            },
            MetricDoc {
                name: phase_metric!(counter, "ingestion", "rows_merged"),
                metric_type: MetricType::Counter,
                help: "Rows appended to the consolidated store",
            },
            MetricDoc {
                name: phase_metric!(histogram, "ingestion", "rows_per_file"),
                metric_type: MetricType::Histogram,
                help: "Rows read from each successfully ingested source file",
            },
            MetricDoc {
                name: phase_metric!(histogram, "ingestion", "duration_seconds"),
                metric_type: MetricType::Histogram,
                help: "Wall time of one full ingestion pass",
            },
        ]
    }
}

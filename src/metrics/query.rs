//! Query Phase Metrics
//!
//! Catalog size, overlap size and query failures.

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

pub struct QueryMetrics;

impl QueryMetrics {
    pub fn record_catalog_size(guilds: usize) {
        ::metrics::gauge!(phase_metric!(gauge, "query", "catalog_guilds")).set(guilds as f64);
    }

    pub fn record_common_users(users: usize) {
        ::metrics::gauge!(phase_metric!(gauge, "query", "common_users")).set(users as f64);
    }

    /// `query` is either "catalog" or "overlap"
    pub fn record_query_error(query: &'static str) {
        ::metrics::counter!(phase_metric!(counter, "query", "errors"), "query" => query)
            .increment(1);
    }
}

impl PhaseMetrics for QueryMetrics {
    fn register_metrics() {
        use metrics::{counter, gauge};

        let _ = gauge!(phase_metric!(gauge, "query", "catalog_guilds"));
        let _ = gauge!(phase_metric!(gauge, "query", "common_users"));
        let _ = counter!(phase_metric!(counter, "query", "errors"));
    }

    fn phase_name() -> &'static str {
        "query"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(gauge, "query", "catalog_guilds"),
                metric_type: MetricType::Gauge,
                help: "Distinct (guildId, guildName) pairs in the consolidated store",
            },
            MetricDoc {
                name: phase_metric!(gauge, "query", "common_users"),
                metric_type: MetricType::Gauge,
                help: "Users found in both compared guilds",
            },
            MetricDoc {
                name: phase_metric!(counter, "query", "errors"),
                metric_type: MetricType::Counter,
                help: "Catalog or overlap queries that failed and returned an empty result",
            },
        ]
    }
}

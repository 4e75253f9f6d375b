//! Metrics and observability utilities
//!
//! Prometheus metrics with standardized naming. The exporter itself is
//! installed by the binary; this module only describes and records.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all FoodEvents metrics
pub const METRICS_PREFIX: &str = "foodevents";

/// Buckets for upstream call latency (openFDA and the generation service)
pub const UPSTREAM_BUCKETS: &[f64] = &[
    0.050,  // 50ms
    0.100,  // 100ms
    0.250,  // 250ms
    0.500,  // 500ms
    1.000,  // 1s
    2.000,  // 2s
    5.000,  // 5s
    10.00,  // 10s - openFDA timeout
    30.00,  // 30s - generation timeout
];

/// Register all metric descriptions
pub fn register_metrics() {
    // Query metrics
    describe_counter!(
        format!("{}_queries_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of adverse-event queries by outcome"
    );

    describe_histogram!(
        format!("{}_query_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "End-to-end query pipeline latency in seconds"
    );

    // openFDA metrics
    describe_counter!(
        format!("{}_openfda_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total openFDA requests by outcome"
    );

    describe_histogram!(
        format!("{}_openfda_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "openFDA request latency in seconds"
    );

    // Generation metrics
    describe_counter!(
        format!("{}_llm_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total generation requests by status"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record query pipeline metrics
pub struct QueryMetrics {
    start: Instant,
}

impl QueryMetrics {
    /// Start tracking a query
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Record query completion with its outcome ("ok" or "error")
    pub fn finish(self, status: &str) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_queries_total", METRICS_PREFIX),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(format!("{}_query_duration_seconds", METRICS_PREFIX)).record(duration);
    }
}

/// Helper to record openFDA metrics
pub fn record_openfda(duration_secs: f64, outcome: &str) {
    counter!(
        format!("{}_openfda_requests_total", METRICS_PREFIX),
        "outcome" => outcome.to_string()
    )
    .increment(1);

    histogram!(format!("{}_openfda_duration_seconds", METRICS_PREFIX)).record(duration_secs);
}

/// Helper to record generation metrics
pub fn record_llm(status: &str) {
    counter!(
        format!("{}_llm_requests_total", METRICS_PREFIX),
        "status" => status.to_string()
    )
    .increment(1);
}

// Metrics and observability module
// This file handles collection and reporting of upstream call latency
// and per-strategy run timings
//
// Numan Thabit 2025 Nov

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec, TextEncoder,
};

pub static REQ_LATENCY: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "swap_request_latency_seconds",
        "latency for upstream calls",
        &["service", "method"]
    )
    .unwrap()
});

pub static REQ_ERRORS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "swap_request_errors_total",
        "errors by upstream",
        &["service", "method"]
    )
    .unwrap()
});

pub static STRATEGY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "swap_strategy_window_seconds",
        "measured timing window per strategy",
        &["strategy"],
        vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]
    )
    .unwrap()
});

pub static STRATEGY_RUNS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "swap_strategy_runs_total",
        "strategy runs by outcome",
        &["strategy", "outcome"]
    )
    .unwrap()
});

pub static LANDED_FAILURES: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "swap_landed_failures_total",
        "submitted transactions whose effects report a failed execution",
        &["endpoint"]
    )
    .unwrap()
});

/// Render the default registry in the Prometheus text format.
pub fn render() -> String {
    let families = prometheus::gather();
    let mut buf = Vec::new();
    if TextEncoder::new().encode(&families, &mut buf).is_err() {
        return String::new();
    }
    String::from_utf8(buf).unwrap_or_default()
}

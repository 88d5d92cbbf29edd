//! Prometheus metrics (default registry) shared by the service and server crates.

use axum::http::StatusCode;
use once_cell::sync::Lazy;
use prometheus::{register_int_counter, Encoder, IntCounter, TextEncoder};

pub static RESORTS_CREATED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "ski_resorts_created_total",
        "Total resorts created and persisted"
    )
    .expect("register resorts_created_total")
});

pub static RESORTS_DELETED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "ski_resorts_deleted_total",
        "Total resorts removed from the store"
    )
    .expect("register resorts_deleted_total")
});

pub static RESORTS_REJECTED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "ski_resorts_rejected_total",
        "Total create requests rejected by validation or name conflict"
    )
    .expect("register resorts_rejected_total")
});

pub static WEATHER_REQUESTS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "weather_requests_total",
        "Total forecast lookups forwarded to the weather upstream"
    )
    .expect("register weather_requests_total")
});

pub static WEATHER_UPSTREAM_FAILURES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "weather_upstream_failures_total",
        "Total forecast lookups that produced no data"
    )
    .expect("register weather_upstream_failures_total")
});

/// Render every registered metric in the Prometheus text format.
pub fn encode_metrics() -> (StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("metrics encode error: {e}"),
        );
    }
    (StatusCode::OK, String::from_utf8(buffer).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_metrics_include_touched_counters() {
        RESORTS_CREATED_TOTAL.inc_by(0);
        WEATHER_UPSTREAM_FAILURES_TOTAL.inc();

        let (status, body) = encode_metrics();
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("ski_resorts_created_total"));
        assert!(body.contains("weather_upstream_failures_total"));
    }
}

use std::time::Instant;

use axum::{extract::Request, http::StatusCode, middleware::Next, response::Response};
use once_cell::sync::Lazy;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
    TextEncoder,
};

// Prometheus metrics (default registry)
pub static HTTP_REQUESTS_TOTAL: Lazy<Option<IntCounterVec>> = Lazy::new(|| {
    register_int_counter_vec!(
        "school_registry_http_requests_total",
        "Total HTTP requests handled",
        &["method", "status"]
    )
    .ok()
});

pub static HTTP_REQUEST_DURATION: Lazy<Option<HistogramVec>> = Lazy::new(|| {
    register_histogram_vec!(
        "school_registry_http_request_duration_seconds",
        "HTTP request duration in seconds",
        &["method"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
    )
    .ok()
});

/// Record one finished request.
pub fn observe_request(method: &str, status: u16, elapsed_secs: f64) {
    if let Some(c) = HTTP_REQUESTS_TOTAL.as_ref() {
        c.with_label_values(&[method, &status.to_string()]).inc();
    }
    if let Some(h) = HTTP_REQUEST_DURATION.as_ref() {
        h.with_label_values(&[method]).observe(elapsed_secs);
    }
}

/// axum middleware counting requests and timing them.
pub async fn track_http(req: Request, next: Next) -> Response {
    let method = req.method().as_str().to_owned();
    let start = Instant::now();
    let res = next.run(req).await;
    observe_request(&method, res.status().as_u16(), start.elapsed().as_secs_f64());
    res
}

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

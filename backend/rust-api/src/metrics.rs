use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, Encoder,
    HistogramVec, IntCounter, IntCounterVec, TextEncoder,
};

lazy_static! {
    // HTTP Metrics
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "http_requests_total",
        "Total number of HTTP requests",
        &["method", "path", "status"]
    )
    .unwrap();

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds",
        &["method", "path"],
        vec![0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    )
    .unwrap();

    // Game Metrics
    pub static ref CONFIGURATIONS_CREATED_TOTAL: IntCounter = register_int_counter!(
        "configurations_created_total",
        "Total number of game configurations stored"
    )
    .unwrap();

    pub static ref SESSIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "sessions_total",
        "Total number of game sessions created",
        &["origin"]
    )
    .unwrap();

    pub static ref SESSIONS_COMPLETED_TOTAL: IntCounter = register_int_counter!(
        "sessions_completed_total",
        "Total number of game sessions marked completed"
    )
    .unwrap();

    pub static ref ATTEMPTS_RECORDED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "attempts_recorded_total",
        "Total number of attempts recorded",
        &["success"]
    )
    .unwrap();

    pub static ref PROGRESS_UPSERTS_TOTAL: IntCounter = register_int_counter!(
        "progress_upserts_total",
        "Total number of explicit progress upserts"
    )
    .unwrap();
}

/// Renders all metrics in Prometheus text format
pub fn render_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|e| prometheus::Error::Msg(format!("Failed to convert metrics to UTF-8: {}", e)))
}

/// Count a recorded attempt by outcome
pub fn record_attempt(success: bool) {
    let label = if success { "true" } else { "false" };
    ATTEMPTS_RECORDED_TOTAL.with_label_values(&[label]).inc();
}

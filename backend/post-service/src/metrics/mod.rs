//! Prometheus metrics for post-service.
//!
//! Exposes post write/rejection counters, feed latency, and an HTTP handler
//! for the `/metrics` endpoint.

use actix_web::HttpResponse;
use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
    TextEncoder,
};
use std::time::Duration;

lazy_static! {
    /// Posts written, by kind (post, repost).
    pub static ref POSTS_CREATED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "posts_created_total",
        "Total posts written segmented by kind",
        &["kind"]
    )
    .expect("failed to register posts_created_total");

    /// Rejected writes, by rule.
    pub static ref POST_REJECTIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "post_rejections_total",
        "Total rejected post writes segmented by reason",
        &["reason"]
    )
    .expect("failed to register post_rejections_total");

    /// Feed listing latency by sort mode.
    pub static ref FEED_LIST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "feed_list_duration_seconds",
        "Feed list duration segmented by sort mode",
        &["sort"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]
    )
    .expect("failed to register feed_list_duration_seconds");
}

pub fn record_post_created(kind: &str) {
    POSTS_CREATED_TOTAL.with_label_values(&[kind]).inc();
}

pub fn record_rejection(reason: &str) {
    POST_REJECTIONS_TOTAL.with_label_values(&[reason]).inc();
}

pub fn record_feed_duration(sort: &str, duration: Duration) {
    FEED_LIST_DURATION_SECONDS
        .with_label_values(&[sort])
        .observe(duration.as_secs_f64());
}

/// Actix handler that renders Prometheus metrics in text format.
pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}

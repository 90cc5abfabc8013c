//! Prometheus metrics collection for confdesk.
//!
//! Exposed on `/metrics` when `server.metrics` is enabled. Recording helpers
//! are no-ops until [`init`] has run, so handlers and tests never need to
//! care whether metrics are switched on.
//!
//! - `confdesk_http_requests_total{route,status}` - Requests by matched route
//! - `confdesk_http_request_duration_seconds{route}` - Request latency
//! - `confdesk_upstream_failures_total{service}` - Failed hosted-service calls
//! - `confdesk_webhook_events_total{kind}` - Inbound LINE events by type
//! - `confdesk_notifications_total{kind}` - Notifications pushed by type
//! - `confdesk_magic_links_total` - Magic links issued by the login bridge
//! - `confdesk_extracted_text_chars` - Characters extracted per analysed PDF

use prometheus::{
    Encoder, Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry,
    TextEncoder,
};
use std::sync::OnceLock;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

// ========================================================================
// Counters
// ========================================================================

/// Requests served, by matched route and status code.
pub static HTTP_REQUESTS: OnceLock<IntCounterVec> = OnceLock::new();

/// Hosted-service calls that failed, by service.
pub static UPSTREAM_FAILURES: OnceLock<IntCounterVec> = OnceLock::new();

/// Inbound webhook events, by event type.
pub static WEBHOOK_EVENTS: OnceLock<IntCounterVec> = OnceLock::new();

/// Notifications delivered to the push API, by notification type.
pub static NOTIFICATIONS: OnceLock<IntCounterVec> = OnceLock::new();

/// Magic links issued by the login bridge.
pub static MAGIC_LINKS: OnceLock<IntCounter> = OnceLock::new();

// ========================================================================
// Histograms
// ========================================================================

/// Request latency by matched route.
pub static HTTP_LATENCY: OnceLock<HistogramVec> = OnceLock::new();

/// Characters extracted per analysed PDF.
pub static EXTRACTED_TEXT_CHARS: OnceLock<Histogram> = OnceLock::new();

/// Initialize the Prometheus metrics registry.
///
/// Must be called once at startup before any metrics are recorded.
pub fn init() {
    let r = registry();

    // Helper macro to register metric
    macro_rules! register {
        ($metric:ident, $init:expr) => {
            match $init {
                Ok(m) => {
                    if let Err(e) = r.register(Box::new(m.clone())) {
                        tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
                    }
                    let _ = $metric.set(m);
                }
                Err(e) => {
                    tracing::error!(error = %e, concat!("Failed to create metric ", stringify!($metric)));
                }
            }
        };
    }

    register!(HTTP_REQUESTS, IntCounterVec::new(Opts::new("confdesk_http_requests_total", "HTTP requests by route and status"), &["route", "status"]));
    register!(UPSTREAM_FAILURES, IntCounterVec::new(Opts::new("confdesk_upstream_failures_total", "Failed hosted-service calls"), &["service"]));
    register!(WEBHOOK_EVENTS, IntCounterVec::new(Opts::new("confdesk_webhook_events_total", "Inbound LINE webhook events"), &["kind"]));
    register!(NOTIFICATIONS, IntCounterVec::new(Opts::new("confdesk_notifications_total", "Notifications pushed"), &["kind"]));
    register!(MAGIC_LINKS, IntCounter::new("confdesk_magic_links_total", "Magic links issued"));

    register!(HTTP_LATENCY, HistogramVec::new(
        HistogramOpts::new("confdesk_http_request_duration_seconds", "HTTP request latency by route")
            .buckets(vec![0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["route"]));
    register!(EXTRACTED_TEXT_CHARS, Histogram::with_opts(
        HistogramOpts::new("confdesk_extracted_text_chars", "Characters extracted per analysed PDF")
            .buckets(vec![50.0, 500.0, 2000.0, 8000.0, 20000.0, 50000.0, 200000.0])));
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

// ============================================================================
// Helper functions for metric updates
// ============================================================================

/// Record a served request with its latency.
#[inline]
pub fn record_request(route: &str, status: u16, duration_secs: f64) {
    if let Some(c) = HTTP_REQUESTS.get() {
        c.with_label_values(&[route, &status.to_string()]).inc();
    }
    if let Some(h) = HTTP_LATENCY.get() {
        h.with_label_values(&[route]).observe(duration_secs);
    }
}

/// Record a failed hosted-service call.
#[inline]
pub fn record_upstream_failure(service: &str) {
    if let Some(c) = UPSTREAM_FAILURES.get() {
        c.with_label_values(&[service]).inc();
    }
}

/// Record an inbound webhook event.
#[inline]
pub fn record_webhook_event(kind: &str) {
    if let Some(c) = WEBHOOK_EVENTS.get() {
        c.with_label_values(&[kind]).inc();
    }
}

/// Record a delivered notification.
#[inline]
pub fn record_notification(kind: &str) {
    if let Some(c) = NOTIFICATIONS.get() {
        c.with_label_values(&[kind]).inc();
    }
}

/// Record an issued magic link.
#[inline]
pub fn record_magic_link() {
    if let Some(c) = MAGIC_LINKS.get() {
        c.inc();
    }
}

/// Record how much text a PDF yielded.
#[inline]
pub fn record_extracted_chars(chars: usize) {
    if let Some(h) = EXTRACTED_TEXT_CHARS.get() {
        h.observe(chars as f64);
    }
}

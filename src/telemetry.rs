//! Telemetry utilities for request timing and handler spans.

use std::time::Instant;

/// Guard for timing a request and recording metrics.
///
/// Records latency and status when dropped. The status defaults to 500 so a
/// request whose future is dropped mid-flight is still counted.
pub struct RequestTimer {
    route: String,
    status: u16,
    start: Instant,
}

impl RequestTimer {
    /// Start timing a request on a matched route.
    pub fn new(route: impl Into<String>) -> Self {
        Self {
            route: route.into(),
            status: 500,
            start: Instant::now(),
        }
    }

    /// Set the status recorded on drop.
    pub fn finish(&mut self, status: u16) {
        self.status = status;
    }
}

impl Drop for RequestTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        crate::metrics::record_request(&self.route, self.status, duration);
    }
}

/// Short random id correlating the log lines of one request.
pub fn request_id() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    id[..12].to_string()
}

/// Standardized span constructors for handler observability.
pub mod spans {
    use tracing::{Span, info_span};

    /// Span for one PDF analysis.
    pub fn analysis(request_id: &str) -> Span {
        info_span!("analysis", request_id = %request_id)
    }

    /// Span for one login bridging attempt.
    pub fn login(request_id: &str) -> Span {
        info_span!("line_login", request_id = %request_id)
    }

    /// Span for one webhook delivery.
    pub fn webhook(request_id: &str, events: usize) -> Span {
        info_span!("webhook", request_id = %request_id, events = events)
    }

    /// Span for one notification.
    pub fn notification(participant: &str, kind: &str) -> Span {
        info_span!("notify", participant = %participant, kind = %kind)
    }
}

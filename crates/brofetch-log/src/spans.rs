//! Span helpers for request tracing.

use std::time::Instant;
use tracing::{Level, Span};

/// Span covering one user-facing request, including its redirects and retries.
pub fn request_span(method: &str, url: &str) -> Span {
    tracing::span!(
        Level::INFO,
        "request",
        method = %method,
        url = %url,
        hops = tracing::field::Empty,
        status = tracing::field::Empty,
    )
}

/// Record the outcome of a request on its span.
pub fn record_outcome(span: &Span, hops: usize, status: u16) {
    span.record("hops", hops);
    span.record("status", status);
}

/// Record an error on the current span.
pub fn record_error<E: std::fmt::Display>(error: &E) {
    tracing::error!(error = %error, "operation failed");
}

/// Measures elapsed time and logs it on completion.
pub struct Timer {
    name: &'static str,
    start: Instant,
}

impl Timer {
    pub fn start(name: &'static str) -> Self {
        Self {
            name,
            start: Instant::now(),
        }
    }

    /// Milliseconds since the timer started.
    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    /// Log the elapsed time and return it in milliseconds.
    pub fn finish(self) -> u64 {
        let duration_ms = self.elapsed_ms();
        tracing::debug!(operation = self.name, duration_ms, "completed");
        duration_ms
    }
}

pub use tracing::Instrument;

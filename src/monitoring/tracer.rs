/*!
 * Tracing
 * Structured logging setup and timing spans for listener notification
 *
 * Features:
 * - Env-filtered output, compact or JSON
 * - Slow listener detection on every notification round
 */

use std::time::{Duration, Instant};
use tracing::{debug, info, span, warn, Level, Span};
use tracing_subscriber::{fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Notification rounds slower than this are reported at warn level
pub const SLOW_NOTIFY_THRESHOLD: Duration = Duration::from_millis(10);

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - CLIPBOARD_TRACE_JSON: Enable JSON output (default: false)
///
/// Returns `false` when a global subscriber was already installed.
pub fn init_tracing() -> bool {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var("CLIPBOARD_TRACE_JSON")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()
            .is_ok()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_line_number(true)
                    .with_file(true)
                    .compact(),
            )
            .try_init()
            .is_ok()
    };

    if installed {
        info!(json = use_json, "Structured tracing initialized");
    }
    installed
}

/// Timing span around one notification round (local copy or cross-context delivery)
///
/// Logs on drop; rounds over [`SLOW_NOTIFY_THRESHOLD`] are reported as slow.
pub struct NotifySpan {
    span: Span,
    start: Instant,
    channel: &'static str,
    listeners: usize,
}

impl NotifySpan {
    /// Open a span for notifying `listeners` callbacks on `channel` ("local" or "remote")
    #[must_use]
    pub fn new(channel: &'static str, key: &str, listeners: usize) -> Self {
        let span = span!(
            Level::TRACE,
            "notify",
            channel,
            key,
            listeners,
            duration_us = tracing::field::Empty,
        );

        Self {
            span,
            start: Instant::now(),
            channel,
            listeners,
        }
    }

    /// Enter the span while listeners run
    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }
}

impl Drop for NotifySpan {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        self.span.record("duration_us", duration.as_micros() as u64);
        let _entered = self.span.enter();

        if duration > SLOW_NOTIFY_THRESHOLD {
            warn!(
                channel = self.channel,
                listeners = self.listeners,
                duration_ms = duration.as_millis() as u64,
                slow = true,
                "slow clipboard listeners"
            );
        } else {
            debug!(
                channel = self.channel,
                listeners = self.listeners,
                duration_us = duration.as_micros() as u64,
                "listeners notified"
            );
        }
    }
}

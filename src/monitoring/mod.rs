/*!
 * Monitoring
 * Structured tracing setup and notification timing
 */

mod tracer;

pub use tracer::{init_tracing, NotifySpan, SLOW_NOTIFY_THRESHOLD};

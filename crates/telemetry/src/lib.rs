//! Structured logging setup for the endpoint.
//!
//! The endpoint logs every admission decision at `info` (admit) or `warn`
//! (deny) with structured fields (`ip`, `admit`, `reason`, `latency_ns`)
//! rather than interpolated strings, so a JSON-formatted subscriber is
//! directly queryable. [`init_logging`] wires that subscriber up once for
//! the process, honoring `RUST_LOG` when set and otherwise falling back to
//! the endpoint's configured [`LogLevel`].

#![deny(unsafe_code)]
#![warn(missing_docs)]

use ipfilter_core::config::LogLevel;
use std::sync::Once;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

static INIT: Once = Once::new();

/// Install the process-wide JSON logging subscriber, idempotently.
///
/// `RUST_LOG` takes priority when set (so an operator can override the
/// configured level without restarting with a different environment);
/// otherwise the filter is derived from `level`. Calling this more than
/// once is safe — later calls are no-ops.
pub fn init_logging(level: LogLevel) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(level.as_filter_directive()));
        let fmt_layer = fmt::layer().json().with_current_span(true).with_span_list(true);
        let subscriber = Registry::default().with(filter).with(fmt_layer);
        // Ignore the error: a subscriber set by a test harness or an
        // embedding binary before us is not a failure of this call.
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

/// Whether [`init_logging`] has run in this process.
#[must_use]
pub fn is_initialized() -> bool {
    INIT.is_completed()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_logging_is_idempotent() {
        init_logging(LogLevel::Debug);
        init_logging(LogLevel::Error);
        assert!(is_initialized());
    }
}

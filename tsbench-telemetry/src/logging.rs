//! ## tsbench-telemetry::logging
//! **Structured logging with `tracing`**
//!
//! Workers never log inside the measured loop; events are emitted before the
//! barrier releases them or after they have been joined.

use tracing::info_span;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Clone)]
pub struct EventLogger;

impl EventLogger {
    /// Installs the global subscriber. `RUST_LOG` wins over `default_level`.
    /// Later calls are no-ops.
    pub fn init(default_level: &str) {
        let _ = fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
            )
            .with_thread_names(true)
            .with_span_events(FmtSpan::CLOSE)
            .try_init();
    }

    /// Records a named benchmark event with its key/value fields.
    #[inline]
    pub fn log_event(event_type: &str, fields: &[(&str, String)]) {
        let span = info_span!("bench_event", event_type = event_type);
        let _entered = span.enter();
        tracing::info!(fields = ?fields, "Benchmark event recorded");
    }
}

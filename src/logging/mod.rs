//! Logging infrastructure for Terrace
//!
//! Structured logging via tracing. Embedding services call [`init`] once at
//! startup; library code only uses the tracing macros.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global tracing subscriber.
///
/// Honors `RUST_LOG` when set; otherwise falls back to
/// `terrace=<log_level>,info`. With `json` set, events are emitted as JSON
/// lines for log shippers.
pub fn init(log_level: &str, json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("terrace={},info", log_level).into());

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

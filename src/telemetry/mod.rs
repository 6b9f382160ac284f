//! Tracing setup for the service and CLI
//!
//! `PRECLEAR_LOG` takes an `EnvFilter` directive string
//! (e.g. `PRECLEAR_LOG=preclear=debug,tower=warn`). When it is unset or
//! invalid the level chosen on the command line applies.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "PRECLEAR_LOG";

static INIT: Once = Once::new();

/// Output format for log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    pub fn from_flag(json: bool) -> Self {
        if json {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }
}

/// Build the filter from `PRECLEAR_LOG`, falling back to `default_level`
pub fn build_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Initialize the global subscriber. Later calls are no-ops.
///
/// Logs go to stderr so `suggest`/`recommend` output on stdout stays
/// machine-readable.
pub fn init_tracing(format: LogFormat, default_level: &str) {
    let default_level = default_level.to_string();
    INIT.call_once(move || {
        let filter = build_filter(&default_level);

        let result = match format {
            LogFormat::Json => tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .json()
                        .with_target(true)
                        .with_thread_ids(true)
                        .with_writer(std::io::stderr),
                )
                .with(filter)
                .try_init(),
            LogFormat::Text => tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_writer(std::io::stderr),
                )
                .with(filter)
                .try_init(),
        };

        // Another subscriber (e.g. a test harness) may already be installed
        if let Err(err) = result {
            eprintln!("tracing already initialized: {}", err);
        }
    });
}

//! Tracing setup for the binary
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// targets match by prefix, so `crewline` covers every crewline_* crate
const DEFAULT_LOG_FILTER: &str = "warn,crewline=info";
const VERBOSE_LOG_FILTER: &str = "info,crewline=debug";

/// Installs the global subscriber. Logs go to stderr; stdout carries reports
/// and the operator console.
///
/// `RUST_LOG` wins over both defaults.
pub fn init_logging(verbose: bool) {
    let default = if verbose {
        VERBOSE_LOG_FILTER
    } else {
        DEFAULT_LOG_FILTER
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // a second init (tests) is not an error worth reporting
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

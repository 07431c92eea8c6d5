//! Daily Manna
//!
//! Facade over the workspace crates plus process-level logging setup.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub use app_state;
pub use i18n;
pub use storage;

use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over `default_filter`. Returns `false` if a
/// subscriber was already installed.
pub fn init_logging(default_filter: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt().with_env_filter(filter).try_init().is_ok()
}

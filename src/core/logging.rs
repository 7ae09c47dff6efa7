//! Logging bootstrap
//!
//! Installs a `tracing-subscriber` formatter filtered by `RUST_LOG`, or by an
//! explicit level passed from the command line. Library code only emits
//! events; the binary owns the subscriber.

use crate::core::error::{CoreError, CoreResult};
use tracing_subscriber::EnvFilter;

/// Default filter when neither `RUST_LOG` nor an explicit level is given
const DEFAULT_FILTER: &str = "info";

/// Install the global tracing subscriber
///
/// An explicit `level` wins over `RUST_LOG`.
pub fn init_tracing(level: Option<&str>) -> CoreResult<()> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level).map_err(|e| CoreError::Logging {
            message: format!("invalid log filter '{}': {}", level, e),
        })?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| CoreError::Logging {
            message: e.to_string(),
        })
}

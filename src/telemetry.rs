//! Tracing subscriber setup for binaries.

use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt};

/// Environment variable holding the log filter directives.
pub const LOG_FILTER_VAR: &str = "COLLABHUB_LOG";

/// Installs a formatted subscriber filtered by [`LOG_FILTER_VAR`].
///
/// Defaults to `info` when the variable is unset or invalid.
///
/// # Errors
///
/// Returns an error when a global subscriber is already installed.
pub fn init() -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env(LOG_FILTER_VAR).unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
}

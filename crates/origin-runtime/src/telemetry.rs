//! Logging setup

use tracing_subscriber::EnvFilter;

use origin_core::{OriginError, OriginResult};

use crate::LoggingConfig;

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` overrides `config.filter`. Fails if a global subscriber is
/// already installed.
pub fn init_logging(config: &LoggingConfig) -> OriginResult<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.filter)
            .map_err(|e| OriginError::Config(format!("invalid log filter: {e}")))?,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| OriginError::Config(format!("logging already initialised: {e}")))
}

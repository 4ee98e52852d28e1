//! Tracing setup shared by the server and the CLI.
//!
//! The level comes from `INTERIOR_DESIGN_LOG` (`debug`, `info`, `warn`, ...),
//! falling back to `default_level`.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_ENV_VAR: &str = "INTERIOR_DESIGN_LOG";

pub fn init(default_level: &str) {
    let env_filter =
        EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

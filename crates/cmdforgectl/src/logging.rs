//! Logging for cmdforgectl
//!
//! Diagnostics go to stderr so stdout only ever carries catalog output and
//! rendered commands. The filter comes from `$CMDFORGE_LOG` (EnvFilter
//! syntax, e.g. `debug` or `cmdforge_common=debug`), default `warn`.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "CMDFORGE_LOG";

const DEFAULT_FILTER: &str = "warn";

/// Install the global subscriber. Safe to call more than once.
pub fn init() {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

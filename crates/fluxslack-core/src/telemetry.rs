//! Tracing setup for the fluxslack binaries.
//!
//! [`init_tracing`] installs the global subscriber once. `RUST_LOG` takes
//! precedence over the level passed in; HTTP client internals are kept at
//! `warn` unless `RUST_LOG` says otherwise.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

fn default_directives(level: Level) -> String {
    format!("{},hyper=warn,reqwest=warn", level.as_str().to_lowercase())
}

/// Initialise the global tracing subscriber. Later calls are no-ops.
///
/// `json` switches to newline-delimited JSON lines for log shippers.
pub fn init_tracing(json: bool, level: Level) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(fmt::layer().with_target(true).json())
            .try_init()
            .ok();
    } else {
        registry
            .with(fmt::layer().with_target(true))
            .try_init()
            .ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives() {
        assert_eq!(default_directives(Level::DEBUG), "debug,hyper=warn,reqwest=warn");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_tracing(false, Level::INFO);
        init_tracing(true, Level::DEBUG);
    }
}

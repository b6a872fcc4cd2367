//! Tracing subscriber initialisation for processes embedding devpilot.
//!
//! The library only emits `tracing` events; hosts call [`init_tracing`] once
//! at start-up to route them to standard error.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Installs the global subscriber.
///
/// `RUST_LOG` takes precedence over `level`. With `json` set, events are
/// written as newline-delimited JSON. Only the first call in a process takes
/// effect; the return value reports whether this call installed the
/// subscriber.
#[must_use]
pub fn init_tracing(json: bool, level: Level) -> bool {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr).json())
            .try_init()
            .is_ok()
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for subscriber initialisation.

    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(true)]
    #[case(false)]
    fn repeated_initialisation_is_ignored(#[case] json: bool) {
        let _first = init_tracing(json, Level::DEBUG);

        assert!(!init_tracing(json, Level::INFO));
    }
}

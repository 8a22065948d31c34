//! Diagnostic output on stderr, kept apart from the tables on stdout.

use tracing_subscriber::{
    EnvFilter,
    filter::{LevelFilter, Targets},
    fmt,
    prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

const APP_TARGET: &str = "folio";

/// Installs the global subscriber.
///
/// `--verbose` shows folio's own debug events (requests, state changes,
/// store hits) and warnings from dependencies such as reqwest and fjall.
/// Without it nothing is logged. A set `RUST_LOG` replaces both.
pub fn init_logging(verbose: bool) {
    let registry = tracing_subscriber::registry().with(
        fmt::layer()
            .pretty()
            .without_time()
            .with_writer(std::io::stderr),
    );

    match EnvFilter::try_from_default_env() {
        Ok(env_filter) => registry.with(env_filter).init(),
        Err(_) => registry.with(verbosity_targets(verbose)).init(),
    }
}

fn verbosity_targets(verbose: bool) -> Targets {
    if verbose {
        Targets::new()
            .with_target(APP_TARGET, LevelFilter::DEBUG)
            .with_default(LevelFilter::WARN)
    } else {
        Targets::new().with_default(LevelFilter::OFF)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    #[test]
    fn test_verbose_shows_app_debug_and_dependency_warnings() {
        let targets = verbosity_targets(true);

        assert!(targets.would_enable("folio::core::controller", &Level::DEBUG));
        assert!(!targets.would_enable("folio::core::controller", &Level::TRACE));
        assert!(targets.would_enable("reqwest::connect", &Level::WARN));
        assert!(!targets.would_enable("reqwest::connect", &Level::DEBUG));
    }

    #[test]
    fn test_quiet_logs_nothing() {
        let targets = verbosity_targets(false);

        assert!(!targets.would_enable("folio", &Level::ERROR));
        assert!(!targets.would_enable("fjall", &Level::ERROR));
    }
}

//! Log output for the `swipe` binary.
//!
//! Library crates emit records through the `log` facade; this module installs
//! the `tracing-subscriber` formatter that receives them.

use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;

/// Filter applied when neither `RUST_LOG` nor `--log-level` is set.
pub(crate) const DEFAULT_LOG_FILTER: &str = "info";

/// Errors raised while installing the log subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The configured filter directive is invalid.
    #[error("invalid log filter '{value}': unable to build EnvFilter")]
    EnvFilter {
        /// Directive as configured.
        value: String,
        /// Parser error.
        #[source]
        source: ParseError,
    },
    /// A global subscriber was already installed.
    #[error("failed to install log subscriber")]
    Subscriber(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Build the filter from `RUST_LOG`, falling back to `configured`.
pub(crate) fn env_filter(configured: Option<&str>) -> Result<EnvFilter, TelemetryError> {
    filter_or(EnvFilter::try_from_default_env().ok(), configured)
}

fn filter_or(
    from_env: Option<EnvFilter>,
    configured: Option<&str>,
) -> Result<EnvFilter, TelemetryError> {
    if let Some(filter) = from_env {
        return Ok(filter);
    }
    let value = configured.unwrap_or(DEFAULT_LOG_FILTER);
    EnvFilter::try_new(value).map_err(|source| TelemetryError::EnvFilter {
        value: value.to_owned(),
        source,
    })
}

/// Install the global subscriber, which also captures `log` records.
pub(crate) fn init(configured: Option<&str>) -> Result<(), TelemetryError> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(configured)?)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(TelemetryError::Subscriber)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::error::Error as _;
    use tracing_subscriber::filter::LevelFilter;

    #[rstest]
    fn unset_levels_fall_back_to_info() {
        let filter = filter_or(None, None).expect("default filter");
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
    }

    #[rstest]
    fn environment_filters_win_over_configuration() {
        let from_env = EnvFilter::try_new("warn").expect("env filter");
        let filter = filter_or(Some(from_env), Some("debug")).expect("filter");
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));
    }

    #[rstest]
    fn invalid_directives_keep_the_parser_error() {
        let err = filter_or(None, Some("swipe=loud")).expect_err("invalid level");

        assert_eq!(
            err.to_string(),
            "invalid log filter 'swipe=loud': unable to build EnvFilter"
        );
        assert!(err.source().is_some());
    }
}

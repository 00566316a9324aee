//! Error types raised while validating policies and loading weight tables.

use camino::Utf8PathBuf;
use swipe_core::WeightTableError;
use thiserror::Error;

/// Errors returned by [`DecisionPolicy::validate`](crate::DecisionPolicy::validate).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PolicyError {
    /// The mid threshold was above the high threshold.
    #[error("mid threshold {mid} must not exceed high threshold {high}")]
    InvertedThresholds {
        /// Configured mid threshold.
        mid: i64,
        /// Configured high threshold.
        high: i64,
    },
    /// A like probability fell outside `0.0..=1.0`.
    #[error("{name} must be between 0.0 and 1.0, got {value}")]
    ProbabilityOutOfRange {
        /// Name of the offending setting.
        name: &'static str,
        /// Configured value.
        value: f64,
    },
}

/// Errors raised while loading a weight table from disk.
#[derive(Debug, Error)]
pub enum WeightTableLoadError {
    /// Reading the file failed.
    #[error("failed to read weight table at {path}")]
    Read {
        /// Requested path.
        path: Utf8PathBuf,
        /// Source error from std I/O.
        #[source]
        source: std::io::Error,
    },
    /// The file was not a JSON array of `{category, name, points}` rows.
    #[error("failed to parse weight table at {path}")]
    Parse {
        /// Requested path.
        path: Utf8PathBuf,
        /// Source error from `serde_json`.
        #[source]
        source: serde_json::Error,
    },
    /// A row failed validation.
    #[error("invalid weight table at {path}")]
    Invalid {
        /// Requested path.
        path: Utf8PathBuf,
        /// Validation failure.
        #[source]
        source: WeightTableError,
    },
}

//! Error types emitted by the swipe CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use swipe_core::ParseDecisionError;
use swipe_gemini::ProviderBuildError;
use swipe_scorer::{PolicyError, WeightTableLoadError};
use swipe_session::{OpenerError, SessionError, SiteScriptError};
use thiserror::Error;

use crate::telemetry::TelemetryError;

/// Errors emitted by the swipe CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Option name.
        field: &'static str,
        /// Environment variable.
        env: &'static str,
    },
    /// Two options that exclude each other were both set.
    #[error("--{first} and --{second} cannot be combined")]
    ConflictingArguments {
        /// First option.
        first: &'static str,
        /// Second option.
        second: &'static str,
    },
    /// The safe default is not a decision label.
    #[error("invalid --{field}: {source}")]
    InvalidDecision {
        /// Option name.
        field: &'static str,
        /// Underlying error.
        #[source]
        source: ParseDecisionError,
    },
    /// The requested operation requires a missing compile-time feature.
    #[error("{action} requires the `{feature}` feature to be enabled")]
    MissingFeature {
        /// Cargo feature.
        feature: &'static str,
        /// Command that needs it.
        action: &'static str,
    },
    /// A referenced input path does not exist on disk or is not a file.
    #[error("{field} path {path:?} does not exist or is not a file")]
    MissingSourceFile {
        /// Option name.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        /// Option name.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        /// Option name.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// Logging could not be initialised.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    /// Thresholds or probabilities are inconsistent.
    #[error("invalid decision policy: {0}")]
    Policy(#[from] PolicyError),
    /// The weight table could not be loaded.
    #[error(transparent)]
    LoadWeights(#[from] WeightTableLoadError),
    /// Reading the prompt file failed.
    #[error("failed to read prompt at {path:?}: {source}")]
    ReadPrompt {
        /// Offending path.
        path: Utf8PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The prompt is blank.
    #[error("the classifier prompt is blank")]
    BlankPrompt,
    /// A site name is neither a preset nor a readable site script.
    #[error("unknown site {name:?}: expected tinder, bumble or a path to a site script")]
    UnknownSite {
        /// Name as given.
        name: String,
    },
    /// Loading a site script failed.
    #[error(transparent)]
    SiteScript(#[from] SiteScriptError),
    /// Building the classifier failed.
    #[error("failed to build the Gemini classifier: {0}")]
    BuildClassifier(#[from] ProviderBuildError),
    /// The browser could not be started or a page could not be opened.
    #[cfg(feature = "browser")]
    #[error("browser failure: {0}")]
    Browser(#[source] Box<swipe_browser::BrowserError>),
    /// A decision loop ended with a fatal error.
    #[error("session on {site} failed: {source}")]
    Session {
        /// Site name.
        site: String,
        /// Underlying error.
        #[source]
        source: SessionError,
    },
    /// A session thread panicked.
    #[error("session on {site} panicked")]
    SessionPanicked {
        /// Site name.
        site: String,
    },
    /// The opener campaign failed.
    #[error("opener campaign on {site} failed: {source}")]
    Opener {
        /// Site name.
        site: String,
        /// Underlying error.
        #[source]
        source: OpenerError,
    },
    /// Opening the attributes file failed.
    #[error("failed to read attributes at {path:?}: {source}")]
    ReadAttributes {
        /// Offending path.
        path: Utf8PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The attributes file is not a JSON object.
    #[error("attributes in {path:?} are not a JSON object")]
    InvalidAttributes {
        /// Offending path.
        path: Utf8PathBuf,
    },
    /// Attribute JSON could not be decoded.
    #[error("failed to parse attributes JSON at {path:?}: {source}")]
    ParseAttributes {
        /// Offending path.
        path: Utf8PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}

#[cfg(feature = "browser")]
impl From<swipe_browser::BrowserError> for CliError {
    fn from(err: swipe_browser::BrowserError) -> Self {
        Self::Browser(Box::new(err))
    }
}

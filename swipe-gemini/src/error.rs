//! Construction errors.

use swipe_core::ClassifierError;

/// Error type for [`GeminiClassifierFactory`](crate::GeminiClassifierFactory)
/// construction failures.
#[derive(Debug)]
pub enum ProviderBuildError {
    /// Failed to build the HTTP client.
    HttpClient(reqwest::Error),
    /// Failed to build the Tokio runtime.
    Runtime(std::io::Error),
    /// The credential pool holds no usable key.
    NoCredentials,
}

impl std::fmt::Display for ProviderBuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HttpClient(err) => write!(f, "failed to build HTTP client: {err}"),
            Self::Runtime(err) => write!(f, "failed to build Tokio runtime: {err}"),
            Self::NoCredentials => f.write_str("no Gemini API keys configured"),
        }
    }
}

impl std::error::Error for ProviderBuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::HttpClient(err) => Some(err),
            Self::Runtime(err) => Some(err),
            Self::NoCredentials => None,
        }
    }
}

impl From<ProviderBuildError> for ClassifierError {
    fn from(err: ProviderBuildError) -> Self {
        match err {
            ProviderBuildError::NoCredentials => Self::NoCredentials,
            other => Self::Build {
                message: other.to_string(),
            },
        }
    }
}

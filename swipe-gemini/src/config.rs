//! Endpoint configuration for [`GeminiClassifierFactory`](crate::GeminiClassifierFactory).

use std::time::Duration;

/// Public Gemini API host.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Vision-capable model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Default user agent for classification requests.
pub const DEFAULT_USER_AGENT: &str = "swipe-gemini/0.1";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the Gemini classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeminiConfig {
    /// API host, without the `/v1beta` path.
    pub base_url: String,
    /// Model name, e.g. `"gemini-1.5-flash"`.
    pub model: String,
    /// Connect and request timeout.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            model: DEFAULT_MODEL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl GeminiConfig {
    /// Point the classifier at another host, such as a local stub.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the model name.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Build the `generateContent` URL for the configured model.
    ///
    /// The format is `{base_url}/v1beta/models/{model}:generateContent`.
    pub(crate) fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://generativelanguage.googleapis.com")]
    #[case("https://generativelanguage.googleapis.com/")]
    fn endpoint_names_the_model(#[case] base_url: &str) {
        let config = GeminiConfig::default().with_base_url(base_url);
        assert_eq!(
            config.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[rstest]
    fn builders_override_defaults() {
        let config = GeminiConfig::default()
            .with_model("gemini-2.0-flash")
            .with_timeout(Duration::from_secs(5))
            .with_user_agent("test/1.0");
        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.user_agent, "test/1.0");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }
}

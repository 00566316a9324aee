//! Blocking Gemini classifier.

use log::debug;
use reqwest::Client;
use swipe_core::{
    CapturedImage, Classifier, ClassifierError, ClassifierFactory, RandomSource, RngSource,
};
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};

use crate::wire::{ErrorResponse, GenerateRequest, GenerateResponse};
use crate::{CredentialPool, GeminiConfig, ProviderBuildError};

/// Header carrying the API key.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Hands out Gemini classifiers, each bound to a randomly drawn API key.
///
/// The factory owns a Tokio runtime that is reused across calls, avoiding
/// the overhead of creating a new runtime per request.
///
/// # Runtime behaviour
///
/// When called from outside any Tokio runtime, classifiers use the factory's
/// own runtime. When called from within a multi-threaded Tokio runtime they
/// use that runtime's handle with [`tokio::task::block_in_place`] to avoid
/// nested runtime panics. Inside a `current_thread` runtime they fall back
/// to the factory's runtime.
pub struct GeminiClassifierFactory<R = RngSource>
where
    R: RandomSource,
{
    client: Client,
    config: GeminiConfig,
    credentials: CredentialPool,
    random: R,
    runtime: Runtime,
}

impl<R> std::fmt::Debug for GeminiClassifierFactory<R>
where
    R: RandomSource,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClassifierFactory")
            .field("client", &self.client)
            .field("config", &self.config)
            .field("credentials", &self.credentials)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish_non_exhaustive()
    }
}

impl GeminiClassifierFactory<RngSource> {
    /// Create a factory drawing keys with an entropy-seeded generator.
    ///
    /// # Errors
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn new(
        config: GeminiConfig,
        credentials: CredentialPool,
    ) -> Result<Self, ProviderBuildError> {
        Self::with_random(config, credentials, RngSource::from_entropy())
    }
}

impl<R> GeminiClassifierFactory<R>
where
    R: RandomSource,
{
    /// Create a factory drawing keys from `random`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn with_random(
        config: GeminiConfig,
        credentials: CredentialPool,
        random: R,
    ) -> Result<Self, ProviderBuildError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(ProviderBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ProviderBuildError::Runtime)?;
        Ok(Self {
            client,
            config,
            credentials,
            random,
            runtime,
        })
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &GeminiConfig {
        &self.config
    }
}

impl<R> ClassifierFactory for GeminiClassifierFactory<R>
where
    R: RandomSource,
{
    fn create(&mut self) -> Result<Box<dyn Classifier + '_>, ClassifierError> {
        let (index, api_key) = self
            .credentials
            .pick(&mut self.random)
            .ok_or(ClassifierError::NoCredentials)?;
        debug!(
            "classifying with {} using key {}/{}",
            self.config.model,
            index + 1,
            self.credentials.len()
        );
        Ok(Box::new(GeminiClassifier {
            client: &self.client,
            config: &self.config,
            runtime: &self.runtime,
            api_key,
        }))
    }
}

/// One classifier bound to a single API key.
pub struct GeminiClassifier<'a> {
    client: &'a Client,
    config: &'a GeminiConfig,
    runtime: &'a Runtime,
    api_key: &'a str,
}

impl std::fmt::Debug for GeminiClassifier<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClassifier")
            .field("model", &self.config.model)
            .field("api_key", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl GeminiClassifier<'_> {
    async fn generate(&self, prompt: &str, image: &CapturedImage) -> Result<String, ClassifierError> {
        let url = self.config.endpoint();
        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, self.api_key)
            .json(&GenerateRequest::new(prompt, image))
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| self.convert_reqwest_error(&err))?;
        if !status.is_success() {
            return Err(ClassifierError::Http {
                status: status.as_u16(),
                message: ErrorResponse::describe(&body),
            });
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&body).map_err(|err| ClassifierError::MalformedResponse {
                message: err.to_string(),
            })?;
        parsed.text().ok_or(ClassifierError::EmptyResponse)
    }

    /// Convert a reqwest error to a `ClassifierError`.
    fn convert_reqwest_error(&self, error: &reqwest::Error) -> ClassifierError {
        if error.is_timeout() {
            return ClassifierError::Timeout {
                timeout_secs: self.config.timeout.as_secs(),
            };
        }

        if let Some(status) = error.status() {
            return ClassifierError::Http {
                status: status.as_u16(),
                message: error.to_string(),
            };
        }

        ClassifierError::Transport {
            message: error.to_string(),
        }
    }
}

impl Classifier for GeminiClassifier<'_> {
    fn classify(&self, prompt: &str, image: &CapturedImage) -> Result<String, ClassifierError> {
        if image.is_empty() {
            return Err(ClassifierError::Transport {
                message: "refusing to send an empty image".to_owned(),
            });
        }
        let future = self.generate(prompt, image);
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }
    }
}

//! Image classification seam.
//!
//! A [`Classifier`] turns a prompt and a captured image into raw model text.
//! [`classify_attributes`] layers the response contract on top: strip code
//! fences, parse JSON, and flatten the object into an [`AttributeSet`].

use thiserror::Error;

use crate::{AttributeSet, CapturedImage, strip_code_fences};

/// Errors from classification.
///
/// Every variant is local to one iteration; the decision loop turns them into
/// the safe-default decision and never retries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifierError {
    /// The request could not be sent or the connection failed.
    #[error("classifier transport error: {message}")]
    Transport {
        /// Underlying message.
        message: String,
    },
    /// The service did not answer in time.
    #[error("classifier timed out after {timeout_secs}s")]
    Timeout {
        /// Configured timeout in seconds.
        timeout_secs: u64,
    },
    /// The service answered with a non-success status.
    #[error("classifier returned HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body or reason phrase.
        message: String,
    },
    /// The service answered without any text.
    #[error("classifier returned an empty response")]
    EmptyResponse,
    /// The text was not a JSON object.
    #[error("classifier response is not a JSON object: {message}")]
    MalformedResponse {
        /// Parser message or a description of the unexpected shape.
        message: String,
    },
    /// No API credentials were configured.
    #[error("no classifier credentials configured")]
    NoCredentials,
    /// The classifier could not be constructed.
    #[error("failed to build classifier: {message}")]
    Build {
        /// Underlying message.
        message: String,
    },
}

/// Service that describes an image as text.
pub trait Classifier {
    /// Send `prompt` and `image` to the service and return its raw text.
    fn classify(&self, prompt: &str, image: &CapturedImage) -> Result<String, ClassifierError>;
}

/// Produces a fresh [`Classifier`] for every iteration.
///
/// Factories may randomise per-instance state such as the API key.
pub trait ClassifierFactory: Send {
    /// Create a classifier instance.
    fn create(&mut self) -> Result<Box<dyn Classifier + '_>, ClassifierError>;
}

/// Classify `image` and parse the answer into an [`AttributeSet`].
///
/// # Examples
///
/// ```
/// use swipe_core::{CapturedImage, Classifier, ClassifierError, classify_attributes};
///
/// struct Canned;
///
/// impl Classifier for Canned {
///     fn classify(&self, _: &str, _: &CapturedImage) -> Result<String, ClassifierError> {
///         Ok("```json\n{\"Age\": \"25 years\"}\n```".to_owned())
///     }
/// }
///
/// let attrs = classify_attributes(&Canned, "describe", &CapturedImage::new(vec![0]))?;
/// assert_eq!(attrs.get("age"), Some("25 years"));
/// # Ok::<(), ClassifierError>(())
/// ```
pub fn classify_attributes<C>(
    classifier: &C,
    prompt: &str,
    image: &CapturedImage,
) -> Result<AttributeSet, ClassifierError>
where
    C: Classifier + ?Sized,
{
    let raw = classifier.classify(prompt, image)?;
    let body = strip_code_fences(&raw);
    if body.is_empty() {
        return Err(ClassifierError::EmptyResponse);
    }
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|err| ClassifierError::MalformedResponse {
            message: err.to_string(),
        })?;
    AttributeSet::from_json_value(&value).ok_or_else(|| ClassifierError::MalformedResponse {
        message: format!("expected an object, found {}", json_kind(&value)),
    })
}

const fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

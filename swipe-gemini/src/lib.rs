//! Gemini-backed image classification.
//!
//! This crate provides [`GeminiClassifierFactory`], an implementation of
//! [`swipe_core::ClassifierFactory`] that sends the captured profile image and
//! the configured prompt to Gemini's `generateContent` endpoint.
//!
//! # Architecture
//!
//! The [`swipe_core::Classifier`] trait is synchronous so the decision loop
//! stays a plain blocking state machine. The factory owns a Tokio runtime and
//! an HTTP client; each classifier it hands out borrows both and blocks on
//! the request internally. Every new classifier is bound to an API key drawn
//! uniformly at random from the [`CredentialPool`].
//!
//! # Example
//!
//! ```no_run
//! use swipe_core::{CapturedImage, ClassifierFactory, classify_attributes};
//! use swipe_gemini::{CredentialPool, GeminiClassifierFactory, GeminiConfig};
//!
//! let pool = CredentialPool::new(["key-one", "key-two"])?;
//! let mut factory = GeminiClassifierFactory::new(GeminiConfig::default(), pool)?;
//!
//! let classifier = factory.create()?;
//! let image = CapturedImage::new(std::fs::read("profile.png")?);
//! let attributes = classify_attributes(classifier.as_ref(), "Describe the person.", &image)?;
//! println!("{} attributes", attributes.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]

mod config;
mod credentials;
mod error;
mod provider;
mod wire;

pub use config::{DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_USER_AGENT, GeminiConfig};
pub use credentials::CredentialPool;
pub use error::ProviderBuildError;
pub use provider::{GeminiClassifier, GeminiClassifierFactory};

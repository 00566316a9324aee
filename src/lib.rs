//! Facade crate for the swipe engine.
//!
//! This crate re-exports the core domain types, the scoring engine and the
//! decision loop, and exposes the Gemini classifier and the Chromium page
//! adapter behind feature flags.

#![forbid(unsafe_code)]

pub use swipe_core::{
    AttributeSet, Blacklist, BrowserPage, CapturedImage, Classifier, ClassifierError,
    ClassifierFactory, Decision, DecisionReason, Locator, PageAction, PageError, Pause,
    ProfileEvidence, QuotaLimits, QuotaTracker, RandomSource, Region, RngSource, ScoreBand,
    ThreadPause, Verdict, WeightEntry, WeightTable,
};
pub use swipe_scorer::{DecisionPolicy, ScoreCard, ScoringEngine, load_weight_table};
pub use swipe_session::{
    DecisionLoop, MessageTemplates, OpenerCampaign, ScreenshotAudit, SessionConfig, SessionError,
    SessionReport, SiteScript, Timings,
};

#[cfg(feature = "gemini")]
pub use swipe_gemini::{CredentialPool, GeminiClassifierFactory, GeminiConfig};

#[cfg(feature = "browser")]
pub use swipe_browser::{BrowserSettings, ChromePage, ChromeSession};

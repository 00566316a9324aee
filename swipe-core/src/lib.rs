//! Core domain types for the swipe engine.
//!
//! The crate holds the values that flow through one decision iteration
//! (profile evidence, attribute sets, weight tables, decisions and quota
//! state) together with the traits that fence off the outside world: the
//! browser page, the image classifier, the random source and the pause
//! primitive. Adapters for concrete browsers and classification services live
//! in sibling crates.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod attributes;
pub mod classifier;
pub mod decision;
pub mod evidence;
pub mod page;
pub mod pause;
pub mod quota;
pub mod random;
pub mod signals;
pub mod weights;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use attributes::{AttributeSet, strip_code_fences};
pub use classifier::{Classifier, ClassifierError, ClassifierFactory, classify_attributes};
pub use decision::{Decision, DecisionReason, ParseDecisionError, SafeDefaultCause, ScoreBand, Verdict};
pub use evidence::{CapturedImage, ProfileEvidence};
pub use page::{BrowserPage, Locator, PageAction, PageError, Region};
pub use pause::{Pause, ThreadPause};
pub use quota::{QuotaError, QuotaLimits, QuotaSnapshot, QuotaTracker};
pub use random::{RandomSource, RngSource};
pub use signals::{Blacklist, bio_is_social_only, social_handles};
pub use weights::{WeightEntry, WeightTable, WeightTableError};

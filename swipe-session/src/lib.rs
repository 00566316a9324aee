//! Swipe session orchestration.
//!
//! This crate provides [`DecisionLoop`], which drives one site's browser page
//! through profile after profile: it extracts blacklist and bio signals,
//! classifies a screenshot into attributes, scores them with a
//! [`ScoringEngine`](swipe_scorer::ScoringEngine), and applies the resulting
//! like or reject under a per-session quota. Sites are described by
//! [`SiteScript`] values, so the loop itself never names a selector.
//!
//! The [`opener`] module sends first messages to matches using the same page
//! abstraction.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod audit;
mod config;
mod decision_loop;
mod error;
pub mod opener;
mod signals;
mod site;
mod stats;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use audit::{AuditCategory, AuditError, AuditSink, HANDLE_LOG, ScreenshotAudit};
pub use config::{SessionConfig, Timings};
pub use decision_loop::{DecisionLoop, LoopState, StepOutcome};
pub use error::SessionError;
pub use opener::{MessageTemplates, OpenerCampaign, OpenerError, OpenerReport};
pub use signals::SignalExtractor;
pub use site::{MessagingScript, SiteScript, SiteScriptError};
pub use stats::{SessionReport, SessionStats};

//! Scoring and decision rules for swipe sessions.
//!
//! The crate provides two complementary capabilities:
//! - **Attribute scoring** sums the points of every weight-table entry whose
//!   category matches an attribute key and whose name occurs inside the
//!   attribute value. Matching ignores case and the result is deterministic.
//! - **Decision rules** map a score onto a band (high, mid, low) and roll a
//!   weighted draw under the like quota to choose between like and reject.
//!
//! # Examples
//!
//! ```
//! use swipe_core::{AttributeSet, QuotaLimits, QuotaTracker, WeightEntry, WeightTable};
//! use swipe_core::test_support::SequenceSource;
//! use swipe_scorer::{DecisionPolicy, ScoringEngine};
//!
//! let table = WeightTable::new(vec![
//!     WeightEntry::new("age", "25", 5),
//!     WeightEntry::new("interest", "travel", 10),
//! ])?;
//! let engine = ScoringEngine::new(table, DecisionPolicy::default())?;
//! let attrs: AttributeSet = [("age", "25 years"), ("interest", "loves travel")]
//!     .into_iter()
//!     .collect();
//!
//! let card = engine.score_card(&attrs);
//! assert_eq!(card.total, 15);
//!
//! let quota = QuotaTracker::new(QuotaLimits::default());
//! let verdict = engine.assess(card.total, &quota, &mut SequenceSource::new([0.1]));
//! assert!(verdict.decision.is_like());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]

mod engine;
mod error;
mod load;
mod policy;

pub use engine::{ScoreCard, ScoringEngine, assess, decide, score, score_card};
pub use error::{PolicyError, WeightTableLoadError};
pub use load::load_weight_table;
pub use policy::DecisionPolicy;

#[cfg(test)]
mod tests;

//! Swipe decisions and the reasons recorded alongside them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Direction applied to a profile.
///
/// # Examples
///
/// ```
/// use swipe_core::Decision;
///
/// let decision: Decision = "nope".parse()?;
/// assert_eq!(decision, Decision::Reject);
/// assert_eq!(Decision::Like.to_string(), "like");
/// # Ok::<(), swipe_core::ParseDecisionError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    /// Swipe right.
    Like,
    /// Swipe left.
    #[default]
    Reject,
}

impl Decision {
    /// Whether this decision spends a like slot.
    #[must_use]
    pub const fn is_like(self) -> bool {
        matches!(self, Self::Like)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Like => "like",
            Self::Reject => "reject",
        })
    }
}

/// Error returned when a decision label is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown decision `{input}`; expected like or reject")]
pub struct ParseDecisionError {
    input: String,
}

impl FromStr for Decision {
    type Err = ParseDecisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "like" | "yes" => Ok(Self::Like),
            "reject" | "nope" | "no" => Ok(Self::Reject),
            _ => Err(ParseDecisionError {
                input: s.to_owned(),
            }),
        }
    }
}

/// Band a score falls into relative to the policy thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    /// At or above the high threshold.
    High,
    /// Between the mid and high thresholds.
    Mid,
    /// Below the mid threshold.
    Low,
}

impl fmt::Display for ScoreBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::High => "high",
            Self::Mid => "mid",
            Self::Low => "low",
        })
    }
}

/// Why the safe-default decision was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SafeDefaultCause {
    /// The classifier failed or returned an unusable answer.
    Classifier(String),
    /// The classification region could not be captured.
    Capture(String),
    /// The readiness marker did not appear in time.
    ReadinessTimeout,
}

impl fmt::Display for SafeDefaultCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Classifier(message) => write!(f, "classifier failed: {message}"),
            Self::Capture(message) => write!(f, "capture failed: {message}"),
            Self::ReadinessTimeout => f.write_str("readiness marker timed out"),
        }
    }
}

/// Reason logged with every decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecisionReason {
    /// Visible text contained a blacklisted term.
    Blacklisted {
        /// The term that matched.
        term: String,
    },
    /// The bio only advertised a social handle.
    SocialOnlyBio,
    /// The score decided the outcome.
    Score {
        /// Total score.
        score: i64,
        /// Band the score fell into.
        band: ScoreBand,
    },
    /// The score qualified for a like but the like quota was spent.
    QuotaExhausted {
        /// Total score.
        score: i64,
    },
    /// The configured safe default was applied.
    SafeDefault {
        /// What went wrong.
        cause: SafeDefaultCause,
    },
}

impl fmt::Display for DecisionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blacklisted { term } => write!(f, "blacklisted term `{term}`"),
            Self::SocialOnlyBio => f.write_str("bio is a social handle only"),
            Self::Score { score, band } => write!(f, "score {score} ({band} band)"),
            Self::QuotaExhausted { score } => write!(f, "score {score} but like quota spent"),
            Self::SafeDefault { cause } => write!(f, "safe default: {cause}"),
        }
    }
}

/// A decision paired with its reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    /// What to do with the profile.
    pub decision: Decision,
    /// Why.
    pub reason: DecisionReason,
}

impl Verdict {
    /// Pair a decision with its reason.
    #[must_use]
    pub const fn new(decision: Decision, reason: DecisionReason) -> Self {
        Self { decision, reason }
    }

    /// A rejection that bypasses scoring.
    #[must_use]
    pub const fn reject(reason: DecisionReason) -> Self {
        Self::new(Decision::Reject, reason)
    }
}

//! Thresholds and like probabilities.

use serde::{Deserialize, Serialize};
use swipe_core::ScoreBand;

use crate::PolicyError;

/// Score thresholds and the like probability used in each band.
///
/// Scores at or above `high_threshold` are liked with probability `p_high`,
/// scores from `mid_threshold` up to the high threshold with `p_mid`, and
/// everything below `mid_threshold` is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionPolicy {
    /// Lower bound of the high band.
    pub high_threshold: i64,
    /// Lower bound of the mid band.
    pub mid_threshold: i64,
    /// Like probability in the high band.
    pub p_high: f64,
    /// Like probability in the mid band.
    pub p_mid: f64,
}

impl Default for DecisionPolicy {
    fn default() -> Self {
        Self {
            high_threshold: 14,
            mid_threshold: 8,
            p_high: 0.6,
            p_mid: 0.4,
        }
    }
}

impl DecisionPolicy {
    /// Validate the policy and return a copy.
    ///
    /// # Errors
    /// Returns [`PolicyError::InvertedThresholds`] when the mid threshold is
    /// above the high threshold and [`PolicyError::ProbabilityOutOfRange`]
    /// when either probability is outside `0.0..=1.0` or not finite.
    pub fn validate(self) -> Result<Self, PolicyError> {
        if self.mid_threshold > self.high_threshold {
            return Err(PolicyError::InvertedThresholds {
                mid: self.mid_threshold,
                high: self.high_threshold,
            });
        }
        check_probability("p_high", self.p_high)?;
        check_probability("p_mid", self.p_mid)?;
        Ok(self)
    }

    /// Band `score` falls into.
    #[must_use]
    pub const fn band(&self, score: i64) -> ScoreBand {
        if score >= self.high_threshold {
            ScoreBand::High
        } else if score >= self.mid_threshold {
            ScoreBand::Mid
        } else {
            ScoreBand::Low
        }
    }

    /// Like probability for `band`; zero for the low band.
    #[must_use]
    pub const fn like_probability(&self, band: ScoreBand) -> f64 {
        match band {
            ScoreBand::High => self.p_high,
            ScoreBand::Mid => self.p_mid,
            ScoreBand::Low => 0.0,
        }
    }
}

fn check_probability(name: &'static str, value: f64) -> Result<(), PolicyError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(PolicyError::ProbabilityOutOfRange { name, value })
    }
}

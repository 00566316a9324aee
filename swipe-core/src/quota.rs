//! Per-session swipe and like quotas.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Decision;

/// Upper bounds for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaLimits {
    /// Swipes after which the session ends.
    pub max_swipes: u32,
    /// Likes that may be given before every further decision is a reject.
    pub max_likes: u32,
}

impl QuotaLimits {
    /// Create limits.
    #[must_use]
    pub const fn new(max_swipes: u32, max_likes: u32) -> Self {
        Self {
            max_swipes,
            max_likes,
        }
    }
}

impl Default for QuotaLimits {
    fn default() -> Self {
        Self::new(100, 30)
    }
}

/// Errors returned when a record call would overshoot a limit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuotaError {
    /// Every allowed swipe has been taken.
    #[error("session complete: {max_swipes} swipes already taken")]
    SessionComplete {
        /// Configured swipe limit.
        max_swipes: u32,
    },
    /// Every allowed like has been given.
    #[error("like quota exhausted: {max_likes} likes already given")]
    LikesExhausted {
        /// Configured like limit.
        max_likes: u32,
    },
}

/// Point-in-time view of the counters, used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuotaSnapshot {
    /// Swipes taken so far.
    pub swipes_taken: u32,
    /// Likes given so far.
    pub likes_given: u32,
    /// Limits in force.
    pub limits: QuotaLimits,
}

impl fmt::Display for QuotaSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "swipes {}/{}, likes {}/{}",
            self.swipes_taken, self.limits.max_swipes, self.likes_given, self.limits.max_likes
        )
    }
}

/// Monotonic swipe and like counters owned by one decision loop.
///
/// # Examples
///
/// ```
/// use swipe_core::{Decision, QuotaLimits, QuotaTracker};
///
/// let mut quota = QuotaTracker::new(QuotaLimits::new(2, 1));
/// quota.record(Decision::Like)?;
/// assert!(!quota.can_like());
/// quota.record(Decision::Reject)?;
/// assert!(quota.is_session_complete());
/// # Ok::<(), swipe_core::QuotaError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaTracker {
    limits: QuotaLimits,
    swipes_taken: u32,
    likes_given: u32,
}

impl QuotaTracker {
    /// Start a fresh session under `limits`.
    #[must_use]
    pub const fn new(limits: QuotaLimits) -> Self {
        Self {
            limits,
            swipes_taken: 0,
            likes_given: 0,
        }
    }

    /// Count one applied swipe.
    pub fn record_swipe(&mut self) -> Result<(), QuotaError> {
        if self.is_session_complete() {
            return Err(QuotaError::SessionComplete {
                max_swipes: self.limits.max_swipes,
            });
        }
        self.swipes_taken += 1;
        Ok(())
    }

    /// Count one applied like.
    pub fn record_like(&mut self) -> Result<(), QuotaError> {
        if !self.can_like() {
            return Err(QuotaError::LikesExhausted {
                max_likes: self.limits.max_likes,
            });
        }
        self.likes_given += 1;
        Ok(())
    }

    /// Record a swipe and, for [`Decision::Like`], a like.
    ///
    /// A like is validated before either counter moves, so a failed call
    /// leaves the tracker untouched.
    pub fn record(&mut self, decision: Decision) -> Result<(), QuotaError> {
        if decision.is_like() && !self.can_like() {
            return Err(QuotaError::LikesExhausted {
                max_likes: self.limits.max_likes,
            });
        }
        self.record_swipe()?;
        if decision.is_like() {
            self.record_like()?;
        }
        Ok(())
    }

    /// Whether another like may be given.
    #[must_use]
    pub const fn can_like(&self) -> bool {
        self.likes_given < self.limits.max_likes
    }

    /// True exactly when `swipes_taken == max_swipes`.
    #[must_use]
    pub const fn is_session_complete(&self) -> bool {
        self.swipes_taken == self.limits.max_swipes
    }

    /// Swipes taken so far.
    #[must_use]
    pub const fn swipes_taken(&self) -> u32 {
        self.swipes_taken
    }

    /// Likes given so far.
    #[must_use]
    pub const fn likes_given(&self) -> u32 {
        self.likes_given
    }

    /// Limits in force.
    #[must_use]
    pub const fn limits(&self) -> QuotaLimits {
        self.limits
    }

    /// Copy the counters for logging.
    #[must_use]
    pub const fn snapshot(&self) -> QuotaSnapshot {
        QuotaSnapshot {
            swipes_taken: self.swipes_taken,
            likes_given: self.likes_given,
            limits: self.limits,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    fn zero_swipe_session_is_complete_immediately() {
        let mut quota = QuotaTracker::new(QuotaLimits::new(0, 5));
        assert!(quota.is_session_complete());
        assert_eq!(
            quota.record_swipe(),
            Err(QuotaError::SessionComplete { max_swipes: 0 })
        );
    }

    #[rstest]
    fn record_like_refuses_to_overshoot() {
        let mut quota = QuotaTracker::new(QuotaLimits::new(5, 1));
        quota.record_like().expect("first like");
        assert_eq!(
            quota.record_like(),
            Err(QuotaError::LikesExhausted { max_likes: 1 })
        );
        assert_eq!(quota.likes_given(), 1);
    }

    #[rstest]
    fn failed_like_record_leaves_counters_untouched() {
        let mut quota = QuotaTracker::new(QuotaLimits::new(5, 0));
        assert!(quota.record(Decision::Like).is_err());
        assert_eq!(quota.swipes_taken(), 0);
    }

    #[rstest]
    fn snapshot_renders_counters() {
        let mut quota = QuotaTracker::new(QuotaLimits::new(10, 3));
        quota.record(Decision::Like).expect("like");
        assert_eq!(quota.snapshot().to_string(), "swipes 1/10, likes 1/3");
    }

    proptest! {
        #[test]
        fn session_completes_exactly_at_max_swipes(
            max_swipes in 0_u32..50,
            likes in proptest::collection::vec(any::<bool>(), 0..60),
        ) {
            let mut quota = QuotaTracker::new(QuotaLimits::new(max_swipes, 10));
            for wants_like in likes {
                let decision = if wants_like && quota.can_like() {
                    Decision::Like
                } else {
                    Decision::Reject
                };
                let complete_before = quota.is_session_complete();
                let outcome = quota.record(decision);
                prop_assert_eq!(outcome.is_err(), complete_before);
                prop_assert_eq!(quota.is_session_complete(), quota.swipes_taken() == max_swipes);
                prop_assert!(quota.swipes_taken() <= max_swipes);
                prop_assert!(quota.likes_given() <= 10);
            }
        }
    }
}

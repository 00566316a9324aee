//! Per-session counters reported when a loop ends.

use std::fmt;

use serde::Serialize;
use swipe_core::{DecisionReason, QuotaSnapshot, Verdict};

/// Running totals for one decision loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    /// Loop iterations started, including missed polls.
    pub iterations: u64,
    /// Likes applied.
    pub likes: u64,
    /// Rejections decided by score or roll.
    pub score_rejects: u64,
    /// Rejections for a blacklisted term.
    pub blacklist_rejects: u64,
    /// Rejections for a handle-only bio.
    pub social_rejects: u64,
    /// Rejections forced by the spent like quota.
    pub quota_rejects: u64,
    /// Decisions taken from the safe default.
    pub safe_defaults: u64,
    /// Readiness waits that timed out.
    pub readiness_timeouts: u64,
    /// Profile polls that found no profile.
    pub missed_polls: u64,
}

impl SessionStats {
    /// Count an applied verdict.
    pub const fn record(&mut self, verdict: &Verdict) {
        if verdict.decision.is_like() {
            self.likes += 1;
        }
        match verdict.reason {
            DecisionReason::Blacklisted { .. } => self.blacklist_rejects += 1,
            DecisionReason::SocialOnlyBio => self.social_rejects += 1,
            DecisionReason::QuotaExhausted { .. } => self.quota_rejects += 1,
            DecisionReason::SafeDefault { .. } => self.safe_defaults += 1,
            DecisionReason::Score { .. } => {
                if !verdict.decision.is_like() {
                    self.score_rejects += 1;
                }
            }
        }
    }
}

impl fmt::Display for SessionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "likes {}, score rejects {}, blacklist rejects {}, social rejects {}, \
             quota rejects {}, safe defaults {}, readiness timeouts {}, missed polls {}",
            self.likes,
            self.score_rejects,
            self.blacklist_rejects,
            self.social_rejects,
            self.quota_rejects,
            self.safe_defaults,
            self.readiness_timeouts,
            self.missed_polls
        )
    }
}

/// Final outcome of a decision loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionReport {
    /// Site the loop ran against.
    pub site: String,
    /// Counters.
    pub stats: SessionStats,
    /// Quota state when the loop stopped.
    pub quota: QuotaSnapshot,
}

impl fmt::Display for SessionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.site, self.quota, self.stats)
    }
}

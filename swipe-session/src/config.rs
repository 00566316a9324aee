//! Session configuration.

use std::time::Duration;

use swipe_core::{Blacklist, Decision, QuotaLimits};

/// Waits and pauses used by the decision loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    /// How long to wait for the profile marker before counting a missed poll.
    pub profile_poll: Duration,
    /// How long to wait for the readiness marker after classification.
    pub readiness_timeout: Duration,
    /// Pause after opening a profile and after each swipe.
    pub settle: Duration,
    /// Consecutive readiness timeouts that trigger a cooldown and reload.
    pub cooldown_after: u32,
    /// Shortest cooldown.
    pub cooldown_min: Duration,
    /// Longest cooldown.
    pub cooldown_max: Duration,
    /// Shortest pause between humanising key presses.
    pub humanise_min: Duration,
    /// Longest pause between humanising key presses.
    pub humanise_max: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            profile_poll: Duration::from_secs(5),
            readiness_timeout: Duration::from_secs(20),
            settle: Duration::from_secs(1),
            cooldown_after: 2,
            cooldown_min: Duration::from_secs(60),
            cooldown_max: Duration::from_secs(120),
            humanise_min: Duration::from_secs(1),
            humanise_max: Duration::from_secs(2),
        }
    }
}

/// Everything one decision loop needs besides its collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Prompt sent to the classifier with every capture.
    pub prompt: String,
    /// Terms that reject a profile on sight.
    pub blacklist: Blacklist,
    /// Swipe and like limits.
    pub limits: QuotaLimits,
    /// Decision applied when classification or readiness fails.
    pub safe_default: Decision,
    /// Press arrow keys with random pauses before each like.
    pub humanise: bool,
    /// Waits and pauses.
    pub timings: Timings,
}

impl SessionConfig {
    /// Configuration with default limits, timings and a reject safe default.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            blacklist: Blacklist::default(),
            limits: QuotaLimits::default(),
            safe_default: Decision::Reject,
            humanise: true,
            timings: Timings::default(),
        }
    }
}

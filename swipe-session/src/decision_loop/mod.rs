//! The per-site decision loop.
//!
//! Each iteration walks `AwaitProfile → OpenProfile → ExtractSignals →
//! Classify → AwaitReadiness → Score → Act`, with `Recover` after repeated
//! readiness timeouts. Blacklist hits and handle-only bios skip straight from
//! `ExtractSignals` to `Act`. The loop stops cleanly once the swipe quota is
//! spent and only returns an error when the browser session is gone.

use std::fmt;

use log::{debug, info, warn};
use swipe_core::{
    AttributeSet, BrowserPage, CapturedImage, ClassifierFactory, Decision, DecisionReason,
    PageError, Pause, QuotaTracker, RandomSource, SafeDefaultCause, Verdict, classify_attributes,
};
use swipe_scorer::{ScoreCard, ScoringEngine};

use crate::{
    AuditCategory, AuditSink, SessionConfig, SessionError, SessionReport, SessionStats,
    SignalExtractor, SiteScript,
};

/// Phase of the current iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Waiting for a profile card.
    AwaitProfile,
    /// Expanding the profile.
    OpenProfile,
    /// Reading blacklist and bio signals.
    ExtractSignals,
    /// Capturing and classifying the profile image.
    Classify,
    /// Waiting for the card to accept a swipe.
    AwaitReadiness,
    /// Scoring attributes and rolling the decision.
    Score,
    /// Applying the decision.
    Act,
    /// Cooling down and reloading after repeated timeouts.
    Recover,
    /// The swipe quota is spent.
    Complete,
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AwaitProfile => "await-profile",
            Self::OpenProfile => "open-profile",
            Self::ExtractSignals => "extract-signals",
            Self::Classify => "classify",
            Self::AwaitReadiness => "await-readiness",
            Self::Score => "score",
            Self::Act => "act",
            Self::Recover => "recover",
            Self::Complete => "complete",
        })
    }
}

/// Result of one call to [`DecisionLoop::step`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// No profile appeared within the poll window; nothing was done.
    MissedPoll,
    /// A decision was applied to a profile.
    Applied(Verdict),
    /// The swipe quota is spent.
    Complete,
}

struct Assessment {
    verdict: Verdict,
    capture: Option<CapturedImage>,
    card: Option<ScoreCard>,
}

impl Assessment {
    const fn shortcut(verdict: Verdict) -> Self {
        Self {
            verdict,
            capture: None,
            card: None,
        }
    }
}

/// Drives one site's page until its swipe quota is spent.
///
/// The loop owns its page, classifier factory, random source and pause, so
/// several loops can run on separate threads without sharing state.
pub struct DecisionLoop<P, F, R, S>
where
    P: BrowserPage,
    F: ClassifierFactory,
    R: RandomSource,
    S: Pause,
{
    page: P,
    site: SiteScript,
    config: SessionConfig,
    engine: ScoringEngine,
    extractor: SignalExtractor,
    classifiers: F,
    random: R,
    pause: S,
    audit: Option<Box<dyn AuditSink>>,
    quota: QuotaTracker,
    stats: SessionStats,
    state: LoopState,
    consecutive_timeouts: u32,
}

impl<P, F, R, S> DecisionLoop<P, F, R, S>
where
    P: BrowserPage,
    F: ClassifierFactory,
    R: RandomSource,
    S: Pause,
{
    /// Assemble a loop; nothing touches the page until [`Self::step`].
    pub fn new(
        page: P,
        site: SiteScript,
        config: SessionConfig,
        engine: ScoringEngine,
        classifiers: F,
        random: R,
        pause: S,
    ) -> Self {
        let extractor = SignalExtractor::new(config.blacklist.clone());
        let quota = QuotaTracker::new(config.limits);
        Self {
            page,
            site,
            config,
            engine,
            extractor,
            classifiers,
            random,
            pause,
            audit: None,
            quota,
            stats: SessionStats::default(),
            state: LoopState::AwaitProfile,
            consecutive_timeouts: 0,
        }
    }

    /// Save screenshots and discovered handles through `sink`.
    #[must_use]
    pub fn with_audit(mut self, sink: Box<dyn AuditSink>) -> Self {
        self.audit = Some(sink);
        self
    }

    /// Phase the loop is in, or last finished.
    #[must_use]
    pub const fn state(&self) -> LoopState {
        self.state
    }

    /// Counters so far.
    #[must_use]
    pub const fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Quota state so far.
    #[must_use]
    pub const fn quota(&self) -> &QuotaTracker {
        &self.quota
    }

    /// Summary of the session so far.
    #[must_use]
    pub fn report(&self) -> SessionReport {
        SessionReport {
            site: self.site.name.clone(),
            stats: self.stats,
            quota: self.quota.snapshot(),
        }
    }

    /// Iterate until the swipe quota is spent.
    ///
    /// # Errors
    /// Returns [`SessionError`] when the browser session fails fatally.
    pub fn run(&mut self) -> Result<SessionReport, SessionError> {
        info!("{}: session started, {}", self.site.name, self.quota.snapshot());
        while !matches!(self.step()?, StepOutcome::Complete) {}
        let report = self.report();
        info!("{report}");
        Ok(report)
    }

    /// Run a single iteration.
    ///
    /// # Errors
    /// Returns [`SessionError`] when the browser session fails fatally.
    pub fn step(&mut self) -> Result<StepOutcome, SessionError> {
        if self.quota.is_session_complete() {
            self.enter(LoopState::Complete);
            return Ok(StepOutcome::Complete);
        }
        self.stats.iterations += 1;

        self.enter(LoopState::AwaitProfile);
        let poll = self.config.timings.profile_poll;
        let loaded = self
            .tolerate(
                self.page.wait_for(&self.site.profile_marker, poll),
                "poll for a profile",
            )?
            .unwrap_or(false);
        if !loaded {
            self.stats.missed_polls += 1;
            info!(
                "{} #{}: no profile after {}s, polling again",
                self.site.name,
                self.stats.iterations,
                poll.as_secs()
            );
            return Ok(StepOutcome::MissedPoll);
        }

        self.enter(LoopState::OpenProfile);
        if let Some(action) = &self.site.open_profile
            && self.tolerate(action.perform(&self.page), "open the profile")? == Some(false)
        {
            debug!("{}: {action} found no target", self.site.name);
        }
        self.pause.pause(self.config.timings.settle);

        self.enter(LoopState::ExtractSignals);
        let evidence = self
            .extractor
            .extract(&self.page, &self.site, self.audit.as_deref())
            .map_err(|source| self.fatal(source))?;

        let assessment = if let Some(term) = evidence.blacklist_term() {
            Assessment::shortcut(Verdict::reject(DecisionReason::Blacklisted {
                term: term.to_owned(),
            }))
        } else if evidence.bio_social_only {
            Assessment::shortcut(Verdict::reject(DecisionReason::SocialOnlyBio))
        } else {
            self.assess()?
        };

        self.act(assessment)
    }

    fn assess(&mut self) -> Result<Assessment, SessionError> {
        let (capture, attributes) = self.classify()?;

        self.enter(LoopState::AwaitReadiness);
        let ready = self
            .tolerate(
                self.page.wait_for(
                    &self.site.readiness_marker,
                    self.config.timings.readiness_timeout,
                ),
                "wait for readiness",
            )?
            .unwrap_or(false);
        if ready {
            self.consecutive_timeouts = 0;
        } else {
            self.stats.readiness_timeouts += 1;
            self.consecutive_timeouts += 1;
        }

        let (verdict, card) = match (attributes, ready) {
            (Err(cause), _) => (self.safe_default(cause), None),
            (Ok(_), false) => (self.safe_default(SafeDefaultCause::ReadinessTimeout), None),
            (Ok(attributes), true) => {
                self.enter(LoopState::Score);
                let card = self.engine.score_card(&attributes);
                let verdict = self.engine.assess(card.total, &self.quota, &mut self.random);
                (verdict, Some(card))
            }
        };
        Ok(Assessment {
            verdict,
            capture,
            card,
        })
    }

    fn classify(
        &mut self,
    ) -> Result<(Option<CapturedImage>, Result<AttributeSet, SafeDefaultCause>), SessionError> {
        self.enter(LoopState::Classify);
        let bytes = match self.page.capture_region(self.site.classification_region) {
            Ok(bytes) => bytes,
            Err(err) if err.is_fatal() => return Err(self.fatal(err)),
            Err(err) => return Ok((None, Err(SafeDefaultCause::Capture(err.to_string())))),
        };
        let image = CapturedImage::new(bytes);
        let attributes = self
            .classifiers
            .create()
            .and_then(|classifier| {
                classify_attributes(classifier.as_ref(), &self.config.prompt, &image)
            })
            .map_err(|err| SafeDefaultCause::Classifier(err.to_string()));
        Ok((Some(image), attributes))
    }

    fn safe_default(&self, cause: SafeDefaultCause) -> Verdict {
        let decision = if self.config.safe_default.is_like() && self.quota.can_like() {
            Decision::Like
        } else {
            Decision::Reject
        };
        warn!(
            "{} #{}: {cause}; applying safe default {decision}",
            self.site.name, self.stats.iterations
        );
        Verdict::new(decision, DecisionReason::SafeDefault { cause })
    }

    fn act(&mut self, assessment: Assessment) -> Result<StepOutcome, SessionError> {
        let Assessment {
            verdict,
            capture,
            card,
        } = assessment;
        self.enter(LoopState::Act);
        self.save_audit(&verdict, capture.as_ref())?;
        if verdict.decision.is_like() && self.config.humanise {
            self.humanise()?;
        }

        let action = if verdict.decision.is_like() {
            &self.site.like
        } else {
            &self.site.reject
        };
        if self.tolerate(action.perform(&self.page), "apply the decision")? == Some(false) {
            warn!("{}: {action} found no target", self.site.name);
        }
        self.quota.record(verdict.decision)?;
        self.stats.record(&verdict);

        self.pause.pause(self.config.timings.settle);
        if let Some(locator) = &self.site.interstitial
            && self.tolerate(self.page.click(locator), "dismiss the interstitial")? == Some(true)
        {
            debug!("{}: dismissed {locator}", self.site.name);
        }

        let matches = card
            .as_ref()
            .filter(|card| !card.matches.is_empty())
            .map(|card| format!(", matched [{}]", card.describe_matches()))
            .unwrap_or_default();
        info!(
            "{} #{}: {} ({}){matches}; {}",
            self.site.name,
            self.stats.iterations,
            verdict.decision,
            verdict.reason,
            self.quota.snapshot()
        );
        debug!("{}: {}", self.site.name, self.stats);

        let threshold = self.config.timings.cooldown_after;
        if threshold > 0 && self.consecutive_timeouts >= threshold {
            self.recover()?;
        }
        Ok(StepOutcome::Applied(verdict))
    }

    fn humanise(&mut self) -> Result<(), SessionError> {
        let keys = self.site.humanise_keys.clone();
        let Some(first) = keys.first() else {
            return Ok(());
        };
        let extra = 1 + self.random.pick_index(2).unwrap_or(0);
        for key in std::iter::once(first).chain(keys.iter().cycle().skip(1).take(extra)) {
            self.tolerate(self.page.press_key(key), "press a humanising key")?;
            let wait = self.random.duration_between(
                self.config.timings.humanise_min,
                self.config.timings.humanise_max,
            );
            self.pause.pause(wait);
        }
        Ok(())
    }

    fn recover(&mut self) -> Result<(), SessionError> {
        self.enter(LoopState::Recover);
        let timings = self.config.timings;
        let cooldown = self
            .random
            .duration_between(timings.cooldown_min, timings.cooldown_max);
        warn!(
            "{}: {} consecutive readiness timeouts; cooling down for {}s before reloading",
            self.site.name,
            self.consecutive_timeouts,
            cooldown.as_secs()
        );
        self.pause.pause(cooldown);
        self.tolerate(self.page.reload(), "reload the page")?;
        self.consecutive_timeouts = 0;
        Ok(())
    }

    fn save_audit(
        &self,
        verdict: &Verdict,
        capture: Option<&CapturedImage>,
    ) -> Result<(), SessionError> {
        let Some(sink) = self.audit.as_deref() else {
            return Ok(());
        };
        if matches!(verdict.reason, DecisionReason::Blacklisted { .. }) {
            return Ok(());
        }
        let category = if verdict.decision.is_like() {
            AuditCategory::Yes
        } else {
            AuditCategory::Nopes
        };
        let fresh;
        let png = if let Some(image) = capture {
            image.as_bytes()
        } else {
            let captured = self.tolerate(
                self.page.capture_region(self.site.classification_region),
                "capture an audit screenshot",
            )?;
            let Some(bytes) = captured else {
                return Ok(());
            };
            fresh = bytes;
            fresh.as_slice()
        };
        if let Err(err) = sink.save_screenshot(category, &self.site.name, png) {
            warn!("{}: {err}", self.site.name);
        }
        Ok(())
    }

    fn enter(&mut self, state: LoopState) {
        self.state = state;
        debug!("{} #{}: {state}", self.site.name, self.stats.iterations);
    }

    const fn fatal(&self, source: PageError) -> SessionError {
        SessionError::Page {
            state: self.state,
            source,
        }
    }

    /// Log transient page errors and carry on; escalate fatal ones.
    fn tolerate<T>(
        &self,
        result: Result<T, PageError>,
        operation: &str,
    ) -> Result<Option<T>, SessionError> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.is_fatal() => Err(self.fatal(err)),
            Err(err) => {
                warn!(
                    "{} #{}: failed to {operation}: {err}",
                    self.site.name, self.stats.iterations
                );
                Ok(None)
            }
        }
    }
}

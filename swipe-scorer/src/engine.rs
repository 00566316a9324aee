//! Attribute scoring and the like/reject decision.

use swipe_core::{
    AttributeSet, Decision, DecisionReason, QuotaTracker, RandomSource, ScoreBand, Verdict,
    WeightEntry, WeightTable,
};

use crate::{DecisionPolicy, PolicyError};

/// Score together with the entries that produced it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreCard {
    /// Sum of matched points.
    pub total: i64,
    /// Entries that matched, in table order.
    pub matches: Vec<WeightEntry>,
}

impl ScoreCard {
    /// Render matches as `category:name(+points)` for logs.
    #[must_use]
    pub fn describe_matches(&self) -> String {
        self.matches
            .iter()
            .map(|entry| format!("{}:{}({:+})", entry.category, entry.name, entry.points))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn entry_matches(entry: &WeightEntry, attributes: &AttributeSet) -> bool {
    attributes.get(&entry.category).is_some_and(|value| {
        value
            .to_lowercase()
            .contains(entry.name.to_lowercase().as_str())
    })
}

/// Score `attributes` and keep the matching entries.
#[must_use]
pub fn score_card(attributes: &AttributeSet, table: &WeightTable) -> ScoreCard {
    let mut card = ScoreCard::default();
    for entry in table
        .entries()
        .iter()
        .filter(|entry| entry_matches(entry, attributes))
    {
        card.total = card.total.saturating_add(entry.points);
        card.matches.push(entry.clone());
    }
    card
}

/// Sum the points of every entry matching `attributes`.
///
/// An entry matches when its category equals an attribute key and its name is
/// a substring of that attribute's value, both ignoring case. One value may
/// match several entries; all of them count.
#[must_use]
pub fn score(attributes: &AttributeSet, table: &WeightTable) -> i64 {
    score_card(attributes, table).total
}

/// Decide the fate of a scored profile and explain why.
///
/// Low-band scores and a closed like quota reject without consuming a draw.
pub fn assess<R>(
    score: i64,
    quota: &QuotaTracker,
    policy: &DecisionPolicy,
    random: &mut R,
) -> Verdict
where
    R: RandomSource + ?Sized,
{
    let band = policy.band(score);
    if band == ScoreBand::Low {
        return Verdict::reject(DecisionReason::Score { score, band });
    }
    if !quota.can_like() {
        return Verdict::reject(DecisionReason::QuotaExhausted { score });
    }
    let draw = random.next_unit();
    let decision = if draw < policy.like_probability(band) {
        Decision::Like
    } else {
        Decision::Reject
    };
    Verdict::new(decision, DecisionReason::Score { score, band })
}

/// Decide like or reject for `score`.
pub fn decide<R>(
    score: i64,
    quota: &QuotaTracker,
    policy: &DecisionPolicy,
    random: &mut R,
) -> Decision
where
    R: RandomSource + ?Sized,
{
    assess(score, quota, policy, random).decision
}

/// Weight table and policy bundled for one session.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    table: WeightTable,
    policy: DecisionPolicy,
}

impl ScoringEngine {
    /// Validate `policy` and pair it with `table`.
    ///
    /// # Errors
    /// Propagates [`PolicyError`] from [`DecisionPolicy::validate`].
    pub fn new(table: WeightTable, policy: DecisionPolicy) -> Result<Self, PolicyError> {
        Ok(Self {
            table,
            policy: policy.validate()?,
        })
    }

    /// Score `attributes` against the table.
    #[must_use]
    pub fn score_card(&self, attributes: &AttributeSet) -> ScoreCard {
        score_card(attributes, &self.table)
    }

    /// Decide for `score` under the engine's policy.
    pub fn assess<R>(&self, score: i64, quota: &QuotaTracker, random: &mut R) -> Verdict
    where
        R: RandomSource + ?Sized,
    {
        assess(score, quota, &self.policy, random)
    }

    /// Weight table in use.
    #[must_use]
    pub const fn table(&self) -> &WeightTable {
        &self.table
    }

    /// Policy in use.
    #[must_use]
    pub const fn policy(&self) -> &DecisionPolicy {
        &self.policy
    }
}

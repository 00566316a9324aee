//! Unit coverage for scoring and decision rules.

use std::sync::atomic::Ordering;

use proptest::prelude::*;
use rstest::{fixture, rstest};
use swipe_core::test_support::SequenceSource;
use swipe_core::{
    AttributeSet, Decision, DecisionReason, QuotaLimits, QuotaTracker, ScoreBand, WeightEntry,
    WeightTable,
};

use crate::{DecisionPolicy, PolicyError, ScoringEngine, assess, decide, score, score_card};

#[fixture]
fn table() -> WeightTable {
    WeightTable::new(vec![
        WeightEntry::new("age", "25", 5),
        WeightEntry::new("interest", "travel", 10),
    ])
    .expect("valid table")
}

fn quota_with_likes(max_likes: u32, likes_given: u32) -> QuotaTracker {
    let mut quota = QuotaTracker::new(QuotaLimits::new(100, max_likes));
    for _ in 0..likes_given {
        quota.record(Decision::Like).expect("like within quota");
    }
    quota
}

#[rstest]
fn sums_matching_entries(table: WeightTable) {
    let attrs: AttributeSet = [("age", "25 years"), ("interest", "loves travel and food")]
        .into_iter()
        .collect();

    let total = score(&attrs, &table);

    assert_eq!(total, 15);
    assert_eq!(DecisionPolicy::default().band(total), ScoreBand::High);
}

#[rstest]
fn matching_ignores_case_and_counts_every_entry() {
    let table = WeightTable::new(vec![
        WeightEntry::new("Interest", "TRAVEL", 10),
        WeightEntry::new("interest", "food", 3),
        WeightEntry::new("interest", "smoking", -20),
        WeightEntry::new("hair", "brown", 4),
    ])
    .expect("valid table");
    let attrs: AttributeSet = [("INTEREST", "Travel, Food")].into_iter().collect();

    let card = score_card(&attrs, &table);

    assert_eq!(card.total, 13);
    assert_eq!(card.describe_matches(), "Interest:TRAVEL(+10), interest:food(+3)");
}

#[rstest]
fn empty_attributes_score_zero(table: WeightTable) {
    assert_eq!(score(&AttributeSet::default(), &table), 0);
}

#[rstest]
fn exhausted_like_quota_rejects_high_scores() {
    let quota = quota_with_likes(2, 2);
    let mut random = SequenceSource::new([0.1]);
    let draws = random.draw_counter();

    let verdict = assess(20, &quota, &DecisionPolicy::default(), &mut random);

    assert_eq!(verdict.decision, Decision::Reject);
    assert_eq!(verdict.reason, DecisionReason::QuotaExhausted { score: 20 });
    assert_eq!(draws.load(Ordering::SeqCst), 0);
}

#[rstest]
#[case(14, 0.59, Decision::Like)]
#[case(14, 0.6, Decision::Reject)]
#[case(8, 0.39, Decision::Like)]
#[case(13, 0.4, Decision::Reject)]
#[case(7, 0.0, Decision::Reject)]
fn bands_apply_their_probabilities(
    #[case] score: i64,
    #[case] draw: f64,
    #[case] expected: Decision,
) {
    let quota = quota_with_likes(10, 0);
    let decision = decide(
        score,
        &quota,
        &DecisionPolicy::default(),
        &mut SequenceSource::new([draw]),
    );
    assert_eq!(decision, expected);
}

#[rstest]
fn low_scores_consume_no_draw() {
    let quota = quota_with_likes(10, 0);
    let mut random = SequenceSource::new([0.0]);
    let draws = random.draw_counter();

    let verdict = assess(-5, &quota, &DecisionPolicy::default(), &mut random);

    assert_eq!(
        verdict.reason,
        DecisionReason::Score {
            score: -5,
            band: ScoreBand::Low
        }
    );
    assert_eq!(draws.load(Ordering::SeqCst), 0);
}

#[rstest]
#[case(DecisionPolicy { mid_threshold: 15, ..DecisionPolicy::default() },
       PolicyError::InvertedThresholds { mid: 15, high: 14 })]
#[case(DecisionPolicy { p_high: 1.5, ..DecisionPolicy::default() },
       PolicyError::ProbabilityOutOfRange { name: "p_high", value: 1.5 })]
#[case(DecisionPolicy { p_mid: -0.1, ..DecisionPolicy::default() },
       PolicyError::ProbabilityOutOfRange { name: "p_mid", value: -0.1 })]
fn invalid_policies_are_rejected(#[case] policy: DecisionPolicy, #[case] expected: PolicyError) {
    assert_eq!(policy.validate(), Err(expected));
}

#[rstest]
fn engine_refuses_invalid_policy(table: WeightTable) {
    let policy = DecisionPolicy {
        p_mid: f64::NAN,
        ..DecisionPolicy::default()
    };
    assert!(ScoringEngine::new(table, policy).is_err());
}

#[rstest]
fn policy_deserialises_with_defaults() {
    let policy: DecisionPolicy =
        serde_json::from_str(r#"{"high_threshold": 20}"#).expect("policy json");
    assert_eq!(policy.high_threshold, 20);
    assert_eq!(policy.mid_threshold, 8);
}

fn arb_entry() -> impl Strategy<Value = WeightEntry> {
    (
        prop::sample::select(vec!["age", "interest", "hair"]),
        prop::sample::select(vec!["25", "travel", "brown", "a"]),
        -50_i64..50,
    )
        .prop_map(|(category, name, points)| WeightEntry::new(category, name, points))
}

fn arb_attributes() -> impl Strategy<Value = AttributeSet> {
    prop::collection::vec(
        (
            prop::sample::select(vec!["Age", "interest", "HAIR", "style"]),
            "[a-zA-Z0-9 ]{0,16}",
        ),
        0..4,
    )
    .prop_map(|pairs| pairs.into_iter().collect())
}

proptest! {
    #[test]
    fn score_is_exact_sum_of_matches(
        entries in prop::collection::vec(arb_entry(), 0..12),
        attrs in arb_attributes(),
    ) {
        let table = WeightTable::new(entries.clone()).expect("generated entries are valid");
        let expected: i64 = entries
            .iter()
            .filter(|entry| {
                attrs
                    .get(&entry.category)
                    .is_some_and(|v| v.to_lowercase().contains(&entry.name.to_lowercase()))
            })
            .map(|entry| entry.points)
            .sum();
        prop_assert_eq!(score(&attrs, &table), expected);
        prop_assert_eq!(score(&attrs, &table), score(&attrs, &table));
    }

    #[test]
    fn scores_below_mid_always_reject(score in -1000_i64..8, draw in 0.0_f64..1.0) {
        let quota = quota_with_likes(10, 0);
        let decision = decide(score, &quota, &DecisionPolicy::default(), &mut SequenceSource::new([draw]));
        prop_assert_eq!(decision, Decision::Reject);
    }

    #[test]
    fn closed_quota_always_rejects(score in -1000_i64..1000, draw in 0.0_f64..1.0, max_likes in 0_u32..5) {
        let quota = quota_with_likes(max_likes, max_likes);
        let decision = decide(score, &quota, &DecisionPolicy::default(), &mut SequenceSource::new([draw]));
        prop_assert_eq!(decision, Decision::Reject);
    }

    #[test]
    fn high_scores_follow_the_draw(score in 14_i64..1000, draw in 0.0_f64..1.0) {
        let quota = quota_with_likes(10, 3);
        let decision = decide(score, &quota, &DecisionPolicy::default(), &mut SequenceSource::new([draw]));
        let expected = if draw < 0.6 { Decision::Like } else { Decision::Reject };
        prop_assert_eq!(decision, expected);
    }
}

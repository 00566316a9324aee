//! Injectable randomness.
//!
//! Decisions, humanising pauses, cooldowns and opener messages all draw from a
//! [`RandomSource`] so tests can replace entropy with a fixed sequence.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniform draws.
pub trait RandomSource: Send {
    /// Uniform draw in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    /// Uniform index in `0..len`; returns `None` for an empty range.
    fn pick_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let draw = self.next_unit().clamp(0.0, 1.0);
        #[expect(
            clippy::cast_precision_loss,
            clippy::float_arithmetic,
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "collection lengths are far below f64 precision limits"
        )]
        let index = (draw * len as f64) as usize;
        Some(index.min(len - 1))
    }

    /// Uniform duration in `[min, max]`; `max` below `min` yields `min`.
    fn duration_between(&mut self, min: Duration, max: Duration) -> Duration {
        if max <= min {
            return min;
        }
        let span = max - min;
        min + span.mul_f64(self.next_unit().clamp(0.0, 1.0))
    }
}

/// [`RandomSource`] backed by any `rand` generator.
///
/// # Examples
///
/// ```
/// use swipe_core::{RandomSource, RngSource};
///
/// let mut a = RngSource::seeded(7);
/// let mut b = RngSource::seeded(7);
/// assert_eq!(a.next_unit(), b.next_unit());
/// ```
#[derive(Debug, Clone)]
pub struct RngSource<R = StdRng> {
    rng: R,
}

impl<R: Rng> RngSource<R> {
    /// Wrap an existing generator.
    pub const fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngSource<StdRng> {
    /// Generator seeded from operating-system entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Deterministic generator for reproducible runs.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng + Send> RandomSource for RngSource<R> {
    fn next_unit(&mut self) -> f64 {
        self.rng.gen_range(0.0..1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::ChaCha8Rng;
    use rstest::rstest;

    struct Fixed(f64);

    impl RandomSource for Fixed {
        fn next_unit(&mut self) -> f64 {
            self.0
        }
    }

    #[rstest]
    #[case(0.0, 4, 0)]
    #[case(0.5, 4, 2)]
    #[case(0.999, 4, 3)]
    #[case(1.0, 4, 3)]
    fn pick_index_stays_in_range(#[case] draw: f64, #[case] len: usize, #[case] expected: usize) {
        assert_eq!(Fixed(draw).pick_index(len), Some(expected));
    }

    #[rstest]
    fn pick_index_on_empty_is_none() {
        assert_eq!(Fixed(0.3).pick_index(0), None);
    }

    #[rstest]
    fn duration_between_interpolates() {
        let picked = Fixed(0.5).duration_between(Duration::from_secs(60), Duration::from_secs(120));
        assert_eq!(picked, Duration::from_secs(90));
        let inverted = Fixed(0.5).duration_between(Duration::from_secs(3), Duration::from_secs(1));
        assert_eq!(inverted, Duration::from_secs(3));
    }

    #[rstest]
    fn chacha_draws_are_unit_interval() {
        let mut source = RngSource::new(<ChaCha8Rng as SeedableRng>::seed_from_u64(42));
        for _ in 0..1000 {
            let draw = source.next_unit();
            assert!((0.0..1.0).contains(&draw));
        }
    }
}

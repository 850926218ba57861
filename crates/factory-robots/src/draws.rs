//! Injectable randomness for action durations and outcomes.
//!
//! Effects never touch a global RNG. They ask a [`Draws`] for a uniform
//! integer in an inclusive range. Production code wraps a `rand` generator
//! in [`RngDraws`]; tests script exact outcomes with [`FixedDraws`].

use std::collections::VecDeque;

use rand::Rng;

/// A source of uniform integer draws.
pub trait Draws {
    /// Draw an integer uniformly from `low..=high`.
    ///
    /// When `low >= high` the result is `low`.
    fn between(&mut self, low: u32, high: u32) -> u32;
}

/// [`Draws`] backed by a `rand` generator.
#[derive(Debug, Clone)]
pub struct RngDraws<R>(R);

impl<R: Rng> RngDraws<R> {
    /// Wrap a generator.
    pub const fn new(rng: R) -> Self {
        Self(rng)
    }
}

impl<R: Rng> Draws for RngDraws<R> {
    fn between(&mut self, low: u32, high: u32) -> u32 {
        if low >= high {
            return low;
        }
        self.0.random_range(low..=high)
    }
}

/// Scripted [`Draws`] for deterministic tests.
///
/// Values are handed out in order and clamped into the requested range.
/// Once the script runs out, the last value is repeated.
#[derive(Debug, Clone, Default)]
pub struct FixedDraws {
    script: VecDeque<u32>,
    last: u32,
}

impl FixedDraws {
    /// Create a script from the given values.
    pub fn new(values: impl IntoIterator<Item = u32>) -> Self {
        Self {
            script: values.into_iter().collect(),
            last: 0,
        }
    }

    /// A script that always yields `value`.
    pub fn always(value: u32) -> Self {
        Self {
            script: VecDeque::new(),
            last: value,
        }
    }

    /// Append more values to the script.
    pub fn push(&mut self, value: u32) {
        self.script.push_back(value);
    }

    /// Values not yet handed out.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl Draws for FixedDraws {
    fn between(&mut self, low: u32, high: u32) -> u32 {
        if let Some(next) = self.script.pop_front() {
            self.last = next;
        }
        if low >= high {
            return low;
        }
        self.last.clamp(low, high)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    #[test]
    fn rng_draws_stay_in_range() {
        let mut draws = RngDraws::new(SmallRng::seed_from_u64(42));
        for _ in 0..1_000 {
            let value = draws.between(1, 5);
            assert!((1..=5).contains(&value));
        }
    }

    #[test]
    fn degenerate_range_returns_low() {
        let mut draws = RngDraws::new(SmallRng::seed_from_u64(7));
        assert_eq!(draws.between(3, 3), 3);
        assert_eq!(draws.between(9, 2), 9);
    }

    #[test]
    fn fixed_draws_follow_script_then_repeat() {
        let mut draws = FixedDraws::new([10, 90]);
        assert_eq!(draws.between(1, 100), 10);
        assert_eq!(draws.between(1, 100), 90);
        assert_eq!(draws.remaining(), 0);
        assert_eq!(draws.between(1, 100), 90);
    }

    #[test]
    fn fixed_draws_clamp_into_range() {
        let mut draws = FixedDraws::new([0, 500]);
        assert_eq!(draws.between(1, 5), 1);
        assert_eq!(draws.between(1, 5), 5);
    }

    #[test]
    fn always_repeats_single_value() {
        let mut draws = FixedDraws::always(61);
        assert_eq!(draws.between(1, 100), 61);
        assert_eq!(draws.between(1, 100), 61);
        draws.push(3);
        assert_eq!(draws.between(1, 100), 3);
    }
}

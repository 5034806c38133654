//! [`Dice`]: the random source threaded through generators and random
//! fields.

use rand::rngs::StdRng;
use rand::{Rng, RngExt, SeedableRng};

use crate::geom::Offset;

/// Thin wrapper over an RNG exposing the primitives the generators need.
///
/// Probabilities outside `[0, 1]` are clamped behaviorally: `chance(p)` with
/// `p <= 0` never succeeds and with `p >= 1` always does.
#[derive(Clone, Debug)]
pub struct Dice<R = StdRng> {
    rng: R,
}

impl<R: Rng> Dice<R> {
    /// Wrap an existing RNG.
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Fair coin.
    pub fn coinflip(&mut self) -> bool {
        self.rng.random::<bool>()
    }

    /// Uniform float in `[0, 1)`.
    pub fn float(&mut self) -> f64 {
        self.rng.random::<f64>()
    }

    /// Uniform integer in `[0, n)`. Returns 0 when `n == 0`.
    pub fn below(&mut self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        self.rng.random_range(0..n)
    }

    /// `true` with probability `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        if p <= 0.0 {
            return false;
        }
        if p >= 1.0 {
            return true;
        }
        self.float() < p
    }

    /// Uniform integer in `[min, max]`, both inclusive. Returns `min` when
    /// the interval is empty.
    pub fn range(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        self.rng.random_range(min..=max)
    }

    /// Uniform cell of a `cols × rows` grid.
    pub fn offset(&mut self, cols: i32, rows: i32) -> Offset {
        let x = self.below(cols.max(0) as usize) as i32;
        let y = self.below(rows.max(0) as usize) as i32;
        Offset::new(x, y)
    }

    /// Uniform element of a slice, `None` if it is empty.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        items.get(self.below(items.len()))
    }
}

impl<R: Rng + SeedableRng> Dice<R> {
    /// Deterministic dice for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self::new(R::seed_from_u64(seed))
    }

    /// Restart the sequence from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = R::seed_from_u64(seed);
    }
}

impl Dice<StdRng> {
    /// Dice seeded from the thread-local generator.
    pub fn from_entropy() -> Self {
        Self::seeded(rand::rng().random::<u64>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reseed_repeats_sequence() {
        let mut dice: Dice = Dice::seeded(42);
        let first: Vec<_> = (0..16).map(|_| dice.below(100)).collect();
        dice.reseed(42);
        let second: Vec<_> = (0..16).map(|_| dice.below(100)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn chance_clamps_out_of_range_probabilities() {
        let mut dice: Dice = Dice::seeded(1);
        for _ in 0..100 {
            assert!(!dice.chance(0.0));
            assert!(!dice.chance(-3.0));
            assert!(dice.chance(1.0));
            assert!(dice.chance(7.5));
        }
    }

    #[test]
    fn range_is_inclusive() {
        let mut dice: Dice = Dice::seeded(7);
        let mut seen = [false; 3];
        for _ in 0..200 {
            let v = dice.range(2, 4);
            assert!((2..=4).contains(&v));
            seen[(v - 2) as usize] = true;
        }
        assert_eq!(seen, [true; 3]);
        assert_eq!(dice.range(5, 5), 5);
        assert_eq!(dice.range(5, 1), 5);
    }

    #[test]
    fn below_and_offset_stay_in_bounds() {
        let mut dice: Dice = Dice::seeded(3);
        assert_eq!(dice.below(0), 0);
        for _ in 0..200 {
            assert!(dice.below(5) < 5);
            let p = dice.offset(4, 3);
            assert!((0..4).contains(&p.x) && (0..3).contains(&p.y));
            let f = dice.float();
            assert!((0.0..1.0).contains(&f));
        }
    }

    #[test]
    fn choose_empty_is_none() {
        let mut dice: Dice = Dice::seeded(0);
        let empty: [u8; 0] = [];
        assert_eq!(dice.choose(&empty), None);
        assert_eq!(dice.choose(&[9]), Some(&9));
    }
}

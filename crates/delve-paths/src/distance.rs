use delve_core::Tile;

use crate::traits::{Cost, Heuristic};

/// Scale applied to [`Euclidean`] distances.
///
/// Slightly above 1 so that, among equally short paths, the search prefers
/// the ones that head straight for the goal.
pub const TIEBREAK: f64 = 1.0 + 1e-10;

/// Euclidean distance between tile offsets, scaled by [`TIEBREAK`].
#[derive(Copy, Clone, Debug, Default)]
pub struct Euclidean;

impl Euclidean {
    #[inline]
    fn between<T>(a: &Tile<T>, b: &Tile<T>) -> f64 {
        (b.offset - a.offset).euclidean() * TIEBREAK
    }
}

impl<T> Cost<T> for Euclidean {
    #[inline]
    fn cost(&self, from: &Tile<T>, to: &Tile<T>) -> f64 {
        Self::between(from, to)
    }
}

impl<T> Heuristic<T> for Euclidean {
    #[inline]
    fn estimate(&self, from: &Tile<T>, goal: &Tile<T>) -> f64 {
        Self::between(from, goal)
    }
}

/// Always zero. As a cost it turns a search greedy; as a heuristic it turns
/// it into Dijkstra.
#[derive(Copy, Clone, Debug, Default)]
pub struct Zero;

impl<T> Cost<T> for Zero {
    #[inline]
    fn cost(&self, _: &Tile<T>, _: &Tile<T>) -> f64 {
        0.0
    }
}

impl<T> Heuristic<T> for Zero {
    #[inline]
    fn estimate(&self, _: &Tile<T>, _: &Tile<T>) -> f64 {
        0.0
    }
}

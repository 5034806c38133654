use delve_core::Tile;

/// Cost of moving between two adjacent tiles.
///
/// Any `Fn(&Tile<T>, &Tile<T>) -> f64` closure is a `Cost`. Returning
/// `f64::INFINITY` forbids the move.
pub trait Cost<T> {
    fn cost(&self, from: &Tile<T>, to: &Tile<T>) -> f64;
}

/// Estimate of the remaining cost from a tile to the goal.
///
/// Search results are cost-minimal only when the estimate never exceeds the
/// true remaining cost (admissible).
pub trait Heuristic<T> {
    fn estimate(&self, from: &Tile<T>, goal: &Tile<T>) -> f64;
}

impl<T, F> Cost<T> for F
where
    F: Fn(&Tile<T>, &Tile<T>) -> f64,
{
    #[inline]
    fn cost(&self, from: &Tile<T>, to: &Tile<T>) -> f64 {
        self(from, to)
    }
}

impl<T, F> Heuristic<T> for F
where
    F: Fn(&Tile<T>, &Tile<T>) -> f64,
{
    #[inline]
    fn estimate(&self, from: &Tile<T>, goal: &Tile<T>) -> f64 {
        self(from, goal)
    }
}

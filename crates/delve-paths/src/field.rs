//! Potential fields (Dijkstra maps) for gradient-following AI.
//!
//! Weights are negative inside a field and tiles outside it weigh 0, so an
//! actor standing outside a field's reach does not move.

use std::collections::{HashMap, VecDeque};

use delve_core::{Dice, Offset, TileId, TileMap};
use rand::Rng;

/// Anything an actor can follow one step at a time.
pub trait Field<T> {
    /// Step from `from` towards a better neighbor, or [`Offset::ZERO`] to
    /// stay put.
    fn follow(&mut self, map: &TileMap<T>, from: TileId) -> Offset;
}

// ---------------------------------------------------------------------------
// SparseField
// ---------------------------------------------------------------------------

/// Precomputed weights for the tiles a flood fill reached.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SparseField {
    weights: HashMap<TileId, i32>,
}

impl SparseField {
    /// Weight of `id`, `None` outside the field.
    #[inline]
    pub fn weight(&self, id: TileId) -> Option<i32> {
        self.weights.get(&id).copied()
    }

    #[inline]
    pub fn contains(&self, id: TileId) -> bool {
        self.weights.contains_key(&id)
    }

    /// Number of tiles in the field.
    #[inline]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Every weighted tile, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (TileId, i32)> + '_ {
        self.weights.iter().map(|(&id, &w)| (id, w))
    }
}

impl<T> Field<T> for SparseField {
    /// Moves to the neighbor with the strictly lowest weight. Equal weights
    /// go to the first one in [`Direction`](delve_core::Direction) order.
    fn follow(&mut self, map: &TileMap<T>, from: TileId) -> Offset {
        let mut best = self.weight(from).unwrap_or(0);
        let mut step = Offset::ZERO;
        for (dir, adj) in map.neighbors(from) {
            let w = self.weight(adj).unwrap_or(0);
            if w < best {
                best = w;
                step = dir.offset();
            }
        }
        step
    }
}

/// Breadth-first flood with unit steps.
///
/// Seeds keep their preset weights. Each newly reached passable tile gets its
/// parent's weight plus one, provided `admit` accepts it. A tile whose
/// successors would exceed `ceiling` is not expanded.
fn flood<T>(
    map: &TileMap<T>,
    mut weights: HashMap<TileId, i32>,
    mut queue: VecDeque<TileId>,
    ceiling: Option<i32>,
    admit: impl Fn(TileId) -> bool,
) -> SparseField {
    while let Some(curr) = queue.pop_front() {
        let Some(w) = weights.get(&curr) else {
            continue;
        };
        let cost = w + 1;
        if ceiling.is_some_and(|c| cost > c) {
            continue;
        }
        for (_, adj) in map.neighbors(curr) {
            if map.is_passable(adj) && admit(adj) && !weights.contains_key(&adj) {
                weights.insert(adj, cost);
                queue.push_back(adj);
            }
        }
    }
    SparseField { weights }
}

/// Field pulling towards `goals`.
///
/// Goals weigh `-radius`, every step away adds one, and the fill stops once
/// weights reach 0, so the field covers `radius` steps around the goals.
pub fn attractive_field<T>(map: &TileMap<T>, radius: i32, goals: &[TileId]) -> SparseField {
    let mut weights = HashMap::new();
    let mut queue = VecDeque::new();
    for &goal in goals {
        if weights.insert(goal, -radius).is_none() {
            queue.push_back(goal);
        }
    }
    let field = flood(map, weights, queue, Some(0), |_| true);
    log::debug!(
        "attractive field: {} goals, radius {}, {} tiles",
        goals.len(),
        radius,
        field.len()
    );
    field
}

/// Field pushing away from `ungoals`.
///
/// The attractive field around `ungoals` is computed first; its outermost
/// tiles become the sinks of a second fill restricted to that field's
/// footprint. Following it leads to the farthest reachable ground, even when
/// the way out passes closer to the threat.
pub fn repulsive_field<T>(map: &TileMap<T>, radius: i32, ungoals: &[TileId]) -> SparseField {
    let domain = attractive_field(map, radius, ungoals);
    let Some(edge) = domain.weights.values().copied().max() else {
        return SparseField::default();
    };

    let mut sinks: Vec<TileId> = domain
        .iter()
        .filter(|&(_, w)| w == edge)
        .map(|(id, _)| id)
        .collect();
    sinks.sort();

    // Deep enough that every weight in the footprint stays below 0.
    let base = -(domain.len() as i32);
    let weights = sinks.iter().map(|&id| (id, base)).collect();
    let queue = sinks.into_iter().collect();
    flood(map, weights, queue, None, |id| domain.contains(id))
}

// ---------------------------------------------------------------------------
// RandomField
// ---------------------------------------------------------------------------

/// Wanders: each step is a uniform pick among passable neighbors.
#[derive(Clone, Debug)]
pub struct RandomField<R> {
    dice: Dice<R>,
}

impl<R: Rng> RandomField<R> {
    pub fn new(dice: Dice<R>) -> Self {
        Self { dice }
    }
}

impl<T, R: Rng> Field<T> for RandomField<R> {
    fn follow(&mut self, map: &TileMap<T>, from: TileId) -> Offset {
        let open: Vec<Offset> = map
            .neighbors(from)
            .filter(|&(_, adj)| map.is_passable(adj))
            .map(|(dir, _)| dir.offset())
            .collect();
        self.dice.choose(&open).copied().unwrap_or(Offset::ZERO)
    }
}

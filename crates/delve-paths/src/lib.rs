//! Navigation over a delve tile graph.
//!
//! This crate provides the two ways an actor finds its way around a
//! [`TileMap`](delve_core::TileMap):
//!
//! - **Best-first search** from one tile to another ([`graph_search`]), with
//!   A\* ([`astar_path`]) and greedy ([`greedy_path`]) presets
//! - **Potential fields** ([`attractive_field`], [`repulsive_field`],
//!   [`RandomField`]) that an actor follows one step at a time
//!
//! Both only ever step through passable tiles and read the graph; neither
//! mutates it.
//!
//! # Search parameters
//!
//! | Trait | Role | Presets |
//! |---|---|---|
//! | [`Cost`] | edge weight between adjacent tiles | [`Euclidean`], [`Zero`] |
//! | [`Heuristic`] | estimate from a tile to the goal | [`Euclidean`], [`Zero`] |
//!
//! Both traits are implemented for `Fn(&Tile<T>, &Tile<T>) -> f64` closures.

mod distance;
mod field;
mod search;
mod traits;

#[cfg(test)]
mod testgrid;

pub use distance::{Euclidean, TIEBREAK, Zero};
pub use field::{Field, RandomField, SparseField, attractive_field, repulsive_field};
pub use search::{GraphSearch, astar_path, graph_search, greedy_path};
pub use traits::{Cost, Heuristic};

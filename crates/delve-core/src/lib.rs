//! **delve-core**: the tile graph shared by every delve crate.
//!
//! This crate provides the geometry primitives, the [`Tile`]/[`TileMap`]
//! adjacency graph that generators build and that field-of-view, potential
//! fields and path search read, and the [`Dice`] random source.

pub mod dice;
pub mod geom;
pub mod tile;

pub use dice::Dice;
pub use geom::{Direction, Offset, Range};
pub use tile::{Level, Occupant, Tile, TileId, TileMap};

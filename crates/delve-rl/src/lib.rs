//! Roguelike level building and perception over a delve tile graph.
//!
//! - **Mazes** ([`maze()`]): growing-tree mazes with optional weaving and
//!   dead-end removal, grown as an [`AbstractGraph`] and materialized into
//!   tiles
//! - **Dungeons** ([`dungeon()`]): rooms on a braid graph joined by corridors
//! - **Overworlds** ([`Heightmap`], [`Biomes`]): ellipse heightmaps
//!   classified into terrain bands
//! - **Field of view** ([`field_of_view`]): cached sight tables walked
//!   through the graph
//!
//! Every generator returns a [`Level`](delve_core::Level) whose passable
//! tiles are linked in all eight directions.

pub mod biome;
pub mod dungeon;
pub mod fov;
pub mod heightmap;
pub mod materialize;
pub mod maze;

#[cfg(test)]
mod testgrid;

pub use biome::{Biome, Biomes};
pub use dungeon::{DungeonConfig, TileType, default_dungeon_tile, dungeon};
pub use fov::{SightTable, field_of_view};
pub use heightmap::{Heightmap, HeightmapError};
pub use materialize::{add_walls, connect_diagonals, create_pass_tiles, materialize};
pub use maze::{
    AbstractGraph, AbstractNode, MazeConfig, NodeId, braid_maze, default_maze_tile,
    half_braid_maze, maze, perfect_maze,
};

//! The tile graph: [`Tile`]s stored in a [`TileMap`] arena and linked by
//! [`Direction`].
//!
//! Links are [`TileId`] indices into the arena, so the graph may be cyclic
//! without shared ownership. Tiles are never removed once inserted.
//!
//! Links between passable tiles are symmetric: if `a` reaches `b` by `d`,
//! then `b` reaches `a` by `d.opposite()`. Walls are the exception; an open
//! tile links to its walls, but a wall does not carry a reliable neighbor
//! set and should never be used as a traversal hub.

use std::collections::{HashSet, VecDeque};
use std::ops::{Index, IndexMut};

use crate::geom::{Direction, Offset, Range};

// ---------------------------------------------------------------------------
// Handles
// ---------------------------------------------------------------------------

/// Index of a tile inside its [`TileMap`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileId(u32);

impl TileId {
    /// Position of the tile in the arena.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Opaque handle to whatever stands on a tile. Owned by the entity layer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Occupant(pub u64);

// ---------------------------------------------------------------------------
// Tile
// ---------------------------------------------------------------------------

/// One cell of the map.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tile<T> {
    /// Position at generation time. Not necessarily unique.
    pub offset: Offset,
    /// Whether actors and sight can pass through.
    pub pass: bool,
    /// Whether the tile is lit/open for field propagation.
    pub lite: bool,
    pub occupant: Option<Occupant>,
    /// Game payload, e.g. a glyph.
    pub data: T,
    adjacent: [Option<TileId>; 8],
}

impl<T> Tile<T> {
    /// A passable, lit tile with no links.
    pub fn new(offset: Offset, data: T) -> Self {
        Self {
            offset,
            pass: true,
            lite: true,
            occupant: None,
            data,
            adjacent: [None; 8],
        }
    }

    /// Builder-style passability.
    pub fn with_pass(mut self, pass: bool) -> Self {
        self.pass = pass;
        self
    }

    /// Builder-style lite flag.
    pub fn with_lite(mut self, lite: bool) -> Self {
        self.lite = lite;
        self
    }

    /// The tile linked in direction `dir`.
    #[inline]
    pub fn adjacent(&self, dir: Direction) -> Option<TileId> {
        self.adjacent[dir.index()]
    }

    /// The tile linked by a unit step. Anything that is not one of the eight
    /// unit steps yields `None`.
    #[inline]
    pub fn neighbor(&self, step: Offset) -> Option<TileId> {
        Direction::from_offset(step).and_then(|dir| self.adjacent(dir))
    }

    /// Existing links in [`Direction`] order.
    pub fn neighbors(&self) -> impl Iterator<Item = (Direction, TileId)> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(|dir| self.adjacent(dir).map(|id| (dir, id)))
    }

    /// Number of existing links.
    pub fn degree(&self) -> usize {
        self.adjacent.iter().filter(|a| a.is_some()).count()
    }
}

// ---------------------------------------------------------------------------
// TileMap
// ---------------------------------------------------------------------------

/// Arena owning every tile of a level.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileMap<T> {
    tiles: Vec<Tile<T>>,
}

impl<T> Default for TileMap<T> {
    fn default() -> Self {
        Self { tiles: Vec::new() }
    }
}

impl<T> TileMap<T> {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tile and return its handle.
    pub fn insert(&mut self, tile: Tile<T>) -> TileId {
        let id = TileId(self.tiles.len() as u32);
        self.tiles.push(tile);
        id
    }

    #[inline]
    pub fn get(&self, id: TileId) -> Option<&Tile<T>> {
        self.tiles.get(id.index())
    }

    #[inline]
    pub fn get_mut(&mut self, id: TileId) -> Option<&mut Tile<T>> {
        self.tiles.get_mut(id.index())
    }

    /// Number of tiles, walls included.
    #[inline]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Insert one tile per cell of `range`, row by row, and link every pair
    /// of cells that touch, diagonals included. Returns the handles in
    /// insertion order.
    pub fn insert_rect(
        &mut self,
        range: Range,
        mut factory: impl FnMut(Offset) -> Tile<T>,
    ) -> Vec<TileId> {
        let ids: Vec<TileId> = range.iter().map(|off| self.insert(factory(off))).collect();
        let width = range.width();
        let at = |off: Offset| {
            if !range.contains(off) {
                return None;
            }
            let rel = off - range.min;
            ids.get((rel.y * width + rel.x) as usize).copied()
        };
        for (off, &id) in range.iter().zip(&ids) {
            for dir in Direction::ALL {
                if let Some(adj) = at(off + dir.offset()) {
                    self.link_one_way(id, dir, adj);
                }
            }
        }
        ids
    }

    /// Handles of every tile in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = TileId> + use<T> {
        (0..self.tiles.len() as u32).map(TileId)
    }

    /// Every tile with its handle, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (TileId, &Tile<T>)> {
        self.tiles
            .iter()
            .enumerate()
            .map(|(i, t)| (TileId(i as u32), t))
    }

    /// The tile reached from `id` by a unit step.
    #[inline]
    pub fn neighbor(&self, id: TileId, step: Offset) -> Option<TileId> {
        self.get(id).and_then(|t| t.neighbor(step))
    }

    /// Existing links of `id` in [`Direction`] order.
    pub fn neighbors(&self, id: TileId) -> impl Iterator<Item = (Direction, TileId)> + '_ {
        self.get(id).into_iter().flat_map(|t| t.neighbors())
    }

    /// Whether `id` exists and is passable.
    #[inline]
    pub fn is_passable(&self, id: TileId) -> bool {
        self.get(id).is_some_and(|t| t.pass)
    }

    /// Link `a` to `b` by `dir` and `b` back to `a`.
    pub fn link(&mut self, a: TileId, dir: Direction, b: TileId) {
        self.link_one_way(a, dir, b);
        self.link_one_way(b, dir.opposite(), a);
    }

    /// Link `a` to `b` by `dir` only. Used for walls.
    pub fn link_one_way(&mut self, a: TileId, dir: Direction, b: TileId) {
        if let Some(tile) = self.get_mut(a) {
            tile.adjacent[dir.index()] = Some(b);
        }
    }

    /// Change passability. Links are left untouched, so the symmetry of
    /// links around the tile is preserved.
    pub fn set_passable(&mut self, id: TileId, pass: bool) {
        if let Some(tile) = self.get_mut(id) {
            tile.pass = pass;
        }
    }

    /// Place or clear the occupant of a tile.
    pub fn set_occupant(&mut self, id: TileId, occupant: Option<Occupant>) {
        if let Some(tile) = self.get_mut(id) {
            tile.occupant = occupant;
        }
    }

    /// Breadth-first traversal through passable tiles, starting at `origin`
    /// (which is always included). Returns handles in visit order.
    pub fn reachable(&self, origin: TileId) -> Vec<TileId> {
        let mut seen = HashSet::from([origin]);
        let mut order = Vec::new();
        let mut queue = VecDeque::from([origin]);
        while let Some(curr) = queue.pop_front() {
            order.push(curr);
            for (_, adj) in self.neighbors(curr) {
                if self.is_passable(adj) && seen.insert(adj) {
                    queue.push_back(adj);
                }
            }
        }
        order
    }
}

impl<T> Index<TileId> for TileMap<T> {
    type Output = Tile<T>;

    #[inline]
    fn index(&self, id: TileId) -> &Tile<T> {
        &self.tiles[id.index()]
    }
}

impl<T> IndexMut<TileId> for TileMap<T> {
    #[inline]
    fn index_mut(&mut self, id: TileId) -> &mut Tile<T> {
        &mut self.tiles[id.index()]
    }
}

// ---------------------------------------------------------------------------
// Level
// ---------------------------------------------------------------------------

/// A generated tile graph and the tile traversals start from.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Level<T> {
    pub tiles: TileMap<T>,
    pub origin: TileId,
}

impl<T> Level<T> {
    /// The origin tile.
    #[inline]
    pub fn origin_tile(&self) -> &Tile<T> {
        &self.tiles[self.origin]
    }
}

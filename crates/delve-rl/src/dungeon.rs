//! Room-and-corridor dungeons.
//!
//! The layout starts as a braid [`AbstractGraph`]: every node becomes a
//! rectangular room placed at random inside its own grid cell, and every
//! edge becomes an L- or Z-shaped corridor with a door at each end.

use std::collections::{HashMap, HashSet, VecDeque};

use delve_core::{Dice, Direction, Level, Offset, Range, Tile, TileId, TileMap};
use rand::Rng;

use crate::materialize::{add_walls, connect_diagonals};
use crate::maze::{AbstractGraph, NodeId};

/// What a dungeon cell is, passed to the tile factory.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TileType {
    Room,
    Corridor,
    Wall,
    Door,
}

impl TileType {
    #[inline]
    pub fn is_passable(self) -> bool {
        !matches!(self, TileType::Wall)
    }
}

/// Parameters for [`dungeon`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DungeonConfig {
    /// Number of rooms before dead-end pruning.
    pub rooms: usize,
    /// Smallest room side, walls included. Raised to 3 if lower.
    pub min_room_size: i32,
    /// Largest room side, walls included. Raised to `min_room_size` if lower.
    pub max_room_size: i32,
}

impl Default for DungeonConfig {
    fn default() -> Self {
        Self {
            rooms: 12,
            min_room_size: 5,
            max_room_size: 9,
        }
    }
}

impl DungeonConfig {
    /// Room side bounds after clamping. A room needs at least one interior
    /// cell.
    pub fn room_sizes(&self) -> (i32, i32) {
        let min = self.min_room_size.max(3);
        (min, self.max_room_size.max(min))
    }
}

/// `.` rooms and corridors, `+` doors, `#` walls.
pub fn default_dungeon_tile(offset: Offset, kind: TileType) -> Tile<char> {
    let glyph = match kind {
        TileType::Room | TileType::Corridor => '.',
        TileType::Door => '+',
        TileType::Wall => '#',
    };
    let pass = kind.is_passable();
    Tile::new(offset, glyph).with_pass(pass).with_lite(pass)
}

struct Room {
    /// Outline, walls included.
    bounds: Range,
    /// Interior tiles.
    tiles: Vec<TileId>,
}

/// Generate a dungeon level. The origin is a room tile.
pub fn dungeon<T, R: Rng>(
    config: &DungeonConfig,
    dice: &mut Dice<R>,
    mut factory: impl FnMut(Offset, TileType) -> Tile<T>,
) -> Level<T> {
    let (min_size, max_size) = config.room_sizes();
    let mut graph = AbstractGraph::grow(config.rooms, 0.25, 0.0, dice);
    graph.remove_dead_ends(1.0, dice);

    let grid = min_size + max_size;
    let mut map = TileMap::new();
    let mut rooms: HashMap<NodeId, Room> = HashMap::new();
    let order: Vec<NodeId> = graph.ids().collect();

    for &id in &order {
        let Some(node) = graph.node(id) else {
            continue;
        };
        let w = dice.range(min_size, max_size);
        let h = dice.range(min_size, max_size);
        let x = dice.range(grid * node.pos.x, grid * (node.pos.x + 1) - w - 1);
        let y = dice.range(grid * node.pos.y, grid * (node.pos.y + 1) - h - 1);
        let bounds = Range::with_size(x, y, w, h);
        rooms.insert(
            id,
            Room {
                bounds,
                tiles: Vec::new(),
            },
        );
    }
    for &id in &order {
        if let Some(room) = rooms.get_mut(&id) {
            let interior = Range::with_size(
                room.bounds.min.x + 1,
                room.bounds.min.y + 1,
                room.bounds.width() - 2,
                room.bounds.height() - 2,
            );
            room.tiles = map.insert_rect(interior, |off| factory(off, TileType::Room));
        }
    }

    let mut corridors = 0;
    if let Some(start) = graph.arbitrary_node() {
        let mut frontier = VecDeque::from([start]);
        let mut enqueued = HashSet::from([start]);
        let mut closed = HashSet::new();
        while let Some(curr) = frontier.pop_front() {
            if !closed.insert(curr) {
                continue;
            }
            let Some(node) = graph.node(curr) else {
                continue;
            };
            for (dir, adj) in node.edges() {
                if closed.contains(&adj) {
                    continue;
                }
                if enqueued.insert(adj) {
                    frontier.push_back(adj);
                }
                let (Some(src), Some(dst)) = (rooms.get(&curr), rooms.get(&adj)) else {
                    continue;
                };
                let cells = if dir.offset().x != 0 {
                    corridor_x(src.bounds, dst.bounds, dice)
                } else {
                    corridor_y(src.bounds, dst.bounds, dice)
                };
                let tiles: Vec<TileId> = cells
                    .into_iter()
                    .map(|(off, kind)| map.insert(factory(off, kind)))
                    .collect();
                let (Some(&first), Some(&last)) = (tiles.first(), tiles.last()) else {
                    continue;
                };
                connect_door(&mut map, &src.tiles, first);
                connect_door(&mut map, &dst.tiles, last);
                for pair in tiles.windows(2) {
                    let step = map[pair[1]].offset - map[pair[0]].offset;
                    if let Some(dir) = Direction::from_offset(step) {
                        map.link(pair[0], dir, pair[1]);
                    }
                }
                corridors += 1;
            }
        }
    }

    let origin = match order
        .iter()
        .find_map(|id| rooms.get(id).and_then(|r| r.tiles.first().copied()))
    {
        Some(origin) => origin,
        None => map.insert(factory(Offset::ZERO, TileType::Room)),
    };
    connect_diagonals(&mut map, origin);
    let walls = add_walls(&mut map, origin, |off| factory(off, TileType::Wall));

    log::debug!(
        "dungeon: {} rooms, {} corridors, {} tiles ({} walls)",
        rooms.len(),
        corridors,
        map.len(),
        walls
    );
    Level { tiles: map, origin }
}

/// Link `door` to every room tile touching it.
fn connect_door<T>(map: &mut TileMap<T>, room: &[TileId], door: TileId) {
    for &tile in room {
        let step = map[door].offset - map[tile].offset;
        if step.chebyshev() == 1 {
            if let Some(dir) = Direction::from_offset(step) {
                map.link(tile, dir, door);
            }
        }
    }
}

/// Cells of a corridor between two rooms side by side, from the door of
/// `src` to the door of `dst`.
///
/// The corridor leaves `src` horizontally, turns at a column between the
/// rooms, and enters `dst` horizontally. When the rooms share enough rows
/// it may run straight.
fn corridor_x<R: Rng>(src: Range, dst: Range, dice: &mut Dice<R>) -> Vec<(Offset, TileType)> {
    let min_y = src.min.y.max(dst.min.y) + 1;
    let max_y = src.max.y.min(dst.max.y) - 2;
    let (mut y, dst_y) = if min_y < max_y && dice.coinflip() {
        let y = dice.range(min_y, max_y);
        (y, y)
    } else {
        (
            dice.range(src.min.y + 1, src.max.y - 2),
            dice.range(dst.min.y + 1, dst.max.y - 2),
        )
    };

    let (mut x, dst_x) = (src.center().x, dst.center().x);
    let inside = |x: i32| src.contains_x(x) || dst.contains_x(x);
    let mut mid_x = (x + dst_x).div_euclid(2);
    if inside(mid_x) {
        mid_x = (src.max.x + dst.min.x).div_euclid(2);
    }
    if inside(mid_x) {
        mid_x = (src.min.x + dst.max.x).div_euclid(2);
    }

    let mut cells = Vec::new();
    while x != mid_x {
        let next = x + (mid_x - x).signum();
        if !src.contains_x(x) {
            cells.push((Offset::new(x, y), TileType::Corridor));
        } else if !src.contains_x(next) {
            cells.push((Offset::new(x, y), TileType::Door));
        }
        x = next;
    }
    cells.push((Offset::new(x, y), TileType::Corridor));

    while y != dst_y {
        y += (dst_y - y).signum();
        cells.push((Offset::new(x, y), TileType::Corridor));
    }

    while x != dst_x {
        x += (dst_x - x).signum();
        if dst.contains_x(x) {
            cells.push((Offset::new(x, y), TileType::Door));
            break;
        }
        cells.push((Offset::new(x, y), TileType::Corridor));
    }
    cells
}

/// [`corridor_x`] for rooms stacked vertically.
fn corridor_y<R: Rng>(src: Range, dst: Range, dice: &mut Dice<R>) -> Vec<(Offset, TileType)> {
    corridor_x(src.transpose(), dst.transpose(), dice)
        .into_iter()
        .map(|(off, kind)| (off.transpose(), kind))
        .collect()
}

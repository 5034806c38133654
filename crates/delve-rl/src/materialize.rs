//! Turning abstract layouts into tile graphs.
//!
//! Generators first lay out passable tiles with orthogonal links only.
//! [`connect_diagonals`] then adds the diagonal links implied by two
//! orthogonal hops, and [`add_walls`] closes every open side with an
//! impassable tile.

use std::collections::{HashMap, HashSet, VecDeque};

use delve_core::{Direction, Level, Offset, Tile, TileId, TileMap};

use crate::maze::{AbstractGraph, NodeId};

/// Materialize `graph` into a walled [`Level`].
///
/// Node `n` becomes a passable tile at `2 * n.pos`, every edge a passable
/// tile at the midpoint between its two nodes, and each remaining side a
/// wall. `factory(offset, pass)` builds every tile.
pub fn materialize<T>(
    graph: &AbstractGraph,
    mut factory: impl FnMut(Offset, bool) -> Tile<T>,
) -> Level<T> {
    let mut tiles = TileMap::new();
    let origin = create_pass_tiles(graph, &mut tiles, &mut factory);
    connect_diagonals(&mut tiles, origin);
    let walls = add_walls(&mut tiles, origin, |off| factory(off, false));
    log::debug!(
        "materialized {} nodes and {} edges into {} tiles ({} walls)",
        graph.len(),
        graph.edge_count(),
        tiles.len(),
        walls
    );
    Level { tiles, origin }
}

/// Insert the passable tiles of `graph` into `map`, linked orthogonally,
/// and return the tile of an arbitrary node.
///
/// An empty graph yields a single open tile at the origin.
pub fn create_pass_tiles<T>(
    graph: &AbstractGraph,
    map: &mut TileMap<T>,
    factory: &mut impl FnMut(Offset, bool) -> Tile<T>,
) -> TileId {
    let Some(start) = graph.arbitrary_node() else {
        return map.insert(factory(Offset::ZERO, true));
    };

    let mut node_tiles: HashMap<NodeId, TileId> = HashMap::new();
    let origin = match graph.node(start) {
        Some(node) => node_tile(map, &mut node_tiles, factory, start, node.pos),
        None => return map.insert(factory(Offset::ZERO, true)),
    };

    let mut visited = HashSet::from([start]);
    let mut stack = vec![start];
    while let Some(curr) = stack.pop() {
        let Some(node) = graph.node(curr) else {
            continue;
        };
        let tile = node_tile(map, &mut node_tiles, factory, curr, node.pos);
        for (dir, adj) in node.edges() {
            // Each edge is seen from both ends; the first one builds it.
            if map[tile].adjacent(dir).is_none() {
                let Some(adj_node) = graph.node(adj) else {
                    continue;
                };
                let edge_tile = map.insert(factory(node.pos * 2 + dir.offset(), true));
                let adj_tile = node_tile(map, &mut node_tiles, factory, adj, adj_node.pos);
                map.link(tile, dir, edge_tile);
                map.link(edge_tile, dir, adj_tile);
            }
            if visited.insert(adj) {
                stack.push(adj);
            }
        }
    }
    origin
}

/// The tile of node `id`, created on first use.
fn node_tile<T>(
    map: &mut TileMap<T>,
    node_tiles: &mut HashMap<NodeId, TileId>,
    factory: &mut impl FnMut(Offset, bool) -> Tile<T>,
    id: NodeId,
    pos: Offset,
) -> TileId {
    *node_tiles
        .entry(id)
        .or_insert_with(|| map.insert(factory(pos * 2, true)))
}

/// Add the diagonal link for every pair of orthogonal hops that turn a
/// corner, walking the tiles reachable orthogonally from `origin`.
pub fn connect_diagonals<T>(map: &mut TileMap<T>, origin: TileId) {
    let mut visited = HashSet::from([origin]);
    let mut queue = VecDeque::from([origin]);
    while let Some(curr) = queue.pop_front() {
        for first in Direction::ORTHOGONAL {
            let Some(adj) = map[curr].adjacent(first) else {
                continue;
            };
            for second in Direction::ORTHOGONAL {
                let Some(corner) = map[adj].adjacent(second) else {
                    continue;
                };
                if let Some(diag) = Direction::from_offset(first.offset() + second.offset()) {
                    if diag.is_diagonal() {
                        map.link(curr, diag, corner);
                    }
                }
            }
            if visited.insert(adj) {
                queue.push_back(adj);
            }
        }
    }
}

/// Give every passable tile reachable from `origin` a link in all eight
/// directions, creating walls with `wall` where nothing is linked. Returns
/// the number of walls created.
///
/// A wall already placed next to a neighbor is reused, so corners are
/// shared. Walls are linked one way, from the open tile.
pub fn add_walls<T>(
    map: &mut TileMap<T>,
    origin: TileId,
    mut wall: impl FnMut(Offset) -> Tile<T>,
) -> usize {
    let mut created = 0;
    let mut visited = HashSet::from([origin]);
    let mut queue = VecDeque::from([origin]);
    while let Some(curr) = queue.pop_front() {
        for dir in Direction::ALL {
            if let Some(adj) = map[curr].adjacent(dir) {
                if map.is_passable(adj) && visited.insert(adj) {
                    queue.push_back(adj);
                }
                continue;
            }

            let target = map[curr].offset + dir.offset();
            match find_wall(map, curr, target) {
                Some(found) if map.is_passable(found) => {
                    map.link(curr, dir, found);
                    if visited.insert(found) {
                        queue.push_back(found);
                    }
                }
                Some(found) => map.link_one_way(curr, dir, found),
                None => {
                    let id = map.insert(wall(target));
                    map.link_one_way(curr, dir, id);
                    created += 1;
                }
            }
        }
    }
    created
}

/// A tile already at `target`, found through the links of `curr`'s
/// neighbors.
fn find_wall<T>(map: &TileMap<T>, curr: TileId, target: Offset) -> Option<TileId> {
    map.neighbors(curr)
        .find_map(|(_, adj)| map.neighbor(adj, target - map[adj].offset))
}

//! Maze generation on an abstract graph.
//!
//! Mazes are grown as an [`AbstractGraph`] of nodes on an integer lattice
//! and only then turned into tiles (see [`crate::materialize`]). Keeping the
//! two apart lets the same graph drive both mazes and dungeon layouts.
//!
//! - **Growing tree**: [`AbstractGraph::grow`] yields a perfect maze, one
//!   path between any two nodes.
//! - **Dead-end removal**: [`AbstractGraph::remove_dead_ends`] turns some or
//!   all dead ends into loops, giving half-braid and braid mazes.

use std::collections::{HashMap, HashSet};

use delve_core::{Dice, Direction, Level, Offset, Tile};
use rand::Rng;

use crate::materialize::materialize;

/// Index of a node inside its [`AbstractGraph`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// A lattice position and its edges, indexed by [`Direction`].
#[derive(Clone, Debug, PartialEq)]
pub struct AbstractNode {
    pub pos: Offset,
    edges: [Option<NodeId>; 8],
    alive: bool,
}

impl AbstractNode {
    fn new(pos: Offset) -> Self {
        Self {
            pos,
            edges: [None; 8],
            alive: true,
        }
    }

    /// The node across the edge in `dir`.
    #[inline]
    pub fn edge(&self, dir: Direction) -> Option<NodeId> {
        self.edges[dir.index()]
    }

    /// Existing edges in [`Direction`] order.
    pub fn edges(&self) -> impl Iterator<Item = (Direction, NodeId)> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(|dir| self.edge(dir).map(|n| (dir, n)))
    }

    pub fn degree(&self) -> usize {
        self.edges.iter().filter(|e| e.is_some()).count()
    }
}

/// Pre-tile maze graph.
///
/// Several nodes may share a position (weave mazes), so positions map to a
/// list of nodes. Removed nodes stay in the arena but are skipped by every
/// query.
#[derive(Clone, Debug, PartialEq)]
pub struct AbstractGraph {
    nodes: Vec<AbstractNode>,
    by_pos: HashMap<Offset, Vec<NodeId>>,
}

impl Default for AbstractGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl AbstractGraph {
    /// A graph holding a single node at [`Offset::ZERO`].
    pub fn new() -> Self {
        let mut graph = Self {
            nodes: Vec::new(),
            by_pos: HashMap::new(),
        };
        graph.add_node(Offset::ZERO);
        graph
    }

    /// Add an unconnected node at `pos`.
    pub fn add_node(&mut self, pos: Offset) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(AbstractNode::new(pos));
        self.by_pos.entry(pos).or_default().push(id);
        id
    }

    /// A live node, or `None` for removed or unknown handles.
    pub fn node(&self, id: NodeId) -> Option<&AbstractNode> {
        self.nodes.get(id.0).filter(|n| n.alive)
    }

    /// Live nodes at `pos`.
    pub fn nodes_at(&self, pos: Offset) -> &[NodeId] {
        self.by_pos.get(&pos).map(Vec::as_slice).unwrap_or_default()
    }

    /// Whether any live node sits at `pos`.
    pub fn is_occupied(&self, pos: Offset) -> bool {
        !self.nodes_at(pos).is_empty()
    }

    /// Live node handles in creation order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.alive)
            .map(|(i, _)| NodeId(i))
    }

    /// Some live node. Stable for a given graph but otherwise unspecified.
    pub fn arbitrary_node(&self) -> Option<NodeId> {
        self.ids().next()
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.ids().count()
    }

    pub fn is_empty(&self) -> bool {
        self.arbitrary_node().is_none()
    }

    /// Number of undirected edges between live nodes.
    pub fn edge_count(&self) -> usize {
        self.ids()
            .filter_map(|id| self.node(id))
            .map(AbstractNode::degree)
            .sum::<usize>()
            / 2
    }

    pub fn degree(&self, id: NodeId) -> usize {
        self.node(id).map_or(0, AbstractNode::degree)
    }

    /// Live nodes with exactly one edge.
    pub fn dead_ends(&self) -> Vec<NodeId> {
        self.ids().filter(|&id| self.degree(id) == 1).collect()
    }

    /// Join `a` to `b` across `dir` and `b` back to `a`.
    pub fn connect(&mut self, a: NodeId, dir: Direction, b: NodeId) {
        self.nodes[a.0].edges[dir.index()] = Some(b);
        self.nodes[b.0].edges[dir.opposite().index()] = Some(a);
    }

    /// Delete a node and every edge pointing at it. Returns the former
    /// neighbors.
    pub fn remove(&mut self, id: NodeId) -> Vec<NodeId> {
        let Some(node) = self.nodes.get_mut(id.0) else {
            return Vec::new();
        };
        node.alive = false;
        let pos = node.pos;
        let edges: Vec<(Direction, NodeId)> = node.edges().collect();
        node.edges = [None; 8];

        if let Some(list) = self.by_pos.get_mut(&pos) {
            list.retain(|&n| n != id);
            if list.is_empty() {
                self.by_pos.remove(&pos);
            }
        }
        for &(dir, adj) in &edges {
            self.nodes[adj.0].edges[dir.opposite().index()] = None;
        }
        edges.into_iter().map(|(_, adj)| adj).collect()
    }

    /// Grow a perfect maze of `n` nodes with the growing-tree algorithm.
    ///
    /// Each round picks a frontier node: the newest one with probability
    /// `run_prob` (long corridors), a uniform one otherwise (branching). It
    /// extends through an unused orthogonal edge towards a free position;
    /// with probability `weave_prob` an occupied position is accepted too,
    /// which lets corridors cross. Nodes that cannot extend leave the
    /// frontier.
    pub fn grow<R: Rng>(n: usize, run_prob: f64, weave_prob: f64, dice: &mut Dice<R>) -> Self {
        let mut graph = Self::new();
        let mut frontier = vec![NodeId(0)];
        let mut added = 1;

        while added < n && !frontier.is_empty() {
            let index = if dice.chance(run_prob) {
                frontier.len() - 1
            } else {
                dice.below(frontier.len())
            };
            let curr = frontier[index];
            let node = &graph.nodes[curr.0];

            let mut candidates = Vec::with_capacity(4);
            for dir in Direction::ORTHOGONAL {
                let used = node.edge(dir).is_some();
                let target = node.pos + dir.offset();
                if !used && (!graph.is_occupied(target) || dice.chance(weave_prob)) {
                    candidates.push(dir);
                }
            }

            match dice.choose(&candidates).copied() {
                Some(dir) => {
                    let pos = graph.nodes[curr.0].pos + dir.offset();
                    let adj = graph.add_node(pos);
                    graph.connect(curr, dir, adj);
                    frontier.push(adj);
                    added += 1;
                }
                None => {
                    frontier.remove(index);
                }
            }
        }
        graph
    }

    /// Remove dead ends, each with probability `loop_prob`.
    ///
    /// A dead end is joined to an adjacent node that has the facing edge
    /// free, closing a loop. If there is none, the dead end is deleted and
    /// its neighbor is examined in turn. `loop_prob = 1` leaves no dead ends
    /// (a single remaining node is not a dead end).
    pub fn remove_dead_ends<R: Rng>(&mut self, loop_prob: f64, dice: &mut Dice<R>) {
        let mut dead_ends = self.collect_dead_ends();
        let mut pruned = 0;
        let mut looped = 0;

        while let Some(dead_end) = dead_ends.pop() {
            // It may have gained an edge as someone else's loop.
            if self.degree(dead_end) != 1 {
                continue;
            }
            if !dice.chance(loop_prob) {
                continue;
            }

            let Some(node) = self.node(dead_end) else {
                continue;
            };
            let mut candidates = Vec::new();
            for dir in Direction::ORTHOGONAL {
                if node.edge(dir).is_some() {
                    continue;
                }
                let back = dir.opposite();
                for &adj in self.nodes_at(node.pos + dir.offset()) {
                    if self.nodes[adj.0].edge(back).is_none() {
                        candidates.push((dir, adj));
                    }
                }
            }

            match dice.choose(&candidates).copied() {
                Some((dir, adj)) => {
                    self.connect(dead_end, dir, adj);
                    looped += 1;
                }
                None => {
                    for adj in self.remove(dead_end) {
                        if self.degree(adj) == 1 {
                            dead_ends.push(adj);
                        }
                    }
                    pruned += 1;
                }
            }
        }

        log::debug!(
            "dead-end removal: {} loops closed, {} nodes pruned, {} nodes left",
            looped,
            pruned,
            self.len()
        );
    }

    /// Dead ends in depth-first order from an arbitrary node.
    fn collect_dead_ends(&self) -> Vec<NodeId> {
        let Some(start) = self.arbitrary_node() else {
            return Vec::new();
        };
        let mut dead_ends = Vec::new();
        let mut visited = HashSet::from([start]);
        let mut stack = vec![start];
        while let Some(curr) = stack.pop() {
            let Some(node) = self.node(curr) else {
                continue;
            };
            if node.degree() == 1 {
                dead_ends.push(curr);
            }
            for (_, adj) in node.edges() {
                if visited.insert(adj) {
                    stack.push(adj);
                }
            }
        }
        dead_ends
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Parameters for [`maze`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MazeConfig {
    /// Size of the abstract graph. The tile count is roughly twice this.
    pub nodes: usize,
    /// Chance to keep extending the newest corridor rather than branching.
    pub run_prob: f64,
    /// Chance to let a corridor cross an existing one.
    pub weave_prob: f64,
    /// Chance to turn each dead end into a loop.
    pub loop_prob: f64,
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            nodes: 100,
            run_prob: 0.5,
            weave_prob: 0.0,
            loop_prob: 0.0,
        }
    }
}

impl MazeConfig {
    /// No loops: exactly one path between any two cells.
    pub fn perfect(nodes: usize) -> Self {
        Self {
            nodes,
            ..Self::default()
        }
    }

    /// No dead ends.
    pub fn braid(nodes: usize) -> Self {
        Self {
            nodes,
            loop_prob: 1.0,
            ..Self::default()
        }
    }

    /// Some dead ends, some loops.
    pub fn half_braid(nodes: usize, loop_prob: f64) -> Self {
        Self {
            nodes,
            loop_prob,
            ..Self::default()
        }
    }

    /// The abstract graph for this configuration.
    pub fn graph<R: Rng>(&self, dice: &mut Dice<R>) -> AbstractGraph {
        let mut graph = AbstractGraph::grow(self.nodes, self.run_prob, self.weave_prob, dice);
        graph.remove_dead_ends(self.loop_prob, dice);
        graph
    }
}

// ---------------------------------------------------------------------------
// Maze levels
// ---------------------------------------------------------------------------

/// Plain glyph tiles: `.` floors and `#` walls. Walls are neither
/// passable nor lit.
pub fn default_maze_tile(offset: Offset, pass: bool) -> Tile<char> {
    let glyph = if pass { '.' } else { '#' };
    Tile::new(offset, glyph).with_pass(pass).with_lite(pass)
}

/// Build a maze level. `factory` receives each cell's offset and whether
/// it is open.
pub fn maze<T, R: Rng>(
    config: &MazeConfig,
    dice: &mut Dice<R>,
    factory: impl FnMut(Offset, bool) -> Tile<T>,
) -> Level<T> {
    let graph = config.graph(dice);
    materialize(&graph, factory)
}

/// A perfect maze of [`default_maze_tile`]s.
pub fn perfect_maze<R: Rng>(
    nodes: usize,
    run_prob: f64,
    weave_prob: f64,
    dice: &mut Dice<R>,
) -> Level<char> {
    let config = MazeConfig {
        run_prob,
        weave_prob,
        ..MazeConfig::perfect(nodes)
    };
    maze(&config, dice, default_maze_tile)
}

/// A braid maze of [`default_maze_tile`]s.
pub fn braid_maze<R: Rng>(
    nodes: usize,
    run_prob: f64,
    weave_prob: f64,
    dice: &mut Dice<R>,
) -> Level<char> {
    let config = MazeConfig {
        run_prob,
        weave_prob,
        ..MazeConfig::braid(nodes)
    };
    maze(&config, dice, default_maze_tile)
}

/// A half-braid maze of [`default_maze_tile`]s.
pub fn half_braid_maze<R: Rng>(
    nodes: usize,
    run_prob: f64,
    weave_prob: f64,
    loop_prob: f64,
    dice: &mut Dice<R>,
) -> Level<char> {
    let config = MazeConfig {
        run_prob,
        weave_prob,
        ..MazeConfig::half_braid(nodes, loop_prob)
    };
    maze(&config, dice, default_maze_tile)
}

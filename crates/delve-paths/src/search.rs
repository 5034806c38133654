use std::collections::hash_map::Entry;
use std::collections::{BinaryHeap, HashMap};

use delve_core::{TileId, TileMap};

use crate::distance::{Euclidean, Zero};
use crate::traits::{Cost, Heuristic};

/// Per-tile bookkeeping, created the first time a tile is reached.
struct Score {
    g: f64,
    h: f64,
    parent: Option<TileId>,
    closed: bool,
}

/// Frontier entry, ordered by `f` for use in `BinaryHeap`.
#[derive(Clone, Copy)]
struct NodeRef {
    id: TileId,
    f: f64,
}

impl PartialEq for NodeRef {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl Eq for NodeRef {}

impl Ord for NodeRef {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Reverse so BinaryHeap (max-heap) pops smallest f first, then the
        // oldest tile.
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for NodeRef {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Best-first search from `origin` to `goal`.
///
/// Only passable tiles are entered. The returned path starts with the first
/// step and ends with `goal`; `origin` itself is not included, so
/// `origin == goal` yields `Some(vec![])`. `None` means `goal` cannot be
/// reached.
///
/// With an admissible `heuristic` the path has minimal total `cost`.
pub fn graph_search<T, C, H>(
    map: &TileMap<T>,
    origin: TileId,
    goal: TileId,
    cost: &C,
    heuristic: &H,
) -> Option<Vec<TileId>>
where
    C: Cost<T> + ?Sized,
    H: Heuristic<T> + ?Sized,
{
    let origin_tile = map.get(origin)?;
    let goal_tile = map.get(goal)?;

    let mut scores: HashMap<TileId, Score> = HashMap::new();
    let h = heuristic.estimate(origin_tile, goal_tile);
    scores.insert(
        origin,
        Score {
            g: 0.0,
            h,
            parent: None,
            closed: false,
        },
    );

    let mut open = BinaryHeap::new();
    open.push(NodeRef { id: origin, f: h });

    let found = 'search: loop {
        let Some(current) = open.pop() else {
            break 'search false;
        };
        let Some(score) = scores.get_mut(&current.id) else {
            continue;
        };
        if score.closed {
            continue;
        }
        score.closed = true;

        if current.id == goal {
            break 'search true;
        }

        let current_g = score.g;
        let current_tile = &map[current.id];
        for (_, adj) in current_tile.neighbors() {
            let adj_tile = &map[adj];
            if !adj_tile.pass {
                continue;
            }
            let entry = match scores.entry(adj) {
                Entry::Occupied(e) => e.into_mut(),
                Entry::Vacant(e) => e.insert(Score {
                    g: f64::INFINITY,
                    h: heuristic.estimate(adj_tile, goal_tile),
                    parent: None,
                    closed: false,
                }),
            };
            if entry.closed {
                continue;
            }
            let tentative_g = current_g + cost.cost(current_tile, adj_tile);
            if tentative_g < entry.g {
                entry.g = tentative_g;
                entry.parent = Some(current.id);
                open.push(NodeRef {
                    id: adj,
                    f: tentative_g + entry.h,
                });
            }
        }
    };

    log::trace!(
        "graph search {:?} -> {:?}: {} tiles scored, found={}",
        origin,
        goal,
        scores.len(),
        found
    );

    if !found {
        return None;
    }

    // Reconstruct path.
    let mut path = Vec::new();
    let mut ci = goal;
    while let Some(parent) = scores.get(&ci).and_then(|s| s.parent) {
        path.push(ci);
        ci = parent;
    }
    path.reverse();
    Some(path)
}

/// Minimum-cost path, moving and estimating by Euclidean distance.
pub fn astar_path<T>(map: &TileMap<T>, origin: TileId, goal: TileId) -> Option<Vec<TileId>> {
    graph_search(map, origin, goal, &Euclidean, &Euclidean)
}

/// Heuristic-only path: fast, not necessarily shortest.
pub fn greedy_path<T>(map: &TileMap<T>, origin: TileId, goal: TileId) -> Option<Vec<TileId>> {
    graph_search(map, origin, goal, &Zero, &Euclidean)
}

/// A cost model and heuristic bundled into a reusable search.
#[derive(Clone, Debug, Default)]
pub struct GraphSearch<C, H> {
    pub cost: C,
    pub heuristic: H,
}

impl<C, H> GraphSearch<C, H> {
    pub fn new(cost: C, heuristic: H) -> Self {
        Self { cost, heuristic }
    }

    /// Run [`graph_search`] with this cost and heuristic.
    pub fn path<T>(&self, map: &TileMap<T>, origin: TileId, goal: TileId) -> Option<Vec<TileId>>
    where
        C: Cost<T>,
        H: Heuristic<T>,
    {
        graph_search(map, origin, goal, &self.cost, &self.heuristic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testgrid::AsciiGrid;
    use delve_core::{Offset, Tile};
    use std::collections::HashSet;

    /// Runs `search` from `@` to `$`. The expected path is the set of `x`
    /// cells plus `$`, or no path at all when the grid has no `x`.
    fn run_case(lines: &[&str], search: impl Fn(&TileMap<char>, TileId, TileId) -> Option<Vec<TileId>>) {
        let grid = AsciiGrid::parse(lines);
        let origin = grid.first('@');
        let goal = grid.first('$');
        let expected: HashSet<TileId> = grid.find(|c| c == 'x' || c == '$').into_iter().collect();
        let has_path = expected.len() > 1;

        let actual = search(&grid.map, origin, goal);
        if !has_path {
            assert_eq!(actual, None, "expected no path in {lines:?}");
            return;
        }
        let path = actual.unwrap_or_else(|| panic!("expected a path in {lines:?}"));
        assert_eq!(path.len(), expected.len(), "path length in {lines:?}");
        assert_eq!(path.last(), Some(&goal));
        let mut prev = origin;
        for &step in &path {
            assert!(expected.contains(&step), "unexpected step {}", grid.map[step].offset);
            let delta = grid.map[step].offset - grid.map[prev].offset;
            assert_eq!(grid.map.neighbor(prev, delta), Some(step));
            prev = step;
        }
    }

    const DIAGONAL: [&str; 7] = [
        "#######", //
        "#$....#", //
        "#.x...#", //
        "#..x..#", //
        "#...x.#", //
        "#....@#", //
        "#######",
    ];

    const WALLED_OFF: [&str; 7] = [
        "#######", //
        "#$....#", //
        "#######", //
        "#.....#", //
        "#.....#", //
        "#....@#", //
        "#######",
    ];

    const ZIGZAG: [&str; 7] = [
        "########", //
        "#$xxx..#", //
        "#####x.#", //
        "#...x..#", //
        "#..x####", //
        "#...xx@#", //
        "########",
    ];

    #[test]
    fn astar_cases() {
        let long_way = [
            "###########",
            "#.xxx$....#",
            "#x#######.#",
            "#x###...#.#",
            "#x###.#.#.#",
            "#x###.#.#.#",
            "#x###.#.#.#",
            "#x###@#.#.#",
            "#.xxx.#...#",
            "###########",
        ];
        let cases: [&[&str]; 4] = [&DIAGONAL, &WALLED_OFF, &ZIGZAG, &long_way];
        for case in cases {
            run_case(case, |m, o, g| astar_path(m, o, g));
        }
    }

    #[test]
    fn greedy_cases() {
        let cases: [&[&str]; 3] = [&DIAGONAL, &WALLED_OFF, &ZIGZAG];
        for case in cases {
            run_case(case, |m, o, g| greedy_path(m, o, g));
        }
    }

    #[test]
    fn custom_cost_forbids_diagonals() {
        let orthogonal = |a: &Tile<char>, b: &Tile<char>| {
            let delta = b.offset - a.offset;
            if delta.is_diagonal() {
                f64::INFINITY
            } else {
                delta.euclidean()
            }
        };
        let search = GraphSearch::new(orthogonal, Euclidean);
        let cases: [&[&str]; 3] = [
            &WALLED_OFF,
            &[
                "########",
                "#$xxxx.#",
                "#####x.#",
                "#..xxx.#",
                "#..x####",
                "#..xxx@#",
                "########",
            ],
            &[
                "###########",
                "#xxxx$....#",
                "#x#######.#",
                "#x###...#.#",
                "#x###.#.#.#",
                "#x###.#.#.#",
                "#xxxx@#...#",
                "###########",
            ],
        ];
        for case in cases {
            run_case(case, |m, o, g| search.path(m, o, g));
        }
    }

    #[test]
    fn origin_is_goal_gives_empty_path() {
        let grid = AsciiGrid::parse(&DIAGONAL);
        let origin = grid.first('@');
        assert_eq!(astar_path(&grid.map, origin, origin), Some(vec![]));
    }

    #[test]
    fn impassable_goal_is_unreachable() {
        let grid = AsciiGrid::parse(&DIAGONAL);
        let origin = grid.first('@');
        assert_eq!(astar_path(&grid.map, origin, grid.at(0, 0)), None);
    }

    /// Plain Dijkstra over the same graph, returning the cheapest cost.
    fn brute_force_cost(map: &TileMap<char>, origin: TileId, goal: TileId) -> Option<f64> {
        let mut dist: HashMap<TileId, f64> = HashMap::from([(origin, 0.0)]);
        let mut done: HashSet<TileId> = HashSet::new();
        loop {
            let next = dist
                .iter()
                .filter(|(id, _)| !done.contains(*id))
                .min_by(|a, b| a.1.total_cmp(b.1))
                .map(|(&id, &d)| (id, d));
            let (curr, d) = next?;
            if curr == goal {
                return Some(d);
            }
            done.insert(curr);
            for (_, adj) in map.neighbors(curr) {
                if !map.is_passable(adj) {
                    continue;
                }
                let step = (map[adj].offset - map[curr].offset).euclidean();
                let best = dist.entry(adj).or_insert(f64::INFINITY);
                if d + step < *best {
                    *best = d + step;
                }
            }
        }
    }

    fn path_cost(map: &TileMap<char>, origin: TileId, path: &[TileId]) -> f64 {
        let mut prev = map[origin].offset;
        let mut total = 0.0;
        for &id in path {
            let off: Offset = map[id].offset;
            total += (off - prev).euclidean();
            prev = off;
        }
        total
    }

    #[test]
    fn astar_matches_brute_force_on_7x7() {
        let cases: [[&str; 7]; 3] = [
            [
                "#######", //
                "#.....#", //
                "#.....#", //
                "#.....#", //
                "#.....#", //
                "#.....#", //
                "#######",
            ],
            [
                "#######", //
                "#.....#", //
                "#.###.#", //
                "#.#...#", //
                "#.#.#.#", //
                "#...#.#", //
                "#######",
            ],
            [
                "#######", //
                "#.....#", //
                "####..#", //
                "#.....#", //
                "#..####", //
                "#.....#", //
                "#######",
            ],
        ];
        for case in cases {
            let grid = AsciiGrid::parse(&case);
            let origin = grid.at(5, 5);
            let goal = grid.at(1, 1);
            let path = astar_path(&grid.map, origin, goal).expect("connected grid");
            let expected = brute_force_cost(&grid.map, origin, goal).expect("connected grid");
            let actual = path_cost(&grid.map, origin, &path);
            assert!((actual - expected).abs() < 1e-6, "{actual} vs {expected}");
        }
    }

    #[test]
    fn open_7x7_takes_the_diagonal() {
        let grid = AsciiGrid::parse(&[
            "#######", //
            "#.....#", //
            "#.....#", //
            "#.....#", //
            "#.....#", //
            "#.....#", //
            "#######",
        ]);
        let path = astar_path(&grid.map, grid.at(5, 5), grid.at(1, 1)).unwrap();
        let offsets: Vec<_> = path.iter().map(|&id| grid.map[id].offset).collect();
        assert_eq!(
            offsets,
            vec![
                Offset::new(4, 4),
                Offset::new(3, 3),
                Offset::new(2, 2),
                Offset::new(1, 1)
            ]
        );
    }

    #[test]
    fn graph_search_without_heuristic_is_dijkstra() {
        let grid = AsciiGrid::parse(&ZIGZAG);
        let origin = grid.first('@');
        let goal = grid.first('$');
        let path = graph_search(&grid.map, origin, goal, &Euclidean, &Zero).unwrap();
        let expected = brute_force_cost(&grid.map, origin, goal).unwrap();
        assert!((path_cost(&grid.map, origin, &path) - expected).abs() < 1e-6);
        assert!(path.iter().all(|&id| grid.glyph(id) != '#'));
    }
}

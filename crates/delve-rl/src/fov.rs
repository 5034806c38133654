//! Field of view over a tile graph.
//!
//! Sight spreads from the viewer along precomputed sight lines: a
//! [`SightTable`] maps each relative offset to the offsets it reveals when it
//! is transparent. Following those lines through passable tiles only gives a
//! cheap approximation of shadow casting that never revisits a tile and stops
//! as soon as a branch is blocked.
//!
//! Tables depend only on the radius and are built once per process, see
//! [`SightTable::cached`].

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::{Arc, LazyLock, Mutex, PoisonError};

use delve_core::{Offset, TileId, TileMap};

static TABLES: LazyLock<Mutex<HashMap<i32, Arc<SightTable>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Sight lines for one radius.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SightTable {
    radius: i32,
    lines: BTreeMap<Offset, BTreeSet<Offset>>,
}

impl SightTable {
    /// Build the table for `radius`.
    ///
    /// One octant (`0 <= y <= x`) is built column by column: every cell of
    /// column `x` continues into column `x + 1`, and one cell per column
    /// forks into two. The forking row moves down every few columns, so
    /// lines spread like light from the origin. The other seven octants are
    /// mirror images.
    pub fn build(radius: i32) -> Self {
        let mut table = Self {
            radius,
            lines: BTreeMap::new(),
        };
        if radius < 1 {
            return table;
        }

        table.add(Offset::ZERO, Offset::new(1, 0));
        table.add(Offset::ZERO, Offset::new(1, 1));

        let mut fork = 0;
        let mut countdown = 0;
        for x in 1..radius {
            let mut next_y = 0;
            for y in 0..=x {
                let from = Offset::new(x, y);
                table.add(from, Offset::new(x + 1, next_y));
                if y == fork {
                    table.add(from, Offset::new(x + 1, next_y + 1));
                    next_y += 2;
                } else {
                    next_y += 1;
                }
            }
            countdown -= 1;
            if countdown < 0 {
                countdown = fork + 1;
                fork += 1;
            }
        }

        table.mirror(|o| o.transpose());
        table.mirror(|o| Offset::new(-o.x, o.y));
        table.mirror(|o| Offset::new(o.x, -o.y));
        table
    }

    /// The shared table for `radius`, built on first use.
    pub fn cached(radius: i32) -> Arc<SightTable> {
        let mut tables = TABLES.lock().unwrap_or_else(PoisonError::into_inner);
        tables
            .entry(radius)
            .or_insert_with(|| {
                let table = Self::build(radius);
                log::debug!(
                    "built sight table for radius {}: {} entries",
                    radius,
                    table.len()
                );
                Arc::new(table)
            })
            .clone()
    }

    /// Drop every cached table.
    pub fn clear_cache() {
        TABLES
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn radius(&self) -> i32 {
        self.radius
    }

    /// Offsets revealed when `from` is transparent, in row-major order.
    pub fn revealed(&self, from: Offset) -> impl Iterator<Item = Offset> + '_ {
        self.lines.get(&from).into_iter().flatten().copied()
    }

    /// Number of offsets that reveal something.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn add(&mut self, from: Offset, to: Offset) {
        self.lines.entry(from).or_default().insert(to);
    }

    /// Add the image of every current line under `f`.
    fn mirror(&mut self, f: impl Fn(Offset) -> Offset) {
        let images: Vec<(Offset, Offset)> = self
            .lines
            .iter()
            .flat_map(|(&from, tos)| tos.iter().map(move |&to| (from, to)))
            .map(|(from, to)| (f(from), f(to)))
            .collect();
        for (from, to) in images {
            self.add(from, to);
        }
    }
}

/// Tiles visible from `origin`, keyed by their offset relative to it.
///
/// A tile is seen when a sight line reaches it through passable tiles; the
/// first blocking tile on a line is itself seen. Each offset is resolved
/// through the link from the tile it was reached from, so the result follows
/// the graph rather than coordinates. A `radius` below 1 sees only the
/// origin.
pub fn field_of_view<T>(
    map: &TileMap<T>,
    origin: TileId,
    radius: i32,
) -> HashMap<Offset, TileId> {
    let mut fov = HashMap::from([(Offset::ZERO, origin)]);
    if radius < 1 {
        return fov;
    }

    let table = SightTable::cached(radius);
    let mut expanded = HashSet::from([Offset::ZERO]);
    let mut stack = vec![Offset::ZERO];
    while let Some(off) = stack.pop() {
        let Some(&tile) = fov.get(&off) else {
            continue;
        };
        for seen in table.revealed(off) {
            let Some(neighbor) = map.neighbor(tile, seen - off) else {
                continue;
            };
            let resolved = match fov.entry(seen) {
                Entry::Occupied(e) => *e.get(),
                Entry::Vacant(e) => *e.insert(neighbor),
            };
            if map.is_passable(resolved) && expanded.insert(seen) {
                stack.push(seen);
            }
        }
    }

    wall_fix(map, &mut fov, radius);
    fov
}

/// Standing next to a long straight wall, the wall cells one step off the
/// axis can be missed by the sight lines. Copy the side neighbors of every
/// tile found along the four axes.
fn wall_fix<T>(map: &TileMap<T>, fov: &mut HashMap<Offset, TileId>, radius: i32) {
    let axes = [
        (Offset::new(1, 0), Offset::new(0, 1)),
        (Offset::new(-1, 0), Offset::new(0, 1)),
        (Offset::new(0, 1), Offset::new(1, 0)),
        (Offset::new(0, -1), Offset::new(1, 0)),
    ];
    for (along, side) in axes {
        for d in 0..=radius {
            let pos = along * d;
            let Some(&tile) = fov.get(&pos) else {
                break;
            };
            for side in [side, -side] {
                if let Some(adj) = map.neighbor(tile, side) {
                    fov.insert(pos + side, adj);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testgrid::AsciiGrid;
    use delve_core::Range;

    #[test]
    fn radius_one_table_reveals_the_ring() {
        let table = SightTable::build(1);
        let ring: Vec<_> = table.revealed(Offset::ZERO).collect();
        assert_eq!(ring.len(), 8);
        assert!(ring.iter().all(|o| o.chebyshev() == 1));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn table_is_symmetric_under_mirroring() {
        let table = SightTable::build(6);
        let mirrors: [fn(Offset) -> Offset; 3] = [
            |o| o.transpose(),
            |o| Offset::new(-o.x, o.y),
            |o| Offset::new(o.x, -o.y),
        ];
        for (from, tos) in &table.lines {
            for &to in tos {
                assert_eq!(to.chebyshev(), from.chebyshev() + 1);
                for f in mirrors {
                    assert!(table.revealed(f(*from)).any(|t| t == f(to)));
                }
            }
        }
    }

    #[test]
    fn table_covers_every_offset_within_radius() {
        let radius = 7;
        let table = SightTable::build(radius);
        let mut reached: HashSet<Offset> = HashSet::from([Offset::ZERO]);
        for tos in table.lines.values() {
            reached.extend(tos.iter().copied());
        }
        assert_eq!(reached.len(), ((2 * radius + 1) * (2 * radius + 1)) as usize);
    }

    #[test]
    fn cache_returns_shared_tables() {
        let a = SightTable::cached(5);
        let b = SightTable::cached(5);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(*a, SightTable::build(5));
    }

    #[test]
    fn clear_cache_rebuilds() {
        let a = SightTable::cached(13);
        SightTable::clear_cache();
        let b = SightTable::cached(13);
        assert_eq!(*a, *b);
    }

    #[test]
    fn open_field_sees_full_square() {
        let lines = ["..........."; 11];
        let grid = AsciiGrid::parse(&lines);
        let origin = grid.at(5, 5);
        for radius in 1..=5 {
            let fov = field_of_view(&grid.map, origin, radius);
            let side = (2 * radius + 1) as usize;
            assert_eq!(fov.len(), side * side, "radius {radius}");
            for (off, id) in &fov {
                assert_eq!(grid.map[*id].offset, grid.map[origin].offset + *off);
            }
        }
    }

    #[test]
    fn zero_radius_sees_only_origin() {
        let grid = AsciiGrid::parse(&["...", "...", "..."]);
        let fov = field_of_view(&grid.map, grid.at(1, 1), 0);
        assert_eq!(fov, HashMap::from([(Offset::ZERO, grid.at(1, 1))]));
    }

    #[test]
    fn walls_block_sight() {
        let grid = AsciiGrid::parse(&[
            "#########",
            "#.......#",
            "#.......#",
            "#..@#...#",
            "#.......#",
            "#.......#",
            "#########",
        ]);
        let origin = grid.first('@');
        let fov = field_of_view(&grid.map, origin, 4);
        assert!(fov.contains_key(&Offset::new(1, 0)));
        assert!(!grid.map.is_passable(fov[&Offset::new(1, 0)]));
        // Straight behind the pillar.
        assert!(!fov.contains_key(&Offset::new(2, 0)));
        assert!(!fov.contains_key(&Offset::new(3, 0)));
        for (off, id) in &fov {
            assert_eq!(grid.map[*id].offset, grid.map[origin].offset + *off);
        }
    }

    #[test]
    fn enclosed_viewer_sees_its_walls() {
        let grid = AsciiGrid::parse(&[
            ".......", //
            ".#####.", //
            ".#...#.", //
            ".#.@.#.", //
            ".#...#.", //
            ".#####.", //
            ".......",
        ]);
        let fov = field_of_view(&grid.map, grid.first('@'), 3);
        assert_eq!(fov.len(), 25);
        for off in Range::new(-2, -2, 3, 3) {
            assert!(fov.contains_key(&off), "missing {off}");
        }
    }

    #[test]
    fn fov_only_contains_reachable_tiles() {
        let grid = AsciiGrid::parse(&[
            "..........",
            ".####.....",
            ".#..#.....",
            ".#@.#.....",
            ".####.....",
            "..........",
        ]);
        let origin = grid.first('@');
        let fov = field_of_view(&grid.map, origin, 6);
        for (off, _) in &fov {
            let p = grid.map[origin].offset + *off;
            assert!((1..=4).contains(&p.x) && (1..=4).contains(&p.y), "leaked to {p}");
        }
    }

    #[test]
    fn fov_is_deterministic() {
        let grid = AsciiGrid::parse(&[
            "..#.......",
            "....#..#..",
            ".#...@....",
            "...#...#..",
            "......#...",
        ]);
        let origin = grid.first('@');
        let a = field_of_view(&grid.map, origin, 4);
        SightTable::clear_cache();
        let b = field_of_view(&grid.map, origin, 4);
        assert_eq!(a, b);
    }

    #[test]
    fn wall_fix_sees_long_wall() {
        let grid = AsciiGrid::parse(&[
            "###########",
            "...........",
            "...........",
        ]);
        let origin = grid.at(5, 1);
        let fov = field_of_view(&grid.map, origin, 5);
        for dx in -5..=5 {
            assert!(fov.contains_key(&Offset::new(dx, -1)), "wall at {dx}");
        }
    }
}

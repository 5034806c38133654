//! ASCII fixtures shared by the unit tests.

use delve_core::{Range, Tile, TileId, TileMap};

/// A fully 8-connected grid built from rows of characters. `#` cells are
/// impassable; every other character is kept as tile data.
pub(crate) struct AsciiGrid {
    pub map: TileMap<char>,
    ids: Vec<TileId>,
    cols: i32,
    rows: i32,
}

impl AsciiGrid {
    pub fn parse(lines: &[&str]) -> Self {
        let cols = lines[0].len() as i32;
        let rows = lines.len() as i32;
        let glyphs: Vec<char> = lines.iter().flat_map(|l| l.chars()).collect();
        let mut map = TileMap::new();
        let mut next = glyphs.iter();
        let ids = map.insert_rect(Range::new(0, 0, cols, rows), |off| {
            let c = next.next().copied().unwrap_or('#');
            Tile::new(off, c).with_pass(c != '#')
        });
        Self {
            map,
            ids,
            cols,
            rows,
        }
    }

    pub fn id(&self, x: i32, y: i32) -> Option<TileId> {
        if x < 0 || y < 0 || x >= self.cols || y >= self.rows {
            return None;
        }
        self.ids.get((y * self.cols + x) as usize).copied()
    }

    pub fn at(&self, x: i32, y: i32) -> TileId {
        self.id(x, y).unwrap()
    }

    pub fn find(&self, pred: impl Fn(char) -> bool) -> Vec<TileId> {
        self.map
            .iter()
            .filter(|(_, t)| pred(t.data))
            .map(|(id, _)| id)
            .collect()
    }

    pub fn first(&self, c: char) -> TileId {
        self.find(|d| d == c)[0]
    }

    pub fn glyph(&self, id: TileId) -> char {
        self.map[id].data
    }
}

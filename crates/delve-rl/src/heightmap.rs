//! Heightmaps for overworld generation.

use delve_core::{Dice, Level, Offset, Range, Tile, TileMap};
use rand::Rng;

/// Errors from heightmap and biome operations.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum HeightmapError {
    /// Two heightmaps of different sizes were combined.
    #[error("heightmap dimensions differ: {cols}x{rows} vs {other_cols}x{other_rows}")]
    DimensionMismatch {
        cols: i32,
        rows: i32,
        other_cols: i32,
        other_rows: i32,
    },

    /// A biome table had no biomes.
    #[error("biome table is empty")]
    NoBiomes,

    /// A biome had neither passable nor impassable tiles to pick from.
    #[error("biome {index} has no tiles")]
    EmptyBiome { index: usize },
}

/// A `cols × rows` grid of heights.
///
/// [`generate`](Heightmap::generate) raises random ellipses, smooths,
/// equalizes and normalizes them into `[0, 1]`. The public fields tune the
/// ellipses.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Heightmap {
    cols: i32,
    rows: i32,
    buf: Vec<f64>,
    /// Horizontal ellipse radius.
    pub radius_x: i32,
    /// Vertical ellipse radius.
    pub radius_y: i32,
    /// Ellipses raised by [`generate`](Heightmap::generate).
    pub num_ellipses: usize,
    /// Whether ellipses wrap around the left and right edges.
    pub wrap_x: bool,
}

impl Heightmap {
    /// A flat heightmap. Dimensions below 1 are raised to 1.
    pub fn new(cols: i32, rows: i32) -> Self {
        let cols = cols.max(1);
        let rows = rows.max(1);
        Self {
            cols,
            rows,
            buf: vec![0.0; (cols * rows) as usize],
            radius_x: cols / 8,
            radius_y: rows / 8,
            num_ellipses: (cols + rows) as usize,
            wrap_x: true,
        }
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    /// Bounds as a range anchored at the origin.
    pub fn range(&self) -> Range {
        Range::new(0, 0, self.cols, self.rows)
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.cols || y >= self.rows {
            return None;
        }
        Some((y * self.cols + x) as usize)
    }

    /// Height at `p`, `None` out of bounds.
    pub fn get(&self, p: Offset) -> Option<f64> {
        self.index(p.x, p.y).map(|i| self.buf[i])
    }

    /// Set the height at `p`. Out of bounds writes are ignored.
    pub fn set(&mut self, p: Offset, height: f64) {
        if let Some(i) = self.index(p.x, p.y) {
            self.buf[i] = height;
        }
    }

    fn at(&self, x: i32, y: i32) -> f64 {
        self.buf[(y * self.cols + x) as usize]
    }

    fn put(&mut self, x: i32, y: i32, height: f64) {
        self.buf[(y * self.cols + x) as usize] = height;
    }

    /// Run the whole pipeline.
    pub fn generate<R: Rng>(&mut self, dice: &mut Dice<R>) {
        self.reset();
        self.raise_ellipses(dice);
        self.smooth();
        self.equalize();
        self.normalize();
        log::debug!(
            "generated {}x{} heightmap from {} ellipses",
            self.cols,
            self.rows,
            self.num_ellipses
        );
    }

    /// Set every height to 0.
    pub fn reset(&mut self) {
        self.buf.fill(0.0);
    }

    /// Add 1 to every cell strictly inside the ellipse centered at `center`.
    pub fn raise_ellipse(&mut self, center: Offset) {
        let rx2 = f64::from(self.radius_x * self.radius_x);
        let ry2 = f64::from(self.radius_y * self.radius_y);
        for dx in -self.radius_x..=self.radius_x {
            for dy in -self.radius_y..=self.radius_y {
                if f64::from(dx * dx) / rx2 + f64::from(dy * dy) / ry2 >= 1.0 {
                    continue;
                }
                let mut x = center.x + dx;
                let y = center.y + dy;
                if self.wrap_x {
                    x = x.rem_euclid(self.cols);
                }
                if let Some(i) = self.index(x, y) {
                    self.buf[i] += 1.0;
                }
            }
        }
    }

    /// Raise [`num_ellipses`](Heightmap::num_ellipses) ellipses at uniform
    /// centers.
    pub fn raise_ellipses<R: Rng>(&mut self, dice: &mut Dice<R>) {
        for _ in 0..self.num_ellipses {
            let center = dice.offset(self.cols, self.rows);
            self.raise_ellipse(center);
        }
    }

    /// Three-cell box blur along X then Y, edges excluded.
    ///
    /// Averages are written back immediately, so a cell sees the already
    /// smoothed values of the cells before it.
    pub fn smooth(&mut self) {
        for x in 1..self.cols - 1 {
            for y in 1..self.rows - 1 {
                let h = (self.at(x - 1, y) + self.at(x, y) + self.at(x + 1, y)) / 3.0;
                self.put(x, y, h);
                let h = (self.at(x, y - 1) + self.at(x, y) + self.at(x, y + 1)) / 3.0;
                self.put(x, y, h);
            }
        }
    }

    /// Histogram equalization: each height becomes the sum of all heights
    /// not above it.
    pub fn equalize(&mut self) {
        let mut sorted = self.buf.clone();
        sorted.sort_by(f64::total_cmp);
        let cumulative: Vec<f64> = sorted
            .iter()
            .scan(0.0, |sum, &h| {
                *sum += h;
                Some(*sum)
            })
            .collect();
        for h in &mut self.buf {
            let upto = sorted.partition_point(|&v| v <= *h);
            *h = upto.checked_sub(1).map_or(0.0, |i| cumulative[i]);
        }
    }

    /// Rescale to `[0, 1]`. A flat map becomes all zeros.
    pub fn normalize(&mut self) {
        let (min, max) = self
            .buf
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &h| {
                (lo.min(h), hi.max(h))
            });
        let span = max - min;
        if span <= 0.0 || !span.is_finite() {
            self.reset();
            return;
        }
        for h in &mut self.buf {
            *h = (*h - min) / span;
        }
    }

    /// Replace every height with `f(height)`.
    pub fn transform(&mut self, mut f: impl FnMut(f64) -> f64) {
        for h in &mut self.buf {
            *h = f(*h);
        }
    }

    /// Replace every height with `f(height, other_height)`. Fails without
    /// writing anything if the sizes differ.
    pub fn combine(
        &mut self,
        mut f: impl FnMut(f64, f64) -> f64,
        other: &Heightmap,
    ) -> Result<(), HeightmapError> {
        if self.cols != other.cols || self.rows != other.rows {
            return Err(HeightmapError::DimensionMismatch {
                cols: self.cols,
                rows: self.rows,
                other_cols: other.cols,
                other_rows: other.rows,
            });
        }
        for (h, &o) in self.buf.iter_mut().zip(&other.buf) {
            *h = f(*h, o);
        }
        Ok(())
    }

    /// Build a fully connected grid level, one `factory(offset, height)`
    /// call per cell in row-major order. The origin is the top-left cell.
    pub fn apply<T>(&self, mut factory: impl FnMut(Offset, f64) -> Tile<T>) -> Level<T> {
        let mut tiles = TileMap::new();
        let ids = tiles.insert_rect(self.range(), |off| factory(off, self.at(off.x, off.y)));
        let origin = match ids.first() {
            Some(&id) => id,
            None => tiles.insert(factory(Offset::ZERO, 0.0)),
        };
        Level { tiles, origin }
    }
}

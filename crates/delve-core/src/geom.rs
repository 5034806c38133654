//! Geometry primitives: [`Offset`], [`Direction`] and [`Range`].
//!
//! An [`Offset`] doubles as a grid coordinate and as a step between two
//! cells. Steps between linked tiles are always one of the eight
//! [`Direction`]s.

use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

// ---------------------------------------------------------------------------
// Offset
// ---------------------------------------------------------------------------

/// A 2D integer vector. X grows right, Y grows down.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Offset {
    pub x: i32,
    pub y: i32,
}

impl Offset {
    /// The zero vector: "no step" or "stay here".
    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// Create a new offset.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Swap the two axes.
    #[inline]
    pub const fn transpose(self) -> Self {
        Self {
            x: self.y,
            y: self.x,
        }
    }

    /// L1 length.
    #[inline]
    pub fn manhattan(self) -> i32 {
        self.x.abs() + self.y.abs()
    }

    /// L2 length.
    #[inline]
    pub fn euclidean(self) -> f64 {
        f64::from(self.x).hypot(f64::from(self.y))
    }

    /// L∞ length.
    #[inline]
    pub fn chebyshev(self) -> i32 {
        self.x.abs().max(self.y.abs())
    }

    /// Whether this is one of the four diagonal unit steps.
    #[inline]
    pub fn is_diagonal(self) -> bool {
        self.x.abs() == 1 && self.y.abs() == 1
    }

    /// Map a key to a step.
    ///
    /// Vi-keys (`hjklyubn`) and numpad digits select one of the eight
    /// directions; `.` and `5` mean "wait" and give [`Offset::ZERO`]. Any
    /// other key gives `None`.
    pub fn from_key(key: char) -> Option<Self> {
        let step = match key {
            'h' | '4' => Self::new(-1, 0),
            'l' | '6' => Self::new(1, 0),
            'k' | '8' => Self::new(0, -1),
            'j' | '2' => Self::new(0, 1),
            'u' | '9' => Self::new(1, -1),
            'y' | '7' => Self::new(-1, -1),
            'n' | '3' => Self::new(1, 1),
            'b' | '1' => Self::new(-1, 1),
            '.' | '5' => Self::ZERO,
            _ => return None,
        };
        Some(step)
    }
}

impl PartialOrd for Offset {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Offset {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.y.cmp(&other.y).then(self.x.cmp(&other.x))
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl Add for Offset {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Offset {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Offset {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Offset {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl Mul<i32> for Offset {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: i32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// One of the eight unit steps, clockwise from north.
///
/// The declaration order is the iteration order used by every neighbor scan,
/// so ties are always broken the same way.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl Direction {
    /// All eight directions in index order.
    pub const ALL: [Direction; 8] = [
        Direction::N,
        Direction::NE,
        Direction::E,
        Direction::SE,
        Direction::S,
        Direction::SW,
        Direction::W,
        Direction::NW,
    ];

    /// The four orthogonal directions.
    pub const ORTHOGONAL: [Direction; 4] =
        [Direction::N, Direction::E, Direction::S, Direction::W];

    /// Index into an 8-slot adjacency table.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The unit step for this direction.
    pub const fn offset(self) -> Offset {
        match self {
            Direction::N => Offset::new(0, -1),
            Direction::NE => Offset::new(1, -1),
            Direction::E => Offset::new(1, 0),
            Direction::SE => Offset::new(1, 1),
            Direction::S => Offset::new(0, 1),
            Direction::SW => Offset::new(-1, 1),
            Direction::W => Offset::new(-1, 0),
            Direction::NW => Offset::new(-1, -1),
        }
    }

    /// The direction of a unit step, or `None` for anything else
    /// (including [`Offset::ZERO`]).
    pub fn from_offset(step: Offset) -> Option<Self> {
        let dir = match (step.x, step.y) {
            (0, -1) => Direction::N,
            (1, -1) => Direction::NE,
            (1, 0) => Direction::E,
            (1, 1) => Direction::SE,
            (0, 1) => Direction::S,
            (-1, 1) => Direction::SW,
            (-1, 0) => Direction::W,
            (-1, -1) => Direction::NW,
            _ => return None,
        };
        Some(dir)
    }

    /// The direction pointing back.
    #[inline]
    pub const fn opposite(self) -> Self {
        Self::ALL[(self.index() + 4) % 8]
    }

    /// Whether this is a diagonal direction.
    #[inline]
    pub const fn is_diagonal(self) -> bool {
        self.index() % 2 == 1
    }
}

impl From<Direction> for Offset {
    #[inline]
    fn from(dir: Direction) -> Offset {
        dir.offset()
    }
}

// ---------------------------------------------------------------------------
// Range
// ---------------------------------------------------------------------------

/// A half-open rectangle \[min, max). `min` is inclusive, `max` is exclusive.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Range {
    pub min: Offset,
    pub max: Offset,
}

impl Range {
    /// Create a new range from two corners and auto-canonicalize so that
    /// `min` ≤ `max` on each axis.
    #[inline]
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self {
            min: Offset::new(x0.min(x1), y0.min(y1)),
            max: Offset::new(x0.max(x1), y0.max(y1)),
        }
    }

    /// Range at `(x, y)` spanning `w` columns and `h` rows.
    #[inline]
    pub fn with_size(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self::new(x, y, x + w, y + h)
    }

    /// Size as an `Offset` (width, height).
    #[inline]
    pub fn size(self) -> Offset {
        Offset::new(self.width(), self.height())
    }

    /// Width of the range.
    #[inline]
    pub fn width(self) -> i32 {
        self.max.x - self.min.x
    }

    /// Height of the range.
    #[inline]
    pub fn height(self) -> i32 {
        self.max.y - self.min.y
    }

    /// Center cell, rounded towards `min`.
    #[inline]
    pub fn center(self) -> Offset {
        Offset::new(
            self.min.x + self.width() / 2,
            self.min.y + self.height() / 2,
        )
    }

    /// Total number of cells in the range.
    #[inline]
    pub fn len(self) -> usize {
        if self.is_empty() {
            return 0;
        }
        (self.width() as usize) * (self.height() as usize)
    }

    /// Whether the range has zero or negative area.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.min.x >= self.max.x || self.min.y >= self.max.y
    }

    /// Whether `p` is inside the half-open range.
    #[inline]
    pub fn contains(self, p: Offset) -> bool {
        self.contains_x(p.x) && self.contains_y(p.y)
    }

    /// Whether column `x` is inside `[min.x, max.x)`.
    #[inline]
    pub fn contains_x(self, x: i32) -> bool {
        x >= self.min.x && x < self.max.x
    }

    /// Whether row `y` is inside `[min.y, max.y)`.
    #[inline]
    pub fn contains_y(self, y: i32) -> bool {
        y >= self.min.y && y < self.max.y
    }

    /// Mirror the range across the main diagonal.
    #[inline]
    pub fn transpose(self) -> Self {
        Self {
            min: self.min.transpose(),
            max: self.max.transpose(),
        }
    }

    /// Row-major iterator over every cell in the range.
    #[inline]
    pub fn iter(self) -> RangeIter {
        RangeIter {
            range: self,
            cur: self.min,
        }
    }
}

impl IntoIterator for Range {
    type Item = Offset;
    type IntoIter = RangeIter;
    #[inline]
    fn into_iter(self) -> RangeIter {
        self.iter()
    }
}

// ---------------------------------------------------------------------------
// RangeIter
// ---------------------------------------------------------------------------

/// Row-major iterator over the cells in a [`Range`].
#[derive(Clone, Debug)]
pub struct RangeIter {
    range: Range,
    cur: Offset,
}

impl Iterator for RangeIter {
    type Item = Offset;

    #[inline]
    fn next(&mut self) -> Option<Offset> {
        if self.cur.y >= self.range.max.y || self.range.is_empty() {
            return None;
        }
        let p = self.cur;
        self.cur.x += 1;
        if self.cur.x >= self.range.max.x {
            self.cur.x = self.range.min.x;
            self.cur.y += 1;
        }
        Some(p)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.range.is_empty() || self.cur.y >= self.range.max.y {
            return (0, Some(0));
        }
        let w = self.range.width() as usize;
        let remaining_in_row = (self.range.max.x - self.cur.x) as usize;
        let remaining_rows = (self.range.max.y - self.cur.y - 1) as usize;
        let total = remaining_in_row + remaining_rows * w;
        (total, Some(total))
    }
}

impl ExactSizeIterator for RangeIter {}

//! Grid geometry shared by cells and rods.
//!
//! Positions are lattice coordinates. A cell's position lives on the reactor
//! grid; a rod's position lives on its cell's local grid, which is 1x1 or 2x2.
//! The `y` axis grows downwards, so [`Direction::North`] is `(0, -1)`.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Neg, Sub};
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// An integer lattice coordinate.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The adjacent lattice point in `dir`, or `None` at the edge of the
    /// `i32` range.
    pub fn step(self, dir: Direction) -> Option<Position> {
        let offset = dir.offset();
        Some(Position::new(
            self.x.checked_add(offset.x)?,
            self.y.checked_add(offset.y)?,
        ))
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, rhs: Position) -> Position {
        Position::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Position {
    type Output = Position;

    fn sub(self, rhs: Position) -> Position {
        Position::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Position {
    type Output = Position;

    fn neg(self) -> Position {
        Position::new(-self.x, -self.y)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Rod capacity of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CellSize {
    OneByOne,
    #[default]
    TwoByTwo,
}

impl CellSize {
    /// Side length of the local rod grid: 1 or 2.
    pub fn side_length(self) -> i32 {
        match self {
            CellSize::OneByOne => 1,
            CellSize::TwoByTwo => 2,
        }
    }

    /// Number of rod slots.
    pub fn capacity(self) -> usize {
        let side = self.side_length() as usize;
        side * side
    }

    /// Whether `pos` is a slot of this cell's local grid.
    pub fn is_valid_local_position(self, pos: Position) -> bool {
        let side = self.side_length();
        (0..side).contains(&pos.x) && (0..side).contains(&pos.y)
    }

    /// All local slots, in placement order (`y` first, then `x`).
    pub fn local_positions(self) -> impl Iterator<Item = Position> {
        let side = self.side_length();
        (0..side).flat_map(move |x| (0..side).map(move |y| Position::new(x, y)))
    }
}

impl std::fmt::Display for CellSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellSize::OneByOne => f.write_str("1x1"),
            CellSize::TwoByTwo => f.write_str("2x2"),
        }
    }
}

impl FromStr for CellSize {
    type Err = GeometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1x1" => Ok(CellSize::OneByOne),
            "2x2" => Ok(CellSize::TwoByTwo),
            other => Err(GeometryError::UnknownCellSize(other.to_string())),
        }
    }
}

/// Cardinal directions on the reactor grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// All four directions in neighbor probe order: `+x, -x, +y, -y`.
    pub fn all() -> [Direction; 4] {
        [
            Direction::East,
            Direction::West,
            Direction::South,
            Direction::North,
        ]
    }

    /// Unit offset for this direction.
    pub fn offset(self) -> Position {
        match self {
            Direction::North => Position::new(0, -1),
            Direction::East => Position::new(1, 0),
            Direction::South => Position::new(0, 1),
            Direction::West => Position::new(-1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    /// Resolve a unit offset back to a direction.
    pub fn from_offset(offset: Position) -> Result<Direction, GeometryError> {
        match (offset.x, offset.y) {
            (0, -1) => Ok(Direction::North),
            (1, 0) => Ok(Direction::East),
            (0, 1) => Ok(Direction::South),
            (-1, 0) => Ok(Direction::West),
            (dx, dy) => Err(GeometryError::InvalidDirection { dx, dy }),
        }
    }
}

/// Errors from geometry operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeometryError {
    /// The offset between two cells is not a cardinal unit vector. This means
    /// neighbor resolution handed over a cell that does not touch.
    #[error("position diff ({dx},{dy}) is not a cardinal unit vector")]
    InvalidDirection { dx: i32, dy: i32 },
    #[error("unknown cell size \"{0}\" (expected \"1x1\" or \"2x2\")")]
    UnknownCellSize(String),
    #[error("no grid position {direction:?} of {position}")]
    OffGrid {
        position: Position,
        direction: Direction,
    },
}

// ---------------------------------------------------------------------------
// Rod placement
// ---------------------------------------------------------------------------

/// The next free local slot, scanning `y` first and then wrapping to the next
/// `x`. When every slot is taken, returns `(side, 0)`, which lies outside the
/// cell; detecting the overflow is up to the caller.
pub fn next_rod_position(existing: &[Position], size: CellSize) -> Position {
    size.local_positions()
        .find(|pos| !existing.contains(pos))
        .unwrap_or(Position::new(size.side_length(), 0))
}

// ---------------------------------------------------------------------------
// Boundary matching
// ---------------------------------------------------------------------------

/// The four rod pairs that share an internal edge inside a 2x2 block.
pub const INTERNAL_PAIRS: [(Position, Position); 4] = [
    (Position::new(0, 0), Position::new(1, 0)),
    (Position::new(0, 1), Position::new(1, 1)),
    (Position::new(0, 0), Position::new(0, 1)),
    (Position::new(1, 0), Position::new(1, 1)),
];

/// Horizontal and vertical mirrors of a slot inside a 2x2 block. The diagonal
/// slot is never adjacent.
pub fn internal_mirrors(pos: Position) -> [Position; 2] {
    [Position::new(1 - pos.x, pos.y), Position::new(pos.x, 1 - pos.y)]
}

/// Local positions on the side of a cell that faces `pos_diff`, ordered low to
/// high along the shared edge. A 1x1 cell's single slot stands for the whole
/// side.
pub fn edge_rod_positions(
    size: CellSize,
    pos_diff: Position,
) -> Result<Vec<Position>, GeometryError> {
    let direction = Direction::from_offset(pos_diff)?;
    if size == CellSize::OneByOne {
        return Ok(vec![Position::new(0, 0)]);
    }
    let positions = match direction {
        Direction::West => [Position::new(0, 0), Position::new(0, 1)],
        Direction::East => [Position::new(1, 0), Position::new(1, 1)],
        Direction::North => [Position::new(0, 0), Position::new(1, 0)],
        Direction::South => [Position::new(0, 1), Position::new(1, 1)],
    };
    Ok(positions.to_vec())
}

/// Pair up two edges of possibly different lengths. Index `i` runs to the
/// longer length and wraps the shorter side, so a lone 1x1 slot pairs with
/// every slot of a 2x2 side while two 2x2 sides pair one to one.
pub fn boundary_pairs<'a>(
    this_edge: &'a [Position],
    that_edge: &'a [Position],
) -> impl Iterator<Item = (Position, Position)> + 'a {
    let n = if this_edge.is_empty() || that_edge.is_empty() {
        0
    } else {
        this_edge.len().max(that_edge.len())
    };
    (0..n).map(move |i| (this_edge[i % this_edge.len()], that_edge[i % that_edge.len()]))
}

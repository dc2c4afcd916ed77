//! Core type definitions for the simulation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier handed out for each simulation created by a manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SimulationId(pub u32);

impl fmt::Display for SimulationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 2D position in the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chebyshev distance, the ring a square neighbourhood search reaches.
    pub fn chebyshev_distance(&self, other: &Position) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Grid dimensions and the two index layouts used over them.
///
/// Tiles are stored column-major (`y + x * height`). Callers outside the
/// engine address tiles row-major with x varying fastest (`x + y * width`).
/// Every conversion between the two goes through this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridShape {
    pub width: i32,
    pub height: i32,
}

impl GridShape {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Number of tiles.
    pub fn area(&self) -> usize {
        (self.width.max(0) as usize) * (self.height.max(0) as usize)
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    /// Storage index of `pos`. The position must be in bounds.
    pub fn internal_index(&self, pos: Position) -> usize {
        debug_assert!(self.contains(pos), "position {pos} outside {self:?}");
        (pos.y + pos.x * self.height) as usize
    }

    /// Position stored at `index`.
    pub fn internal_position(&self, index: usize) -> Position {
        let index = index as i32;
        Position::new(index / self.height, index % self.height)
    }

    /// Row-major index of `pos`, the layout exposed to callers.
    pub fn external_index(&self, pos: Position) -> usize {
        debug_assert!(self.contains(pos), "position {pos} outside {self:?}");
        (pos.x + pos.y * self.width) as usize
    }

    /// Position addressed by a row-major index.
    pub fn external_position(&self, index: usize) -> Position {
        let index = index as i32;
        Position::new(index % self.width, index / self.width)
    }

    /// Maps a storage index to the row-major index of the same tile.
    pub fn internal_to_external(&self, index: usize) -> usize {
        self.external_index(self.internal_position(index))
    }

    /// Maps a row-major index to the storage index of the same tile.
    pub fn external_to_internal(&self, index: usize) -> usize {
        self.internal_index(self.external_position(index))
    }
}

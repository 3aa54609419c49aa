//! Tile and position types.
//!
//! A tile is a single numbered piece occupying one grid cell. Positions use
//! `(x, y)` coordinates: `x` is the column, `y` is the row.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique tile identifier.
///
/// Ids are handed out by the board store and never reused within a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId(pub u64);

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Grid position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Check if position is within a `grid_size` x `grid_size` board.
    pub fn is_within(&self, grid_size: usize) -> bool {
        self.x < grid_size && self.y < grid_size
    }

    /// Row-major cell index.
    pub fn to_index(self, grid_size: usize) -> usize {
        self.y * grid_size + self.x
    }

    /// Inverse of [`Position::to_index`].
    pub fn from_index(index: usize, grid_size: usize) -> Self {
        Self {
            x: index % grid_size,
            y: index / grid_size,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!([self.x, self.y])
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A numbered tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub id: TileId,
    pub position: Position,
    /// Always a power of two.
    pub value: u64,
}

impl Tile {
    pub fn new(id: TileId, position: Position, value: u64) -> Self {
        debug_assert!(value.is_power_of_two(), "tile value {} is not a power of two", value);
        Self {
            id,
            position,
            value,
        }
    }

    /// Same tile moved to `position`.
    pub fn at(self, position: Position) -> Self {
        Self { position, ..self }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.id.0,
            "position": self.position.to_json(),
            "value": self.value
        })
    }
}

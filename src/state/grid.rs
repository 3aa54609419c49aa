//! Dense tile grid.
//!
//! A fixed-capacity, row-major view of which tile occupies each cell. The
//! grid is always derived from a board's tiles; it never owns tile data.

use super::tile::{Position, Tile, TileId};

/// Row-major `grid_size * grid_size` map from cell to tile id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    grid_size: usize,
    cells: Vec<Option<TileId>>,
}

impl TileGrid {
    /// Create an empty grid.
    pub fn empty(grid_size: usize) -> Self {
        Self {
            grid_size,
            cells: vec![None; grid_size * grid_size],
        }
    }

    /// Build the grid from tiles, in the order given.
    ///
    /// Tiles are expected to occupy distinct in-bounds cells. When two tiles
    /// share a cell (mid-animation) the later one wins.
    pub fn from_tiles<'a>(grid_size: usize, tiles: impl IntoIterator<Item = &'a Tile>) -> Self {
        let mut grid = Self::empty(grid_size);
        for tile in tiles {
            debug_assert!(
                tile.position.is_within(grid_size),
                "tile {} at {} outside {}x{} grid",
                tile.id,
                tile.position,
                grid_size,
                grid_size
            );
            if let Some(slot) = grid.cells.get_mut(tile.position.to_index(grid_size)) {
                *slot = Some(tile.id);
            }
        }
        grid
    }

    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    /// Tile at a row-major index.
    pub fn at_index(&self, index: usize) -> Option<TileId> {
        self.cells.get(index).copied().flatten()
    }

    /// Tile at a position.
    pub fn at(&self, position: Position) -> Option<TileId> {
        if position.is_within(self.grid_size) {
            self.at_index(position.to_index(self.grid_size))
        } else {
            None
        }
    }

    pub fn is_empty_at(&self, position: Position) -> bool {
        position.is_within(self.grid_size) && self.at(position).is_none()
    }

    /// Positions of all empty cells, in row-major order.
    pub fn empty_positions(&self) -> Vec<Position> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_none())
            .map(|(index, _)| Position::from_index(index, self.grid_size))
            .collect()
    }

    /// Occupied tile ids at the given indices, skipping empty cells.
    pub fn collect_ids(&self, indices: impl IntoIterator<Item = usize>) -> Vec<TileId> {
        indices
            .into_iter()
            .filter_map(|index| self.at_index(index))
            .collect()
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }
}

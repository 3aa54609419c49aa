//! Board state store.
//!
//! Holds the canonical game state (tiles, score, motion flags), the
//! configuration, and the undo history, and applies named transitions.
//!
//! # Transitions
//!
//! ```text
//! SetConfiguration / Reset ──▶ empty board, empty history, initial = true
//! SpawnTile                ──▶ new tile, has_changed = false, snapshot pushed
//! StartMove                ──▶ in_motion = true
//! UpdateTile               ──▶ tile moved, has_changed = true
//! MergeTile                ──▶ source removed, destination doubled, score += source
//! EndMove                  ──▶ in_motion = false
//! Undo                     ──▶ newest snapshot dropped, board = previous snapshot
//! ```
//!
//! Invariant violations (spawning onto an occupied cell, merging an unknown
//! tile) are programming errors and trip `debug_assert!` in debug builds.
//! Release builds log a warning and leave the board untouched.

use std::collections::HashMap;

use super::config::Configuration;
use super::grid::TileGrid;
use super::tile::{Position, Tile, TileId};

/// Tile layout plus per-move flags and score.
///
/// `order` lists exactly the ids present in `tiles`; both fields are private
/// and only change together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Board {
    tiles: HashMap<TileId, Tile>,
    order: Vec<TileId>,
    has_changed: bool,
    in_motion: bool,
    score: u64,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tiles in display order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.order.iter().filter_map(|id| self.tiles.get(id))
    }

    /// Tile ids in display order.
    pub fn order(&self) -> &[TileId] {
        &self.order
    }

    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(&id)
    }

    pub fn contains(&self, id: TileId) -> bool {
        self.tiles.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn has_changed(&self) -> bool {
        self.has_changed
    }

    pub fn in_motion(&self) -> bool {
        self.in_motion
    }

    /// Sum of all tile values.
    pub fn value_sum(&self) -> u64 {
        self.tiles.values().map(|t| t.value).sum()
    }

    /// Tile at a position, if any.
    pub fn tile_at(&self, position: Position) -> Option<&Tile> {
        self.tiles().find(|t| t.position == position)
    }

    /// Dense grid view of this board.
    pub fn grid(&self, grid_size: usize) -> TileGrid {
        TileGrid::from_tiles(grid_size, self.tiles())
    }

    /// Check that `order` mirrors the key set of `tiles`.
    pub fn is_consistent(&self) -> bool {
        self.order.len() == self.tiles.len()
            && self.order.iter().all(|id| self.tiles.contains_key(id))
    }

    fn insert(&mut self, tile: Tile) {
        if self.tiles.insert(tile.id, tile).is_none() {
            self.order.push(tile.id);
        }
    }

    fn remove(&mut self, id: TileId) -> Option<Tile> {
        let tile = self.tiles.remove(&id)?;
        self.order.retain(|other| *other != id);
        Some(tile)
    }

    pub fn to_json(&self) -> serde_json::Value {
        let tiles: Vec<serde_json::Value> = self.tiles().map(|t| t.to_json()).collect();

        serde_json::json!({
            "tiles": tiles,
            "score": self.score,
            "has_changed": self.has_changed,
            "in_motion": self.in_motion
        })
    }
}

/// Named store transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardAction {
    SetConfiguration(Configuration),
    Reset,
    SpawnTile { position: Position, value: u32 },
    UpdateTile(Tile),
    MergeTile { source: Tile, destination: Tile },
    StartMove,
    EndMove,
    Undo,
    MarkInitialHandled,
}

/// Owner of the board, configuration and history.
#[derive(Debug, Clone)]
pub struct BoardStore {
    board: Board,
    config: Configuration,
    /// One snapshot per spawned tile, taken after the spawn
    history: Vec<Board>,
    /// No tile spawned yet since the last reset
    initial: bool,
    next_id: u64,
}

impl Default for BoardStore {
    fn default() -> Self {
        Self::new(Configuration::default())
    }
}

impl BoardStore {
    pub fn new(config: Configuration) -> Self {
        Self {
            board: Board::new(),
            config,
            history: Vec::new(),
            initial: true,
            next_id: 1,
        }
    }

    /// Apply a named transition.
    pub fn apply(&mut self, action: BoardAction) {
        log::trace!("apply {:?}", action);

        match action {
            BoardAction::SetConfiguration(config) => self.set_configuration(config),
            BoardAction::Reset => self.reset(),
            BoardAction::SpawnTile { position, value } => {
                self.spawn_tile(position, value);
            }
            BoardAction::UpdateTile(tile) => self.update_tile(tile),
            BoardAction::MergeTile {
                source,
                destination,
            } => self.merge_tile(source, destination),
            BoardAction::StartMove => self.start_move(),
            BoardAction::EndMove => self.end_move(),
            BoardAction::Undo => {
                self.undo();
            }
            BoardAction::MarkInitialHandled => self.mark_initial_handled(),
        }

        debug_assert!(self.board.is_consistent(), "tile order out of sync");
    }

    /// Replace the configuration and start over.
    pub fn set_configuration(&mut self, config: Configuration) {
        log::debug!(
            "configuration set: {}x{} grid, max spawn {}",
            config.grid_size(),
            config.grid_size(),
            config.max_spawn_value()
        );
        self.config = config;
        self.reset();
    }

    /// Empty board and history, keeping the configuration.
    pub fn reset(&mut self) {
        self.board = Board::new();
        self.history.clear();
        self.initial = true;
    }

    /// Insert a new tile and snapshot the result.
    pub fn spawn_tile(&mut self, position: Position, value: u32) -> TileId {
        debug_assert!(
            position.is_within(self.config.grid_size()),
            "spawn at {} outside the grid",
            position
        );
        debug_assert!(
            self.board.tile_at(position).is_none(),
            "spawn at occupied cell {}",
            position
        );

        let id = TileId(self.next_id);
        self.next_id += 1;

        self.board.insert(Tile::new(id, position, u64::from(value)));
        self.board.has_changed = false;
        self.history.push(self.board.clone());

        log::debug!("spawned {} = {} at {}", id, value, position);
        id
    }

    /// Move or revalue an existing tile.
    pub fn update_tile(&mut self, tile: Tile) {
        let Some(slot) = self.board.tiles.get_mut(&tile.id) else {
            debug_assert!(false, "update of unknown tile {}", tile.id);
            log::warn!("ignoring update of unknown tile {}", tile.id);
            return;
        };

        *slot = tile;
        self.board.has_changed = true;
    }

    /// Fold `source` into `destination`.
    ///
    /// The destination keeps its id and current position; its value becomes
    /// the sum of both. The score grows by the source's value.
    pub fn merge_tile(&mut self, source: Tile, destination: Tile) {
        let known = self.board.contains(source.id) && self.board.contains(destination.id);
        if !known || source.id == destination.id {
            debug_assert!(
                false,
                "merge of {} into {} references an unknown tile",
                source.id, destination.id
            );
            log::warn!(
                "ignoring merge of {} into {}",
                source.id,
                destination.id
            );
            return;
        }

        let (Some(from), Some(into)) = (
            self.board.tile(source.id).copied(),
            self.board.tile(destination.id).copied(),
        ) else {
            return;
        };
        let Some(merged) = into.value.checked_add(from.value) else {
            debug_assert!(false, "merge of {} into {} overflows", source.id, destination.id);
            log::warn!(
                "ignoring merge of {} into {}: value overflow",
                source.id,
                destination.id
            );
            return;
        };

        self.board.remove(source.id);
        if let Some(target) = self.board.tiles.get_mut(&destination.id) {
            target.value = merged;
        }
        self.board.score = self.board.score.saturating_add(from.value);
    }

    pub fn start_move(&mut self) {
        self.board.in_motion = true;
    }

    pub fn end_move(&mut self) {
        self.board.in_motion = false;
    }

    /// Step back one snapshot. Returns whether anything was restored.
    pub fn undo(&mut self) -> bool {
        if self.history.len() < 2 {
            return false;
        }

        self.history.pop();
        if let Some(previous) = self.history.last() {
            self.board = previous.clone();
        }
        log::debug!("undo: {} snapshots left", self.history.len());
        true
    }

    pub fn mark_initial_handled(&mut self) {
        self.initial = false;
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn configuration(&self) -> &Configuration {
        &self.config
    }

    /// Tiles in display order.
    pub fn tiles(&self) -> Vec<Tile> {
        self.board.tiles().copied().collect()
    }

    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.board.tile(id)
    }

    pub fn score(&self) -> u64 {
        self.board.score
    }

    pub fn in_motion(&self) -> bool {
        self.board.in_motion
    }

    pub fn has_changed(&self) -> bool {
        self.board.has_changed
    }

    pub fn is_initial(&self) -> bool {
        self.initial
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn can_undo(&self) -> bool {
        self.history.len() >= 2
    }

    /// Dense grid view of the current board.
    pub fn grid(&self) -> TileGrid {
        self.board.grid(self.config.grid_size())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn store() -> BoardStore {
        BoardStore::new(Configuration::default())
    }

    #[test]
    fn test_store_new() {
        let store = store();
        assert!(store.is_initial());
        assert!(store.board().is_empty());
        assert_eq!(store.history_len(), 0);
        assert_eq!(store.score(), 0);
        assert!(!store.in_motion());
    }

    #[test]
    fn test_spawn_snapshots_after_insert() {
        let mut store = store();

        let id = store.spawn_tile(Position::new(1, 2), 2);

        assert_eq!(store.history_len(), 1);
        assert_eq!(store.tile(id).map(|t| t.value), Some(2));
        assert_eq!(store.board().order(), &[id]);
        // Snapshot holds the spawned tile
        assert_eq!(store.history.last(), Some(store.board()));
    }

    #[test]
    fn test_spawn_ids_unique() {
        let mut store = store();
        let a = store.spawn_tile(Position::new(0, 0), 2);
        let b = store.spawn_tile(Position::new(1, 0), 2);
        store.reset();
        let c = store.spawn_tile(Position::new(0, 0), 2);

        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(b, c);
    }

    #[test]
    fn test_update_marks_changed_without_history() {
        let mut store = store();
        let id = store.spawn_tile(Position::new(3, 0), 4);
        assert!(!store.has_changed());

        let tile = *store.tile(id).unwrap();
        store.update_tile(tile.at(Position::new(0, 0)));

        assert!(store.has_changed());
        assert_eq!(store.history_len(), 1);
        assert_eq!(store.tile(id).unwrap().position, Position::new(0, 0));
    }

    #[test]
    fn test_spawn_clears_changed() {
        let mut store = store();
        let id = store.spawn_tile(Position::new(3, 0), 4);
        let tile = *store.tile(id).unwrap();
        store.update_tile(tile.at(Position::new(0, 0)));

        store.spawn_tile(Position::new(3, 3), 2);
        assert!(!store.has_changed());
    }

    #[test]
    fn test_merge() {
        let mut store = store();
        let dest = store.spawn_tile(Position::new(0, 0), 2);
        let src = store.spawn_tile(Position::new(1, 0), 2);

        let destination = *store.tile(dest).unwrap();
        let source = store.tile(src).unwrap().at(destination.position);
        store.update_tile(source);
        store.merge_tile(source, destination);

        assert_eq!(store.board().len(), 1);
        assert_eq!(store.board().order(), &[dest]);
        assert!(store.tile(src).is_none());
        let merged = store.tile(dest).unwrap();
        assert_eq!(merged.value, 4);
        assert_eq!(merged.position, Position::new(0, 0));
        assert_eq!(store.score(), 2);
        assert!(store.board().is_consistent());
    }

    #[test]
    fn test_motion_flags() {
        let mut store = store();
        store.apply(BoardAction::StartMove);
        assert!(store.in_motion());
        store.apply(BoardAction::EndMove);
        assert!(!store.in_motion());
    }

    #[test]
    fn test_undo_needs_two_snapshots() {
        let mut store = store();
        assert!(!store.undo());

        store.spawn_tile(Position::new(0, 0), 2);
        assert!(!store.undo());
        assert_eq!(store.board().len(), 1);
    }

    #[test]
    fn test_undo_restores_previous_snapshot() {
        let mut store = store();
        let first = store.spawn_tile(Position::new(3, 0), 2);
        let before = store.board().clone();

        let tile = *store.tile(first).unwrap();
        store.apply(BoardAction::StartMove);
        store.apply(BoardAction::UpdateTile(tile.at(Position::new(0, 0))));
        store.apply(BoardAction::EndMove);
        store.apply(BoardAction::SpawnTile {
            position: Position::new(2, 2),
            value: 4,
        });
        assert_eq!(store.history_len(), 2);

        assert!(store.can_undo());
        store.apply(BoardAction::Undo);

        assert_eq!(store.board(), &before);
        assert_eq!(store.history_len(), 1);
    }

    #[test]
    fn test_set_configuration_resets() {
        let mut store = store();
        store.spawn_tile(Position::new(0, 0), 2);
        store.mark_initial_handled();
        assert!(!store.is_initial());

        let config = Configuration::new(5, 8).unwrap();
        store.apply(BoardAction::SetConfiguration(config));

        assert!(store.is_initial());
        assert!(store.board().is_empty());
        assert_eq!(store.history_len(), 0);
        assert_eq!(store.configuration().grid_size(), 5);
    }

    #[test]
    fn test_reset_keeps_configuration() {
        let config = Configuration::new(3, 2).unwrap();
        let mut store = BoardStore::new(config);
        store.spawn_tile(Position::new(0, 0), 2);

        store.apply(BoardAction::Reset);

        assert!(store.board().is_empty());
        assert_eq!(store.configuration(), &config);
    }

    #[test]
    fn test_board_json() {
        let mut store = store();
        store.spawn_tile(Position::new(1, 0), 2);

        assert_eq!(
            store.board().to_json(),
            serde_json::json!({
                "tiles": [{"id": 1, "position": [1, 0], "value": 2}],
                "score": 0,
                "has_changed": false,
                "in_motion": false
            })
        );
    }

    #[test]
    fn test_value_sum_conserved_by_merge() {
        let mut store = store();
        let dest = store.spawn_tile(Position::new(0, 0), 4);
        let src = store.spawn_tile(Position::new(0, 1), 4);
        store.spawn_tile(Position::new(3, 3), 2);
        assert_eq!(store.board().value_sum(), 10);

        let destination = *store.tile(dest).unwrap();
        let source = store.tile(src).unwrap().at(destination.position);
        store.update_tile(source);
        store.merge_tile(source, destination);

        assert_eq!(store.board().value_sum(), 10);
        assert_eq!(store.tile(dest).unwrap().value, 8);
    }

    #[test]
    fn test_merge_values_beyond_u32() {
        let mut store = store();
        let dest = store.spawn_tile(Position::new(0, 0), 2);
        let src = store.spawn_tile(Position::new(1, 0), 2);

        let big = 1u64 << 31;
        let destination = Tile::new(dest, Position::new(0, 0), big);
        let source = Tile::new(src, Position::new(0, 0), big);
        store.update_tile(destination);
        store.update_tile(source);
        store.merge_tile(source, destination);

        assert_eq!(store.tile(dest).unwrap().value, 1u64 << 32);
        assert_eq!(store.score(), big);
    }

    #[test]
    #[should_panic]
    #[cfg(debug_assertions)]
    fn test_update_unknown_tile_panics_in_debug() {
        let mut store = store();
        store.spawn_tile(Position::new(0, 0), 2);
        store.update_tile(Tile::new(TileId(999), Position::new(1, 0), 2));
    }

    #[test]
    #[should_panic]
    #[cfg(debug_assertions)]
    fn test_merge_unknown_source_panics_in_debug() {
        let mut store = store();
        let dest = store.spawn_tile(Position::new(0, 0), 2);
        let destination = *store.tile(dest).unwrap();
        let ghost = Tile::new(TileId(999), Position::new(0, 0), 2);
        store.merge_tile(ghost, destination);
    }

    #[test]
    #[should_panic]
    #[cfg(debug_assertions)]
    fn test_merge_unknown_destination_panics_in_debug() {
        let mut store = store();
        let src = store.spawn_tile(Position::new(1, 0), 2);
        let source = *store.tile(src).unwrap();
        let ghost = Tile::new(TileId(999), Position::new(0, 0), 2);
        store.merge_tile(source, ghost);
    }

    #[test]
    #[should_panic]
    #[cfg(debug_assertions)]
    fn test_spawn_on_occupied_cell_panics_in_debug() {
        let mut store = store();
        store.spawn_tile(Position::new(0, 0), 2);
        store.spawn_tile(Position::new(0, 0), 2);
    }
}

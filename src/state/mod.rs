//! State management module for the merge puzzle.
//!
//! This module provides the core state types and the move engine:
//!
//! - `tile` - Tiles, ids and grid positions
//! - `config` - Board size, spawn range, animation delay
//! - `grid` - Dense row-major view of which tile sits where
//! - `board` - Board state store: tiles, score, history, named transitions
//! - `engine` - Move engine: slide/merge planning and spawn selection
//! - `scheduler` - Deferred action queue with a virtual clock
//! - `session` - One game, tying the pieces together
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                             Session                               │
//! │                                                                   │
//! │  move_in(dir) ──▶ engine::plan_move(board) ──▶ MovePlan           │
//! │                                                  │                │
//! │        ┌───────────── StartMove, UpdateTile... ◀─┤                │
//! │        ▼                                         │                │
//! │  ┌─────────────────┐                ┌────────────▼──────────┐     │
//! │  │   BoardStore    │◀── advance ────│  Scheduler            │     │
//! │  │                 │   MergeTile... │  (due, seq) ordered   │     │
//! │  │ tiles, order    │   EndMove      └───────────────────────┘     │
//! │  │ score, flags    │                                              │
//! │  │ history         │──▶ sync(): first spawn / post-move spawn     │
//! │  └─────────────────┘                                              │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust
//! use merge_grid_state::state::{Configuration, Session};
//!
//! let config = Configuration::new(4, 4).unwrap();
//! let mut session = Session::with_seed(config, 7);
//!
//! session.sync(); // first tile
//! session.move_left().unwrap();
//! session.advance(config.animation_delay());
//!
//! assert!(!session.in_motion());
//! ```

pub mod board;
pub mod config;
pub mod engine;
pub mod grid;
pub mod scheduler;
pub mod session;
pub mod tile;

// Re-export commonly used types
pub use board::{Board, BoardAction, BoardStore};
pub use config::{
    spawn_values, ConfigError, Configuration, DEFAULT_ANIMATION_DELAY_MS, DEFAULT_GRID_SIZE,
    DEFAULT_MAX_SPAWN_VALUE, INITIAL_SPAWN_VALUE, MAX_ANIMATION_DELAY_MS, MAX_GRID_SIZE,
    MIN_GRID_SIZE, SPAWN_VALUE_CAP,
};
pub use engine::{choose_spawn, plan_move, Direction, MovePlan, MoveStep};
pub use grid::TileGrid;
pub use scheduler::{ScheduledTask, Scheduler};
pub use session::{MoveError, MoveSummary, Session};
pub use tile::{Position, Tile, TileId};

//! Merge Grid State Library
//!
//! This crate provides the state model and move engine for a sliding-tile
//! merge puzzle in the style of "2048".
//!
//! # Overview
//!
//! The state module provides:
//!
//! - **Board State Store** - Owns tiles, score and undo history, and applies
//!   named transitions (spawn, update, merge, start/end move, undo).
//!
//! - **Move Engine** - Pure slide/merge planning for the four directions and
//!   random spawn selection.
//!
//! - **Scheduler** - Deferred merge completion and end-of-move, released in
//!   order as the session clock advances.
//!
//! - **Session** - One game with its configuration and spawn RNG.
//!
//! # Design Principles
//!
//! 1. **The store owns everything** - The engine only computes plans; every
//!    mutation goes through a store transition.
//!
//! 2. **Explicit time** - Animation delays run on a virtual clock the caller
//!    advances, so behaviour is deterministic under test.
//!
//! 3. **No rendering** - This crate is pure state, no UI or input handling.
//!
//! 4. **Serialization-ready** - Boards and sessions can be converted to JSON
//!    for renderers.
//!
//! # Example
//!
//! ```rust
//! use merge_grid_state::state::{BoardStore, Configuration, Position, Session};
//! use rand::SeedableRng;
//!
//! let mut store = BoardStore::new(Configuration::default());
//! store.spawn_tile(Position::new(0, 0), 2);
//! store.spawn_tile(Position::new(1, 0), 2);
//! store.spawn_tile(Position::new(3, 0), 4);
//! store.mark_initial_handled();
//!
//! let mut session = Session::from_parts(store, rand::rngs::StdRng::seed_from_u64(1));
//! session.move_left().unwrap();
//! session.settle();
//!
//! assert_eq!(session.score(), 2);
//! ```

pub mod state;

// Re-export everything from state module at crate root
pub use state::*;

//! Game session.
//!
//! Ties the board store, the move engine and the deferred action queue
//! together behind the command surface a UI calls into.
//!
//! # Move lifecycle
//!
//! ```text
//!          move_in(dir)                      advance(delay)
//!  Idle ───────────────▶ Moving (in_motion) ───────────────▶ Idle
//!         StartMove                           MergeTile...
//!         UpdateTile...                       EndMove
//!         (merges + EndMove queued)           spawn evaluated
//! ```
//!
//! Slides are applied immediately so a renderer sees tiles in flight for
//! the whole animation window. Merges and the end of the move are deferred
//! by the configured delay and always fire in scheduling order.

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::board::{BoardAction, BoardStore};
use super::config::{ConfigError, Configuration, INITIAL_SPAWN_VALUE};
use super::engine::{choose_spawn, plan_move, Direction, MoveStep};
use super::scheduler::Scheduler;
use super::tile::{Tile, TileId};

/// Result of an accepted move command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveSummary {
    pub direction: Direction,
    pub slides: usize,
    pub merges: usize,
    /// Score added once the merges complete
    pub score_gain: u64,
}

impl MoveSummary {
    /// Whether any tile slid or merged.
    pub fn changed(&self) -> bool {
        self.slides > 0 || self.merges > 0
    }
}

/// Move command errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    /// The previous move's animation window has not elapsed
    MoveInProgress,
}

impl std::fmt::Display for MoveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MoveInProgress => write!(f, "A move is already in progress"),
        }
    }
}

impl std::error::Error for MoveError {}

/// A single game: state, pending animation work and the spawn RNG.
#[derive(Debug, Clone)]
pub struct Session {
    store: BoardStore,
    scheduler: Scheduler<BoardAction>,
    rng: StdRng,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Configuration::default())
    }
}

impl Session {
    /// Create a session seeded from system entropy.
    pub fn new(config: Configuration) -> Self {
        Self::from_parts(BoardStore::new(config), StdRng::from_entropy())
    }

    /// Create a session with reproducible spawns.
    pub fn with_seed(config: Configuration, seed: u64) -> Self {
        Self::from_parts(BoardStore::new(config), StdRng::seed_from_u64(seed))
    }

    /// Wrap an existing store.
    pub fn from_parts(store: BoardStore, rng: StdRng) -> Self {
        Self {
            store,
            scheduler: Scheduler::default(),
            rng,
        }
    }

    // Commands

    pub fn move_left(&mut self) -> Result<MoveSummary, MoveError> {
        self.move_in(Direction::Left)
    }

    pub fn move_right(&mut self) -> Result<MoveSummary, MoveError> {
        self.move_in(Direction::Right)
    }

    pub fn move_up(&mut self) -> Result<MoveSummary, MoveError> {
        self.move_in(Direction::Up)
    }

    pub fn move_down(&mut self) -> Result<MoveSummary, MoveError> {
        self.move_in(Direction::Down)
    }

    /// Start a move. Slides apply now; merges and the end of the move are
    /// queued for the animation delay.
    pub fn move_in(&mut self, direction: Direction) -> Result<MoveSummary, MoveError> {
        if self.store.in_motion() || !self.scheduler.is_idle() {
            return Err(MoveError::MoveInProgress);
        }

        let grid_size = self.store.configuration().grid_size();
        let delay = self.store.configuration().animation_delay();
        let plan = plan_move(self.store.board(), grid_size, direction);

        self.store.apply(BoardAction::StartMove);

        for step in &plan.steps {
            match *step {
                MoveStep::Slide(tile) => self.store.apply(BoardAction::UpdateTile(tile)),
                MoveStep::Merge {
                    source,
                    destination,
                } => {
                    self.store.apply(BoardAction::UpdateTile(source));
                    self.scheduler.schedule(
                        delay,
                        BoardAction::MergeTile {
                            source,
                            destination,
                        },
                    );
                }
            }
        }

        self.scheduler.schedule(delay, BoardAction::EndMove);

        let summary = MoveSummary {
            direction,
            slides: plan.slide_count(),
            merges: plan.merge_count(),
            score_gain: plan.score_gain(),
        };
        log::debug!(
            "move {}: {} slides, {} merges, +{}",
            direction,
            summary.slides,
            summary.merges,
            summary.score_gain
        );

        Ok(summary)
    }

    /// Advance the clock, fire due actions, then evaluate spawning.
    ///
    /// Returns the id of a tile spawned by this call, if any.
    pub fn advance(&mut self, elapsed: chrono::Duration) -> Option<TileId> {
        for action in self.scheduler.advance(elapsed) {
            self.store.apply(action);
        }
        self.sync()
    }

    /// Fire every pending action regardless of its due time, then evaluate
    /// spawning.
    pub fn settle(&mut self) -> Option<TileId> {
        for action in self.scheduler.drain_all() {
            self.store.apply(action);
        }
        self.sync()
    }

    /// Evaluate the spawn rules against the current state.
    ///
    /// A freshly configured session gets its first tile (always a 2). After
    /// a move that changed the board has settled, one random tile spawns.
    pub fn sync(&mut self) -> Option<TileId> {
        if self.store.is_initial() {
            let spawned = self.spawn_random(INITIAL_SPAWN_VALUE);
            self.store.apply(BoardAction::MarkInitialHandled);
            return spawned;
        }

        if !self.store.in_motion() && self.store.has_changed() {
            let max = self.store.configuration().max_spawn_value();
            return self.spawn_random(max);
        }

        None
    }

    /// Step back one spawn. A move still in flight is finished first,
    /// including its spawn. Never triggers the first spawn of a session.
    pub fn undo(&mut self) -> bool {
        if !self.scheduler.is_idle() {
            self.finish_pending();
            if !self.store.is_initial() {
                self.sync();
            }
        }
        self.store.undo()
    }

    /// Clear the board and history, keeping the configuration.
    pub fn reset(&mut self) {
        self.finish_pending();
        log::debug!("session reset");
        self.store.apply(BoardAction::Reset);
    }

    /// Replace the configuration; the board and history start over.
    pub fn set_configuration(&mut self, config: Configuration) {
        self.finish_pending();
        self.store.apply(BoardAction::SetConfiguration(config));
    }

    pub fn set_grid_size(&mut self, grid_size: usize) -> Result<(), ConfigError> {
        let config = self.store.configuration().with_grid_size(grid_size)?;
        self.set_configuration(config);
        Ok(())
    }

    pub fn set_max_spawn_value(&mut self, max_spawn_value: u32) -> Result<(), ConfigError> {
        let config = self
            .store
            .configuration()
            .with_max_spawn_value(max_spawn_value)?;
        self.set_configuration(config);
        Ok(())
    }

    fn finish_pending(&mut self) {
        for action in self.scheduler.drain_all() {
            self.store.apply(action);
        }
    }

    fn spawn_random(&mut self, max_value: u32) -> Option<TileId> {
        let choice = choose_spawn(
            self.store.board(),
            self.store.configuration(),
            max_value,
            &mut self.rng,
        );

        match choice {
            Some((position, value)) => Some(self.store.spawn_tile(position, value)),
            None => {
                log::debug!("board full, spawn skipped");
                None
            }
        }
    }

    // Accessors

    /// Tiles in display order.
    pub fn tiles(&self) -> Vec<Tile> {
        self.store.tiles()
    }

    pub fn score(&self) -> u64 {
        self.store.score()
    }

    pub fn in_motion(&self) -> bool {
        self.store.in_motion()
    }

    pub fn is_initial(&self) -> bool {
        self.store.is_initial()
    }

    pub fn can_undo(&self) -> bool {
        self.store.can_undo()
    }

    pub fn configuration(&self) -> &Configuration {
        self.store.configuration()
    }

    pub fn store(&self) -> &BoardStore {
        &self.store
    }

    /// Current reading of the session clock.
    pub fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.scheduler.now()
    }

    /// Number of deferred actions still queued.
    pub fn pending_actions(&self) -> usize {
        self.scheduler.pending_count()
    }

    /// Snapshot for a renderer.
    pub fn to_json(&self) -> serde_json::Value {
        let tiles: Vec<serde_json::Value> =
            self.store.board().tiles().map(|t| t.to_json()).collect();

        serde_json::json!({
            "config": self.store.configuration().to_json(),
            "tiles": tiles,
            "score": self.score(),
            "in_motion": self.in_motion(),
            "initial": self.is_initial(),
            "can_undo": self.can_undo()
        })
    }
}

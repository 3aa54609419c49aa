//! Move engine.
//!
//! Pure computation: given a board and a direction, works out where every
//! tile slides to and which pairs merge. The result is a [`MovePlan`] that
//! the session turns into store transitions; nothing here mutates state.
//!
//! All four directions share one walk. They differ only in the order cells
//! of a line are scanned and in the formula that maps a tile's scan
//! position to its target cell:
//!
//! ```text
//! line l, scan position k, merges so far m, max = N - 1
//!
//! Left   l*N + k - m          Up    l + N*(k - m)
//! Right  l*N + max - k + m    Down  l + N*(max - k + m)
//! ```

use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::board::Board;
use super::config::{spawn_values, Configuration};
use super::tile::{Position, Tile};

/// Move direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Up => "up",
            Self::Down => "down",
        }
    }

    /// Rows for horizontal moves, columns for vertical ones.
    pub fn is_horizontal(&self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }

    /// Tiles pile up toward index `N - 1` of the line.
    fn toward_end(&self) -> bool {
        matches!(self, Self::Right | Self::Down)
    }

    /// Row-major cell indices of `line`, in scan order.
    fn scan_indices(&self, line: usize, grid_size: usize) -> Vec<usize> {
        let cell = |step: usize| {
            if self.is_horizontal() {
                line * grid_size + step
            } else {
                step * grid_size + line
            }
        };

        if self.toward_end() {
            (0..grid_size).rev().map(cell).collect()
        } else {
            (0..grid_size).map(cell).collect()
        }
    }

    /// Target cell index for the `scan_pos`-th occupied tile of `line`
    /// after `merges` merges in that line.
    fn target_index(&self, line: usize, scan_pos: usize, merges: usize, grid_size: usize) -> usize {
        let max = grid_size - 1;
        match self {
            Self::Left => line * grid_size + scan_pos - merges,
            Self::Right => line * grid_size + max - scan_pos + merges,
            Self::Up => line + grid_size * (scan_pos - merges),
            Self::Down => line + grid_size * (max - scan_pos + merges),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One step of a move, in scan order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveStep {
    /// Tile slides to a new cell.
    Slide(Tile),
    /// `source` slides onto `destination`'s new cell and is folded into it
    /// once the animation window elapses.
    Merge { source: Tile, destination: Tile },
}

/// Everything a single move does to the board.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovePlan {
    pub steps: Vec<MoveStep>,
}

impl MovePlan {
    /// Nothing slides and nothing merges.
    pub fn is_noop(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn slide_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s, MoveStep::Slide(_)))
            .count()
    }

    pub fn merge_count(&self) -> usize {
        self.steps.len() - self.slide_count()
    }

    /// Score the move adds once all merges complete.
    pub fn score_gain(&self) -> u64 {
        self.steps
            .iter()
            .map(|s| match s {
                MoveStep::Merge { source, .. } => source.value,
                MoveStep::Slide(_) => 0,
            })
            .sum()
    }
}

/// Compute the slides and merges for moving `board` in `direction`.
pub fn plan_move(board: &Board, grid_size: usize, direction: Direction) -> MovePlan {
    let grid = board.grid(grid_size);
    let mut plan = MovePlan::default();

    for line in 0..grid_size {
        let ids = grid.collect_ids(direction.scan_indices(line, grid_size));

        let mut previous: Option<Tile> = None;
        let mut merges = 0;

        for (scan_pos, id) in ids.into_iter().enumerate() {
            let Some(current) = board.tile(id).copied() else {
                continue;
            };

            match previous {
                Some(destination) if destination.value == current.value => {
                    plan.steps.push(MoveStep::Merge {
                        source: current.at(destination.position),
                        destination,
                    });
                    // A merged tile does not merge again this move
                    previous = None;
                    merges += 1;
                }
                _ => {
                    let index = direction.target_index(line, scan_pos, merges, grid_size);
                    let moved = current.at(Position::from_index(index, grid_size));

                    if moved.position != current.position {
                        plan.steps.push(MoveStep::Slide(moved));
                    }
                    previous = Some(moved);
                }
            }
        }
    }

    plan
}

/// Pick a uniformly random empty cell and a uniformly random value from
/// `2..=max_value`. Returns `None` when the board is full.
pub fn choose_spawn<R: Rng + ?Sized>(
    board: &Board,
    config: &Configuration,
    max_value: u32,
    rng: &mut R,
) -> Option<(Position, u32)> {
    let empty = board.grid(config.grid_size()).empty_positions();
    let position = *empty.choose(rng)?;
    let value = *spawn_values(max_value).choose(rng)?;
    Some((position, value))
}

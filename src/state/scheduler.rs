//! Deferred action queue.
//!
//! A single-threaded timer queue driven by an explicit clock. Actions are
//! scheduled with a delay and released once the clock is advanced past
//! their due time. Actions due at the same instant are released in the
//! order they were scheduled. The clock saturates at the latest instant
//! `chrono` can represent instead of overflowing.

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};

/// An action waiting for its due time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledTask<T> {
    pub due: DateTime<Utc>,
    /// Scheduling order, breaks ties between equal due times
    pub seq: u64,
    pub action: T,
}

/// Timer queue with a virtual clock.
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    now: DateTime<Utc>,
    next_seq: u64,
    /// Sorted by `(due, seq)`
    pending: VecDeque<ScheduledTask<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl<T> Scheduler<T> {
    /// Create a scheduler whose clock starts at `start`.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: start,
            next_seq: 0,
            pending: VecDeque::new(),
        }
    }

    /// Current clock reading.
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Queue `action` to fire `delay` from now. Returns its sequence number.
    pub fn schedule(&mut self, delay: Duration, action: T) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;

        let due = self.offset(delay);
        // Equal due times keep scheduling order
        let at = self.pending.partition_point(|task| task.due <= due);
        self.pending.insert(at, ScheduledTask { due, seq, action });
        seq
    }

    /// Move the clock forward and release every action now due.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<T> {
        let target = self.offset(elapsed);
        self.advance_to(target)
    }

    /// `now + delay`, with negative delays treated as zero.
    fn offset(&self, delay: Duration) -> DateTime<Utc> {
        self.now
            .checked_add_signed(delay.max(Duration::zero()))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Move the clock to `instant` (never backwards) and release every
    /// action due by then.
    pub fn advance_to(&mut self, instant: DateTime<Utc>) -> Vec<T> {
        if instant > self.now {
            self.now = instant;
        }

        let ready = self.pending.partition_point(|task| task.due <= self.now);
        self.pending.drain(..ready).map(|task| task.action).collect()
    }

    /// Release everything pending, moving the clock to the last due time.
    pub fn drain_all(&mut self) -> Vec<T> {
        match self.pending.back().map(|task| task.due) {
            Some(last) => self.advance_to(last),
            None => Vec::new(),
        }
    }

    /// Due time of the next pending action.
    pub fn next_due(&self) -> Option<DateTime<Utc>> {
        self.pending.front().map(|task| task.due)
    }

    pub fn pending(&self) -> impl Iterator<Item = &ScheduledTask<T>> {
        self.pending.iter()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }
}

//! Tile scheduling as a deterministic time-ordered queue.
//!
//! Scheduling a melody pushes one spawn per step at its cumulative onset.
//! The driving loop drains whatever is due each tick, so playback depends
//! only on the times it is given, never on frame rate or wall-clock timers.
//! Entries cannot be cancelled once queued.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::melody::Melody;

/// A request to drop one tile toward `note`.
#[derive(Clone, Debug, PartialEq)]
pub struct TileSpawn {
    pub note:       String,
    pub fall_speed: f32,
    /// Scheduled time, for logging and tests.
    pub due_ms:     u64,
}

#[derive(Debug)]
struct Entry {
    due_ms: u64,
    seq:    u64,
    spawn:  TileSpawn,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.due_ms == other.due_ms && self.seq == other.seq
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due_ms, self.seq).cmp(&(other.due_ms, other.seq))
    }
}

#[derive(Debug, Default)]
pub struct TileScheduler {
    queue:    BinaryHeap<Reverse<Entry>>,
    next_seq: u64,
}

impl TileScheduler {
    pub fn new() -> Self { Self::default() }

    /// Queue every step of `melody` relative to `start_ms`. Returns the
    /// number of spawns queued.
    pub fn schedule(&mut self, melody: &Melody, start_ms: u64, fall_speed: f32) -> usize {
        for ((note, _), onset) in melody.steps.iter().zip(melody.onsets()) {
            let due_ms = start_ms + onset;
            let spawn = TileSpawn { note: note.clone(), fall_speed, due_ms };
            self.queue.push(Reverse(Entry { due_ms, seq: self.next_seq, spawn }));
            self.next_seq += 1;
        }
        melody.len()
    }

    /// Remove and return every spawn due at or before `now_ms`, earliest
    /// first; equal times keep the order they were scheduled in.
    pub fn drain_due(&mut self, now_ms: u64) -> Vec<TileSpawn> {
        let mut due = Vec::new();
        while let Some(Reverse(top)) = self.queue.peek() {
            if top.due_ms > now_ms { break; }
            if let Some(Reverse(entry)) = self.queue.pop() {
                due.push(entry.spawn);
            }
        }
        due
    }

    pub fn pending(&self) -> usize { self.queue.len() }

    pub fn next_due(&self) -> Option<u64> {
        self.queue.peek().map(|Reverse(e)| e.due_ms)
    }
}

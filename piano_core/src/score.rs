//! Timing-window scoring for teach mode.
//!
//! When a falling tile reaches its key while auto-play is off, the collision
//! time is recorded per note.  The next user press of that note consumes the
//! record and earns the reward if it landed within the scoring window.

use std::collections::HashMap;

pub const DEFAULT_WINDOW_MS: u64 = 300;
pub const DEFAULT_REWARD:    u32 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScoreOutcome {
    /// No collision was pending for the note.
    NoRecord,
    /// Pressed within the window.
    Hit { points: u32 },
    /// A collision was pending but the press came too late; the record is spent.
    Missed { late_by_ms: u64 },
}

#[derive(Clone, Debug)]
pub struct ScoreEngine {
    /// Most recent unconsumed collision per note.
    records:   HashMap<String, u64>,
    score:     u64,
    window_ms: u64,
    reward:    u32,
}

impl Default for ScoreEngine {
    fn default() -> Self {
        ScoreEngine::new(DEFAULT_WINDOW_MS, DEFAULT_REWARD)
    }
}

impl ScoreEngine {
    pub fn new(window_ms: u64, reward: u32) -> Self {
        ScoreEngine { records: HashMap::new(), score: 0, window_ms, reward }
    }

    /// Overwrites any unconsumed record for the same note.
    pub fn record_collision(&mut self, note: &str, at_ms: u64) {
        if let Some(prev) = self.records.insert(note.to_string(), at_ms) {
            log::debug!("collision for {} at {} ms replaces unconsumed {} ms", note, at_ms, prev);
        }
    }

    pub fn on_user_trigger(&mut self, note: &str, now_ms: u64) -> ScoreOutcome {
        let Some(at_ms) = self.records.remove(note) else {
            return ScoreOutcome::NoRecord;
        };
        let elapsed = now_ms.saturating_sub(at_ms);
        if elapsed <= self.window_ms {
            self.score += u64::from(self.reward);
            log::debug!("{} hit {} ms after collision (+{}, score {})", note, elapsed, self.reward, self.score);
            ScoreOutcome::Hit { points: self.reward }
        } else {
            ScoreOutcome::Missed { late_by_ms: elapsed - self.window_ms }
        }
    }

    pub fn score(&self) -> u64 { self.score }
    pub fn window_ms(&self) -> u64 { self.window_ms }
    pub fn pending(&self, note: &str) -> Option<u64> { self.records.get(note).copied() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_inside_window() {
        let mut s = ScoreEngine::default();
        s.record_collision("g4", 1000);
        assert_eq!(s.on_user_trigger("g4", 1250), ScoreOutcome::Hit { points: 10 });
        assert_eq!(s.score(), 10);
        assert_eq!(s.pending("g4"), None);
    }

    #[test]
    fn late_press_consumes_without_scoring() {
        let mut s = ScoreEngine::default();
        s.record_collision("g4", 1000);
        assert_eq!(s.on_user_trigger("g4", 1400), ScoreOutcome::Missed { late_by_ms: 100 });
        assert_eq!(s.score(), 0);
        assert_eq!(s.pending("g4"), None);
    }

    #[test]
    fn window_boundary() {
        let mut s = ScoreEngine::default();
        s.record_collision("c4", 0);
        assert!(matches!(s.on_user_trigger("c4", 300), ScoreOutcome::Hit { .. }));
        s.record_collision("c4", 0);
        assert_eq!(s.on_user_trigger("c4", 301), ScoreOutcome::Missed { late_by_ms: 1 });
    }

    #[test]
    fn record_is_single_use() {
        let mut s = ScoreEngine::default();
        s.record_collision("e4", 500);
        s.on_user_trigger("e4", 510);
        assert_eq!(s.on_user_trigger("e4", 520), ScoreOutcome::NoRecord);
        assert_eq!(s.score(), 10);
    }

    #[test]
    fn later_collision_overwrites() {
        let mut s = ScoreEngine::default();
        s.record_collision("a4", 1000);
        s.record_collision("a4", 2000);
        assert_eq!(s.pending("a4"), Some(2000));
        assert!(matches!(s.on_user_trigger("a4", 2100), ScoreOutcome::Hit { .. }));

        s.record_collision("a4", 3000);
        s.record_collision("a4", 3500);
        // lateness is measured from the surviving record only
        assert_eq!(s.on_user_trigger("a4", 3900), ScoreOutcome::Missed { late_by_ms: 100 });
    }

    #[test]
    fn press_without_record_is_no_op() {
        let mut s = ScoreEngine::default();
        assert_eq!(s.on_user_trigger("b4", 42), ScoreOutcome::NoRecord);
        assert_eq!(s.score(), 0);
    }

    #[test]
    fn custom_window_and_reward() {
        let mut s = ScoreEngine::new(50, 3);
        s.record_collision("d5", 100);
        assert_eq!(s.on_user_trigger("d5", 150), ScoreOutcome::Hit { points: 3 });
        assert_eq!(s.window_ms(), 50);
    }
}

//! Falling tiles and their collision with the key regions.
//!
//! Each tile is a square that drops from just above the screen toward the
//! top edge of its key.  It is either falling or finished; the first update
//! in which its leading (bottom) edge reaches the key's top edge finishes it
//! and reports a collision.  Finished tiles are dropped from the active set
//! in the same update.

use crate::error::{PianoError, PianoResult};
use crate::geometry::Rect;
use crate::layout::KeyLayout;

pub const DEFAULT_OFFSET_STEP: f32 = 20.0;
pub const DEFAULT_TILE_SCALE:  f32 = 0.7;
/// Slowest a tile may fall (px per update); anything below, or not a
/// number, is raised to this so every tile eventually lands.
pub const MIN_FALL_SPEED:      f32 = 0.5;

// ════════════════════════════════════════════════════════════════════════════
// FallingTile
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub struct FallingTile {
    pub note:     String,
    pub target:   Rect,
    /// Top edge of the tile.
    pub y:        f32,
    /// Pixels per update.
    pub speed:    f32,
    /// Horizontal shift used to tell apart repeats of the same note.
    pub x_offset: f32,
    /// Edge length of the square.
    pub side:     f32,
    pub finished: bool,
}

impl FallingTile {
    fn new(note: &str, target: Rect, speed: f32, x_offset: f32, scale: f32) -> Self {
        let side = target.w * scale;
        FallingTile {
            note: note.to_string(),
            target,
            y: -side,
            speed,
            x_offset,
            side,
            finished: false,
        }
    }

    pub fn leading_edge(&self) -> f32 { self.y + self.side }

    /// Current on-screen rectangle.
    pub fn bounds(&self) -> Rect {
        let x = self.target.x + self.x_offset + (self.target.w - self.side) / 2.0;
        Rect::new(x, self.y, self.side, self.side)
    }

    /// One update. Returns true on the falling → finished transition.
    fn advance(&mut self) -> bool {
        if self.finished {
            return false;
        }
        self.y += self.speed;
        if self.leading_edge() >= self.target.top() {
            self.finished = true;
            return true;
        }
        false
    }
}

/// A tile reaching its key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileCollision {
    pub note:  String,
    pub at_ms: u64,
}

// ════════════════════════════════════════════════════════════════════════════
// TileCollisionEngine
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct TileCollisionEngine {
    tiles:       Vec<FallingTile>,
    offset_step: f32,
    scale:       f32,
}

impl Default for TileCollisionEngine {
    fn default() -> Self {
        TileCollisionEngine::new(DEFAULT_OFFSET_STEP, DEFAULT_TILE_SCALE)
    }
}

impl TileCollisionEngine {
    pub fn new(offset_step: f32, scale: f32) -> Self {
        TileCollisionEngine { tiles: Vec::new(), offset_step, scale }
    }

    /// Drop a new tile toward `note`'s key, shifted right by one offset step
    /// for every tile of the same note still falling.
    pub fn spawn(&mut self, layout: &KeyLayout, note: &str, fall_speed: f32) -> PianoResult<()> {
        let region = layout
            .region(note)
            .ok_or_else(|| PianoError::UnknownNote(note.to_string()))?;
        let speed = if fall_speed.is_finite() && fall_speed >= MIN_FALL_SPEED {
            fall_speed
        } else {
            log::warn!("fall speed {} for {} raised to {}", fall_speed, note, MIN_FALL_SPEED);
            MIN_FALL_SPEED
        };
        let x_offset = self.active_count(note) as f32 * self.offset_step;
        self.tiles.push(FallingTile::new(note, region.bounds, speed, x_offset, self.scale));
        Ok(())
    }

    /// Move every tile one step, in spawn order, and return the collisions
    /// that happened during this update.
    pub fn advance(&mut self, now_ms: u64) -> Vec<TileCollision> {
        let mut hits = Vec::new();
        for tile in &mut self.tiles {
            if tile.advance() {
                hits.push(TileCollision { note: tile.note.clone(), at_ms: now_ms });
            }
        }
        self.tiles.retain(|t| !t.finished);
        hits
    }

    pub fn tiles(&self) -> &[FallingTile] { &self.tiles }

    pub fn active_count(&self, note: &str) -> usize {
        self.tiles.iter().filter(|t| t.note == note && !t.finished).count()
    }

    pub fn is_empty(&self) -> bool { self.tiles.is_empty() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{KeyKind, KeyRegion};

    fn layout() -> KeyLayout {
        KeyLayout::from_regions(vec![
            KeyRegion::new("c4", Rect::new(0.0, 100.0, 50.0, 100.0), KeyKind::White),
            KeyRegion::new("d4", Rect::new(50.0, 100.0, 50.0, 100.0), KeyKind::White),
        ])
    }

    #[test]
    fn tile_starts_above_screen() {
        let mut e = TileCollisionEngine::default();
        e.spawn(&layout(), "c4", 4.0).unwrap();
        let t = &e.tiles()[0];
        assert_eq!(t.side, 35.0);
        assert_eq!(t.y, -35.0);
        assert_eq!(t.bounds().x, 7.5);
    }

    #[test]
    fn collides_on_first_frame_edge_reaches_key() {
        let mut e = TileCollisionEngine::default();
        e.spawn(&layout(), "c4", 5.0).unwrap();
        // leading edge starts at 0 and must reach 100: 20 updates of 5 px
        for frame in 1..20 {
            assert!(e.advance(frame).is_empty(), "early collision at {}", frame);
        }
        let hits = e.advance(20);
        assert_eq!(hits, vec![TileCollision { note: "c4".into(), at_ms: 20 }]);
        assert!(e.is_empty());
    }

    #[test]
    fn overshoot_still_collides_once() {
        let mut e = TileCollisionEngine::default();
        e.spawn(&layout(), "c4", 300.0).unwrap();
        assert_eq!(e.advance(1).len(), 1);
        assert!(e.advance(2).is_empty());
    }

    #[test]
    fn repeats_of_one_note_are_offset() {
        let l = layout();
        let mut e = TileCollisionEngine::default();
        e.spawn(&l, "c4", 4.0).unwrap();
        e.spawn(&l, "c4", 4.0).unwrap();
        e.spawn(&l, "d4", 4.0).unwrap();
        e.spawn(&l, "c4", 4.0).unwrap();
        let offsets: Vec<_> = e.tiles().iter().map(|t| (t.note.as_str(), t.x_offset)).collect();
        assert_eq!(offsets, vec![("c4", 0.0), ("c4", 20.0), ("d4", 0.0), ("c4", 40.0)]);
        assert_eq!(e.active_count("c4"), 3);
    }

    #[test]
    fn offset_does_not_change_collision_timing() {
        let l = layout();
        let mut e = TileCollisionEngine::default();
        e.spawn(&l, "c4", 10.0).unwrap();
        e.spawn(&l, "c4", 10.0).unwrap();
        let mut hits = Vec::new();
        for now in 0..20 {
            hits.extend(e.advance(now));
        }
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].at_ms, hits[1].at_ms);
    }

    #[test]
    fn offset_resets_once_earlier_tiles_finish() {
        let l = layout();
        let mut e = TileCollisionEngine::default();
        e.spawn(&l, "c4", 200.0).unwrap();
        e.advance(0);
        e.spawn(&l, "c4", 4.0).unwrap();
        assert_eq!(e.tiles()[0].x_offset, 0.0);
    }

    #[test]
    fn stalled_speeds_still_land() {
        let l = layout();
        let mut e = TileCollisionEngine::default();
        for speed in [0.0, -3.0, f32::NAN, f32::INFINITY] {
            e.spawn(&l, "d4", speed).unwrap();
        }
        assert!(e.tiles().iter().all(|t| t.speed == MIN_FALL_SPEED));
        // leading edge 0 → 100 at 0.5 px per update
        let mut hits = 0;
        for now in 1..=200 {
            hits += e.advance(now).len();
        }
        assert_eq!(hits, 4);
        assert!(e.is_empty());
    }

    #[test]
    fn unknown_note_is_rejected() {
        let mut e = TileCollisionEngine::default();
        assert_eq!(
            e.spawn(&layout(), "q9", 4.0).unwrap_err(),
            PianoError::UnknownNote("q9".into())
        );
        assert!(e.is_empty());
    }
}

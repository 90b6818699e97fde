//! Flying-note effects.
//!
//! Every sounded key throws a small note glyph out of its key.  Each glyph
//! starts somewhere inside the key, drifts in a random direction, and is
//! gone after about a second.

use piano_core::{EffectSink, Rect};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const EFFECT_LIFETIME_MS: u64 = 1_000;
pub const EFFECT_STEP_MS:     u64 = 33;

/// Which glyph a flying note is drawn with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoteGlyph {
    Crotchet,
    Quaver,
    BeamedPair,
}

const GLYPHS: [NoteGlyph; 3] = [NoteGlyph::Crotchet, NoteGlyph::Quaver, NoteGlyph::BeamedPair];

#[derive(Clone, Debug, PartialEq)]
pub struct FlyingNote {
    /// Centre of the glyph.
    pub x:          f32,
    pub y:          f32,
    pub vx:         f32,
    pub vy:         f32,
    pub scale:      f32,
    pub glyph:      NoteGlyph,
    pub elapsed_ms: u64,
}

impl FlyingNote {
    /// Remaining opacity, 1.0 when spawned down to 0.0 at end of life.
    pub fn fade(&self) -> f32 {
        1.0 - (self.elapsed_ms as f32 / EFFECT_LIFETIME_MS as f32).min(1.0)
    }

    /// One animation step; false once the note has expired.
    fn step(&mut self) -> bool {
        self.elapsed_ms += EFFECT_STEP_MS;
        if self.elapsed_ms >= EFFECT_LIFETIME_MS {
            return false;
        }
        self.x += self.vx;
        self.y += self.vy;
        true
    }
}

// ════════════════════════════════════════════════════════════════════════════
// EffectLayer
// ════════════════════════════════════════════════════════════════════════════

pub struct EffectLayer {
    notes: Vec<FlyingNote>,
    rng:   StdRng,
}

impl Default for EffectLayer {
    fn default() -> Self {
        EffectLayer::with_rng(StdRng::from_entropy())
    }
}

impl EffectLayer {
    pub fn with_seed(seed: u64) -> Self {
        EffectLayer::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        EffectLayer { notes: Vec::new(), rng }
    }

    /// Advance every note by one step and drop the expired ones.
    pub fn tick(&mut self) {
        self.notes.retain_mut(FlyingNote::step);
    }

    pub fn notes(&self) -> &[FlyingNote] { &self.notes }

    pub fn len(&self) -> usize { self.notes.len() }

    pub fn is_empty(&self) -> bool { self.notes.is_empty() }
}

impl EffectSink for EffectLayer {
    fn spawn_effect(&mut self, anchor: Rect) {
        let c = anchor.center();
        let x = c.x + self.rng.gen_range(-0.5f32..=0.5) * anchor.w;
        let y = c.y + self.rng.gen_range(-0.5f32..=0.5) * anchor.h;
        let angle = self.rng.gen_range(0.0..std::f32::consts::TAU);
        let speed: f32 = self.rng.gen_range(1.0..3.0);
        let glyph = GLYPHS[self.rng.gen_range(0..GLYPHS.len())];
        self.notes.push(FlyingNote {
            x,
            y,
            vx: speed * angle.cos(),
            vy: speed * angle.sin(),
            scale: self.rng.gen_range(0.5..1.2),
            glyph,
            elapsed_ms: 0,
        });
    }
}

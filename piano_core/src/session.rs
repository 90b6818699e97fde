//! `Piano` — one playing session, wiring every core component together.
//!
//! Two independent ticks drive it, both from the same thread:
//!
//! * [`Piano::on_frame`] once per camera frame (touch-lift detection), and
//! * [`Piano::tick_tiles`] once per animation step (spawns, falling, collisions).
//!
//! Neither tick assumes anything about the other's cadence.  All time comes
//! in as `now_ms`, so a session can be replayed exactly.

use crate::error::PianoResult;
use crate::hand::HandFrame;
use crate::layout::KeyLayout;
use crate::melody::Melody;
use crate::schedule::TileScheduler;
use crate::score::{ScoreEngine, ScoreOutcome, DEFAULT_REWARD, DEFAULT_WINDOW_MS};
use crate::settings::Settings;
use crate::tiles::{FallingTile, TileCollision, TileCollisionEngine, DEFAULT_OFFSET_STEP, DEFAULT_TILE_SCALE};
use crate::touch::{NoteOn, TouchLiftDetector};
use crate::trigger::{EffectSink, NoteTriggerService, Origin, SoundSink, TriggerOutcome};

// ════════════════════════════════════════════════════════════════════════════
// PianoConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PianoConfig {
    pub score_window_ms:  u64,
    pub score_reward:     u32,
    /// Horizontal shift per already-falling tile of the same note (px).
    pub tile_offset_step: f32,
    /// Tile edge as a fraction of its key's width.
    pub tile_scale:       f32,
    /// Pixels per tile update.
    pub fall_speed:       f32,
}

impl Default for PianoConfig {
    fn default() -> Self {
        PianoConfig {
            score_window_ms:  DEFAULT_WINDOW_MS,
            score_reward:     DEFAULT_REWARD,
            tile_offset_step: DEFAULT_OFFSET_STEP,
            tile_scale:       DEFAULT_TILE_SCALE,
            fall_speed:       4.0,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Piano
// ════════════════════════════════════════════════════════════════════════════

pub struct Piano<S, E> {
    layout:    KeyLayout,
    settings:  Settings,
    config:    PianoConfig,
    detector:  TouchLiftDetector,
    scheduler: TileScheduler,
    tiles:     TileCollisionEngine,
    score:     ScoreEngine,
    trigger:   NoteTriggerService<S, E>,
}

impl<S: SoundSink, E: EffectSink> Piano<S, E> {
    pub fn new(layout: KeyLayout, settings: Settings, config: PianoConfig, sound: S, effects: E) -> Self {
        Piano {
            detector:  TouchLiftDetector::new(&layout),
            scheduler: TileScheduler::new(),
            tiles:     TileCollisionEngine::new(config.tile_offset_step, config.tile_scale),
            score:     ScoreEngine::new(config.score_window_ms, config.score_reward),
            trigger:   NoteTriggerService::new(sound, effects),
            layout,
            settings,
            config,
        }
    }

    // ── camera tick ──────────────────────────────────────────────────────

    /// Run touch-lift detection on one frame and trigger every new note-on.
    /// `None` means the frame could not be captured: held keys stay held and
    /// nothing fires.
    pub fn on_frame(&mut self, frame: Option<&HandFrame>, now_ms: u64) -> Vec<NoteOn> {
        let Some(frame) = frame else {
            self.detector.skip();
            return Vec::new();
        };
        let events = self.detector.process(&self.layout, frame);
        for ev in &events {
            self.sound_user_note(&ev.note, now_ms);
        }
        events
    }

    /// Manual key press (click or keyboard shortcut); same as a touch.
    pub fn press(&mut self, note: &str, now_ms: u64) -> TriggerOutcome {
        self.sound_user_note(note, now_ms)
    }

    fn sound_user_note(&mut self, note: &str, now_ms: u64) -> TriggerOutcome {
        let out = self.trigger.trigger(
            note, Origin::User, self.settings, now_ms, &self.layout, &mut self.score,
        );
        if let TriggerOutcome::Played { scored: ScoreOutcome::Hit { points } } = out {
            log::info!("{} on time: +{} (score {})", note, points, self.score.score());
        }
        out
    }

    // ── melodies ─────────────────────────────────────────────────────────

    /// Schedule a built-in melody by name, starting at `now_ms`.
    pub fn launch(&mut self, name: &str, now_ms: u64) -> PianoResult<usize> {
        let melody = Melody::by_name(name)?;
        Ok(self.launch_melody(&melody, now_ms))
    }

    pub fn launch_melody(&mut self, melody: &Melody, now_ms: u64) -> usize {
        let n = self.scheduler.schedule(melody, now_ms, self.config.fall_speed);
        log::info!("scheduled {} tiles for {}", n, melody.name);
        n
    }

    // ── animation tick ───────────────────────────────────────────────────

    /// Spawn due tiles, move every tile one step, and route each collision:
    /// with auto-play the tile sounds its own note, otherwise the collision
    /// is recorded for scoring.
    pub fn tick_tiles(&mut self, now_ms: u64) -> Vec<TileCollision> {
        for spawn in self.scheduler.drain_due(now_ms) {
            if let Err(e) = self.tiles.spawn(&self.layout, &spawn.note, spawn.fall_speed) {
                log::warn!("tile dropped: {}", e);
            }
        }

        let collisions = self.tiles.advance(now_ms);
        for hit in &collisions {
            if self.settings.auto_play_enabled {
                self.trigger.trigger(
                    &hit.note, Origin::TileAuto, self.settings, now_ms, &self.layout, &mut self.score,
                );
            } else {
                self.score.record_collision(&hit.note, hit.at_ms);
            }
        }
        collisions
    }

    // ── mode toggles ─────────────────────────────────────────────────────

    pub fn toggle_teach_mode(&mut self) -> Settings {
        self.settings = self.settings.toggled_teach_mode();
        log::info!("teach mode {}", if self.settings.teach_mode() { "on" } else { "off" });
        self.settings
    }

    pub fn toggle_labels(&mut self) -> Settings {
        self.settings = self.settings.toggled_labels();
        self.settings
    }

    // ── accessors ────────────────────────────────────────────────────────

    pub fn settings(&self) -> Settings { self.settings }
    pub fn config(&self) -> &PianoConfig { &self.config }
    pub fn layout(&self) -> &KeyLayout { &self.layout }
    pub fn score(&self) -> u64 { self.score.score() }
    pub fn score_engine(&self) -> &ScoreEngine { &self.score }
    pub fn tiles(&self) -> &[FallingTile] { self.tiles.tiles() }
    pub fn pending_spawns(&self) -> usize { self.scheduler.pending() }

    pub fn is_held(&self, note: &str) -> bool {
        self.detector.state().is_held(note)
    }

    /// Held keys, in layout order.
    pub fn held_notes(&self) -> impl Iterator<Item = &str> + '_ {
        self.detector.state().held_notes(&self.layout)
    }

    pub fn sound(&self) -> &S { self.trigger.sound() }
    pub fn sound_mut(&mut self) -> &mut S { self.trigger.sound_mut() }
    pub fn effects(&self) -> &E { self.trigger.effects() }
    pub fn effects_mut(&mut self) -> &mut E { self.trigger.effects_mut() }
}

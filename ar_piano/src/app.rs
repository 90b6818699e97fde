//! Top-level application state machine.
//!
//! `AppState` owns the [`Piano`] session (with the MIDI [`Player`] and the
//! [`EffectLayer`] plugged in as its sinks), the melody picker and the most
//! recent hand frame.  `run` drives it on two independent cadences: touch
//! detection every 30 ms and tile animation every 33 ms, rendering on every
//! pass through the loop.

use std::io::{self, BufReader};
use std::sync::mpsc::{self, Receiver};

use piano_core::{
    BuiltinMelody, HandFrame, KeyLayout, NoteOn, Piano, PianoConfig, ScoreOutcome, Settings,
    SystemClock, TimeProvider, TriggerOutcome,
};
use piano_midi::Instrument;

use crate::effects::EffectLayer;
use crate::hands::{spawn_hand_source, FrameScale, JsonLinesSource, SimHandSource};
use crate::player::{unmapped_notes, Player, PlayerConfig};
use crate::visualizer::{Scene, UiCommand, Visualizer};

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Where hand landmarks come from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum HandInput {
    /// The mouse is an index fingertip while the left button is held.
    Sim,
    /// JSON detection results, one per line, on standard input.
    Stdin,
}

/// Configuration for the full application.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub width:              usize,
    pub height:             usize,
    pub hands:              HandInput,
    /// Mirror tracker x coordinates (front-facing camera).
    pub mirror:             bool,
    pub player:             PlayerConfig,
    /// Substring of the MIDI port name to prefer.
    pub midi_port:          Option<String>,
    pub piano:              PianoConfig,
    pub settings:           Settings,
    /// Launched as soon as the window opens.
    pub melody:             Option<BuiltinMelody>,
    pub detect_interval_ms: u64,
    pub tile_interval_ms:   u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            width:              1280,
            height:             720,
            hands:              HandInput::Sim,
            mirror:             true,
            player:             PlayerConfig::default(),
            midi_port:          None,
            piano:              PianoConfig::default(),
            settings:           Settings::default(),
            melody:             None,
            detect_interval_ms: 30,
            tile_interval_ms:   33,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Cadence — a fixed-interval tick on a shared clock
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug)]
pub struct Cadence {
    interval_ms: u64,
    next_ms:     u64,
}

impl Cadence {
    pub fn new(interval_ms: u64, start_ms: u64) -> Self {
        Cadence { interval_ms: interval_ms.max(1), next_ms: start_ms }
    }

    /// True at most once per interval.  After a stall the schedule restarts
    /// from `now_ms` instead of firing a burst of catch-up ticks.
    pub fn due(&mut self, now_ms: u64) -> bool {
        if now_ms < self.next_ms {
            return false;
        }
        self.next_ms += self.interval_ms;
        if self.next_ms <= now_ms {
            self.next_ms = now_ms + self.interval_ms;
        }
        true
    }
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    piano:    Piano<Player, EffectLayer>,
    melodies: Vec<BuiltinMelody>,
    selected: usize,
    /// Newest frame not yet run through touch detection.
    pending:  Option<HandFrame>,
    /// Frame shown by the skeleton overlay.
    shown:    Option<HandFrame>,
    pub status: String,
}

impl AppState {
    pub fn new(cfg: &AppConfig, player: Player, effects: EffectLayer) -> Self {
        let layout = KeyLayout::reference(cfg.width as f32, cfg.height as f32);
        let silent = unmapped_notes(&layout);
        if !silent.is_empty() {
            log::warn!("no MIDI pitch for {}; those keys stay silent", silent.join(", "));
        }

        let melodies = BuiltinMelody::all();
        let selected = cfg
            .melody
            .and_then(|m| melodies.iter().position(|&x| x == m))
            .unwrap_or(0);

        AppState {
            piano: Piano::new(layout, cfg.settings, cfg.piano, player, effects),
            melodies,
            selected,
            pending: None,
            shown: None,
            status: "Ready".to_string(),
        }
    }

    pub fn piano(&self) -> &Piano<Player, EffectLayer> { &self.piano }

    pub fn layout(&self) -> &KeyLayout { self.piano.layout() }

    pub fn selected_melody(&self) -> BuiltinMelody { self.melodies[self.selected] }

    // ── user commands ─────────────────────────────────────────────────────

    /// Apply one command.  Returns false when the app should quit.
    pub fn handle(&mut self, cmd: UiCommand, now_ms: u64) -> bool {
        match cmd {
            UiCommand::Press(note) => {
                let out = self.piano.press(&note, now_ms);
                self.report_press(&note, out);
            }
            UiCommand::ToggleTeach => {
                let s = self.piano.toggle_teach_mode();
                self.status = if s.teach_mode() {
                    "Teach mode: tiles are silent, play them yourself".to_string()
                } else {
                    "Auto-play: tiles play themselves".to_string()
                };
            }
            UiCommand::ToggleLabels => {
                let s = self.piano.toggle_labels();
                self.status = format!("Labels {}", if s.show_labels { "on" } else { "off" });
            }
            UiCommand::NextInstrument => {
                let next = next_instrument(self.piano.sound().instrument());
                self.piano.sound_mut().set_instrument(next);
                self.status = format!("Instrument: {}", next);
            }
            UiCommand::NextMelody => {
                self.selected = (self.selected + 1) % self.melodies.len();
                self.status = format!("Selected {}", self.selected_melody());
            }
            UiCommand::LaunchMelody => self.launch_selected(now_ms),
            UiCommand::Quit => return false,
        }
        true
    }

    pub fn launch_selected(&mut self, now_ms: u64) {
        let melody = self.selected_melody().melody();
        let n = self.piano.launch_melody(&melody, now_ms);
        self.status = format!("Playing {}: {} tiles", melody.name, n);
    }

    fn report_press(&mut self, note: &str, out: TriggerOutcome) {
        let name = note.to_uppercase();
        self.status = match out {
            TriggerOutcome::Played { scored: ScoreOutcome::Hit { points } } => {
                format!("{} on time! +{}", name, points)
            }
            TriggerOutcome::Played { scored: ScoreOutcome::Missed { late_by_ms } } => {
                format!("{} late by {} ms", name, late_by_ms)
            }
            _ => name,
        };
    }

    // ── hand frames ───────────────────────────────────────────────────────

    /// Keep only the newest frame; detection consumes at most one per tick.
    pub fn offer_frame(&mut self, frame: HandFrame) {
        self.pending = Some(frame);
    }

    /// One detection tick.  With no new frame since the last tick the
    /// detector is told the frame was missed.
    pub fn detect(&mut self, now_ms: u64) -> Vec<NoteOn> {
        let frame = self.pending.take();
        let before = self.piano.score();
        let events = self.piano.on_frame(frame.as_ref(), now_ms);
        if let Some(f) = frame {
            self.shown = Some(f);
        }

        if let Some(last) = events.last() {
            let names: Vec<String> = events.iter().map(|e| e.note.to_uppercase()).collect();
            let gained = self.piano.score() - before;
            self.status = if gained > 0 {
                format!("{} on time! +{}", names.join(" "), gained)
            } else {
                names.join(" ")
            };
            log::debug!("frame {}: {}", last.frame, self.status);
        }
        events
    }

    // ── animation ─────────────────────────────────────────────────────────

    pub fn animate(&mut self, now_ms: u64) {
        self.piano.tick_tiles(now_ms);
        self.piano.effects_mut().tick();
    }

    pub fn render(&self, vis: &mut Visualizer) {
        let held: Vec<&str> = self.piano.held_notes().collect();
        let melody = self.selected_melody().to_string();
        vis.render(&Scene {
            layout:   self.piano.layout(),
            held:     &held,
            tiles:    self.piano.tiles(),
            effects:  self.piano.effects().notes(),
            hands:    self.shown.as_ref(),
            settings: self.piano.settings(),
            score:    self.piano.score(),
            melody:   &melody,
            status:   &self.status,
        });
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the full application.
///
/// Opens the window, starts the hand source and the MIDI player, and drives
/// detection, animation and rendering until the window closes or Esc.
pub fn run(cfg: AppConfig) -> anyhow::Result<()> {
    log::info!(
        "starting: {}x{}, hands={:?}, instrument={}, teach={}",
        cfg.width, cfg.height, cfg.hands, cfg.player.instrument, cfg.settings.teach_mode()
    );

    // ── Hand source ───────────────────────────────────────────────────────
    let (frames, sim_tx) = match cfg.hands {
        HandInput::Sim => {
            let (tx, rx) = mpsc::channel();
            (spawn_hand_source(SimHandSource { rx }), Some(tx))
        }
        HandInput::Stdin => {
            let scale = FrameScale {
                width:  cfg.width as f32,
                height: cfg.height as f32,
                mirror: cfg.mirror,
            };
            let reader = BufReader::new(io::stdin());
            (spawn_hand_source(JsonLinesSource { reader, scale }), None)
        }
    };

    // ── Visualizer, player, state ─────────────────────────────────────────
    let mut vis = Visualizer::new(cfg.width, cfg.height, sim_tx)?;
    let player = Player::spawn(cfg.player, cfg.midi_port.clone());
    let mut app = AppState::new(&cfg, player, EffectLayer::default());

    let clock = SystemClock::new();
    if cfg.melody.is_some() {
        app.launch_selected(clock.now_ms());
    }

    let mut detect = Cadence::new(cfg.detect_interval_ms, clock.now_ms());
    let mut animate = Cadence::new(cfg.tile_interval_ms, clock.now_ms());

    // ── Main loop ─────────────────────────────────────────────────────────
    'main: while vis.is_open() {
        let now = clock.now_ms();

        for cmd in vis.poll_input(app.layout()) {
            if !app.handle(cmd, now) { break 'main; }
        }

        drain_latest(&frames, &mut app);

        if detect.due(now)  { app.detect(now); }
        if animate.due(now) { app.animate(now); }

        app.render(&mut vis);
    }

    log::info!("final score: {}", app.piano().score());
    Ok(())
}

/// The instrument after `current`, wrapping round the list.
fn next_instrument(current: Instrument) -> Instrument {
    let all = Instrument::all();
    let at = all.iter().position(|&i| i == current).map_or(0, |i| (i + 1) % all.len());
    all[at]
}

fn drain_latest(frames: &Receiver<HandFrame>, app: &mut AppState) {
    if let Some(frame) = frames.try_iter().last() {
        app.offer_frame(frame);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

//! Real-time MIDI playback thread.
//!
//! Key names arrive through [`SoundSink::play`], are mapped to MIDI note
//! numbers, and are sounded for a fixed length on the output port.  The
//! port lives on the playback thread so a slow synthesiser never stalls the
//! render loop.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use piano_core::{KeyLayout, SoundSink};
use piano_midi::{note_to_midi, open_output, Instrument, MidiOut};

// ════════════════════════════════════════════════════════════════════════════
// PlayerCommand — sent to the playback thread
// ════════════════════════════════════════════════════════════════════════════

pub enum PlayerCommand {
    /// Sound a MIDI note for the configured length.
    Note(u8),
    /// Change instrument (MIDI program 0–127).
    SetInstrument(u8),
    /// Release everything and terminate the thread.
    Quit,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerConfig {
    pub instrument: Instrument,
    pub velocity:   u8,
    pub channel:    u8,
    /// How long each note rings before its note-off.
    pub note_ms:    u64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        PlayerConfig {
            instrument: Instrument::AcousticGrandPiano,
            velocity:   100,
            channel:    0,
            note_ms:    600,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Player — handle to the playback thread
// ════════════════════════════════════════════════════════════════════════════

pub struct Player {
    cmd_tx:     Sender<PlayerCommand>,
    last_note:  Option<String>,
    instrument: Instrument,
}

impl Player {
    /// Spawn the playback thread on the preferred MIDI port (or a silent
    /// fallback when there is none).
    pub fn spawn(cfg: PlayerConfig, port: Option<String>) -> Self {
        Player::start(cfg, move || open_output("ar_piano", port.as_deref()))
    }

    /// Spawn the playback thread on an output built by `open`.
    pub fn start<F>(cfg: PlayerConfig, open: F) -> Self
    where
        F: FnOnce() -> Box<dyn MidiOut> + Send + 'static,
    {
        let (cmd_tx, cmd_rx) = mpsc::channel::<PlayerCommand>();
        thread::spawn(move || player_thread(open(), cfg, cmd_rx));
        Player { cmd_tx, last_note: None, instrument: cfg.instrument }
    }

    pub fn set_instrument(&mut self, instrument: Instrument) {
        self.instrument = instrument;
        let _ = self.cmd_tx.send(PlayerCommand::SetInstrument(instrument.program()));
    }

    pub fn instrument(&self) -> Instrument { self.instrument }

    pub fn last_note(&self) -> Option<&str> { self.last_note.as_deref() }

    pub fn quit(&self) {
        let _ = self.cmd_tx.send(PlayerCommand::Quit);
    }
}

impl SoundSink for Player {
    fn play(&mut self, note: &str) {
        match note_to_midi(note) {
            Some(pitch) => {
                self.last_note = Some(note.to_string());
                let _ = self.cmd_tx.send(PlayerCommand::Note(pitch));
            }
            None => log::debug!("no pitch for {}, not played", note),
        }
    }
}

impl Drop for Player {
    fn drop(&mut self) { self.quit(); }
}

/// Keys in `layout` that have no MIDI pitch and will stay silent.
pub fn unmapped_notes(layout: &KeyLayout) -> Vec<String> {
    layout
        .notes()
        .filter(|n| note_to_midi(n).is_none())
        .map(str::to_string)
        .collect()
}

// ════════════════════════════════════════════════════════════════════════════
// player_thread — the actual loop
// ════════════════════════════════════════════════════════════════════════════

fn player_thread(mut midi: Box<dyn MidiOut>, cfg: PlayerConfig, cmd_rx: Receiver<PlayerCommand>) {
    let channel = cfg.channel;
    let ring = Duration::from_millis(cfg.note_ms);
    // (release time, pitch), in order of release
    let mut sounding: Vec<(Instant, u8)> = Vec::new();

    midi.program_change(channel, cfg.instrument.program());

    loop {
        let wait = sounding
            .first()
            .map(|&(at, _)| at.saturating_duration_since(Instant::now()))
            .unwrap_or(Duration::from_millis(100));

        match cmd_rx.recv_timeout(wait) {
            Ok(PlayerCommand::Note(pitch)) => {
                // restrike: cut the old instance first
                if let Some(i) = sounding.iter().position(|&(_, p)| p == pitch) {
                    sounding.remove(i);
                    midi.note_off(channel, pitch);
                }
                midi.note_on(channel, pitch, cfg.velocity);
                sounding.push((Instant::now() + ring, pitch));
            }
            Ok(PlayerCommand::SetInstrument(p)) => midi.program_change(channel, p),
            Ok(PlayerCommand::Quit) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }

        let now = Instant::now();
        while let Some(&(at, pitch)) = sounding.first() {
            if at > now { break; }
            midi.note_off(channel, pitch);
            sounding.remove(0);
        }
    }

    for (_, pitch) in sounding {
        midi.note_off(channel, pitch);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

//! Touch-lift detection: raw fingertip positions → edge-triggered note-ons.
//!
//! Every frame the set of keys currently under a raised fingertip is
//! computed (`touched_now`).  A key fires exactly once when it enters that
//! set and is silently released when it leaves it, so a finger resting on a
//! key for many frames produces a single note.

use std::collections::{HashMap, HashSet};

use crate::hand::HandFrame;
use crate::layout::KeyLayout;

/// A user-origin note-on produced by the detector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NoteOn {
    pub note:  String,
    /// Detector frame index of the first frame of contact.
    pub frame: u64,
}

/// Notes under at least one raised fingertip in `frame`.
///
/// A fingertip registers on every region it overlaps; overlapping regions
/// (black keys sit on top of white keys) can therefore both be touched by a
/// single finger.
pub fn touched_notes(layout: &KeyLayout, frame: &HandFrame) -> HashSet<String> {
    let mut touched = HashSet::new();
    for hand in &frame.hands {
        for tip in hand.extended_tips() {
            for region in layout.regions() {
                if region.bounds.contains(tip) {
                    touched.insert(region.note.clone());
                }
            }
        }
    }
    touched
}

// ════════════════════════════════════════════════════════════════════════════
// TouchState
// ════════════════════════════════════════════════════════════════════════════

/// Held flag per key.
#[derive(Clone, Debug, Default)]
pub struct TouchState {
    held: HashMap<String, bool>,
}

impl TouchState {
    pub fn new(layout: &KeyLayout) -> Self {
        TouchState {
            held: layout.notes().map(|n| (n.to_string(), false)).collect(),
        }
    }

    pub fn is_held(&self, note: &str) -> bool {
        self.held.get(note).copied().unwrap_or(false)
    }

    /// Apply one frame's `touched_now` set, walking keys in layout order.
    /// Returns the notes that went from released to held; releases emit nothing.
    pub fn apply(&mut self, layout: &KeyLayout, touched: &HashSet<String>) -> Vec<String> {
        let mut pressed = Vec::new();
        for note in layout.notes() {
            let held = self.held.entry(note.to_string()).or_insert(false);
            match (touched.contains(note), *held) {
                (true, false) => {
                    *held = true;
                    pressed.push(note.to_string());
                }
                (false, true) => *held = false,
                _ => {}
            }
        }
        pressed
    }

    pub fn held_notes<'a>(&'a self, layout: &'a KeyLayout) -> impl Iterator<Item = &'a str> + 'a {
        layout.notes().filter(move |n| self.is_held(n))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// TouchLiftDetector
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Default)]
pub struct TouchLiftDetector {
    state:  TouchState,
    frames: u64,
}

impl TouchLiftDetector {
    pub fn new(layout: &KeyLayout) -> Self {
        TouchLiftDetector { state: TouchState::new(layout), frames: 0 }
    }

    /// Process one hand frame. A frame with no hands releases every key.
    pub fn process(&mut self, layout: &KeyLayout, frame: &HandFrame) -> Vec<NoteOn> {
        self.frames += 1;
        let touched = touched_notes(layout, frame);
        let frame_idx = self.frames;
        self.state
            .apply(layout, &touched)
            .into_iter()
            .map(|note| NoteOn { note, frame: frame_idx })
            .collect()
    }

    /// Account for a tick whose camera frame was missing. Held keys stay held.
    pub fn skip(&mut self) {
        self.frames += 1;
    }

    pub fn state(&self) -> &TouchState { &self.state }
    pub fn frames(&self) -> u64 { self.frames }
}

//! # piano_midi
//!
//! Everything the AR piano needs to turn a note name into sound on a MIDI
//! synthesiser:
//!
//! * [`note_to_midi`] — `"c4"` → 60, `"c40"` (C♯4) → 61, `"c#4"` → 61.
//! * [`Instrument`] — the General MIDI programs that suit a keyboard.
//! * [`output`] — the [`MidiOut`] abstraction with a `midir` backend and a
//!   silent fallback when no port is available.
//!
//! ```rust
//! use piano_midi::{note_to_midi, Instrument};
//!
//! assert_eq!(note_to_midi("a4"), Some(69));
//! assert_eq!(Instrument::AcousticGrandPiano.program(), 0);
//! ```

pub mod output;

pub use output::{open_output, port_names, MidiOut, NullOut};

use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

// ════════════════════════════════════════════════════════════════════════════
// Note names → MIDI note numbers
// ════════════════════════════════════════════════════════════════════════════

/// Semitone of each natural within its octave.
fn natural_semitone(letter: char) -> Option<u8> {
    match letter.to_ascii_lowercase() {
        'c' => Some(0),
        'd' => Some(2),
        'e' => Some(4),
        'f' => Some(5),
        'g' => Some(7),
        'a' => Some(9),
        'b' => Some(11),
        _   => None,
    }
}

/// Resolve a key name to a MIDI note number (C4 = 60).
///
/// Accepted forms are `<letter><octave>` for naturals, and either
/// `<letter><octave>0` (the on-screen keyboard's convention) or
/// `<letter>#<octave>` for sharps.  Octaves run 0–9; anything that would
/// fall outside 0–127 or does not parse yields `None`.
pub fn note_to_midi(name: &str) -> Option<u8> {
    let mut chars = name.trim().chars();
    let base = natural_semitone(chars.next()?)?;
    let rest: String = chars.collect();

    let (sharp, digits) = match rest.strip_prefix('#') {
        Some(d) => (true, d.to_string()),
        None if rest.len() == 2 && rest.ends_with('0') => (true, rest[..1].to_string()),
        None => (false, rest),
    };
    if digits.len() != 1 {
        return None;
    }
    let octave = digits.parse::<u8>().ok()?;

    let note = 12 * (u16::from(octave) + 1) + u16::from(base) + u16::from(sharp);
    u8::try_from(note).ok().filter(|&n| n <= 127)
}

// ════════════════════════════════════════════════════════════════════════════
// Instrument — keyboard-friendly General MIDI programs
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumString, Display, EnumIter)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[repr(u8)]
pub enum Instrument {
    AcousticGrandPiano  = 0,
    BrightAcousticPiano = 1,
    ElectricGrandPiano  = 2,
    HonkyTonkPiano      = 3,
    ElectricPiano1      = 4,
    ElectricPiano2      = 5,
    Harpsichord         = 6,
    Celesta             = 8,
    Glockenspiel        = 9,
    MusicBox            = 10,
    Vibraphone          = 11,
    Marimba             = 12,
    Xylophone           = 13,
    ChurchOrgan         = 19,
    Accordion           = 21,
    OrchestralHarp      = 46,
    StringEnsemble1     = 48,
    Lead1Square         = 80,
    Pad1NewAge          = 88,
    Kalimba             = 108,
    SteelDrums          = 114,
}

impl Instrument {
    /// Raw Program Change value.
    pub fn program(self) -> u8 { self as u8 }

    pub fn all() -> Vec<Instrument> {
        Instrument::iter().collect()
    }

    /// Look up by program number, if it is one of ours.
    pub fn from_program(program: u8) -> Option<Instrument> {
        Instrument::iter().find(|i| i.program() == program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn naturals() {
        assert_eq!(note_to_midi("c4"), Some(60));
        assert_eq!(note_to_midi("d4"), Some(62));
        assert_eq!(note_to_midi("b4"), Some(71));
        assert_eq!(note_to_midi("c5"), Some(72));
        assert_eq!(note_to_midi("B5"), Some(83));
    }

    #[test]
    fn sharps_in_both_spellings() {
        assert_eq!(note_to_midi("c40"), Some(61));
        assert_eq!(note_to_midi("c#4"), Some(61));
        assert_eq!(note_to_midi("a40"), Some(70));
        assert_eq!(note_to_midi("g50"), Some(80));
        assert_eq!(note_to_midi("f#5"), Some(78));
    }

    #[test]
    fn every_reference_key_has_a_pitch() {
        let keys = [
            "c4", "d4", "e4", "f4", "g4", "a4", "b4", "c5", "d5", "e5", "f5", "g5", "a5", "b5",
            "c40", "d40", "f40", "g40", "a40", "c50", "d50", "f50", "g50", "a50",
        ];
        let mut pitches: Vec<u8> = keys.iter().map(|k| note_to_midi(k).unwrap()).collect();
        pitches.sort_unstable();
        pitches.dedup();
        assert_eq!(pitches.len(), 24);
        assert_eq!(pitches.first(), Some(&60));
        assert_eq!(pitches.last(), Some(&83));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(note_to_midi(""), None);
        assert_eq!(note_to_midi("h4"), None);
        assert_eq!(note_to_midi("c"), None);
        assert_eq!(note_to_midi("c44"), None);
        assert_eq!(note_to_midi("c#"), None);
        // G9 is 127; G♯9 is past the MIDI range
        assert_eq!(note_to_midi("g9"), Some(127));
        assert_eq!(note_to_midi("g#9"), None);
    }

    #[test]
    fn instrument_names_parse() {
        assert_eq!(Instrument::from_str("acoustic-grand-piano").unwrap(), Instrument::AcousticGrandPiano);
        assert_eq!(Instrument::from_str("Vibraphone").unwrap().program(), 11);
        assert_eq!(Instrument::from_program(108), Some(Instrument::Kalimba));
        assert_eq!(Instrument::from_program(7), None);
        assert_eq!(Instrument::Marimba.to_string(), "marimba");
    }
}

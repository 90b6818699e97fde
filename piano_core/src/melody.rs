//! Built-in melodies that the falling tiles teach.
//!
//! A melody is a list of `(note, delay_ms)` steps where each delay is the gap
//! *before* that note; onsets are the running sum of delays.

use std::str::FromStr;

use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::error::{PianoError, PianoResult};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Melody {
    pub name:  String,
    pub steps: Vec<(String, u64)>,
}

impl Melody {
    pub fn new(name: &str, steps: &[(&str, u64)]) -> Self {
        Melody {
            name:  name.to_string(),
            steps: steps.iter().map(|&(n, d)| (n.to_string(), d)).collect(),
        }
    }

    /// Look up a built-in melody by any of its accepted names.
    pub fn by_name(name: &str) -> PianoResult<Self> {
        BuiltinMelody::from_str(name.trim())
            .map(BuiltinMelody::melody)
            .map_err(|_| PianoError::UnknownMelody(name.to_string()))
    }

    /// Onset of every step relative to the start of the melody.
    pub fn onsets(&self) -> Vec<u64> {
        self.steps
            .iter()
            .scan(0u64, |t, &(_, delay)| {
                *t += delay;
                Some(*t)
            })
            .collect()
    }

    pub fn len(&self) -> usize { self.steps.len() }
    pub fn is_empty(&self) -> bool { self.steps.is_empty() }
}

// ════════════════════════════════════════════════════════════════════════════
// BuiltinMelody
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumString, Display, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum BuiltinMelody {
    #[strum(
        serialize = "happy-birthday",
        serialize = "happy_birthday",
        serialize = "happy birthday",
        to_string = "Happy Birthday (basic)"
    )]
    HappyBirthday,

    #[strum(serialize = "interstellar", to_string = "Interstellar (basic)")]
    Interstellar,
}

impl BuiltinMelody {
    pub fn all() -> Vec<BuiltinMelody> {
        BuiltinMelody::iter().collect()
    }

    /// Short command-line name.
    pub fn slug(self) -> &'static str {
        match self {
            BuiltinMelody::HappyBirthday => "happy-birthday",
            BuiltinMelody::Interstellar  => "interstellar",
        }
    }

    pub fn melody(self) -> Melody {
        let name = self.to_string();
        match self {
            BuiltinMelody::HappyBirthday => Melody::new(&name, &[
                ("g4", 0),   ("g4", 800), ("a4", 800), ("g4", 800), ("c5", 800), ("b4", 1000),
                ("g4", 800), ("g4", 800), ("a4", 800), ("g4", 800), ("d5", 800), ("c5", 1000),
                ("g4", 800), ("g4", 800), ("g5", 800), ("e5", 800), ("c5", 800), ("b4", 800),
                ("a4", 1200),
                ("f5", 800), ("f5", 800), ("e5", 800), ("c5", 800), ("d5", 800), ("c5", 1000),
            ]),
            BuiltinMelody::Interstellar => Melody::new(&name, &[
                ("c4", 0),   ("g4", 800), ("g4", 800), ("a4", 1000),
                ("g4", 800), ("f4", 800), ("e4", 1200), ("e4", 800),
                ("g4", 800), ("g4", 1000),
            ]),
        }
    }
}

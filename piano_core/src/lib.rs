//! # piano_core
//!
//! The timing and state logic of an augmented-reality piano: fingertips seen
//! by a camera press virtual keys, and falling tiles teach a melody.
//!
//! ## Components
//!
//! | Module | Role |
//! |---|---|
//! | [`touch`] | Touch-lift detector: hand frames → edge-triggered note-ons |
//! | [`trigger`] | Note trigger service: the one path that sounds a note |
//! | [`score`] | Score engine: collision records and the 300 ms window |
//! | [`schedule`] | Tile scheduler: melody → time-ordered spawn queue |
//! | [`tiles`] | Tile collision engine: falling squares hitting key tops |
//! | [`session`] | [`Piano`], which owns all of the above |
//!
//! ## Data flow
//!
//! ```text
//! HandFrame ─► TouchLiftDetector ─► NoteOn ─► NoteTriggerService ─► SoundSink / EffectSink
//!                                                    ▲        │
//! Melody ─► TileScheduler ─► TileCollisionEngine ────┘        ▼
//!                                   │ (teach mode)       ScoreEngine
//!                                   └──── collision ────────►┘
//! ```
//!
//! Rendering, audio and camera capture live outside this crate and are
//! reached only through [`SoundSink`], [`EffectSink`] and [`HandFrame`].

pub mod clock;
pub mod error;
pub mod geometry;
pub mod hand;
pub mod layout;
pub mod melody;
pub mod schedule;
pub mod score;
pub mod session;
pub mod settings;
pub mod tiles;
pub mod touch;
pub mod trigger;

pub use clock::{ManualClock, SystemClock, TimeProvider};
pub use error::{PianoError, PianoResult};
pub use geometry::{Point, Rect};
pub use hand::{Hand, HandFrame, HAND_CONNECTIONS, LANDMARK_COUNT};
pub use layout::{KeyKind, KeyLayout, KeyRegion};
pub use melody::{BuiltinMelody, Melody};
pub use schedule::{TileScheduler, TileSpawn};
pub use score::{ScoreEngine, ScoreOutcome};
pub use session::{Piano, PianoConfig};
pub use settings::Settings;
pub use tiles::{FallingTile, TileCollision, TileCollisionEngine, MIN_FALL_SPEED};
pub use touch::{NoteOn, TouchLiftDetector, TouchState};
pub use trigger::{EffectSink, NoteTriggerService, Origin, SoundSink, TriggerOutcome};

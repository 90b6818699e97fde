//! The single path through which any note gets sounded.
//!
//! User touches, manual key presses and auto-playing tiles all end up in
//! [`NoteTriggerService::trigger`].  Side effects leave the core only as
//! requests to the injected [`SoundSink`] and [`EffectSink`].

use crate::geometry::Rect;
use crate::layout::KeyLayout;
use crate::score::{ScoreEngine, ScoreOutcome};
use crate::settings::Settings;

/// Who asked for the note.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    User,
    TileAuto,
}

/// Audio collaborator. Fire-and-forget; unknown notes are ignored.
pub trait SoundSink {
    fn play(&mut self, note: &str);
}

/// Visual-effect collaborator.
pub trait EffectSink {
    fn spawn_effect(&mut self, anchor: Rect);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// A tile arrived with auto-play off; nothing sounded.
    Suppressed,
    Played { scored: ScoreOutcome },
}

pub struct NoteTriggerService<S, E> {
    sound:   S,
    effects: E,
}

impl<S: SoundSink, E: EffectSink> NoteTriggerService<S, E> {
    pub fn new(sound: S, effects: E) -> Self {
        NoteTriggerService { sound, effects }
    }

    pub fn trigger(
        &mut self,
        note:     &str,
        origin:   Origin,
        settings: Settings,
        now_ms:   u64,
        layout:   &KeyLayout,
        score:    &mut ScoreEngine,
    ) -> TriggerOutcome {
        if origin == Origin::TileAuto && !settings.auto_play_enabled {
            return TriggerOutcome::Suppressed;
        }

        let scored = if origin == Origin::User && settings.teach_mode() {
            score.on_user_trigger(note, now_ms)
        } else {
            ScoreOutcome::NoRecord
        };

        self.sound.play(note);
        match layout.region(note) {
            Some(region) => self.effects.spawn_effect(region.bounds),
            None => log::debug!("no key region for {}, effect skipped", note),
        }

        TriggerOutcome::Played { scored }
    }

    pub fn sound(&self) -> &S { &self.sound }
    pub fn sound_mut(&mut self) -> &mut S { &mut self.sound }
    pub fn effects(&self) -> &E { &self.effects }
    pub fn effects_mut(&mut self) -> &mut E { &mut self.effects }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::layout::{KeyKind, KeyRegion};

    #[derive(Default, Debug)]
    pub(crate) struct Recorder {
        pub(crate) played:  Vec<String>,
        pub(crate) effects: Vec<Rect>,
    }

    impl SoundSink for Recorder {
        fn play(&mut self, note: &str) { self.played.push(note.to_string()); }
    }

    impl EffectSink for Recorder {
        fn spawn_effect(&mut self, anchor: Rect) { self.effects.push(anchor); }
    }

    fn layout() -> KeyLayout {
        KeyLayout::from_regions(vec![
            KeyRegion::new("g4", Rect::new(0.0, 0.0, 50.0, 50.0), KeyKind::White),
        ])
    }

    fn service() -> NoteTriggerService<Recorder, Recorder> {
        NoteTriggerService::new(Recorder::default(), Recorder::default())
    }

    fn teach() -> Settings { Settings::default().toggled_teach_mode() }

    #[test]
    fn user_trigger_plays_and_spawns_effect() {
        let mut svc = service();
        let mut score = ScoreEngine::default();
        let out = svc.trigger("g4", Origin::User, Settings::default(), 0, &layout(), &mut score);
        assert_eq!(out, TriggerOutcome::Played { scored: ScoreOutcome::NoRecord });
        assert_eq!(svc.sound().played, vec!["g4"]);
        assert_eq!(svc.effects().effects, vec![Rect::new(0.0, 0.0, 50.0, 50.0)]);
    }

    #[test]
    fn tile_is_silent_in_teach_mode() {
        let mut svc = service();
        let mut score = ScoreEngine::default();
        let out = svc.trigger("g4", Origin::TileAuto, teach(), 0, &layout(), &mut score);
        assert_eq!(out, TriggerOutcome::Suppressed);
        assert!(svc.sound().played.is_empty());
        assert!(svc.effects().effects.is_empty());
    }

    #[test]
    fn tile_plays_with_auto_play() {
        let mut svc = service();
        let mut score = ScoreEngine::default();
        svc.trigger("g4", Origin::TileAuto, Settings::default(), 0, &layout(), &mut score);
        assert_eq!(svc.sound().played, vec!["g4"]);
    }

    #[test]
    fn user_trigger_scores_only_in_teach_mode() {
        let mut svc = service();
        let mut score = ScoreEngine::default();
        score.record_collision("g4", 1000);

        // auto-play on: the scoring path is never consulted and the record survives
        svc.trigger("g4", Origin::User, Settings::default(), 1100, &layout(), &mut score);
        assert_eq!(score.score(), 0);
        assert_eq!(score.pending("g4"), Some(1000));

        let out = svc.trigger("g4", Origin::User, teach(), 1100, &layout(), &mut score);
        assert_eq!(out, TriggerOutcome::Played { scored: ScoreOutcome::Hit { points: 10 } });
        assert_eq!(score.score(), 10);
        assert_eq!(svc.sound().played.len(), 2);
    }

    #[test]
    fn unknown_note_still_requests_sound() {
        let mut svc = service();
        let mut score = ScoreEngine::default();
        svc.trigger("x9", Origin::User, Settings::default(), 0, &layout(), &mut score);
        assert_eq!(svc.sound().played, vec!["x9"]);
        assert!(svc.effects().effects.is_empty());
    }
}

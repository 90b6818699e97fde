use piano_core::{
    EffectSink, Hand, HandFrame, KeyKind, KeyLayout, KeyRegion, ManualClock, Melody, Piano,
    PianoConfig, Point, Rect, ScoreOutcome, Settings, SoundSink, TimeProvider, TriggerOutcome,
    LANDMARK_COUNT,
};

#[derive(Default)]
struct Log {
    notes:   Vec<String>,
    effects: Vec<Rect>,
}

impl SoundSink for Log {
    fn play(&mut self, note: &str) { self.notes.push(note.to_string()); }
}

impl EffectSink for Log {
    fn spawn_effect(&mut self, anchor: Rect) { self.effects.push(anchor); }
}

fn one_key(note: &str) -> KeyLayout {
    KeyLayout::from_regions(vec![KeyRegion::new(note, Rect::new(0.0, 0.0, 50.0, 50.0), KeyKind::White)])
}

/// Index finger raised at `tip`, everything else curled far off-screen.
fn hand_at(tip: Point) -> Hand {
    let mut pts = vec![Point::new(-500.0, -500.0); LANDMARK_COUNT];
    for (t, p) in [(8, 6), (12, 10), (16, 14), (20, 18)] {
        pts[t] = Point::new(-500.0, -480.0);
        pts[p] = Point::new(-500.0, -500.0);
    }
    pts[8] = tip;
    pts[6] = Point::new(tip.x, tip.y + 25.0);
    Hand::from_points(pts).unwrap()
}

fn new_piano(layout: KeyLayout, settings: Settings) -> Piano<Log, Log> {
    Piano::new(layout, settings, PianoConfig::default(), Log::default(), Log::default())
}

#[test]
fn held_touch_over_five_frames_fires_once_on_frame_one() {
    let mut piano = new_piano(one_key("c4"), Settings::default());
    let clock = ManualClock::new(0);
    let touching = HandFrame::new(vec![hand_at(Point::new(20.0, 20.0))]);

    let mut fired = Vec::new();
    for _ in 1..=5 {
        fired.extend(piano.on_frame(Some(&touching), clock.now_ms()));
        clock.advance(33);
    }
    fired.extend(piano.on_frame(Some(&HandFrame::empty()), clock.now_ms()));

    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0].note, "c4");
    assert_eq!(fired[0].frame, 1);
    assert_eq!(piano.sound().notes, vec!["c4"]);
    assert!(!piano.is_held("c4"));
}

/// Run the tile tick until `note` lands, returning the collision time.
fn land_tile(piano: &mut Piano<Log, Log>, clock: &ManualClock) -> u64 {
    for _ in 0..1_000 {
        if let Some(hit) = piano.tick_tiles(clock.now_ms()).pop() {
            return hit.at_ms;
        }
        clock.advance(1);
    }
    panic!("tile never landed");
}

#[test]
fn teach_mode_press_within_window_scores() {
    let layout = KeyLayout::from_regions(vec![
        KeyRegion::new("g4", Rect::new(0.0, 400.0, 100.0, 300.0), KeyKind::White),
    ]);
    let mut piano = new_piano(layout, Settings::default().toggled_teach_mode());
    // leading edge starts at 0 and needs 100 updates of 4 px, one per ms
    let clock = ManualClock::new(1000 - 99);
    piano.launch_melody(&Melody::new("one", &[("g4", 0)]), clock.now_ms());

    let at = land_tile(&mut piano, &clock);
    assert_eq!(at, 1000);
    assert!(piano.sound().notes.is_empty(), "tiles are silent in teach mode");

    assert_eq!(
        piano.press("g4", 1250),
        TriggerOutcome::Played { scored: ScoreOutcome::Hit { points: 10 } }
    );
    assert_eq!(piano.score(), 10);
    assert_eq!(piano.score_engine().pending("g4"), None);
}

#[test]
fn teach_mode_late_press_consumes_record_without_score() {
    let mut piano = new_piano(one_key("g4"), Settings::default().toggled_teach_mode());
    let clock = ManualClock::new(0);
    piano.launch_melody(&Melody::new("one", &[("g4", 0)]), 0);
    let at = land_tile(&mut piano, &clock);

    assert_eq!(
        piano.press("g4", at + 400),
        TriggerOutcome::Played { scored: ScoreOutcome::Missed { late_by_ms: 100 } }
    );
    assert_eq!(piano.score(), 0);
    assert_eq!(piano.score_engine().pending("g4"), None);

    // a second press finds nothing to score against
    piano.press("g4", at + 10);
    assert_eq!(piano.score(), 0);
}

#[test]
fn auto_play_never_consults_scoring() {
    let mut piano = new_piano(one_key("g4"), Settings::default());
    let clock = ManualClock::new(0);
    piano.launch_melody(&Melody::new("one", &[("g4", 0)]), 0);
    let at = land_tile(&mut piano, &clock);

    assert_eq!(piano.sound().notes, vec!["g4"]);
    assert_eq!(piano.score_engine().pending("g4"), None);
    assert_eq!(
        piano.press("g4", at + 10),
        TriggerOutcome::Played { scored: ScoreOutcome::NoRecord }
    );
    assert_eq!(piano.score(), 0);
}

#[test]
fn spawn_times_do_not_depend_on_tick_rate() {
    for tick_ms in [1u64, 7, 33, 100] {
        let mut piano = new_piano(KeyLayout::reference(1500.0, 900.0), Settings::default());
        let start = 5_000;
        piano.launch_melody(&Melody::new("two", &[("c4", 0), ("d4", 500)]), start);

        let mut first_seen = std::collections::HashMap::new();
        let mut now = start;
        while now <= start + 600 {
            piano.tick_tiles(now);
            for tile in piano.tiles() {
                first_seen.entry(tile.note.clone()).or_insert(now);
            }
            now += tick_ms;
        }
        assert_eq!(first_seen["c4"], start, "tick {} ms", tick_ms);
        // the first tick at or after T+500 releases d4
        let expected = start + 500u64.div_ceil(tick_ms) * tick_ms;
        assert_eq!(first_seen["d4"], expected, "tick {} ms", tick_ms);
    }
}

#[test]
fn overwritten_collision_only_scores_against_latest() {
    let mut piano = new_piano(one_key("e4"), Settings::default().toggled_teach_mode());
    let clock = ManualClock::new(0);
    piano.launch_melody(&Melody::new("pair", &[("e4", 0), ("e4", 1_000)]), 0);

    let first = land_tile(&mut piano, &clock);
    clock.advance(1);
    let second = land_tile(&mut piano, &clock);
    assert!(second > first + 300);
    assert_eq!(piano.score_engine().pending("e4"), Some(second));

    piano.press("e4", second + 50);
    assert_eq!(piano.score(), 10);
}

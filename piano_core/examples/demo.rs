//! Plays every built-in melody through a headless session in teach mode,
//! with a simulated pupil pressing each key some time after its tile lands.

use piano_core::{
    BuiltinMelody, EffectSink, KeyLayout, ManualClock, Piano, PianoConfig, Rect, ScoreOutcome,
    Settings, SoundSink, TimeProvider, TriggerOutcome,
};

struct Console;

impl SoundSink for Console {
    fn play(&mut self, note: &str) { print!(" ♪{}", note); }
}

impl EffectSink for Console {
    fn spawn_effect(&mut self, _anchor: Rect) {}
}

/// Pupil's reaction time for the n-th tile: mostly quick, every fifth slow.
fn reaction_ms(n: usize) -> u64 {
    if n % 5 == 4 { 420 } else { 90 + (n as u64 * 37) % 160 }
}

fn main() {
    println!("\n=== AR Piano teach-mode demo ===\n");

    for tune in BuiltinMelody::all() {
        let melody = tune.melody();
        println!("{} ({} notes)", tune, melody.len());

        let mut piano = Piano::new(
            KeyLayout::reference(1500.0, 900.0),
            Settings::default().toggled_teach_mode(),
            PianoConfig::default(),
            Console,
            Console,
        );
        let clock = ManualClock::new(0);
        piano.launch_melody(&melody, clock.now_ms());

        let mut presses: Vec<(u64, String)> = Vec::new();
        let mut landed = 0usize;
        while piano.pending_spawns() > 0 || !piano.tiles().is_empty() || !presses.is_empty() {
            clock.advance(33);
            let now = clock.now_ms();

            for hit in piano.tick_tiles(now) {
                presses.push((hit.at_ms + reaction_ms(landed), hit.note));
                landed += 1;
            }

            presses.sort_by_key(|(at, _)| *at);
            while presses.first().is_some_and(|(at, _)| *at <= now) {
                let (at, note) = presses.remove(0);
                print!("   {:>6} ms  {:<4}", at, note);
                match piano.press(&note, at) {
                    TriggerOutcome::Played { scored: ScoreOutcome::Hit { points } } => {
                        print!("  +{}", points)
                    }
                    TriggerOutcome::Played { scored: ScoreOutcome::Missed { late_by_ms } } => {
                        print!("  late by {} ms", late_by_ms)
                    }
                    _ => {}
                }
                println!();
            }
        }
        println!("   score: {} / {}\n", piano.score(), melody.len() * 10);
    }
}

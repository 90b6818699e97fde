//! ar_piano — command-line entry point.

use ar_piano::app::{run, AppConfig, HandInput};
use ar_piano::player::PlayerConfig;
use clap::Parser;
use piano_core::{BuiltinMelody, PianoConfig, Settings, MIN_FALL_SPEED};
use piano_midi::Instrument;

#[derive(Parser, Debug)]
#[command(name = "ar_piano", version, about = "Augmented-reality piano teaching machine")]
struct Cli {
    /// Window width in pixels
    #[arg(long, default_value_t = 1280)]
    width: usize,

    /// Window height in pixels
    #[arg(long, default_value_t = 720)]
    height: usize,

    /// Hand landmark source
    #[arg(long, value_enum, default_value_t = HandInput::Sim)]
    hands: HandInput,

    /// Do not mirror tracker coordinates horizontally
    #[arg(long)]
    no_mirror: bool,

    /// General MIDI instrument, e.g. acoustic-grand-piano, vibraphone
    #[arg(long, default_value = "acoustic-grand-piano")]
    instrument: Instrument,

    /// Note-on velocity (0-127)
    #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u8).range(0..=127))]
    velocity: u8,

    /// MIDI channel (0-15)
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=15))]
    channel: u8,

    /// How long each note rings, in milliseconds
    #[arg(long, default_value_t = 600)]
    note_ms: u64,

    /// Prefer the MIDI output port whose name contains this text
    #[arg(long)]
    port: Option<String>,

    /// Tile fall speed in pixels per animation step
    #[arg(long, default_value_t = 4.0)]
    fall_speed: f32,

    /// Start in teach mode (tiles silent, presses scored)
    #[arg(long)]
    teach: bool,

    /// Hide note names on the keys
    #[arg(long)]
    hide_labels: bool,

    /// Start this melody as soon as the window opens
    #[arg(long)]
    melody: Option<BuiltinMelody>,

    /// List the built-in melodies and exit
    #[arg(long)]
    list_melodies: bool,

    /// List MIDI output ports and exit
    #[arg(long)]
    list_ports: bool,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_config(self) -> AppConfig {
        let settings = Settings {
            auto_play_enabled: !self.teach,
            show_labels:       !self.hide_labels,
        };
        AppConfig {
            width:     self.width.max(320),
            height:    self.height.max(240),
            hands:     self.hands,
            mirror:    !self.no_mirror,
            player:    PlayerConfig {
                instrument: self.instrument,
                velocity:   self.velocity,
                channel:    self.channel,
                note_ms:    self.note_ms.max(10),
            },
            midi_port: self.port,
            piano:     PianoConfig { fall_speed: self.fall_speed.max(MIN_FALL_SPEED), ..PianoConfig::default() },
            settings,
            melody:    self.melody,
            ..AppConfig::default()
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if cli.list_melodies {
        for m in BuiltinMelody::all() {
            println!("  {:<16} {} ({} notes)", m.slug(), m, m.melody().len());
        }
        return Ok(());
    }
    if cli.list_ports {
        let ports = piano_midi::port_names("ar_piano");
        if ports.is_empty() {
            println!("  (no MIDI output ports)");
        }
        for (i, name) in ports.iter().enumerate() {
            println!("  {}: {}", i, name);
        }
        return Ok(());
    }

    run(cli.into_config())
}

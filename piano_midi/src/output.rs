//! MIDI output ports.
//!
//! [`open_output`] always hands back something playable: the first usable
//! `midir` port (soft-synths preferred), or [`NullOut`] when there is no
//! MIDI system or no port.  A missing synthesiser means a silent piano, not
//! a failed run.

/// Minimal channel-voice interface the player needs.
pub trait MidiOut: Send {
    fn program_change(&mut self, channel: u8, program: u8);
    fn note_on(&mut self, channel: u8, note: u8, velocity: u8);
    fn note_off(&mut self, channel: u8, note: u8);
}

pub fn program_change_msg(channel: u8, program: u8) -> [u8; 2] {
    [0xC0 | (channel & 0x0F), program & 0x7F]
}

pub fn note_on_msg(channel: u8, note: u8, velocity: u8) -> [u8; 3] {
    [0x90 | (channel & 0x0F), note & 0x7F, velocity & 0x7F]
}

pub fn note_off_msg(channel: u8, note: u8) -> [u8; 3] {
    [0x80 | (channel & 0x0F), note & 0x7F, 0]
}

// ── midir backend ─────────────────────────────────────────────────────────

struct MidirOut {
    conn: midir::MidiOutputConnection,
}

impl MidirOut {
    fn send(&mut self, msg: &[u8]) {
        if let Err(e) = self.conn.send(msg) {
            log::debug!("MIDI send failed: {}", e);
        }
    }
}

impl MidiOut for MidirOut {
    fn program_change(&mut self, channel: u8, program: u8) {
        self.send(&program_change_msg(channel, program));
    }
    fn note_on(&mut self, channel: u8, note: u8, velocity: u8) {
        self.send(&note_on_msg(channel, note, velocity));
    }
    fn note_off(&mut self, channel: u8, note: u8) {
        self.send(&note_off_msg(channel, note));
    }
}

// ── null backend ──────────────────────────────────────────────────────────

/// Swallows everything.
pub struct NullOut;

impl MidiOut for NullOut {
    fn program_change(&mut self, _ch: u8, _p: u8)  {}
    fn note_on(&mut self, _ch: u8, _n: u8, _v: u8) {}
    fn note_off(&mut self, _ch: u8, _n: u8)        {}
}

/// True for port names that look like a General MIDI soft-synth.
fn is_softsynth(name: &str) -> bool {
    let n = name.to_lowercase();
    ["fluid", "timidity", "microsoft", "gm", "synth"].iter().any(|k| n.contains(k))
}

/// Names of every MIDI output port currently visible.
pub fn port_names(client_name: &str) -> Vec<String> {
    match midir::MidiOutput::new(client_name) {
        Ok(m) => m.ports().iter().filter_map(|p| m.port_name(p).ok()).collect(),
        Err(e) => {
            log::warn!("MIDI init error: {}", e);
            Vec::new()
        }
    }
}

/// Index of the port to open: the first whose name contains `wanted`
/// (case-insensitive), else the first soft-synth, else port 0.
fn choose_port(names: &[String], wanted: Option<&str>) -> usize {
    if let Some(w) = wanted {
        let w = w.to_lowercase();
        if let Some(i) = names.iter().position(|n| n.to_lowercase().contains(&w)) {
            return i;
        }
        log::warn!("no MIDI port matches {:?}, picking automatically", w);
    }
    names.iter().position(|n| is_softsynth(n)).unwrap_or(0)
}

/// Open the preferred MIDI output port, or fall back to [`NullOut`].
pub fn open_output(client_name: &str, wanted: Option<&str>) -> Box<dyn MidiOut> {
    let midi_out = match midir::MidiOutput::new(client_name) {
        Ok(m)  => m,
        Err(e) => {
            log::warn!("MIDI init error: {} — keys will be silent", e);
            return Box::new(NullOut);
        }
    };

    let ports = midi_out.ports();
    if ports.is_empty() {
        log::warn!("no MIDI output ports found — keys will be silent");
        log::warn!("start a synthesiser such as `fluidsynth` or `timidity -iA` to hear notes");
        return Box::new(NullOut);
    }

    let names: Vec<String> = ports
        .iter()
        .map(|p| midi_out.port_name(p).unwrap_or_else(|_| "unknown".to_string()))
        .collect();
    let port_idx = choose_port(&names, wanted);
    let port = &ports[port_idx];
    let name = &names[port_idx];
    log::info!("opening MIDI port: {}", name);

    match midi_out.connect(port, "ar-piano-out") {
        Ok(conn) => Box::new(MidirOut { conn }),
        Err(e) => {
            log::warn!("failed to connect to {}: {} — keys will be silent", name, e);
            Box::new(NullOut)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_voice_bytes() {
        assert_eq!(note_on_msg(0, 60, 100), [0x90, 60, 100]);
        assert_eq!(note_off_msg(3, 61), [0x83, 61, 0]);
        assert_eq!(program_change_msg(17, 11), [0xC1, 11]);
    }

    #[test]
    fn data_bytes_are_seven_bit() {
        assert_eq!(note_on_msg(0, 200, 255), [0x90, 200 & 0x7F, 0x7F]);
    }

    #[test]
    fn softsynth_detection() {
        assert!(is_softsynth("FLUID Synth (1234)"));
        assert!(is_softsynth("Microsoft GS Wavetable Synth"));
        assert!(!is_softsynth("Midi Through Port-0"));
    }

    #[test]
    fn port_choice() {
        let names: Vec<String> = ["Midi Through Port-0", "FLUID Synth (99)", "USB Keys"]
            .iter().map(|s| s.to_string()).collect();
        assert_eq!(choose_port(&names, None), 1);
        assert_eq!(choose_port(&names, Some("usb")), 2);
        assert_eq!(choose_port(&names, Some("nothing")), 1);
        assert_eq!(choose_port(&names[..1], None), 0);
    }
}

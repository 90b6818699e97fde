//! Mode flags, owned by the session and handed to components by value.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Tiles sound their note on arrival. Off = teach mode: tiles are silent
    /// and the user is scored for pressing the key in time.
    pub auto_play_enabled: bool,
    /// Display-only: draw note names on the keys.
    pub show_labels:       bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings { auto_play_enabled: true, show_labels: true }
    }
}

impl Settings {
    pub fn teach_mode(&self) -> bool { !self.auto_play_enabled }

    pub fn toggled_teach_mode(self) -> Self {
        Settings { auto_play_enabled: !self.auto_play_enabled, ..self }
    }

    pub fn toggled_labels(self) -> Self {
        Settings { show_labels: !self.show_labels, ..self }
    }
}

//! Software-rendered visualizer using `minifb`.
//!
//! Layout (sizes follow the window):
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ SCORE 40                           TEACH MODE  LABELS ON     │
//! │              ▢ falling tiles ▢                               │
//! │                                                              │
//! │     ┌──┬█┬──┬█┬──┬──┬█┬──┬█┬──┬█┬──┬──┬█┬──┬█┬──┬──┐         │
//! │     │  └┬┘  └┬┘  │  └┬┘  └┬┘  └┬┘  │  └┬┘  └┬┘  │  │  keys   │
//! │     │ C4 │ D4 │ E4 │ F4 │ ...                    │  │         │
//! │     └────┴────┴────┴────┴────────────────────────┴──┘         │
//! │ status bar                                                   │
//! │ key legend                                                   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The hand skeleton and flying notes are drawn over everything else.

use std::sync::mpsc::Sender;

use anyhow::Context;
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};
use piano_core::{
    FallingTile, HandFrame, KeyKind, KeyLayout, Point, Rect, Settings, HAND_CONNECTIONS,
};

use crate::effects::{FlyingNote, NoteGlyph};
use crate::hands::SimInput;

// ════════════════════════════════════════════════════════════════════════════
// Palette
// ════════════════════════════════════════════════════════════════════════════

const BG_COLOR:        u32 = 0xFF1A1A2E;
const WHITE_KEY:       u32 = 0xFFF0F0F0;
const BLACK_KEY:       u32 = 0xFF202020;
const KEY_EDGE:        u32 = 0xFF000000;
const HELD_TINT:       u32 = 0xFF4FA8FF;
const TILE_FILL:       u32 = 0xFF00B4FF;
const TILE_EDGE:       u32 = 0xFF000000;
const BONE_COLOR:      u32 = 0xFFFFFFFF;
const JOINT_COLOR:     u32 = 0xFFFF2020;
const NOTE_COLOR:      u32 = 0xFFFFD700;
const TEXT_BG:         u32 = 0xFF0F3460;
const TEXT_COLOR:      u32 = 0xFFEEEEEE;
const LEGEND_COLOR:    u32 = 0xFF888888;

const LEGEND: &str =
    "Q-1 WHITE KEYS  2-= BLACK KEYS  F1 TEACH  F2 LABELS  F3 SOUND  TAB MELODY  ENTER PLAY  ESC QUIT";

// ════════════════════════════════════════════════════════════════════════════
// Input
// ════════════════════════════════════════════════════════════════════════════

/// Keyboard shortcut for every key of the reference keyboard.
pub const KEY_BINDINGS: [(Key, &str); 24] = [
    (Key::Q, "c4"), (Key::W, "d4"), (Key::E, "e4"), (Key::R, "f4"),
    (Key::T, "g4"), (Key::Y, "a4"), (Key::U, "b4"),
    (Key::I, "c5"), (Key::O, "d5"), (Key::P, "e5"), (Key::LeftBracket, "f5"),
    (Key::RightBracket, "g5"), (Key::Backslash, "a5"), (Key::Key1, "b5"),
    (Key::Key2, "c40"), (Key::Key3, "d40"), (Key::Key5, "f40"), (Key::Key6, "g40"),
    (Key::Key7, "a40"), (Key::Key8, "c50"), (Key::Key9, "d50"), (Key::Key0, "f50"),
    (Key::Minus, "g50"), (Key::Equal, "a50"),
];

/// What the user asked for this frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UiCommand {
    Press(String),
    ToggleTeach,
    ToggleLabels,
    NextInstrument,
    NextMelody,
    LaunchMelody,
    Quit,
}

/// The key a click at `p` lands on.  Black keys sit on top of white ones.
pub fn click_target(layout: &KeyLayout, p: Point) -> Option<&str> {
    let hit = |kind| {
        layout
            .regions()
            .iter()
            .find(|r| r.kind == kind && r.bounds.contains(p))
            .map(|r| r.note.as_str())
    };
    hit(KeyKind::Black).or_else(|| hit(KeyKind::White))
}

// ════════════════════════════════════════════════════════════════════════════
// Scene — everything one frame shows
// ════════════════════════════════════════════════════════════════════════════

pub struct Scene<'a> {
    pub layout:   &'a KeyLayout,
    pub held:     &'a [&'a str],
    pub tiles:    &'a [FallingTile],
    pub effects:  &'a [FlyingNote],
    pub hands:    Option<&'a HandFrame>,
    pub settings: Settings,
    pub score:    u64,
    pub melody:   &'a str,
    pub status:   &'a str,
}

// ════════════════════════════════════════════════════════════════════════════
// Canvas — the pixel buffer and its drawing primitives
// ════════════════════════════════════════════════════════════════════════════

pub struct Canvas {
    buf:    Vec<u32>,
    width:  usize,
    height: usize,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Canvas { buf: vec![BG_COLOR; width * height], width, height }
    }

    pub fn pixels(&self) -> &[u32] { &self.buf }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        (x < self.width && y < self.height).then(|| self.buf[y * self.width + x])
    }

    pub fn clear(&mut self) { self.buf.fill(BG_COLOR); }

    fn set_pixel(&mut self, x: i32, y: i32, color: u32) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.buf[y as usize * self.width + x as usize] = color;
        }
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: u32) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + w).min(self.width as i32);
        let y1 = (y + h).min(self.height as i32);
        for row in y0..y1 {
            let base = row as usize * self.width;
            for col in x0..x1 {
                self.buf[base + col as usize] = color;
            }
        }
    }

    fn draw_border(&mut self, x: i32, y: i32, w: i32, h: i32, thickness: i32, color: u32) {
        let t = thickness.min(w / 2).min(h / 2).max(1);
        self.fill_rect(x, y, w, t, color);
        self.fill_rect(x, y + h - t, w, t, color);
        self.fill_rect(x, y, t, h, color);
        self.fill_rect(x + w - t, y, t, h, color);
    }

    fn tint_rect(&mut self, r: Rect, color: u32, t: f32) {
        let (x0, y0) = (r.x.max(0.0) as usize, r.y.max(0.0) as usize);
        let x1 = (r.right().max(0.0) as usize).min(self.width);
        let y1 = (r.bottom().max(0.0) as usize).min(self.height);
        for row in y0..y1 {
            for col in x0..x1 {
                let i = row * self.width + col;
                self.buf[i] = blend(self.buf[i], color, t);
            }
        }
    }

    /// Bresenham line, `thickness` pixels wide, clipped to the canvas first
    /// so wild endpoints cost nothing.
    fn draw_line(&mut self, a: Point, b: Point, thickness: i32, color: u32) {
        let pad = thickness as f32;
        let frame = Rect::new(-pad, -pad, self.width as f32 + 2.0 * pad, self.height as f32 + 2.0 * pad);
        let Some((a, b)) = clip_segment(a, b, frame) else { return };

        let (mut x0, mut y0) = (a.x as i64, a.y as i64);
        let (x1, y1) = (b.x as i64, b.y as i64);
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let half = thickness / 2;
        loop {
            self.fill_rect(x0 as i32 - half, y0 as i32 - half, thickness, thickness, color);
            if x0 == x1 && y0 == y1 { break; }
            let e2 = 2 * err;
            if e2 >= dy { err += dy; x0 += sx; }
            if e2 <= dx { err += dx; y0 += sy; }
        }
    }

    fn fill_disc(&mut self, cx: i32, cy: i32, r: i32, color: u32) {
        let (w, h) = (self.width as i64, self.height as i64);
        let (x, y, rr) = (cx as i64, cy as i64, r as i64);
        if x + rr < 0 || y + rr < 0 || x - rr >= w || y - rr >= h {
            return;
        }
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy <= r * r {
                    self.set_pixel(cx + dx, cy + dy, color);
                }
            }
        }
    }

    /// Minimal bitmap font — 3×5 characters, each pixel drawn `scale`
    /// pixels square.
    fn draw_label(&mut self, text: &str, x: i32, y: i32, scale: i32, color: u32) {
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3 {
                    if bits & (1 << (2 - col)) != 0 {
                        self.fill_rect(cx + col * scale, y + row as i32 * scale, scale, scale, color);
                    }
                }
            }
            cx += 4 * scale; // 3 wide + 1 gap
            if cx >= self.width as i32 { break; }
        }
    }
}

/// Liang-Barsky clip of the segment `a`-`b` against `r`.  `None` when no
/// part of it is inside, or when an endpoint is not finite.
fn clip_segment(a: Point, b: Point, r: Rect) -> Option<(Point, Point)> {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    if ![a.x, a.y, dx, dy].iter().all(|v| v.is_finite()) {
        return None;
    }
    let (mut t0, mut t1) = (0.0f32, 1.0f32);
    for (p, q) in [(-dx, a.x - r.left()), (dx, r.right() - a.x), (-dy, a.y - r.top()), (dy, r.bottom() - a.y)] {
        if p == 0.0 {
            if q < 0.0 { return None; }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            if t > t1 { return None; }
            t0 = t0.max(t);
        } else {
            if t < t0 { return None; }
            t1 = t1.min(t);
        }
    }
    let at = |t: f32| match t {
        t if t <= 0.0 => a,
        t if t >= 1.0 => b,
        t => Point::new(a.x + t * dx, a.y + t * dy),
    };
    Some((at(t0), at(t1)))
}

/// Pixel width of `text` in the 3×5 font.
fn label_width(text: &str, scale: i32) -> i32 {
    (text.chars().count() as i32 * 4 - 1).max(0) * scale
}

// ════════════════════════════════════════════════════════════════════════════
// draw_scene
// ════════════════════════════════════════════════════════════════════════════

pub fn draw_scene(canvas: &mut Canvas, scene: &Scene) {
    canvas.clear();
    draw_keys(canvas, scene);
    for tile in scene.tiles {
        let b = tile.bounds();
        let (x, y, s) = (b.x as i32, b.y as i32, b.w as i32);
        canvas.fill_rect(x, y, s, s, TILE_FILL);
        canvas.draw_border(x, y, s, s, 3, TILE_EDGE);
    }
    if let Some(frame) = scene.hands {
        draw_hands(canvas, frame);
    }
    for note in scene.effects {
        draw_flying_note(canvas, note);
    }
    draw_hud(canvas, scene);
}

fn draw_keys(canvas: &mut Canvas, scene: &Scene) {
    // white first so black keys paint over them
    for kind in [KeyKind::White, KeyKind::Black] {
        for region in scene.layout.regions().iter().filter(|r| r.kind == kind) {
            let b = region.bounds;
            let (x, y, w, h) = (b.x as i32, b.y as i32, b.w as i32, b.h as i32);
            let face = if kind == KeyKind::White { WHITE_KEY } else { BLACK_KEY };
            canvas.fill_rect(x, y, w, h, face);
            if scene.held.contains(&region.note.as_str()) {
                canvas.tint_rect(b, HELD_TINT, 0.55);
            }
            canvas.draw_border(x, y, w, h, 1, KEY_EDGE);

            if scene.settings.show_labels {
                let (scale, ink) = match kind {
                    KeyKind::White => (3, 0xFF000000),
                    KeyKind::Black => (2, 0xFFFFFFFF),
                };
                let text = region.note.to_uppercase();
                let lx = x + (w - label_width(&text, scale)) / 2;
                let ly = y + h - 5 * scale - 2 * scale - if kind == KeyKind::White { 0 } else { h / 4 };
                canvas.draw_label(&text, lx, ly, scale, ink);
            }
        }
    }
}

fn draw_hands(canvas: &mut Canvas, frame: &HandFrame) {
    for hand in &frame.hands {
        for &(a, b) in HAND_CONNECTIONS.iter() {
            if let (Some(pa), Some(pb)) = (hand.point(a), hand.point(b)) {
                canvas.draw_line(pa, pb, 3, BONE_COLOR);
            }
        }
        for p in hand.points() {
            canvas.fill_disc(p.x as i32, p.y as i32, 3, JOINT_COLOR);
        }
    }
}

fn draw_flying_note(canvas: &mut Canvas, note: &FlyingNote) {
    let color = blend(BG_COLOR, NOTE_COLOR, note.fade());
    let r = (6.0 * note.scale).round().max(2.0) as i32;
    let stem = r * 4;
    let (cx, cy) = (note.x as i32, note.y as i32);

    let crotchet = |canvas: &mut Canvas, hx: i32| {
        canvas.fill_disc(hx, cy, r, color);
        canvas.fill_rect(hx + r - 1, cy - stem, 2, stem, color);
    };
    match note.glyph {
        NoteGlyph::Crotchet => crotchet(canvas, cx),
        NoteGlyph::Quaver => {
            crotchet(canvas, cx);
            let top = Point::new((cx + r) as f32, (cy - stem) as f32);
            let tail = Point::new((cx + r * 2) as f32, (cy - stem + r * 2) as f32);
            canvas.draw_line(top, tail, 2, color);
        }
        NoteGlyph::BeamedPair => {
            let gap = r * 3;
            crotchet(canvas, cx - gap / 2);
            crotchet(canvas, cx + gap / 2);
            canvas.fill_rect(cx - gap / 2 + r - 1, cy - stem, gap + 2, 3, color);
        }
    }
}

fn draw_hud(canvas: &mut Canvas, scene: &Scene) {
    let w = canvas.width as i32;
    let h = canvas.height as i32;

    canvas.draw_label(&format!("SCORE {}", scene.score), 12, 12, 3, TEXT_COLOR);

    let mode = if scene.settings.teach_mode() { "TEACH MODE" } else { "AUTO-PLAY" };
    let labels = if scene.settings.show_labels { "LABELS ON" } else { "LABELS OFF" };
    let right = format!("{}  {}  {}", scene.melody, mode, labels);
    canvas.draw_label(&right, w - label_width(&right, 2) - 12, 14, 2, TEXT_COLOR);

    let bar_y = h - 44;
    canvas.fill_rect(0, bar_y, w, 44, TEXT_BG);
    canvas.draw_label(scene.status, 10, bar_y + 8, 2, TEXT_COLOR);
    canvas.draw_label(LEGEND, 10, h - 14, 2, LEGEND_COLOR);
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer — the window
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window:     Window,
    canvas:     Canvas,
    /// Pointer events go here in simulation mode; without it clicks press keys.
    sim_tx:     Option<Sender<SimInput>>,
    mouse_down: bool,
}

impl Visualizer {
    pub fn new(width: usize, height: usize, sim_tx: Option<Sender<SimInput>>) -> anyhow::Result<Self> {
        let mut window = Window::new(
            "AR Piano Teaching Machine",
            width, height,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )
        .context("failed to open the piano window")?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            canvas: Canvas::new(width, height),
            sim_tx,
            mouse_down: false,
        })
    }

    /// Returns false when the window should close.
    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Poll keyboard and mouse and translate them into commands.
    pub fn poll_input(&mut self, layout: &KeyLayout) -> Vec<UiCommand> {
        let mut cmds = Vec::new();
        if !self.window.is_open() {
            cmds.push(UiCommand::Quit);
            return cmds;
        }

        let one_shot = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);

        if one_shot(Key::Escape) { cmds.push(UiCommand::Quit); }
        if one_shot(Key::F1)     { cmds.push(UiCommand::ToggleTeach); }
        if one_shot(Key::F2)     { cmds.push(UiCommand::ToggleLabels); }
        if one_shot(Key::F3)     { cmds.push(UiCommand::NextInstrument); }
        if one_shot(Key::Tab)    { cmds.push(UiCommand::NextMelody); }
        if one_shot(Key::Enter)  { cmds.push(UiCommand::LaunchMelody); }
        for &(key, note) in KEY_BINDINGS.iter() {
            if one_shot(key) {
                cmds.push(UiCommand::Press(note.to_string()));
            }
        }

        let pointer = self.window.get_mouse_pos(MouseMode::Discard);
        let down = self.window.get_mouse_down(MouseButton::Left);
        match (&self.sim_tx, pointer) {
            (Some(tx), Some((x, y))) => { let _ = tx.send(SimInput::Pointer { x, y, down }); }
            (Some(tx), None)         => { let _ = tx.send(SimInput::Gone); }
            (None, Some((x, y))) if down && !self.mouse_down => {
                if let Some(note) = click_target(layout, Point::new(x, y)) {
                    cmds.push(UiCommand::Press(note.to_string()));
                }
            }
            _ => {}
        }
        self.mouse_down = down;

        cmds
    }

    /// Render one frame.
    pub fn render(&mut self, scene: &Scene) {
        draw_scene(&mut self.canvas, scene);
        let (w, h) = (self.canvas.width, self.canvas.height);
        if let Err(e) = self.window.update_with_buffer(self.canvas.pixels(), w, h) {
            log::debug!("frame dropped: {}", e);
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '\\' => [0b100, 0b100, 0b010, 0b001, 0b001],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '(' => [0b001, 0b010, 0b010, 0b010, 0b001],
        ')' => [0b100, 0b010, 0b010, 0b010, 0b100],
        '[' => [0b011, 0b010, 0b010, 0b010, 0b011],
        ']' => [0b110, 0b010, 0b010, 0b010, 0b110],
        '!' => [0b010, 0b010, 0b010, 0b000, 0b010],
        '\'' => [0b010, 0b010, 0b000, 0b000, 0b000],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

/// Alpha-blend two ARGB colors. `t` = 0.0 → all `a`, `t` = 1.0 → all `b`.
fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |ca: u32, cb: u32| (ca as f32 * (1.0-t) + cb as f32 * t) as u32;
    let ar = (a >> 16) & 0xFF; let br = (b >> 16) & 0xFF;
    let ag = (a >>  8) & 0xFF; let bg = (b >>  8) & 0xFF;
    let ab =  a        & 0xFF; let bb =  b        & 0xFF;
    0xFF000000 | (lerp(ar,br) << 16) | (lerp(ag,bg) << 8) | lerp(ab,bb)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

//! Static key geometry: which rectangle of the screen belongs to which note.
//!
//! Note names follow the `<letter><octave>` convention (`c4`, `g5`); a
//! trailing `0` marks the sharp of that natural (`c40` is C♯4).

use crate::geometry::Rect;

// ════════════════════════════════════════════════════════════════════════════
// KeyRegion
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyKind {
    White,
    Black,
}

/// One physical key. Immutable once the layout is built.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyRegion {
    pub note:   String,
    pub bounds: Rect,
    pub kind:   KeyKind,
}

impl KeyRegion {
    pub fn new(note: &str, bounds: Rect, kind: KeyKind) -> Self {
        KeyRegion { note: note.to_string(), bounds, kind }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Reference keyboard
// ════════════════════════════════════════════════════════════════════════════

pub const WHITE_NOTES: [&str; 14] = [
    "c4", "d4", "e4", "f4", "g4", "a4", "b4",
    "c5", "d5", "e5", "f5", "g5", "a5", "b5",
];

pub const BLACK_NOTES: [&str; 10] = [
    "c40", "d40", "f40", "g40", "a40",
    "c50", "d50", "f50", "g50", "a50",
];

/// Left edge of each black key, in white-key widths from the keyboard's left edge.
const BLACK_OFFSETS: [f32; 10] = [0.7, 1.7, 3.7, 4.7, 5.7, 7.7, 8.7, 10.7, 11.7, 12.7];

/// Screen is divided into this many white-key widths; the keyboard uses 14.
const WIDTH_DIVISIONS: f32 = 15.0;
const BOTTOM_MARGIN:   f32 = 0.20;

// ════════════════════════════════════════════════════════════════════════════
// KeyLayout
// ════════════════════════════════════════════════════════════════════════════

/// Ordered set of key regions. Iteration order is declaration order and is
/// the order every per-frame pass walks the keys in.
#[derive(Clone, Debug, Default)]
pub struct KeyLayout {
    regions: Vec<KeyRegion>,
}

impl KeyLayout {
    pub fn from_regions(regions: Vec<KeyRegion>) -> Self {
        KeyLayout { regions }
    }

    /// Two-octave keyboard (C4–B5) sized for a `width × height` screen:
    /// white keys first, then the black keys laid over them.
    pub fn reference(width: f32, height: f32) -> Self {
        let white_w = width / WIDTH_DIVISIONS;
        let white_h = height / 3.0;
        let total_w = WHITE_NOTES.len() as f32 * white_w;
        let x_start = (width - total_w) / 2.0;
        let y_top   = height - white_h - height * BOTTOM_MARGIN;

        let mut regions = Vec::with_capacity(WHITE_NOTES.len() + BLACK_NOTES.len());

        for (i, note) in WHITE_NOTES.iter().enumerate() {
            let x = x_start + i as f32 * white_w;
            regions.push(KeyRegion::new(note, Rect::new(x, y_top, white_w, white_h), KeyKind::White));
        }

        let black_w = white_w * 0.5;
        let black_h = height / 4.5;
        for (note, offset) in BLACK_NOTES.iter().zip(BLACK_OFFSETS) {
            let x = x_start + white_w * offset;
            regions.push(KeyRegion::new(note, Rect::new(x, y_top, black_w, black_h), KeyKind::Black));
        }

        KeyLayout { regions }
    }

    pub fn regions(&self) -> &[KeyRegion] { &self.regions }
    pub fn len(&self) -> usize { self.regions.len() }
    pub fn is_empty(&self) -> bool { self.regions.is_empty() }

    pub fn region(&self, note: &str) -> Option<&KeyRegion> {
        self.regions.iter().find(|r| r.note == note)
    }

    pub fn notes(&self) -> impl Iterator<Item = &str> {
        self.regions.iter().map(|r| r.note.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    #[test]
    fn reference_has_24_keys_in_declaration_order() {
        let layout = KeyLayout::reference(1500.0, 900.0);
        assert_eq!(layout.len(), 24);
        assert_eq!(layout.regions()[0].note, "c4");
        assert_eq!(layout.regions()[13].note, "b5");
        assert_eq!(layout.regions()[14].note, "c40");
        assert!(layout.regions()[..14].iter().all(|r| r.kind == KeyKind::White));
        assert!(layout.regions()[14..].iter().all(|r| r.kind == KeyKind::Black));
    }

    #[test]
    fn reference_geometry() {
        let layout = KeyLayout::reference(1500.0, 900.0);
        let c4 = layout.region("c4").unwrap();
        // 1500/15 = 100 wide, 900/3 = 300 tall, centred: (1500 - 1400)/2 = 50
        assert_eq!(c4.bounds, Rect::new(50.0, 420.0, 100.0, 300.0));
        let c40 = layout.region("c40").unwrap();
        assert_eq!(c40.bounds.x, 50.0 + 70.0);
        assert_eq!(c40.bounds.w, 50.0);
        assert_eq!(c40.bounds.h, 200.0);
        assert_eq!(c40.bounds.top(), c4.bounds.top());
        assert_eq!(layout.region("b5").unwrap().bounds.right(), 1450.0);
    }

    #[test]
    fn black_keys_overlap_white_keys() {
        let layout = KeyLayout::reference(1500.0, 900.0);
        let p = Point::new(140.0, 450.0);
        let hits: Vec<_> = layout.regions().iter()
            .filter(|r| r.bounds.contains(p))
            .map(|r| r.note.as_str())
            .collect();
        assert_eq!(hits, vec!["c4", "c40"]);
    }

    #[test]
    fn unknown_region() {
        assert!(KeyLayout::reference(800.0, 600.0).region("h9").is_none());
    }
}

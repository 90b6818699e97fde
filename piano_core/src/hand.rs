//! Hand-landmark frames as delivered by the hand-tracking collaborator.
//!
//! A hand is an ordered sequence of 21 points using the common landmark
//! convention (wrist first, then four joints per digit from thumb to pinky).
//! The core only relies on that ordering, never on how points were inferred.

use crate::error::{PianoError, PianoResult};
use crate::geometry::Point;

pub const LANDMARK_COUNT: usize = 21;

pub mod landmarks {
    pub const WRIST:      usize = 0;
    pub const THUMB_TIP:  usize = 4;
    pub const INDEX_PIP:  usize = 6;
    pub const INDEX_TIP:  usize = 8;
    pub const MIDDLE_PIP: usize = 10;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_PIP:   usize = 14;
    pub const RING_TIP:   usize = 16;
    pub const PINKY_PIP:  usize = 18;
    pub const PINKY_TIP:  usize = 20;
}

/// `(fingertip, second joint)` for index, middle, ring and pinky.
pub const FINGER_PAIRS: [(usize, usize); 4] = [
    (landmarks::INDEX_TIP,  landmarks::INDEX_PIP),
    (landmarks::MIDDLE_TIP, landmarks::MIDDLE_PIP),
    (landmarks::RING_TIP,   landmarks::RING_PIP),
    (landmarks::PINKY_TIP,  landmarks::PINKY_PIP),
];

/// Bones drawn by the skeleton overlay.
pub const HAND_CONNECTIONS: [(usize, usize); 21] = [
    (0, 1), (1, 2), (2, 3), (3, 4),
    (0, 5), (5, 6), (6, 7), (7, 8),
    (5, 9), (9, 10), (10, 11), (11, 12),
    (9, 13), (13, 14), (14, 15), (15, 16),
    (13, 17), (0, 17), (17, 18), (18, 19), (19, 20),
];

// ════════════════════════════════════════════════════════════════════════════
// Hand
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub struct Hand {
    points: [Point; LANDMARK_COUNT],
}

impl Hand {
    pub fn from_points(points: Vec<Point>) -> PianoResult<Self> {
        let found = points.len();
        let points: [Point; LANDMARK_COUNT] = points
            .try_into()
            .map_err(|_| PianoError::LandmarkCount { expected: LANDMARK_COUNT, found })?;
        Ok(Hand { points })
    }

    pub fn points(&self) -> &[Point] { &self.points }

    /// Landmark `idx`, or `None` past the last one.
    pub fn point(&self, idx: usize) -> Option<Point> { self.points.get(idx).copied() }

    /// Fingertips of the raised fingers. A finger counts as raised when its
    /// tip sits strictly above its second joint in image space; this is a 2D
    /// heuristic, not a true extension test.
    pub fn extended_tips(&self) -> impl Iterator<Item = Point> + '_ {
        FINGER_PAIRS.iter().filter_map(move |&(tip, pip)| {
            let (t, p) = (self.points[tip], self.points[pip]);
            (t.y < p.y).then_some(t)
        })
    }
}

impl From<[Point; LANDMARK_COUNT]> for Hand {
    fn from(points: [Point; LANDMARK_COUNT]) -> Self { Hand { points } }
}

// ════════════════════════════════════════════════════════════════════════════
// HandFrame
// ════════════════════════════════════════════════════════════════════════════

/// Every hand detected in one processed camera frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HandFrame {
    pub hands: Vec<Hand>,
}

impl HandFrame {
    pub fn new(hands: Vec<Hand>) -> Self { HandFrame { hands } }
    pub fn empty() -> Self { HandFrame::default() }
    pub fn is_empty(&self) -> bool { self.hands.is_empty() }
}

//! Hand-landmark sources: a simulated hand driven by the mouse, and a JSON
//! lines reader for an external tracker.
//!
//! The public interface is [`HandFrame`] delivered over a `mpsc` channel.
//! The app loop does not need to know whether frames came from a camera
//! pipeline or from the pointer.

use std::io::BufRead;
use std::ops::RangeInclusive;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use anyhow::Context;
use piano_core::{Hand, HandFrame, Point};
use serde::Deserialize;

// ════════════════════════════════════════════════════════════════════════════
// HandSource trait — unified interface for tracker and simulation
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver [`HandFrame`]s over a channel.
pub trait HandSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<HandFrame>);
}

/// Spawn a hand source on its own thread and return the receiving end.
pub fn spawn_hand_source<H: HandSource>(source: H) -> Receiver<HandFrame> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || Box::new(source).run(tx));
    rx
}

// ════════════════════════════════════════════════════════════════════════════
// SimHandSource — pointer simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Raw pointer state from the simulation window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimInput {
    Pointer { x: f32, y: f32, down: bool },
    /// Pointer left the window.
    Gone,
}

/// Hand source driven by [`SimInput`] events from the visualizer's window.
///
/// While the left button is held the pointer is an index fingertip with the
/// other three fingers curled; otherwise no hand is in view.
pub struct SimHandSource {
    pub rx: Receiver<SimInput>,
}

impl HandSource for SimHandSource {
    fn run(self: Box<Self>, tx: Sender<HandFrame>) {
        for input in self.rx {
            let frame = match input {
                SimInput::Pointer { x, y, down: true } => {
                    HandFrame::new(vec![synthetic_hand(Point::new(x, y))])
                }
                _ => HandFrame::empty(),
            };
            if tx.send(frame).is_err() { return; }
        }
    }
}

/// A right hand pointing up with the index tip at `tip`.
pub fn synthetic_hand(tip: Point) -> Hand {
    let at = |dx: f32, dy: f32| Point::new(tip.x + dx, tip.y + dy);
    Hand::from([
        at(20.0, 170.0),                                                  // wrist
        at(-25.0, 150.0), at(-40.0, 130.0), at(-45.0, 112.0), at(-42.0, 98.0), // thumb
        at(0.0, 95.0),  at(0.0, 60.0),  at(0.0, 28.0),  tip,              // index, extended
        at(22.0, 98.0), at(24.0, 78.0), at(24.0, 92.0), at(22.0, 104.0),  // middle, curled
        at(40.0, 104.0), at(43.0, 86.0), at(43.0, 98.0), at(41.0, 108.0), // ring, curled
        at(56.0, 112.0), at(59.0, 98.0), at(59.0, 108.0), at(57.0, 116.0), // pinky, curled
    ])
}

// ════════════════════════════════════════════════════════════════════════════
// JsonLinesSource — external tracker on a pipe
// ════════════════════════════════════════════════════════════════════════════

/// Normalised landmarks further out than this are tracker garbage.
const LANDMARK_RANGE: RangeInclusive<f32> = -1.0..=2.0;

#[derive(Deserialize, Debug)]
struct LandmarkJson {
    x: f32,
    y: f32,
}

impl LandmarkJson {
    fn is_plausible(&self) -> bool {
        LANDMARK_RANGE.contains(&self.x) && LANDMARK_RANGE.contains(&self.y)
    }
}

#[derive(Deserialize, Debug)]
struct HandJson {
    #[serde(default)]
    handedness: String,
    #[serde(default = "full_confidence")]
    score: f32,
    landmarks: Vec<LandmarkJson>,
}

fn full_confidence() -> f32 { 1.0 }

#[derive(Deserialize, Debug)]
struct DetectionResult {
    #[serde(default)]
    hands: Vec<HandJson>,
    #[serde(default)]
    error: Option<String>,
}

/// Converts normalised tracker output into window pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameScale {
    pub width:  f32,
    pub height: f32,
    /// Flip horizontally so the picture behaves like a mirror.
    pub mirror: bool,
}

impl FrameScale {
    fn to_pixels(self, lm: &LandmarkJson) -> Point {
        let x = if self.mirror { 1.0 - lm.x } else { lm.x };
        Point::new(x * self.width, lm.y * self.height)
    }
}

/// Parse one line of tracker output.
///
/// Hands without a full landmark set, or with a landmark far outside the
/// picture, are dropped with a warning; the rest of the frame survives.  A line that reports a tracker error is an empty frame.
pub fn parse_frame(line: &str, scale: FrameScale) -> anyhow::Result<HandFrame> {
    let result: DetectionResult = serde_json::from_str(line)
        .with_context(|| format!("bad hand frame: {}", line.trim()))?;

    if let Some(error) = result.error {
        log::warn!("hand tracker error: {}", error);
        return Ok(HandFrame::empty());
    }

    let mut hands = Vec::with_capacity(result.hands.len());
    for hand in result.hands {
        if let Some(lm) = hand.landmarks.iter().find(|lm| !lm.is_plausible()) {
            log::warn!("dropping hand: landmark ({}, {}) is outside the frame", lm.x, lm.y);
            continue;
        }
        let points: Vec<Point> = hand.landmarks.iter().map(|lm| scale.to_pixels(lm)).collect();
        match Hand::from_points(points) {
            Ok(h) => {
                log::trace!("{} hand, confidence {:.2}", hand.handedness, hand.score);
                hands.push(h);
            }
            Err(e) => log::warn!("dropping hand: {}", e),
        }
    }
    Ok(HandFrame::new(hands))
}

/// Reads one JSON detection result per line until end of input.
pub struct JsonLinesSource<R> {
    pub reader: R,
    pub scale:  FrameScale,
}

impl<R: BufRead + Send + 'static> HandSource for JsonLinesSource<R> {
    fn run(self: Box<Self>, tx: Sender<HandFrame>) {
        let scale = self.scale;
        for (n, line) in self.reader.lines().enumerate() {
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    log::warn!("hand input closed: {}", e);
                    return;
                }
            };
            if line.trim().is_empty() { continue; }
            match parse_frame(&line, scale) {
                Ok(frame) => {
                    if tx.send(frame).is_err() { return; }
                }
                Err(e) => log::warn!("line {}: {:#}", n + 1, e),
            }
        }
        log::info!("hand input ended");
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::time::Duration;

    const SCALE: FrameScale = FrameScale { width: 1000.0, height: 500.0, mirror: false };

    fn hand_json(x: f32, y: f32, count: usize) -> String {
        let lms: Vec<String> = (0..count)
            .map(|_| format!(r#"{{"x":{},"y":{},"z":0.0}}"#, x, y))
            .collect();
        format!(r#"{{"handedness":"Right","score":0.9,"landmarks":[{}]}}"#, lms.join(","))
    }

    #[test]
    fn synthetic_hand_extends_only_the_index() {
        let hand = synthetic_hand(Point::new(300.0, 200.0));
        assert_eq!(hand.point(8), Some(Point::new(300.0, 200.0)));
        assert_eq!(hand.extended_tips().collect::<Vec<_>>(), vec![Point::new(300.0, 200.0)]);
    }

    #[test]
    fn parses_and_scales() {
        let line = format!(r#"{{"hands":[{}]}}"#, hand_json(0.25, 0.5, 21));
        let frame = parse_frame(&line, SCALE).unwrap();
        assert_eq!(frame.hands.len(), 1);
        assert_eq!(frame.hands[0].point(0), Some(Point::new(250.0, 250.0)));
    }

    #[test]
    fn mirror_flips_x() {
        let line = format!(r#"{{"hands":[{}]}}"#, hand_json(0.25, 0.5, 21));
        let frame = parse_frame(&line, FrameScale { mirror: true, ..SCALE }).unwrap();
        assert_eq!(frame.hands[0].point(0), Some(Point::new(750.0, 250.0)));
    }

    #[test]
    fn short_hand_is_dropped_but_frame_survives() {
        let line = format!(
            r#"{{"hands":[{},{}]}}"#,
            hand_json(0.1, 0.1, 5),
            hand_json(0.2, 0.2, 21)
        );
        let frame = parse_frame(&line, SCALE).unwrap();
        assert_eq!(frame.hands.len(), 1);
    }

    #[test]
    fn wild_landmarks_drop_the_hand() {
        let mut wild = hand_json(0.3, 0.3, 20);
        wild.insert_str(wild.len() - 2, r#",{"x":1e39,"y":0.3,"z":0.0}"#);
        let far = hand_json(5.0, 0.5, 21);
        let line = format!(r#"{{"hands":[{},{},{}]}}"#, wild, far, hand_json(0.2, 0.2, 21));
        let frame = parse_frame(&line, SCALE).unwrap();
        assert_eq!(frame.hands.len(), 1);
        assert_eq!(frame.hands[0].point(0), Some(Point::new(200.0, 100.0)));
    }

    #[test]
    fn tracker_error_is_empty_frame() {
        let frame = parse_frame(r#"{"hands":[],"error":"camera busy"}"#, SCALE).unwrap();
        assert!(frame.is_empty());
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(parse_frame("not json", SCALE).is_err());
    }

    #[test]
    fn json_source_skips_bad_lines() {
        let input = format!(
            "{}\n\nnonsense\n{}\n",
            format!(r#"{{"hands":[{}]}}"#, hand_json(0.5, 0.5, 21)),
            r#"{"hands":[]}"#
        );
        let rx = spawn_hand_source(JsonLinesSource { reader: Cursor::new(input), scale: SCALE });
        let frames: Vec<HandFrame> = rx.iter().collect();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].hands.len(), 1);
        assert!(frames[1].is_empty());
    }

    #[test]
    fn sim_source_follows_the_button() {
        let (tx, rx) = mpsc::channel();
        let frames = spawn_hand_source(SimHandSource { rx });
        tx.send(SimInput::Pointer { x: 10.0, y: 20.0, down: true }).unwrap();
        tx.send(SimInput::Pointer { x: 10.0, y: 20.0, down: false }).unwrap();
        tx.send(SimInput::Gone).unwrap();

        let wait = Duration::from_secs(1);
        assert_eq!(frames.recv_timeout(wait).unwrap().hands.len(), 1);
        assert!(frames.recv_timeout(wait).unwrap().is_empty());
        assert!(frames.recv_timeout(wait).unwrap().is_empty());
    }
}

//! # ar_piano
//!
//! Augmented-reality piano teaching machine.  A hand tracker (or the mouse,
//! in simulation) supplies fingertip positions; touching a virtual key plays
//! it on a MIDI synthesiser and throws a flying note out of the key.  Falling
//! tiles teach a melody: with auto-play on they sound as they land, in teach
//! mode they stay silent and pressing the right key within 300 ms of a
//! landing scores 10 points.
//!
//! ## Controls
//!
//! | Key | Action |
//! |---|---|
//! | `Q W E R T Y U I O P [ ] \ 1` | White keys C4 … B5 |
//! | `2 3 5 6 7 8 9 0 - =` | Black keys C♯4 … A♯5 |
//! | `F1` | Toggle teach mode |
//! | `F2` | Toggle key labels |
//! | `F3` | Next instrument |
//! | `Tab` | Select the next melody |
//! | `Enter` | Start the selected melody |
//! | `Esc` | Quit |
//!
//! In simulation mode, holding the left mouse button puts an index fingertip
//! under the pointer.  With `--hands stdin` the mouse clicks keys instead.

pub mod hands;
pub mod player;
pub mod effects;
pub mod visualizer;
pub mod app;

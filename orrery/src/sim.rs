//! Keyboard + mouse hand simulation.
//!
//! The visualizer samples the pointer and the held controls once per window
//! frame and sends them here as [`SimInput`]; [`SimGestureSource`] turns
//! each sample into a [`TrackingFrame`] on its own thread, the same way a
//! hardware tracker would.  This keeps the window loop free of gesture
//! logic.
//!
//! | Control | Simulated hand |
//! |---|---|
//! | Mouse | Right palm (left palm while Shift is held) |
//! | Left button / Space | Pinch |
//! | Right button / F | Fist |
//! | Z + mouse x | Both fists; pointer x sets how far apart they are |
//! | H, or pointer outside the window | No hands |

use std::sync::mpsc::{Receiver, Sender};

use glam::{Vec2, Vec3};
use hand_signal::{FrameProducer, HandSample, HandSide, TrackingFrame};
use tracing::debug;

/// Tracker-space span covered by the window, metres.
const SPAN: Vec2 = Vec2::new(0.7, 0.4);
/// Palm height at the window's vertical centre.
const CENTRE_Y: f32 = 0.2;
/// Hand separation at the left and right window edges while zooming.
const ZOOM_SPREAD: (f32, f32) = (0.1, 0.6);

const PINCHED: f32 = 0.95;
const CLENCHED: f32 = 1.0;

// ════════════════════════════════════════════════════════════════════════════
// SimInput: sent by the window
// ════════════════════════════════════════════════════════════════════════════

/// Raw input from the simulation window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimInput {
    /// The controls as they are this frame.
    Frame(SimControls),
    Quit,
}

/// Held controls, sampled once per window frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SimControls {
    /// Pointer in `[0, 1]²`, bottom-left origin.  `None` outside the window.
    pub pointer: Option<Vec2>,
    pub pinch: bool,
    pub fist: bool,
    /// Pointer drives the left hand instead of the right.
    pub left_hand: bool,
    /// Both fists, separated by the pointer's x.
    pub zoom: bool,
    pub hide: bool,
}

// ════════════════════════════════════════════════════════════════════════════
// Controls to frames
// ════════════════════════════════════════════════════════════════════════════

/// Pointer position in tracker space.
pub fn palm_at(pointer: Vec2) -> Vec3 {
    let p = pointer.clamp(Vec2::ZERO, Vec2::ONE) - Vec2::splat(0.5);
    Vec3::new(p.x * SPAN.x, CENTRE_Y + p.y * SPAN.y, 0.0)
}

/// The frame a tracker would report for `controls`.
pub fn frame_for(controls: &SimControls) -> TrackingFrame {
    let pointer = match controls.pointer {
        Some(p) if !controls.hide => p,
        _ => return TrackingFrame::empty(),
    };

    if controls.zoom {
        let t = pointer.x.clamp(0.0, 1.0);
        let spread = ZOOM_SPREAD.0 + (ZOOM_SPREAD.1 - ZOOM_SPREAD.0) * t;
        let y = palm_at(pointer).y;
        let left = HandSample::tracked(Vec3::new(-spread / 2.0, y, 0.0), CLENCHED, 0.0);
        let right = HandSample::tracked(Vec3::new(spread / 2.0, y, 0.0), CLENCHED, 0.0);
        return TrackingFrame::empty()
            .with_hand(HandSide::Left, left)
            .with_hand(HandSide::Right, right);
    }

    let side = if controls.left_hand { HandSide::Left } else { HandSide::Right };
    let grab = if controls.fist { CLENCHED } else { 0.0 };
    let pinch = if controls.pinch { PINCHED } else { 0.0 };
    TrackingFrame::empty().with_hand(side, HandSample::tracked(palm_at(pointer), grab, pinch))
}

// ════════════════════════════════════════════════════════════════════════════
// SimGestureSource: runs on the pump thread
// ════════════════════════════════════════════════════════════════════════════

/// Frame producer driven by [`SimInput`] from the visualizer's window.
pub struct SimGestureSource {
    pub rx: Receiver<SimInput>,
}

impl FrameProducer for SimGestureSource {
    fn run(self: Box<Self>, tx: Sender<TrackingFrame>) {
        for input in self.rx {
            let frame = match input {
                SimInput::Frame(controls) => frame_for(&controls),
                SimInput::Quit => {
                    debug!("simulator quit");
                    return;
                }
            };
            if tx.send(frame).is_err() {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use hand_signal::{FramePump, GestureSource};
    use std::sync::mpsc;
    use std::time::{Duration, Instant};

    fn at(x: f32, y: f32) -> SimControls {
        SimControls { pointer: Some(Vec2::new(x, y)), ..SimControls::default() }
    }

    #[test]
    fn window_centre_is_tracker_centre() {
        let p = palm_at(Vec2::splat(0.5));
        assert_relative_eq!(p.x, 0.0);
        assert_relative_eq!(p.y, CENTRE_Y);
    }

    #[test]
    fn pointer_moves_the_right_palm() {
        let frame = frame_for(&at(1.0, 0.5));
        let right = frame.hand(HandSide::Right).unwrap();
        assert!(right.present);
        assert_relative_eq!(right.palm_position.x, SPAN.x / 2.0);
        assert!(frame.hand(HandSide::Left).is_none());
    }

    #[test]
    fn buttons_set_strengths() {
        let frame = frame_for(&SimControls { pinch: true, ..at(0.5, 0.5) });
        let right = frame.hand(HandSide::Right).unwrap();
        assert!(right.is_pinching(0.73));
        assert!(!right.is_grabbing(0.9));

        let frame = frame_for(&SimControls { fist: true, left_hand: true, ..at(0.5, 0.5) });
        let left = frame.hand(HandSide::Left).unwrap();
        assert!(left.is_grabbing(0.9));
        assert!(frame.hand(HandSide::Right).is_none());
    }

    #[test]
    fn zoom_spreads_both_fists() {
        let near = frame_for(&SimControls { zoom: true, ..at(0.0, 0.5) });
        let far = frame_for(&SimControls { zoom: true, ..at(1.0, 0.5) });
        let gap = |f: &TrackingFrame| {
            let l = f.hand(HandSide::Left).unwrap();
            let r = f.hand(HandSide::Right).unwrap();
            assert!(l.is_grabbing(0.9) && r.is_grabbing(0.9));
            l.palm_position.distance(r.palm_position)
        };
        assert_relative_eq!(gap(&near), ZOOM_SPREAD.0, epsilon = 1e-6);
        assert_relative_eq!(gap(&far), ZOOM_SPREAD.1, epsilon = 1e-6);
    }

    #[test]
    fn hidden_or_outside_means_no_hands() {
        assert_eq!(frame_for(&SimControls::default()), TrackingFrame::empty());
        assert_eq!(frame_for(&SimControls { hide: true, ..at(0.5, 0.5) }), TrackingFrame::empty());
    }

    #[test]
    fn source_thread_feeds_the_pump() {
        let (sim_tx, sim_rx) = mpsc::channel();
        let mut pump = FramePump::spawn("sim", SimGestureSource { rx: sim_rx });
        sim_tx.send(SimInput::Frame(SimControls { pinch: true, ..at(0.5, 0.5) })).unwrap();

        let deadline = Instant::now() + Duration::from_secs(2);
        let mut frame = None;
        while frame.is_none() && Instant::now() < deadline {
            frame = pump.current_frame();
            std::thread::sleep(Duration::from_millis(5));
        }
        let frame = frame.expect("simulated frame");
        assert!(frame.hand(HandSide::Right).unwrap().is_pinching(0.73));

        sim_tx.send(SimInput::Quit).unwrap();
    }
}

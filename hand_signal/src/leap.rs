//! LeapMotion hardware via LeapC.
//!
//! The LeapC connection is created and polled on its own thread; frames come
//! back to the tick through a [`FramePump`].  Opening reports failure to the
//! caller instead of panicking so the binary can fall back to the simulator.

use std::sync::mpsc::{self, Sender};
use std::thread;

use glam::Vec3;
use tracing::{debug, info};

use crate::error::{Result, SignalError};
use crate::sample::{HandSample, TrackingFrame};
use crate::source::{FramePump, GestureSource};

/// LeapC reports millimetres.
const MM_TO_M: f32 = 0.001;
const POLL_TIMEOUT_MS: u32 = 100;

/// Hand tracking from a LeapMotion controller.
pub struct LeapSource {
    pump: FramePump,
}

impl LeapSource {
    /// Connect to the LeapC service and start polling.
    pub fn open() -> Result<Self> {
        let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<()>>(1);
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            use leaprs::*;

            let mut connection = match Connection::create(ConnectionConfig::default()) {
                Ok(c) => c,
                Err(e) => {
                    let _ = ready_tx.send(Err(SignalError::device(format!("{e:?}"))));
                    return;
                }
            };
            if let Err(e) = connection.open() {
                let _ = ready_tx.send(Err(SignalError::device(format!("{e:?}"))));
                return;
            }
            let _ = ready_tx.send(Ok(()));
            poll_loop(&mut connection, tx);
        });

        ready_rx
            .recv()
            .map_err(|_| SignalError::device("LeapC thread exited during start-up"))??;
        info!("LeapMotion connection open");
        Ok(LeapSource { pump: FramePump::from_receiver("leap", rx) })
    }
}

fn poll_loop(connection: &mut leaprs::Connection, tx: Sender<TrackingFrame>) {
    use leaprs::*;

    loop {
        let msg = match connection.poll(POLL_TIMEOUT_MS) {
            Ok(m) => m,
            Err(_) => continue,
        };

        if let Event::Tracking(frame) = msg.event() {
            let mut out = TrackingFrame::empty();
            for hand in frame.hands() {
                let p = hand.palm().position();
                let sample = HandSample::tracked(
                    Vec3::new(p.x, p.y, p.z) * MM_TO_M,
                    hand.grab_strength,
                    hand.pinch_strength,
                );
                match hand.hand_type() {
                    HandType::Left => out.left = Some(sample),
                    HandType::Right => out.right = Some(sample),
                }
            }
            if tx.send(out).is_err() {
                debug!("leap pump receiver dropped; stopping poll loop");
                return;
            }
        }
    }
}

impl GestureSource for LeapSource {
    fn current_frame(&mut self) -> Option<TrackingFrame> {
        self.pump.current_frame()
    }

    fn name(&self) -> &str {
        "leap"
    }
}

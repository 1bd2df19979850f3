//! Gesture sources: hardware, skeleton tracker or scripted, behind one trait.
//!
//! Consumers only ever ask for the current [`TrackingFrame`].  Devices that
//! deliver frames on their own schedule run as a [`FrameProducer`] on a
//! background thread and are read through a [`FramePump`].

use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::{Result, SignalError};
use crate::sample::TrackingFrame;

// ════════════════════════════════════════════════════════════════════════════
// GestureSource trait: what the exhibit polls once per frame
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can report the hands seen this tick.
pub trait GestureSource {
    /// The most recent frame, or `None` when the provider has nothing.
    fn current_frame(&mut self) -> Option<TrackingFrame>;

    /// Short name used in log lines.
    fn name(&self) -> &str;
}

impl<S: GestureSource + ?Sized> GestureSource for Box<S> {
    fn current_frame(&mut self) -> Option<TrackingFrame> {
        (**self).current_frame()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ScriptedSource
// ════════════════════════════════════════════════════════════════════════════

/// Replays a fixed queue of frames, one per call.
///
/// Once the queue runs dry it reports `None` (no hands) unless
/// [`ScriptedSource::repeat_last`] was set.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    frames: VecDeque<TrackingFrame>,
    last: Option<TrackingFrame>,
    repeat_last: bool,
}

impl ScriptedSource {
    pub fn new(frames: impl IntoIterator<Item = TrackingFrame>) -> Self {
        ScriptedSource {
            frames: frames.into_iter().collect(),
            last: None,
            repeat_last: false,
        }
    }

    /// Keep returning the final frame after the script ends.
    pub fn repeat_last(mut self) -> Self {
        self.repeat_last = true;
        self
    }

    /// Append `count` copies of `frame`.
    pub fn push(&mut self, frame: TrackingFrame, count: usize) {
        self.frames.extend(std::iter::repeat(frame).take(count));
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl GestureSource for ScriptedSource {
    fn current_frame(&mut self) -> Option<TrackingFrame> {
        match self.frames.pop_front() {
            Some(f) => {
                self.last = Some(f);
                Some(f)
            }
            None if self.repeat_last => self.last,
            None => None,
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FrameProducer + FramePump: threaded devices
// ════════════════════════════════════════════════════════════════════════════

/// A device loop that pushes frames over a channel until the receiver goes
/// away.
pub trait FrameProducer: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<TrackingFrame>);
}

/// Frames older than this are treated as "no hands".
pub const DEFAULT_MAX_FRAME_AGE: Duration = Duration::from_millis(200);

/// Runs a [`FrameProducer`] on its own thread and keeps the newest frame.
pub struct FramePump {
    name: String,
    rx: Receiver<TrackingFrame>,
    latest: Option<(TrackingFrame, Instant)>,
    max_age: Duration,
    disconnected: bool,
    warned: bool,
}

impl FramePump {
    /// Spawn `producer` on its own thread.
    pub fn spawn<P: FrameProducer>(name: impl Into<String>, producer: P) -> Self {
        let (tx, rx) = mpsc::channel();
        let name = name.into();
        debug!(source = %name, "spawning frame pump");
        thread::spawn(move || Box::new(producer).run(tx));
        Self::from_receiver(name, rx)
    }

    /// Wrap an existing channel.  Useful when the sending side is owned by
    /// something else (a simulator window, a test).
    pub fn from_receiver(name: impl Into<String>, rx: Receiver<TrackingFrame>) -> Self {
        FramePump {
            name: name.into(),
            rx,
            latest: None,
            max_age: DEFAULT_MAX_FRAME_AGE,
            disconnected: false,
            warned: false,
        }
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    /// Drain the channel and return the newest frame that is still fresh.
    ///
    /// Fails once the producer thread has exited and its last frame has gone
    /// stale.
    pub fn try_latest(&mut self) -> Result<Option<TrackingFrame>> {
        while !self.disconnected {
            match self.rx.try_recv() {
                Ok(frame) => self.latest = Some((frame, Instant::now())),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => self.disconnected = true,
            }
        }
        let fresh = self
            .latest
            .filter(|(_, at)| at.elapsed() <= self.max_age)
            .map(|(frame, _)| frame);
        match fresh {
            None if self.disconnected => Err(SignalError::disconnected(&self.name)),
            other => Ok(other),
        }
    }

    pub fn is_disconnected(&self) -> bool {
        self.disconnected
    }
}

impl GestureSource for FramePump {
    fn current_frame(&mut self) -> Option<TrackingFrame> {
        match self.try_latest() {
            Ok(frame) => frame,
            Err(e) => {
                if !self.warned {
                    warn!(error = %e, "gesture source stopped; treating hands as absent");
                    self.warned = true;
                }
                None
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

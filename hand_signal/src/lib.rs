//! # hand_signal
//!
//! Hand tracking input for the orrery exhibit, reduced to one small gesture
//! vocabulary no matter which hardware produced it.
//!
//! ## Layers
//!
//! | Type | Role |
//! |---|---|
//! | [`HandSample`] | One hand, one frame: presence, palm position, grab, pinch |
//! | [`TrackingFrame`] | Both hands as reported by a provider this tick |
//! | [`GestureSource`] | Anything that can hand over the latest frame |
//! | [`HandSignalNormalizer`] | Frame → [`GestureState`] (adds two-hand distance) |
//!
//! ## Sources
//!
//! * [`ScriptedSource`]: replays a queue of frames (tests, calibration runs).
//! * [`BodyTrackingSource`]: adapter over a skeleton tracker ([`BodyTracker`]),
//!   the Kinect-style back-end: joints for palms, open/closed/lasso for grab
//!   and pinch.
//! * `LeapSource`: real LeapMotion hardware polled on a pump thread.
//!   Requires the `leap` feature flag and the LeapC shared library.
//!
//! Palm positions are in tracker space: metres, x right, y up, z toward the
//! user.  Strengths are passed through untouched; thresholds belong to the
//! consumers.

pub mod error;
pub mod sample;
pub mod normalizer;
pub mod source;
pub mod body;
#[cfg(feature = "leap")]
pub mod leap;

pub use error::{Result, SignalError};
pub use sample::{HandSample, HandSide, TrackingFrame};
pub use normalizer::{GestureState, HandSignalNormalizer, NO_DISTANCE};
pub use source::{FramePump, FrameProducer, GestureSource, ScriptedSource};
pub use body::{BodyHandState, BodyTracker, BodyTrackingSource, JointType, UserId};
#[cfg(feature = "leap")]
pub use leap::LeapSource;

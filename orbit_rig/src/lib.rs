//! # orbit_rig
//!
//! The interaction core of the orrery exhibit.  A visitor steers an orbit
//! camera around a small solar system with their hands, points at a planet
//! with a palm cursor, pinches to select it and turns it with a fist.
//!
//! ## Gesture → action mapping
//!
//! | Gesture | Hand | Action |
//! |---|---|---|
//! | Open palm moving | Right | Moves the cursor |
//! | Pinch, held | Right | Dwell-select what the cursor is over (or go back while focused) |
//! | Fist, moving | Right | Orbit the camera (around the focused planet while focused) |
//! | Fist, moving | Left | Pan the orbit pivot over the ground (not while focused) |
//! | Both fists, apart / together | Both | Zoom in / out |
//! | Fist, moving | Left, focused | Turn the focused planet |
//! | No hands for a while | – | Auto-rotate; leave focus |
//!
//! ## Modules
//!
//! * [`cursor`]: palm projection, smoothed amplified cursor, hit testing.
//! * [`selection`]: dwell progress, cooldown, completion-time targeting.
//! * [`camera`]: the [`CameraMode`] state machine and timed flights.
//! * [`focus`]: focus ownership, framing, hand rotation of the focused body.
//! * [`spin`]: self-rotation, rigid spin and the recenter watchdog.
//! * [`scene`]: selectable bodies and the ray-cast seam.
//! * [`exhibit`]: wires everything together and owns the tick order.
//!
//! Tracking input comes from [`hand_signal`].  The frame tick carries
//! everything except torque integration, which only happens on the fixed
//! physics tick.

pub mod error;
pub mod config;
pub mod math;
pub mod pose;
pub mod task;
pub mod scene;
pub mod spin;
pub mod feedback;
pub mod cursor;
pub mod selection;
pub mod camera;
pub mod focus;
pub mod exhibit;

pub use error::{Result, RigError};
pub use config::{
    CameraConfig, CursorConfig, FocusConfig, PalmConfig, RigConfig, SelectionConfig, SpinConfig,
    ThresholdConfig, ZoomConfig,
};
pub use pose::{OrbitCoords, Pose, Ray, Viewport};
pub use task::{Countdown, PoseTransition};
pub use scene::{
    CursorHit, Hit, HitTarget, LayerMask, ObjectId, ObjectSpec, Orbit, PlanetInfo, Scene, SceneQuery,
    SelectableObject, UiButton, UiRect,
};
pub use spin::{RecenterWatchdog, RigidSpin, SelfRotation, WatchdogPhase};
pub use feedback::{Feedback, NullFeedback, SoundCue};
pub use cursor::{CursorController, PalmProjection};
pub use selection::{DwellKind, SelectionEvent, SelectionProgress, SelectionState, SelectionStateMachine};
pub use camera::{CameraMode, CameraRigController, CameraRigState, CameraSetup, FlyEnd, RigInput, RigSnapshot};
pub use focus::{framing_pose, ObjectFocusController, RotateInput};
pub use exhibit::{Exhibit, ExhibitBuilder, FixedStep, PHYSICS_HZ};

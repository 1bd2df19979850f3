//! The scheduler that ties the components together.
//!
//! ```text
//!  GestureSource ─▶ HandSignalNormalizer ─▶ GestureState
//!                                              │
//!           ┌──────────────────────────────────┼─────────────────────┐
//!           ▼                                  ▼                     ▼
//!   CursorController ─▶ SelectionStateMachine ─▶ ObjectFocusController ◀─▶ CameraRigController
//! ```
//!
//! Every component is built once and owned here; nothing is reached
//! through a global.  The host calls [`Exhibit::frame_tick`] once per
//! display frame and [`Exhibit::physics_tick`] at a fixed rate (or lets
//! [`Exhibit::advance`] run both from a wall-clock delta).

use glam::Vec3;
use hand_signal::{GestureSource, GestureState, HandSide, HandSignalNormalizer};
use tracing::{debug, info, warn};

use crate::camera::{CameraRigController, CameraSetup, RigInput};
use crate::config::{RigConfig, ThresholdConfig};
use crate::cursor::{CursorController, PalmProjection};
use crate::error::Result;
use crate::feedback::{Feedback, SoundCue};
use crate::focus::{ObjectFocusController, RotateInput};
use crate::pose::Viewport;
use crate::scene::{LayerMask, ObjectId, Scene};
use crate::selection::{SelectionEvent, SelectionStateMachine};

/// Default physics rate.
pub const PHYSICS_HZ: f32 = 50.0;

// ════════════════════════════════════════════════════════════════════════════
// FixedStep
// ════════════════════════════════════════════════════════════════════════════

/// Turns variable frame deltas into a whole number of fixed steps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedStep {
    step: f32,
    accumulated: f32,
    max_steps: u32,
}

impl FixedStep {
    pub fn new(hz: f32) -> Self {
        FixedStep {
            step: 1.0 / hz.max(1.0),
            accumulated: 0.0,
            max_steps: 8,
        }
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    /// Number of fixed steps due after `dt` more seconds.  A long stall is
    /// capped rather than replayed in full.
    pub fn advance(&mut self, dt: f32) -> u32 {
        self.accumulated += dt.max(0.0);
        let mut n = 0;
        while self.accumulated >= self.step && n < self.max_steps {
            self.accumulated -= self.step;
            n += 1;
        }
        if n == self.max_steps {
            self.accumulated = 0.0;
        }
        n
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Builder
// ════════════════════════════════════════════════════════════════════════════

pub struct ExhibitBuilder {
    config: RigConfig,
    viewport: Viewport,
    camera: Option<CameraSetup>,
    scene: Option<Scene>,
}

impl ExhibitBuilder {
    pub fn new(config: RigConfig, viewport: Viewport) -> Self {
        ExhibitBuilder { config, viewport, camera: None, scene: None }
    }

    pub fn camera(mut self, setup: CameraSetup) -> Self {
        self.camera = Some(setup);
        self
    }

    pub fn scene(mut self, scene: Scene) -> Self {
        self.scene = Some(scene);
        self
    }

    /// Validate the configuration and wire the components.
    ///
    /// A missing camera is not an error: the rig reports it and stays
    /// still, the rest of the exhibit keeps working.
    pub fn build<S: GestureSource, F: Feedback>(self, source: S, feedback: F) -> Result<Exhibit<S, F>> {
        self.config.validate()?;
        let cfg = &self.config;
        let scene = self
            .scene
            .unwrap_or_else(|| Scene::new(cfg.spin.clone(), cfg.focus.framing));
        info!(
            source = source.name(),
            objects = scene.objects().len(),
            width = self.viewport.width,
            height = self.viewport.height,
            "exhibit ready"
        );
        Ok(Exhibit {
            palm: PalmProjection::new(&cfg.palm, self.viewport),
            cursor: CursorController::new(cfg.cursor.clone(), self.viewport),
            selection: SelectionStateMachine::new(cfg.selection.clone()),
            rig: CameraRigController::new(cfg, self.viewport, self.camera),
            focus: ObjectFocusController::new(cfg),
            physics: FixedStep::new(PHYSICS_HZ),
            thresholds: cfg.thresholds.clone(),
            normalizer: HandSignalNormalizer::new(),
            gestures: GestureState::empty(),
            started: false,
            source,
            scene,
            feedback,
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Exhibit
// ════════════════════════════════════════════════════════════════════════════

pub struct Exhibit<S, F> {
    source: S,
    normalizer: HandSignalNormalizer,
    palm: PalmProjection,
    cursor: CursorController,
    selection: SelectionStateMachine,
    rig: CameraRigController,
    focus: ObjectFocusController,
    scene: Scene,
    feedback: F,
    thresholds: ThresholdConfig,
    physics: FixedStep,
    gestures: GestureState,
    started: bool,
}

impl<S: GestureSource, F: Feedback> Exhibit<S, F> {
    // ── accessors ────────────────────────────────────────────────────────────

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn rig(&self) -> &CameraRigController {
        &self.rig
    }

    pub fn cursor(&self) -> &CursorController {
        &self.cursor
    }

    pub fn selection(&self) -> &SelectionStateMachine {
        &self.selection
    }

    pub fn focus(&self) -> &ObjectFocusController {
        &self.focus
    }

    /// Gesture state read on the last frame tick.
    pub fn gestures(&self) -> &GestureState {
        &self.gestures
    }

    pub fn feedback(&self) -> &F {
        &self.feedback
    }

    pub fn feedback_mut(&mut self) -> &mut F {
        &mut self.feedback
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    // ── direct commands ──────────────────────────────────────────────────────

    pub fn focus_on(&mut self, id: ObjectId) -> Result<()> {
        self.focus.focus_on(id, &mut self.scene, &mut self.rig, &mut self.feedback)
    }

    pub fn focus_off(&mut self) -> Result<()> {
        self.focus.focus_off(&mut self.scene, &mut self.rig, &mut self.feedback)
    }

    // ── ticks ────────────────────────────────────────────────────────────────

    /// Run one frame tick and as many physics ticks as `dt` has earned.
    pub fn advance(&mut self, dt: f32) -> Option<SelectionEvent> {
        let event = self.frame_tick(dt);
        for _ in 0..self.physics.advance(dt) {
            self.physics_tick(self.physics.step());
        }
        event
    }

    /// Per-frame update.  Returns the selection event fired this tick.
    pub fn frame_tick(&mut self, dt: f32) -> Option<SelectionEvent> {
        if !self.started {
            self.started = true;
            self.feedback.play_sound(SoundCue::Music);
        }

        let gestures = self.normalizer.poll(&mut self.source);
        self.gestures = gestures;
        let left_screen = self.palm.project(&gestures.left);
        let right_screen = self.palm.project(&gestures.right);
        let driving = self.cursor.config().driving_hand;
        let (driving_screen, other_screen) = match driving {
            HandSide::Left => (left_screen, right_screen),
            HandSide::Right => (right_screen, left_screen),
        };

        // cursor and selection stand down while the camera owns the hands
        if self.rig.hands_busy() {
            if !self.cursor.is_suspended() {
                self.selection.interrupt(&mut self.feedback);
            }
            self.cursor.suspend();
        } else {
            self.cursor.resume();
        }
        self.cursor.update(driving_screen, dt);

        let hand = gestures.hand(driving);
        let t = &self.thresholds;
        let pinch_attempt = hand.is_pinching(t.pinch);
        let pinching = pinch_attempt && hand.grab_strength < t.select_max_grab && !self.cursor.is_suspended();
        let focused = self.focus.focused().is_some();
        // a dwell counts as manual input even when it is later abandoned
        if pinch_attempt {
            self.rig.note_interaction();
        }

        let (cursor, scene, rig) = (&self.cursor, &self.scene, &self.rig);
        let event = self.selection.update(
            pinching,
            focused,
            dt,
            || cursor.hit_test(scene, rig.pose(), rig.fov(), LayerMask::SELECTABLE),
            &mut self.feedback,
        );
        if let Some(event) = event {
            self.rig.note_interaction();
            self.dispatch(event);
        }

        let rotate = RotateInput {
            hand: gestures.hand(driving.other()),
            palm_screen: other_screen,
            camera: self.rig.pose(),
            viewport: self.rig.viewport(),
            zooming: self.rig.is_zooming(),
        };
        self.focus.rotate_focused_object(&rotate, &mut self.scene, dt);

        let anchor: Option<Vec3> = self
            .focus
            .focused()
            .and_then(|id| self.scene.object(id))
            .map(|o| o.position);
        let input = RigInput {
            gestures: &gestures,
            left_screen,
            right_screen,
            focus_anchor: anchor,
            scene: &self.scene,
        };
        self.rig.tick(&input, dt);
        self.scene.advance(dt);
        self.focus.settle(&self.rig);

        if self.focus.user_absent(&gestures, dt) {
            info!("visitor gone; leaving focus");
            if let Err(e) = self.focus_off() {
                warn!(error = %e, "could not leave focus");
            }
        }
        event
    }

    /// Fixed-rate update: torque integration and the recenter watchdog.
    pub fn physics_tick(&mut self, dt: f32) {
        self.scene.physics_step(dt);
    }

    fn dispatch(&mut self, event: SelectionEvent) {
        let result = match event {
            SelectionEvent::Selected(id) => {
                debug!(id, "selected");
                self.focus_on(id)
            }
            SelectionEvent::Back if self.focus.focused().is_some() => self.focus_off(),
            SelectionEvent::Back => {
                self.rig.fly_home();
                Ok(())
            }
        };
        if let Err(e) = result {
            warn!(error = %e, ?event, "selection ignored");
        }
    }
}

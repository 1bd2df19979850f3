//! Focus ownership and hand rotation of the focused object.
//!
//! The controller owns *which* object is focused and the camera snapshot to
//! return to.  The flag on the object itself is only ever written through
//! [`Scene::set_focus`].

use glam::{EulerRot, Quat, Vec2, Vec3};
use hand_signal::{GestureState, HandSample};
use tracing::{debug, info, trace};

use crate::camera::{CameraRigController, FlyEnd, RigSnapshot};
use crate::config::{FocusConfig, RigConfig};
use crate::error::{Result, RigError};
use crate::feedback::{Feedback, SoundCue};
use crate::pose::{Pose, Viewport};
use crate::scene::{ObjectId, Scene, SelectableObject};

/// Camera pose that frames `object` from the direction the camera is
/// already looking.
pub fn framing_pose(object: &SelectableObject, camera: &Pose, fov_deg: f32, framing_offset: f32) -> Pose {
    let size = 2.0 * object.radius;
    let view = 2.0 * (fov_deg.to_radians() * 0.5).tan();
    let distance = object.framing * size / view.max(1e-4) + framing_offset * size;
    let forward = camera.forward();
    Pose::looking_at(object.position - forward * distance, object.position)
}

/// What the focused object's rotation reads on a frame tick.
pub struct RotateInput<'a> {
    /// The hand that turns the object.
    pub hand: &'a HandSample,
    /// That hand's palm on screen, for objects without rigid-body dynamics.
    pub palm_screen: Option<Vec2>,
    pub camera: &'a Pose,
    pub viewport: Viewport,
    pub zooming: bool,
}

pub struct ObjectFocusController {
    config: FocusConfig,
    rotate_grab: f32,
    reset_fov: f32,
    focused: Option<ObjectId>,
    pre_focus: Option<RigSnapshot>,
    /// Where the last fly-out is heading, while it is still in the air.
    returning: Option<RigSnapshot>,
    /// Palm position the next rotation delta is measured from.
    palm_reference: Option<Vec3>,
    hands_absent_for: f32,
}

impl ObjectFocusController {
    pub fn new(config: &RigConfig) -> Self {
        ObjectFocusController {
            config: config.focus.clone(),
            rotate_grab: config.thresholds.focus_rotate_grab,
            reset_fov: config.zoom.reset_fov,
            focused: None,
            pre_focus: None,
            returning: None,
            palm_reference: None,
            hands_absent_for: 0.0,
        }
    }

    pub fn focused(&self) -> Option<ObjectId> {
        self.focused
    }

    pub fn pre_focus(&self) -> Option<&RigSnapshot> {
        self.pre_focus.as_ref()
    }

    /// Fly to `id` and make it the focused object.
    ///
    /// Switching from one focused object to another keeps the original
    /// pre-focus snapshot, so "back" always returns to where the user
    /// started.
    pub fn focus_on<F: Feedback + ?Sized>(
        &mut self,
        id: ObjectId,
        scene: &mut Scene,
        rig: &mut CameraRigController,
        feedback: &mut F,
    ) -> Result<()> {
        if scene.object(id).is_none() {
            return Err(RigError::UnknownObject(id));
        }
        if self.focused == Some(id) {
            trace!(id, "already focused");
            return Ok(());
        }

        match self.focused.take() {
            Some(previous) => {
                if let Some(o) = scene.object_mut(previous) {
                    o.spin.resume();
                }
            }
            None => {
                let snapshot = match self.returning.take() {
                    Some(back) if rig.is_in_flight() => back,
                    _ => rig.snapshot(),
                };
                self.pre_focus = Some(snapshot);
            }
        }

        scene.set_focus(Some(id))?;
        self.focused = Some(id);
        self.palm_reference = None;
        self.hands_absent_for = 0.0;

        let Some(object) = scene.object_mut(id) else {
            return Err(RigError::UnknownObject(id));
        };
        object.spin.suspend();
        let destination = framing_pose(object, rig.pose(), rig.fov(), self.config.framing_offset);
        rig.fly_to(destination, self.config.fly_in_duration, FlyEnd::Follow, Some(object.position));

        info!(name = %object.name, "focus on");
        feedback.play_sound(SoundCue::Woosh);
        feedback.show_info_panel(object);
        Ok(())
    }

    /// Drop focus and fly back to the pre-focus pose.  Does nothing when
    /// nothing is focused.
    pub fn focus_off<F: Feedback + ?Sized>(
        &mut self,
        scene: &mut Scene,
        rig: &mut CameraRigController,
        feedback: &mut F,
    ) -> Result<()> {
        let Some(id) = self.focused.take() else {
            return Ok(());
        };
        scene.set_focus(None)?;
        if let Some(o) = scene.object_mut(id) {
            o.spin.resume();
            info!(name = %o.name, "focus off");
        }
        self.palm_reference = None;

        let back = self.pre_focus.take().unwrap_or_else(|| rig.snapshot());
        rig.fly_back(back, self.config.fly_out_duration);
        rig.reset_fov(self.reset_fov);
        self.returning = Some(back);

        feedback.play_sound(SoundCue::Woosh);
        feedback.hide_info_panel();
        Ok(())
    }

    /// Turn the focused object with a fist.
    ///
    /// Rigid bodies receive torque about the camera's right/up axes, which
    /// the physics tick integrates.  Other objects are slerped toward an
    /// orientation read off the palm's screen position.
    pub fn rotate_focused_object(&mut self, input: &RotateInput<'_>, scene: &mut Scene, dt: f32) {
        let Some(id) = self.focused else {
            self.palm_reference = None;
            return;
        };
        if input.zooming || !input.hand.is_grabbing(self.rotate_grab) {
            self.palm_reference = None;
            return;
        }
        let Some(object) = scene.object_mut(id) else {
            return;
        };

        if object.body.rigid.is_none() {
            let Some(palm) = input.palm_screen else {
                return;
            };
            let nx = palm.x / input.viewport.width.max(1.0);
            let ny = palm.y / input.viewport.height.max(1.0);
            let goal = input.camera.rotation
                * Quat::from_euler(
                    EulerRot::YXZ,
                    (-nx * 360.0).to_radians(),
                    (-ny * 360.0).to_radians(),
                    180f32.to_radians(),
                );
            let t = (self.config.slerp_rate * dt).clamp(0.0, 1.0);
            object.body.orientation = object.body.orientation.slerp(goal, t).normalize();
            return;
        }

        let palm = input.hand.palm_position;
        let Some(reference) = self.palm_reference else {
            self.palm_reference = Some(palm);
            return;
        };
        let delta = palm - reference;
        if delta.length() <= self.config.movement_threshold {
            return;
        }
        self.palm_reference = Some(palm);

        let torque = (input.camera.right() * delta.y - input.camera.up() * delta.x)
            * self.config.torque_multiplier
            * self.config.torque_blend;
        if let Some(rigid) = object.body.rigid.as_mut() {
            trace!(?torque, "torque queued");
            rigid.add_torque(torque);
        }
    }

    /// Count time without any hand.  Returns `true` once focus should be
    /// dropped because the visitor walked away.
    pub fn user_absent(&mut self, gestures: &GestureState, dt: f32) -> bool {
        if self.focused.is_none() || gestures.any_present() {
            self.hands_absent_for = 0.0;
            return false;
        }
        self.hands_absent_for += dt;
        if self.hands_absent_for >= self.config.auto_unfocus_after {
            debug!(after = self.hands_absent_for, "no hands; releasing focus");
            self.hands_absent_for = 0.0;
            return true;
        }
        false
    }

    /// Forget a finished fly-out.
    pub fn settle(&mut self, rig: &CameraRigController) {
        if !rig.is_in_flight() {
            self.returning = None;
        }
    }
}

//! The orbit camera rig.
//!
//! One [`CameraMode`] is active at a time.  Gestures pick the mode each
//! tick:
//!
//! | left fist | right fist | mode |
//! |---|---|---|
//! | no  | no  | `IdleAutoRotate` (spins only after the idle timeout) |
//! | no  | yes | `ManualRotate` |
//! | yes | no  | `ManualPan` (never while focused) |
//! | yes | yes | `TwoHandZoom` |
//!
//! A hand that is not tracked counts as an open hand.  Timed flights
//! (`FocusTransition`) ignore gestures until they land; landing on an object
//! switches to `FocusedFollow`, where rotate orbits the object and zoom
//! still adjusts the field of view.
//!
//! Orbit placement is kept as yaw / elevation / distance about a pivot and
//! the camera is always aimed at the pivot, so camera pitch is simply
//! `-elevation`.

use glam::{Vec2, Vec3};
use hand_signal::GestureState;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace, warn};

use crate::config::{CameraConfig, RigConfig, ZoomConfig};
use crate::error::RigError;
use crate::math::{clamped_remap, smooth_damp, smooth_damp_vec3};
use crate::pose::{viewport_ray, OrbitCoords, Pose, Viewport};
use crate::scene::{LayerMask, SceneQuery};
use crate::task::PoseTransition;

// ════════════════════════════════════════════════════════════════════════════
// Public types
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMode {
    IdleAutoRotate,
    ManualRotate,
    ManualPan,
    TwoHandZoom,
    FocusTransition,
    FocusedFollow,
}

/// Initial camera placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSetup {
    pub position: Vec3,
    pub target: Vec3,
    pub fov_deg: f32,
}

impl Default for CameraSetup {
    fn default() -> Self {
        CameraSetup {
            position: Vec3::new(0.0, 18.0, 40.0),
            target: Vec3::ZERO,
            fov_deg: 40.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraRigState {
    pub target_point: Vec3,
    pub distance: f32,
    /// Field of view the rig is steering toward.
    pub field_of_view: f32,
    /// Field of view actually used for rendering.
    pub damped_fov: f32,
    pub pose: Pose,
    /// Rig clock time of the last manual interaction, in seconds.
    pub last_input_time: f64,
}

/// Enough to fly back to where the camera was.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigSnapshot {
    pub pose: Pose,
    pub target_point: Vec3,
}

/// What happens when a flight lands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlyEnd {
    /// Follow the object whose position is passed as the focus anchor.
    Follow,
    /// Resume free orbiting around `target`.
    Release { target: Vec3 },
}

/// Everything the rig reads in one frame tick.
pub struct RigInput<'a> {
    pub gestures: &'a GestureState,
    pub left_screen: Option<Vec2>,
    pub right_screen: Option<Vec2>,
    /// Current position of the focused object, if any.
    pub focus_anchor: Option<Vec3>,
    pub scene: &'a dyn SceneQuery,
}

// ════════════════════════════════════════════════════════════════════════════
// Internal gesture state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ZoomDirection {
    In,
    Out,
}

#[derive(Debug, Clone, Copy)]
struct ZoomGesture {
    baseline: f32,
    direction: Option<ZoomDirection>,
    last_distance: f32,
    /// Seconds since both fists opened, while waiting out the grace window.
    released_for: Option<f32>,
}

#[derive(Debug, Clone)]
struct Flight {
    task: PoseTransition,
    end: FlyEnd,
    /// Anchor position when the flight started; the destination is shifted
    /// by however far the anchor has moved since.
    anchor_origin: Option<Vec3>,
    destination: Pose,
}

#[derive(Debug, Clone, Copy)]
struct Follow {
    distance: f32,
}

// ════════════════════════════════════════════════════════════════════════════
// CameraRigController
// ════════════════════════════════════════════════════════════════════════════

pub struct CameraRigController {
    camera: CameraConfig,
    zoom_cfg: ZoomConfig,
    grab_threshold: f32,
    viewport: Viewport,
    enabled: bool,

    state: CameraRigState,
    mode: CameraMode,
    orbit: OrbitCoords,
    home: RigSnapshot,

    flight: Option<Flight>,
    follow: Option<Follow>,
    rotate_last: Option<Vec2>,
    pan_last: Option<Vec2>,
    zoom: Option<ZoomGesture>,

    drag_speed: f32,
    drag_speed_velocity: f32,
    anchor_velocity: Vec3,
    fov_velocity: f32,
    clock: f64,
}

impl CameraRigController {
    /// Build the rig.  Without a camera setup the rig logs once and every
    /// later call is a no-op.
    pub fn new(config: &RigConfig, viewport: Viewport, setup: Option<CameraSetup>) -> Self {
        let enabled = setup.is_some();
        if !enabled {
            let err = RigError::missing("camera setup");
            error!(error = %err, "camera control disabled");
        }
        let setup = setup.unwrap_or_default();
        let fov = setup.fov_deg.clamp(config.zoom.min_fov, config.zoom.max_fov);
        let pose = Pose::looking_at(setup.position, setup.target);
        let orbit = OrbitCoords::from_offset(setup.position - setup.target);

        CameraRigController {
            camera: config.camera.clone(),
            zoom_cfg: config.zoom.clone(),
            grab_threshold: config.thresholds.grab,
            viewport,
            enabled,
            state: CameraRigState {
                target_point: setup.target,
                distance: orbit.distance,
                field_of_view: fov,
                damped_fov: fov,
                pose,
                last_input_time: 0.0,
            },
            mode: CameraMode::IdleAutoRotate,
            orbit,
            home: RigSnapshot { pose, target_point: setup.target },
            flight: None,
            follow: None,
            rotate_last: None,
            pan_last: None,
            zoom: None,
            drag_speed: config.camera.pan_speed_min,
            drag_speed_velocity: 0.0,
            anchor_velocity: Vec3::ZERO,
            fov_velocity: 0.0,
            clock: 0.0,
        }
    }

    // ── accessors ────────────────────────────────────────────────────────────

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    pub fn state(&self) -> &CameraRigState {
        &self.state
    }

    pub fn pose(&self) -> &Pose {
        &self.state.pose
    }

    /// Field of view to render with.
    pub fn fov(&self) -> f32 {
        self.state.damped_fov
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Orbit about the current pivot (the focused object while following).
    pub fn orbit(&self) -> OrbitCoords {
        self.orbit
    }

    pub fn is_zooming(&self) -> bool {
        self.zoom.is_some()
    }

    pub fn is_in_flight(&self) -> bool {
        self.flight.is_some()
    }

    /// A manual camera gesture or a flight is using the hands/camera.
    pub fn hands_busy(&self) -> bool {
        self.flight.is_some() || self.zoom.is_some() || self.rotate_last.is_some() || self.pan_last.is_some()
    }

    pub fn is_auto_rotating(&self) -> bool {
        self.mode == CameraMode::IdleAutoRotate && self.idle_for() > self.camera.idle_timeout as f64
    }

    fn idle_for(&self) -> f64 {
        self.clock - self.state.last_input_time
    }

    /// Reset the idle timer.
    pub fn note_interaction(&mut self) {
        self.state.last_input_time = self.clock;
    }

    // ── flights ──────────────────────────────────────────────────────────────

    pub fn snapshot(&self) -> RigSnapshot {
        RigSnapshot {
            pose: self.state.pose,
            target_point: self.state.target_point,
        }
    }

    /// Start a timed flight from the current pose.  A flight already under
    /// way is replaced; the new one starts wherever the camera is now.
    pub fn fly_to(&mut self, destination: Pose, duration: f32, end: FlyEnd, anchor: Option<Vec3>) {
        if !self.enabled {
            return;
        }
        if self.flight.is_some() {
            debug!("superseding running camera flight");
        }
        self.flight = Some(Flight {
            task: PoseTransition::new(self.state.pose, destination, duration),
            end,
            anchor_origin: anchor,
            destination,
        });
        self.follow = None;
        self.rotate_last = None;
        self.pan_last = None;
        self.zoom = None;
        self.set_mode(CameraMode::FocusTransition);
        self.note_interaction();
    }

    pub fn fly_back(&mut self, snapshot: RigSnapshot, duration: f32) {
        self.fly_to(snapshot.pose, duration, FlyEnd::Release { target: snapshot.target_point }, None);
    }

    /// Return to the initial camera placement.
    pub fn fly_home(&mut self) {
        debug!("camera flying home");
        self.fly_back(self.home, self.camera.home_duration);
    }

    /// Ease the field of view back to `fov`.
    pub fn reset_fov(&mut self, fov: f32) {
        self.state.field_of_view = fov.clamp(self.zoom_cfg.min_fov, self.zoom_cfg.max_fov);
    }

    // ── per-tick ─────────────────────────────────────────────────────────────

    pub fn tick(&mut self, input: &RigInput<'_>, dt: f32) {
        if !self.enabled {
            return;
        }
        self.clock += dt as f64;

        if self.flight.is_some() {
            self.advance_flight(input.focus_anchor, dt);
            self.update_fov(dt);
            return;
        }

        let anchor = match (self.follow, input.focus_anchor) {
            (Some(_), Some(a)) => Some(a),
            (Some(_), None) => {
                warn!("focused object no longer reported; releasing camera");
                self.release_follow();
                None
            }
            _ => None,
        };
        if let Some(a) = anchor {
            self.orbit = OrbitCoords::from_offset(self.state.pose.position - a);
        }
        let focused = anchor.is_some();

        let g = input.gestures;
        let left = g.left.is_grabbing(self.grab_threshold);
        let right = g.right.is_grabbing(self.grab_threshold);

        if left && right {
            self.zoom_step(g, dt);
        } else if self.zoom.is_some() {
            if left || right {
                self.end_zoom("another gesture took over");
            } else {
                self.zoom_release_step(g, dt);
            }
        }

        if self.zoom.is_some() {
            self.rotate_last = None;
            self.pan_last = None;
        } else {
            if right {
                self.rotate_step(input.right_screen, focused);
            } else {
                self.rotate_last = None;
            }
            if left && !right && !focused {
                self.pan_step(input.left_screen, input.scene, dt);
            } else {
                self.pan_last = None;
            }
        }

        if left || right || self.zoom.is_some() {
            self.note_interaction();
        }

        self.soft_clamp_pitch();

        if let Some(a) = anchor {
            self.set_mode(CameraMode::FocusedFollow);
            self.follow_step(a, dt);
        } else {
            let mode = if self.zoom.is_some() {
                CameraMode::TwoHandZoom
            } else if self.rotate_last.is_some() {
                CameraMode::ManualRotate
            } else if self.pan_last.is_some() {
                CameraMode::ManualPan
            } else {
                CameraMode::IdleAutoRotate
            };
            self.set_mode(mode);
            if self.is_auto_rotating() {
                self.orbit.yaw_deg -= self.camera.idle_rotate_deg_per_sec * dt;
            }
            self.state.pose = self.orbit.pose_about(self.state.target_point);
            self.state.distance = self.orbit.distance;
        }

        self.update_fov(dt);
    }

    fn set_mode(&mut self, mode: CameraMode) {
        if self.mode != mode {
            debug!(from = ?self.mode, to = ?mode, "camera mode");
            self.mode = mode;
        }
    }

    // ── flight ───────────────────────────────────────────────────────────────

    fn advance_flight(&mut self, anchor: Option<Vec3>, dt: f32) {
        let Some(flight) = self.flight.as_mut() else {
            return;
        };
        if let (FlyEnd::Follow, Some(origin), Some(now)) = (flight.end, flight.anchor_origin, anchor) {
            let mut to = flight.destination;
            to.position += now - origin;
            flight.task.retarget(to);
        }
        let pose = flight.task.advance(dt);
        self.state.pose = pose;
        if !flight.task.is_finished() {
            return;
        }

        let end = flight.end;
        self.flight = None;
        self.note_interaction();
        match (end, anchor) {
            (FlyEnd::Follow, Some(a)) => {
                let distance = pose.position.distance(a);
                debug!(distance, "flight landed; following object");
                self.follow = Some(Follow { distance });
                self.state.target_point = a;
                self.state.distance = distance;
                self.orbit = OrbitCoords::from_offset(pose.position - a);
                self.set_mode(CameraMode::FocusedFollow);
            }
            (FlyEnd::Follow, None) => {
                warn!("flight landed but the object is gone; releasing camera");
                let target = pose.position + pose.forward() * self.state.distance.max(1.0);
                self.land_free(target);
            }
            (FlyEnd::Release { target }, _) => {
                debug!("flight landed; free orbit");
                self.land_free(target);
            }
        }
    }

    fn land_free(&mut self, target: Vec3) {
        self.follow = None;
        self.state.target_point = target;
        self.orbit = OrbitCoords::from_offset(self.state.pose.position - target);
        self.state.distance = self.orbit.distance;
        self.set_mode(CameraMode::IdleAutoRotate);
    }

    fn release_follow(&mut self) {
        let pose = self.state.pose;
        let target = pose.position + pose.forward() * self.state.distance.max(1.0);
        self.land_free(target);
    }

    // ── follow ───────────────────────────────────────────────────────────────

    fn follow_step(&mut self, anchor: Vec3, dt: f32) {
        let Some(follow) = self.follow else {
            return;
        };
        let mut position = anchor + self.orbit.offset();
        let excess = self.orbit.distance - follow.distance;
        if excess > 0.0 {
            let step = ((1.0 + excess) * dt).min(excess);
            position += (anchor - position).normalize_or_zero() * step;
            trace!(excess, step, "chasing focused object");
        }
        self.state.pose = Pose::looking_at(position, anchor);
        self.state.target_point = anchor;
        self.state.distance = position.distance(anchor);
        self.orbit = OrbitCoords::from_offset(position - anchor);
    }

    // ── rotate ───────────────────────────────────────────────────────────────

    fn rotate_step(&mut self, screen: Option<Vec2>, focused: bool) {
        let Some(current) = screen else {
            self.rotate_last = None;
            return;
        };
        let last = self.rotate_last.replace(current).unwrap_or(current);
        let delta = current - last;
        let s = if focused {
            self.camera.focused_rotate_sensitivity
        } else {
            self.camera.rotate_sensitivity
        };
        self.orbit_by(-delta.x * s, -delta.y * s);
    }

    /// Apply an orbit step.  Vertical steps slow down near the pitch limit
    /// and are rejected outright if they would cross it.
    fn orbit_by(&mut self, d_yaw: f32, d_elevation: f32) {
        self.orbit.yaw_deg += d_yaw;

        let limit = self.camera.pitch_limit_deg;
        let elevation = self.orbit.elevation_deg;
        let mut step = d_elevation;
        let band_start = limit - self.camera.slowdown_band_deg;
        if step * elevation > 0.0 && elevation.abs() > band_start {
            step *= clamped_remap(elevation.abs(), band_start, limit, 1.0, self.camera.slowdown_min);
        }
        let next = elevation + step;
        if next.abs() > limit && next.abs() > elevation.abs() {
            trace!(elevation, step, "vertical orbit step rejected at pitch limit");
            return;
        }
        self.orbit.elevation_deg = next;
    }

    /// Nudge pitch back under the limit by at most one correction step.
    fn soft_clamp_pitch(&mut self) {
        let limit = self.camera.pitch_limit_deg;
        let e = self.orbit.elevation_deg;
        let over = e.abs() - limit;
        if over > 0.0 {
            self.orbit.elevation_deg -= e.signum() * over.min(self.camera.pitch_correction_deg);
        }
    }

    // ── pan ──────────────────────────────────────────────────────────────────

    fn pan_step(&mut self, screen: Option<Vec2>, scene: &dyn SceneQuery, dt: f32) {
        let Some(current) = screen else {
            self.pan_last = None;
            return;
        };
        let last = self.pan_last.replace(current).unwrap_or(current);
        let delta = current - last;

        let pitch = self.orbit.pitch_deg().abs();
        let target_speed = clamped_remap(
            pitch,
            self.camera.pan_pitch_min,
            self.camera.pan_pitch_max,
            self.camera.pan_speed_min,
            self.camera.pan_speed_max,
        );
        self.drag_speed = smooth_damp(
            self.drag_speed,
            target_speed,
            &mut self.drag_speed_velocity,
            self.camera.pan_speed_smooth_time,
            dt,
        );

        let pose = self.state.pose;
        let flat = |v: Vec3| Vec3::new(v.x, 0.0, v.z).normalize_or_zero();
        let k = self.drag_speed * self.camera.pan_scale;
        let movement = flat(pose.right()) * (-delta.x * k) + flat(pose.forward()) * (-delta.y * k);
        self.state.target_point += movement;

        // keep the pivot on the surface under the view centre
        let view = self.orbit.pose_about(self.state.target_point);
        let ray = viewport_ray(&view, self.state.damped_fov, self.viewport, self.viewport.center());
        if let Some(hit) = scene.raycast(&ray, LayerMask::ANCHOR) {
            self.state.target_point = smooth_damp_vec3(
                self.state.target_point,
                hit.point,
                &mut self.anchor_velocity,
                self.camera.anchor_smooth_time,
                dt,
            );
        }
    }

    // ── zoom ─────────────────────────────────────────────────────────────────

    fn zoom_step(&mut self, g: &GestureState, dt: f32) {
        let Some(distance) = g.distance() else {
            return;
        };
        let cfg = &self.zoom_cfg;
        let zoom = self.zoom.get_or_insert_with(|| {
            debug!(baseline = distance, "zoom started");
            ZoomGesture {
                baseline: distance,
                direction: None,
                last_distance: distance,
                released_for: None,
            }
        });
        zoom.released_for = None;
        zoom.last_distance = distance;

        if zoom.direction.is_none() {
            if distance > zoom.baseline + cfg.direction_margin {
                debug!("zoom direction locked: in");
                zoom.direction = Some(ZoomDirection::In);
            } else if distance < zoom.baseline - cfg.direction_margin {
                debug!("zoom direction locked: out");
                zoom.direction = Some(ZoomDirection::Out);
            }
        }
        let Some(direction) = zoom.direction else {
            return;
        };

        let along = match direction {
            ZoomDirection::In => distance - zoom.baseline,
            ZoomDirection::Out => zoom.baseline - distance,
        };
        // dead zone: hands held near the baseline leave the view alone
        if along < cfg.delta_min {
            return;
        }
        let rate = clamped_remap(along, cfg.delta_min, cfg.delta_max, cfg.rate_min, cfg.rate_max);
        let sign = match direction {
            ZoomDirection::In => -1.0,
            ZoomDirection::Out => 1.0,
        };
        self.state.field_of_view = (self.state.field_of_view + sign * rate * dt).clamp(cfg.min_fov, cfg.max_fov);
    }

    fn zoom_release_step(&mut self, g: &GestureState, dt: f32) {
        let Some(zoom) = self.zoom.as_mut() else {
            return;
        };
        let released_for = zoom.released_for.unwrap_or(0.0) + dt;
        zoom.released_for = Some(released_for);

        let stable = match g.distance() {
            Some(d) => {
                let step = (d - zoom.last_distance).abs();
                zoom.last_distance = d;
                step < self.zoom_cfg.stability_threshold
            }
            None => true,
        };
        if released_for >= self.zoom_cfg.release_grace && stable {
            self.end_zoom("released");
        }
    }

    fn end_zoom(&mut self, why: &str) {
        if self.zoom.take().is_some() {
            debug!(why, "zoom ended");
        }
    }

    fn update_fov(&mut self, dt: f32) {
        let (lo, hi) = (self.zoom_cfg.min_fov, self.zoom_cfg.max_fov);
        self.state.field_of_view = self.state.field_of_view.clamp(lo, hi);
        self.state.damped_fov = smooth_damp(
            self.state.damped_fov,
            self.state.field_of_view,
            &mut self.fov_velocity,
            self.zoom_cfg.smooth_time,
            dt,
        )
        .clamp(lo, hi);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SpinConfig;
    use crate::scene::Scene;
    use approx::assert_relative_eq;
    use hand_signal::HandSample;

    const DT: f32 = 1.0 / 60.0;

    fn hand(grab: f32, x: f32) -> HandSample {
        HandSample::tracked(Vec3::new(x, 0.2, 0.0), grab, 0.0)
    }

    fn gestures(left: Option<HandSample>, right: Option<HandSample>) -> GestureState {
        GestureState::from_hands(left.unwrap_or_default(), right.unwrap_or_default())
    }

    fn rig() -> CameraRigController {
        CameraRigController::new(&RigConfig::default(), Viewport::new(1280.0, 720.0), Some(CameraSetup::default()))
    }

    fn empty_scene() -> Scene {
        Scene::new(SpinConfig::default(), 1.25).with_ground(0.0)
    }

    struct Drive<'a> {
        rig: &'a mut CameraRigController,
        scene: &'a Scene,
    }

    impl Drive<'_> {
        fn tick(&mut self, g: &GestureState, left: Option<Vec2>, right: Option<Vec2>, anchor: Option<Vec3>) {
            let input = RigInput {
                gestures: g,
                left_screen: left,
                right_screen: right,
                focus_anchor: anchor,
                scene: self.scene,
            };
            self.rig.tick(&input, DT);
        }
    }

    #[test]
    fn idle_rotation_waits_for_timeout() {
        let mut r = rig();
        let scene = empty_scene();
        let yaw0 = r.orbit().yaw_deg;
        let none = GestureState::empty();
        let mut d = Drive { rig: &mut r, scene: &scene };
        for _ in 0..(4.0 / DT) as usize {
            d.tick(&none, None, None, None);
        }
        assert_eq!(d.rig.orbit().yaw_deg, yaw0);
        for _ in 0..(2.0 / DT) as usize {
            d.tick(&none, None, None, None);
        }
        assert!(d.rig.is_auto_rotating());
        assert!(d.rig.orbit().yaw_deg < yaw0);
    }

    #[test]
    fn right_fist_rotates_with_left_hand_absent() {
        let mut r = rig();
        let scene = empty_scene();
        let yaw0 = r.orbit().yaw_deg;
        let g = gestures(None, Some(hand(1.0, 0.1)));
        let mut d = Drive { rig: &mut r, scene: &scene };
        d.tick(&g, None, Some(Vec2::new(600.0, 360.0)), None);
        d.tick(&g, None, Some(Vec2::new(650.0, 360.0)), None);
        assert_eq!(d.rig.mode(), CameraMode::ManualRotate);
        assert_relative_eq!(d.rig.orbit().yaw_deg, yaw0 - 50.0 * 0.18, epsilon = 1e-3);
        assert!(d.rig.hands_busy());
    }

    #[test]
    fn releasing_resets_idle_timer() {
        let mut r = rig();
        let scene = empty_scene();
        let g = gestures(None, Some(hand(1.0, 0.1)));
        let none = GestureState::empty();
        let mut d = Drive { rig: &mut r, scene: &scene };
        for _ in 0..(6.0 / DT) as usize {
            d.tick(&none, None, None, None);
        }
        assert!(d.rig.is_auto_rotating());
        d.tick(&g, None, Some(Vec2::ZERO), None);
        d.tick(&none, None, None, None);
        assert_eq!(d.rig.mode(), CameraMode::IdleAutoRotate);
        assert!(!d.rig.is_auto_rotating());
    }

    #[test]
    fn pitch_never_exceeds_limit() {
        let cfg = RigConfig::default();
        let mut r = rig();
        let scene = empty_scene();
        let g = gestures(None, Some(hand(1.0, 0.0)));
        let mut d = Drive { rig: &mut r, scene: &scene };
        let mut y = 360.0;
        for i in 0..600 {
            // hand moves down then up, hard
            y += if i < 300 { -40.0 } else { 40.0 };
            d.tick(&g, None, Some(Vec2::new(640.0, y)), None);
            let pitch = d.rig.pose().pitch_deg().abs();
            assert!(
                pitch <= cfg.camera.pitch_limit_deg + cfg.camera.pitch_correction_deg + 1e-3,
                "pitch {pitch} at tick {i}"
            );
        }
    }

    #[test]
    fn soft_clamp_nudges_back() {
        let setup = CameraSetup {
            position: Vec3::new(0.0, 30.0, 10.0),
            ..CameraSetup::default()
        };
        let cfg = RigConfig::default();
        let mut r = CameraRigController::new(&cfg, Viewport::new(1280.0, 720.0), Some(setup));
        let scene = empty_scene();
        let start = r.orbit().elevation_deg;
        assert!(start > cfg.camera.pitch_limit_deg);
        let none = GestureState::empty();
        let mut d = Drive { rig: &mut r, scene: &scene };
        d.tick(&none, None, None, None);
        let after = d.rig.orbit().elevation_deg;
        assert_relative_eq!(start - after, cfg.camera.pitch_correction_deg, epsilon = 1e-3);
        for _ in 0..1000 {
            d.tick(&none, None, None, None);
        }
        assert!(d.rig.orbit().elevation_deg <= cfg.camera.pitch_limit_deg + 1e-3);
    }

    #[test]
    fn left_fist_pans_and_stays_on_ground() {
        let mut r = rig();
        let scene = empty_scene();
        let g = gestures(Some(hand(1.0, -0.1)), None);
        let mut d = Drive { rig: &mut r, scene: &scene };
        let mut x = 640.0;
        for _ in 0..30 {
            x += 10.0;
            d.tick(&g, Some(Vec2::new(x, 360.0)), None, None);
        }
        assert_eq!(d.rig.mode(), CameraMode::ManualPan);
        let t = d.rig.state().target_point;
        // camera looks down -Z from +Z, so screen-right is +X and the pivot drags left
        assert!(t.x < -0.1, "target {t:?}");
        assert_relative_eq!(t.y, 0.0, epsilon = 1e-3);
    }

    #[test]
    fn zoom_locks_in_and_never_reverses() {
        let cfg = RigConfig::default();
        let mut r = rig();
        let scene = empty_scene();
        let mut d = Drive { rig: &mut r, scene: &scene };
        let mut prev = d.rig.state().field_of_view;
        // 0.30 m apart, grows to 0.40 m, then wobbles by less than 0.02
        let mut dist = 0.30;
        for i in 0..240 {
            if i < 60 {
                dist += 0.10 / 60.0;
            } else if i % 2 == 0 {
                dist -= 0.015;
            } else {
                dist += 0.015;
            }
            let g = gestures(Some(hand(1.0, -dist / 2.0)), Some(hand(1.0, dist / 2.0)));
            d.tick(&g, None, None, None);
            let fov = d.rig.state().field_of_view;
            assert!(fov <= prev + 1e-6, "fov went up at tick {i}: {prev} -> {fov}");
            assert!((cfg.zoom.min_fov..=cfg.zoom.max_fov).contains(&fov));
            assert!((cfg.zoom.min_fov..=cfg.zoom.max_fov).contains(&d.rig.fov()));
            prev = fov;
        }
        assert_eq!(d.rig.mode(), CameraMode::TwoHandZoom);
        assert!(prev < 40.0);
    }

    #[test]
    fn zoom_rests_inside_dead_zone() {
        let cfg = RigConfig::default();
        let mut r = rig();
        let scene = empty_scene();
        let mut d = Drive { rig: &mut r, scene: &scene };
        let fists = |dist: f32| gestures(Some(hand(1.0, -dist / 2.0)), Some(hand(1.0, dist / 2.0)));
        d.tick(&fists(0.30), None, None, None);
        // lock in, then ease back to just past the baseline
        for _ in 0..10 {
            d.tick(&fists(0.40), None, None, None);
        }
        let locked = d.rig.state().field_of_view;
        assert!(locked < 40.0);
        for _ in 0..120 {
            d.tick(&fists(0.30 + cfg.zoom.delta_min * 0.5), None, None, None);
        }
        assert_eq!(d.rig.state().field_of_view, locked);
        assert!(d.rig.is_zooming());
    }

    #[test]
    fn fov_clamped_under_extreme_input() {
        let cfg = RigConfig::default();
        let mut r = rig();
        let scene = empty_scene();
        let mut d = Drive { rig: &mut r, scene: &scene };
        for i in 0..600 {
            let dist = 0.3 + i as f32 * 0.5;
            let g = gestures(Some(hand(1.0, -dist)), Some(hand(1.0, dist)));
            d.tick(&g, None, None, None);
            assert!(d.rig.state().field_of_view >= cfg.zoom.min_fov);
            assert!(d.rig.fov() >= cfg.zoom.min_fov);
        }
        assert_relative_eq!(d.rig.state().field_of_view, cfg.zoom.min_fov);
    }

    #[test]
    fn zoom_exit_waits_for_grace() {
        let mut r = rig();
        let scene = empty_scene();
        let mut d = Drive { rig: &mut r, scene: &scene };
        let fists = gestures(Some(hand(1.0, -0.15)), Some(hand(1.0, 0.15)));
        let open = gestures(Some(hand(0.0, -0.15)), Some(hand(0.0, 0.15)));
        d.tick(&fists, None, None, None);
        assert!(d.rig.is_zooming());
        for _ in 0..20 {
            d.tick(&open, None, None, None);
        }
        assert!(d.rig.is_zooming());
        for _ in 0..20 {
            d.tick(&open, None, None, None);
        }
        assert!(!d.rig.is_zooming());
    }

    #[test]
    fn new_flight_starts_from_in_flight_pose() {
        let mut r = rig();
        let scene = empty_scene();
        let a = Pose::looking_at(Vec3::new(10.0, 2.0, 5.0), Vec3::new(10.0, 0.0, 0.0));
        r.fly_to(a, 1.5, FlyEnd::Follow, Some(Vec3::new(10.0, 0.0, 0.0)));
        let none = GestureState::empty();
        let mut d = Drive { rig: &mut r, scene: &scene };
        for _ in 0..30 {
            d.tick(&none, None, None, Some(Vec3::new(10.0, 0.0, 0.0)));
        }
        let mid = *d.rig.pose();
        let home = d.rig.home;
        d.rig.fly_back(home, 1.8);
        assert_eq!(d.rig.mode(), CameraMode::FocusTransition);
        let flight = d.rig.flight.as_ref().unwrap();
        assert_eq!(flight.task.from().position, mid.position);
        for _ in 0..200 {
            d.tick(&none, None, None, None);
        }
        assert_eq!(d.rig.mode(), CameraMode::IdleAutoRotate);
        assert_relative_eq!(d.rig.pose().position.distance(home.pose.position), 0.0, epsilon = 1e-3);
    }

    #[test]
    fn follow_chases_moving_object() {
        let mut r = rig();
        let scene = empty_scene();
        let obj = Vec3::new(10.0, 0.0, 0.0);
        r.fly_to(Pose::looking_at(obj + Vec3::new(0.0, 1.0, 4.0), obj), 0.1, FlyEnd::Follow, Some(obj));
        let none = GestureState::empty();
        let mut d = Drive { rig: &mut r, scene: &scene };
        for _ in 0..10 {
            d.tick(&none, None, None, Some(obj));
        }
        assert_eq!(d.rig.mode(), CameraMode::FocusedFollow);
        let held = d.rig.state().distance;

        // object jumps 3 units away: the camera closes in gradually
        let moved = obj + Vec3::new(0.0, 0.0, -3.0);
        d.tick(&none, None, None, Some(moved));
        let after_one = d.rig.state().distance;
        assert!(after_one > held + 2.0);
        for _ in 0..600 {
            d.tick(&none, None, None, Some(moved));
        }
        assert_relative_eq!(d.rig.state().distance, held, epsilon = 1e-2);
        assert_relative_eq!(d.rig.pose().forward().dot((moved - d.rig.pose().position).normalize()), 1.0, epsilon = 1e-4);
    }

    #[test]
    fn pan_is_ignored_while_focused() {
        let mut r = rig();
        let scene = empty_scene();
        let obj = Vec3::new(5.0, 0.0, 0.0);
        r.fly_to(Pose::looking_at(obj + Vec3::new(0.0, 1.0, 4.0), obj), 0.05, FlyEnd::Follow, Some(obj));
        let none = GestureState::empty();
        let left = gestures(Some(hand(1.0, 0.0)), None);
        let mut d = Drive { rig: &mut r, scene: &scene };
        for _ in 0..5 {
            d.tick(&none, None, None, Some(obj));
        }
        for i in 0..20 {
            d.tick(&left, Some(Vec2::new(600.0 + i as f32 * 20.0, 300.0)), None, Some(obj));
        }
        assert_eq!(d.rig.mode(), CameraMode::FocusedFollow);
        assert_eq!(d.rig.state().target_point, obj);
    }

    #[test]
    fn steeper_view_pans_further() {
        let scene = empty_scene();
        let shift = |position: Vec3| {
            let setup = CameraSetup { position, ..CameraSetup::default() };
            let mut r = CameraRigController::new(&RigConfig::default(), Viewport::new(1280.0, 720.0), Some(setup));
            let g = gestures(Some(hand(1.0, -0.1)), None);
            let mut d = Drive { rig: &mut r, scene: &scene };
            let mut x = 640.0;
            for _ in 0..30 {
                x += 10.0;
                d.tick(&g, Some(Vec2::new(x, 360.0)), None, None);
            }
            assert_eq!(d.rig.mode(), CameraMode::ManualPan);
            let t = d.rig.state().target_point;
            assert_relative_eq!(t.y, 0.0, epsilon = 1e-3);
            t.x.abs()
        };
        // about 6 degrees of pitch (slowest drag) against about 35 (near fastest)
        let shallow = shift(Vec3::new(0.0, 2.0, 20.0));
        let steep = shift(Vec3::new(0.0, 14.0, 20.0));
        assert!(shallow > 0.0);
        assert!(steep > shallow * 1.3, "steep {steep} vs shallow {shallow}");
    }

    #[test]
    fn focused_rotate_orbits_object_at_reduced_sensitivity() {
        let cfg = RigConfig::default();
        let mut r = rig();
        let scene = empty_scene();
        let obj = Vec3::new(5.0, 0.0, 0.0);
        r.fly_to(Pose::looking_at(obj + Vec3::new(0.0, 1.0, 4.0), obj), 0.05, FlyEnd::Follow, Some(obj));
        let none = GestureState::empty();
        let fist = gestures(None, Some(hand(1.0, 0.1)));
        let mut d = Drive { rig: &mut r, scene: &scene };
        for _ in 0..5 {
            d.tick(&none, None, None, Some(obj));
        }
        assert_eq!(d.rig.mode(), CameraMode::FocusedFollow);
        let yaw0 = d.rig.orbit().yaw_deg;
        let dist0 = d.rig.state().distance;

        d.tick(&fist, None, Some(Vec2::new(600.0, 360.0)), Some(obj));
        d.tick(&fist, None, Some(Vec2::new(650.0, 360.0)), Some(obj));
        assert_eq!(d.rig.mode(), CameraMode::FocusedFollow);
        assert_relative_eq!(d.rig.orbit().yaw_deg, yaw0 - 50.0 * cfg.camera.focused_rotate_sensitivity, epsilon = 1e-3);
        assert_relative_eq!(d.rig.state().distance, dist0, epsilon = 1e-3);
        let aim = d.rig.pose().forward().dot((obj - d.rig.pose().position).normalize());
        assert_relative_eq!(aim, 1.0, epsilon = 1e-4);

        // a hard vertical drag still respects the pitch clamp
        let mut y = 360.0;
        for _ in 0..120 {
            y -= 40.0;
            d.tick(&fist, None, Some(Vec2::new(650.0, y)), Some(obj));
            let pitch = d.rig.pose().pitch_deg().abs();
            assert!(pitch <= cfg.camera.pitch_limit_deg + cfg.camera.pitch_correction_deg + 1e-3);
        }
        assert_eq!(d.rig.state().target_point, obj);
    }

    #[test]
    fn rig_without_camera_is_inert() {
        let mut r = CameraRigController::new(&RigConfig::default(), Viewport::new(640.0, 480.0), None);
        let scene = empty_scene();
        assert!(!r.is_enabled());
        let before = *r.pose();
        r.fly_home();
        let g = gestures(None, Some(hand(1.0, 0.0)));
        let mut d = Drive { rig: &mut r, scene: &scene };
        d.tick(&g, None, Some(Vec2::new(10.0, 10.0)), None);
        d.tick(&g, None, Some(Vec2::new(300.0, 10.0)), None);
        assert_eq!(*d.rig.pose(), before);
        assert_eq!(d.rig.mode(), CameraMode::IdleAutoRotate);
    }

    #[test]
    fn reset_fov_eases_back() {
        let mut r = rig();
        let scene = empty_scene();
        r.state.field_of_view = 10.0;
        r.state.damped_fov = 10.0;
        r.reset_fov(40.0);
        let none = GestureState::empty();
        let mut d = Drive { rig: &mut r, scene: &scene };
        d.tick(&none, None, None, None);
        let first = d.rig.fov();
        assert!(first > 10.0 && first < 40.0);
        for _ in 0..300 {
            d.tick(&none, None, None, None);
        }
        assert_relative_eq!(d.rig.fov(), 40.0, epsilon = 1e-2);
    }
}

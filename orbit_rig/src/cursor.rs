//! Palm-driven screen cursor.
//!
//! The cursor follows hand *motion*, not hand position: each tick the palm's
//! screen delta from a lagging reference point is amplified and the cursor
//! eases toward `cursor + delta · amplification`.  The first sighting of a
//! hand only seeds the reference, so the cursor never jumps when a hand
//! enters the frame.  Losing the hand parks the cursor at screen centre.

use glam::Vec2;
use hand_signal::HandSample;
use tracing::trace;

use crate::config::{CursorConfig, PalmConfig};
use crate::pose::{project, viewport_ray, Pose, Viewport};
use crate::scene::{CursorHit, LayerMask, SceneQuery};

// ════════════════════════════════════════════════════════════════════════════
// PalmProjection
// ════════════════════════════════════════════════════════════════════════════

/// Pinhole eye over the tracker's interaction volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PalmProjection {
    eye: Pose,
    fov_deg: f32,
    viewport: Viewport,
}

impl PalmProjection {
    pub fn new(config: &PalmConfig, viewport: Viewport) -> Self {
        PalmProjection {
            eye: Pose::looking_at(config.eye, config.eye - glam::Vec3::Z),
            fov_deg: config.fov_deg,
            viewport,
        }
    }

    /// Screen position of a hand's palm, `None` if the hand is absent.
    pub fn project(&self, hand: &HandSample) -> Option<Vec2> {
        if !hand.present {
            return None;
        }
        project(&self.eye, self.fov_deg, self.viewport, hand.palm_position)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// CursorController
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct CursorController {
    config: CursorConfig,
    viewport: Viewport,
    position: Vec2,
    /// Lagging palm reference; `None` until a hand is seen.
    reference: Option<Vec2>,
    suspended: bool,
}

impl CursorController {
    pub fn new(config: CursorConfig, viewport: Viewport) -> Self {
        CursorController {
            config,
            viewport,
            position: viewport.center(),
            reference: None,
            suspended: false,
        }
    }

    pub fn config(&self) -> &CursorConfig {
        &self.config
    }

    /// Advance one tick with the driving palm's screen position.
    pub fn update(&mut self, palm_screen: Option<Vec2>, dt: f32) {
        if self.suspended {
            return;
        }
        let Some(screen) = palm_screen else {
            if self.reference.take().is_some() {
                trace!("driving hand lost; cursor parked at centre");
            }
            self.position = self.viewport.center();
            return;
        };
        let Some(reference) = self.reference else {
            self.reference = Some(screen);
            return;
        };

        let delta = screen - reference;
        let follow = (dt * self.config.follow_rate).clamp(0.0, 1.0);
        self.reference = Some(reference.lerp(screen, follow));

        let goal = self.position + delta * self.config.amplification;
        let ease = (dt * self.config.cursor_rate).clamp(0.0, 1.0);
        self.position = self.viewport.clamp(self.position.lerp(goal, ease));
    }

    /// Current cursor position in pixels.
    pub fn screen_position(&self) -> Vec2 {
        self.position
    }

    /// Recentre and freeze while the hands are busy steering the camera.
    pub fn suspend(&mut self) {
        if !self.suspended {
            trace!("cursor suspended");
        }
        self.suspended = true;
        self.reference = None;
        self.position = self.viewport.center();
    }

    pub fn resume(&mut self) {
        if self.suspended {
            trace!("cursor resumed");
        }
        self.suspended = false;
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// UI buttons first, then a ray from `camera` through the cursor.
    pub fn hit_test<Q: SceneQuery + ?Sized>(
        &self,
        scene: &Q,
        camera: &Pose,
        fov_deg: f32,
        layers: LayerMask,
    ) -> Option<CursorHit> {
        if let Some(button) = scene.ui_hit(self.position) {
            return Some(CursorHit::Button(button));
        }
        let ray = viewport_ray(camera, fov_deg, self.viewport, self.position);
        scene.raycast(&ray, layers).map(CursorHit::World)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SpinConfig;
    use crate::scene::{HitTarget, ObjectSpec, Scene, UiButton, UiRect};
    use approx::assert_relative_eq;
    use glam::Vec3;

    const DT: f32 = 1.0 / 60.0;

    fn cursor() -> CursorController {
        CursorController::new(CursorConfig::default(), Viewport::new(1280.0, 720.0))
    }

    #[test]
    fn first_sighting_does_not_jump() {
        let mut c = cursor();
        c.update(Some(Vec2::new(100.0, 100.0)), DT);
        assert_eq!(c.screen_position(), Vec2::new(640.0, 360.0));
    }

    #[test]
    fn motion_is_amplified_and_smoothed() {
        let mut c = cursor();
        c.update(Some(Vec2::new(600.0, 360.0)), DT);
        c.update(Some(Vec2::new(620.0, 360.0)), DT);
        let p = c.screen_position();
        // eased toward centre + 20·2.6, not snapped
        assert!(p.x > 640.0);
        assert!(p.x < 640.0 + 52.0);
        assert_relative_eq!(p.y, 360.0);
    }

    #[test]
    fn clamped_to_screen() {
        let mut c = cursor();
        c.update(Some(Vec2::ZERO), DT);
        for _ in 0..200 {
            c.update(Some(Vec2::new(5000.0, -5000.0)), DT);
        }
        let p = c.screen_position();
        assert!(p.x <= 1280.0 && p.y >= 0.0);
    }

    #[test]
    fn absent_hand_recentres() {
        let mut c = cursor();
        c.update(Some(Vec2::new(600.0, 300.0)), DT);
        for _ in 0..20 {
            c.update(Some(Vec2::new(800.0, 300.0)), DT);
        }
        assert!(c.screen_position().x > 640.0);
        c.update(None, DT);
        assert_eq!(c.screen_position(), Vec2::new(640.0, 360.0));
        // and re-seeds without a jump
        c.update(Some(Vec2::new(10.0, 10.0)), DT);
        assert_eq!(c.screen_position(), Vec2::new(640.0, 360.0));
    }

    #[test]
    fn suspended_cursor_ignores_hand() {
        let mut c = cursor();
        c.suspend();
        c.update(Some(Vec2::new(0.0, 0.0)), DT);
        c.update(Some(Vec2::new(900.0, 0.0)), DT);
        assert_eq!(c.screen_position(), Vec2::new(640.0, 360.0));
        c.resume();
        assert!(!c.is_suspended());
    }

    #[test]
    fn palm_in_front_of_eye_projects_to_centre() {
        let proj = PalmProjection::new(&PalmConfig::default(), Viewport::new(1280.0, 720.0));
        let hand = HandSample::tracked(Vec3::new(0.0, 0.2, 0.0), 0.0, 0.0);
        let p = proj.project(&hand).unwrap();
        assert_relative_eq!(p.x, 640.0, epsilon = 1e-2);
        assert_relative_eq!(p.y, 360.0, epsilon = 1e-2);
        assert!(proj.project(&HandSample::absent()).is_none());
    }

    #[test]
    fn hit_test_prefers_ui_then_world() {
        let vp = Viewport::new(1280.0, 720.0);
        let mut scene = Scene::new(SpinConfig::default(), 1.25);
        scene.add(ObjectSpec::new("Sun", 2.0));
        let camera = Pose::looking_at(Vec3::new(0.0, 0.0, 20.0), Vec3::ZERO);
        let c = CursorController::new(CursorConfig::default(), vp);

        match c.hit_test(&scene, &camera, 40.0, LayerMask::SELECTABLE) {
            Some(CursorHit::World(hit)) => assert_eq!(hit.target, HitTarget::Object(0)),
            other => panic!("expected world hit, got {other:?}"),
        }

        let scene = scene.with_back_button(UiRect { min: Vec2::new(600.0, 300.0), max: Vec2::new(700.0, 400.0) });
        assert_eq!(
            c.hit_test(&scene, &camera, 40.0, LayerMask::SELECTABLE),
            Some(CursorHit::Button(UiButton::Back))
        );
    }
}

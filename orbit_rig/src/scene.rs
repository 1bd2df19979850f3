//! The selectable bodies, the anchor surface and the UI hit areas.
//!
//! [`Scene`] is the only owner of the per-object `focused` flag; the single
//! writer is [`Scene::set_focus`], which clears every other flag before
//! setting one, so at most one object is ever focused.

use glam::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::config::SpinConfig;
use crate::error::{Result, RigError};
use crate::pose::Ray;
use crate::spin::{RecenterWatchdog, RigidSpin, SelfRotation};

/// Index of an object in its [`Scene`].
pub type ObjectId = usize;

// ════════════════════════════════════════════════════════════════════════════
// Layers and hits
// ════════════════════════════════════════════════════════════════════════════

/// Bit set of ray-cast layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerMask(pub u32);

impl LayerMask {
    /// Planets and other focusable objects.
    pub const SELECTABLE: LayerMask = LayerMask(1 << 0);
    /// Surfaces the pan pivot may stick to.
    pub const ANCHOR: LayerMask = LayerMask(1 << 1);
    pub const ALL: LayerMask = LayerMask(u32::MAX);

    pub fn contains(self, other: LayerMask) -> bool {
        self.0 & other.0 != 0
    }
}

/// Screen-space buttons the cursor can activate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiButton {
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Object(ObjectId),
    Anchor,
}

/// A world ray hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub target: HitTarget,
    pub point: Vec3,
    pub distance: f32,
}

/// What lies under the cursor: a UI button wins over the world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CursorHit {
    Button(UiButton),
    World(Hit),
}

/// Axis-aligned screen rectangle (pixels, bottom-left origin).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UiRect {
    pub min: Vec2,
    pub max: Vec2,
}

impl UiRect {
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

/// Hit-testing seam used by the cursor and the camera rig.
pub trait SceneQuery {
    /// Closest hit along `ray` on any of `layers`.
    fn raycast(&self, ray: &Ray, layers: LayerMask) -> Option<Hit>;

    /// UI button under `pixel`, if any.
    fn ui_hit(&self, pixel: Vec2) -> Option<UiButton>;
}

// ════════════════════════════════════════════════════════════════════════════
// SelectableObject
// ════════════════════════════════════════════════════════════════════════════

/// Facts shown in the info panel.  Free text, as the catalogue has it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanetInfo {
    pub age: String,
    pub diameter: String,
    pub mass: String,
    pub day: String,
    pub year: String,
    pub distance_to_sun: String,
    pub temperature: String,
    pub atmosphere: String,
    pub description: String,
}

/// Circular orbit in the horizontal plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orbit {
    pub center: Vec3,
    pub radius: f32,
    pub speed_deg_per_sec: f32,
    pub phase_deg: f32,
}

impl Orbit {
    pub fn position(&self) -> Vec3 {
        let (s, c) = self.phase_deg.to_radians().sin_cos();
        self.center + Vec3::new(c * self.radius, 0.0, -s * self.radius)
    }

    pub fn advance(&mut self, dt: f32) {
        self.phase_deg = (self.phase_deg + self.speed_deg_per_sec * dt).rem_euclid(360.0);
    }
}

/// Orientation of the body that the user can torque.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub orientation: Quat,
    /// `Some` for objects with rigid-body dynamics.
    pub rigid: Option<RigidSpin>,
}

#[derive(Debug, Clone)]
pub struct SelectableObject {
    id: ObjectId,
    pub name: String,
    pub position: Vec3,
    /// Sphere collider radius.
    pub radius: f32,
    pub body: Body,
    pub spin: SelfRotation,
    pub watchdog: RecenterWatchdog,
    pub info: PlanetInfo,
    /// Framing factor used when flying to this object.
    pub framing: f32,
    pub orbit: Option<Orbit>,
    focused: bool,
}

impl SelectableObject {
    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn has_rigid_body(&self) -> bool {
        self.body.rigid.is_some()
    }

    /// Orientation of the visible globe: body orientation then spin.
    pub fn display_rotation(&self) -> Quat {
        self.body.orientation * self.spin.rotation()
    }

    fn ray_hit(&self, ray: &Ray) -> Option<f32> {
        let oc = ray.origin - self.position;
        let b = oc.dot(ray.direction);
        let c = oc.length_squared() - self.radius * self.radius;
        let disc = b * b - c;
        if disc < 0.0 {
            return None;
        }
        let sq = disc.sqrt();
        let t = if -b - sq >= 0.0 { -b - sq } else { -b + sq };
        (t >= 0.0).then_some(t)
    }
}

/// Construction parameters for a [`SelectableObject`].
#[derive(Debug, Clone)]
pub struct ObjectSpec {
    pub name: String,
    pub radius: f32,
    pub position: Vec3,
    pub orbit: Option<Orbit>,
    pub spin_speed: f32,
    pub clockwise: bool,
    pub rigid_body: bool,
    pub framing: Option<f32>,
    pub info: PlanetInfo,
}

impl ObjectSpec {
    pub fn new(name: impl Into<String>, radius: f32) -> Self {
        ObjectSpec {
            name: name.into(),
            radius,
            position: Vec3::ZERO,
            orbit: None,
            spin_speed: 0.0,
            clockwise: false,
            rigid_body: false,
            framing: None,
            info: PlanetInfo::default(),
        }
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn orbiting(mut self, orbit: Orbit) -> Self {
        self.position = orbit.position();
        self.orbit = Some(orbit);
        self
    }

    pub fn spinning(mut self, speed: f32, clockwise: bool) -> Self {
        self.spin_speed = speed;
        self.clockwise = clockwise;
        self
    }

    pub fn rigid(mut self) -> Self {
        self.rigid_body = true;
        self
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Scene
// ════════════════════════════════════════════════════════════════════════════

pub struct Scene {
    objects: Vec<SelectableObject>,
    /// Height of the anchor plane, if the scene has one.
    ground_y: Option<f32>,
    back_button: Option<UiRect>,
    spin_config: SpinConfig,
    default_framing: f32,
}

impl Scene {
    pub fn new(spin_config: SpinConfig, default_framing: f32) -> Self {
        Scene {
            objects: Vec::new(),
            ground_y: None,
            back_button: None,
            spin_config,
            default_framing,
        }
    }

    pub fn with_ground(mut self, y: f32) -> Self {
        self.ground_y = Some(y);
        self
    }

    pub fn with_back_button(mut self, rect: UiRect) -> Self {
        self.back_button = Some(rect);
        self
    }

    pub fn back_button(&self) -> Option<UiRect> {
        self.back_button
    }

    pub fn add(&mut self, spec: ObjectSpec) -> ObjectId {
        let id = self.objects.len();
        let object = SelectableObject {
            id,
            name: spec.name,
            position: spec.position,
            radius: spec.radius,
            body: Body {
                orientation: Quat::IDENTITY,
                rigid: spec.rigid_body.then(|| RigidSpin::new(&self.spin_config)),
            },
            spin: SelfRotation::new(spec.spin_speed, spec.clockwise),
            watchdog: RecenterWatchdog::new(&self.spin_config),
            info: spec.info,
            framing: spec.framing.unwrap_or(self.default_framing),
            orbit: spec.orbit,
            focused: false,
        };
        self.objects.push(object);
        id
    }

    pub fn objects(&self) -> &[SelectableObject] {
        &self.objects
    }

    pub fn object(&self, id: ObjectId) -> Option<&SelectableObject> {
        self.objects.get(id)
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut SelectableObject> {
        self.objects.get_mut(id)
    }

    pub fn find(&self, name: &str) -> Option<ObjectId> {
        self.objects.iter().position(|o| o.name.eq_ignore_ascii_case(name))
    }

    pub fn focused(&self) -> Option<ObjectId> {
        self.objects.iter().position(|o| o.focused)
    }

    /// Make `id` the only focused object, or clear focus with `None`.
    pub fn set_focus(&mut self, id: Option<ObjectId>) -> Result<()> {
        if let Some(id) = id {
            if id >= self.objects.len() {
                return Err(RigError::UnknownObject(id));
            }
        }
        for o in &mut self.objects {
            o.focused = Some(o.id) == id;
        }
        Ok(())
    }

    /// Frame tick: orbital motion and self-rotation.
    pub fn advance(&mut self, dt: f32) {
        for o in &mut self.objects {
            if let Some(orbit) = o.orbit.as_mut() {
                orbit.advance(dt);
                o.position = orbit.position();
            }
            o.spin.tick(dt);
        }
    }

    /// Physics tick: integrate queued torque, then let the watchdog settle
    /// the body.
    pub fn physics_step(&mut self, dt: f32) {
        for o in &mut self.objects {
            if let Some(rigid) = o.body.rigid.as_mut() {
                rigid.integrate(&mut o.body.orientation, dt);
            }
            o.watchdog.tick(&mut o.body.orientation, dt);
        }
    }
}

impl SceneQuery for Scene {
    fn raycast(&self, ray: &Ray, layers: LayerMask) -> Option<Hit> {
        let mut best: Option<Hit> = None;
        let mut consider = |hit: Hit| {
            if best.map_or(true, |b| hit.distance < b.distance) {
                best = Some(hit);
            }
        };

        if layers.contains(LayerMask::SELECTABLE) {
            for o in &self.objects {
                if let Some(t) = o.ray_hit(ray) {
                    consider(Hit { target: HitTarget::Object(o.id), point: ray.at(t), distance: t });
                }
            }
        }
        if layers.contains(LayerMask::ANCHOR) {
            if let Some(y) = self.ground_y {
                if ray.direction.y.abs() > 1e-6 {
                    let t = (y - ray.origin.y) / ray.direction.y;
                    if t >= 0.0 {
                        consider(Hit { target: HitTarget::Anchor, point: ray.at(t), distance: t });
                    }
                }
            }
        }
        best
    }

    fn ui_hit(&self, pixel: Vec2) -> Option<UiButton> {
        self.back_button
            .filter(|r| r.contains(pixel))
            .map(|_| UiButton::Back)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn scene() -> Scene {
        let mut s = Scene::new(SpinConfig::default(), 1.25).with_ground(0.0);
        s.add(ObjectSpec::new("Sun", 2.0));
        s.add(ObjectSpec::new("Earth", 0.5).at(Vec3::new(10.0, 0.0, 0.0)).rigid());
        s
    }

    #[test]
    fn set_focus_is_exclusive() {
        let mut s = scene();
        s.set_focus(Some(0)).unwrap();
        s.set_focus(Some(1)).unwrap();
        let focused: Vec<_> = s.objects().iter().filter(|o| o.is_focused()).map(|o| o.id()).collect();
        assert_eq!(focused, vec![1]);
        s.set_focus(None).unwrap();
        assert_eq!(s.focused(), None);
    }

    #[test]
    fn set_focus_rejects_unknown_id() {
        let mut s = scene();
        assert!(matches!(s.set_focus(Some(9)), Err(RigError::UnknownObject(9))));
    }

    #[test]
    fn raycast_picks_nearest_sphere() {
        let s = scene();
        let ray = Ray { origin: Vec3::new(10.0, 0.0, 10.0), direction: Vec3::NEG_Z };
        let hit = s.raycast(&ray, LayerMask::SELECTABLE).unwrap();
        assert_eq!(hit.target, HitTarget::Object(1));
        assert_relative_eq!(hit.distance, 9.5, epsilon = 1e-4);
    }

    #[test]
    fn raycast_respects_layers() {
        let s = scene();
        let ray = Ray { origin: Vec3::new(0.0, 10.0, 0.0), direction: Vec3::NEG_Y };
        let hit = s.raycast(&ray, LayerMask::ANCHOR).unwrap();
        assert_eq!(hit.target, HitTarget::Anchor);
        assert_relative_eq!(hit.point.y, 0.0);
        let any = s.raycast(&ray, LayerMask::ALL).unwrap();
        assert_eq!(any.target, HitTarget::Object(0));
    }

    #[test]
    fn orbit_moves_bodies() {
        let mut s = Scene::new(SpinConfig::default(), 1.25);
        let id = s.add(ObjectSpec::new("Mars", 0.4).orbiting(Orbit {
            center: Vec3::ZERO,
            radius: 5.0,
            speed_deg_per_sec: 90.0,
            phase_deg: 0.0,
        }));
        s.advance(1.0);
        let p = s.object(id).unwrap().position;
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-4);
        assert_relative_eq!(p.z, -5.0, epsilon = 1e-4);
    }

    #[test]
    fn back_button_hit() {
        let s = scene().with_back_button(UiRect { min: Vec2::new(10.0, 10.0), max: Vec2::new(90.0, 50.0) });
        assert_eq!(s.ui_hit(Vec2::new(20.0, 20.0)), Some(UiButton::Back));
        assert_eq!(s.ui_hit(Vec2::new(200.0, 20.0)), None);
    }

    #[test]
    fn framing_defaults_from_scene() {
        let s = scene();
        assert_eq!(s.object(0).unwrap().framing, 1.25);
    }
}

//! Camera poses, orbit coordinates and pinhole projection.
//!
//! Conventions: right-handed, +Y up, a camera looks along its local -Z.
//! Screen pixels have their origin at the bottom-left corner.

use glam::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::math::look_rotation;

// ════════════════════════════════════════════════════════════════════════════
// Pose
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Pose {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Pose {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Pose { position, rotation }
    }

    /// A pose at `position` aimed at `target`.
    pub fn looking_at(position: Vec3, target: Vec3) -> Self {
        Pose {
            position,
            rotation: look_rotation(target - position, Vec3::Y),
        }
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Linear position blend, spherical rotation blend.
    pub fn interpolate(&self, to: &Pose, t: f32) -> Pose {
        let t = t.clamp(0.0, 1.0);
        Pose {
            position: self.position.lerp(to.position, t),
            rotation: self.rotation.slerp(to.rotation, t).normalize(),
        }
    }

    /// Pitch of the view direction in degrees; negative looks down.
    pub fn pitch_deg(&self) -> f32 {
        self.forward().y.clamp(-1.0, 1.0).asin().to_degrees()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// OrbitCoords
// ════════════════════════════════════════════════════════════════════════════

/// Camera placement around a pivot.
///
/// `elevation_deg` is how far above the pivot's horizon the camera sits, so
/// the camera's pitch is its negation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCoords {
    pub yaw_deg: f32,
    pub elevation_deg: f32,
    pub distance: f32,
}

impl OrbitCoords {
    /// Coordinates of `offset` = camera position − pivot.
    pub fn from_offset(offset: Vec3) -> Self {
        let distance = offset.length();
        if distance < f32::EPSILON {
            return OrbitCoords { yaw_deg: 0.0, elevation_deg: 0.0, distance: 0.0 };
        }
        OrbitCoords {
            yaw_deg: offset.x.atan2(offset.z).to_degrees(),
            elevation_deg: (offset.y / distance).clamp(-1.0, 1.0).asin().to_degrees(),
            distance,
        }
    }

    pub fn offset(&self) -> Vec3 {
        let (sy, cy) = self.yaw_deg.to_radians().sin_cos();
        let (se, ce) = self.elevation_deg.to_radians().sin_cos();
        Vec3::new(ce * sy, se, ce * cy) * self.distance
    }

    pub fn pitch_deg(&self) -> f32 {
        -self.elevation_deg
    }

    /// Camera pose on this orbit, aimed at `pivot`.
    pub fn pose_about(&self, pivot: Vec3) -> Pose {
        Pose::looking_at(pivot + self.offset(), pivot)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Viewport + projection
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Viewport { width, height }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }

    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 { self.width / self.height } else { 1.0 }
    }

    pub fn clamp(&self, p: Vec2) -> Vec2 {
        p.clamp(Vec2::ZERO, Vec2::new(self.width, self.height))
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= 0.0 && p.y >= 0.0 && p.x <= self.width && p.y <= self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length.
    pub direction: Vec3,
}

impl Ray {
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Pixel position of `world` as seen from `pose`, or `None` behind the eye.
pub fn project(pose: &Pose, fov_deg: f32, viewport: Viewport, world: Vec3) -> Option<Vec2> {
    let local = pose.rotation.inverse() * (world - pose.position);
    let depth = -local.z;
    if depth <= 1e-5 {
        return None;
    }
    let tan_half = (fov_deg.to_radians() * 0.5).tan();
    let ndc_x = local.x / (depth * tan_half * viewport.aspect());
    let ndc_y = local.y / (depth * tan_half);
    Some(Vec2::new(
        (ndc_x + 1.0) * 0.5 * viewport.width,
        (ndc_y + 1.0) * 0.5 * viewport.height,
    ))
}

/// World-space ray from the eye through `pixel`.
pub fn viewport_ray(pose: &Pose, fov_deg: f32, viewport: Viewport, pixel: Vec2) -> Ray {
    let tan_half = (fov_deg.to_radians() * 0.5).tan();
    let ndc_x = pixel.x / viewport.width.max(1.0) * 2.0 - 1.0;
    let ndc_y = pixel.y / viewport.height.max(1.0) * 2.0 - 1.0;
    let local = Vec3::new(ndc_x * tan_half * viewport.aspect(), ndc_y * tan_half, -1.0);
    Ray {
        origin: pose.position,
        direction: (pose.rotation * local).normalize(),
    }
}

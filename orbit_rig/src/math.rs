//! Scalar and rotation helpers shared by the controllers.

use glam::{Mat3, Quat, Vec3};

/// Linear remap of `v` from `[in_min, in_max]` to `[out_min, out_max]`,
/// clamped to the output range.
pub fn clamped_remap(v: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    if (in_max - in_min).abs() < f32::EPSILON {
        return out_min;
    }
    let t = ((v - in_min) / (in_max - in_min)).clamp(0.0, 1.0);
    out_min + (out_max - out_min) * t
}

/// Critically damped approach of `current` toward `target`.
///
/// `velocity` carries state between calls.  Never overshoots the target.
pub fn smooth_damp(current: f32, target: f32, velocity: &mut f32, smooth_time: f32, dt: f32) -> f32 {
    if dt <= 0.0 {
        return current;
    }
    let smooth_time = smooth_time.max(1e-4);
    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    let decay = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

    let change = current - target;
    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * decay;
    let mut out = target + (change + temp) * decay;

    // Do not overshoot.
    if (target - current > 0.0) == (out > target) {
        out = target;
        *velocity = 0.0;
    }
    out
}

/// Component-wise [`smooth_damp`].
pub fn smooth_damp_vec3(current: Vec3, target: Vec3, velocity: &mut Vec3, smooth_time: f32, dt: f32) -> Vec3 {
    Vec3::new(
        smooth_damp(current.x, target.x, &mut velocity.x, smooth_time, dt),
        smooth_damp(current.y, target.y, &mut velocity.y, smooth_time, dt),
        smooth_damp(current.z, target.z, &mut velocity.z, smooth_time, dt),
    )
}

/// Rotation whose -Z axis points along `forward`, keeping +Y as close to
/// `up` as possible.
pub fn look_rotation(forward: Vec3, up: Vec3) -> Quat {
    let Some(f) = forward.try_normalize() else {
        return Quat::IDENTITY;
    };
    let right = match f.cross(up).try_normalize() {
        Some(r) => r,
        // Looking straight along `up`: any horizontal right vector will do.
        None => f.cross(Vec3::Z).try_normalize().unwrap_or(Vec3::X),
    };
    let true_up = right.cross(f);
    Quat::from_mat3(&Mat3::from_cols(right, true_up, -f)).normalize()
}

/// Angle in degrees between two orientations.
pub fn angle_between_deg(a: Quat, b: Quat) -> f32 {
    a.angle_between(b).to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn remap_clamps_both_ends() {
        assert_eq!(clamped_remap(0.0, 0.05, 0.5, 5.0, 60.0), 5.0);
        assert_eq!(clamped_remap(2.0, 0.05, 0.5, 5.0, 60.0), 60.0);
        assert_relative_eq!(clamped_remap(0.275, 0.05, 0.5, 5.0, 60.0), 32.5, epsilon = 1e-4);
    }

    #[test]
    fn remap_can_run_downhill() {
        assert_relative_eq!(clamped_remap(33.0, 29.0, 37.0, 1.0, 0.5), 0.75, epsilon = 1e-6);
    }

    #[test]
    fn smooth_damp_converges_without_overshoot() {
        let mut v = 0.0;
        let mut x = 0.0;
        for _ in 0..600 {
            let next = smooth_damp(x, 10.0, &mut v, 0.12, 1.0 / 60.0);
            assert!(next >= x - 1e-6);
            assert!(next <= 10.0);
            x = next;
        }
        assert_relative_eq!(x, 10.0, epsilon = 1e-3);
    }

    #[test]
    fn smooth_damp_zero_dt_is_noop() {
        let mut v = 3.0;
        assert_eq!(smooth_damp(1.0, 5.0, &mut v, 0.1, 0.0), 1.0);
    }

    #[test]
    fn look_rotation_points_minus_z_at_forward() {
        let fwd = Vec3::new(1.0, -1.0, 0.0).normalize();
        let q = look_rotation(fwd, Vec3::Y);
        let got = q * Vec3::NEG_Z;
        assert_relative_eq!(got.x, fwd.x, epsilon = 1e-5);
        assert_relative_eq!(got.y, fwd.y, epsilon = 1e-5);
        assert_relative_eq!(got.z, fwd.z, epsilon = 1e-5);
        // right stays horizontal
        assert_relative_eq!((q * Vec3::X).y, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn look_rotation_straight_down_is_finite() {
        let q = look_rotation(Vec3::NEG_Y, Vec3::Y);
        assert!(q.is_finite());
        let got = q * Vec3::NEG_Z;
        assert_relative_eq!(got.y, -1.0, epsilon = 1e-5);
    }

    #[test]
    fn angle_between_identity() {
        let q = Quat::from_rotation_y(30f32.to_radians());
        assert_relative_eq!(angle_between_deg(q, Quat::IDENTITY), 30.0, epsilon = 1e-3);
    }
}

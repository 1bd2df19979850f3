//! Tunable constants for every component.
//!
//! The gesture thresholds and timing constants were hand-tuned on the
//! exhibit floor and differ between tracking back-ends, so none of them are
//! baked in.  Each group deserialises with `#[serde(default)]`: a config
//! file only has to name what it changes.

use glam::Vec3;
use hand_signal::HandSide;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RigError};

// ════════════════════════════════════════════════════════════════════════════
// RigConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RigConfig {
    pub thresholds: ThresholdConfig,
    pub cursor: CursorConfig,
    pub palm: PalmConfig,
    pub selection: SelectionConfig,
    pub camera: CameraConfig,
    pub zoom: ZoomConfig,
    pub focus: FocusConfig,
    pub spin: SpinConfig,
}

impl RigConfig {
    /// Reject values the controllers cannot work with.
    pub fn validate(&self) -> Result<()> {
        let t = &self.thresholds;
        unit("thresholds.grab", t.grab)?;
        unit("thresholds.pinch", t.pinch)?;
        unit("thresholds.select_max_grab", t.select_max_grab)?;
        unit("thresholds.focus_rotate_grab", t.focus_rotate_grab)?;

        positive("cursor.follow_rate", self.cursor.follow_rate)?;
        positive("cursor.cursor_rate", self.cursor.cursor_rate)?;
        positive("cursor.amplification", self.cursor.amplification)?;
        angle("palm.fov_deg", self.palm.fov_deg)?;

        let s = &self.selection;
        positive("selection.hold_duration", s.hold_duration)?;
        positive("selection.focused_hold_duration", s.focused_hold_duration)?;
        positive("selection.decay_duration", s.decay_duration)?;
        non_negative("selection.cooldown", s.cooldown)?;

        let c = &self.camera;
        if !(0.0..90.0).contains(&c.pitch_limit_deg) || c.pitch_limit_deg == 0.0 {
            return Err(RigError::invalid("camera.pitch_limit_deg", "must be in (0, 90)"));
        }
        if c.slowdown_band_deg < 0.0 || c.slowdown_band_deg >= c.pitch_limit_deg {
            return Err(RigError::invalid(
                "camera.slowdown_band_deg",
                "must be non-negative and below camera.pitch_limit_deg",
            ));
        }
        unit("camera.slowdown_min", c.slowdown_min)?;
        non_negative("camera.pitch_correction_deg", c.pitch_correction_deg)?;
        non_negative("camera.idle_timeout", c.idle_timeout)?;
        if c.pan_pitch_min >= c.pan_pitch_max {
            return Err(RigError::invalid("camera.pan_pitch_min", "must be below camera.pan_pitch_max"));
        }
        positive("camera.pan_speed_smooth_time", c.pan_speed_smooth_time)?;
        positive("camera.anchor_smooth_time", c.anchor_smooth_time)?;
        positive("camera.home_duration", c.home_duration)?;

        let z = &self.zoom;
        if z.min_fov <= 0.0 || z.min_fov >= z.max_fov || z.max_fov >= 180.0 {
            return Err(RigError::invalid("zoom.min_fov", "need 0 < min_fov < max_fov < 180"));
        }
        if !(z.min_fov..=z.max_fov).contains(&z.reset_fov) {
            return Err(RigError::invalid("zoom.reset_fov", "must lie within [min_fov, max_fov]"));
        }
        non_negative("zoom.direction_margin", z.direction_margin)?;
        if z.delta_min >= z.delta_max {
            return Err(RigError::invalid("zoom.delta_min", "must be below zoom.delta_max"));
        }
        positive("zoom.smooth_time", z.smooth_time)?;
        non_negative("zoom.release_grace", z.release_grace)?;

        let f = &self.focus;
        positive("focus.fly_in_duration", f.fly_in_duration)?;
        positive("focus.fly_out_duration", f.fly_out_duration)?;
        positive("focus.framing", f.framing)?;
        positive("focus.auto_unfocus_after", f.auto_unfocus_after)?;

        let sp = &self.spin;
        positive("spin.recenter_duration", sp.recenter_duration)?;
        non_negative("spin.recenter_cooldown", sp.recenter_cooldown)?;
        positive("spin.max_angular_velocity", sp.max_angular_velocity)?;
        non_negative("spin.angular_drag", sp.angular_drag)?;
        Ok(())
    }
}

fn unit(field: &'static str, v: f32) -> Result<()> {
    if (0.0..=1.0).contains(&v) {
        Ok(())
    } else {
        Err(RigError::invalid(field, format!("{v} is outside [0, 1]")))
    }
}

fn positive(field: &'static str, v: f32) -> Result<()> {
    if v > 0.0 && v.is_finite() {
        Ok(())
    } else {
        Err(RigError::invalid(field, format!("{v} must be positive")))
    }
}

fn non_negative(field: &'static str, v: f32) -> Result<()> {
    if v >= 0.0 && v.is_finite() {
        Ok(())
    } else {
        Err(RigError::invalid(field, format!("{v} must not be negative")))
    }
}

fn angle(field: &'static str, v: f32) -> Result<()> {
    if v > 0.0 && v < 180.0 {
        Ok(())
    } else {
        Err(RigError::invalid(field, format!("{v} is not a usable field of view")))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Groups
// ════════════════════════════════════════════════════════════════════════════

/// Strength thresholds.  All comparisons are strict (`>`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Grab strength that counts as a fist for rotate/pan/zoom.
    pub grab: f32,
    /// Pinch strength that drives dwell selection.
    pub pinch: f32,
    /// Selection also needs grab strength below this.
    pub select_max_grab: f32,
    /// Grab strength that starts rotating the focused object.
    pub focus_rotate_grab: f32,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        ThresholdConfig {
            grab: 0.9,
            pinch: 0.73,
            select_max_grab: 0.5,
            focus_rotate_grab: 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CursorConfig {
    /// Hand whose palm steers the cursor.
    pub driving_hand: HandSide,
    /// Rate (1/s) at which the reference palm position follows the hand.
    pub follow_rate: f32,
    /// Rate (1/s) at which the cursor approaches its amplified target.
    pub cursor_rate: f32,
    /// Hand-delta multiplier.
    pub amplification: f32,
}

impl Default for CursorConfig {
    fn default() -> Self {
        CursorConfig {
            driving_hand: HandSide::Right,
            follow_rate: 4.0,
            cursor_rate: 10.0,
            amplification: 2.6,
        }
    }
}

/// Virtual eye used to turn tracker-space palms into screen positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PalmConfig {
    /// Eye position in tracker space; it looks along -Z.
    pub eye: Vec3,
    pub fov_deg: f32,
}

impl Default for PalmConfig {
    fn default() -> Self {
        PalmConfig {
            eye: Vec3::new(0.0, 0.2, 0.6),
            fov_deg: 40.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Seconds of sustained pinch before a selection fires.
    pub hold_duration: f32,
    /// Hold time while an object is focused (the dwell means "back").
    pub focused_hold_duration: f32,
    /// Seconds for an interrupted fill to drain from 1 to 0.
    pub decay_duration: f32,
    /// Seconds after a selection during which no dwell may start.
    pub cooldown: f32,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        SelectionConfig {
            hold_duration: 0.5,
            focused_hold_duration: 0.25,
            decay_duration: 0.5,
            cooldown: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Degrees of orbit per pixel of hand travel.
    pub rotate_sensitivity: f32,
    /// Same, while an object is focused.
    pub focused_rotate_sensitivity: f32,
    /// Orbit pitch is kept within ±this.
    pub pitch_limit_deg: f32,
    /// Width of the band below the limit where vertical motion slows down.
    pub slowdown_band_deg: f32,
    /// Speed multiplier reached at the limit.
    pub slowdown_min: f32,
    /// Soft-clamp step per tick when pitch is outside the limit.
    pub pitch_correction_deg: f32,
    /// Seconds without manual input before auto-rotate starts.
    pub idle_timeout: f32,
    pub idle_rotate_deg_per_sec: f32,
    /// Pitch range (absolute degrees) over which pan speed is remapped.
    pub pan_pitch_min: f32,
    pub pan_pitch_max: f32,
    pub pan_speed_min: f32,
    pub pan_speed_max: f32,
    pub pan_speed_smooth_time: f32,
    /// World units per pixel per unit of drag speed.
    pub pan_scale: f32,
    /// Smoothing for re-anchoring the pivot to the surface under the view.
    pub anchor_smooth_time: f32,
    /// Duration of the fly back to the home pose.
    pub home_duration: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        CameraConfig {
            rotate_sensitivity: 0.18,
            focused_rotate_sensitivity: 0.12,
            pitch_limit_deg: 37.0,
            slowdown_band_deg: 8.0,
            slowdown_min: 0.5,
            pitch_correction_deg: 0.22,
            idle_timeout: 5.0,
            idle_rotate_deg_per_sec: 0.5,
            pan_pitch_min: 14.0,
            pan_pitch_max: 37.0,
            pan_speed_min: 40.0,
            pan_speed_max: 120.0,
            pan_speed_smooth_time: 0.3,
            pan_scale: 0.001,
            anchor_smooth_time: 0.05,
            home_duration: 1.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    pub min_fov: f32,
    pub max_fov: f32,
    /// Distance change from the baseline that locks a zoom direction.
    pub direction_margin: f32,
    /// Locked-direction delta remapped onto the zoom rate.
    pub delta_min: f32,
    pub delta_max: f32,
    /// Zoom rate in degrees of field of view per second.
    pub rate_min: f32,
    pub rate_max: f32,
    pub smooth_time: f32,
    /// Seconds after release before zoom mode may end.
    pub release_grace: f32,
    /// Per-tick distance change below which the hands count as still.
    pub stability_threshold: f32,
    /// Field of view restored when leaving focus.
    pub reset_fov: f32,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        ZoomConfig {
            min_fov: 6.0,
            max_fov: 78.0,
            direction_margin: 0.05,
            delta_min: 0.05,
            delta_max: 0.5,
            rate_min: 5.0,
            rate_max: 60.0,
            smooth_time: 0.12,
            release_grace: 0.5,
            stability_threshold: 0.02,
            reset_fov: 40.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FocusConfig {
    pub fly_in_duration: f32,
    pub fly_out_duration: f32,
    /// Default framing factor; bodies may override it.
    pub framing: f32,
    /// Extra distance in units of the object's size.
    pub framing_offset: f32,
    pub torque_multiplier: f32,
    /// Fraction of the computed torque that is applied.
    pub torque_blend: f32,
    /// Palm travel (metres) below which no torque is produced.
    pub movement_threshold: f32,
    /// Slerp rate (1/s) for objects without rigid-body dynamics.
    pub slerp_rate: f32,
    /// Seconds without any hand before focus is dropped.
    pub auto_unfocus_after: f32,
}

impl Default for FocusConfig {
    fn default() -> Self {
        FocusConfig {
            fly_in_duration: 1.5,
            fly_out_duration: 1.8,
            framing: 1.25,
            framing_offset: 0.5,
            torque_multiplier: 2800.0,
            torque_blend: 0.5,
            movement_threshold: 0.002,
            slerp_rate: 3.0,
            auto_unfocus_after: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpinConfig {
    /// Orientation error (degrees) that arms the recenter watchdog.
    pub recenter_threshold_deg: f32,
    pub recenter_cooldown: f32,
    pub recenter_duration: f32,
    /// Orientation changes below this (degrees) count as "unchanged".
    pub still_tolerance_deg: f32,
    /// rad/s
    pub max_angular_velocity: f32,
    pub angular_drag: f32,
    /// Angular speed (rad/s) below which a rigid body goes to sleep.
    pub sleep_threshold: f32,
}

impl Default for SpinConfig {
    fn default() -> Self {
        SpinConfig {
            recenter_threshold_deg: 0.5,
            recenter_cooldown: 5.0,
            recenter_duration: 4.0,
            still_tolerance_deg: 0.05,
            max_angular_velocity: 7.0,
            angular_drag: 1.0,
            sleep_threshold: 0.02,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(RigConfig::default().validate().is_ok());
    }

    #[test]
    fn inverted_fov_range_rejected() {
        let mut cfg = RigConfig::default();
        cfg.zoom.min_fov = 80.0;
        let err = cfg.validate().unwrap_err();
        assert!(format!("{err}").contains("zoom.min_fov"));
    }

    #[test]
    fn threshold_outside_unit_range_rejected() {
        let mut cfg = RigConfig::default();
        cfg.thresholds.pinch = 1.3;
        assert!(matches!(
            cfg.validate(),
            Err(RigError::InvalidConfig { field: "thresholds.pinch", .. })
        ));
    }

    #[test]
    fn slowdown_band_must_fit_under_limit() {
        let mut cfg = RigConfig::default();
        cfg.camera.slowdown_band_deg = 40.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let cfg: RigConfig = toml::from_str(
            r#"
            [thresholds]
            pinch = 0.85

            [cursor]
            driving_hand = "left"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.thresholds.pinch, 0.85);
        assert_eq!(cfg.thresholds.grab, 0.9);
        assert_eq!(cfg.cursor.driving_hand, HandSide::Left);
        assert_eq!(cfg.zoom, ZoomConfig::default());
    }
}

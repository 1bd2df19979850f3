//! Self-rotation, rigid-body spin and the recenter watchdog.
//!
//! Every body carries two rotations.  The self-rotation turns the visible
//! globe about its own vertical axis on the frame tick.  The body
//! orientation is what a user torques while the object is focused; it is
//! integrated on the physics tick and the [`RecenterWatchdog`] brings it
//! back to identity once nobody is touching it.

use glam::{Quat, Vec3};
use tracing::{debug, trace};

use crate::config::SpinConfig;
use crate::math::angle_between_deg;

// ════════════════════════════════════════════════════════════════════════════
// SelfRotation
// ════════════════════════════════════════════════════════════════════════════

/// Continuous spin about the local vertical axis.
#[derive(Debug, Clone, PartialEq)]
pub struct SelfRotation {
    /// Signed speed in degrees per second, restored on resume.
    stored_speed: f32,
    speed: f32,
    angle_deg: f32,
}

impl SelfRotation {
    /// `clockwise` as seen from above, i.e. a negative turn about +Y.
    pub fn new(speed_deg_per_sec: f32, clockwise: bool) -> Self {
        let signed = if clockwise { -speed_deg_per_sec.abs() } else { speed_deg_per_sec.abs() };
        SelfRotation {
            stored_speed: signed,
            speed: signed,
            angle_deg: 0.0,
        }
    }

    pub fn still() -> Self {
        Self::new(0.0, false)
    }

    pub fn tick(&mut self, dt: f32) {
        self.angle_deg = (self.angle_deg + self.speed * dt).rem_euclid(360.0);
    }

    /// Stop spinning; the speed is kept for [`SelfRotation::resume`].
    pub fn suspend(&mut self) {
        self.speed = 0.0;
    }

    pub fn resume(&mut self) {
        self.speed = self.stored_speed;
    }

    pub fn is_suspended(&self) -> bool {
        self.speed == 0.0 && self.stored_speed != 0.0
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn angle_deg(&self) -> f32 {
        self.angle_deg
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.angle_deg.to_radians())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// RigidSpin
// ════════════════════════════════════════════════════════════════════════════

/// Angular momentum of a torqueable body.
///
/// Torque queued with [`RigidSpin::add_torque`] is only consumed by
/// [`RigidSpin::integrate`], which the physics tick calls.
#[derive(Debug, Clone, PartialEq)]
pub struct RigidSpin {
    pub angular_velocity: Vec3,
    pending_torque: Vec3,
    max_angular_velocity: f32,
    angular_drag: f32,
    sleep_threshold: f32,
}

impl RigidSpin {
    pub fn new(config: &SpinConfig) -> Self {
        RigidSpin {
            angular_velocity: Vec3::ZERO,
            pending_torque: Vec3::ZERO,
            max_angular_velocity: config.max_angular_velocity,
            angular_drag: config.angular_drag,
            sleep_threshold: config.sleep_threshold,
        }
    }

    /// Queue an angular acceleration (rad/s²) for the next physics step.
    pub fn add_torque(&mut self, torque: Vec3) {
        self.pending_torque += torque;
    }

    pub fn pending_torque(&self) -> Vec3 {
        self.pending_torque
    }

    pub fn is_sleeping(&self) -> bool {
        self.angular_velocity == Vec3::ZERO && self.pending_torque == Vec3::ZERO
    }

    /// Apply queued torque, drag and the velocity cap, then rotate
    /// `orientation` by one step.
    pub fn integrate(&mut self, orientation: &mut Quat, dt: f32) {
        self.angular_velocity += self.pending_torque * dt;
        self.pending_torque = Vec3::ZERO;

        self.angular_velocity *= 1.0 / (1.0 + self.angular_drag * dt);
        self.angular_velocity = self.angular_velocity.clamp_length_max(self.max_angular_velocity);
        if self.angular_velocity.length() < self.sleep_threshold {
            self.angular_velocity = Vec3::ZERO;
            return;
        }
        *orientation = (Quat::from_scaled_axis(self.angular_velocity * dt) * *orientation).normalize();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// RecenterWatchdog
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WatchdogPhase {
    /// Waiting for the orientation to leave identity.
    Armed,
    /// Off identity; waiting to see whether it holds still.
    Cooling { elapsed: f32, sampled: Quat },
    /// Interpolating back to identity.
    Recentering { elapsed: f32, from: Quat, written: Quat },
}

/// Settles a body's orientation back to identity once it is left alone.
#[derive(Debug, Clone, PartialEq)]
pub struct RecenterWatchdog {
    phase: WatchdogPhase,
    threshold_deg: f32,
    cooldown: f32,
    duration: f32,
    tolerance_deg: f32,
}

impl RecenterWatchdog {
    pub fn new(config: &SpinConfig) -> Self {
        RecenterWatchdog {
            phase: WatchdogPhase::Armed,
            threshold_deg: config.recenter_threshold_deg,
            cooldown: config.recenter_cooldown,
            duration: config.recenter_duration,
            tolerance_deg: config.still_tolerance_deg,
        }
    }

    pub fn phase(&self) -> WatchdogPhase {
        self.phase
    }

    pub fn is_resetting(&self) -> bool {
        !matches!(self.phase, WatchdogPhase::Armed)
    }

    /// Advance by one physics step, possibly rewriting `orientation`.
    pub fn tick(&mut self, orientation: &mut Quat, dt: f32) {
        let moved = |a: Quat, b: Quat| angle_between_deg(a, b) > self.tolerance_deg;

        self.phase = match self.phase {
            WatchdogPhase::Armed => {
                if angle_between_deg(*orientation, Quat::IDENTITY) > self.threshold_deg {
                    trace!("orientation off identity; recenter cooldown started");
                    WatchdogPhase::Cooling { elapsed: 0.0, sampled: *orientation }
                } else {
                    WatchdogPhase::Armed
                }
            }
            WatchdogPhase::Cooling { elapsed, sampled } => {
                if moved(*orientation, sampled) {
                    WatchdogPhase::Armed
                } else if elapsed + dt >= self.cooldown {
                    debug!("body left alone; recentering");
                    WatchdogPhase::Recentering { elapsed: 0.0, from: *orientation, written: *orientation }
                } else {
                    WatchdogPhase::Cooling { elapsed: elapsed + dt, sampled }
                }
            }
            WatchdogPhase::Recentering { elapsed, from, written } => {
                if moved(*orientation, written) {
                    debug!("body moved during recenter; aborting");
                    WatchdogPhase::Armed
                } else {
                    let elapsed = elapsed + dt;
                    let t = (elapsed / self.duration).min(1.0);
                    *orientation = from.slerp(Quat::IDENTITY, t).normalize();
                    if t >= 1.0 {
                        *orientation = Quat::IDENTITY;
                        WatchdogPhase::Armed
                    } else {
                        WatchdogPhase::Recentering { elapsed, from, written: *orientation }
                    }
                }
            }
        };
    }
}

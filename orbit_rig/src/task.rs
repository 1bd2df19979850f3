//! Multi-tick tasks advanced by the scheduler.
//!
//! A task is plain data holding its own elapsed time.  Cancelling one means
//! dropping or replacing it; nothing runs in the background.

use crate::pose::Pose;

// ════════════════════════════════════════════════════════════════════════════
// PoseTransition
// ════════════════════════════════════════════════════════════════════════════

/// Fixed-duration camera move: linear position, spherical rotation.
#[derive(Debug, Clone, PartialEq)]
pub struct PoseTransition {
    from: Pose,
    to: Pose,
    elapsed: f32,
    duration: f32,
}

impl PoseTransition {
    pub fn new(from: Pose, to: Pose, duration: f32) -> Self {
        PoseTransition {
            from,
            to,
            elapsed: 0.0,
            duration: duration.max(f32::EPSILON),
        }
    }

    /// Step forward and return the pose for this tick.
    pub fn advance(&mut self, dt: f32) -> Pose {
        self.elapsed = (self.elapsed + dt).min(self.duration);
        self.current()
    }

    pub fn current(&self) -> Pose {
        self.from.interpolate(&self.to, self.progress())
    }

    pub fn progress(&self) -> f32 {
        self.elapsed / self.duration
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    pub fn from(&self) -> &Pose {
        &self.from
    }

    pub fn to(&self) -> &Pose {
        &self.to
    }

    /// Move the destination while in flight (the target is moving).
    pub fn retarget(&mut self, to: Pose) {
        self.to = to;
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Countdown
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Countdown {
    remaining: f32,
}

impl Countdown {
    pub fn new(duration: f32) -> Self {
        Countdown { remaining: duration.max(0.0) }
    }

    /// Returns `true` once the countdown has run out.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.remaining = (self.remaining - dt).max(0.0);
        self.is_finished()
    }

    pub fn is_finished(&self) -> bool {
        self.remaining <= 0.0
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }
}

//! Raw per-frame hand data.

use glam::Vec3;
use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════════════════
// HandSide
// ════════════════════════════════════════════════════════════════════════════

/// Which hand a sample belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandSide {
    Left,
    Right,
}

impl HandSide {
    /// The opposite hand.
    pub fn other(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HandSample
// ════════════════════════════════════════════════════════════════════════════

/// One hand in one frame.
///
/// Produced fresh every tick and never carried over: a hand missing from the
/// current frame is [`HandSample::absent`], whatever it was last tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandSample {
    pub present: bool,
    /// Palm centre in tracker space (metres).
    pub palm_position: Vec3,
    /// 0.0 = open hand, 1.0 = fist.
    pub grab_strength: f32,
    /// 0.0 = fingers apart, 1.0 = thumb and index touching.
    pub pinch_strength: f32,
}

impl HandSample {
    /// A detected hand.
    pub fn tracked(palm_position: Vec3, grab_strength: f32, pinch_strength: f32) -> Self {
        HandSample {
            present: true,
            palm_position,
            grab_strength,
            pinch_strength,
        }
    }

    /// A hand that is not in the frame.
    pub const fn absent() -> Self {
        HandSample {
            present: false,
            palm_position: Vec3::ZERO,
            grab_strength: 0.0,
            pinch_strength: 0.0,
        }
    }

    /// True when present and grabbing harder than `threshold`.
    pub fn is_grabbing(&self, threshold: f32) -> bool {
        self.present && self.grab_strength > threshold
    }

    /// True when present and pinching harder than `threshold`.
    pub fn is_pinching(&self, threshold: f32) -> bool {
        self.present && self.pinch_strength > threshold
    }
}

impl Default for HandSample {
    fn default() -> Self {
        Self::absent()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// TrackingFrame
// ════════════════════════════════════════════════════════════════════════════

/// What a provider reports for one tick: zero, one or two hands.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrackingFrame {
    pub left: Option<HandSample>,
    pub right: Option<HandSample>,
}

impl TrackingFrame {
    /// A frame in which no hand was detected.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_hand(mut self, side: HandSide, sample: HandSample) -> Self {
        match side {
            HandSide::Left => self.left = Some(sample),
            HandSide::Right => self.right = Some(sample),
        }
        self
    }

    /// The hand on `side`, if the provider reported one.
    pub fn hand(&self, side: HandSide) -> Option<&HandSample> {
        match side {
            HandSide::Left => self.left.as_ref(),
            HandSide::Right => self.right.as_ref(),
        }
    }
}

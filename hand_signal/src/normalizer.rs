//! Frame → gesture state.
//!
//! A pure per-tick transform.  The normalizer keeps no memory of previous
//! frames, so a hand that drops out is reported absent on the very next
//! tick and the two-hand distance falls back to [`NO_DISTANCE`].

use tracing::trace;

use crate::sample::{HandSample, HandSide, TrackingFrame};
use crate::source::GestureSource;

/// Two-hand distance when either hand is missing.
pub const NO_DISTANCE: f32 = -1.0;

/// The gesture vocabulary consumed by the cursor and camera rig.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureState {
    pub left: HandSample,
    pub right: HandSample,
    /// Palm-to-palm distance in metres, or [`NO_DISTANCE`].
    pub two_hand_distance: f32,
}

impl GestureState {
    /// Both hands absent.
    pub fn empty() -> Self {
        GestureState {
            left: HandSample::absent(),
            right: HandSample::absent(),
            two_hand_distance: NO_DISTANCE,
        }
    }

    /// Build from two samples, deriving the distance.
    pub fn from_hands(left: HandSample, right: HandSample) -> Self {
        let two_hand_distance = if left.present && right.present {
            left.palm_position.distance(right.palm_position)
        } else {
            NO_DISTANCE
        };
        GestureState { left, right, two_hand_distance }
    }

    pub fn hand(&self, side: HandSide) -> &HandSample {
        match side {
            HandSide::Left => &self.left,
            HandSide::Right => &self.right,
        }
    }

    pub fn both_present(&self) -> bool {
        self.left.present && self.right.present
    }

    pub fn any_present(&self) -> bool {
        self.left.present || self.right.present
    }

    /// The two-hand distance, if defined this tick.
    pub fn distance(&self) -> Option<f32> {
        self.both_present().then_some(self.two_hand_distance)
    }
}

impl Default for GestureState {
    fn default() -> Self {
        Self::empty()
    }
}

/// Turns whatever a [`GestureSource`] reports into a [`GestureState`].
#[derive(Debug, Default)]
pub struct HandSignalNormalizer {
    frames_seen: u64,
    frames_missing: u64,
}

impl HandSignalNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize one frame.  `None` (provider had nothing this tick) means
    /// no hands.
    pub fn normalize(&mut self, frame: Option<&TrackingFrame>) -> GestureState {
        self.frames_seen += 1;
        let Some(frame) = frame else {
            self.frames_missing += 1;
            trace!(missing = self.frames_missing, "no hand data in the current frame");
            return GestureState::empty();
        };

        let left = frame.left.filter(|h| h.present).unwrap_or_default();
        let right = frame.right.filter(|h| h.present).unwrap_or_default();
        GestureState::from_hands(left, right)
    }

    /// Pull the latest frame from `source` and normalize it.
    pub fn poll(&mut self, source: &mut dyn GestureSource) -> GestureState {
        let frame = source.current_frame();
        self.normalize(frame.as_ref())
    }

    /// Ticks that had no frame at all.
    pub fn frames_missing(&self) -> u64 {
        self.frames_missing
    }

    pub fn frames_seen(&self) -> u64 {
        self.frames_seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ScriptedSource;
    use approx::assert_relative_eq;
    use glam::Vec3;

    fn hand(x: f32) -> HandSample {
        HandSample::tracked(Vec3::new(x, 0.2, 0.0), 0.0, 0.0)
    }

    #[test]
    fn distance_when_both_present() {
        let mut n = HandSignalNormalizer::new();
        let frame = TrackingFrame { left: Some(hand(-0.15)), right: Some(hand(0.15)) };
        let g = n.normalize(Some(&frame));
        assert_relative_eq!(g.two_hand_distance, 0.30, epsilon = 1e-6);
        assert_eq!(g.distance(), Some(g.two_hand_distance));
    }

    #[test]
    fn sentinel_when_one_hand_missing() {
        let mut n = HandSignalNormalizer::new();
        let frame = TrackingFrame { left: Some(hand(0.0)), right: None };
        let g = n.normalize(Some(&frame));
        assert_eq!(g.two_hand_distance, NO_DISTANCE);
        assert!(g.left.present);
        assert!(!g.right.present);
        assert_eq!(g.distance(), None);
    }

    #[test]
    fn no_stale_distance_after_both_hands_leave() {
        let mut src = ScriptedSource::new(vec![
            TrackingFrame { left: Some(hand(-0.2)), right: Some(hand(0.2)) },
            TrackingFrame::empty(),
            TrackingFrame::empty(),
        ]);
        let mut n = HandSignalNormalizer::new();
        let first = n.poll(&mut src);
        assert!(first.two_hand_distance > 0.0);
        for _ in 0..2 {
            let g = n.poll(&mut src);
            assert_eq!(g.two_hand_distance, NO_DISTANCE);
            assert!(!g.any_present());
        }
    }

    #[test]
    fn missing_frame_is_both_absent() {
        let mut n = HandSignalNormalizer::new();
        let g = n.normalize(None);
        assert_eq!(g, GestureState::empty());
        assert_eq!(n.frames_missing(), 1);
    }

    #[test]
    fn sample_flagged_absent_is_dropped() {
        let mut n = HandSignalNormalizer::new();
        let ghost = HandSample { present: false, ..hand(0.4) };
        let frame = TrackingFrame { left: Some(ghost), right: Some(hand(0.0)) };
        let g = n.normalize(Some(&frame));
        assert!(!g.left.present);
        assert_eq!(g.two_hand_distance, NO_DISTANCE);
    }

    #[test]
    fn strengths_pass_through_unmodified() {
        let mut n = HandSignalNormalizer::new();
        let r = HandSample::tracked(Vec3::ZERO, 0.013, 0.002);
        let g = n.normalize(Some(&TrackingFrame { left: None, right: Some(r) }));
        assert_eq!(g.right.grab_strength, 0.013);
        assert_eq!(g.right.pinch_strength, 0.002);
    }
}

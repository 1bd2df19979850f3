//! Skeleton-tracker (Kinect-style) back-end.
//!
//! A body tracker reports whole users rather than hands.  The adapter picks
//! one user slot, reads the two hand joints for palm positions and maps the
//! coarse open/closed/lasso hand state onto grab and pinch strengths, so the
//! rest of the exhibit sees the same [`TrackingFrame`] it would get from a
//! hand tracker.

use glam::Vec3;
use tracing::trace;

use crate::error::{Result, SignalError};
use crate::sample::{HandSample, HandSide, TrackingFrame};
use crate::source::GestureSource;

/// Opaque user identifier assigned by the tracker.
pub type UserId = u64;

/// Skeleton joints the adapter reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JointType {
    Head,
    SpineShoulder,
    HandLeft,
    HandRight,
}

impl JointType {
    pub fn hand(side: HandSide) -> Self {
        match side {
            HandSide::Left => Self::HandLeft,
            HandSide::Right => Self::HandRight,
        }
    }
}

/// Coarse hand pose reported by skeleton trackers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyHandState {
    #[default]
    Unknown,
    NotTracked,
    Open,
    Closed,
    /// Two fingers extended: used as the pinch.
    Lasso,
}

impl BodyHandState {
    /// (grab, pinch) strengths for this state.
    pub fn strengths(self) -> (f32, f32) {
        match self {
            Self::Closed => (1.0, 0.0),
            Self::Lasso => (0.0, 1.0),
            _ => (0.0, 0.0),
        }
    }
}

/// What a skeleton-tracking SDK has to offer.
pub trait BodyTracker {
    fn is_user_detected(&self, index: usize) -> bool;
    fn user_id(&self, index: usize) -> Option<UserId>;
    /// Joint position in metres, `None` when the joint is not tracked.
    fn joint_position(&self, user: UserId, joint: JointType) -> Option<Vec3>;
    fn hand_state(&self, user: UserId, side: HandSide) -> BodyHandState;
}

/// [`GestureSource`] over a [`BodyTracker`].
pub struct BodyTrackingSource<T> {
    tracker: T,
    player_index: usize,
}

impl<T: BodyTracker> BodyTrackingSource<T> {
    pub fn new(tracker: T) -> Self {
        Self::with_player(tracker, 0)
    }

    pub fn with_player(tracker: T, player_index: usize) -> Self {
        BodyTrackingSource { tracker, player_index }
    }

    pub fn tracker(&self) -> &T {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut T {
        &mut self.tracker
    }

    /// The user currently in the configured player slot.
    pub fn tracked_user(&self) -> Result<UserId> {
        if !self.tracker.is_user_detected(self.player_index) {
            return Err(SignalError::UnknownUser(self.player_index));
        }
        self.tracker
            .user_id(self.player_index)
            .ok_or(SignalError::UnknownUser(self.player_index))
    }

    fn sample(&self, user: UserId, side: HandSide) -> Option<HandSample> {
        let palm = self.tracker.joint_position(user, JointType::hand(side))?;
        let (grab, pinch) = self.tracker.hand_state(user, side).strengths();
        Some(HandSample::tracked(palm, grab, pinch))
    }
}

impl<T: BodyTracker> GestureSource for BodyTrackingSource<T> {
    fn current_frame(&mut self) -> Option<TrackingFrame> {
        let user = match self.tracked_user() {
            Ok(u) => u,
            Err(e) => {
                trace!(error = %e, "no body-tracked user");
                return None;
            }
        };
        Some(TrackingFrame {
            left: self.sample(user, HandSide::Left),
            right: self.sample(user, HandSide::Right),
        })
    }

    fn name(&self) -> &str {
        "body"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::{HandSignalNormalizer, NO_DISTANCE};
    use std::collections::HashMap;

    #[derive(Default)]
    struct FakeTracker {
        users: Vec<UserId>,
        joints: HashMap<(UserId, JointType), Vec3>,
        states: HashMap<(UserId, HandSide), BodyHandState>,
    }

    impl BodyTracker for FakeTracker {
        fn is_user_detected(&self, index: usize) -> bool {
            index < self.users.len()
        }
        fn user_id(&self, index: usize) -> Option<UserId> {
            self.users.get(index).copied()
        }
        fn joint_position(&self, user: UserId, joint: JointType) -> Option<Vec3> {
            self.joints.get(&(user, joint)).copied()
        }
        fn hand_state(&self, user: UserId, side: HandSide) -> BodyHandState {
            self.states.get(&(user, side)).copied().unwrap_or_default()
        }
    }

    fn two_handed() -> FakeTracker {
        let mut t = FakeTracker { users: vec![7], ..Default::default() };
        t.joints.insert((7, JointType::HandLeft), Vec3::new(-0.2, 1.0, 2.0));
        t.joints.insert((7, JointType::HandRight), Vec3::new(0.2, 1.0, 2.0));
        t.states.insert((7, HandSide::Left), BodyHandState::Closed);
        t.states.insert((7, HandSide::Right), BodyHandState::Lasso);
        t
    }

    #[test]
    fn closed_is_grab_and_lasso_is_pinch() {
        let mut src = BodyTrackingSource::new(two_handed());
        let f = src.current_frame().unwrap();
        let l = f.left.unwrap();
        let r = f.right.unwrap();
        assert_eq!((l.grab_strength, l.pinch_strength), (1.0, 0.0));
        assert_eq!((r.grab_strength, r.pinch_strength), (0.0, 1.0));
    }

    #[test]
    fn untracked_joint_means_absent_hand() {
        let mut t = two_handed();
        t.joints.remove(&(7, JointType::HandLeft));
        let mut src = BodyTrackingSource::new(t);
        let mut n = HandSignalNormalizer::new();
        let g = n.poll(&mut src);
        assert!(!g.left.present);
        assert!(g.right.present);
        assert_eq!(g.two_hand_distance, NO_DISTANCE);
    }

    #[test]
    fn no_user_means_no_frame() {
        let mut src = BodyTrackingSource::new(FakeTracker::default());
        assert!(src.current_frame().is_none());
        assert!(matches!(src.tracked_user(), Err(SignalError::UnknownUser(0))));
    }

    #[test]
    fn player_index_selects_user() {
        let mut t = two_handed();
        t.users.push(9);
        t.joints.insert((9, JointType::HandRight), Vec3::ZERO);
        let mut src = BodyTrackingSource::with_player(t, 1);
        let f = src.current_frame().unwrap();
        assert!(f.left.is_none());
        assert_eq!(f.right.map(|h| h.grab_strength), Some(0.0));
    }
}

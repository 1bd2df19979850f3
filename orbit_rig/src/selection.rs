//! Dwell selection: hold a pinch until the progress bar fills.
//!
//! ```text
//!            gesture on (edge)             fill == 1
//!   Idle ───────────────────────▶ Dwelling ───────────▶ Cooldown
//!    ▲  ◀── gesture off (fill decays) ──┘                   │
//!    └──────────────────────── cooldown elapsed ────────────┘
//! ```
//!
//! The target is resolved when the fill completes, not when the dwell
//! starts, so moving the cursor mid-dwell selects whatever is under it at
//! the end.
//!
//! A dwell always needs the full hold time.  Pinching again while an
//! abandoned dwell is still decaying starts a fresh dwell at fill 0; the
//! decayed remainder is not carried over.

use tracing::debug;

use crate::config::SelectionConfig;
use crate::feedback::{Feedback, SoundCue};
use crate::scene::{CursorHit, HitTarget, ObjectId, UiButton};
use crate::task::Countdown;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionState {
    Idle,
    Dwelling,
    Cooldown(Countdown),
}

/// Discrete outcome of a completed dwell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionEvent {
    Selected(ObjectId),
    Back,
}

/// What the running dwell will do on completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DwellKind {
    Select,
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionProgress {
    pub active: Option<DwellKind>,
    /// Always within `[0, 1]`.
    pub fill: f32,
    pub dwell_duration: f32,
}

pub struct SelectionStateMachine {
    config: SelectionConfig,
    state: SelectionState,
    progress: SelectionProgress,
    /// Cleared by a completed dwell; set again once the gesture is released.
    armed: bool,
    bar_visible: bool,
}

impl SelectionStateMachine {
    pub fn new(config: SelectionConfig) -> Self {
        let dwell_duration = config.hold_duration;
        SelectionStateMachine {
            config,
            state: SelectionState::Idle,
            progress: SelectionProgress { active: None, fill: 0.0, dwell_duration },
            armed: true,
            bar_visible: false,
        }
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn progress(&self) -> SelectionProgress {
        self.progress
    }

    /// Advance one tick.
    ///
    /// `resolve` is only called when a dwell completes and must report what
    /// is under the cursor at that moment.  While `focused`, every completed
    /// dwell means "back".
    pub fn update<F, R>(
        &mut self,
        gesture_active: bool,
        focused: bool,
        dt: f32,
        resolve: R,
        feedback: &mut F,
    ) -> Option<SelectionEvent>
    where
        F: Feedback + ?Sized,
        R: FnOnce() -> Option<CursorHit>,
    {
        if !gesture_active {
            self.armed = true;
        }

        match self.state {
            SelectionState::Cooldown(mut countdown) => {
                self.state = if countdown.tick(dt) {
                    SelectionState::Idle
                } else {
                    SelectionState::Cooldown(countdown)
                };
                None
            }
            SelectionState::Idle => {
                if gesture_active && self.armed {
                    self.start(focused, feedback);
                    self.fill_step(dt, resolve, feedback)
                } else {
                    self.decay(dt, feedback);
                    None
                }
            }
            SelectionState::Dwelling => {
                if gesture_active {
                    self.fill_step(dt, resolve, feedback)
                } else {
                    debug!(fill = self.progress.fill, "dwell interrupted");
                    self.progress.active = None;
                    self.state = SelectionState::Idle;
                    self.decay(dt, feedback);
                    None
                }
            }
        }
    }

    /// Abandon a running dwell as if the gesture had been released.
    pub fn interrupt<F: Feedback + ?Sized>(&mut self, feedback: &mut F) {
        if self.state == SelectionState::Dwelling {
            self.progress.active = None;
            self.state = SelectionState::Idle;
            feedback.set_progress_bar_fill(self.progress.fill);
        }
    }

    fn start<F: Feedback + ?Sized>(&mut self, focused: bool, feedback: &mut F) {
        let (kind, duration) = if focused {
            (DwellKind::Back, self.config.focused_hold_duration)
        } else {
            (DwellKind::Select, self.config.hold_duration)
        };
        self.progress = SelectionProgress { active: Some(kind), fill: 0.0, dwell_duration: duration };
        self.state = SelectionState::Dwelling;
        self.set_bar_visible(true, feedback);
        feedback.set_progress_bar_fill(0.0);
    }

    fn fill_step<F, R>(&mut self, dt: f32, resolve: R, feedback: &mut F) -> Option<SelectionEvent>
    where
        F: Feedback + ?Sized,
        R: FnOnce() -> Option<CursorHit>,
    {
        self.progress.fill = (self.progress.fill + dt / self.progress.dwell_duration).min(1.0);
        feedback.set_progress_bar_fill(self.progress.fill);
        if self.progress.fill < 1.0 {
            return None;
        }

        let kind = self.progress.active.unwrap_or(DwellKind::Select);
        let event = match (kind, resolve()) {
            (DwellKind::Back, _) => Some(SelectionEvent::Back),
            (DwellKind::Select, Some(CursorHit::Button(UiButton::Back))) => Some(SelectionEvent::Back),
            (DwellKind::Select, Some(CursorHit::World(hit))) => match hit.target {
                HitTarget::Object(id) => Some(SelectionEvent::Selected(id)),
                HitTarget::Anchor => None,
            },
            (DwellKind::Select, None) => None,
        };

        self.progress.active = None;
        self.armed = false;
        match event {
            Some(ev) => {
                debug!(?ev, "dwell completed");
                feedback.play_sound(SoundCue::Select);
                self.progress.fill = 0.0;
                self.set_bar_visible(false, feedback);
                self.state = SelectionState::Cooldown(Countdown::new(self.config.cooldown));
            }
            None => {
                debug!("dwell completed over nothing");
                self.state = SelectionState::Idle;
            }
        }
        event
    }

    fn decay<F: Feedback + ?Sized>(&mut self, dt: f32, feedback: &mut F) {
        if self.progress.fill <= 0.0 {
            self.set_bar_visible(false, feedback);
            return;
        }
        self.progress.fill = (self.progress.fill - dt / self.config.decay_duration).max(0.0);
        feedback.set_progress_bar_fill(self.progress.fill);
        if self.progress.fill == 0.0 {
            self.set_bar_visible(false, feedback);
        }
    }

    fn set_bar_visible<F: Feedback + ?Sized>(&mut self, visible: bool, feedback: &mut F) {
        if self.bar_visible != visible {
            self.bar_visible = visible;
            feedback.set_progress_bar_visible(visible);
        }
    }
}

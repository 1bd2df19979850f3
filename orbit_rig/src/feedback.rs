//! Outbound hooks to the UI and audio layers.

use crate::scene::SelectableObject;

/// Sound cues the exhibit asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    /// Background music, started once with the exhibit.
    Music,
    /// Camera swoops in or out of focus.
    Woosh,
    /// A dwell selection completed.
    Select,
}

/// UI and audio collaborators.
///
/// Calls are fire-and-forget: implementations must not block the tick.
pub trait Feedback {
    fn set_progress_bar_visible(&mut self, visible: bool);
    fn set_progress_bar_fill(&mut self, fill: f32);
    fn play_sound(&mut self, cue: SoundCue);
    fn show_info_panel(&mut self, object: &SelectableObject);
    fn hide_info_panel(&mut self);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullFeedback;

impl Feedback for NullFeedback {
    fn set_progress_bar_visible(&mut self, _visible: bool) {}
    fn set_progress_bar_fill(&mut self, _fill: f32) {}
    fn play_sound(&mut self, _cue: SoundCue) {}
    fn show_info_panel(&mut self, _object: &SelectableObject) {}
    fn hide_info_panel(&mut self) {}
}

impl<F: Feedback + ?Sized> Feedback for &mut F {
    fn set_progress_bar_visible(&mut self, visible: bool) {
        (**self).set_progress_bar_visible(visible)
    }
    fn set_progress_bar_fill(&mut self, fill: f32) {
        (**self).set_progress_bar_fill(fill)
    }
    fn play_sound(&mut self, cue: SoundCue) {
        (**self).play_sound(cue)
    }
    fn show_info_panel(&mut self, object: &SelectableObject) {
        (**self).show_info_panel(object)
    }
    fn hide_info_panel(&mut self) {
        (**self).hide_info_panel()
    }
}

#[cfg(test)]
pub(crate) mod recording {
    use super::*;

    /// Everything a component asked the UI for, in order.
    #[derive(Debug, Default)]
    pub(crate) struct Recorder {
        pub bar_visible: Vec<bool>,
        pub fills: Vec<f32>,
        pub sounds: Vec<SoundCue>,
        pub panels_shown: Vec<String>,
        pub panels_hidden: usize,
    }

    impl Feedback for Recorder {
        fn set_progress_bar_visible(&mut self, visible: bool) {
            self.bar_visible.push(visible);
        }
        fn set_progress_bar_fill(&mut self, fill: f32) {
            self.fills.push(fill);
        }
        fn play_sound(&mut self, cue: SoundCue) {
            self.sounds.push(cue);
        }
        fn show_info_panel(&mut self, object: &SelectableObject) {
            self.panels_shown.push(object.name.clone());
        }
        fn hide_info_panel(&mut self) {
            self.panels_hidden += 1;
        }
    }
}

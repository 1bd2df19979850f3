//! On-screen feedback: progress bar, info panel and the sound cues behind
//! them.
//!
//! [`Hud`] is the exhibit's [`Feedback`] collaborator.  It only records what
//! should be shown; the visualizer reads it back when drawing a frame.

use orbit_rig::{Feedback, SelectableObject, SoundCue};
use tracing::debug;

use crate::chime::Chime;

/// Characters per description line in the info panel.
const WRAP: usize = 36;

// ════════════════════════════════════════════════════════════════════════════
// InfoPanel
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct InfoPanel {
    pub title: String,
    pub lines: Vec<String>,
}

impl InfoPanel {
    pub fn for_object(object: &SelectableObject) -> Self {
        let info = &object.info;
        let facts = [
            ("Age", &info.age),
            ("Diameter", &info.diameter),
            ("Mass", &info.mass),
            ("Day", &info.day),
            ("Year", &info.year),
            ("Dist. to Sun", &info.distance_to_sun),
            ("Temperature", &info.temperature),
            ("Atmosphere", &info.atmosphere),
        ];
        let mut lines: Vec<String> = facts
            .iter()
            .filter(|(_, value)| !value.trim().is_empty())
            .map(|(label, value)| format!("{label}: {value}"))
            .collect();
        if !info.description.trim().is_empty() {
            lines.push(String::new());
            lines.extend(wrap(&info.description, WRAP));
        }
        InfoPanel { title: object.name.clone(), lines }
    }
}

/// Greedy word wrap.  Words longer than `width` get a line of their own.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        if !line.is_empty() && line.len() + 1 + word.len() > width {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

// ════════════════════════════════════════════════════════════════════════════
// Hud
// ════════════════════════════════════════════════════════════════════════════

pub struct Hud {
    chime: Chime,
    bar_visible: bool,
    fill: f32,
    panel: Option<InfoPanel>,
    last_cue: Option<SoundCue>,
}

impl Hud {
    pub fn new(chime: Chime) -> Self {
        Hud { chime, bar_visible: false, fill: 0.0, panel: None, last_cue: None }
    }

    pub fn bar_visible(&self) -> bool {
        self.bar_visible
    }

    pub fn fill(&self) -> f32 {
        self.fill
    }

    pub fn panel(&self) -> Option<&InfoPanel> {
        self.panel.as_ref()
    }

    pub fn last_cue(&self) -> Option<SoundCue> {
        self.last_cue
    }

    /// Release due notes.  Call once per frame.
    pub fn tick(&mut self, dt: f32) {
        self.chime.tick(dt);
    }
}

impl Feedback for Hud {
    fn set_progress_bar_visible(&mut self, visible: bool) {
        self.bar_visible = visible;
    }

    fn set_progress_bar_fill(&mut self, fill: f32) {
        self.fill = fill.clamp(0.0, 1.0);
    }

    fn play_sound(&mut self, cue: SoundCue) {
        debug!(?cue, "sound cue");
        self.last_cue = Some(cue);
        self.chime.play(cue);
    }

    fn show_info_panel(&mut self, object: &SelectableObject) {
        self.panel = Some(InfoPanel::for_object(object));
    }

    fn hide_info_panel(&mut self) {
        self.panel = None;
    }
}

//! Application wiring and the main loop.

use std::sync::mpsc;
use std::time::Instant;

use anyhow::Result;
use glam::Vec3;
use hand_signal::{FramePump, GestureSource, HandSample, HandSide, ScriptedSource, TrackingFrame};
use orbit_rig::{CameraMode, Exhibit, ExhibitBuilder, SelectionEvent};
use tracing::{info, warn};

use crate::catalog::ExhibitFile;
use crate::chime::{open_midi_output, Chime};
use crate::hud::Hud;
use crate::sim::{SimGestureSource, SimInput};
use crate::visualizer::{self, Overlay, Visualizer};

/// Longest frame delta fed to the exhibit; a stalled window must not
/// teleport the camera.
const MAX_FRAME_DT: f32 = 0.1;
/// Tick length for headless runs.
pub const HEADLESS_DT: f32 = 1.0 / 60.0;

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub exhibit: ExhibitFile,
    /// Open a MIDI port for the sound cues.
    pub sound: bool,
}

/// Wire an exhibit around `source` from the file's settings.
pub fn build_exhibit<S: GestureSource>(file: &ExhibitFile, source: S, hud: Hud) -> Result<Exhibit<S, Hud>> {
    let mut builder = ExhibitBuilder::new(file.rig.clone(), visualizer::viewport()).scene(file.build_scene());
    if let Some(camera) = file.camera {
        builder = builder.camera(camera);
    }
    Ok(builder.build(source, hud)?)
}

/// One line for the status bar.
pub fn status_line<S: GestureSource>(exhibit: &Exhibit<S, Hud>) -> String {
    let mode = match exhibit.rig().mode() {
        CameraMode::IdleAutoRotate => "idle",
        CameraMode::ManualRotate => "rotate",
        CameraMode::ManualPan => "pan",
        CameraMode::TwoHandZoom => "zoom",
        CameraMode::FocusTransition => "flying",
        CameraMode::FocusedFollow => "following",
    };
    let focused = exhibit
        .focus()
        .focused()
        .and_then(|id| exhibit.scene().object(id))
        .map(|o| o.name.as_str())
        .unwrap_or("-");
    format!("mode: {mode}   focus: {focused}   fov: {:.0}", exhibit.rig().fov())
}

// ════════════════════════════════════════════════════════════════════════════
// run(): the windowed application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the exhibit in a window until it is closed.
///
/// Hands come from the LeapMotion controller when the `leap` feature is on
/// and a device answers; otherwise the window's keyboard and mouse drive a
/// simulated pair of hands.
pub fn run(cfg: AppConfig) -> Result<()> {
    let (source, sim_tx) = open_source();
    let mut vis = Visualizer::new(sim_tx)?;

    let chime = if cfg.sound { Chime::new(open_midi_output()) } else { Chime::silent() };
    let mut exhibit = build_exhibit(&cfg.exhibit, source, Hud::new(chime))?;

    let mut last = Instant::now();
    while vis.is_open() {
        if !vis.poll_input() {
            break;
        }

        let now = Instant::now();
        let dt = now.duration_since(last).as_secs_f32().min(MAX_FRAME_DT);
        last = now;

        if let Some(event) = exhibit.advance(dt) {
            info!(?event, "selection");
        }
        exhibit.feedback_mut().tick(dt);

        let status = status_line(&exhibit);
        let overlay = Overlay {
            cursor: exhibit.cursor().screen_position(),
            cursor_suspended: exhibit.cursor().is_suspended(),
            status: &status,
        };
        vis.render(exhibit.scene(), exhibit.rig(), exhibit.feedback(), &overlay);
    }
    info!("window closed");
    Ok(())
}

type BoxedSource = Box<dyn GestureSource>;

fn open_source() -> (BoxedSource, Option<mpsc::Sender<SimInput>>) {
    #[cfg(feature = "leap")]
    {
        match hand_signal::LeapSource::open() {
            Ok(leap) => return (Box::new(leap), None),
            Err(e) => warn!(error = %e, "LeapMotion unavailable; falling back to simulation"),
        }
    }

    let (sim_tx, sim_rx) = mpsc::channel::<SimInput>();
    let pump = FramePump::spawn("sim", SimGestureSource { rx: sim_rx });
    (Box::new(pump), Some(sim_tx))
}

// ════════════════════════════════════════════════════════════════════════════
// Headless runs
// ════════════════════════════════════════════════════════════════════════════

/// Outcome of a headless run.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessReport {
    pub ticks: u64,
    pub selections: Vec<SelectionEvent>,
    pub focused: Option<String>,
    pub mode: CameraMode,
}

/// A visitor who pinches at the middle of the screen, looks around while the
/// camera flies in, pinches again to go back, then walks away.
pub fn demo_script() -> ScriptedSource {
    let centre = Vec3::new(0.0, 0.2, 0.0);
    let hand = |pinch: f32| TrackingFrame::empty().with_hand(HandSide::Right, HandSample::tracked(centre, 0.0, pinch));
    let mut script = ScriptedSource::new([]);
    script.push(hand(0.95), 60);
    script.push(hand(0.0), 180);
    script.push(hand(0.95), 30);
    script
}

/// Drive the scheduler without a window or sound for `ticks` frames.
pub fn run_headless(file: &ExhibitFile, ticks: u64) -> Result<HeadlessReport> {
    let mut exhibit = build_exhibit(file, demo_script(), Hud::new(Chime::silent()))?;
    let mut selections = Vec::new();
    for _ in 0..ticks {
        if let Some(event) = exhibit.advance(HEADLESS_DT) {
            selections.push(event);
        }
        exhibit.feedback_mut().tick(HEADLESS_DT);
    }
    if exhibit.source_mut().remaining() > 0 {
        warn!(ticks, "headless run ended before the demo script did");
    }
    let focused = exhibit
        .focus()
        .focused()
        .and_then(|id| exhibit.scene().object(id))
        .map(|o| o.name.clone());
    Ok(HeadlessReport { ticks, selections, focused, mode: exhibit.rig().mode() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_selects_the_sun_and_comes_back() {
        let file = ExhibitFile::embedded().unwrap();
        let report = run_headless(&file, 450).unwrap();
        assert_eq!(report.selections, vec![SelectionEvent::Selected(0), SelectionEvent::Back]);
        assert_eq!(report.focused, None);
        assert_ne!(report.mode, CameraMode::FocusTransition);
    }

    #[test]
    fn short_headless_run_is_still_focused() {
        let file = ExhibitFile::embedded().unwrap();
        let report = run_headless(&file, 200).unwrap();
        assert_eq!(report.selections, vec![SelectionEvent::Selected(0)]);
        assert_eq!(report.focused.as_deref(), Some("Sun"));
    }

    #[test]
    fn exhibit_without_camera_still_builds() {
        let mut file = ExhibitFile::embedded().unwrap();
        file.camera = None;
        let ex = build_exhibit(&file, ScriptedSource::new([]), Hud::new(Chime::silent())).unwrap();
        assert!(!ex.rig().is_enabled());
        assert!(status_line(&ex).contains("focus: -"));
    }

    #[test]
    fn status_names_the_focused_body() {
        let file = ExhibitFile::embedded().unwrap();
        let mut ex = build_exhibit(&file, ScriptedSource::new([]), Hud::new(Chime::silent())).unwrap();
        ex.focus_on(3).unwrap();
        ex.advance(HEADLESS_DT);
        let status = status_line(&ex);
        assert!(status.contains("focus: Earth"), "{status}");
        assert!(status.contains("mode: flying"), "{status}");
        assert_eq!(ex.feedback().panel().map(|p| p.title.as_str()), Some("Earth"));
    }
}

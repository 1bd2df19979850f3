//! The exhibit file: rig tuning, the initial camera and the bodies on show.
//!
//! ```toml
//! [scene]
//! ground_y = -4.0
//! back_button = { min = [16.0, 16.0], max = [136.0, 64.0] }
//!
//! [camera]
//! position = [0.0, 18.0, 40.0]
//!
//! [rig.selection]
//! hold_duration = 0.5
//!
//! [[bodies]]
//! name = "Earth"
//! radius = 1.0
//! orbit_radius = 16.0
//! ```
//!
//! Every section is optional.  A body without `orbit_radius` sits still at
//! `position`.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use glam::Vec3;
use orbit_rig::{CameraSetup, ObjectSpec, Orbit, PlanetInfo, RigConfig, Scene, UiRect};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// The solar system shipped with the binary.
pub const EMBEDDED: &str = include_str!("../assets/solar_system.toml");

// ════════════════════════════════════════════════════════════════════════════
// File layout
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExhibitFile {
    pub scene: SceneSection,
    /// `None` leaves the camera rig disabled.
    pub camera: Option<CameraSetup>,
    pub rig: RigConfig,
    pub bodies: Vec<BodyEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSection {
    /// Height of the plane the pan pivot sticks to.
    pub ground_y: Option<f32>,
    pub back_button: Option<UiRect>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyEntry {
    pub name: String,
    pub radius: f32,
    /// Used when the body does not orbit.
    pub position: Vec3,
    pub orbit_center: Vec3,
    pub orbit_radius: Option<f32>,
    /// Degrees per second.
    pub orbit_speed: f32,
    /// Starting angle on the orbit, degrees.
    pub phase: f32,
    /// Degrees per second about the local Y axis.
    pub spin_speed: f32,
    pub clockwise: bool,
    pub rigid: bool,
    pub framing: Option<f32>,
    pub info: PlanetInfo,
}

impl Default for BodyEntry {
    fn default() -> Self {
        BodyEntry {
            name: String::new(),
            radius: 1.0,
            position: Vec3::ZERO,
            orbit_center: Vec3::ZERO,
            orbit_radius: None,
            orbit_speed: 0.0,
            phase: 0.0,
            spin_speed: 0.0,
            clockwise: false,
            rigid: false,
            framing: None,
            info: PlanetInfo::default(),
        }
    }
}

impl BodyEntry {
    fn spec(&self) -> ObjectSpec {
        let mut spec = ObjectSpec::new(self.name.clone(), self.radius)
            .at(self.position)
            .spinning(self.spin_speed, self.clockwise);
        if let Some(radius) = self.orbit_radius {
            spec = spec.orbiting(Orbit {
                center: self.orbit_center,
                radius,
                speed_deg_per_sec: self.orbit_speed,
                phase_deg: self.phase,
            });
        }
        if self.rigid {
            spec = spec.rigid();
        }
        spec.framing = self.framing;
        spec.info = self.info.clone();
        spec
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Loading
// ════════════════════════════════════════════════════════════════════════════

impl ExhibitFile {
    pub fn parse(text: &str) -> Result<Self> {
        let file: ExhibitFile = toml::from_str(text).context("malformed exhibit file")?;
        file.check()?;
        Ok(file)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading exhibit file {}", path.display()))?;
        let file = Self::parse(&text).with_context(|| format!("in {}", path.display()))?;
        info!(path = %path.display(), bodies = file.bodies.len(), "exhibit file loaded");
        Ok(file)
    }

    pub fn embedded() -> Result<Self> {
        Self::parse(EMBEDDED).context("embedded solar system")
    }

    /// Render the file back to TOML (for `--dump-config`).
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("serialising exhibit file")
    }

    fn check(&self) -> Result<()> {
        self.rig.validate()?;
        for (i, b) in self.bodies.iter().enumerate() {
            if b.name.trim().is_empty() {
                bail!("body #{i} has no name");
            }
            if !(b.radius > 0.0) {
                bail!("body {:?}: radius must be positive", b.name);
            }
            if matches!(b.orbit_radius, Some(r) if r < 0.0) {
                bail!("body {:?}: orbit_radius must not be negative", b.name);
            }
            if matches!(b.framing, Some(f) if f <= 0.0) {
                bail!("body {:?}: framing must be positive", b.name);
            }
        }
        Ok(())
    }

    /// Build the scene in file order, so body `i` gets object id `i`.
    pub fn build_scene(&self) -> Scene {
        let mut scene = Scene::new(self.rig.spin.clone(), self.rig.focus.framing);
        if let Some(y) = self.scene.ground_y {
            scene = scene.with_ground(y);
        }
        if let Some(rect) = self.scene.back_button {
            scene = scene.with_back_button(rect);
        }
        for body in &self.bodies {
            let id = scene.add(body.spec());
            debug!(id, name = %body.name, "body added");
        }
        scene
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use orbit_rig::SceneQuery;

    #[test]
    fn embedded_catalogue_loads() {
        let file = ExhibitFile::embedded().unwrap();
        assert_eq!(file.bodies.len(), 9);
        assert_eq!(file.bodies[0].name, "Sun");
        assert!(file.camera.is_some());

        let scene = file.build_scene();
        assert_eq!(scene.find("earth"), Some(3));
        let earth = scene.object(3).unwrap();
        assert!(earth.has_rigid_body());
        assert_eq!(earth.info.day, "24 hours");
        assert_relative_eq!(earth.position.length(), 16.0, epsilon = 1e-3);
        assert!(scene.back_button().is_some());
    }

    #[test]
    fn per_body_framing_overrides_default() {
        let scene = ExhibitFile::embedded().unwrap().build_scene();
        let mercury = scene.object(scene.find("Mercury").unwrap()).unwrap();
        let venus = scene.object(scene.find("Venus").unwrap()).unwrap();
        assert_eq!(mercury.framing, 2.0);
        assert_eq!(venus.framing, RigConfig::default().focus.framing);
    }

    #[test]
    fn empty_file_uses_defaults() {
        let file = ExhibitFile::parse("").unwrap();
        assert!(file.bodies.is_empty());
        assert!(file.camera.is_none());
        assert_eq!(file.rig, RigConfig::default());
    }

    #[test]
    fn partial_rig_section_keeps_other_defaults() {
        let file = ExhibitFile::parse(
            r#"
            [rig.thresholds]
            pinch = 0.6
            "#,
        )
        .unwrap();
        assert_eq!(file.rig.thresholds.pinch, 0.6);
        assert_eq!(file.rig.thresholds.grab, 0.9);
        assert_eq!(file.rig.zoom, RigConfig::default().zoom);
    }

    #[test]
    fn static_body_uses_position() {
        let file = ExhibitFile::parse(
            r#"
            [scene]
            ground_y = 0.0

            [[bodies]]
            name = "Moon"
            radius = 0.5
            position = [3.0, 1.0, 0.0]
            "#,
        )
        .unwrap();
        let scene = file.build_scene();
        let moon = scene.object(0).unwrap();
        assert_eq!(moon.position, Vec3::new(3.0, 1.0, 0.0));
        assert!(moon.orbit.is_none());
        let ray = orbit_rig::Ray { origin: Vec3::new(0.0, 5.0, 0.0), direction: Vec3::NEG_Y };
        assert!(scene.raycast(&ray, orbit_rig::LayerMask::ANCHOR).is_some());
    }

    #[test]
    fn invalid_rig_values_are_rejected() {
        let err = ExhibitFile::parse(
            r#"
            [rig.zoom]
            min_fov = 90.0
            "#,
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("zoom.min_fov"));
    }

    #[test]
    fn bad_bodies_are_rejected() {
        assert!(ExhibitFile::parse("[[bodies]]\nname = \"\"\n").is_err());
        assert!(ExhibitFile::parse("[[bodies]]\nname = \"X\"\nradius = 0.0\n").is_err());
        assert!(ExhibitFile::parse("[[bodies]]\nname = \"X\"\nframing = -1.0\n").is_err());
    }

    #[test]
    fn dump_round_trips() {
        let file = ExhibitFile::embedded().unwrap();
        let text = file.to_toml().unwrap();
        assert_eq!(ExhibitFile::parse(&text).unwrap(), file);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = ExhibitFile::load(Path::new("/no/such/exhibit.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("/no/such/exhibit.toml"));
    }
}

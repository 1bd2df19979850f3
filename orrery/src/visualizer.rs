//! Software-rendered visualizer using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┬───────────────┐
//! │  stars, orbit rings, shaded bodies                   │  INFO PANEL   │
//! │                                                      │  (focused     │
//! │                     ( cursor )                       │   body only)  │
//! │                                                      │               │
//! │  [BACK]           [==== progress ====]               │               │
//! ├──────────────────────────────────────────────────────┴───────────────┤
//! │  status bar / key legend                                             │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Scene coordinates put the pixel origin at the bottom-left corner; the
//! framebuffer's origin is top-left, so every world-to-buffer write flips y.

use std::sync::mpsc::Sender;
use std::time::Duration;

use anyhow::{anyhow, Result};
use glam::{Vec2, Vec3};
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};
use orbit_rig::{pose::project, CameraRigController, Pose, Scene, SelectableObject, UiRect, Viewport};

use crate::hud::Hud;
use crate::sim::{SimControls, SimInput};

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W: usize = 1280;
pub const WIN_H: usize = 720;
const PANEL_W: usize = 300;
const STATUS_H: usize = 36;
const BAR_W: usize = 240;
const BAR_H: usize = 14;
const TEXT_SCALE: usize = 2;
const BG_COLOR: u32 = 0xFF1A1A2E;
const PANEL_BG: u32 = 0xFF16213E;
const TEXT_BG: u32 = 0xFF0F3460;
const GOLD: u32 = 0xFFFFD700;
const ORBIT_COLOR: u32 = 0xFF2E3A5C;
const STAR_COUNT: usize = 220;

pub fn viewport() -> Viewport {
    Viewport::new(WIN_W as f32, WIN_H as f32)
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

/// What the status line and cursor need from the exhibit this frame.
pub struct Overlay<'a> {
    pub cursor: Vec2,
    pub cursor_suspended: bool,
    pub status: &'a str,
}

pub struct Visualizer {
    window: Window,
    buf: Vec<u32>,
    sim_tx: Option<Sender<SimInput>>,
    stars: Vec<Vec3>,
}

impl Visualizer {
    /// Open the window.  `sim_tx` receives the simulated hands; pass `None`
    /// when a real tracker is driving the exhibit.
    pub fn new(sim_tx: Option<Sender<SimInput>>) -> Result<Self> {
        let mut window = Window::new(
            "Orrery - hand-steered solar system",
            WIN_W,
            WIN_H,
            WindowOptions { resize: false, ..WindowOptions::default() },
        )
        .map_err(|e| anyhow!("opening window: {e}"))?;

        window.limit_update_rate(Some(Duration::from_millis(16))); // ~60fps

        Ok(Visualizer { window, buf: vec![BG_COLOR; WIN_W * WIN_H], sim_tx, stars: star_field(STAR_COUNT) })
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    /// Sample pointer and keys and forward them to the simulator.
    /// Returns false when the user asked to quit.
    pub fn poll_input(&mut self) -> bool {
        if !self.window.is_open() {
            return false;
        }
        let quit = self.window.is_key_pressed(Key::Q, KeyRepeat::No)
            || self.window.is_key_pressed(Key::Escape, KeyRepeat::No);
        let Some(tx) = &self.sim_tx else {
            return !quit;
        };
        if quit {
            let _ = tx.send(SimInput::Quit);
            return false;
        }

        let down = |k: Key| self.window.is_key_down(k);
        let pointer = self
            .window
            .get_mouse_pos(MouseMode::Discard)
            .map(|(x, y)| Vec2::new(x / WIN_W as f32, 1.0 - y / WIN_H as f32));
        let controls = SimControls {
            pointer,
            pinch: down(Key::Space) || self.window.get_mouse_down(MouseButton::Left),
            fist: down(Key::F) || self.window.get_mouse_down(MouseButton::Right),
            left_hand: down(Key::LeftShift) || down(Key::RightShift),
            zoom: down(Key::Z),
            hide: down(Key::H),
        };
        let _ = tx.send(SimInput::Frame(controls));
        true
    }

    /// Render one frame.
    pub fn render(&mut self, scene: &Scene, rig: &CameraRigController, hud: &Hud, overlay: &Overlay<'_>) {
        self.buf.fill(BG_COLOR);
        let pose = *rig.pose();
        let fov = rig.fov();
        let vp = viewport();

        // ── Stars at infinity ─────────────────────────────────────────────
        for i in 0..self.stars.len() {
            let dir = self.stars[i];
            if let Some(p) = project(&pose, fov, vp, pose.position + dir * 1.0e4) {
                let shade = 0xFF505070 + ((i as u32 * 37) % 0x40) * 0x010101;
                self.plot(p, shade);
            }
        }

        // ── Orbit rings ───────────────────────────────────────────────────
        for o in scene.objects() {
            if let Some(orbit) = o.orbit {
                self.draw_ring(&pose, fov, orbit.center, orbit.radius);
            }
        }

        // ── Bodies, far to near ───────────────────────────────────────────
        let mut order: Vec<&SelectableObject> = scene.objects().iter().collect();
        order.sort_by(|a, b| {
            let da = a.position.distance_squared(pose.position);
            let db = b.position.distance_squared(pose.position);
            db.total_cmp(&da)
        });
        for o in order {
            self.draw_body(&pose, fov, o);
        }

        // ── Back button ───────────────────────────────────────────────────
        if let Some(rect) = scene.back_button() {
            self.draw_button(rect, "BACK");
        }

        // ── Progress bar ──────────────────────────────────────────────────
        if hud.bar_visible() {
            let x = (WIN_W - PANEL_W - BAR_W) / 2;
            let y = WIN_H - STATUS_H - 40;
            self.fill_rect(x, y, BAR_W, BAR_H, TEXT_BG);
            let filled = (hud.fill() * (BAR_W - 4) as f32) as usize;
            self.fill_rect(x + 2, y + 2, filled, BAR_H - 4, GOLD);
            self.draw_border(x, y, BAR_W, BAR_H, 0xFF888888);
        }

        // ── Info panel ────────────────────────────────────────────────────
        if let Some(panel) = hud.panel() {
            let x = WIN_W - PANEL_W;
            self.fill_rect(x, 0, PANEL_W, WIN_H - STATUS_H, PANEL_BG);
            self.draw_label(&panel.title, x + 16, 20, 3, GOLD);
            let mut y = 56;
            for line in &panel.lines {
                self.draw_label(line, x + 16, y, 1, 0xFFDDDDDD);
                y += 10;
                if y + 10 > WIN_H - STATUS_H {
                    break;
                }
            }
        }

        // ── Cursor ────────────────────────────────────────────────────────
        let colour = if overlay.cursor_suspended { 0xFF555555 } else { 0xFFFFFFFF };
        self.draw_circle_outline(overlay.cursor, 12.0, colour);
        self.plot(overlay.cursor, colour);

        // ── Status bar ────────────────────────────────────────────────────
        let sy = WIN_H - STATUS_H;
        self.fill_rect(0, sy, WIN_W, STATUS_H, TEXT_BG);
        self.draw_label(overlay.status, 10, sy + 6, TEXT_SCALE, 0xFFEEEEEE);
        if self.sim_tx.is_some() {
            self.draw_label(
                "mouse=hand  LMB/space=pinch  RMB/F=fist  shift=left hand  Z=zoom  H=hide  Q=quit",
                10,
                sy + 24,
                1,
                0xFF888888,
            );
        }

        self.window.update_with_buffer(&self.buf, WIN_W, WIN_H).ok();
    }

    // ── Scene elements ────────────────────────────────────────────────────

    fn draw_ring(&mut self, pose: &Pose, fov: f32, center: Vec3, radius: f32) {
        const SEGMENTS: usize = 180;
        for i in 0..SEGMENTS {
            let a = i as f32 / SEGMENTS as f32 * std::f32::consts::TAU;
            let world = center + Vec3::new(a.cos() * radius, 0.0, -a.sin() * radius);
            if let Some(p) = project(pose, fov, viewport(), world) {
                self.plot(p, ORBIT_COLOR);
            }
        }
    }

    /// Lambert-shaded disc lit from the origin, with a meridian stripe so
    /// spin and torque are visible.
    fn draw_body(&mut self, pose: &Pose, fov: f32, o: &SelectableObject) {
        let Some(centre) = project(pose, fov, viewport(), o.position) else {
            return;
        };
        let depth = -(pose.rotation.inverse() * (o.position - pose.position)).z;
        let tan_half = (fov.to_radians() * 0.5).tan();
        let r = o.radius / (depth * tan_half) * WIN_H as f32 * 0.5;
        if r < 0.5 || !r.is_finite() {
            self.plot(centre, body_color(&o.name));
            return;
        }

        let base = body_color(&o.name);
        let emissive = o.position.length() <= o.radius;
        let light = pose.rotation.inverse() * (-o.position).normalize_or_zero();
        let to_local = o.display_rotation().inverse() * pose.rotation;

        let (x0, x1) = ((centre.x - r).floor() as i32, (centre.x + r).ceil() as i32);
        let (y0, y1) = ((centre.y - r).floor() as i32, (centre.y + r).ceil() as i32);
        for py in y0.max(0)..y1.min(WIN_H as i32) {
            for px in x0.max(0)..x1.min(WIN_W as i32) {
                let dx = (px as f32 + 0.5 - centre.x) / r;
                let dy = (py as f32 + 0.5 - centre.y) / r;
                let d2 = dx * dx + dy * dy;
                if d2 > 1.0 {
                    continue;
                }
                let normal = Vec3::new(dx, dy, (1.0 - d2).sqrt());
                let lit = if emissive { 1.0 } else { normal.dot(light).max(0.0) * 0.85 + 0.15 };
                let mut colour = blend(0xFF000000, base, lit);
                if (to_local * normal).x.abs() < 0.06 {
                    colour = blend(colour, 0xFF000000, 0.35);
                }
                self.put(px as usize, py as usize, colour);
            }
        }

        if o.is_focused() {
            self.draw_circle_outline(centre, r + 3.0, GOLD);
        }
        if r > 6.0 {
            let label_y = centre.y - r - 10.0;
            if label_y > 0.0 {
                let w = o.name.len() as f32 * 4.0;
                self.draw_label_at(Vec2::new(centre.x - w / 2.0, label_y), &o.name, 0xFFBBBBBB);
            }
        }
    }

    fn draw_button(&mut self, rect: UiRect, label: &str) {
        let x = rect.min.x.max(0.0) as usize;
        let w = (rect.max.x - rect.min.x).max(1.0) as usize;
        let h = (rect.max.y - rect.min.y).max(1.0) as usize;
        let top = row_of(rect.max.y).unwrap_or(0);
        self.fill_rect(x, top, w, h, TEXT_BG);
        self.draw_border(x, top, w, h, GOLD);
        let text_w = label.len() * 4 * TEXT_SCALE;
        self.draw_label(label, x + w.saturating_sub(text_w) / 2, top + h.saturating_sub(5 * TEXT_SCALE) / 2, TEXT_SCALE, GOLD);
    }

    fn draw_circle_outline(&mut self, centre: Vec2, r: f32, colour: u32) {
        let steps = (r * 6.0).max(24.0) as usize;
        for i in 0..steps {
            let a = i as f32 / steps as f32 * std::f32::consts::TAU;
            self.plot(centre + Vec2::new(a.cos(), a.sin()) * r, colour);
        }
    }

    fn draw_label_at(&mut self, p: Vec2, text: &str, colour: u32) {
        if let Some(row) = row_of(p.y) {
            if p.x >= 0.0 {
                self.draw_label(text, p.x as usize, row, 1, colour);
            }
        }
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    /// Scene pixel (bottom-left origin).
    fn plot(&mut self, p: Vec2, colour: u32) {
        if p.x >= 0.0 && p.y >= 0.0 {
            self.put(p.x as usize, p.y as usize, colour);
        }
    }

    /// Scene pixel by integer coordinates (bottom-left origin).
    fn put(&mut self, x: usize, y: usize, colour: u32) {
        if y < WIN_H {
            self.set_pixel(x, WIN_H - 1 - y, colour);
        }
    }

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(WIN_H) {
            for col in x..(x + w).min(WIN_W) {
                self.buf[row * WIN_W + col] = color;
            }
        }
    }

    fn draw_border(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        if w == 0 || h == 0 {
            return;
        }
        for col in x..(x + w).min(WIN_W) {
            self.set_pixel(col, y, color);
            self.set_pixel(col, y + h - 1, color);
        }
        for row in y..(y + h).min(WIN_H) {
            self.set_pixel(x, row, color);
            self.set_pixel(x + w - 1, row, color);
        }
    }

    /// Buffer pixel (top-left origin).
    fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < WIN_W && y < WIN_H {
            self.buf[y * WIN_W + x] = color;
        }
    }

    /// 3×5 bitmap font, each dot drawn as a `scale`×`scale` block.
    fn draw_label(&mut self, text: &str, x: usize, y: usize, scale: usize, color: u32) {
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.fill_rect(cx + col * scale, y + row * scale, scale, scale, color);
                    }
                }
            }
            cx += 4 * scale;
            if cx + 4 * scale > WIN_W {
                break;
            }
        }
    }
}

/// Buffer row of a scene y coordinate.
fn row_of(y: f32) -> Option<usize> {
    (y >= 0.0 && y < WIN_H as f32).then(|| WIN_H - 1 - y as usize)
}

/// Evenly spread unit directions from a fixed-seed LCG.
fn star_field(n: usize) -> Vec<Vec3> {
    let mut state: u32 = 0x2545_F491;
    let mut next = move || {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        (state >> 8) as f32 / (1u32 << 24) as f32
    };
    (0..n)
        .map(|_| {
            let z = next() * 2.0 - 1.0;
            let a = next() * std::f32::consts::TAU;
            let s = (1.0 - z * z).sqrt();
            Vec3::new(s * a.cos(), z, s * a.sin())
        })
        .collect()
}

fn body_color(name: &str) -> u32 {
    match name.to_ascii_lowercase().as_str() {
        "sun" => 0xFFFFC040,
        "mercury" => 0xFFA8A8A8,
        "venus" => 0xFFE8C474,
        "earth" => 0xFF3A7BD5,
        "mars" => 0xFFC1440E,
        "jupiter" => 0xFFD8A870,
        "saturn" => 0xFFE3CF90,
        "uranus" => 0xFF9FE3E8,
        "neptune" => 0xFF4062D8,
        other => {
            let h = other.bytes().fold(0u32, |h, b| h.wrapping_mul(31).wrapping_add(b as u32));
            0xFF808080 | (h & 0x007F7F7F)
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b110, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        ';' => [0b000, 0b010, 0b000, 0b010, 0b100],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '^' => [0b010, 0b101, 0b000, 0b000, 0b000],
        '(' => [0b001, 0b010, 0b010, 0b010, 0b001],
        ')' => [0b100, 0b010, 0b010, 0b010, 0b100],
        '\'' => [0b010, 0b010, 0b000, 0b000, 0b000],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _ => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

/// Blend two ARGB colors. `t` = 0.0 → all `a`, `t` = 1.0 → all `b`.
fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |ca: u32, cb: u32| (ca as f32 * (1.0 - t) + cb as f32 * t) as u32;
    let ar = (a >> 16) & 0xFF;
    let br = (b >> 16) & 0xFF;
    let ag = (a >> 8) & 0xFF;
    let bg = (b >> 8) & 0xFF;
    let ab = a & 0xFF;
    let bb = b & 0xFF;
    0xFF000000 | (lerp(ar, br) << 16) | (lerp(ag, bg) << 8) | lerp(ab, bb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_endpoints() {
        assert_eq!(blend(0xFF000000, 0xFFFFFFFF, 0.0), 0xFF000000);
        assert_eq!(blend(0xFF000000, 0xFFFFFFFF, 1.0), 0xFFFFFFFF);
        assert_eq!(blend(0xFF000000, 0xFF0000FF, 2.0), 0xFF0000FF);
    }

    #[test]
    fn scene_rows_are_flipped() {
        assert_eq!(row_of(0.0), Some(WIN_H - 1));
        assert_eq!(row_of(WIN_H as f32 - 0.5), Some(0));
        assert_eq!(row_of(-1.0), None);
        assert_eq!(row_of(WIN_H as f32), None);
    }

    #[test]
    fn stars_are_unit_and_deterministic() {
        let a = star_field(16);
        assert_eq!(a, star_field(16));
        assert!(a.iter().all(|d| (d.length() - 1.0).abs() < 1e-4));
    }

    #[test]
    fn catalogue_bodies_have_colours() {
        assert_eq!(body_color("Earth"), 0xFF3A7BD5);
        assert_eq!(body_color("Pluto"), body_color("pluto"));
    }
}

//! # orrery
//!
//! The exhibit application: a small solar system rendered in a software
//! framebuffer, steered with the hands through [`orbit_rig`].
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   SimInput    ┌──────────────────┐  TrackingFrame  ┌──────────┐
//! │ Visualizer │──────────────▶│ SimGestureSource │───────────────▶ │ FramePump│
//! │  (minifb)  │               │  (pump thread)   │                 └────┬─────┘
//! └─────▲──────┘               └──────────────────┘                      │
//!       │ scene, rig, hud           (or LeapSource with `leap`)          ▼
//!       │                                                      ┌──────────────────┐
//!       └──────────────────────────────────────────────────────│ Exhibit<_, Hud>  │
//!                                                              │  frame + physics │
//!                                                              └────────┬─────────┘
//!                                                                       │ Feedback
//!                                                                       ▼
//!                                                                 Hud ─▶ Chime (midir)
//! ```
//!
//! ## Modules
//!
//! * [`catalog`]: the TOML exhibit file (rig tuning, camera, bodies).
//! * [`sim`]: keyboard and mouse standing in for a hand tracker.
//! * [`hud`]: progress bar and info panel state behind [`orbit_rig::Feedback`].
//! * [`chime`]: MIDI sound cues.
//! * [`visualizer`]: the window.
//! * [`app`]: wiring, the main loop and headless runs.

pub mod catalog;
pub mod sim;
pub mod chime;
pub mod hud;
pub mod visualizer;
pub mod app;

//! MIDI sound cues.
//!
//! Each [`SoundCue`] maps to a short phrase on its own channel.  Notes are
//! switched on immediately and their note-offs are scheduled, then released
//! from [`Chime::tick`], so playing a cue never blocks the frame.

use orbit_rig::SoundCue;
use tracing::{info, warn};

// ════════════════════════════════════════════════════════════════════════════
// MidiOut: abstraction over midir / null
// ════════════════════════════════════════════════════════════════════════════

pub trait MidiOut: Send {
    fn program_change(&mut self, channel: u8, program: u8);
    fn note_on(&mut self, channel: u8, note: u8, velocity: u8);
    fn note_off(&mut self, channel: u8, note: u8);
}

// ── midir backend ─────────────────────────────────────────────────────────

struct MidirOut {
    conn: midir::MidiOutputConnection,
}

impl MidiOut for MidirOut {
    fn program_change(&mut self, channel: u8, program: u8) {
        let _ = self.conn.send(&[0xC0 | (channel & 0x0F), program & 0x7F]);
    }
    fn note_on(&mut self, channel: u8, note: u8, velocity: u8) {
        let _ = self.conn.send(&[0x90 | (channel & 0x0F), note & 0x7F, velocity & 0x7F]);
    }
    fn note_off(&mut self, channel: u8, note: u8) {
        let _ = self.conn.send(&[0x80 | (channel & 0x0F), note & 0x7F, 0]);
    }
}

// ── null backend (no port, headless runs, tests) ──────────────────────────

pub struct NullOut;

impl MidiOut for NullOut {
    fn program_change(&mut self, _ch: u8, _p: u8) {}
    fn note_on(&mut self, _ch: u8, _n: u8, _v: u8) {}
    fn note_off(&mut self, _ch: u8, _n: u8) {}
}

// ════════════════════════════════════════════════════════════════════════════
// open_midi_output: enumerate ports and prefer a softsynth
// ════════════════════════════════════════════════════════════════════════════

/// Open the first usable MIDI output port, or fall back to [`NullOut`].
pub fn open_midi_output() -> Box<dyn MidiOut> {
    let midi_out = match midir::MidiOutput::new("orrery") {
        Ok(m) => m,
        Err(e) => {
            warn!(error = %e, "MIDI init failed; sound cues muted");
            return Box::new(NullOut);
        }
    };

    let ports = midi_out.ports();
    if ports.is_empty() {
        warn!("no MIDI output ports; sound cues muted (try `timidity -iA` or `fluidsynth`)");
        return Box::new(NullOut);
    }

    let port_idx = ports
        .iter()
        .position(|p| {
            midi_out
                .port_name(p)
                .map(|n| {
                    let n = n.to_lowercase();
                    n.contains("fluid") || n.contains("timidity") || n.contains("microsoft") || n.contains("synth")
                })
                .unwrap_or(false)
        })
        .unwrap_or(0);

    let port = &ports[port_idx];
    let name = midi_out.port_name(port).unwrap_or_else(|_| "unknown".to_string());

    match midi_out.connect(port, "orrery-cues") {
        Ok(conn) => {
            info!(port = %name, "MIDI output open");
            Box::new(MidirOut { conn })
        }
        Err(e) => {
            warn!(port = %name, error = %e, "MIDI connect failed; sound cues muted");
            Box::new(NullOut)
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Cue phrases
// ════════════════════════════════════════════════════════════════════════════

const MUSIC_CH: u8 = 0;
const WOOSH_CH: u8 = 1;
const SELECT_CH: u8 = 2;

/// General MIDI programs (0-based): new age pad, seashore, glockenspiel.
const MUSIC_PROGRAM: u8 = 88;
const WOOSH_PROGRAM: u8 = 122;
const SELECT_PROGRAM: u8 = 9;

/// Held for as long as the exhibit runs.
const MUSIC_CHORD: [u8; 3] = [48, 55, 64];

struct Phrase {
    channel: u8,
    velocity: u8,
    /// (note, start offset s, length s)
    notes: &'static [(u8, f32, f32)],
}

const WOOSH: Phrase = Phrase { channel: WOOSH_CH, velocity: 90, notes: &[(60, 0.0, 0.9)] };
const SELECT: Phrase = Phrase {
    channel: SELECT_CH,
    velocity: 100,
    notes: &[(84, 0.0, 0.25), (91, 0.08, 0.35)],
};

#[derive(Debug, Clone, Copy, PartialEq)]
struct Scheduled {
    at: f32,
    channel: u8,
    note: u8,
    on: Option<u8>,
}

// ════════════════════════════════════════════════════════════════════════════
// Chime
// ════════════════════════════════════════════════════════════════════════════

pub struct Chime {
    out: Box<dyn MidiOut>,
    clock: f32,
    queue: Vec<Scheduled>,
    music: bool,
}

impl Chime {
    pub fn new(mut out: Box<dyn MidiOut>) -> Self {
        out.program_change(MUSIC_CH, MUSIC_PROGRAM);
        out.program_change(WOOSH_CH, WOOSH_PROGRAM);
        out.program_change(SELECT_CH, SELECT_PROGRAM);
        Chime { out, clock: 0.0, queue: Vec::new(), music: false }
    }

    /// A chime that never makes a sound.
    pub fn silent() -> Self {
        Self::new(Box::new(NullOut))
    }

    pub fn play(&mut self, cue: SoundCue) {
        match cue {
            SoundCue::Music => {
                if !self.music {
                    self.music = true;
                    for note in MUSIC_CHORD {
                        self.out.note_on(MUSIC_CH, note, 60);
                    }
                }
            }
            SoundCue::Woosh => self.schedule(&WOOSH),
            SoundCue::Select => self.schedule(&SELECT),
        }
    }

    /// Send every note event that has come due.
    pub fn tick(&mut self, dt: f32) {
        self.clock += dt.max(0.0);
        let now = self.clock;
        let mut due: Vec<Scheduled> = Vec::new();
        self.queue.retain(|s| {
            if s.at <= now {
                due.push(*s);
                false
            } else {
                true
            }
        });
        due.sort_by(|a, b| a.at.total_cmp(&b.at));
        for s in due {
            match s.on {
                Some(velocity) => self.out.note_on(s.channel, s.note, velocity),
                None => self.out.note_off(s.channel, s.note),
            }
        }
    }

    /// Note events still waiting.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    fn schedule(&mut self, phrase: &Phrase) {
        for &(note, start, length) in phrase.notes {
            let on = Scheduled { at: self.clock + start, channel: phrase.channel, note, on: Some(phrase.velocity) };
            if start <= 0.0 {
                self.out.note_on(on.channel, note, phrase.velocity);
            } else {
                self.queue.push(on);
            }
            self.queue.push(Scheduled { at: self.clock + start + length, channel: phrase.channel, note, on: None });
        }
    }
}

impl Drop for Chime {
    fn drop(&mut self) {
        for s in self.queue.drain(..) {
            if s.on.is_none() {
                self.out.note_off(s.channel, s.note);
            }
        }
        if self.music {
            for note in MUSIC_CHORD {
                self.out.note_off(MUSIC_CH, note);
            }
        }
    }
}

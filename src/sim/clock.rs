//! Frame clock
//!
//! Turns successive host timestamps (ms) into a per-frame step. Motion is
//! written in "units per nominal 60 Hz frame" and multiplied by `scale`, so
//! speeds are independent of the host's refresh rate.

use crate::consts::{FRAME_MS, MAX_FRAME_MS};

/// Timing for one logical frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    /// Host timestamp (ms)
    pub now: f64,
    /// dt applied to motion, capped
    pub dt_ms: f64,
    /// `dt_ms` in nominal frames
    pub scale: f32,
    /// Difficulty multiplier for this frame
    pub difficulty: f32,
}

impl Step {
    /// A single nominal frame at `now`, difficulty 1.0
    pub fn nominal(now: f64) -> Self {
        Self {
            now,
            dt_ms: FRAME_MS,
            scale: 1.0,
            difficulty: 1.0,
        }
    }

    pub fn with_difficulty(mut self, difficulty: f32) -> Self {
        self.difficulty = difficulty;
        self
    }
}

/// Measures dt between frames and caps it
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Option<f64>,
    max_frame_ms: f64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(MAX_FRAME_MS)
    }
}

impl FrameClock {
    pub fn new(max_frame_ms: f64) -> Self {
        Self {
            last: None,
            max_frame_ms,
        }
    }

    /// Forget the previous timestamp; the next frame counts as one nominal frame
    pub fn reset(&mut self) {
        self.last = None;
    }

    /// Advance to `now`.
    ///
    /// A stalled host (huge dt) moves things at most `max_frame_ms` worth;
    /// a timestamp that goes backwards moves nothing.
    pub fn tick(&mut self, now: f64) -> Step {
        let raw = match self.last {
            Some(last) => (now - last).max(0.0),
            None => FRAME_MS,
        };
        self.last = Some(now);

        let dt_ms = raw.min(self.max_frame_ms);
        Step {
            now,
            dt_ms,
            scale: (dt_ms / FRAME_MS) as f32,
            difficulty: 1.0,
        }
    }
}

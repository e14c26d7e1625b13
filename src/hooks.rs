//! UI collaborator interface
//!
//! The simulation reports elapsed time, score, invincibility and game over
//! through this trait. Every method defaults to a no-op, so hosts implement
//! only what they display.

pub trait UiHooks {
    /// Elapsed time display ("12.3")
    fn report_time(&mut self, _display: &str) {}
    fn report_score(&mut self, _value: u64) {}
    /// Remaining invincibility in ms (0 hides the indicator)
    fn report_invincible(&mut self, _ms_left: f64) {}
    /// Terminal notification, once per run
    fn report_game_over(&mut self, _survival_secs: f64) {}
    /// External clock display control (informational only)
    fn start_clock(&mut self) {}
    fn stop_clock(&mut self) {}
}

/// Hooks that ignore everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHooks;

impl UiHooks for NoopHooks {}

/// Hooks that record every call, for tests and the headless runner
#[derive(Debug, Default, Clone)]
pub struct RecordingHooks {
    pub times: Vec<String>,
    pub scores: Vec<u64>,
    pub invincible: Vec<f64>,
    pub game_overs: Vec<f64>,
    pub clock_starts: u32,
    pub clock_stops: u32,
}

impl RecordingHooks {
    pub fn last_time(&self) -> Option<&str> {
        self.times.last().map(String::as_str)
    }

    pub fn last_score(&self) -> Option<u64> {
        self.scores.last().copied()
    }
}

impl UiHooks for RecordingHooks {
    fn report_time(&mut self, display: &str) {
        self.times.push(display.to_string());
    }

    fn report_score(&mut self, value: u64) {
        self.scores.push(value);
    }

    fn report_invincible(&mut self, ms_left: f64) {
        self.invincible.push(ms_left);
    }

    fn report_game_over(&mut self, survival_secs: f64) {
        self.game_overs.push(survival_secs);
    }

    fn start_clock(&mut self) {
        self.clock_starts += 1;
    }

    fn stop_clock(&mut self) {
        self.clock_stops += 1;
    }
}

//! Avoid Boxes - a dodge-the-falling-hazards arcade game
//!
//! Core modules:
//! - `sim`: Simulation (actor, hazard modes, scoring, collisions, lifecycle)
//! - `render`: Draw-command output consumed by the host's canvas painter
//! - `hooks`: UI collaborator interface (time/score/game-over reporting)
//! - `config`: Startup configuration (surface size, seed, dt cap)

pub mod config;
pub mod hooks;
pub mod render;
pub mod sim;

pub use config::{ConfigError, GameConfig};
pub use hooks::{NoopHooks, UiHooks};
pub use sim::{Game, GamePhase, InputState, ModeKind};

/// Game configuration constants
pub mod consts {
    /// Logical play surface
    pub const SURFACE_WIDTH: f32 = 480.0;
    pub const SURFACE_HEIGHT: f32 = 800.0;

    /// Nominal frame length; all per-frame speeds are expressed against it
    pub const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Largest dt applied to motion in one frame (6 nominal frames)
    pub const MAX_FRAME_MS: f64 = 100.0;

    /// Actor defaults - pinned to the bottom of the surface
    pub const ACTOR_WIDTH: f32 = 40.0;
    pub const ACTOR_HEIGHT: f32 = 20.0;
    /// Horizontal speed (units per nominal frame)
    pub const ACTOR_SPEED: f32 = 5.0;
    pub const ACTOR_BOTTOM_MARGIN: f32 = 16.0;

    /// Difficulty ramps linearly from 1.0 to the cap over this window
    pub const DIFFICULTY_RAMP_MS: f64 = 60_000.0;
    pub const DIFFICULTY_MAX: f32 = 2.2;

    /// Auto score: +1 every half second
    pub const SCORE_TICK_MS: f64 = 500.0;
    /// One coin every 5 seconds while scoring is active
    pub const COIN_DROP_INTERVAL_MS: f64 = 5000.0;
    pub const COIN_SIZE: f32 = 18.0;
    pub const COIN_SPEED: f32 = 3.8;
    pub const COIN_SPEED_JITTER: f32 = 0.8;
    pub const COIN_BONUS: u64 = 10;
    /// Coins are dropped this far below the bottom edge
    pub const COIN_EXIT_MARGIN: f32 = 40.0;

    /// "+10" feedback text
    pub const FLOATER_LIFE_MS: f64 = 650.0;
    pub const FLOATER_RISE: f32 = 36.0;
    pub const FLOATER_OFFSET: f32 = 6.0;

    /// Chaos sub-mode switch cadence
    pub const CHAOS_SWITCH_MS: f64 = 5000.0;
}

/// Time-based difficulty scalar, 1.0 at session start up to `DIFFICULTY_MAX`
#[inline]
pub fn difficulty_multiplier(elapsed_ms: f64) -> f32 {
    use consts::{DIFFICULTY_MAX, DIFFICULTY_RAMP_MS};
    let t = (elapsed_ms.max(0.0) / DIFFICULTY_RAMP_MS).min(1.0) as f32;
    1.0 + (DIFFICULTY_MAX - 1.0) * t
}

/// Survival time display, one decimal place ("12.3")
pub fn format_seconds(secs: f64) -> String {
    format!("{:.1}", secs.max(0.0))
}

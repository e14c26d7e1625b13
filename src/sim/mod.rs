//! Simulation module
//!
//! All gameplay logic lives here. Nothing in this module touches the DOM or
//! reads a real clock:
//! - Time comes in as host timestamps (ms)
//! - Randomness comes from the seeded RNG in `SimContext`
//! - Output is a `DrawList` plus `UiHooks` calls

pub mod autopilot;
pub mod clock;
pub mod game;
pub mod geom;
pub mod modes;
pub mod score;
pub mod state;

pub use autopilot::{Autopilot, Observation};
pub use clock::{FrameClock, Step};
pub use game::{FrameStatus, Game, GameOver, GamePhase, RunToken, SessionSummary};
pub use geom::{Rect, intersects, rotated_aabb};
pub use modes::{ActiveMode, ChaosController, ModeEngine, ModeKind};
pub use score::{ScoreSystem, ScoreTotals};
pub use state::{
    Actor, Coin, FallingBox, FloatingText, Hazard, HazardKind, InputState, Leaf, Meteor,
    RisingBox, SimContext, Telegraph,
};

//! Hazard-generation modes
//!
//! Every mode engine owns its own entity pools and spawn schedule and is
//! driven through [`ModeEngine`]. Chaos is a composite engine that owns one
//! of each of the other four.

pub mod chaos;
pub mod fall;
pub mod leaf;
pub mod meteor;
pub mod up;

use std::fmt;

use serde::{Deserialize, Serialize};

use super::clock::Step;
use super::geom::Rect;
use super::state::{Hazard, HazardKind, SimContext};
use crate::render::DrawList;

pub use chaos::ChaosController;
pub use fall::{DefaultEngine, FallField};
pub use leaf::LeafEngine;
pub use meteor::MeteorEngine;
pub use up::UpEngine;

/// Mode identifier, also used for routing restarts and URL/CLI selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeKind {
    #[default]
    Default,
    Up,
    Meteor,
    Leaf,
    Chaos,
}

impl ModeKind {
    /// The four single modes, in chaos rotation order
    pub const SINGLE: [ModeKind; 4] = [
        ModeKind::Default,
        ModeKind::Leaf,
        ModeKind::Meteor,
        ModeKind::Up,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModeKind::Default => "default",
            ModeKind::Up => "up",
            ModeKind::Meteor => "meteor",
            ModeKind::Leaf => "leaf",
            ModeKind::Chaos => "chaos",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "default" | "" => Some(ModeKind::Default),
            "up" => Some(ModeKind::Up),
            "meteor" => Some(ModeKind::Meteor),
            "leaf" => Some(ModeKind::Leaf),
            "chaos" => Some(ModeKind::Chaos),
            _ => None,
        }
    }
}

impl fmt::Display for ModeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One hazard-generation behavior.
///
/// A frame runs `advance_pools`, then the collision test against the final
/// positions, then `prune`, and spawns only if nothing was hit.
pub trait ModeEngine {
    fn kind(&self) -> ModeKind;

    /// Clear this engine's pools and rebase its spawn schedule at `now`
    fn reset(&mut self, now: f64);

    /// Convert due telegraphs and move every live entity one step
    fn advance_pools(&mut self, ctx: &mut SimContext, step: &Step);

    /// First live hazard overlapping `actor`
    fn first_hit(&self, actor: &Rect) -> Option<HazardKind>;

    /// Retire entities that left the surface
    fn prune(&mut self, ctx: &SimContext, now: f64);

    /// Spawn whatever this mode's schedule says is due
    fn spawn_due(&mut self, ctx: &mut SimContext, step: &Step);

    fn render(&self, draw: &mut DrawList, ctx: &SimContext, now: f64);

    /// Live hazards (telegraphs excluded)
    fn hazard_count(&self) -> usize;

    /// Pending telegraphs
    fn telegraph_count(&self) -> usize {
        0
    }

    /// Hitboxes of every live hazard
    fn hitboxes(&self, out: &mut Vec<Rect>);

    /// Regions announced as dangerous by pending telegraphs
    fn warnings(&self, _ctx: &SimContext, _out: &mut Vec<Rect>) {}

    /// Run one logical frame; returns the hazard that hit the actor, if any
    fn advance(&mut self, ctx: &mut SimContext, step: &Step) -> Option<HazardKind> {
        self.advance_pools(ctx, step);
        let hit = if ctx.is_invincible(step.now) {
            None
        } else {
            self.first_hit(&ctx.actor.rect())
        };
        self.prune(ctx, step.now);
        if hit.is_none() {
            self.spawn_due(ctx, step);
        }
        hit
    }
}

/// First hazard in `pool` overlapping `actor`
pub fn first_hit_in<H: Hazard>(pool: &[H], actor: &Rect) -> Option<HazardKind> {
    pool.iter()
        .find(|h| h.hitbox().intersects(actor))
        .map(|h| h.kind())
}

/// The engine driving the current run
#[derive(Debug, Clone)]
pub enum ActiveMode {
    Default(DefaultEngine),
    Up(UpEngine),
    Meteor(MeteorEngine),
    Leaf(LeafEngine),
    Chaos(Box<ChaosController>),
}

impl ActiveMode {
    /// Fresh engine of the given kind, with empty pools
    pub fn new(kind: ModeKind, now: f64) -> Self {
        let mut mode = match kind {
            ModeKind::Default => ActiveMode::Default(DefaultEngine::new()),
            ModeKind::Up => ActiveMode::Up(UpEngine::new()),
            ModeKind::Meteor => ActiveMode::Meteor(MeteorEngine::new()),
            ModeKind::Leaf => ActiveMode::Leaf(LeafEngine::new()),
            ModeKind::Chaos => ActiveMode::Chaos(Box::new(ChaosController::new())),
        };
        mode.engine_mut().reset(now);
        mode
    }

    pub fn engine(&self) -> &dyn ModeEngine {
        match self {
            ActiveMode::Default(e) => e,
            ActiveMode::Up(e) => e,
            ActiveMode::Meteor(e) => e,
            ActiveMode::Leaf(e) => e,
            ActiveMode::Chaos(e) => e.as_ref(),
        }
    }

    pub fn engine_mut(&mut self) -> &mut dyn ModeEngine {
        match self {
            ActiveMode::Default(e) => e,
            ActiveMode::Up(e) => e,
            ActiveMode::Meteor(e) => e,
            ActiveMode::Leaf(e) => e,
            ActiveMode::Chaos(e) => e.as_mut(),
        }
    }

    pub fn kind(&self) -> ModeKind {
        self.engine().kind()
    }
}

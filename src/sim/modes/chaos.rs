//! Chaos mode: rotates through the four single modes every few seconds
//!
//! Only the selected sub-mode spawns, but every pool keeps moving and
//! colliding, so hazards left over from a previous selection stay deadly
//! until they leave the surface.

use rand::Rng;

use super::fall::DefaultEngine;
use super::leaf::LeafEngine;
use super::meteor::MeteorEngine;
use super::up::UpEngine;
use super::{ModeEngine, ModeKind};
use crate::consts::CHAOS_SWITCH_MS;
use crate::render::DrawList;
use crate::sim::clock::Step;
use crate::sim::geom::Rect;
use crate::sim::state::{HazardKind, SimContext};

/// Pending up-telegraphs chaos keeps topped up while "up" is selected
pub const CHAOS_UP_PENDING: usize = 3;
/// Entities spawned at once when a sub-mode becomes selected
pub const CHAOS_BURST: usize = 2;

#[derive(Debug, Clone)]
pub struct ChaosController {
    falls: DefaultEngine,
    up: UpEngine,
    meteor: MeteorEngine,
    leaf: LeafEngine,
    selected: ModeKind,
    next_switch: f64,
    switches: u32,
}

impl Default for ChaosController {
    fn default() -> Self {
        Self::new()
    }
}

impl ChaosController {
    pub fn new() -> Self {
        Self {
            falls: DefaultEngine::new(),
            up: UpEngine::chaos(),
            meteor: MeteorEngine::lanes_only(),
            leaf: LeafEngine::chaos(),
            selected: ModeKind::Default,
            next_switch: 0.0,
            switches: 0,
        }
    }

    /// Sub-mode currently allowed to spawn
    pub fn selected(&self) -> ModeKind {
        self.selected
    }

    pub fn next_switch_at(&self) -> f64 {
        self.next_switch
    }

    /// Number of sub-mode switches this run
    pub fn switches(&self) -> u32 {
        self.switches
    }

    fn engines(&self) -> [&dyn ModeEngine; 4] {
        [&self.falls, &self.leaf, &self.meteor, &self.up]
    }

    /// Uniform pick among the sub-modes other than the selected one
    fn pick_next(&self, ctx: &mut SimContext) -> ModeKind {
        let others: Vec<ModeKind> = ModeKind::SINGLE
            .into_iter()
            .filter(|m| *m != self.selected)
            .collect();
        others[ctx.rng.random_range(0..others.len())]
    }

    /// Select a different sub-mode and give it a head start
    fn switch(&mut self, ctx: &mut SimContext, step: &Step) {
        let next = self.pick_next(ctx);
        log::debug!("chaos: {} -> {}", self.selected, next);
        self.selected = next;
        self.next_switch = step.now + CHAOS_SWITCH_MS;
        self.switches += 1;

        match next {
            ModeKind::Leaf => {
                for _ in 0..CHAOS_BURST {
                    self.leaf.spawn_leaf(ctx, step.difficulty);
                }
                self.leaf.rebase(step.now);
            }
            ModeKind::Meteor => {
                if self.meteor.is_idle() {
                    self.meteor.spawn_pair(ctx, step.now);
                }
            }
            ModeKind::Up => {
                for _ in 0..CHAOS_BURST {
                    self.up.spawn_telegraph(ctx, step.now);
                }
            }
            ModeKind::Default | ModeKind::Chaos => {}
        }
    }
}

impl ModeEngine for ChaosController {
    fn kind(&self) -> ModeKind {
        ModeKind::Chaos
    }

    fn reset(&mut self, now: f64) {
        self.falls.reset(now);
        self.up.reset(now);
        self.meteor.reset(now);
        self.leaf.reset(now);
        self.selected = ModeKind::Default;
        self.next_switch = now + CHAOS_SWITCH_MS;
        self.switches = 0;
    }

    fn advance_pools(&mut self, ctx: &mut SimContext, step: &Step) {
        self.falls.advance_pools(ctx, step);
        self.leaf.advance_pools(ctx, step);
        self.meteor.advance_pools(ctx, step);
        self.up.advance_pools(ctx, step);
    }

    fn first_hit(&self, actor: &Rect) -> Option<HazardKind> {
        self.engines().into_iter().find_map(|e| e.first_hit(actor))
    }

    fn prune(&mut self, ctx: &SimContext, now: f64) {
        self.falls.prune(ctx, now);
        self.leaf.prune(ctx, now);
        self.meteor.prune(ctx, now);
        self.up.prune(ctx, now);
    }

    fn spawn_due(&mut self, ctx: &mut SimContext, step: &Step) {
        match self.selected {
            ModeKind::Leaf => self.leaf.spawn_due(ctx, step),
            ModeKind::Meteor => {
                if self.meteor.is_idle() {
                    self.meteor.spawn_pair(ctx, step.now);
                }
            }
            ModeKind::Up => {
                if self.up.pending() < CHAOS_UP_PENDING {
                    self.up.spawn_telegraph(ctx, step.now);
                }
            }
            ModeKind::Default | ModeKind::Chaos => {}
        }

        let falls_allowed = matches!(self.selected, ModeKind::Default | ModeKind::Meteor);
        self.falls.field.tick_spawner(ctx, step, falls_allowed);

        if step.now >= self.next_switch {
            self.switch(ctx, step);
        }
    }

    fn render(&self, draw: &mut DrawList, ctx: &SimContext, now: f64) {
        for e in self.engines() {
            e.render(draw, ctx, now);
        }
    }

    fn hazard_count(&self) -> usize {
        self.engines().iter().map(|e| e.hazard_count()).sum()
    }

    fn telegraph_count(&self) -> usize {
        self.engines().iter().map(|e| e.telegraph_count()).sum()
    }

    fn hitboxes(&self, out: &mut Vec<Rect>) {
        for e in self.engines() {
            e.hitboxes(out);
        }
    }

    fn warnings(&self, ctx: &SimContext, out: &mut Vec<Rect>) {
        for e in self.engines() {
            e.warnings(ctx, out);
        }
    }
}

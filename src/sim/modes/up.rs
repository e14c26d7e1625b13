//! Up mode: boxes rise from the bottom edge after a beam warns of them

use rand::Rng;

use super::{ModeEngine, ModeKind, first_hit_in};
use crate::render::{DrawCmd, DrawList, Rgba, colors};
use crate::sim::clock::Step;
use crate::sim::geom::Rect;
use crate::sim::state::{Hazard, HazardKind, RisingBox, SimContext, Telegraph, take_due};

pub const UP_SPAWN_MS: f64 = 600.0;
pub const UP_MAX_PENDING: usize = 4;
pub const UP_TELEGRAPH_WIDTH: f32 = 40.0;
/// Extra random width for chaos-mode telegraphs
pub const UP_CHAOS_WIDTH_JITTER: f32 = 20.0;
pub const UP_DELAY_MIN_MS: f64 = 1_000.0;
pub const UP_DELAY_JITTER_MS: f64 = 1_000.0;
pub const RISER_HEIGHT: f32 = 20.0;
pub const RISER_MIN_SPEED: f32 = 2.0;
pub const RISER_SPEED_JITTER: f32 = 2.0;
/// Beams never grow taller than this
pub const BEAM_MAX_HEIGHT: f32 = 300.0;
pub const BEAM_HEIGHT_RATIO: f32 = 0.48;

#[derive(Debug, Clone)]
pub struct UpEngine {
    telegraphs: Vec<Telegraph>,
    risers: Vec<RisingBox>,
    last_spawn: f64,
    width_jitter: f32,
    /// Fixed riser color; random per riser when unset
    tint: Option<Rgba>,
}

impl Default for UpEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl UpEngine {
    pub fn new() -> Self {
        Self {
            telegraphs: Vec::new(),
            risers: Vec::new(),
            last_spawn: 0.0,
            width_jitter: 0.0,
            tint: None,
        }
    }

    /// Variant used inside chaos: wider random beams, orange risers
    pub fn chaos() -> Self {
        Self {
            width_jitter: UP_CHAOS_WIDTH_JITTER,
            tint: Some(colors::CHAOS_RISER),
            ..Self::new()
        }
    }

    pub fn pending(&self) -> usize {
        self.telegraphs.len()
    }

    pub fn telegraphs(&self) -> &[Telegraph] {
        &self.telegraphs
    }

    pub fn risers(&self) -> &[RisingBox] {
        &self.risers
    }

    pub fn push_riser(&mut self, riser: RisingBox) {
        self.risers.push(riser);
    }

    /// Schedule one beam at a random x with a 1-2 s delay
    pub fn spawn_telegraph(&mut self, ctx: &mut SimContext, now: f64) {
        let width = UP_TELEGRAPH_WIDTH + ctx.rng.random::<f32>() * self.width_jitter;
        let x = (ctx.rng.random::<f32>() * (ctx.width() - width)).max(0.0);
        let delay = UP_DELAY_MIN_MS + ctx.rng.random::<f64>() * UP_DELAY_JITTER_MS;
        self.telegraphs.push(Telegraph {
            x,
            width,
            created: now,
            delay,
        });
    }

    fn launch(&mut self, ctx: &mut SimContext, t: &Telegraph, difficulty: f32) {
        let speed =
            (RISER_MIN_SPEED + ctx.rng.random::<f32>() * RISER_SPEED_JITTER) * difficulty;
        let color = match self.tint {
            Some(c) => c,
            None => Rgba::random_light(&mut ctx.rng),
        };
        self.risers.push(RisingBox::new(
            Rect::new(t.x, ctx.height() - RISER_HEIGHT, t.width, RISER_HEIGHT),
            speed,
            color,
        ));
    }
}

impl ModeEngine for UpEngine {
    fn kind(&self) -> ModeKind {
        ModeKind::Up
    }

    fn reset(&mut self, now: f64) {
        self.telegraphs.clear();
        self.risers.clear();
        self.last_spawn = now;
    }

    fn advance_pools(&mut self, ctx: &mut SimContext, step: &Step) {
        for t in take_due(&mut self.telegraphs, step.now) {
            self.launch(ctx, &t, step.difficulty);
        }
        for r in &mut self.risers {
            r.advance(step);
        }
    }

    fn first_hit(&self, actor: &Rect) -> Option<HazardKind> {
        first_hit_in(&self.risers, actor)
    }

    fn prune(&mut self, _ctx: &SimContext, _now: f64) {
        self.risers.retain(|r| r.rect.bottom() >= 0.0);
    }

    fn spawn_due(&mut self, ctx: &mut SimContext, step: &Step) {
        // the cadence ticks even while the pending cap skips a beam
        if step.now - self.last_spawn >= UP_SPAWN_MS {
            if self.pending() < UP_MAX_PENDING {
                self.spawn_telegraph(ctx, step.now);
            }
            self.last_spawn = step.now;
        }
    }

    fn render(&self, draw: &mut DrawList, ctx: &SimContext, now: f64) {
        let height = (ctx.height() * BEAM_HEIGHT_RATIO).min(BEAM_MAX_HEIGHT);
        for t in &self.telegraphs {
            draw.push(DrawCmd::Beam {
                x: t.x,
                width: t.width,
                bottom: ctx.height() - 1.0,
                height,
                alpha: t.beam_alpha(now),
            });
        }
        for r in &self.risers {
            draw.rect(r.rect, r.color);
        }
    }

    fn hazard_count(&self) -> usize {
        self.risers.len()
    }

    fn telegraph_count(&self) -> usize {
        self.telegraphs.len()
    }

    fn hitboxes(&self, out: &mut Vec<Rect>) {
        out.extend(self.risers.iter().map(|r| r.hitbox()));
    }

    /// The column above each pending beam
    fn warnings(&self, ctx: &SimContext, out: &mut Vec<Rect>) {
        out.extend(
            self.telegraphs
                .iter()
                .map(|t| Rect::new(t.x, 0.0, t.width, ctx.height())),
        );
    }
}

//! Leaf mode: tilted rectangles flutter down on a jittered cadence

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use super::{ModeEngine, ModeKind, first_hit_in};
use crate::render::{DrawCmd, DrawList, Rgba, colors};
use crate::sim::clock::Step;
use crate::sim::geom::Rect;
use crate::sim::state::{Hazard, HazardKind, Leaf, SimContext};

/// Gap before the first leaf of a run
pub const LEAF_FIRST_GAP_MS: f64 = 420.0;
pub const LEAF_GAP_MIN_MS: f64 = 360.0;
pub const LEAF_GAP_JITTER_MS: f64 = 180.0;
pub const LEAF_MIN_WIDTH: f32 = 32.0;
pub const LEAF_WIDTH_STEPS: f32 = 14.0;
pub const LEAF_MIN_HEIGHT: f32 = 14.0;
pub const LEAF_HEIGHT_STEPS: f32 = 8.0;
/// Spawn clearance above the top edge
pub const LEAF_SPAWN_CLEARANCE: f32 = 6.0;
/// How far past an edge a leaf may wander before it is dropped
pub const LEAF_EXIT_MARGIN: f32 = 100.0;
pub const LEAF_FLOOR_MARGIN: f32 = 40.0;

const WAVE_RATE_MIN: f32 = 0.006;
const WAVE_RATE_JITTER: f32 = 0.007;
const CHAOS_WAVE_RATE_JITTER: f32 = 0.006;

#[derive(Debug, Clone)]
pub struct LeafEngine {
    leaves: Vec<Leaf>,
    last_spawn: f64,
    /// Current gap until the next spawn
    gap: f64,
    wave_rate_jitter: f32,
    /// Fixed leaf color; random per leaf when unset
    tint: Option<Rgba>,
}

impl Default for LeafEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LeafEngine {
    pub fn new() -> Self {
        Self {
            leaves: Vec::new(),
            last_spawn: 0.0,
            gap: LEAF_FIRST_GAP_MS,
            wave_rate_jitter: WAVE_RATE_JITTER,
            tint: None,
        }
    }

    /// Variant used inside chaos: blue leaves, slightly narrower wave band
    pub fn chaos() -> Self {
        Self {
            wave_rate_jitter: CHAOS_WAVE_RATE_JITTER,
            tint: Some(colors::CHAOS_LEAF),
            ..Self::new()
        }
    }

    pub fn leaves(&self) -> &[Leaf] {
        &self.leaves
    }

    /// Restart the spawn gap at `now`
    pub fn rebase(&mut self, now: f64) {
        self.last_spawn = now;
    }

    /// One leaf just above the top edge; fall speeds scale with `difficulty`
    pub fn spawn_leaf(&mut self, ctx: &mut SimContext, difficulty: f32) {
        let rng = &mut ctx.rng;
        let w = LEAF_MIN_WIDTH + (rng.random::<f32>() * LEAF_WIDTH_STEPS).floor();
        let h = LEAF_MIN_HEIGHT + (rng.random::<f32>() * LEAF_HEIGHT_STEPS).floor();
        let base_x = rng.random::<f32>() * (ctx.surface.x - w).max(0.0);

        let sign = if rng.random_bool(0.5) { -1.0 } else { 1.0 };
        let drift = sign * (0.10 + rng.random::<f32>() * 0.20);
        let wave_amp = 22.0 + rng.random::<f32>() * 38.0;
        let wave_rate = WAVE_RATE_MIN + rng.random::<f32>() * self.wave_rate_jitter;
        let wave_phase = rng.random::<f32>() * TAU;
        let gravity = (0.35 + rng.random::<f32>() * 0.25) * difficulty;
        let terminal = (3.2 + rng.random::<f32>() * 1.8) * difficulty;
        let tilt_amp = 0.25 + rng.random::<f32>() * 0.55;
        let tilt_rate = 0.006 + rng.random::<f32>() * 0.007;
        let tilt_phase = rng.random::<f32>() * TAU;
        let color = match self.tint {
            Some(c) => c,
            None => Rgba::random_light(rng),
        };

        let pos = Vec2::new(base_x, -h - LEAF_SPAWN_CLEARANCE);
        self.leaves.push(Leaf {
            pos,
            size: Vec2::new(w, h),
            base_x,
            drift,
            wave_amp,
            wave_rate,
            wave_phase,
            vy: 0.0,
            gravity,
            terminal,
            tilt_amp,
            tilt_rate,
            tilt_phase,
            age: 0.0,
            angle: 0.0,
            prev_pos: pos,
            prev_angle: 0.0,
            color,
        });
    }
}

impl ModeEngine for LeafEngine {
    fn kind(&self) -> ModeKind {
        ModeKind::Leaf
    }

    fn reset(&mut self, now: f64) {
        self.leaves.clear();
        self.last_spawn = now;
        self.gap = LEAF_FIRST_GAP_MS;
    }

    fn advance_pools(&mut self, _ctx: &mut SimContext, step: &Step) {
        for leaf in &mut self.leaves {
            leaf.advance(step);
        }
    }

    fn first_hit(&self, actor: &Rect) -> Option<HazardKind> {
        first_hit_in(&self.leaves, actor)
    }

    fn prune(&mut self, ctx: &SimContext, _now: f64) {
        let (w, h) = (ctx.width(), ctx.height());
        self.leaves.retain(|l| {
            l.pos.y <= h + LEAF_FLOOR_MARGIN
                && l.pos.x >= -LEAF_EXIT_MARGIN
                && l.pos.x <= w + LEAF_EXIT_MARGIN
        });
    }

    fn spawn_due(&mut self, ctx: &mut SimContext, step: &Step) {
        if step.now - self.last_spawn >= self.gap {
            self.spawn_leaf(ctx, step.difficulty);
            self.last_spawn = step.now;
            self.gap = LEAF_GAP_MIN_MS + ctx.rng.random::<f64>() * LEAF_GAP_JITTER_MS;
        }
    }

    fn render(&self, draw: &mut DrawList, _ctx: &SimContext, _now: f64) {
        for l in &self.leaves {
            draw.push(DrawCmd::RotatedRect {
                center: l.center(),
                size: l.size,
                angle: l.angle,
                color: l.color,
            });
        }
    }

    fn hazard_count(&self) -> usize {
        self.leaves.len()
    }

    fn hitboxes(&self, out: &mut Vec<Rect>) {
        out.extend(self.leaves.iter().map(|l| l.hitbox()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use proptest::prelude::*;

    fn ctx(seed: u64) -> SimContext {
        SimContext::new(Vec2::new(SURFACE_WIDTH, SURFACE_HEIGHT), seed)
    }

    #[test]
    fn test_first_leaf_after_initial_gap() {
        let mut ctx = ctx(1);
        let mut engine = LeafEngine::new();
        engine.reset(1_000.0);
        engine.spawn_due(&mut ctx, &Step::nominal(1_419.0));
        assert_eq!(engine.hazard_count(), 0);
        engine.spawn_due(&mut ctx, &Step::nominal(1_420.0));
        assert_eq!(engine.hazard_count(), 1);
        assert!(engine.gap >= LEAF_GAP_MIN_MS && engine.gap < LEAF_GAP_MIN_MS + LEAF_GAP_JITTER_MS);
    }

    #[test]
    fn test_leaf_pruned_when_it_drifts_away() {
        let mut ctx = ctx(2);
        let mut engine = LeafEngine::new();
        engine.spawn_leaf(&mut ctx, 1.0);
        engine.leaves[0].base_x = -500.0;
        engine.advance_pools(&mut ctx, &Step::nominal(0.0));
        engine.prune(&ctx, 0.0);
        assert_eq!(engine.hazard_count(), 0);
    }

    #[test]
    fn test_chaos_leaves_are_blue() {
        let mut ctx = ctx(3);
        let mut engine = LeafEngine::chaos();
        engine.spawn_leaf(&mut ctx, 1.0);
        assert_eq!(engine.leaves()[0].color, colors::CHAOS_LEAF);
    }

    #[test]
    fn test_render_emits_rotated_rects() {
        let mut ctx = ctx(4);
        let mut engine = LeafEngine::new();
        engine.spawn_leaf(&mut ctx, 1.0);
        engine.spawn_leaf(&mut ctx, 1.0);
        let mut draw = DrawList::new();
        engine.render(&mut draw, &ctx, 0.0);
        assert_eq!(draw.count(|c| matches!(c, DrawCmd::RotatedRect { .. })), 2);
    }

    proptest! {
        #[test]
        fn prop_spawn_parameters_in_range(seed in any::<u64>(), difficulty in 1.0f32..=DIFFICULTY_MAX) {
            let mut ctx = ctx(seed);
            let mut engine = LeafEngine::new();
            engine.spawn_leaf(&mut ctx, difficulty);
            let l = &engine.leaves()[0];
            prop_assert!((32.0..=45.0).contains(&l.size.x));
            prop_assert!((14.0..=21.0).contains(&l.size.y));
            prop_assert_eq!(l.pos.y, -l.size.y - LEAF_SPAWN_CLEARANCE);
            prop_assert!(l.base_x >= 0.0 && l.base_x + l.size.x <= SURFACE_WIDTH);
            prop_assert!((0.10..=0.30).contains(&l.drift.abs()));
            prop_assert!((22.0..=60.0).contains(&l.wave_amp));
            prop_assert!((0.006..=0.013).contains(&l.wave_rate));
            prop_assert!(l.gravity >= 0.35 * difficulty - 1e-4 && l.gravity <= 0.60 * difficulty + 1e-4);
            prop_assert!(l.terminal >= 3.2 * difficulty - 1e-4 && l.terminal <= 5.0 * difficulty + 1e-4);
            prop_assert!((0.25..=0.80).contains(&l.tilt_amp));
        }
    }
}

//! Default mode: plain boxes falling at a steady cadence

use rand::Rng;

use super::{ModeEngine, ModeKind, first_hit_in};
use crate::render::{DrawList, Rgba};
use crate::sim::clock::Step;
use crate::sim::geom::Rect;
use crate::sim::state::{FallingBox, Hazard, HazardKind, SimContext};

/// Nominal frames between spawns
pub const BOX_SPAWN_FRAMES: f32 = 30.0;
pub const BOX_WIDTH: f32 = 40.0;
pub const BOX_HEIGHT: f32 = 20.0;
pub const BOX_MIN_SPEED: f32 = 2.0;
pub const BOX_SPEED_JITTER: f32 = 2.0;

/// Pool of falling boxes plus its frame-count spawner.
///
/// Also used as the escort stream in meteor mode and the shared falling
/// stream in chaos.
#[derive(Debug, Clone, Default)]
pub struct FallField {
    boxes: Vec<FallingBox>,
    /// Nominal frames since the last spawn
    frames: f32,
}

impl FallField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.boxes.clear();
        self.frames = 0.0;
    }

    pub fn boxes(&self) -> &[FallingBox] {
        &self.boxes
    }

    pub fn push_box(&mut self, b: FallingBox) {
        self.boxes.push(b);
    }

    pub fn advance(&mut self, step: &Step) {
        for b in &mut self.boxes {
            b.advance(step);
        }
    }

    pub fn first_hit(&self, actor: &Rect) -> Option<HazardKind> {
        first_hit_in(&self.boxes, actor)
    }

    /// Drop boxes whose top edge passed the bottom
    pub fn prune(&mut self, height: f32) {
        self.boxes.retain(|b| b.rect.top() <= height);
    }

    /// Count nominal frames; when `allowed`, spawn one box per full interval.
    /// The counter keeps running while spawning is suppressed.
    pub fn tick_spawner(&mut self, ctx: &mut SimContext, step: &Step, allowed: bool) {
        self.frames += step.scale;
        while self.frames >= BOX_SPAWN_FRAMES {
            self.frames -= BOX_SPAWN_FRAMES;
            if allowed {
                self.spawn_box(ctx);
            }
        }
    }

    /// One box at a random x above the top edge
    pub fn spawn_box(&mut self, ctx: &mut SimContext) {
        let x = ctx.rng.random::<f32>() * (ctx.width() - BOX_WIDTH).max(0.0);
        let speed = BOX_MIN_SPEED + ctx.rng.random::<f32>() * BOX_SPEED_JITTER;
        let color = Rgba::random_light(&mut ctx.rng);
        self.boxes.push(FallingBox {
            rect: Rect::new(x, -BOX_HEIGHT, BOX_WIDTH, BOX_HEIGHT),
            speed,
            color,
        });
    }

    pub fn render(&self, draw: &mut DrawList) {
        for b in &self.boxes {
            draw.rect(b.rect, b.color);
        }
    }

    pub fn hitboxes(&self, out: &mut Vec<Rect>) {
        out.extend(self.boxes.iter().map(|b| b.hitbox()));
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct DefaultEngine {
    pub field: FallField,
}

impl DefaultEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ModeEngine for DefaultEngine {
    fn kind(&self) -> ModeKind {
        ModeKind::Default
    }

    fn reset(&mut self, _now: f64) {
        self.field.clear();
    }

    fn advance_pools(&mut self, _ctx: &mut SimContext, step: &Step) {
        self.field.advance(step);
    }

    fn first_hit(&self, actor: &Rect) -> Option<HazardKind> {
        self.field.first_hit(actor)
    }

    fn prune(&mut self, ctx: &SimContext, _now: f64) {
        self.field.prune(ctx.height());
    }

    fn spawn_due(&mut self, ctx: &mut SimContext, step: &Step) {
        self.field.tick_spawner(ctx, step, true);
    }

    fn render(&self, draw: &mut DrawList, _ctx: &SimContext, _now: f64) {
        self.field.render(draw);
    }

    fn hazard_count(&self) -> usize {
        self.field.len()
    }

    fn hitboxes(&self, out: &mut Vec<Rect>) {
        self.field.hitboxes(out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use glam::Vec2;

    fn ctx() -> SimContext {
        SimContext::new(Vec2::new(SURFACE_WIDTH, SURFACE_HEIGHT), 11)
    }

    #[test]
    fn test_spawns_every_thirty_frames() {
        let mut ctx = ctx();
        // keep the actor out of the way
        ctx.invincible_until = f64::INFINITY;
        let mut engine = DefaultEngine::new();
        engine.reset(0.0);
        for i in 1..=29 {
            engine.advance(&mut ctx, &Step::nominal(i as f64 * FRAME_MS));
        }
        assert_eq!(engine.hazard_count(), 0);
        engine.advance(&mut ctx, &Step::nominal(30.0 * FRAME_MS));
        assert_eq!(engine.hazard_count(), 1);
        for i in 31..=90 {
            engine.advance(&mut ctx, &Step::nominal(i as f64 * FRAME_MS));
        }
        assert_eq!(engine.hazard_count(), 3);
    }

    #[test]
    fn test_spawn_parameters() {
        let mut ctx = ctx();
        let mut field = FallField::new();
        for _ in 0..200 {
            field.spawn_box(&mut ctx);
        }
        for b in field.boxes() {
            assert_eq!(b.rect.size, Vec2::new(BOX_WIDTH, BOX_HEIGHT));
            assert_eq!(b.rect.top(), -BOX_HEIGHT);
            assert!(b.rect.left() >= 0.0 && b.rect.right() <= SURFACE_WIDTH);
            assert!((BOX_MIN_SPEED..BOX_MIN_SPEED + BOX_SPEED_JITTER).contains(&b.speed));
        }
    }

    #[test]
    fn test_suppressed_spawner_keeps_counting() {
        let mut ctx = ctx();
        let mut field = FallField::new();
        for i in 0..45 {
            field.tick_spawner(&mut ctx, &Step::nominal(i as f64), false);
        }
        assert!(field.is_empty());
        // 15 more frames complete the second interval
        for i in 0..15 {
            field.tick_spawner(&mut ctx, &Step::nominal(i as f64), true);
        }
        assert_eq!(field.len(), 1);
    }

    #[test]
    fn test_box_hits_actor_and_blocks_spawn() {
        let mut ctx = ctx();
        let actor = ctx.actor.rect();
        let mut engine = DefaultEngine::new();
        engine.field.push_box(FallingBox {
            rect: Rect::new(actor.left(), actor.top() - 20.0, 40.0, 20.0),
            speed: 3.0,
            color: Rgba::rgb(200, 100, 100),
        });
        engine.field.frames = BOX_SPAWN_FRAMES - 1.0;
        let hit = engine.advance(&mut ctx, &Step::nominal(0.0));
        assert_eq!(hit, Some(HazardKind::FallingBox));
        assert_eq!(engine.hazard_count(), 1);
    }

    #[test]
    fn test_box_pruned_below_surface() {
        let mut ctx = ctx();
        ctx.actor.pos.x = 0.0;
        let mut engine = DefaultEngine::new();
        engine.field.push_box(FallingBox {
            rect: Rect::new(400.0, SURFACE_HEIGHT - 1.0, 40.0, 20.0),
            speed: 2.0,
            color: Rgba::rgb(200, 100, 100),
        });
        engine.advance(&mut ctx, &Step::nominal(0.0));
        assert_eq!(engine.hazard_count(), 0);
    }
}

//! Meteor mode: wide lanes charge up, then a very fast slab drops down each

use rand::Rng;

use super::fall::FallField;
use super::{ModeEngine, ModeKind, first_hit_in};
use crate::render::{DrawCmd, DrawList, colors};
use crate::sim::clock::Step;
use crate::sim::geom::Rect;
use crate::sim::state::{Hazard, HazardKind, Meteor, SimContext, Telegraph, take_due};

pub const LANE_MIN_WIDTH: f32 = 120.0;
pub const LANE_WIDTH_JITTER: f32 = 60.0;
/// Time for a lane to fully charge before its meteor drops
pub const LANE_FILL_MS: f64 = 2_000.0;
/// Lanes whose centers are closer than this fraction of the wider one get re-rolled
pub const LANE_SEPARATION: f32 = 0.6;
pub const METEOR_MIN_HEIGHT: f32 = 26.0;
pub const METEOR_HEIGHT_RATIO: f32 = 0.18;
pub const METEOR_MIN_SPEED: f32 = 42.0;
pub const METEOR_SPEED_JITTER: f32 = 24.0;
/// Quiet period after the last meteor leaves before the next pair
pub const METEOR_COOLDOWN_MS: f64 = 3_000.0;
pub const METEOR_TAIL_GAP: f32 = 12.0;
pub const METEOR_TAIL_HEIGHT: f32 = 10.0;

#[derive(Debug, Clone)]
pub struct MeteorEngine {
    lanes: Vec<Telegraph>,
    meteors: Vec<Meteor>,
    /// When the last meteor left the surface
    last_impact: f64,
    /// Plain falling boxes that accompany standalone meteor mode
    escort: Option<FallField>,
}

impl Default for MeteorEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MeteorEngine {
    pub fn new() -> Self {
        Self {
            lanes: Vec::new(),
            meteors: Vec::new(),
            last_impact: f64::NEG_INFINITY,
            escort: Some(FallField::new()),
        }
    }

    /// Lanes and meteors only; chaos supplies its own falling stream
    pub fn lanes_only() -> Self {
        Self {
            escort: None,
            ..Self::new()
        }
    }

    pub fn lanes(&self) -> &[Telegraph] {
        &self.lanes
    }

    pub fn meteors(&self) -> &[Meteor] {
        &self.meteors
    }

    pub fn escort(&self) -> Option<&FallField> {
        self.escort.as_ref()
    }

    pub fn last_impact(&self) -> f64 {
        self.last_impact
    }

    /// No lane charging and no meteor in flight
    pub fn is_idle(&self) -> bool {
        self.lanes.is_empty() && self.meteors.is_empty()
    }

    fn roll_lane(ctx: &mut SimContext, now: f64) -> Telegraph {
        let width = (LANE_MIN_WIDTH + ctx.rng.random::<f32>() * LANE_WIDTH_JITTER).floor();
        let room = (ctx.width() - width).max(0.0);
        let x = (ctx.rng.random::<f32>() * room).floor().clamp(0.0, room);
        Telegraph {
            x,
            width,
            created: now,
            delay: LANE_FILL_MS,
        }
    }

    fn too_close(a: &Telegraph, b: &Telegraph) -> bool {
        (a.center_x() - b.center_x()).abs() < a.width.max(b.width) * LANE_SEPARATION
    }

    /// Schedule two lanes; the second is re-rolled once if it crowds the first
    pub fn spawn_pair(&mut self, ctx: &mut SimContext, now: f64) {
        let first = Self::roll_lane(ctx, now);
        let mut second = Self::roll_lane(ctx, now);
        if Self::too_close(&first, &second) {
            second = Self::roll_lane(ctx, now);
        }
        self.lanes.push(first);
        self.lanes.push(second);
    }

    fn drop_meteor(&mut self, ctx: &mut SimContext, lane: &Telegraph, difficulty: f32) {
        let height = METEOR_MIN_HEIGHT.max((lane.width * METEOR_HEIGHT_RATIO).round());
        let speed =
            (METEOR_MIN_SPEED + ctx.rng.random::<f32>() * METEOR_SPEED_JITTER) * difficulty;
        self.meteors.push(Meteor {
            rect: Rect::new(lane.x, -height, lane.width, height),
            prev_y: -height,
            speed,
        });
    }
}

impl ModeEngine for MeteorEngine {
    fn kind(&self) -> ModeKind {
        ModeKind::Meteor
    }

    /// The first pair is due immediately
    fn reset(&mut self, now: f64) {
        self.lanes.clear();
        self.meteors.clear();
        self.last_impact = now - METEOR_COOLDOWN_MS;
        if let Some(escort) = &mut self.escort {
            escort.clear();
        }
    }

    fn advance_pools(&mut self, ctx: &mut SimContext, step: &Step) {
        for lane in take_due(&mut self.lanes, step.now) {
            self.drop_meteor(ctx, &lane, step.difficulty);
        }
        for m in &mut self.meteors {
            m.advance(step);
        }
        if let Some(escort) = &mut self.escort {
            escort.advance(step);
        }
    }

    fn first_hit(&self, actor: &Rect) -> Option<HazardKind> {
        first_hit_in(&self.meteors, actor)
            .or_else(|| self.escort.as_ref().and_then(|e| e.first_hit(actor)))
    }

    fn prune(&mut self, ctx: &SimContext, now: f64) {
        let before = self.meteors.len();
        let floor = ctx.height();
        self.meteors.retain(|m| m.rect.top() < floor);
        if self.meteors.len() < before {
            self.last_impact = now;
        }
        if let Some(escort) = &mut self.escort {
            escort.prune(floor);
        }
    }

    fn spawn_due(&mut self, ctx: &mut SimContext, step: &Step) {
        if self.is_idle() && step.now - self.last_impact >= METEOR_COOLDOWN_MS {
            self.spawn_pair(ctx, step.now);
        }
        if let Some(escort) = &mut self.escort {
            escort.tick_spawner(ctx, step, true);
        }
    }

    fn render(&self, draw: &mut DrawList, ctx: &SimContext, now: f64) {
        for lane in &self.lanes {
            draw.push(DrawCmd::Lane {
                x: lane.x,
                width: lane.width,
                height: ctx.height(),
                fill: lane.progress(now),
            });
        }
        if let Some(escort) = &self.escort {
            escort.render(draw);
        }
        for m in &self.meteors {
            let r = m.rect;
            draw.rect(
                Rect::new(r.left(), r.top() - METEOR_TAIL_GAP, r.size.x, METEOR_TAIL_HEIGHT),
                colors::METEOR_TAIL,
            );
            draw.rect(r, colors::METEOR);
        }
    }

    fn hazard_count(&self) -> usize {
        self.meteors.len() + self.escort.as_ref().map_or(0, |e| e.len())
    }

    fn telegraph_count(&self) -> usize {
        self.lanes.len()
    }

    fn hitboxes(&self, out: &mut Vec<Rect>) {
        out.extend(self.meteors.iter().map(|m| m.hitbox()));
        if let Some(escort) = &self.escort {
            escort.hitboxes(out);
        }
    }

    fn warnings(&self, ctx: &SimContext, out: &mut Vec<Rect>) {
        out.extend(
            self.lanes
                .iter()
                .map(|l| Rect::new(l.x, 0.0, l.width, ctx.height())),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use glam::Vec2;

    fn ctx() -> SimContext {
        SimContext::new(Vec2::new(SURFACE_WIDTH, SURFACE_HEIGHT), 5)
    }

    #[test]
    fn test_first_pair_scheduled_immediately() {
        let mut ctx = ctx();
        let mut engine = MeteorEngine::new();
        engine.reset(10_000.0);
        engine.spawn_due(&mut ctx, &Step::nominal(10_000.0));
        assert_eq!(engine.telegraph_count(), 2);
        // no second pair while lanes are live
        engine.spawn_due(&mut ctx, &Step::nominal(10_016.0));
        assert_eq!(engine.telegraph_count(), 2);
    }

    #[test]
    fn test_lane_geometry() {
        let mut ctx = ctx();
        let mut engine = MeteorEngine::lanes_only();
        for _ in 0..100 {
            engine.spawn_pair(&mut ctx, 0.0);
        }
        for lane in engine.lanes() {
            assert!(lane.width >= LANE_MIN_WIDTH && lane.width < LANE_MIN_WIDTH + LANE_WIDTH_JITTER);
            assert_eq!(lane.width, lane.width.floor());
            assert!(lane.x >= 0.0 && lane.x + lane.width <= SURFACE_WIDTH);
            assert_eq!(lane.delay, LANE_FILL_MS);
        }
    }

    #[test]
    fn test_meteor_drops_when_lane_fills() {
        let mut ctx = ctx();
        let mut engine = MeteorEngine::lanes_only();
        engine.lanes.push(Telegraph {
            x: 0.0,
            width: 150.0,
            created: 0.0,
            delay: LANE_FILL_MS,
        });
        engine.advance_pools(&mut ctx, &Step::nominal(1_999.0));
        assert!(engine.meteors().is_empty());
        engine.advance_pools(&mut ctx, &Step::nominal(2_000.0));
        assert_eq!(engine.meteors().len(), 1);
        assert_eq!(engine.telegraph_count(), 0);
        let m = &engine.meteors()[0];
        assert_eq!(m.rect.size, Vec2::new(150.0, 27.0));
        assert_eq!(m.prev_y, -27.0);
        assert!(m.speed >= METEOR_MIN_SPEED);
    }

    #[test]
    fn test_cooldown_after_impact() {
        let mut ctx = ctx();
        ctx.actor.pos.x = SURFACE_WIDTH - ACTOR_WIDTH;
        let mut engine = MeteorEngine::lanes_only();
        engine.reset(0.0);
        engine.meteors.push(Meteor {
            rect: Rect::new(0.0, SURFACE_HEIGHT - 30.0, 120.0, 26.0),
            prev_y: SURFACE_HEIGHT - 80.0,
            speed: 50.0,
        });
        let hit = engine.advance(&mut ctx, &Step::nominal(5_000.0));
        assert_eq!(hit, None);
        assert!(engine.meteors().is_empty());
        assert_eq!(engine.last_impact(), 5_000.0);

        engine.spawn_due(&mut ctx, &Step::nominal(7_999.0));
        assert!(engine.is_idle());
        engine.spawn_due(&mut ctx, &Step::nominal(8_000.0));
        assert_eq!(engine.telegraph_count(), 2);
    }

    #[test]
    fn test_fast_meteor_cannot_tunnel_through_actor() {
        let mut ctx = ctx();
        let actor = ctx.actor.rect();
        let mut engine = MeteorEngine::lanes_only();
        // one step carries it from above the actor to off the surface
        engine.meteors.push(Meteor {
            rect: Rect::new(actor.left() - 10.0, actor.top() - 40.0, 120.0, 26.0),
            prev_y: actor.top() - 100.0,
            speed: 100.0,
        });
        let hit = engine.advance(&mut ctx, &Step::nominal(0.0));
        assert_eq!(hit, Some(HazardKind::Meteor));
    }

    #[test]
    fn test_escort_boxes_fall_in_standalone() {
        let mut ctx = ctx();
        ctx.invincible_until = f64::INFINITY;
        let mut engine = MeteorEngine::new();
        engine.reset(0.0);
        for i in 1..=30 {
            engine.advance(&mut ctx, &Step::nominal(i as f64 * FRAME_MS));
        }
        assert_eq!(engine.escort().map(|e| e.len()), Some(1));
        assert!(MeteorEngine::lanes_only().escort().is_none());
    }
}

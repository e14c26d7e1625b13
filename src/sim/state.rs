//! Simulation context and entity types
//!
//! `SimContext` is the state every mode engine shares (surface, actor, RNG,
//! session timing). Hazard pools are owned by the engines themselves.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::clock::Step;
use super::geom::{Rect, rotated_aabb};
use crate::consts::*;
use crate::difficulty_multiplier;
use crate::render::Rgba;

/// Binary steering input, sampled once per frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    pub move_left: bool,
    pub move_right: bool,
}

impl InputState {
    pub const IDLE: Self = Self {
        move_left: false,
        move_right: false,
    };

    /// -1, 0 or +1
    pub fn axis(&self) -> f32 {
        match (self.move_left, self.move_right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }
}

/// The player's box, pinned to the bottom edge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub pos: Vec2,
    pub size: Vec2,
    /// Horizontal speed (units per nominal frame)
    pub speed: f32,
}

impl Actor {
    pub fn new(surface: Vec2) -> Self {
        let mut actor = Self {
            pos: Vec2::ZERO,
            size: Vec2::new(ACTOR_WIDTH, ACTOR_HEIGHT),
            speed: ACTOR_SPEED,
        };
        actor.recenter(surface);
        actor
    }

    pub fn rect(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: self.size,
        }
    }

    /// Horizontal center, bottom edge
    pub fn recenter(&mut self, surface: Vec2) {
        self.pos.x = (surface.x - self.size.x) / 2.0;
        self.pin_to_bottom(surface);
    }

    pub fn pin_to_bottom(&mut self, surface: Vec2) {
        self.pos.y = surface.y - self.size.y - ACTOR_BOTTOM_MARGIN;
    }

    /// Apply input for one step and clamp to the surface
    pub fn steer(&mut self, input: InputState, scale: f32, surface: Vec2) {
        self.pos.x += input.axis() * self.speed * scale;
        self.pos.x = self.pos.x.clamp(0.0, (surface.x - self.size.x).max(0.0));
        self.pin_to_bottom(surface);
    }
}

/// Which kind of hazard ended a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HazardKind {
    FallingBox,
    RisingBox,
    Meteor,
    Leaf,
}

impl HazardKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HazardKind::FallingBox => "falling box",
            HazardKind::RisingBox => "rising box",
            HazardKind::Meteor => "meteor",
            HazardKind::Leaf => "leaf",
        }
    }
}

/// Anything whose overlap with the actor ends the run
pub trait Hazard {
    fn kind(&self) -> HazardKind;
    /// Box tested against the actor
    fn hitbox(&self) -> Rect;
}

/// Straight-falling box (Default mode)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallingBox {
    pub rect: Rect,
    /// Units per nominal frame, downward
    pub speed: f32,
    pub color: Rgba,
}

impl FallingBox {
    pub fn advance(&mut self, step: &Step) {
        self.rect.pos.y += self.speed * step.scale;
    }
}

impl Hazard for FallingBox {
    fn kind(&self) -> HazardKind {
        HazardKind::FallingBox
    }

    fn hitbox(&self) -> Rect {
        self.rect
    }
}

/// `rect` stretched vertically back to where its top edge was at `prev_y`
fn swept(rect: &Rect, prev_y: f32) -> Rect {
    let before = Rect {
        pos: Vec2::new(rect.pos.x, prev_y),
        size: rect.size,
    };
    before.union(rect)
}

/// Box rising from the bottom edge (Up mode)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RisingBox {
    pub rect: Rect,
    /// Top edge before the last step, for the swept hit test
    pub prev_y: f32,
    /// Units per nominal frame, upward
    pub speed: f32,
    pub color: Rgba,
}

impl RisingBox {
    pub fn new(rect: Rect, speed: f32, color: Rgba) -> Self {
        Self {
            rect,
            prev_y: rect.pos.y,
            speed,
            color,
        }
    }

    pub fn advance(&mut self, step: &Step) {
        self.prev_y = self.rect.pos.y;
        self.rect.pos.y -= self.speed * step.scale;
    }
}

impl Hazard for RisingBox {
    fn kind(&self) -> HazardKind {
        HazardKind::RisingBox
    }

    /// A capped step moves a fast riser farther than the actor is tall
    fn hitbox(&self) -> Rect {
        swept(&self.rect, self.prev_y)
    }
}

/// Very fast falling slab matching its lane's width (Meteor mode)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meteor {
    pub rect: Rect,
    /// Top edge before the last step, for the swept hit test
    pub prev_y: f32,
    /// Units per nominal frame, downward
    pub speed: f32,
}

impl Meteor {
    pub fn advance(&mut self, step: &Step) {
        self.prev_y = self.rect.pos.y;
        self.rect.pos.y += self.speed * step.scale;
    }
}

impl Hazard for Meteor {
    fn kind(&self) -> HazardKind {
        HazardKind::Meteor
    }

    /// Covers the whole distance travelled in the last step
    fn hitbox(&self) -> Rect {
        swept(&self.rect, self.prev_y)
    }
}

/// Fluttering leaf: gravity fall to a terminal velocity, a slowly drifting
/// base line with a sine wave on top, and an independent sine tilt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Leaf {
    /// Top-left of the unrotated rectangle
    pub pos: Vec2,
    pub size: Vec2,
    pub base_x: f32,
    /// Base-line drift (units per nominal frame)
    pub drift: f32,
    pub wave_amp: f32,
    /// Wave angular rate (rad per ms of age)
    pub wave_rate: f32,
    pub wave_phase: f32,
    pub vy: f32,
    pub gravity: f32,
    pub terminal: f32,
    /// Max tilt (rad)
    pub tilt_amp: f32,
    pub tilt_rate: f32,
    pub tilt_phase: f32,
    /// Age (ms)
    pub age: f64,
    /// Current tilt (rad)
    pub angle: f32,
    /// Pose before the last step, for the swept hit test
    pub prev_pos: Vec2,
    pub prev_angle: f32,
    pub color: Rgba,
}

impl Leaf {
    /// Horizontal wave offset from the base line at `age` ms
    pub fn wave_offset(&self, age: f64) -> f32 {
        self.wave_amp * (self.wave_rate * age as f32 + self.wave_phase).sin()
    }

    /// Tilt angle at `age` ms
    pub fn tilt_at(&self, age: f64) -> f32 {
        self.tilt_amp * (self.tilt_rate * age as f32 + self.tilt_phase).sin()
    }

    pub fn advance(&mut self, step: &Step) {
        let k = step.scale;
        self.prev_pos = self.pos;
        self.prev_angle = self.angle;
        self.age += step.dt_ms;

        self.vy = (self.vy + self.gravity * k).min(self.terminal);
        self.pos.y += self.vy * k;

        self.base_x += self.drift * k;
        self.pos.x = self.base_x + self.wave_offset(self.age);
        self.angle = self.tilt_at(self.age);
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }
}

impl Hazard for Leaf {
    fn kind(&self) -> HazardKind {
        HazardKind::Leaf
    }

    /// Bounds of the tilted leaf at both ends of the last step
    fn hitbox(&self) -> Rect {
        let before = rotated_aabb(self.prev_pos + self.size * 0.5, self.size, self.prev_angle);
        rotated_aabb(self.center(), self.size, self.angle).union(&before)
    }
}

/// Warning marker that turns into exactly one hazard once its delay elapses
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Telegraph {
    pub x: f32,
    pub width: f32,
    /// Creation timestamp (ms)
    pub created: f64,
    /// Time until conversion (ms); for meteor lanes this is the fill duration
    pub delay: f64,
}

/// Beam fade-in after creation (ms)
pub const BEAM_FADE_IN_MS: f64 = 250.0;
/// Beam fade-out before conversion (ms)
pub const BEAM_FADE_OUT_MS: f64 = 200.0;

impl Telegraph {
    pub fn age(&self, now: f64) -> f64 {
        now - self.created
    }

    pub fn is_due(&self, now: f64) -> bool {
        self.age(now) >= self.delay
    }

    /// 0..=1 fraction of the delay elapsed
    pub fn progress(&self, now: f64) -> f32 {
        if self.delay <= 0.0 {
            return 1.0;
        }
        (self.age(now) / self.delay).clamp(0.0, 1.0) as f32
    }

    /// Beam opacity: fades in, holds, then fades out just before conversion
    pub fn beam_alpha(&self, now: f64) -> f32 {
        let age = self.age(now).max(0.0);
        let appear = (age / BEAM_FADE_IN_MS).min(1.0);
        let fading = (age - self.delay + BEAM_FADE_OUT_MS).max(0.0);
        let disappear = (1.0 - fading / BEAM_FADE_OUT_MS).max(0.0);
        (appear * disappear).clamp(0.0, 1.0) as f32
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }
}

/// Remove and return every telegraph whose delay has elapsed.
///
/// Removal is what guarantees a telegraph converts at most once.
pub fn take_due(pool: &mut Vec<Telegraph>, now: f64) -> Vec<Telegraph> {
    let mut due = Vec::new();
    pool.retain(|t| {
        if t.is_due(now) {
            due.push(*t);
            false
        } else {
            true
        }
    });
    due
}

/// Bonus coin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coin {
    pub rect: Rect,
    /// Units per nominal frame, downward
    pub speed: f32,
}

/// Cosmetic "+10" text that rises and fades
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloatingText {
    pub text: String,
    pub anchor: Vec2,
    pub born: f64,
    pub life: f64,
}

impl FloatingText {
    /// 0..=1 fraction of life used
    pub fn progress(&self, now: f64) -> f32 {
        ((now - self.born) / self.life).max(0.0) as f32
    }

    pub fn is_expired(&self, now: f64) -> bool {
        self.progress(now) >= 1.0
    }

    /// Render position and opacity at `now`
    pub fn pose(&self, now: f64) -> (Vec2, f32) {
        let p = self.progress(now).min(1.0);
        let pos = Vec2::new(self.anchor.x, self.anchor.y - FLOATER_RISE * p);
        (pos, 1.0 - p)
    }
}

/// Shared state every mode engine reads and mutates
#[derive(Debug, Clone)]
pub struct SimContext {
    /// Logical surface size
    pub surface: Vec2,
    pub actor: Actor,
    pub rng: Pcg32,
    pub seed: u64,
    /// Timestamp the current run started (ms)
    pub session_start: f64,
    /// Hazard collisions are ignored before this timestamp
    pub invincible_until: f64,
}

impl SimContext {
    pub fn new(surface: Vec2, seed: u64) -> Self {
        Self {
            surface,
            actor: Actor::new(surface),
            rng: Pcg32::seed_from_u64(seed),
            seed,
            session_start: 0.0,
            invincible_until: f64::NEG_INFINITY,
        }
    }

    /// Start a run at `now`: recenter the actor and rebase session time
    pub fn begin_session(&mut self, now: f64) {
        self.actor.recenter(self.surface);
        self.session_start = now;
        self.invincible_until = f64::NEG_INFINITY;
    }

    pub fn elapsed_ms(&self, now: f64) -> f64 {
        (now - self.session_start).max(0.0)
    }

    pub fn difficulty(&self, now: f64) -> f32 {
        difficulty_multiplier(self.elapsed_ms(now))
    }

    pub fn is_invincible(&self, now: f64) -> bool {
        now < self.invincible_until
    }

    pub fn invincible_ms_left(&self, now: f64) -> f64 {
        (self.invincible_until - now).max(0.0)
    }

    pub fn width(&self) -> f32 {
        self.surface.x
    }

    pub fn height(&self) -> f32 {
        self.surface.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn surface() -> Vec2 {
        Vec2::new(SURFACE_WIDTH, SURFACE_HEIGHT)
    }

    fn leaf() -> Leaf {
        Leaf {
            pos: Vec2::new(100.0, -20.0),
            size: Vec2::new(40.0, 16.0),
            base_x: 100.0,
            drift: 0.2,
            wave_amp: 30.0,
            wave_rate: 0.008,
            wave_phase: 1.0,
            vy: 0.0,
            gravity: 0.4,
            terminal: 4.0,
            tilt_amp: 0.5,
            tilt_rate: 0.01,
            tilt_phase: 0.3,
            age: 0.0,
            angle: 0.0,
            prev_pos: Vec2::new(100.0, -20.0),
            prev_angle: 0.0,
            color: Rgba::rgb(200, 200, 200),
        }
    }

    #[test]
    fn test_actor_starts_centered_at_bottom() {
        let actor = Actor::new(surface());
        assert_eq!(actor.pos.x, (SURFACE_WIDTH - ACTOR_WIDTH) / 2.0);
        assert_eq!(
            actor.rect().bottom(),
            SURFACE_HEIGHT - ACTOR_BOTTOM_MARGIN
        );
    }

    #[test]
    fn test_actor_clamped_to_surface() {
        let mut actor = Actor::new(surface());
        let left = InputState {
            move_left: true,
            move_right: false,
        };
        for _ in 0..200 {
            actor.steer(left, 1.0, surface());
        }
        assert_eq!(actor.pos.x, 0.0);

        let right = InputState {
            move_left: false,
            move_right: true,
        };
        for _ in 0..200 {
            actor.steer(right, 1.0, surface());
        }
        assert_eq!(actor.rect().right(), SURFACE_WIDTH);
    }

    #[test]
    fn test_opposing_inputs_cancel() {
        let both = InputState {
            move_left: true,
            move_right: true,
        };
        assert_eq!(both.axis(), 0.0);
    }

    #[test]
    fn test_telegraph_due_exactly_once() {
        let mut pool = vec![Telegraph {
            x: 10.0,
            width: 40.0,
            created: 1_000.0,
            delay: 1_500.0,
        }];
        assert!(take_due(&mut pool, 2_499.9).is_empty());
        assert_eq!(take_due(&mut pool, 2_500.0).len(), 1);
        assert!(take_due(&mut pool, 2_600.0).is_empty());
        assert!(pool.is_empty());
    }

    #[test]
    fn test_beam_alpha_envelope() {
        let t = Telegraph {
            x: 0.0,
            width: 40.0,
            created: 0.0,
            delay: 1_000.0,
        };
        assert_eq!(t.beam_alpha(0.0), 0.0);
        assert!((t.beam_alpha(125.0) - 0.5).abs() < 1e-6);
        assert_eq!(t.beam_alpha(500.0), 1.0);
        assert!((t.beam_alpha(900.0) - 0.5).abs() < 1e-6);
        assert_eq!(t.beam_alpha(1_000.0), 0.0);
    }

    #[test]
    fn test_meteor_swept_hitbox() {
        let mut m = Meteor {
            rect: Rect::new(0.0, 0.0, 120.0, 26.0),
            prev_y: 0.0,
            speed: 100.0,
        };
        m.advance(&Step::nominal(0.0));
        let hb = m.hitbox();
        assert_eq!(hb.top(), 0.0);
        assert_eq!(hb.bottom(), 126.0);
    }

    /// Actor rect plus a capped 100 ms step at the steepest difficulty
    fn capped_step() -> (Rect, Step) {
        let actor = Actor::new(surface()).rect();
        let step = Step {
            now: 100.0,
            dt_ms: MAX_FRAME_MS,
            scale: (MAX_FRAME_MS / FRAME_MS) as f32,
            difficulty: DIFFICULTY_MAX,
        };
        (actor, step)
    }

    #[test]
    fn test_fast_riser_cannot_skip_the_actor() {
        let (actor, step) = capped_step();
        let mut riser = RisingBox::new(
            Rect::new(actor.left(), actor.bottom() + 1.0, 40.0, 20.0),
            4.0 * DIFFICULTY_MAX,
            Rgba::rgb(200, 200, 200),
        );
        riser.advance(&step);
        // the riser jumped from below the actor to above it
        assert!(riser.rect.bottom() < actor.top());
        assert!(riser.hitbox().intersects(&actor));
    }

    #[test]
    fn test_fast_leaf_cannot_skip_the_actor() {
        let (actor, step) = capped_step();
        let mut l = leaf();
        l.drift = 0.0;
        l.wave_amp = 0.0;
        l.tilt_amp = 0.0;
        l.base_x = actor.left();
        l.size = Vec2::new(34.0, 14.0);
        l.terminal = 5.0 * DIFFICULTY_MAX;
        l.vy = l.terminal;
        l.pos = Vec2::new(actor.left(), actor.top() - l.size.y - 1.0);
        l.prev_pos = l.pos;
        l.advance(&step);
        // the leaf jumped from above the actor to below it
        assert!(l.pos.y > actor.bottom());
        assert!(l.hitbox().intersects(&actor));
    }

    #[test]
    fn test_leaf_falls_to_terminal_velocity() {
        let mut l = leaf();
        for i in 0..100 {
            l.advance(&Step::nominal(i as f64 * FRAME_MS));
        }
        assert_eq!(l.vy, l.terminal);
    }

    #[test]
    fn test_leaf_position_follows_formula() {
        let mut l = leaf();
        let start_base = l.base_x;
        let frames = 37;
        for i in 0..frames {
            l.advance(&Step::nominal(i as f64 * FRAME_MS));
        }
        let age = frames as f64 * FRAME_MS;
        let expected_base = start_base + l.drift * frames as f32;
        assert!((l.age - age).abs() < 1e-6);
        assert!((l.base_x - expected_base).abs() < 1e-3);
        let expected_x = expected_base + 30.0 * (0.008 * age as f32 + 1.0).sin();
        assert!((l.pos.x - expected_x).abs() < 1e-3);
        let expected_angle = 0.5 * (0.01 * age as f32 + 0.3).sin();
        assert!((l.angle - expected_angle).abs() < 1e-5);
    }

    #[test]
    fn test_floater_pose() {
        let f = FloatingText {
            text: "+10".into(),
            anchor: Vec2::new(50.0, 100.0),
            born: 0.0,
            life: FLOATER_LIFE_MS,
        };
        let (pos, alpha) = f.pose(0.0);
        assert_eq!(pos, Vec2::new(50.0, 100.0));
        assert_eq!(alpha, 1.0);
        let (pos, alpha) = f.pose(FLOATER_LIFE_MS / 2.0);
        assert!((pos.y - (100.0 - FLOATER_RISE / 2.0)).abs() < 1e-4);
        assert!((alpha - 0.5).abs() < 1e-6);
        assert!(f.is_expired(FLOATER_LIFE_MS));
    }

    proptest! {
        #[test]
        fn prop_leaf_wave_and_tilt_are_periodic(age in 0.0f64..20_000.0) {
            let l = leaf();
            let wave_period = (std::f32::consts::TAU / l.wave_rate) as f64;
            let tilt_period = (std::f32::consts::TAU / l.tilt_rate) as f64;
            prop_assert!((l.wave_offset(age) - l.wave_offset(age + wave_period)).abs() < 0.05);
            prop_assert!((l.tilt_at(age) - l.tilt_at(age + tilt_period)).abs() < 0.005);
            prop_assert!(l.wave_offset(age).abs() <= l.wave_amp + 1e-4);
            prop_assert!(l.tilt_at(age).abs() <= l.tilt_amp + 1e-4);
        }

        #[test]
        fn prop_telegraph_converts_never_early(created in 0.0f64..10_000.0, delay in 1_000.0f64..2_000.0, probe in 0.0f64..4_000.0) {
            prop_assume!((probe - delay).abs() > 1e-6);
            let mut pool = vec![Telegraph { x: 0.0, width: 40.0, created, delay }];
            let due = take_due(&mut pool, created + probe);
            prop_assert_eq!(due.len() == 1, probe >= delay);
            prop_assert_eq!(due.len() + pool.len(), 1);
        }
    }
}

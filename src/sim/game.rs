//! Run lifecycle
//!
//! `Game` owns the shared context, the score subsystem and at most one active
//! mode engine. The host drives it with one `frame` call per refresh. Each
//! start hands out a fresh [`RunToken`]; a frame carrying an older token is
//! ignored, so a callback left over from a cancelled run can never advance
//! the new one.

use glam::Vec2;
use serde::Serialize;

use super::clock::FrameClock;
use super::geom::Rect;
use super::modes::{ActiveMode, ModeKind};
use super::score::{ScoreSystem, ScoreTotals};
use super::state::{Actor, HazardKind, InputState, SimContext};
use crate::config::{ConfigError, GameConfig};
use crate::format_seconds;
use crate::hooks::{NoopHooks, UiHooks};
use crate::render::{DrawList, colors};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    /// Nothing running (fresh, stopped or reset)
    #[default]
    Idle,
    Running,
    /// Last run ended by a collision
    GameOver,
}

/// Handle for one started run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunToken(u64);

/// What the host should do after a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// Schedule the next frame
    Continue,
    /// The run ended during this frame
    Ended,
    /// The token is not the current run's; drop the callback
    Stale,
}

impl FrameStatus {
    pub fn should_continue(&self) -> bool {
        matches!(self, FrameStatus::Continue)
    }
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GameOver {
    pub mode: ModeKind,
    pub hazard: HazardKind,
    pub survival_secs: f64,
    pub score: u64,
}

/// End-of-session report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub mode: ModeKind,
    pub phase: GamePhase,
    pub seed: u64,
    pub survival_secs: f64,
    pub survival_display: String,
    #[serde(flatten)]
    pub totals: ScoreTotals,
    pub hazard: Option<HazardKind>,
    pub frames: u64,
}

pub struct Game<H: UiHooks = NoopHooks> {
    ctx: SimContext,
    clock: FrameClock,
    score: ScoreSystem,
    mode: Option<ActiveMode>,
    /// Last selected mode, kept for restart routing
    route: ModeKind,
    phase: GamePhase,
    generation: u64,
    ended_at: Option<f64>,
    game_over: Option<GameOver>,
    frames: u64,
    shown_time: String,
    showing_invincible: bool,
    draw: DrawList,
    hooks: H,
}

impl Game<NoopHooks> {
    /// Game without UI hooks
    pub fn headless(config: GameConfig) -> Result<Self, ConfigError> {
        Self::new(config, NoopHooks)
    }
}

impl<H: UiHooks> Game<H> {
    pub fn new(config: GameConfig, hooks: H) -> Result<Self, ConfigError> {
        config.validate()?;
        let surface = Vec2::new(config.surface_width, config.surface_height);
        let seed = config.resolve_seed();
        let mut game = Self {
            clock: FrameClock::new(config.max_frame_ms),
            ctx: SimContext::new(surface, seed),
            score: ScoreSystem::new(),
            mode: None,
            route: ModeKind::Default,
            phase: GamePhase::Idle,
            generation: 0,
            ended_at: None,
            game_over: None,
            frames: 0,
            shown_time: format_seconds(0.0),
            showing_invincible: false,
            draw: DrawList::new(),
            hooks,
        };
        game.paint_idle();
        Ok(game)
    }

    pub fn start_default_mode(&mut self, now: f64) -> RunToken {
        self.start(ModeKind::Default, now)
    }

    pub fn start_up_mode(&mut self, now: f64) -> RunToken {
        self.start(ModeKind::Up, now)
    }

    pub fn start_meteor_mode(&mut self, now: f64) -> RunToken {
        self.start(ModeKind::Meteor, now)
    }

    pub fn start_leaf_mode(&mut self, now: f64) -> RunToken {
        self.start(ModeKind::Leaf, now)
    }

    pub fn start_chaos_mode(&mut self, now: f64) -> RunToken {
        self.start(ModeKind::Chaos, now)
    }

    /// Begin a fresh run of `kind` at `now`.
    ///
    /// Any running mode is stopped first, so its token goes stale before the
    /// new run exists.
    pub fn start(&mut self, kind: ModeKind, now: f64) -> RunToken {
        self.stop(now, false);
        self.generation += 1;

        self.ctx.begin_session(now);
        self.clock.reset();
        self.score.reset();
        self.score.start(now);
        self.mode = Some(ActiveMode::new(kind, now));
        self.route = kind;
        self.phase = GamePhase::Running;
        self.ended_at = None;
        self.game_over = None;
        self.frames = 0;

        self.shown_time = format_seconds(0.0);
        self.hooks.report_time(&self.shown_time);
        self.hooks.report_score(0);
        self.hooks.start_clock();
        self.clear_invincible_display();
        self.paint(now);

        log::info!("Starting {} mode (seed {})", kind, self.ctx.seed);
        RunToken(self.generation)
    }

    /// Restart the last selected mode
    pub fn restart(&mut self, now: f64) -> RunToken {
        self.start(self.route, now)
    }

    /// Stop the running mode. No frame advances it afterwards.
    ///
    /// A collision stop freezes the clock, reports the final time and raises
    /// game over; a plain stop just cancels. Stopping a mode that is not
    /// running does nothing.
    pub fn stop(&mut self, now: f64, by_collision: bool) {
        if self.phase != GamePhase::Running {
            return;
        }
        self.generation += 1;
        self.score.halt();
        self.ended_at = Some(now);

        if by_collision {
            self.phase = GamePhase::GameOver;
            let secs = self.ctx.elapsed_ms(now) / 1000.0;
            self.shown_time = format_seconds(secs);
            self.hooks.stop_clock();
            self.hooks.report_time(&self.shown_time);
            self.hooks.report_game_over(secs);
        } else {
            self.phase = GamePhase::Idle;
        }
    }

    /// Stop everything, drop every entity and paint an idle frame
    pub fn reset_all(&mut self) {
        self.generation += 1;
        self.phase = GamePhase::Idle;
        self.mode = None;
        self.score.reset();
        self.clock.reset();
        self.ctx.begin_session(0.0);
        self.ended_at = None;
        self.game_over = None;
        self.frames = 0;

        self.shown_time = format_seconds(0.0);
        self.hooks.stop_clock();
        self.hooks.report_time(&self.shown_time);
        self.hooks.report_score(0);
        self.clear_invincible_display();
        self.paint_idle();

        log::info!("Reset");
    }

    /// Advance one frame of the run identified by `token`
    pub fn frame(&mut self, token: RunToken, now: f64, input: InputState) -> FrameStatus {
        if token.0 != self.generation || self.phase != GamePhase::Running {
            return FrameStatus::Stale;
        }

        let step = self
            .clock
            .tick(now)
            .with_difficulty(self.ctx.difficulty(now));
        self.frames += 1;

        self.ctx.actor.steer(input, step.scale, self.ctx.surface);

        if self.score.update(&mut self.ctx, &step) {
            self.hooks.report_score(self.score.score());
        }

        let hit = match &mut self.mode {
            Some(mode) => mode.engine_mut().advance(&mut self.ctx, &step),
            None => None,
        };

        self.paint(now);
        self.sync_time(now);
        self.sync_invincible(now);

        match hit {
            Some(hazard) => {
                self.end_run(now, hazard);
                FrameStatus::Ended
            }
            None => FrameStatus::Continue,
        }
    }

    /// Suppress hazard collisions for `duration_ms` from `now`
    pub fn grant_invincibility(&mut self, now: f64, duration_ms: f64) {
        self.ctx.invincible_until = now + duration_ms.max(0.0);
        self.sync_invincible(now);
    }

    fn end_run(&mut self, now: f64, hazard: HazardKind) {
        self.stop(now, true);
        let survival_secs = self.ctx.elapsed_ms(now) / 1000.0;
        self.game_over = Some(GameOver {
            mode: self.route,
            hazard,
            survival_secs,
            score: self.score.score(),
        });
        log::info!(
            "Game over in {} mode: hit by {} after {:.1}s, score {}",
            self.route,
            hazard.as_str(),
            survival_secs,
            self.score.score()
        );
    }

    fn sync_time(&mut self, now: f64) {
        let display = format_seconds(self.ctx.elapsed_ms(now) / 1000.0);
        if display != self.shown_time {
            self.hooks.report_time(&display);
            self.shown_time = display;
        }
    }

    fn sync_invincible(&mut self, now: f64) {
        if self.ctx.is_invincible(now) {
            self.showing_invincible = true;
            self.hooks.report_invincible(self.ctx.invincible_ms_left(now));
        } else if self.showing_invincible {
            self.clear_invincible_display();
        }
    }

    fn clear_invincible_display(&mut self) {
        self.showing_invincible = false;
        self.hooks.report_invincible(0.0);
    }

    fn paint_idle(&mut self) {
        let size = self.ctx.surface;
        self.draw.begin(size);
        self.draw.finish(size);
    }

    fn paint(&mut self, now: f64) {
        let size = self.ctx.surface;
        self.draw.begin(size);
        if let Some(mode) = &self.mode {
            mode.engine().render(&mut self.draw, &self.ctx, now);
        }
        self.score.render(&mut self.draw, now);
        self.draw.rect(self.ctx.actor.rect(), colors::ACTOR);
        self.draw.finish(size);
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Running
    }

    /// Last selected mode; survives game over and reset
    pub fn current_mode(&self) -> ModeKind {
        self.route
    }

    /// Sub-mode chaos currently spawns, when chaos is active
    pub fn chaos_selection(&self) -> Option<ModeKind> {
        match &self.mode {
            Some(ActiveMode::Chaos(chaos)) => Some(chaos.selected()),
            _ => None,
        }
    }

    pub fn active_mode(&self) -> Option<&ActiveMode> {
        self.mode.as_ref()
    }

    pub fn active_mode_mut(&mut self) -> Option<&mut ActiveMode> {
        self.mode.as_mut()
    }

    pub fn seed(&self) -> u64 {
        self.ctx.seed
    }

    pub fn surface(&self) -> Vec2 {
        self.ctx.surface
    }

    pub fn actor(&self) -> &Actor {
        &self.ctx.actor
    }

    pub fn score(&self) -> u64 {
        self.score.score()
    }

    pub fn score_totals(&self) -> ScoreTotals {
        self.score.totals()
    }

    pub fn score_system(&self) -> &ScoreSystem {
        &self.score
    }

    pub fn game_over(&self) -> Option<&GameOver> {
        self.game_over.as_ref()
    }

    /// Session time in seconds, frozen once the run ends
    pub fn elapsed_secs(&self, now: f64) -> f64 {
        match (self.phase, self.ended_at) {
            (GamePhase::Idle, None) => 0.0,
            (_, Some(end)) => self.ctx.elapsed_ms(end) / 1000.0,
            (_, None) => self.ctx.elapsed_ms(now) / 1000.0,
        }
    }

    pub fn hazard_count(&self) -> usize {
        self.mode.as_ref().map_or(0, |m| m.engine().hazard_count())
    }

    pub fn telegraph_count(&self) -> usize {
        self.mode.as_ref().map_or(0, |m| m.engine().telegraph_count())
    }

    pub fn hazard_boxes(&self) -> Vec<Rect> {
        let mut out = Vec::new();
        if let Some(mode) = &self.mode {
            mode.engine().hitboxes(&mut out);
        }
        out
    }

    /// Columns announced by pending telegraphs
    pub fn warning_boxes(&self) -> Vec<Rect> {
        let mut out = Vec::new();
        if let Some(mode) = &self.mode {
            mode.engine().warnings(&self.ctx, &mut out);
        }
        out
    }

    pub fn coin_boxes(&self) -> Vec<Rect> {
        self.score.coins().iter().map(|c| c.rect).collect()
    }

    pub fn draw_list(&self) -> &DrawList {
        &self.draw
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn summary(&self, now: f64) -> SessionSummary {
        let survival_secs = self.elapsed_secs(now);
        SessionSummary {
            mode: self.route,
            phase: self.phase,
            seed: self.ctx.seed,
            survival_secs,
            survival_display: format_seconds(survival_secs),
            totals: self.score.totals(),
            hazard: self.game_over.map(|g| g.hazard),
            frames: self.frames,
        }
    }
}

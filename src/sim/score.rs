//! Shared scoring: auto ticks, coin drops, "+10" feedback
//!
//! Used by every mode. Auto points accrue on a fixed wall-clock cadence
//! measured from a running baseline, so a late frame pays out every missed
//! tick at once instead of drifting.

use glam::Vec2;
use rand::Rng;
use serde::Serialize;

use super::clock::Step;
use super::geom::Rect;
use super::state::{Coin, FloatingText, SimContext};
use crate::consts::*;
use crate::render::{DrawCmd, DrawList};

/// Score totals, split by source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScoreTotals {
    pub score: u64,
    pub auto_points: u64,
    pub bonus_points: u64,
    pub coins_collected: u32,
}

#[derive(Debug, Clone, Default)]
pub struct ScoreSystem {
    totals: ScoreTotals,
    running: bool,
    last_tick: f64,
    last_drop: f64,
    coins: Vec<Coin>,
    floaters: Vec<FloatingText>,
}

impl ScoreSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero the score, drop all coins and text, stop ticking
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Begin ticking, with both timers based at `now`
    pub fn start(&mut self, now: f64) {
        self.running = true;
        self.last_tick = now;
        self.last_drop = now;
    }

    /// Stop ticking and dropping; existing coins keep their state
    pub fn halt(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn score(&self) -> u64 {
        self.totals.score
    }

    pub fn totals(&self) -> ScoreTotals {
        self.totals
    }

    pub fn coins(&self) -> &[Coin] {
        &self.coins
    }

    pub fn floaters(&self) -> &[FloatingText] {
        &self.floaters
    }

    /// Advance one frame. Returns true when the score changed.
    pub fn update(&mut self, ctx: &mut SimContext, step: &Step) -> bool {
        let now = step.now;
        let before = self.totals.score;

        if self.running {
            while now - self.last_tick >= SCORE_TICK_MS {
                self.totals.auto_points += 1;
                self.totals.score += 1;
                self.last_tick += SCORE_TICK_MS;
            }
            if now - self.last_drop >= COIN_DROP_INTERVAL_MS {
                self.spawn_coin(ctx);
                self.last_drop = now;
            }
        }

        let actor = ctx.actor.rect();
        let bottom = ctx.height() + COIN_EXIT_MARGIN;
        let mut collected = 0u32;
        self.coins.retain_mut(|coin| {
            coin.rect.pos.y += coin.speed * step.scale;
            if actor.intersects(&coin.rect) {
                collected += 1;
                return false;
            }
            coin.rect.pos.y <= bottom
        });

        for _ in 0..collected {
            self.award_coin(&actor, now);
        }

        self.floaters.retain(|f| !f.is_expired(now));

        self.totals.score != before
    }

    /// Add a coin at the top edge
    pub fn spawn_coin(&mut self, ctx: &mut SimContext) {
        let x = ctx.rng.random::<f32>() * (ctx.width() - COIN_SIZE).max(0.0);
        let speed = COIN_SPEED + ctx.rng.random::<f32>() * COIN_SPEED_JITTER;
        self.push_coin(Coin {
            rect: Rect::new(x, -COIN_SIZE, COIN_SIZE, COIN_SIZE),
            speed,
        });
    }

    pub fn push_coin(&mut self, coin: Coin) {
        self.coins.push(coin);
    }

    fn award_coin(&mut self, actor: &Rect, now: f64) {
        self.totals.bonus_points += COIN_BONUS;
        self.totals.score += COIN_BONUS;
        self.totals.coins_collected += 1;
        self.floaters.push(FloatingText {
            text: format!("+{COIN_BONUS}"),
            anchor: Vec2::new(actor.center().x, actor.top() - FLOATER_OFFSET),
            born: now,
            life: FLOATER_LIFE_MS,
        });
    }

    pub fn render(&self, draw: &mut DrawList, now: f64) {
        for coin in &self.coins {
            draw.push(DrawCmd::Coin {
                center: coin.rect.center(),
                radius: coin.rect.size.x / 2.0,
            });
        }
        for f in &self.floaters {
            let (pos, alpha) = f.pose(now);
            draw.push(DrawCmd::Text {
                text: f.text.clone(),
                pos,
                alpha,
            });
        }
    }
}

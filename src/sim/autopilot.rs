//! Demo autopilot
//!
//! Looks at the hazards near the actor's row and steers toward the closest
//! clear column. When the current column is already clear it goes after the
//! nearest coin it can safely reach.

use glam::Vec2;

use super::game::Game;
use super::geom::Rect;
use super::state::InputState;
use crate::hooks::UiHooks;

/// Candidate columns sampled across the surface
const COLUMNS: usize = 24;

/// What the autopilot sees for one frame
#[derive(Debug, Clone, Copy)]
pub struct Observation<'a> {
    pub actor: Rect,
    pub surface: Vec2,
    pub hazards: &'a [Rect],
    pub warnings: &'a [Rect],
    pub coins: &'a [Rect],
}

#[derive(Debug, Clone, Copy)]
pub struct Autopilot {
    /// How far above and below the actor a hazard counts as a threat
    pub horizon: f32,
    /// Extra clearance on each side of the actor
    pub margin: f32,
    /// Distance from the target at which the actor stops moving
    pub deadband: f32,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self {
            horizon: 160.0,
            margin: 8.0,
            deadband: 3.0,
        }
    }
}

impl Autopilot {
    /// Steer the actor of a running game
    pub fn steer_game<H: UiHooks>(&self, game: &Game<H>) -> InputState {
        let hazards = game.hazard_boxes();
        let warnings = game.warning_boxes();
        let coins = game.coin_boxes();
        self.steer(&Observation {
            actor: game.actor().rect(),
            surface: game.surface(),
            hazards: &hazards,
            warnings: &warnings,
            coins: &coins,
        })
    }

    pub fn steer(&self, view: &Observation) -> InputState {
        let current = view.actor.left();
        let target = self.target_x(view).unwrap_or(current);
        if target < current - self.deadband {
            InputState {
                move_left: true,
                move_right: false,
            }
        } else if target > current + self.deadband {
            InputState {
                move_left: false,
                move_right: true,
            }
        } else {
            InputState::IDLE
        }
    }

    /// Left edge the actor should head for, if any column is clear
    fn target_x(&self, view: &Observation) -> Option<f32> {
        let current = view.actor.left();
        if self.is_clear(view, current) {
            let coin = view
                .coins
                .iter()
                .filter(|c| c.bottom() < view.actor.top())
                .map(|c| (c.center().x - view.actor.size.x / 2.0).clamp(0.0, self.max_x(view)))
                .filter(|&x| self.is_clear(view, x))
                .min_by(|a, b| (a - current).abs().total_cmp(&(b - current).abs()));
            return Some(coin.unwrap_or(current));
        }

        let max_x = self.max_x(view);
        (0..=COLUMNS)
            .map(|i| max_x * i as f32 / COLUMNS as f32)
            .filter(|&x| self.is_clear(view, x))
            .min_by(|a, b| (a - current).abs().total_cmp(&(b - current).abs()))
    }

    fn max_x(&self, view: &Observation) -> f32 {
        (view.surface.x - view.actor.size.x).max(0.0)
    }

    /// No hazard or warned column overlaps the actor's band at `x`
    fn is_clear(&self, view: &Observation, x: f32) -> bool {
        let probe = Rect::new(
            x - self.margin,
            view.actor.top() - self.horizon,
            view.actor.size.x + self.margin * 2.0,
            view.actor.size.y + self.horizon * 2.0,
        );
        !view
            .hazards
            .iter()
            .chain(view.warnings)
            .any(|h| h.intersects(&probe))
    }
}

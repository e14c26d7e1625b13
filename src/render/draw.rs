//! Draw commands produced once per frame
//!
//! The simulation never touches a real canvas. Each frame it repaints into a
//! `DrawList`, which the host replays onto whatever surface it owns.

use glam::Vec2;

use super::color::{Rgba, colors};
use crate::sim::geom::Rect;

/// A single paint primitive
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    /// Fill the whole surface
    Background { size: Vec2, color: Rgba },
    /// 1-unit inner border around the surface
    Border { size: Vec2, color: Rgba },
    /// Axis-aligned filled rectangle
    Rect { rect: Rect, color: Rgba },
    /// Rectangle rotated by `angle` radians about its center
    RotatedRect {
        center: Vec2,
        size: Vec2,
        angle: f32,
        color: Rgba,
    },
    /// Warning beam rising from the bottom edge (brightest at the bottom)
    Beam {
        x: f32,
        width: f32,
        bottom: f32,
        height: f32,
        alpha: f32,
    },
    /// Full-height warning lane whose core widens as `fill` goes 0 -> 1
    Lane {
        x: f32,
        width: f32,
        height: f32,
        fill: f32,
    },
    Coin { center: Vec2, radius: f32 },
    /// Centered feedback text
    Text { text: String, pos: Vec2, alpha: f32 },
}

/// Ordered paint commands for one frame
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    cmds: Vec<DrawCmd>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.cmds.clear();
    }

    pub fn push(&mut self, cmd: DrawCmd) {
        self.cmds.push(cmd);
    }

    /// Clear and paint background + border (an idle frame)
    pub fn begin(&mut self, size: Vec2) {
        self.clear();
        self.push(DrawCmd::Background {
            size,
            color: colors::BACKGROUND,
        });
    }

    /// Border goes on top of everything else
    pub fn finish(&mut self, size: Vec2) {
        self.push(DrawCmd::Border {
            size,
            color: colors::BORDER,
        });
    }

    pub fn rect(&mut self, rect: Rect, color: Rgba) {
        self.push(DrawCmd::Rect { rect, color });
    }

    pub fn commands(&self) -> &[DrawCmd] {
        &self.cmds
    }

    pub fn len(&self) -> usize {
        self.cmds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    /// Count of commands matching a predicate (handy for tests and stats)
    pub fn count(&self, pred: impl Fn(&DrawCmd) -> bool) -> usize {
        self.cmds.iter().filter(|c| pred(c)).count()
    }
}

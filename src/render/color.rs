//! Color type and palette

use rand::Rng;
use serde::{Deserialize, Serialize};

/// 8-bit RGB with float alpha, matching canvas `rgba()` strings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with alpha scaled by `factor`
    pub fn fade(self, factor: f32) -> Self {
        Self {
            a: (self.a * factor).clamp(0.0, 1.0),
            ..self
        }
    }

    /// CSS color string for canvas fill/stroke styles
    pub fn css(&self) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }

    /// Random light, saturated-enough color for hazards.
    ///
    /// Channels are drawn from 100..=255; greyish-dark draws (mean below 150
    /// with every channel within 50 of the others) are rejected.
    pub fn random_light(rng: &mut impl Rng) -> Self {
        loop {
            let r: u8 = rng.random_range(100..=255);
            let g: u8 = rng.random_range(100..=255);
            let b: u8 = rng.random_range(100..=255);
            if !Self::is_muddy(r, g, b) {
                return Self::rgb(r, g, b);
            }
        }
    }

    fn is_muddy(r: u8, g: u8, b: u8) -> bool {
        let (r, g, b) = (r as i32, g as i32, b as i32);
        let average = (r + g + b) / 3;
        let max_diff = (r - g).abs().max((r - b).abs()).max((g - b).abs());
        average < 150 && max_diff < 50
    }
}

/// Colors for game elements (light theme)
pub mod colors {
    use super::Rgba;

    pub const BACKGROUND: Rgba = Rgba::rgb(0xf6, 0xf8, 0xfd);
    pub const BORDER: Rgba = Rgba::rgb(0xcb, 0xd3, 0xe3);
    pub const ACTOR: Rgba = Rgba::rgb(0x11, 0x11, 0x11);
    /// Rising-telegraph beam
    pub const BEAM: Rgba = Rgba::rgba(255, 211, 77, 0.9);
    pub const BEAM_CORE: Rgba = Rgba::rgba(255, 245, 170, 0.95);
    /// Meteor lane base and charging core
    pub const LANE: Rgba = Rgba::rgba(255, 60, 60, 0.15);
    pub const LANE_CORE: Rgba = Rgba::rgba(255, 0, 0, 0.5);
    pub const METEOR: Rgba = Rgba::rgba(255, 80, 80, 0.9);
    pub const METEOR_TAIL: Rgba = Rgba::rgba(255, 100, 100, 0.22);
    /// Chaos-mode tints so leftover hazards stay recognisable
    pub const CHAOS_RISER: Rgba = Rgba::rgb(255, 160, 60);
    pub const CHAOS_LEAF: Rgba = Rgba::rgba(60, 120, 220, 0.9);
    pub const COIN: Rgba = Rgba::rgba(255, 215, 80, 0.95);
    pub const COIN_RIM: Rgba = Rgba::rgba(185, 120, 0, 0.9);
    pub const FLOATER: Rgba = Rgba::rgb(0x22, 0xc5, 0x5e);
    pub const FLOATER_OUTLINE: Rgba = Rgba::rgba(12, 90, 42, 0.9);
}

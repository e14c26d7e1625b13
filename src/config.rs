//! Startup configuration
//!
//! Established once before the first session and never renegotiated
//! mid-session. Gameplay tuning is fixed in `consts`.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{MAX_FRAME_MS, SURFACE_HEIGHT, SURFACE_WIDTH};

/// Errors raised while building a [`GameConfig`]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("surface must have a positive, finite size (got {width}x{height})")]
    InvalidSurface { width: f32, height: f32 },
    #[error("max_frame_ms must be positive and finite (got {0})")]
    InvalidFrameCap(f64),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
}

/// Surface size, RNG seed and frame-delta cap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Logical surface width
    pub surface_width: f32,
    /// Logical surface height
    pub surface_height: f32,
    /// Fixed seed for spawn randomness (random when absent)
    pub seed: Option<u64>,
    /// Cap on the dt applied to motion in one frame
    pub max_frame_ms: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            surface_width: SURFACE_WIDTH,
            surface_height: SURFACE_HEIGHT,
            seed: None,
            max_frame_ms: MAX_FRAME_MS,
        }
    }
}

impl GameConfig {
    /// Default config with a fixed seed
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let (width, height) = (self.surface_width, self.surface_height);
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(ConfigError::InvalidSurface { width, height });
        }
        if !(self.max_frame_ms.is_finite() && self.max_frame_ms > 0.0) {
            return Err(ConfigError::InvalidFrameCap(self.max_frame_ms));
        }
        Ok(())
    }

    /// Seed to use for this run, drawing a fresh one when none is configured
    pub fn resolve_seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }
}

//! Tunable game constants.
//!
//! Every value has a default matching the classic game, so a missing file or a
//! partial TOML table is fine.  Units: world pixels, pixels/second, milliseconds.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub window: WindowConfig,
    pub timing: TimingConfig,
    pub ship: ShipConfig,
    pub aliens: AlienConfig,
    pub shots: ShotConfig,
    pub firing: FiringConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
    pub title: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Target duration of one loop iteration.
    pub frame_ms: u64,
    /// Length of the window the FPS counter is sampled over.
    pub fps_window_ms: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipConfig {
    pub start_x: f32,
    pub start_y: f32,
    pub move_speed: f32,
    pub left_bound: f32,
    pub right_bound: f32,
    pub top_bound: f32,
    pub bottom_bound: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlienConfig {
    pub first_x: f32,
    pub spacing: f32,
    pub row_y: f32,
    pub move_speed: f32,
    /// How far the whole wave drops each time it bounces off a wall.
    pub descent_step: f32,
    pub left_bound: f32,
    pub right_bound: f32,
    /// An alien below this line means the invasion succeeded.
    pub bottom_limit: f32,
    /// Expected shots per alien per second.  Zero disables return fire.
    pub fire_rate: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShotConfig {
    pub speed: f32,
    /// Spawn offset of a single shot relative to the ship's top-left corner.
    pub single_offset: (f32, f32),
    /// Horizontal offsets of the two dual-fire shots.
    pub dual_offsets_x: (f32, f32),
    pub dual_offset_y: f32,
    /// Distance past the playfield edge at which a shot is discarded.
    pub despawn_margin: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FiringConfig {
    pub interval_ms: u64,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            title: "Space Invaders 102.1".to_string(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            frame_ms: 10,
            fps_window_ms: 1000,
        }
    }
}

impl Default for ShipConfig {
    fn default() -> Self {
        Self {
            start_x: 370.0,
            start_y: 550.0,
            move_speed: 300.0,
            left_bound: 10.0,
            right_bound: 750.0,
            top_bound: 0.0,
            bottom_bound: 570.0,
        }
    }
}

impl Default for AlienConfig {
    fn default() -> Self {
        Self {
            first_x: 100.0,
            spacing: 50.0,
            row_y: 80.0,
            move_speed: 75.0,
            descent_step: 10.0,
            left_bound: 10.0,
            right_bound: 750.0,
            bottom_limit: 570.0,
            fire_rate: 0.0,
        }
    }
}

impl Default for ShotConfig {
    fn default() -> Self {
        Self {
            speed: 300.0,
            single_offset: (10.0, -30.0),
            dual_offsets_x: (2.0, 18.0),
            dual_offset_y: -22.0,
            despawn_margin: 100.0,
        }
    }
}

impl Default for FiringConfig {
    fn default() -> Self {
        Self { interval_ms: 100 }
    }
}

// ── Loading ──────────────────────────────────────────────────────────────────

impl GameConfig {
    /// Read and validate a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&contents)?;
        log::info!("loaded config from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        fn positive(name: &str, value: f32) -> Result<()> {
            if value > 0.0 {
                Ok(())
            } else {
                Err(GameError::InvalidConfig(format!("{name} must be positive, got {value}")))
            }
        }

        positive("window.width", self.window.width)?;
        positive("window.height", self.window.height)?;
        positive("ship.move_speed", self.ship.move_speed)?;
        positive("aliens.move_speed", self.aliens.move_speed)?;
        positive("shots.speed", self.shots.speed)?;

        if self.timing.frame_ms == 0 {
            return Err(GameError::InvalidConfig("timing.frame_ms must be non-zero".into()));
        }
        if self.timing.fps_window_ms == 0 {
            return Err(GameError::InvalidConfig("timing.fps_window_ms must be non-zero".into()));
        }
        if !self.aliens.fire_rate.is_finite() || self.aliens.fire_rate < 0.0 {
            return Err(GameError::InvalidConfig(format!(
                "aliens.fire_rate must be finite and >= 0, got {}",
                self.aliens.fire_rate
            )));
        }
        if self.ship.right_bound <= self.ship.left_bound {
            return Err(GameError::InvalidConfig("ship.right_bound must exceed left_bound".into()));
        }
        if self.aliens.right_bound <= self.aliens.left_bound {
            return Err(GameError::InvalidConfig(
                "aliens.right_bound must exceed left_bound".into(),
            ));
        }
        Ok(())
    }
}


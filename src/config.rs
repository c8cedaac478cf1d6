//! Game tuning
//!
//! Every constant the simulation reads lives here so hosts can override
//! them with a JSON blob. Missing fields fall back to the defaults.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Box balloons spawn in, centered on the origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnArea {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
}

impl Default for SpawnArea {
    fn default() -> Self {
        Self {
            width: 10.0,
            height: 10.0,
            depth: 5.0,
        }
    }
}

/// Closed range a drift component is sampled from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriftRange {
    pub min: f32,
    pub max: f32,
}

impl Default for DriftRange {
    fn default() -> Self {
        Self {
            min: -0.005,
            max: 0.005,
        }
    }
}

impl DriftRange {
    pub fn contains(&self, v: f32) -> bool {
        v >= self.min && v <= self.max
    }
}

/// Game tuning parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Misses allowed before the game ends
    pub miss_limit: u32,
    /// Time between spawns (ms)
    pub spawn_period_ms: f64,
    /// Upward speed shared by every balloon (units per tick)
    pub vertical_speed: f32,
    /// Balloons above this height are missed
    pub despawn_y: f32,
    pub spawn_area: SpawnArea,
    /// Per-tick lateral drift along X
    pub drift_x: DriftRange,
    /// Per-tick lateral drift along Z
    pub drift_z: DriftRange,
    pub balloon_radius: f32,
    /// Fixed kinematics rate (ticks per second)
    pub tick_hz: f64,
    /// Maximum kinematic ticks per rendered frame
    pub max_substeps: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            miss_limit: 5,
            spawn_period_ms: 1000.0,
            vertical_speed: 0.02,
            despawn_y: 10.0,
            spawn_area: SpawnArea::default(),
            drift_x: DriftRange::default(),
            drift_z: DriftRange::default(),
            balloon_radius: 0.5,
            tick_hz: 60.0,
            max_substeps: 8,
        }
    }
}

impl GameConfig {
    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Starting height, one unit below the visible spawn box
    #[inline]
    pub fn spawn_height(&self) -> f32 {
        -self.spawn_area.height / 2.0 - 1.0
    }

    /// Length of one kinematic tick (ms)
    #[inline]
    pub fn tick_ms(&self) -> f64 {
        1000.0 / self.tick_hz
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.miss_limit == 0 {
            return Err(ConfigError::invalid("miss_limit", "must be at least 1"));
        }
        if !(self.spawn_period_ms > 0.0) {
            return Err(ConfigError::invalid(
                "spawn_period_ms",
                format!("must be positive, got {}", self.spawn_period_ms),
            ));
        }
        if !(self.vertical_speed > 0.0) {
            return Err(ConfigError::invalid(
                "vertical_speed",
                format!("must be positive, got {}", self.vertical_speed),
            ));
        }
        if !(self.balloon_radius > 0.0) {
            return Err(ConfigError::invalid(
                "balloon_radius",
                format!("must be positive, got {}", self.balloon_radius),
            ));
        }
        if !(self.tick_hz > 0.0) {
            return Err(ConfigError::invalid(
                "tick_hz",
                format!("must be positive, got {}", self.tick_hz),
            ));
        }
        if self.max_substeps == 0 {
            return Err(ConfigError::invalid("max_substeps", "must be at least 1"));
        }
        let area = self.spawn_area;
        if area.width < 0.0 || area.height < 0.0 || area.depth < 0.0 {
            return Err(ConfigError::invalid(
                "spawn_area",
                "dimensions must be non-negative",
            ));
        }
        for (field, range) in [("drift_x", self.drift_x), ("drift_z", self.drift_z)] {
            if !(range.min <= range.max) {
                return Err(ConfigError::invalid(
                    field,
                    format!("min {} exceeds max {}", range.min, range.max),
                ));
            }
        }
        if self.despawn_y <= self.spawn_height() {
            return Err(ConfigError::invalid(
                "despawn_y",
                format!(
                    "must be above spawn height {}, got {}",
                    self.spawn_height(),
                    self.despawn_y
                ),
            ));
        }
        Ok(())
    }
}

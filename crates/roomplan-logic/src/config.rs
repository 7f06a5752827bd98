//! Planner configuration.
//!
//! Every knob has a default matching the stock editor, so an empty JSON
//! object is a valid configuration:
//!
//! ```
//! use roomplan_logic::config::{validate_config, PlannerConfig};
//!
//! let config = PlannerConfig::from_json("{\"grid_size\": 32}").unwrap();
//! assert_eq!(config.grid_size, 32);
//! assert!(validate_config(&config).is_empty());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    CORRIDOR_DOOR_RATIO, DEFAULT_GRID_SIZE, PALETTE_TOLERANCE, RATIO_EPSILON, ROOM_TOLERANCE,
};
use crate::error::{PlanError, Result};
use crate::status::StatusPolicy;

/// Smallest grid that still has an interior inside the forced white border.
pub const MIN_GRID_SIZE: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Cells per side of the logical grid.
    pub grid_size: usize,
    /// Per-channel palette match tolerance.
    pub palette_tolerance: f32,
    /// Per-channel tolerance around mid-gray for room-like colors.
    pub room_tolerance: f32,
    /// Minimum door share of a region's openings for it to be a corridor.
    pub corridor_ratio: f32,
    pub ratio_epsilon: f32,
    /// Regions with fewer doors are always rooms.
    pub min_doors: u32,
    /// Regions smaller than this are dropped as artifacts.
    pub min_region_area: usize,
    /// Maximum undo depth; 0 keeps everything.
    pub undo_limit: usize,
    pub status: StatusPolicy,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            palette_tolerance: PALETTE_TOLERANCE,
            room_tolerance: ROOM_TOLERANCE,
            corridor_ratio: CORRIDOR_DOOR_RATIO,
            ratio_epsilon: RATIO_EPSILON,
            min_doors: 1,
            min_region_area: 1,
            undo_limit: 0,
            status: StatusPolicy::default(),
        }
    }
}

impl PlannerConfig {
    /// Parse and validate.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        let errors = validate_config(&config);
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(PlanError::InvalidConfig(errors))
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Configuration validation error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("grid size {0} is below the minimum of {MIN_GRID_SIZE}")]
    GridTooSmall(usize),
    #[error("{key} must lie in (0, 1], got {value}")]
    ToleranceOutOfRange { key: &'static str, value: f32 },
    #[error("corridor ratio must lie in [0, 1], got {0}")]
    RatioOutOfRange(f32),
    #[error("ratio epsilon must be positive, got {0}")]
    EpsilonNotPositive(f32),
    #[error("minimum region area must be at least 1")]
    ZeroRegionArea,
    #[error("{key} must be a positive number of seconds, got {value}")]
    IntervalNotPositive { key: &'static str, value: f32 },
    #[error("{key} must be a probability in [0, 1], got {value}")]
    ProbabilityOutOfRange { key: &'static str, value: f32 },
}

/// Validate a planner configuration, returning all errors found.
pub fn validate_config(config: &PlannerConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    if config.grid_size < MIN_GRID_SIZE {
        errors.push(ConfigError::GridTooSmall(config.grid_size));
    }
    for (key, value) in [
        ("palette_tolerance", config.palette_tolerance),
        ("room_tolerance", config.room_tolerance),
    ] {
        if !(value > 0.0 && value <= 1.0) {
            errors.push(ConfigError::ToleranceOutOfRange { key, value });
        }
    }
    if !(0.0..=1.0).contains(&config.corridor_ratio) {
        errors.push(ConfigError::RatioOutOfRange(config.corridor_ratio));
    }
    if !(config.ratio_epsilon > 0.0) {
        errors.push(ConfigError::EpsilonNotPositive(config.ratio_epsilon));
    }
    if config.min_region_area == 0 {
        errors.push(ConfigError::ZeroRegionArea);
    }

    let status = &config.status;
    for (key, value) in [
        ("warning_interval_secs", status.warning_interval_secs),
        ("error_interval_secs", status.error_interval_secs),
    ] {
        if !(value > 0.0) {
            errors.push(ConfigError::IntervalNotPositive { key, value });
        }
    }
    for (key, value) in [
        ("warning_chance", status.warning_chance),
        ("error_chance_from_good", status.error_chance_from_good),
        ("error_chance_from_warning", status.error_chance_from_warning),
    ] {
        if !(0.0..=1.0).contains(&value) {
            errors.push(ConfigError::ProbabilityOutOfRange { key, value });
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(validate_config(&PlannerConfig::default()).is_empty());
    }

    #[test]
    fn test_empty_json_uses_defaults() {
        let config = PlannerConfig::from_json("{}").unwrap();
        assert_eq!(config, PlannerConfig::default());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = PlannerConfig {
            grid_size: 2,
            palette_tolerance: 0.0,
            corridor_ratio: 1.5,
            min_region_area: 0,
            ..PlannerConfig::default()
        };
        config.status.warning_chance = -0.1;
        let errors = validate_config(&config);
        assert_eq!(errors.len(), 5);
        assert!(errors.contains(&ConfigError::GridTooSmall(2)));
        assert!(errors.contains(&ConfigError::RatioOutOfRange(1.5)));
        assert!(errors.contains(&ConfigError::ZeroRegionArea));
    }

    #[test]
    fn test_nan_tolerance_is_rejected() {
        let config = PlannerConfig {
            room_tolerance: f32::NAN,
            ..PlannerConfig::default()
        };
        assert_eq!(validate_config(&config).len(), 1);
    }

    #[test]
    fn test_from_json_rejects_invalid() {
        let err = PlannerConfig::from_json("{\"grid_size\": 1}").unwrap_err();
        assert!(matches!(err, PlanError::InvalidConfig(ref e) if e.len() == 1));
    }

    #[test]
    fn test_json_round_trip() {
        let config = PlannerConfig {
            grid_size: 48,
            undo_limit: 20,
            ..PlannerConfig::default()
        };
        let back = PlannerConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(back, config);
    }
}

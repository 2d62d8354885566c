//! Scoring constants and geometry applicability limits.
//!
//! Every field defaults to the values the scoring model was calibrated with, so
//! `ScoringConfig::default()` is what callers normally want. Overrides can be built with
//! [`ScoringConfig::builder`] or loaded from a JSON file.

use bon::Builder;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{0}'")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse config JSON")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config value for '{field}': {value}")]
    InvalidValue { field: &'static str, value: f64 },
}

/// Bounds inside which the equirectangular corner approximation is trusted.
///
/// The longitude delta is `0.009° / cos(lat)`, which diverges towards the poles, and the
/// fixed 0.009°/km latitude constant drifts over large areas. Requests outside these
/// bounds are rejected instead of silently producing skewed geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[serde(default)]
pub struct ApproximationLimits {
    /// Largest accepted |center latitude|, degrees.
    #[builder(default = 80.0)]
    pub max_abs_latitude: f64,
    /// Largest accepted region side, km.
    #[builder(default = 200.0)]
    pub max_side_km: f64,
    /// Largest accepted grid resolution `n` (the grid holds `n²` zones).
    #[builder(default = 1000)]
    pub max_zones_per_edge: u32,
    /// Relative deviation between the requested side and the haversine-measured edge
    /// above which a warning is logged.
    #[builder(default = 0.01)]
    pub distortion_warning: f64,
}

impl Default for ApproximationLimits {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Weights and reference values of the potential score.
///
/// # Examples
///
/// ```
/// use skywind::ScoringConfig;
///
/// let config = ScoringConfig::builder().wind_weight(0.8).terrain_weight(0.2).build();
/// assert_eq!(config.power_reference, 800.0);
/// assert_eq!(ScoringConfig::default().wind_weight, 0.7);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[serde(default)]
pub struct ScoringConfig {
    #[builder(default = 0.7)]
    pub wind_weight: f64,
    #[builder(default = 0.3)]
    pub terrain_weight: f64,
    /// Power density (W/m²) that scores a wind factor of 1.0.
    #[builder(default = 800.0)]
    pub power_reference: f64,
    /// Upper bound of the wind factor.
    #[builder(default = 1.25)]
    pub wind_score_cap: f64,
    /// Roughness (m) at and above which the terrain factor is 0.
    #[builder(default = 50.0)]
    pub roughness_reference: f64,
    /// Suitability of land-cover labels missing from the suitability table.
    #[builder(default = 0.5)]
    pub unknown_land_suitability: f64,
    /// Absolute per-coordinate tolerance (degrees) of the grid consistency check.
    #[builder(default = 1e-7)]
    pub consistency_tolerance: f64,
    #[builder(default)]
    pub limits: ApproximationLimits,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ScoringConfig {
    /// Parses a (possibly partial) JSON config; missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: ScoringConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
        Self::from_json_str(&json)
    }

    /// Rejects non-finite values and references that would divide by zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("power_reference", self.power_reference),
            ("roughness_reference", self.roughness_reference),
            ("max_side_km", self.limits.max_side_km),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidValue { field, value });
            }
        }
        if self.limits.max_zones_per_edge == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_zones_per_edge",
                value: 0.0,
            });
        }
        let finite = [
            ("wind_weight", self.wind_weight),
            ("terrain_weight", self.terrain_weight),
            ("wind_score_cap", self.wind_score_cap),
            ("unknown_land_suitability", self.unknown_land_suitability),
            ("consistency_tolerance", self.consistency_tolerance),
            ("max_abs_latitude", self.limits.max_abs_latitude),
            ("distortion_warning", self.limits.distortion_warning),
        ];
        for (field, value) in finite {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidValue { field, value });
            }
        }
        Ok(())
    }
}

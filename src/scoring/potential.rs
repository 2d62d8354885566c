//! The per-zone potential score.
//!
//! ```text
//! S_wind    = min(cap, power_avg / power_reference)
//! S_terrain = 1 - min(1, roughness / roughness_reference)
//! S_base    = wind_weight * S_wind + terrain_weight * S_terrain
//! potential = round(100 * S_base * S_land_effective, 1)
//! ```
//!
//! Land suitability multiplies the base score: excellent wind cannot compensate for
//! unbuildable land. Missing inputs count as 0, and so do non-finite ones: a NaN roughness
//! is "no data", not flat terrain by accident of `f64::max`.

use crate::config::ScoringConfig;
use crate::scoring::land::{score_land_with, LandSuitability};
use crate::types::zone::{Zone, ZoneMetrics};
use crate::utils::round_to;
use serde::{Deserialize, Serialize};

/// The intermediate factors of one potential computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PotentialBreakdown {
    pub wind: f64,
    pub terrain: f64,
    pub base: f64,
    pub land: LandSuitability,
    /// 0-100, one decimal.
    pub potential: f64,
}

pub fn wind_factor(power_avg: f64, config: &ScoringConfig) -> f64 {
    (power_avg.max(0.0) / config.power_reference).min(config.wind_score_cap)
}

pub fn terrain_factor(roughness: f64, config: &ScoringConfig) -> f64 {
    1.0 - (roughness.max(0.0) / config.roughness_reference).min(1.0)
}

fn finite_or_zero(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

pub fn potential_breakdown(metrics: &ZoneMetrics, config: &ScoringConfig) -> PotentialBreakdown {
    let wind = wind_factor(finite_or_zero(metrics.power_avg), config);
    let terrain = terrain_factor(finite_or_zero(metrics.roughness), config);
    let base = config.wind_weight * wind + config.terrain_weight * terrain;
    let land = metrics
        .land_cover
        .as_ref()
        .map(|composition| score_land_with(composition, config))
        .unwrap_or_default();
    PotentialBreakdown {
        wind,
        terrain,
        base,
        land,
        potential: round_to(100.0 * base * land.effective, 1),
    }
}

/// Potential of a zone from its current metrics.
pub fn score_potential(zone: &Zone, config: &ScoringConfig) -> f64 {
    potential_breakdown(&zone.metrics, config).potential
}

/// Computes the potential and stores it on the zone, together with the buildable fraction
/// of its land cover.
pub fn apply_potential(zone: &mut Zone, config: &ScoringConfig) -> f64 {
    let breakdown = potential_breakdown(&zone.metrics, config);
    zone.metrics
        .record_potential(breakdown.potential, breakdown.land.buildable_fraction);
    breakdown.potential
}

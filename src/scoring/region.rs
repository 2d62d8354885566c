//! Region-level aggregation over the zones of one grid.

use crate::scoring::error::ScoringError;
use crate::scoring::wind_rose::compute_wind_rose;
use crate::types::ids::ZoneId;
use crate::types::region::{Region, WindRose};
use crate::types::zone::Zone;
use chrono::{DateTime, Utc};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

/// Aggregate metrics of a grid's zones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSummary {
    pub avg_potential: f64,
    /// `floor(avg_potential * 10)`.
    pub rating: i64,
    pub best_zone: ZoneId,
    pub best_zone_index: u32,
    pub best_potential: f64,
    pub wind_rose: WindRose,
    pub zone_count: usize,
}

/// Summarizes a grid's zones.
///
/// Returns `Ok(None)` for an empty zone list. Every zone must already have a potential and
/// all zones must belong to the same grid. The best zone is the one with the highest
/// potential; ties go to the lowest zone index.
pub fn summarize_zones(zones: &[Zone]) -> Result<Option<RegionSummary>, ScoringError> {
    let Some(first) = zones.first() else {
        return Ok(None);
    };
    if zones.iter().any(|zone| zone.grid != first.grid) {
        return Err(ScoringError::MixedGrids);
    }

    let mut scored = Vec::with_capacity(zones.len());
    for zone in zones {
        let potential = zone.metrics.potential.ok_or(ScoringError::UnscoredZone {
            zone: zone.id,
            index: zone.index,
        })?;
        scored.push((zone, potential));
    }

    let avg_potential = scored.iter().map(|(_, p)| p).sum::<f64>() / scored.len() as f64;
    let (best, best_potential) = scored
        .iter()
        .max_by_key(|(zone, potential)| (OrderedFloat(*potential), Reverse(zone.index)))
        .map(|(zone, potential)| (*zone, *potential))
        .unwrap_or((first, 0.0));

    Ok(Some(RegionSummary {
        avg_potential,
        rating: (avg_potential * 10.0).floor() as i64,
        best_zone: best.id,
        best_zone_index: best.index,
        best_potential,
        wind_rose: compute_wind_rose(zones),
        zone_count: zones.len(),
    }))
}

/// Writes the summary of `zones` into the region's metrics.
///
/// An empty zone list leaves the region untouched and returns `Ok(None)`.
pub fn aggregate_region(
    region: &mut Region,
    zones: &[Zone],
    scored_at: DateTime<Utc>,
) -> Result<Option<RegionSummary>, ScoringError> {
    let Some(summary) = summarize_zones(zones)? else {
        return Ok(None);
    };
    let metrics = &mut region.metrics;
    metrics.avg_potential = Some(summary.avg_potential);
    metrics.rating = Some(summary.rating);
    metrics.best_zone = Some(summary.best_zone);
    metrics.wind_rose = Some(summary.wind_rose);
    metrics.scored_at = Some(scored_at);
    Ok(Some(summary))
}

//! Merges provider statistics into zone metrics.
//!
//! Each `apply_*` function writes one layer. A missing answer (`None`) or a non-finite value
//! is stored as the soft default, so after any of them ran the layer counts as fetched. A
//! potential computed before the write stops counting as current.

use crate::provider::raster_provider::{LandCoverHistogram, TerrainStats, WindSample};
use crate::types::land_cover::{label_for_code, LandCoverComposition};
use crate::types::lat_lon::{Corners, LatLon};
use crate::types::zone::{Zone, ZoneLayer, ZoneMetrics};
use crate::utils::round_to;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

/// Decimals kept for the centroid sent to the wind query.
pub const CENTROID_DECIMALS: i32 = 5;
/// Decimals kept for land-cover percentages.
pub const LAND_COVER_DECIMALS: i32 = 1;

/// Everything the provider answered for one zone. `None` means no data.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ZoneRawStats {
    pub wind: Option<WindSample>,
    pub terrain: Option<TerrainStats>,
    pub air_density: Option<f64>,
    pub power_density: Option<f64>,
    pub land_cover: Option<LandCoverHistogram>,
}

/// Writes every layer of `raw` into the zone.
///
/// # Examples
///
/// ```
/// use skywind::scoring::zone_metrics::{aggregate_zone_metrics, ZoneRawStats};
/// use skywind::ZoneMetrics;
///
/// let mut metrics = ZoneMetrics::default();
/// aggregate_zone_metrics(&mut metrics, &ZoneRawStats::default());
/// assert_eq!(metrics.avg_wind_speed, Some(0.0));
/// assert_eq!(metrics.roughness, Some(0.0));
/// assert!(metrics.land_cover.as_ref().is_some_and(|c| c.is_empty()));
/// ```
pub fn aggregate_zone_metrics(metrics: &mut ZoneMetrics, raw: &ZoneRawStats) {
    apply_wind(metrics, raw.wind.as_ref());
    apply_terrain(metrics, raw.terrain.as_ref());
    apply_air_density(metrics, raw.air_density);
    apply_power_density(metrics, raw.power_density);
    apply_land_cover(metrics, raw.land_cover.as_ref());
}

/// [`aggregate_zone_metrics`] for a stored zone.
pub fn aggregate_zone(zone: &mut Zone, raw: &ZoneRawStats) {
    aggregate_zone_metrics(&mut zone.metrics, raw);
}

/// A provider value, with non-finite numbers treated as no data.
fn or_soft_zero(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

pub fn apply_wind(metrics: &mut ZoneMetrics, wind: Option<&WindSample>) {
    metrics.avg_wind_speed = Some(or_soft_zero(wind.map(|w| w.speed)));
    metrics.wind_direction = Some(or_soft_zero(wind.map(|w| w.direction)));
    metrics.layer_written(ZoneLayer::Wind);
}

pub fn apply_terrain(metrics: &mut ZoneMetrics, terrain: Option<&TerrainStats>) {
    let terrain = terrain.copied().unwrap_or_default();
    metrics.min_alt = Some(or_soft_zero(terrain.elevation_min));
    metrics.max_alt = Some(or_soft_zero(terrain.elevation_max));
    metrics.roughness = Some(or_soft_zero(terrain.elevation_stddev));
    metrics.layer_written(ZoneLayer::Terrain);
}

pub fn apply_air_density(metrics: &mut ZoneMetrics, air_density: Option<f64>) {
    metrics.air_density = Some(or_soft_zero(air_density));
    metrics.layer_written(ZoneLayer::AirDensity);
}

pub fn apply_power_density(metrics: &mut ZoneMetrics, power_density: Option<f64>) {
    metrics.power_avg = Some(or_soft_zero(power_density));
    metrics.layer_written(ZoneLayer::PowerDensity);
}

pub fn apply_land_cover(metrics: &mut ZoneMetrics, histogram: Option<&LandCoverHistogram>) {
    metrics.land_cover = Some(histogram.map(land_cover_composition).unwrap_or_default());
    metrics.layer_written(ZoneLayer::LandCover);
}

/// Parses a histogram key such as `"40"` or `"40.0"` into a class code.
fn parse_class_code(key: &str) -> Option<u16> {
    let value: f64 = key.trim().parse().ok()?;
    if !value.is_finite() || value < 0.0 || value > f64::from(u16::MAX) {
        return None;
    }
    Some(value.trunc() as u16)
}

/// Turns a class histogram into percentages of the total pixel count, largest first.
///
/// Percentages are rounded to one decimal. Equal percentages are ordered by ascending class
/// code. Unparseable keys and non-positive counts are ignored; duplicate codes are summed.
/// An empty or all-zero histogram gives an empty composition.
pub fn land_cover_composition(histogram: &LandCoverHistogram) -> LandCoverComposition {
    let mut counts: Vec<(u16, f64)> = Vec::new();
    for (key, pixels) in histogram {
        let Some(code) = parse_class_code(key) else {
            continue;
        };
        if !pixels.is_finite() || *pixels <= 0.0 {
            continue;
        }
        match counts.iter_mut().find(|(existing, _)| *existing == code) {
            Some((_, total)) => *total += pixels,
            None => counts.push((code, *pixels)),
        }
    }

    let total: f64 = counts.iter().map(|(_, pixels)| pixels).sum();
    if total <= 0.0 {
        return LandCoverComposition::new();
    }

    let mut shares: Vec<(u16, f64)> = counts
        .into_iter()
        .map(|(code, pixels)| (code, round_to(pixels / total * 100.0, LAND_COVER_DECIMALS)))
        .collect();
    shares.sort_by_key(|(code, percentage)| (Reverse(OrderedFloat(*percentage)), *code));

    shares
        .into_iter()
        .map(|(code, percentage)| (label_for_code(code), percentage))
        .collect()
}

/// Arithmetic mean of the four corners, rounded to [`CENTROID_DECIMALS`]; the point the
/// wind statistics of a zone are queried at.
pub fn wind_query_point(corners: &Corners) -> LatLon {
    let centroid = corners.centroid();
    LatLon(
        round_to(centroid.0, CENTROID_DECIMALS),
        round_to(centroid.1, CENTROID_DECIMALS),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::raster_provider::histogram_from_codes;

    fn histogram(bins: &[(&str, f64)]) -> LandCoverHistogram {
        bins.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_missing_wind_defaults_to_zero() {
        let mut metrics = ZoneMetrics::default();
        apply_wind(&mut metrics, None);
        assert_eq!(metrics.avg_wind_speed, Some(0.0));
        assert_eq!(metrics.wind_direction, Some(0.0));

        let sample = WindSample {
            speed: 7.25,
            direction: 225.0,
        };
        apply_wind(&mut metrics, Some(&sample));
        assert_eq!(metrics.avg_wind_speed, Some(7.25));
        assert_eq!(metrics.wind_direction, Some(225.0));
    }

    #[test]
    fn test_partial_terrain_defaults_missing_fields() {
        let mut metrics = ZoneMetrics::default();
        let terrain = TerrainStats {
            elevation_min: Some(120.0),
            elevation_max: None,
            elevation_stddev: Some(14.5),
        };
        apply_terrain(&mut metrics, Some(&terrain));
        assert_eq!(metrics.min_alt, Some(120.0));
        assert_eq!(metrics.max_alt, Some(0.0));
        assert_eq!(metrics.roughness, Some(14.5));
    }

    #[test]
    fn test_non_finite_values_are_no_data() {
        let mut metrics = ZoneMetrics::default();
        let terrain = TerrainStats {
            elevation_min: Some(f64::NEG_INFINITY),
            elevation_max: Some(410.0),
            elevation_stddev: Some(f64::NAN),
        };
        apply_terrain(&mut metrics, Some(&terrain));
        apply_power_density(&mut metrics, Some(f64::INFINITY));
        assert_eq!(metrics.min_alt, Some(0.0));
        assert_eq!(metrics.max_alt, Some(410.0));
        assert_eq!(metrics.roughness, Some(0.0));
        assert_eq!(metrics.power_avg, Some(0.0));
    }

    #[test]
    fn test_composition_percentages_and_order() {
        let bins = histogram_from_codes(&[(10, 250.0), (30, 600.0), (80, 150.0)]);
        let composition = land_cover_composition(&bins);
        let labels: Vec<&str> = composition.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, ["Grassland", "Tree cover", "Permanent water"]);
        assert_eq!(composition.percentage_of("Grassland"), 60.0);
        assert_eq!(composition.percentage_of("Tree cover"), 25.0);
        assert_eq!(composition.percentage_of("Permanent water"), 15.0);
    }

    #[test]
    fn test_composition_ties_break_by_class_code() {
        // Provider order puts cropland first; the tie goes to the lower code.
        let composition = land_cover_composition(&histogram(&[("40", 50.0), ("20", 50.0)]));
        let labels: Vec<&str> = composition.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, ["Shrubland", "Cropland"]);
    }

    #[test]
    fn test_composition_parses_float_keys_and_skips_garbage() {
        let composition = land_cover_composition(&histogram(&[
            ("30.0", 1.0),
            ("30", 1.0),
            ("water", 5.0),
            ("42", 2.0),
            ("60", 0.0),
        ]));
        assert_eq!(composition.len(), 2);
        assert_eq!(composition.percentage_of("Grassland"), 50.0);
        assert_eq!(composition.percentage_of("class_42"), 50.0);
    }

    #[test]
    fn test_composition_rounds_to_one_decimal() {
        let composition = land_cover_composition(&histogram_from_codes(&[(30, 1.0), (40, 2.0)]));
        assert_eq!(composition.percentage_of("Cropland"), 66.7);
        assert_eq!(composition.percentage_of("Grassland"), 33.3);
    }

    #[test]
    fn test_empty_histogram() {
        assert!(land_cover_composition(&Vec::new()).is_empty());
        assert!(land_cover_composition(&histogram_from_codes(&[(30, 0.0)])).is_empty());
    }

    #[test]
    fn test_wind_query_point_is_rounded_centroid() {
        let corners = Corners {
            a: LatLon(46.8612345, 23.7548765),
            b: LatLon(46.6812345, 23.7548765),
            c: LatLon(46.6812345, 23.4923235),
            d: LatLon(46.8612345, 23.4923235),
        };
        assert_eq!(wind_query_point(&corners), LatLon(46.77123, 23.6236));
    }
}

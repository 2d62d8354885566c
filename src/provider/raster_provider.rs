//! The contract of the external raster/climate data provider.
//!
//! The provider answers aggregate statistics for points (zone centroids, the region center)
//! and polygons (zone rings). Implementations wrap a remote raster engine; this crate only
//! consumes the answers. Entries missing from an answer mean "no data" and are scored as
//! soft zeros.

use crate::provider::error::ProviderError;
use crate::types::ids::ZoneId;
use crate::types::lat_lon::LatLon;
use crate::types::point::PointKey;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;

/// Mean wind at a point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindSample {
    /// m/s.
    pub speed: f64,
    /// Degrees, meteorological convention (0° = north, direction the wind blows from).
    pub direction: f64,
}

/// Elevation statistics over a polygon, meters. Any field may be missing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TerrainStats {
    pub elevation_min: Option<f64>,
    pub elevation_max: Option<f64>,
    pub elevation_stddev: Option<f64>,
}

/// Land-cover class histogram as delivered by the provider: class key to pixel count, in the
/// provider's order. Keys are class codes, possibly formatted as `"40"` or `"40.0"`.
pub type LandCoverHistogram = Vec<(String, f64)>;

/// Builds a [`LandCoverHistogram`] from integer class codes.
pub fn histogram_from_codes(bins: &[(u16, f64)]) -> LandCoverHistogram {
    bins.iter()
        .map(|(code, pixels)| (code.to_string(), *pixels))
        .collect()
}

/// A zone polygon sent to the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZonePolygon {
    /// Opaque identifier used to match answers back to zones.
    pub id: ZoneId,
    /// Closed ring (first point repeated last), `[lon, lat]` pairs.
    pub ring: Vec<[f64; 2]>,
}

/// Source of per-point and per-polygon raster statistics.
///
/// Batched methods return maps keyed by the query's identity. Points are keyed by
/// [`PointKey::from_coordinate`] of the queried coordinate, polygons by [`ZonePolygon::id`].
pub trait RasterProvider {
    /// Mean annual air temperature at a point, °C. `None` when the provider has no data.
    fn mean_temperature(
        &self,
        point: LatLon,
    ) -> impl Future<Output = Result<Option<f64>, ProviderError>> + Send;

    /// Mean wind speed and direction for each point.
    fn wind_stats(
        &self,
        points: &[LatLon],
    ) -> impl Future<Output = Result<HashMap<PointKey, WindSample>, ProviderError>> + Send;

    /// Elevation min/max/standard deviation for each polygon.
    fn terrain_stats(
        &self,
        polygons: &[ZonePolygon],
    ) -> impl Future<Output = Result<HashMap<ZoneId, TerrainStats>, ProviderError>> + Send;

    /// Mean air density for each polygon, kg/m³.
    fn air_density(
        &self,
        polygons: &[ZonePolygon],
    ) -> impl Future<Output = Result<HashMap<ZoneId, f64>, ProviderError>> + Send;

    /// Mean wind power density for each polygon, W/m².
    fn power_density(
        &self,
        polygons: &[ZonePolygon],
    ) -> impl Future<Output = Result<HashMap<ZoneId, f64>, ProviderError>> + Send;

    /// Land-cover class histogram for each polygon.
    fn land_cover_histogram(
        &self,
        polygons: &[ZonePolygon],
    ) -> impl Future<Output = Result<HashMap<ZoneId, LandCoverHistogram>, ProviderError>> + Send;
}

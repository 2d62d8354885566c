// In-memory provider answering every query with fixed values.

use crate::provider::error::ProviderError;
use crate::provider::raster_provider::{
    histogram_from_codes, LandCoverHistogram, RasterProvider, TerrainStats, WindSample,
    ZonePolygon,
};
use crate::types::ids::ZoneId;
use crate::types::lat_lon::LatLon;
use crate::types::point::PointKey;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone)]
pub(crate) struct FakeProvider {
    pub temperature: Option<f64>,
    pub wind: Option<WindSample>,
    pub terrain: TerrainStats,
    pub air_density: f64,
    pub power: f64,
    pub power_by_zone: HashMap<ZoneId, f64>,
    pub histogram: LandCoverHistogram,
    /// Operations that fail with a provider error.
    pub failing: HashSet<&'static str>,
    /// Zones the polygon queries return nothing for.
    pub missing_zones: HashSet<ZoneId>,
}

impl Default for FakeProvider {
    fn default() -> Self {
        Self {
            temperature: Some(9.5),
            wind: Some(WindSample {
                speed: 6.0,
                direction: 270.0,
            }),
            terrain: TerrainStats {
                elevation_min: Some(300.0),
                elevation_max: Some(420.0),
                elevation_stddev: Some(0.0),
            },
            air_density: 1.2,
            power: 800.0,
            power_by_zone: HashMap::new(),
            histogram: histogram_from_codes(&[(30, 1000.0)]),
            failing: HashSet::new(),
            missing_zones: HashSet::new(),
        }
    }
}

impl FakeProvider {
    pub fn failing(mut self, operation: &'static str) -> Self {
        self.failing.insert(operation);
        self
    }

    fn check(&self, operation: &'static str) -> Result<(), ProviderError> {
        if self.failing.contains(operation) {
            return Err(ProviderError::Request {
                operation,
                message: "simulated outage".to_string(),
            });
        }
        Ok(())
    }

    fn per_polygon<T>(
        &self,
        polygons: &[ZonePolygon],
        value: impl Fn(ZoneId) -> T,
    ) -> HashMap<ZoneId, T> {
        polygons
            .iter()
            .filter(|polygon| !self.missing_zones.contains(&polygon.id))
            .map(|polygon| (polygon.id, value(polygon.id)))
            .collect()
    }
}

impl RasterProvider for FakeProvider {
    async fn mean_temperature(&self, _point: LatLon) -> Result<Option<f64>, ProviderError> {
        self.check("mean_temperature")?;
        Ok(self.temperature)
    }

    async fn wind_stats(
        &self,
        points: &[LatLon],
    ) -> Result<HashMap<PointKey, WindSample>, ProviderError> {
        self.check("wind_stats")?;
        Ok(match self.wind {
            Some(sample) => points
                .iter()
                .map(|point| (PointKey::from_coordinate(*point), sample))
                .collect(),
            None => HashMap::new(),
        })
    }

    async fn terrain_stats(
        &self,
        polygons: &[ZonePolygon],
    ) -> Result<HashMap<ZoneId, TerrainStats>, ProviderError> {
        self.check("terrain_stats")?;
        Ok(self.per_polygon(polygons, |_| self.terrain))
    }

    async fn air_density(
        &self,
        polygons: &[ZonePolygon],
    ) -> Result<HashMap<ZoneId, f64>, ProviderError> {
        self.check("air_density")?;
        Ok(self.per_polygon(polygons, |_| self.air_density))
    }

    async fn power_density(
        &self,
        polygons: &[ZonePolygon],
    ) -> Result<HashMap<ZoneId, f64>, ProviderError> {
        self.check("power_density")?;
        Ok(self.per_polygon(polygons, |id| {
            self.power_by_zone.get(&id).copied().unwrap_or(self.power)
        }))
    }

    async fn land_cover_histogram(
        &self,
        polygons: &[ZonePolygon],
    ) -> Result<HashMap<ZoneId, LandCoverHistogram>, ProviderError> {
        self.check("land_cover_histogram")?;
        Ok(self.per_polygon(polygons, |_| self.histogram.clone()))
    }
}

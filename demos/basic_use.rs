use skywind::{
    LandCoverHistogram, LatLon, PointKey, ProviderError, RasterProvider, Skywind, SkywindError,
    TerrainStats, WindSample, ZoneId, ZonePolygon,
};
use std::collections::HashMap;

/// Stand-in for a raster engine: a windy plateau of grassland with a lake in the
/// north-west corner.
struct Plateau;

impl Plateau {
    fn is_lake(polygon: &ZonePolygon) -> bool {
        // Rings are [lon, lat]; the first vertex is the north-east corner.
        polygon
            .ring
            .first()
            .is_some_and(|[lon, lat]| *lat > 46.8 && *lon < 23.6)
    }
}

impl RasterProvider for Plateau {
    async fn mean_temperature(&self, _point: LatLon) -> Result<Option<f64>, ProviderError> {
        Ok(Some(8.7))
    }

    async fn wind_stats(
        &self,
        points: &[LatLon],
    ) -> Result<HashMap<PointKey, WindSample>, ProviderError> {
        Ok(points
            .iter()
            .map(|point| {
                let sample = WindSample {
                    speed: 5.0 + (point.lat() - 46.6) * 10.0,
                    direction: 285.0,
                };
                (PointKey::from_coordinate(*point), sample)
            })
            .collect())
    }

    async fn terrain_stats(
        &self,
        polygons: &[ZonePolygon],
    ) -> Result<HashMap<ZoneId, TerrainStats>, ProviderError> {
        Ok(polygons
            .iter()
            .map(|polygon| {
                let stats = TerrainStats {
                    elevation_min: Some(410.0),
                    elevation_max: Some(520.0),
                    elevation_stddev: Some(12.0),
                };
                (polygon.id, stats)
            })
            .collect())
    }

    async fn air_density(
        &self,
        polygons: &[ZonePolygon],
    ) -> Result<HashMap<ZoneId, f64>, ProviderError> {
        Ok(polygons.iter().map(|polygon| (polygon.id, 1.17)).collect())
    }

    async fn power_density(
        &self,
        polygons: &[ZonePolygon],
    ) -> Result<HashMap<ZoneId, f64>, ProviderError> {
        Ok(polygons.iter().map(|polygon| (polygon.id, 540.0)).collect())
    }

    async fn land_cover_histogram(
        &self,
        polygons: &[ZonePolygon],
    ) -> Result<HashMap<ZoneId, LandCoverHistogram>, ProviderError> {
        Ok(polygons
            .iter()
            .map(|polygon| {
                let histogram = if Self::is_lake(polygon) {
                    vec![("80".to_string(), 900.0), ("30".to_string(), 100.0)]
                } else {
                    vec![("30".to_string(), 700.0), ("40".to_string(), 300.0)]
                };
                (polygon.id, histogram)
            })
            .collect())
    }
}

#[tokio::main]
async fn main() -> Result<(), SkywindError> {
    let client = Skywind::new();
    let region = client
        .compute_region()
        .center(LatLon(46.7712, 23.6236))
        .side_km(20.0)
        .zones_per_edge(5)
        .call()
        .await?;

    let mut report = client.score_grid(region.grid, &Plateau).await?;
    if !report.stages_to_retry().is_empty() {
        report = client
            .run_stages(region.grid, &Plateau, &report.stages_to_retry())
            .await?;
    }
    println!("{:#?}", report.stages);

    let details = client.region_details(region.region).await?;
    println!(
        "rating {:?}, average potential {:?}",
        details.region.metrics.rating, details.region.metrics.avg_potential
    );
    for zone in client.grid_zones(region.grid).await? {
        println!(
            "zone {:>2}: potential {:?}, wind {:?} m/s from {}",
            zone.zone.index,
            zone.zone.metrics.potential,
            zone.zone.metrics.avg_wind_speed,
            zone.wind_compass.unwrap_or("-"),
        );
    }

    Ok(())
}

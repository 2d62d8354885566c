//! Runs the scoring stages of one grid against a [`RasterProvider`].
//!
//! Each stage reads what it needs from the store, releases the lock while the provider
//! answers, then writes its own fields. A failing stage writes nothing and never undoes what
//! earlier stages wrote.

use crate::config::ScoringConfig;
use crate::pipeline::report::{PipelineReport, StageOutcome};
use crate::pipeline::stage::Stage;
use crate::provider::error::ProviderError;
use crate::provider::raster_provider::{RasterProvider, ZonePolygon};
use crate::scoring::potential::apply_potential;
use crate::scoring::region::aggregate_region;
use crate::scoring::zone_metrics::{
    apply_air_density, apply_land_cover, apply_power_density, apply_terrain, apply_wind,
    wind_query_point,
};
use crate::store::error::StoreError;
use crate::store::region_store::RegionStore;
use crate::types::ids::{GridId, ZoneId};
use crate::types::lat_lon::LatLon;
use crate::types::point::PointKey;
use crate::types::zone::{Zone, ZoneMetrics};
use chrono::Utc;
use log::{debug, info, warn};
use std::collections::HashMap;
use tokio::sync::Mutex;

enum StageFailure {
    Provider(ProviderError),
    Store(StoreError),
}

impl From<ProviderError> for StageFailure {
    fn from(e: ProviderError) -> Self {
        StageFailure::Provider(e)
    }
}

impl From<StoreError> for StageFailure {
    fn from(e: StoreError) -> Self {
        StageFailure::Store(e)
    }
}

type StageResult = Result<StageOutcome, StageFailure>;

const NO_ZONES: &str = "grid has no zones";

pub struct ScoringPipeline<'a, P> {
    store: &'a Mutex<RegionStore>,
    provider: &'a P,
    config: &'a ScoringConfig,
    grid: GridId,
}

impl<'a, P: RasterProvider> ScoringPipeline<'a, P> {
    pub fn new(
        store: &'a Mutex<RegionStore>,
        provider: &'a P,
        config: &'a ScoringConfig,
        grid: GridId,
    ) -> Self {
        Self {
            store,
            provider,
            config,
            grid,
        }
    }

    pub fn grid(&self) -> GridId {
        self.grid
    }

    /// Runs every stage in order.
    pub async fn run(&self) -> Result<PipelineReport, StoreError> {
        self.run_stages(&Stage::ALL).await
    }

    /// Runs `stages` in the given order, continuing past failed ones.
    ///
    /// # Errors
    ///
    /// Only store errors (e.g. the grid no longer exists) abort the run. Provider failures
    /// are recorded as [`StageOutcome::Failed`].
    pub async fn run_stages(&self, stages: &[Stage]) -> Result<PipelineReport, StoreError> {
        let mut report = PipelineReport::new(self.grid);
        for stage in stages {
            let outcome = self.run_stage(*stage).await?;
            report.record(*stage, outcome);
        }
        let failed = report.failed_stages();
        if failed.is_empty() {
            info!("Scoring of {} finished", self.grid);
        } else {
            warn!(
                "Scoring of {} finished with {} failed stage(s): {:?}",
                self.grid,
                failed.len(),
                failed
            );
        }
        Ok(report)
    }

    /// Runs one stage. Rerunning a stage rewrites the same fields.
    pub async fn run_stage(&self, stage: Stage) -> Result<StageOutcome, StoreError> {
        info!("Running {} stage for {}", stage, self.grid);
        let result = match stage {
            Stage::Temperature => self.temperature_stage().await,
            Stage::Wind => self.wind_stage().await,
            Stage::Terrain => self.terrain_stage().await,
            Stage::AirDensity => self.air_density_stage().await,
            Stage::PowerDensity => self.power_density_stage().await,
            Stage::LandCover => self.land_cover_stage().await,
            Stage::Potential => self.potential_stage().await,
            Stage::RegionMetrics => self.region_metrics_stage().await,
        };
        match result {
            Ok(outcome) => {
                match &outcome {
                    StageOutcome::Skipped { reason } => {
                        info!("Skipped {} stage for {}: {}", stage, self.grid, reason)
                    }
                    _ => debug!("{} stage for {}: {:?}", stage, self.grid, outcome),
                }
                Ok(outcome)
            }
            Err(StageFailure::Provider(e)) => {
                warn!("{} stage failed for {}: {}", stage, self.grid, e);
                Ok(StageOutcome::Failed {
                    reason: e.to_string(),
                })
            }
            Err(StageFailure::Store(e)) => Err(e),
        }
    }

    async fn zone_polygons(&self) -> Result<Vec<ZonePolygon>, StoreError> {
        let store = self.store.lock().await;
        store
            .grid_zones(self.grid)?
            .into_iter()
            .map(|zone| {
                Ok(ZonePolygon {
                    id: zone.id,
                    ring: store.resolve_corners(zone.corners)?.closed_ring(),
                })
            })
            .collect()
    }

    /// Applies an answer per zone; zones missing from `answers` get the soft default.
    /// Zones deleted since the query are ignored.
    async fn write_layer<T>(
        &self,
        zones: &[ZoneId],
        answers: &HashMap<ZoneId, T>,
        apply: impl Fn(&mut ZoneMetrics, Option<&T>),
    ) -> usize {
        let mut store = self.store.lock().await;
        let mut updated = 0;
        for id in zones {
            if let Ok(zone) = store.zone_mut(*id) {
                apply(&mut zone.metrics, answers.get(id));
                updated += 1;
            }
        }
        let missing = zones.iter().filter(|id| !answers.contains_key(*id)).count();
        if missing > 0 {
            debug!("Provider had no data for {} of {} zones", missing, zones.len());
        }
        updated
    }

    async fn temperature_stage(&self) -> StageResult {
        let (region_id, center) = {
            let store = self.store.lock().await;
            let region = store.region(store.grid(self.grid)?.region)?;
            (region.id, store.points().coordinate(region.center)?)
        };
        let temperature = self.provider.mean_temperature(center).await?;
        if temperature.is_none() {
            debug!("No temperature data at {:?}", center);
        }
        let mut store = self.store.lock().await;
        store.region_mut(region_id)?.metrics.avg_temperature = Some(temperature.unwrap_or(0.0));
        Ok(StageOutcome::Completed { zones_updated: 0 })
    }

    async fn wind_stage(&self) -> StageResult {
        let queries: Vec<(ZoneId, LatLon)> = {
            let store = self.store.lock().await;
            store
                .grid_zones(self.grid)?
                .into_iter()
                .map(|zone| {
                    let corners = store.resolve_corners(zone.corners)?;
                    Ok((zone.id, wind_query_point(&corners)))
                })
                .collect::<Result<_, StoreError>>()?
        };
        if queries.is_empty() {
            return Ok(skipped(NO_ZONES));
        }
        let points: Vec<LatLon> = queries.iter().map(|(_, point)| *point).collect();
        let samples = self.provider.wind_stats(&points).await?;

        let by_zone: HashMap<ZoneId, _> = queries
            .iter()
            .filter_map(|(id, point)| {
                samples
                    .get(&PointKey::from_coordinate(*point))
                    .map(|sample| (*id, *sample))
            })
            .collect();
        let ids: Vec<ZoneId> = queries.iter().map(|(id, _)| *id).collect();
        let updated = self.write_layer(&ids, &by_zone, apply_wind).await;
        Ok(StageOutcome::Completed {
            zones_updated: updated,
        })
    }

    async fn terrain_stage(&self) -> StageResult {
        let polygons = self.zone_polygons().await?;
        if polygons.is_empty() {
            return Ok(skipped(NO_ZONES));
        }
        let answers = self.provider.terrain_stats(&polygons).await?;
        let updated = self
            .write_layer(&polygon_ids(&polygons), &answers, apply_terrain)
            .await;
        Ok(StageOutcome::Completed {
            zones_updated: updated,
        })
    }

    async fn air_density_stage(&self) -> StageResult {
        let polygons = self.zone_polygons().await?;
        if polygons.is_empty() {
            return Ok(skipped(NO_ZONES));
        }
        let answers = self.provider.air_density(&polygons).await?;
        let updated = self
            .write_layer(&polygon_ids(&polygons), &answers, |metrics, value| {
                apply_air_density(metrics, value.copied())
            })
            .await;
        Ok(StageOutcome::Completed {
            zones_updated: updated,
        })
    }

    async fn power_density_stage(&self) -> StageResult {
        let polygons = self.zone_polygons().await?;
        if polygons.is_empty() {
            return Ok(skipped(NO_ZONES));
        }
        let answers = self.provider.power_density(&polygons).await?;
        let updated = self
            .write_layer(&polygon_ids(&polygons), &answers, |metrics, value| {
                apply_power_density(metrics, value.copied())
            })
            .await;
        Ok(StageOutcome::Completed {
            zones_updated: updated,
        })
    }

    async fn land_cover_stage(&self) -> StageResult {
        let polygons = self.zone_polygons().await?;
        if polygons.is_empty() {
            return Ok(skipped(NO_ZONES));
        }
        let answers = self.provider.land_cover_histogram(&polygons).await?;
        let updated = self
            .write_layer(&polygon_ids(&polygons), &answers, apply_land_cover)
            .await;
        Ok(StageOutcome::Completed {
            zones_updated: updated,
        })
    }

    async fn potential_stage(&self) -> StageResult {
        let mut store = self.store.lock().await;
        let ids = store.grid(self.grid)?.zones.clone();
        if ids.is_empty() {
            return Ok(skipped(NO_ZONES));
        }
        let mut incomplete = 0;
        let mut updated = 0;
        for id in &ids {
            let Ok(zone) = store.zone_mut(*id) else {
                continue;
            };
            if !zone_inputs_complete(zone) {
                incomplete += 1;
            }
            apply_potential(zone, self.config);
            updated += 1;
        }
        if incomplete > 0 {
            warn!(
                "{} of {} zones in {} were scored with missing layers",
                incomplete,
                ids.len(),
                self.grid
            );
        }
        Ok(StageOutcome::Completed {
            zones_updated: updated,
        })
    }

    async fn region_metrics_stage(&self) -> StageResult {
        let mut store = self.store.lock().await;
        let region_id = store.grid(self.grid)?.region;
        let zones: Vec<Zone> = store
            .grid_zones(self.grid)?
            .into_iter()
            .cloned()
            .collect();
        if let Some(stale) = zones
            .iter()
            .find(|zone| zone.metrics.potential.is_some() && !zone.metrics.potential_is_current())
        {
            return Ok(skipped(&format!(
                "potential of zone #{} predates its input layers",
                stale.index
            )));
        }
        let region = store.region_mut(region_id)?;
        match aggregate_region(region, &zones, Utc::now()) {
            Ok(Some(summary)) => {
                info!(
                    "{}: average potential {:.1}, rating {}, best zone #{} ({:.1})",
                    region_id,
                    summary.avg_potential,
                    summary.rating,
                    summary.best_zone_index,
                    summary.best_potential
                );
                Ok(StageOutcome::Completed {
                    zones_updated: summary.zone_count,
                })
            }
            Ok(None) => Ok(skipped(NO_ZONES)),
            Err(e) => Ok(skipped(&e.to_string())),
        }
    }
}

fn skipped(reason: &str) -> StageOutcome {
    StageOutcome::Skipped {
        reason: reason.to_string(),
    }
}

fn polygon_ids(polygons: &[ZonePolygon]) -> Vec<ZoneId> {
    polygons.iter().map(|polygon| polygon.id).collect()
}

/// Whether every input of the potential formula was fetched.
fn zone_inputs_complete(zone: &Zone) -> bool {
    let metrics = &zone.metrics;
    metrics.power_avg.is_some() && metrics.roughness.is_some() && metrics.land_cover.is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::consistency::DEFAULT_TOLERANCE;
    use crate::geometry::zone_grid::GridGeometry;
    use crate::provider::fake::FakeProvider;
    use crate::provider::raster_provider::{
        histogram_from_codes, LandCoverHistogram, TerrainStats, WindSample,
    };
    use crate::store::region_store::ComputedRegion;
    use crate::types::status::ComputationStatus;

    async fn setup(n: u32) -> (Mutex<RegionStore>, ComputedRegion) {
        let mut store = RegionStore::new();
        let geometry = GridGeometry::compute(LatLon(46.7712, 23.6236), 20.0, n);
        let computed = store
            .apply_grid_geometry(&geometry, DEFAULT_TOLERANCE)
            .unwrap();
        (Mutex::new(store), computed)
    }

    #[tokio::test]
    async fn test_full_run_scores_every_zone() -> Result<(), StoreError> {
        let (store, computed) = setup(3).await;
        let provider = FakeProvider::default();
        let config = ScoringConfig::default();
        let pipeline = ScoringPipeline::new(&store, &provider, &config, computed.grid);

        let report = pipeline.run().await?;
        assert!(report.is_complete(), "{:?}", report);
        assert_eq!(report.stages.len(), Stage::ALL.len());

        let store = store.lock().await;
        for zone in store.grid_zones(computed.grid)? {
            assert_eq!(zone.status(), ComputationStatus::Computed);
            assert_eq!(zone.metrics.potential, Some(100.0));
            assert_eq!(zone.metrics.buildable_fraction, Some(1.0));
            assert_eq!(zone.metrics.wind_direction, Some(270.0));
        }
        let region = store.region(computed.region)?;
        assert_eq!(region.metrics.status(), ComputationStatus::Computed);
        assert_eq!(region.metrics.avg_temperature, Some(9.5));
        assert_eq!(region.metrics.rating, Some(1000));
        assert_eq!(region.metrics.wind_rose.map(|rose| rose.w), Some(6.0));
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_stage_does_not_block_others() -> Result<(), StoreError> {
        let (store, computed) = setup(2).await;
        let provider = FakeProvider::default().failing("terrain_stats");
        let config = ScoringConfig::default();
        let pipeline = ScoringPipeline::new(&store, &provider, &config, computed.grid);

        let report = pipeline.run().await?;
        assert_eq!(report.failed_stages(), vec![Stage::Terrain]);
        assert!(report
            .outcome(Stage::LandCover)
            .is_some_and(StageOutcome::is_completed));
        // Potentials computed without terrain are not final, so the region waits.
        assert!(matches!(
            report.outcome(Stage::RegionMetrics),
            Some(StageOutcome::Skipped { .. })
        ));

        let store = store.lock().await;
        for zone in store.grid_zones(computed.grid)? {
            assert_eq!(zone.metrics.roughness, None);
            assert_eq!(zone.metrics.power_avg, Some(800.0));
            // Missing roughness counts as flat terrain.
            assert_eq!(zone.metrics.potential, Some(100.0));
            assert!(!zone.metrics.potential_is_current());
            assert_eq!(zone.status(), ComputationStatus::PartiallyComputed);
        }
        assert!(store.region(computed.region)?.metrics.avg_potential.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_retry_rescores_after_failed_layer() -> Result<(), StoreError> {
        let (store, computed) = setup(2).await;
        let config = ScoringConfig::default();
        let outage = FakeProvider::default().failing("terrain_stats");
        let report = ScoringPipeline::new(&store, &outage, &config, computed.grid)
            .run()
            .await?;
        assert_eq!(
            report.stages_to_retry(),
            vec![Stage::Terrain, Stage::Potential, Stage::RegionMetrics]
        );

        let rugged = FakeProvider {
            terrain: TerrainStats {
                elevation_min: Some(300.0),
                elevation_max: Some(420.0),
                elevation_stddev: Some(25.0),
            },
            ..FakeProvider::default()
        };
        let retry = ScoringPipeline::new(&store, &rugged, &config, computed.grid)
            .run_stages(&report.stages_to_retry())
            .await?;
        assert!(retry.is_complete(), "{:?}", retry);

        let store = store.lock().await;
        for zone in store.grid_zones(computed.grid)? {
            assert_eq!(zone.metrics.roughness, Some(25.0));
            assert_eq!(zone.metrics.potential, Some(85.0));
            assert_eq!(zone.status(), ComputationStatus::Computed);
        }
        let region = store.region(computed.region)?;
        assert_eq!(region.metrics.avg_potential, Some(85.0));
        assert_eq!(region.metrics.rating, Some(850));
        Ok(())
    }

    #[tokio::test]
    async fn test_layer_rerun_alone_marks_potential_stale() -> Result<(), StoreError> {
        let (store, computed) = setup(2).await;
        let config = ScoringConfig::default();
        ScoringPipeline::new(&store, &FakeProvider::default(), &config, computed.grid)
            .run()
            .await?;

        let outcome = ScoringPipeline::new(&store, &FakeProvider::default(), &config, computed.grid)
            .run_stage(Stage::PowerDensity)
            .await?;
        assert!(outcome.is_completed());

        let store = store.lock().await;
        for zone in store.grid_zones(computed.grid)? {
            assert_eq!(zone.status(), ComputationStatus::PartiallyComputed);
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_stage_keeps_previous_values() -> Result<(), StoreError> {
        let (store, computed) = setup(2).await;
        let config = ScoringConfig::default();
        ScoringPipeline::new(&store, &FakeProvider::default(), &config, computed.grid)
            .run()
            .await?;

        let outage = FakeProvider {
            power: 100.0,
            ..FakeProvider::default()
        }
        .failing("power_density");
        let outcome = ScoringPipeline::new(&store, &outage, &config, computed.grid)
            .run_stage(Stage::PowerDensity)
            .await?;
        assert!(outcome.is_failed());

        let store = store.lock().await;
        for zone in store.grid_zones(computed.grid)? {
            assert_eq!(zone.metrics.power_avg, Some(800.0));
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_data_is_soft_zero() -> Result<(), StoreError> {
        let (store, computed) = setup(2).await;
        let first = computed.zones[0].id;
        let mut provider = FakeProvider {
            wind: None,
            ..FakeProvider::default()
        };
        provider.missing_zones.insert(first);
        let config = ScoringConfig::default();
        let report = ScoringPipeline::new(&store, &provider, &config, computed.grid)
            .run()
            .await?;
        assert!(report.is_complete());

        let store = store.lock().await;
        let zone = store.zone(first)?;
        assert_eq!(zone.metrics.avg_wind_speed, Some(0.0));
        assert_eq!(zone.metrics.power_avg, Some(0.0));
        assert_eq!(zone.metrics.roughness, Some(0.0));
        assert!(zone.metrics.land_cover.as_ref().is_some_and(|c| c.is_empty()));
        assert_eq!(zone.metrics.potential, Some(0.0));
        assert_eq!(zone.status(), ComputationStatus::Computed);
        Ok(())
    }

    #[tokio::test]
    async fn test_region_stage_skips_unscored_zones() -> Result<(), StoreError> {
        let (store, computed) = setup(2).await;
        let config = ScoringConfig::default();
        let outcome = ScoringPipeline::new(&store, &FakeProvider::default(), &config, computed.grid)
            .run_stage(Stage::RegionMetrics)
            .await?;
        assert!(matches!(outcome, StageOutcome::Skipped { .. }));
        let store = store.lock().await;
        assert!(store.region(computed.region)?.metrics.avg_potential.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_best_zone_follows_power() -> Result<(), StoreError> {
        let (store, computed) = setup(3).await;
        let mut provider = FakeProvider {
            power: 400.0,
            histogram: histogram_from_codes(&[(40, 10.0)]),
            ..FakeProvider::default()
        };
        provider.power_by_zone.insert(computed.zones[6].id, 600.0);
        provider.power_by_zone.insert(computed.zones[2].id, 600.0);
        let config = ScoringConfig::default();
        ScoringPipeline::new(&store, &provider, &config, computed.grid)
            .run()
            .await?;

        let store = store.lock().await;
        let region = store.region(computed.region)?;
        // Zones 3 and 7 tie; the lower index wins.
        assert_eq!(region.metrics.best_zone, Some(computed.zones[2].id));
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_grid_is_an_error() {
        let (store, _) = setup(1).await;
        let config = ScoringConfig::default();
        let provider = FakeProvider::default();
        let result = ScoringPipeline::new(&store, &provider, &config, GridId(99))
            .run()
            .await;
        assert!(matches!(result, Err(StoreError::UnknownGrid(GridId(99)))));
    }

    /// Regenerates the grid's zones while answering the power density query.
    struct RegeneratingProvider<'a> {
        inner: FakeProvider,
        store: &'a Mutex<RegionStore>,
        grid: GridId,
        geometry: GridGeometry,
    }

    impl RasterProvider for RegeneratingProvider<'_> {
        async fn mean_temperature(&self, point: LatLon) -> Result<Option<f64>, ProviderError> {
            self.inner.mean_temperature(point).await
        }

        async fn wind_stats(
            &self,
            points: &[LatLon],
        ) -> Result<HashMap<PointKey, WindSample>, ProviderError> {
            self.inner.wind_stats(points).await
        }

        async fn terrain_stats(
            &self,
            polygons: &[ZonePolygon],
        ) -> Result<HashMap<ZoneId, TerrainStats>, ProviderError> {
            self.inner.terrain_stats(polygons).await
        }

        async fn air_density(
            &self,
            polygons: &[ZonePolygon],
        ) -> Result<HashMap<ZoneId, f64>, ProviderError> {
            self.inner.air_density(polygons).await
        }

        async fn power_density(
            &self,
            polygons: &[ZonePolygon],
        ) -> Result<HashMap<ZoneId, f64>, ProviderError> {
            self.store
                .lock()
                .await
                .create_zones(self.grid, &self.geometry)
                .unwrap();
            self.inner.power_density(polygons).await
        }

        async fn land_cover_histogram(
            &self,
            polygons: &[ZonePolygon],
        ) -> Result<HashMap<ZoneId, LandCoverHistogram>, ProviderError> {
            self.inner.land_cover_histogram(polygons).await
        }
    }

    #[tokio::test]
    async fn test_regeneration_mid_run_is_not_an_error() -> Result<(), StoreError> {
        let (store, computed) = setup(2).await;
        let config = ScoringConfig::default();
        let provider = RegeneratingProvider {
            inner: FakeProvider::default(),
            store: &store,
            grid: computed.grid,
            geometry: GridGeometry::compute(LatLon(46.7712, 23.6236), 20.0, 2),
        };
        let report = ScoringPipeline::new(&store, &provider, &config, computed.grid)
            .run()
            .await?;

        // The answers were for zones that no longer exist.
        assert_eq!(
            report.outcome(Stage::PowerDensity),
            Some(&StageOutcome::Completed { zones_updated: 0 })
        );
        assert_eq!(
            report.outcome(Stage::Potential),
            Some(&StageOutcome::Completed { zones_updated: 4 })
        );
        assert!(matches!(
            report.outcome(Stage::RegionMetrics),
            Some(StageOutcome::Skipped { .. })
        ));

        let store = store.lock().await;
        let zones = store.grid_zones(computed.grid)?;
        assert_eq!(zones.len(), 4);
        assert!(zones.iter().all(|zone| !computed.zones.iter().any(|old| old.id == zone.id)));
        Ok(())
    }
}

//! This module provides the main entry point of the crate: the [`Skywind`] client, which
//! computes region grids, scores them against a raster provider and answers read queries
//! about the results.

use crate::config::ScoringConfig;
use crate::error::SkywindError;
use crate::geojson::grid_feature_collection;
use crate::geometry::corners::edge_distortion;
use crate::geometry::zone_grid::generate_grid;
use crate::pipeline::report::PipelineReport;
use crate::pipeline::runner::ScoringPipeline;
use crate::pipeline::stage::Stage;
use crate::provider::raster_provider::RasterProvider;
use crate::store::region_store::{ComputedRegion, RegionStore};
use crate::store::snapshot::{load_snapshot, save_snapshot};
use crate::store::zone_index::ZoneIndex;
use crate::types::compass::compass_label_16;
use crate::types::ids::{GridId, RegionId, ZoneId};
use crate::types::lat_lon::{Corners, LatLon};
use crate::types::region::{Grid, Region};
use crate::types::status::ComputationStatus;
use crate::types::zone::Zone;
use crate::utils::{default_cache_dir, ensure_cache_dir_exists};
use bon::bon;
use log::{info, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// A zone with its resolved geometry, as returned by the read queries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneDetails {
    pub zone: Zone,
    pub corners: Corners,
    /// Arithmetic mean of the corners.
    pub centroid: LatLon,
    pub status: ComputationStatus,
    /// 16-point compass label of the wind direction, when known.
    pub wind_compass: Option<&'static str>,
}

/// A region with its resolved geometry and grids.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionDetails {
    pub region: Region,
    pub center: LatLon,
    pub corners: Option<Corners>,
    pub status: ComputationStatus,
    pub grids: Vec<Grid>,
}

/// The main client.
///
/// Holds the region store behind an async mutex. Create an in-memory instance with
/// [`Skywind::new()`], or one that loads and saves a snapshot with
/// [`Skywind::with_cache_folder()`].
///
/// # Examples
///
/// ```rust
/// # use skywind::{Skywind, SkywindError, LatLon};
/// # #[tokio::main]
/// # async fn main() -> Result<(), SkywindError> {
/// let client = Skywind::new();
/// let region = client
///     .compute_region()
///     .center(LatLon(46.7712, 23.6236))
///     .side_km(20.0)
///     .zones_per_edge(10)
///     .call()
///     .await?;
/// assert_eq!(region.zones.len(), 100);
/// assert_eq!(region.zones[0].index, 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Skywind {
    store: Mutex<RegionStore>,
    config: ScoringConfig,
    cache_folder: Option<PathBuf>,
}

impl Default for Skywind {
    fn default() -> Self {
        Self::new()
    }
}

#[bon]
impl Skywind {
    /// Creates a client that keeps its state in memory only.
    pub fn new() -> Self {
        Self {
            store: Mutex::new(RegionStore::new()),
            config: ScoringConfig::default(),
            cache_folder: None,
        }
    }

    /// Creates a client backed by a snapshot in `cache_folder`.
    ///
    /// The folder is created if needed and an existing snapshot is loaded. Call
    /// [`Skywind::save`] to write the state back.
    ///
    /// # Errors
    ///
    /// Returns [`SkywindError::Store`] if the folder cannot be created or the snapshot
    /// cannot be read or decoded.
    pub async fn with_cache_folder(cache_folder: PathBuf) -> Result<Self, SkywindError> {
        ensure_cache_dir_exists(&cache_folder).await?;
        let store = match load_snapshot(&cache_folder).await? {
            Some(store) => store,
            None => {
                info!("No snapshot in {}, starting empty", cache_folder.display());
                RegionStore::new()
            }
        };
        Ok(Self {
            store: Mutex::new(store),
            config: ScoringConfig::default(),
            cache_folder: Some(cache_folder),
        })
    }

    /// [`Skywind::with_cache_folder`] on `<system cache dir>/skywind_rs_cache`.
    pub async fn with_default_cache() -> Result<Self, SkywindError> {
        Self::with_cache_folder(default_cache_dir()?).await
    }

    /// Replaces the scoring configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SkywindError::Config`] if the configuration is invalid.
    pub fn with_config(mut self, config: ScoringConfig) -> Result<Self, SkywindError> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn cache_folder(&self) -> Option<&Path> {
        self.cache_folder.as_deref()
    }

    /// Writes the snapshot. Does nothing for an in-memory client.
    pub async fn save(&self) -> Result<(), SkywindError> {
        let Some(folder) = &self.cache_folder else {
            return Ok(());
        };
        let store = self.store.lock().await;
        save_snapshot(&store, folder).await?;
        Ok(())
    }

    /// Computes (or reuses) the region around `center` and its `zones_per_edge²` grid.
    ///
    /// The region is unique per center and side, the grid per region, side and
    /// resolution. Zones are regenerated only when the grid has none or their geometry no
    /// longer matches; otherwise they keep their metrics.
    ///
    /// This method uses a builder pattern.
    ///
    /// # Arguments
    ///
    /// * `.center(LatLon)`: **Required.** Center of the region.
    /// * `.side_km(f64)`: **Required.** Side length of the square, km.
    /// * `.zones_per_edge(u32)`: **Required.** Grid resolution `n`; the grid has `n²` zones.
    ///
    /// # Errors
    ///
    /// Returns [`SkywindError::Geometry`] for malformed coordinates, a non-positive side,
    /// `n < 1`, or a request outside the configured approximation limits. Nothing is stored
    /// in that case.
    #[builder]
    pub async fn compute_region(
        &self,
        center: LatLon,
        side_km: f64,
        zones_per_edge: u32,
    ) -> Result<ComputedRegion, SkywindError> {
        let geometry = generate_grid(center, side_km, zones_per_edge, &self.config.limits)?;
        let distortion = edge_distortion(&geometry.corners, side_km);
        if distortion > self.config.limits.distortion_warning {
            warn!(
                "Region at {:?} with side {} km deviates {:.2}% from a true square",
                center,
                side_km,
                distortion * 100.0
            );
        }

        let mut store = self.store.lock().await;
        let computed =
            store.apply_grid_geometry(&geometry, self.config.consistency_tolerance)?;
        info!(
            "{} / {}: {} zones ({})",
            computed.region,
            computed.grid,
            computed.zones.len(),
            if computed.regenerated {
                "regenerated"
            } else {
                "reused"
            }
        );
        Ok(computed)
    }

    /// Runs every scoring stage for `grid` against `provider`.
    ///
    /// Provider failures do not abort the run; they are reported per stage in the returned
    /// [`PipelineReport`].
    ///
    /// # Errors
    ///
    /// Returns [`SkywindError::Store`] if the grid does not exist.
    pub async fn score_grid<P: RasterProvider>(
        &self,
        grid: GridId,
        provider: &P,
    ) -> Result<PipelineReport, SkywindError> {
        Ok(ScoringPipeline::new(&self.store, provider, &self.config, grid)
            .run()
            .await?)
    }

    /// Runs only `stages` for `grid`, e.g. [`PipelineReport::stages_to_retry`] of a previous
    /// report.
    pub async fn run_stages<P: RasterProvider>(
        &self,
        grid: GridId,
        provider: &P,
        stages: &[Stage],
    ) -> Result<PipelineReport, SkywindError> {
        Ok(ScoringPipeline::new(&self.store, provider, &self.config, grid)
            .run_stages(stages)
            .await?)
    }

    /// Id of the region at `center` with side `side_km`, if it was computed before.
    pub async fn find_region(&self, center: LatLon, side_km: f64) -> Option<RegionId> {
        let store = self.store.lock().await;
        store.find_region(center, side_km).map(|region| region.id)
    }

    pub async fn region_details(&self, region: RegionId) -> Result<RegionDetails, SkywindError> {
        let store = self.store.lock().await;
        let record = store.region(region)?;
        let grids = record
            .grids
            .iter()
            .map(|id| store.grid(*id).cloned())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(RegionDetails {
            center: store.points().coordinate(record.center)?,
            corners: record
                .corners
                .map(|ids| store.resolve_corners(ids))
                .transpose()?,
            status: record.metrics.status(),
            region: record.clone(),
            grids,
        })
    }

    /// Zones of `grid` ordered by zone index.
    pub async fn grid_zones(&self, grid: GridId) -> Result<Vec<ZoneDetails>, SkywindError> {
        let store = self.store.lock().await;
        store
            .grid_zones(grid)?
            .into_iter()
            .map(|zone| zone_details(&store, zone))
            .collect()
    }

    pub async fn zone(&self, zone: ZoneId) -> Result<ZoneDetails, SkywindError> {
        let store = self.store.lock().await;
        zone_details(&store, store.zone(zone)?)
    }

    /// Finds the zone of `grid` that contains `location`.
    ///
    /// This method uses a builder pattern.
    ///
    /// # Arguments
    ///
    /// * `.grid(GridId)`: **Required.** The grid to search.
    /// * `.location(LatLon)`: **Required.** The coordinate to look up.
    ///
    /// # Returns
    ///
    /// `Ok(None)` when the location is outside the grid. A location on an edge shared by
    /// several zones resolves to the lowest zone index.
    #[builder]
    pub async fn zone_at(
        &self,
        grid: GridId,
        location: LatLon,
    ) -> Result<Option<ZoneDetails>, SkywindError> {
        let store = self.store.lock().await;
        let index = ZoneIndex::build(&store, grid)?;
        match index.zone_at(location) {
            Some(id) => Ok(Some(zone_details(&store, store.zone(id)?)?)),
            None => Ok(None),
        }
    }

    /// GeoJSON `FeatureCollection` of `grid`.
    pub async fn grid_geojson(&self, grid: GridId) -> Result<serde_json::Value, SkywindError> {
        let store = self.store.lock().await;
        grid_feature_collection(&store, grid)
    }
}

fn zone_details(store: &RegionStore, zone: &Zone) -> Result<ZoneDetails, SkywindError> {
    let corners = store.resolve_corners(zone.corners)?;
    Ok(ZoneDetails {
        centroid: corners.centroid(),
        corners,
        status: zone.status(),
        wind_compass: zone.metrics.wind_direction.map(compass_label_16),
        zone: zone.clone(),
    })
}

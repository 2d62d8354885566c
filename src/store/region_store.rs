//! In-process arena of regions, grids and zones.
//!
//! Entities are addressed by typed ids and deduplicated by their natural keys: a region per
//! `(center point, side_km)`, a grid per `(region, side_km, zones_per_edge)`. Corner
//! coordinates are interned in the embedded [`PointCache`].

use crate::geometry::consistency::is_stale;
use crate::geometry::zone_grid::GridGeometry;
use crate::store::error::StoreError;
use crate::store::point_cache::PointCache;
use crate::types::ids::{GridId, PointId, RegionId, ZoneId};
use crate::types::lat_lon::{Corners, LatLon};
use crate::types::region::{Grid, Region, RegionMetrics};
use crate::types::zone::{CornerIds, Zone, ZoneMetrics};
use log::{debug, info};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
struct RegionKey {
    center: PointId,
    side_km: OrderedFloat<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
struct GridKey {
    region: RegionId,
    side_km: OrderedFloat<f64>,
    zones_per_edge: u32,
}

/// A zone as returned by a region computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputedZone {
    pub id: ZoneId,
    pub index: u32,
    pub corners: Corners,
}

/// Result of [`RegionStore::apply_grid_geometry`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputedRegion {
    pub region: RegionId,
    pub grid: GridId,
    /// Interned (rounded) center.
    pub center: LatLon,
    pub side_km: f64,
    pub zones_per_edge: u32,
    /// Interned region corners.
    pub corners: Corners,
    /// Zones ordered by index.
    pub zones: Vec<ComputedZone>,
    /// Whether the grid's zones were (re)created by this request.
    pub regenerated: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegionStore {
    points: PointCache,
    regions: BTreeMap<RegionId, Region>,
    grids: BTreeMap<GridId, Grid>,
    zones: BTreeMap<ZoneId, Zone>,
    region_keys: HashMap<RegionKey, RegionId>,
    grid_keys: HashMap<GridKey, GridId>,
    next_region: u64,
    next_grid: u64,
    next_zone: u64,
}

impl RegionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn points(&self) -> &PointCache {
        &self.points
    }

    pub fn points_mut(&mut self) -> &mut PointCache {
        &mut self.points
    }

    pub fn region(&self, id: RegionId) -> Result<&Region, StoreError> {
        self.regions.get(&id).ok_or(StoreError::UnknownRegion(id))
    }

    pub fn region_mut(&mut self, id: RegionId) -> Result<&mut Region, StoreError> {
        self.regions.get_mut(&id).ok_or(StoreError::UnknownRegion(id))
    }

    pub fn grid(&self, id: GridId) -> Result<&Grid, StoreError> {
        self.grids.get(&id).ok_or(StoreError::UnknownGrid(id))
    }

    pub fn zone(&self, id: ZoneId) -> Result<&Zone, StoreError> {
        self.zones.get(&id).ok_or(StoreError::UnknownZone(id))
    }

    pub fn zone_mut(&mut self, id: ZoneId) -> Result<&mut Zone, StoreError> {
        self.zones.get_mut(&id).ok_or(StoreError::UnknownZone(id))
    }

    pub fn regions(&self) -> impl Iterator<Item = &Region> {
        self.regions.values()
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    pub fn grid_count(&self) -> usize {
        self.grids.len()
    }

    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }

    pub fn intern_corners(&mut self, corners: &Corners) -> CornerIds {
        CornerIds {
            a: self.points.get_or_create(corners.a).id,
            b: self.points.get_or_create(corners.b).id,
            c: self.points.get_or_create(corners.c).id,
            d: self.points.get_or_create(corners.d).id,
        }
    }

    pub fn resolve_corners(&self, ids: CornerIds) -> Result<Corners, StoreError> {
        Ok(Corners {
            a: self.points.coordinate(ids.a)?,
            b: self.points.coordinate(ids.b)?,
            c: self.points.coordinate(ids.c)?,
            d: self.points.coordinate(ids.d)?,
        })
    }

    /// The region at `center` (rounded like any interned point) with this side, if any.
    pub fn find_region(&self, center: LatLon, side_km: f64) -> Option<&Region> {
        let center = self.points.find(center)?;
        let key = RegionKey {
            center: center.id,
            side_km: OrderedFloat(side_km),
        };
        self.region_keys
            .get(&key)
            .and_then(|id| self.regions.get(id))
    }

    /// Returns the region for `(center, side_km)` and whether it was created.
    pub fn get_or_create_region(&mut self, center: PointId, side_km: f64) -> (RegionId, bool) {
        let key = RegionKey {
            center,
            side_km: OrderedFloat(side_km),
        };
        if let Some(id) = self.region_keys.get(&key) {
            debug!("Reusing {} for {} / {} km", id, center, side_km);
            return (*id, false);
        }
        let id = RegionId(self.next_region);
        self.next_region += 1;
        self.regions.insert(
            id,
            Region {
                id,
                center,
                side_km,
                corners: None,
                grids: Vec::new(),
                metrics: RegionMetrics::default(),
            },
        );
        self.region_keys.insert(key, id);
        debug!("Created {} for {} / {} km", id, center, side_km);
        (id, true)
    }

    /// Returns the grid for `(region, side_km, zones_per_edge)` and whether it was created.
    pub fn get_or_create_grid(
        &mut self,
        region: RegionId,
        side_km: f64,
        zones_per_edge: u32,
    ) -> Result<(GridId, bool), StoreError> {
        let key = GridKey {
            region,
            side_km: OrderedFloat(side_km),
            zones_per_edge,
        };
        if let Some(id) = self.grid_keys.get(&key) {
            return Ok((*id, false));
        }
        let id = GridId(self.next_grid);
        let owner = self
            .regions
            .get_mut(&region)
            .ok_or(StoreError::UnknownRegion(region))?;
        self.next_grid += 1;
        owner.grids.push(id);
        self.grids.insert(
            id,
            Grid {
                id,
                region,
                side_km,
                zones_per_edge,
                corners: None,
                zones: Vec::new(),
            },
        );
        self.grid_keys.insert(key, id);
        debug!("Created {} ({}x{}) in {}", id, zones_per_edge, zones_per_edge, region);
        Ok((id, true))
    }

    /// Zones of a grid, ordered by zone index.
    pub fn grid_zones(&self, grid: GridId) -> Result<Vec<&Zone>, StoreError> {
        self.grid(grid)?
            .zones
            .iter()
            .map(|id| self.zone(*id))
            .collect()
    }

    /// Resolved corners of every zone of a grid, ordered by zone index.
    pub fn grid_cell_corners(&self, grid: GridId) -> Result<Vec<Corners>, StoreError> {
        self.grid_zones(grid)?
            .into_iter()
            .map(|zone| self.resolve_corners(zone.corners))
            .collect()
    }

    pub fn zone_corners(&self, zone: ZoneId) -> Result<Corners, StoreError> {
        self.resolve_corners(self.zone(zone)?.corners)
    }

    /// Whether the persisted zones of `grid` differ from what the generator produces for
    /// its region center, side and resolution.
    pub fn is_grid_stale(&self, grid: GridId, tolerance: f64) -> Result<bool, StoreError> {
        let record = self.grid(grid)?;
        let region = self.region(record.region)?;
        let center = self.points.coordinate(region.center)?;
        let persisted = self.grid_cell_corners(grid)?;
        Ok(is_stale(
            center,
            record.side_km,
            record.zones_per_edge,
            &persisted,
            tolerance,
        ))
    }

    /// Deletes every zone of `grid`, returning how many were removed. Points stay.
    pub fn delete_grid_zones(&mut self, grid: GridId) -> Result<usize, StoreError> {
        let record = self
            .grids
            .get_mut(&grid)
            .ok_or(StoreError::UnknownGrid(grid))?;
        let removed = std::mem::take(&mut record.zones);
        for id in &removed {
            self.zones.remove(id);
        }
        Ok(removed.len())
    }

    /// Creates one zone per cell of `geometry`, in zone-index order. The grid must be empty.
    pub fn create_zones(
        &mut self,
        grid: GridId,
        geometry: &GridGeometry,
    ) -> Result<Vec<ZoneId>, StoreError> {
        if !self.grid(grid)?.zones.is_empty() {
            self.delete_grid_zones(grid)?;
        }
        let mut created = Vec::with_capacity(geometry.cells.len());
        for (index, cell) in geometry.indexed_cells() {
            let corners = self.intern_corners(cell);
            let id = ZoneId(self.next_zone);
            self.next_zone += 1;
            self.zones.insert(
                id,
                Zone {
                    id,
                    grid,
                    index,
                    corners,
                    metrics: ZoneMetrics::default(),
                },
            );
            created.push(id);
        }
        let record = self
            .grids
            .get_mut(&grid)
            .ok_or(StoreError::UnknownGrid(grid))?;
        record.zones = created.clone();
        Ok(created)
    }

    /// Persists a validated grid geometry: interns the center and corners, reuses or
    /// creates the region and grid, rewrites their corners and regenerates the zones only
    /// when the grid has none or they no longer match `geometry`.
    pub fn apply_grid_geometry(
        &mut self,
        geometry: &GridGeometry,
        tolerance: f64,
    ) -> Result<ComputedRegion, StoreError> {
        let center = self.points.get_or_create(geometry.center);
        let corner_ids = self.intern_corners(&geometry.corners);

        let (region_id, _) = self.get_or_create_region(center.id, geometry.side_km);
        self.region_mut(region_id)?.corners = Some(corner_ids);

        let (grid_id, created) =
            self.get_or_create_grid(region_id, geometry.side_km, geometry.zones_per_edge)?;
        if let Some(grid) = self.grids.get_mut(&grid_id) {
            grid.corners = Some(corner_ids);
        }

        let regenerate = created || self.is_grid_stale(grid_id, tolerance)?;
        if regenerate {
            let removed = self.delete_grid_zones(grid_id)?;
            if removed > 0 {
                info!(
                    "{} geometry is stale, discarding {} zones and their metrics",
                    grid_id, removed
                );
            }
            let zones = self.create_zones(grid_id, geometry)?;
            info!("Generated {} zones for {}", zones.len(), grid_id);
        } else {
            debug!("{} is up to date, keeping its zones", grid_id);
        }

        let zones = self
            .grid_zones(grid_id)?
            .into_iter()
            .map(|zone| {
                Ok(ComputedZone {
                    id: zone.id,
                    index: zone.index,
                    corners: self.resolve_corners(zone.corners)?,
                })
            })
            .collect::<Result<Vec<_>, StoreError>>()?;

        Ok(ComputedRegion {
            region: region_id,
            grid: grid_id,
            center: center.coordinate(),
            side_km: geometry.side_km,
            zones_per_edge: geometry.zones_per_edge,
            corners: self.resolve_corners(corner_ids)?,
            zones,
            regenerated: regenerate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::consistency::DEFAULT_TOLERANCE;

    const CENTER: LatLon = LatLon(46.7712, 23.6236);

    fn apply(store: &mut RegionStore, side_km: f64, n: u32) -> ComputedRegion {
        let geometry = GridGeometry::compute(CENTER, side_km, n);
        store
            .apply_grid_geometry(&geometry, DEFAULT_TOLERANCE)
            .unwrap()
    }

    #[test]
    fn test_first_request_creates_everything() {
        let mut store = RegionStore::new();
        let computed = apply(&mut store, 20.0, 10);
        assert!(computed.regenerated);
        assert_eq!(computed.zones.len(), 100);
        let indices: Vec<u32> = computed.zones.iter().map(|z| z.index).collect();
        assert_eq!(indices, (1..=100).collect::<Vec<_>>());
        assert_eq!(store.region_count(), 1);
        assert_eq!(store.grid_count(), 1);
        // 11 x 11 shared grid vertices; with an even n the center is one of them.
        assert_eq!(store.points().len(), 121);
        assert!(!store.is_grid_stale(computed.grid, DEFAULT_TOLERANCE).unwrap());
    }

    #[test]
    fn test_repeat_request_keeps_zones_and_metrics() {
        let mut store = RegionStore::new();
        let first = apply(&mut store, 20.0, 4);
        store.zone_mut(first.zones[0].id).unwrap().metrics.potential = Some(42.0);

        let second = apply(&mut store, 20.0, 4);
        assert!(!second.regenerated);
        assert_eq!(first.region, second.region);
        assert_eq!(first.grid, second.grid);
        assert_eq!(first.zones, second.zones);
        assert_eq!(
            store.zone(first.zones[0].id).unwrap().metrics.potential,
            Some(42.0)
        );
    }

    #[test]
    fn test_second_resolution_adds_grid_to_same_region() {
        let mut store = RegionStore::new();
        let coarse = apply(&mut store, 20.0, 2);
        let fine = apply(&mut store, 20.0, 5);
        assert_eq!(coarse.region, fine.region);
        assert_ne!(coarse.grid, fine.grid);
        assert_eq!(store.region(coarse.region).unwrap().grids.len(), 2);
        assert_eq!(store.zone_count(), 4 + 25);
    }

    #[test]
    fn test_other_side_is_other_region() {
        let mut store = RegionStore::new();
        let small = apply(&mut store, 10.0, 2);
        let large = apply(&mut store, 20.0, 2);
        assert_ne!(small.region, large.region);
        assert!(store.find_region(CENTER, 10.0).is_some());
        assert!(store.find_region(CENTER, 15.0).is_none());
    }

    #[test]
    fn test_drifted_zones_are_regenerated() {
        let mut store = RegionStore::new();
        let first = apply(&mut store, 20.0, 3);
        let first_zone = first.zones[0].id;
        store.zone_mut(first_zone).unwrap().metrics.potential = Some(10.0);

        // Point the first zone at a corner far away from where it belongs.
        let stray = store.points_mut().get_or_create(LatLon(0.0, 0.0)).id;
        store.zone_mut(first_zone).unwrap().corners.a = stray;
        assert!(store.is_grid_stale(first.grid, DEFAULT_TOLERANCE).unwrap());

        let second = apply(&mut store, 20.0, 3);
        assert!(second.regenerated);
        assert_eq!(second.zones.len(), 9);
        assert!(matches!(
            store.zone(first_zone),
            Err(StoreError::UnknownZone(_))
        ));
        assert!(store
            .grid_zones(second.grid)
            .unwrap()
            .iter()
            .all(|zone| zone.metrics.potential.is_none()));
        // Points are never deleted.
        assert!(store.points().get(stray).is_ok());
    }

    #[test]
    fn test_empty_grid_is_stale() {
        let mut store = RegionStore::new();
        let computed = apply(&mut store, 20.0, 2);
        assert_eq!(store.delete_grid_zones(computed.grid).unwrap(), 4);
        assert!(store.is_grid_stale(computed.grid, DEFAULT_TOLERANCE).unwrap());
        assert!(apply(&mut store, 20.0, 2).regenerated);
    }

    #[test]
    fn test_unknown_ids() {
        let store = RegionStore::new();
        assert!(matches!(
            store.grid_zones(GridId(9)),
            Err(StoreError::UnknownGrid(GridId(9)))
        ));
        assert!(matches!(
            store.region(RegionId(1)),
            Err(StoreError::UnknownRegion(_))
        ));
    }
}

use crate::store::error::StoreError;
use crate::store::region_store::RegionStore;
use crate::types::ids::{GridId, ZoneId};
use crate::types::lat_lon::LatLon;
use rstar::{Envelope, PointDistance, RTree, RTreeObject, AABB};

/// Bounding box of one zone in `[lat, lon]` space.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ZoneEnvelope {
    id: ZoneId,
    index: u32,
    min: [f64; 2],
    max: [f64; 2],
}

impl RTreeObject for ZoneEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.min, self.max)
    }
}

impl PointDistance for ZoneEnvelope {
    /// Squared distance from the query point to the box, 0 inside it.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        self.envelope().distance_2(point)
    }

    fn contains_point(&self, point: &[f64; 2]) -> bool {
        self.envelope().contains_point(point)
    }
}

/// Spatial lookup of the zones of one grid.
#[derive(Debug, Clone)]
pub struct ZoneIndex {
    grid: GridId,
    rtree: RTree<ZoneEnvelope>,
}

impl ZoneIndex {
    pub fn build(store: &RegionStore, grid: GridId) -> Result<Self, StoreError> {
        let envelopes = store
            .grid_zones(grid)?
            .into_iter()
            .map(|zone| {
                let (min, max) = store.resolve_corners(zone.corners)?.bounds();
                Ok(ZoneEnvelope {
                    id: zone.id,
                    index: zone.index,
                    min,
                    max,
                })
            })
            .collect::<Result<Vec<_>, StoreError>>()?;
        Ok(Self {
            grid,
            rtree: RTree::bulk_load(envelopes),
        })
    }

    pub fn grid(&self) -> GridId {
        self.grid
    }

    /// The zone containing `coordinate`. Points on a shared edge belong to the zone with
    /// the lowest index.
    pub fn zone_at(&self, coordinate: LatLon) -> Option<ZoneId> {
        self.rtree
            .locate_all_at_point(&[coordinate.0, coordinate.1])
            .min_by_key(|zone| zone.index)
            .map(|zone| zone.id)
    }

    pub fn len(&self) -> usize {
        self.rtree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.rtree.size() == 0
    }
}

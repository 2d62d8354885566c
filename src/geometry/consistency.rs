//! Decides whether persisted zone geometry still matches what the generator produces today.
//!
//! Used as the idempotence guard of region computation: a grid is regenerated only when it
//! is stale, so repeated requests for the same configuration keep their scored metrics.

use crate::geometry::zone_grid::GridGeometry;
use crate::types::lat_lon::{Corners, LatLon};

/// Default per-coordinate tolerance, degrees. Absorbs the 9-decimal rounding of interned
/// points while still catching a changed side length or center.
pub const DEFAULT_TOLERANCE: f64 = 1e-7;

/// Compares persisted cells (ordered by zone index) against `expected`, coordinate by
/// coordinate. A count mismatch or any single coordinate off by more than `tolerance`
/// fails the check.
pub fn zones_match_expected(
    expected: &GridGeometry,
    persisted: &[Corners],
    tolerance: f64,
) -> bool {
    if persisted.len() != expected.cells.len() {
        return false;
    }
    expected
        .cells
        .iter()
        .zip(persisted)
        .all(|(want, have)| want.matches(have, tolerance))
}

/// True when the persisted cells of the grid `(center, side_km, zones_per_edge)` must be
/// regenerated. A grid without zones is always stale.
pub fn is_stale(
    center: LatLon,
    side_km: f64,
    zones_per_edge: u32,
    persisted: &[Corners],
    tolerance: f64,
) -> bool {
    if persisted.is_empty() {
        return true;
    }
    let expected = GridGeometry::compute(center, side_km, zones_per_edge);
    !zones_match_expected(&expected, persisted, tolerance)
}

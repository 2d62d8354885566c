//! Splits a region square into an `n × n` grid of zone cells.

use crate::config::ApproximationLimits;
use crate::geometry::corners::{compute_region_corners, validate_request};
use crate::geometry::error::GeometryError;
use crate::types::lat_lon::{Corners, LatLon};
use serde::{Deserialize, Serialize};

/// Generates the `n × n` sub-grid of the square described by `corners`.
///
/// Cells come back flat in row-major order: row 0 is the northernmost row, column 0 the
/// westernmost cell of a row. Position `k` in the returned vector is zone index `k + 1`;
/// external lookups by zone index depend on this order.
///
/// Returns an empty vector when `n` is 0.
pub fn generate_zone_grid(corners: &Corners, n: u32) -> Vec<Corners> {
    if n == 0 {
        return Vec::new();
    }
    // Negative: north to south.
    let step_lat = (corners.b.0 - corners.a.0) / n as f64;
    // Positive: west to east.
    let step_lon = (corners.a.1 - corners.d.1) / n as f64;

    let capacity = (n as usize).checked_mul(n as usize).unwrap_or(0);
    let mut cells = Vec::with_capacity(capacity);
    for i in 0..n {
        for j in 0..n {
            let top_left_lat = corners.d.0 + i as f64 * step_lat;
            let top_left_lon = corners.d.1 + j as f64 * step_lon;
            cells.push(Corners {
                a: LatLon(top_left_lat, top_left_lon + step_lon),
                b: LatLon(top_left_lat + step_lat, top_left_lon + step_lon),
                c: LatLon(top_left_lat + step_lat, top_left_lon),
                d: LatLon(top_left_lat, top_left_lon),
            });
        }
    }
    cells
}

/// The full geometry of one grid configuration: region corners plus its cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridGeometry {
    pub center: LatLon,
    pub side_km: f64,
    pub zones_per_edge: u32,
    pub corners: Corners,
    /// Row-major cells, see [`generate_zone_grid`].
    pub cells: Vec<Corners>,
}

impl GridGeometry {
    /// Computes corners and cells without validating the input.
    pub fn compute(center: LatLon, side_km: f64, zones_per_edge: u32) -> Self {
        let corners = compute_region_corners(center, side_km);
        let cells = generate_zone_grid(&corners, zones_per_edge);
        Self {
            center,
            side_km,
            zones_per_edge,
            corners,
            cells,
        }
    }

    /// Cell at `row`, `column` (both 0-based).
    pub fn cell(&self, row: u32, column: u32) -> Option<&Corners> {
        if row >= self.zones_per_edge || column >= self.zones_per_edge {
            return None;
        }
        let n = self.zones_per_edge as usize;
        self.cells.get(row as usize * n + column as usize)
    }

    /// Cells paired with their 1-based zone index.
    pub fn indexed_cells(&self) -> impl Iterator<Item = (u32, &Corners)> {
        self.cells
            .iter()
            .enumerate()
            .map(|(k, cell)| (k as u32 + 1, cell))
    }
}

/// Validates the request and generates the region corners and the `n × n` cell list.
///
/// Deterministic: identical input always yields identical output.
///
/// # Errors
///
/// Returns a [`GeometryError`] for malformed coordinates, a non-positive side, `n < 1`,
/// or a request outside `limits` (including `n` above `limits.max_zones_per_edge`).
///
/// # Examples
///
/// ```
/// use skywind::{generate_grid, ApproximationLimits, LatLon};
///
/// let grid = generate_grid(LatLon(46.7712, 23.6236), 20.0, 10, &ApproximationLimits::default())?;
/// assert_eq!(grid.cells.len(), 100);
/// // Zone index 1 is the north-west cell.
/// assert_eq!(grid.cells[0].d, grid.corners.d);
/// # Ok::<(), skywind::GeometryError>(())
/// ```
pub fn generate_grid(
    center: LatLon,
    side_km: f64,
    zones_per_edge: u32,
    limits: &ApproximationLimits,
) -> Result<GridGeometry, GeometryError> {
    validate_request(center, side_km, zones_per_edge, limits)?;
    Ok(GridGeometry::compute(center, side_km, zones_per_edge))
}

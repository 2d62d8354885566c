//! Coordinate primitives shared by the geometry, store and scoring layers.

use serde::{Deserialize, Serialize};

/// Represents a geographical coordinate using latitude and longitude.
///
/// Latitude is the first element (index 0), and longitude is the second (index 1).
/// Both values are decimal degrees.
///
/// # Examples
///
/// ```
/// use skywind::LatLon;
///
/// let cluj = LatLon(46.7712, 23.6236);
/// assert_eq!(cluj.lat(), 46.7712);
/// assert_eq!(cluj.lon(), 23.6236);
/// assert_eq!(cluj.lon_lat(), [23.6236, 46.7712]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon(pub f64, pub f64);

impl LatLon {
    pub fn lat(self) -> f64 {
        self.0
    }

    pub fn lon(self) -> f64 {
        self.1
    }

    /// Coordinate in `[longitude, latitude]` order, as used by polygon rings and GeoJSON.
    pub fn lon_lat(self) -> [f64; 2] {
        [self.1, self.0]
    }

    /// Largest absolute per-axis difference to `other`, in degrees.
    pub fn max_abs_diff(self, other: LatLon) -> f64 {
        (self.0 - other.0).abs().max((self.1 - other.1).abs())
    }
}

/// The four corners of an axis-aligned cell, clockwise from the upper-right.
///
/// `a` = north-east, `b` = south-east, `c` = south-west, `d` = north-west. The same
/// convention is used for regions, grids and zones.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Corners {
    pub a: LatLon,
    pub b: LatLon,
    pub c: LatLon,
    pub d: LatLon,
}

impl Corners {
    pub fn as_array(&self) -> [LatLon; 4] {
        [self.a, self.b, self.c, self.d]
    }

    /// Arithmetic mean of the four corners.
    ///
    /// Not a geodesic centroid; at the cell sizes this crate works with the difference
    /// is far below the resolution of the climate layers.
    pub fn centroid(&self) -> LatLon {
        let corners = self.as_array();
        let lat = corners.iter().map(|p| p.0).sum::<f64>() / 4.0;
        let lon = corners.iter().map(|p| p.1).sum::<f64>() / 4.0;
        LatLon(lat, lon)
    }

    /// Closed polygon ring `A, B, C, D, A` in `[lon, lat]` order.
    pub fn closed_ring(&self) -> Vec<[f64; 2]> {
        vec![
            self.a.lon_lat(),
            self.b.lon_lat(),
            self.c.lon_lat(),
            self.d.lon_lat(),
            self.a.lon_lat(),
        ]
    }

    /// True when every coordinate of every corner is within `tolerance` degrees of `other`.
    pub fn matches(&self, other: &Corners, tolerance: f64) -> bool {
        self.as_array()
            .iter()
            .zip(other.as_array().iter())
            .all(|(mine, theirs)| mine.max_abs_diff(*theirs) <= tolerance)
    }

    /// Checks `A.lat = D.lat`, `B.lat = C.lat`, `A.lon = B.lon` and `D.lon = C.lon`.
    pub fn is_axis_aligned(&self, tolerance: f64) -> bool {
        (self.a.0 - self.d.0).abs() <= tolerance
            && (self.b.0 - self.c.0).abs() <= tolerance
            && (self.a.1 - self.b.1).abs() <= tolerance
            && (self.d.1 - self.c.1).abs() <= tolerance
    }

    /// Bounding box as `([min_lat, min_lon], [max_lat, max_lon])`.
    pub fn bounds(&self) -> ([f64; 2], [f64; 2]) {
        let corners = self.as_array();
        let min_lat = corners.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
        let max_lat = corners.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
        let min_lon = corners.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
        let max_lon = corners.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
        ([min_lat, min_lon], [max_lat, max_lon])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Corners {
        Corners {
            a: LatLon(1.0, 1.0),
            b: LatLon(0.0, 1.0),
            c: LatLon(0.0, 0.0),
            d: LatLon(1.0, 0.0),
        }
    }

    #[test]
    fn test_centroid_is_corner_mean() {
        assert_eq!(unit_square().centroid(), LatLon(0.5, 0.5));
    }

    #[test]
    fn test_closed_ring_repeats_first_point_in_lon_lat_order() {
        let ring = unit_square().closed_ring();
        assert_eq!(ring.len(), 5);
        assert_eq!(ring[0], ring[4]);
        assert_eq!(ring[1], [1.0, 0.0]);
    }

    #[test]
    fn test_matches_respects_tolerance() {
        let base = unit_square();
        let mut shifted = base;
        shifted.c = LatLon(0.0, 5e-8);
        assert!(base.matches(&shifted, 1e-7));
        shifted.c = LatLon(0.0, 2e-7);
        assert!(!base.matches(&shifted, 1e-7));
    }

    #[test]
    fn test_bounds() {
        let (min, max) = unit_square().bounds();
        assert_eq!(min, [0.0, 0.0]);
        assert_eq!(max, [1.0, 1.0]);
        assert!(unit_square().is_axis_aligned(0.0));
    }
}

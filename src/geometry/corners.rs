//! Square region corners around a center coordinate.
//!
//! Uses a local equirectangular approximation: 1 km is taken as 0.009° of latitude, and
//! the longitude step is widened by `1 / cos(latitude)`. This is accurate for regions of a
//! few tens of kilometers at moderate latitudes. It is not geodesically exact, and the
//! longitude delta diverges towards the poles; see [`crate::ApproximationLimits`].

use crate::config::ApproximationLimits;
use crate::geometry::error::GeometryError;
use crate::types::lat_lon::{Corners, LatLon};
use haversine::{distance, Location as HaversineLocation, Units};

/// Degrees of latitude per kilometer.
pub const DEGREES_LATITUDE_PER_KM: f64 = 0.009;

/// Half-extent of the square in degrees: `(Δlat, Δlon)`.
pub fn half_extent_degrees(center_lat: f64, side_km: f64) -> (f64, f64) {
    let half_km = side_km / 2.0;
    let deg_lon_per_km = DEGREES_LATITUDE_PER_KM / center_lat.to_radians().cos();
    (half_km * DEGREES_LATITUDE_PER_KM, half_km * deg_lon_per_km)
}

/// Corners of the square of side `side_km` centered at `center`, clockwise from the
/// upper-right.
///
/// Pure and unvalidated; see [`validate_request`] for the input checks.
///
/// # Examples
///
/// ```
/// use skywind::{compute_region_corners, LatLon};
///
/// let corners = compute_region_corners(LatLon(0.0, 0.0), 20.0);
/// assert!((corners.a.lat() - 0.09).abs() < 1e-12);
/// assert!((corners.a.lon() - 0.09).abs() < 1e-12);
/// assert_eq!(corners.a.lat(), corners.d.lat());
/// assert_eq!(corners.b.lon(), corners.a.lon());
/// ```
pub fn compute_region_corners(center: LatLon, side_km: f64) -> Corners {
    let (dlat, dlon) = half_extent_degrees(center.0, side_km);
    Corners {
        a: LatLon(center.0 + dlat, center.1 + dlon),
        b: LatLon(center.0 - dlat, center.1 + dlon),
        c: LatLon(center.0 - dlat, center.1 - dlon),
        d: LatLon(center.0 + dlat, center.1 - dlon),
    }
}

/// Rejects malformed coordinates, non-positive sides, `zones_per_edge < 1`, and requests the
/// planar approximation cannot represent.
pub fn validate_request(
    center: LatLon,
    side_km: f64,
    zones_per_edge: u32,
    limits: &ApproximationLimits,
) -> Result<(), GeometryError> {
    if !center.0.is_finite() || !(-90.0..=90.0).contains(&center.0) {
        return Err(GeometryError::InvalidLatitude(center.0));
    }
    if !center.1.is_finite() || !(-180.0..=180.0).contains(&center.1) {
        return Err(GeometryError::InvalidLongitude(center.1));
    }
    if !side_km.is_finite() || side_km <= 0.0 {
        return Err(GeometryError::InvalidSideLength(side_km));
    }
    if zones_per_edge < 1 {
        return Err(GeometryError::InvalidZoneCount(zones_per_edge));
    }
    if zones_per_edge > limits.max_zones_per_edge {
        return Err(GeometryError::ZoneCountOutsideLimit {
            zones_per_edge,
            limit: limits.max_zones_per_edge,
        });
    }
    if center.0.abs() > limits.max_abs_latitude {
        return Err(GeometryError::LatitudeOutsideApproximation {
            lat: center.0,
            limit: limits.max_abs_latitude,
        });
    }
    if side_km > limits.max_side_km {
        return Err(GeometryError::SideOutsideApproximation {
            side_km,
            limit: limits.max_side_km,
        });
    }

    // No antimeridian or pole wrapping: every corner must stay a plain coordinate.
    let corners = compute_region_corners(center, side_km);
    let in_range = corners
        .as_array()
        .iter()
        .all(|p| (-90.0..=90.0).contains(&p.0) && (-180.0..=180.0).contains(&p.1));
    if !in_range {
        return Err(GeometryError::OutOfBounds {
            lat: center.0,
            lon: center.1,
            side_km,
        });
    }
    Ok(())
}

fn haversine_km(from: LatLon, to: LatLon) -> f64 {
    distance(
        HaversineLocation {
            latitude: from.0,
            longitude: from.1,
        },
        HaversineLocation {
            latitude: to.0,
            longitude: to.1,
        },
        Units::Kilometers,
    )
}

/// Great-circle lengths of the northern (D→A) and eastern (A→B) edges, km.
pub fn measured_edges_km(corners: &Corners) -> (f64, f64) {
    (
        haversine_km(corners.d, corners.a),
        haversine_km(corners.a, corners.b),
    )
}

/// Largest relative deviation of a measured edge from `side_km`.
pub fn edge_distortion(corners: &Corners, side_km: f64) -> f64 {
    let (north, east) = measured_edges_km(corners);
    ((north - side_km) / side_km)
        .abs()
        .max(((east - side_km) / side_km).abs())
}

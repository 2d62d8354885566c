use crate::types::ids::PointId;
use crate::types::lat_lon::LatLon;
use serde::{Deserialize, Serialize};

/// Number of decimal places a coordinate keeps once interned (about 1 cm).
pub const POINT_PRECISION_DECIMALS: i32 = 9;
const POINT_SCALE: f64 = 1e9;

/// An interned, immutable coordinate.
///
/// Points are created only through the [`crate::PointCache`], which guarantees that one
/// rounded `(lat, lon)` pair maps to exactly one `Point`. Cells sharing a corner reference
/// the same `Point`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub id: PointId,
    /// Latitude rounded to [`POINT_PRECISION_DECIMALS`].
    pub lat: f64,
    /// Longitude rounded to [`POINT_PRECISION_DECIMALS`].
    pub lon: f64,
}

impl Point {
    pub fn coordinate(&self) -> LatLon {
        LatLon(self.lat, self.lon)
    }
}

/// Deduplication key of a [`Point`]: the coordinate scaled to integer nano-degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PointKey {
    lat_nano: i64,
    lon_nano: i64,
}

impl PointKey {
    pub fn from_coordinate(coordinate: LatLon) -> Self {
        Self {
            lat_nano: (coordinate.0 * POINT_SCALE).round() as i64,
            lon_nano: (coordinate.1 * POINT_SCALE).round() as i64,
        }
    }

    /// The rounded coordinate this key stands for.
    pub fn coordinate(self) -> LatLon {
        LatLon(
            self.lat_nano as f64 / POINT_SCALE,
            self.lon_nano as f64 / POINT_SCALE,
        )
    }
}

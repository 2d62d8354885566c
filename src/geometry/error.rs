use thiserror::Error;

/// Invalid grid request. Raised before anything is computed or stored.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Latitude {0} is not a finite value in [-90, 90]")]
    InvalidLatitude(f64),

    #[error("Longitude {0} is not a finite value in [-180, 180]")]
    InvalidLongitude(f64),

    #[error("Side length must be a positive number of kilometers, got {0}")]
    InvalidSideLength(f64),

    #[error("Zones per edge must be at least 1, got {0}")]
    InvalidZoneCount(u32),

    #[error("Zones per edge {zones_per_edge} exceeds the supported maximum of {limit}")]
    ZoneCountOutsideLimit { zones_per_edge: u32, limit: u32 },

    #[error("Center latitude {lat} is beyond ±{limit}°, where the planar approximation breaks down")]
    LatitudeOutsideApproximation { lat: f64, limit: f64 },

    #[error("Side length {side_km} km exceeds the {limit} km supported by the planar approximation")]
    SideOutsideApproximation { side_km: f64, limit: f64 },

    #[error("Region of {side_km} km around ({lat}, {lon}) leaves the valid coordinate range")]
    OutOfBounds { lat: f64, lon: f64, side_km: f64 },
}

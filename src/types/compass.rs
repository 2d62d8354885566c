//! Compass sectors used to bucket wind directions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the eight 45° sectors of a wind rose.
///
/// Directions follow the meteorological convention: degrees clockwise from north,
/// naming the direction the wind blows *from*. Sector boundaries sit at 22.5° offsets,
/// so `N` covers `[337.5°, 360°) ∪ [0°, 22.5°)`.
///
/// # Examples
///
/// ```
/// use skywind::CompassSector;
///
/// assert_eq!(CompassSector::from_degrees(350.0), CompassSector::N);
/// assert_eq!(CompassSector::from_degrees(22.5), CompassSector::NE);
/// assert_eq!(CompassSector::from_degrees(-90.0), CompassSector::W);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CompassSector {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl CompassSector {
    /// Sectors clockwise from north. The position of a sector in this array is its index.
    pub const ALL: [CompassSector; 8] = [
        CompassSector::N,
        CompassSector::NE,
        CompassSector::E,
        CompassSector::SE,
        CompassSector::S,
        CompassSector::SW,
        CompassSector::W,
        CompassSector::NW,
    ];

    /// Classifies a direction in degrees. Values outside `[0, 360)` are wrapped first;
    /// a non-finite direction falls into `N`.
    pub fn from_degrees(degrees: f64) -> Self {
        if !degrees.is_finite() {
            return CompassSector::N;
        }
        let normalized = degrees.rem_euclid(360.0);
        let index = ((normalized + 22.5) / 45.0).floor() as usize % 8;
        Self::ALL[index]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            CompassSector::N => "N",
            CompassSector::NE => "NE",
            CompassSector::E => "E",
            CompassSector::SE => "SE",
            CompassSector::S => "S",
            CompassSector::SW => "SW",
            CompassSector::W => "W",
            CompassSector::NW => "NW",
        }
    }
}

impl fmt::Display for CompassSector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

const COMPASS_16: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// 16-wind compass label for a direction, e.g. `20.0` -> `"NNE"`. For display only.
pub fn compass_label_16(degrees: f64) -> &'static str {
    if !degrees.is_finite() {
        return COMPASS_16[0];
    }
    let normalized = degrees.rem_euclid(360.0);
    let index = ((normalized + 11.25) / 22.5).floor() as usize % 16;
    COMPASS_16[index]
}

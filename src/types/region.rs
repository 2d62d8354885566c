//! Defines `Region` and `Grid`, the two containers above a [`crate::Zone`], and the
//! region-level metrics the aggregator writes.

use crate::types::compass::CompassSector;
use crate::types::ids::{GridId, PointId, RegionId, ZoneId};
use crate::types::status::ComputationStatus;
use crate::types::zone::CornerIds;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Mean wind speed (m/s) per compass sector, aggregated over a grid's zones.
///
/// A sector without member zones holds 0.0.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WindRose {
    #[serde(rename = "N")]
    pub n: f64,
    #[serde(rename = "NE")]
    pub ne: f64,
    #[serde(rename = "E")]
    pub e: f64,
    #[serde(rename = "SE")]
    pub se: f64,
    #[serde(rename = "S")]
    pub s: f64,
    #[serde(rename = "SW")]
    pub sw: f64,
    #[serde(rename = "W")]
    pub w: f64,
    #[serde(rename = "NW")]
    pub nw: f64,
}

impl WindRose {
    pub fn get(&self, sector: CompassSector) -> f64 {
        match sector {
            CompassSector::N => self.n,
            CompassSector::NE => self.ne,
            CompassSector::E => self.e,
            CompassSector::SE => self.se,
            CompassSector::S => self.s,
            CompassSector::SW => self.sw,
            CompassSector::W => self.w,
            CompassSector::NW => self.nw,
        }
    }

    pub fn set(&mut self, sector: CompassSector, speed: f64) {
        let slot = match sector {
            CompassSector::N => &mut self.n,
            CompassSector::NE => &mut self.ne,
            CompassSector::E => &mut self.e,
            CompassSector::SE => &mut self.se,
            CompassSector::S => &mut self.s,
            CompassSector::SW => &mut self.sw,
            CompassSector::W => &mut self.w,
            CompassSector::NW => &mut self.nw,
        };
        *slot = speed;
    }

    /// Sectors clockwise from north with their mean speed.
    pub fn iter(&self) -> impl Iterator<Item = (CompassSector, f64)> + '_ {
        CompassSector::ALL
            .into_iter()
            .map(move |sector| (sector, self.get(sector)))
    }
}

/// Region-level derived metrics.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RegionMetrics {
    /// Mean annual 2 m air temperature at the region center, °C.
    pub avg_temperature: Option<f64>,
    pub wind_rose: Option<WindRose>,
    /// Mean zone potential.
    pub avg_potential: Option<f64>,
    /// `floor(avg_potential * 10)`, for ranking only.
    pub rating: Option<i64>,
    /// Zone with the highest potential; ties go to the lowest zone index.
    pub best_zone: Option<ZoneId>,
    /// When the aggregate metrics were last written.
    pub scored_at: Option<DateTime<Utc>>,
}

impl RegionMetrics {
    pub fn status(&self) -> ComputationStatus {
        let present = [
            self.avg_temperature.is_some(),
            self.wind_rose.is_some(),
            self.avg_potential.is_some(),
        ]
        .iter()
        .filter(|present| **present)
        .count();
        ComputationStatus::from_counts(present, 3)
    }
}

/// A square analysis area around a center point.
///
/// Unique per `(center, side_km)`. Its corners are rewritten (idempotently) every time its
/// geometry is requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: RegionId,
    pub center: PointId,
    pub side_km: f64,
    pub corners: Option<CornerIds>,
    /// Grids of this region, in creation order.
    pub grids: Vec<GridId>,
    pub metrics: RegionMetrics,
}

/// One `zones_per_edge × zones_per_edge` resolution of a [`Region`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    pub id: GridId,
    pub region: RegionId,
    pub side_km: f64,
    pub zones_per_edge: u32,
    pub corners: Option<CornerIds>,
    /// Zones ordered by zone index (1..=n²).
    pub zones: Vec<ZoneId>,
}

impl Grid {
    pub fn expected_zone_count(&self) -> usize {
        let n = self.zones_per_edge as usize;
        n * n
    }
}

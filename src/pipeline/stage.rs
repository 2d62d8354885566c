use crate::types::zone::ZoneLayer;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One independently runnable step of the scoring pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stage {
    /// Mean temperature at the region center.
    Temperature,
    Wind,
    Terrain,
    AirDensity,
    PowerDensity,
    LandCover,
    /// Zone potentials from the layers above.
    Potential,
    /// Average potential, rating, best zone and wind rose of the region.
    RegionMetrics,
}

impl Stage {
    /// Execution order of a full run.
    pub const ALL: [Stage; 8] = [
        Stage::Temperature,
        Stage::Wind,
        Stage::Terrain,
        Stage::AirDensity,
        Stage::PowerDensity,
        Stage::LandCover,
        Stage::Potential,
        Stage::RegionMetrics,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Stage::Temperature => "temperature",
            Stage::Wind => "wind",
            Stage::Terrain => "terrain",
            Stage::AirDensity => "air density",
            Stage::PowerDensity => "power density",
            Stage::LandCover => "land cover",
            Stage::Potential => "potential",
            Stage::RegionMetrics => "region metrics",
        }
    }

    /// The zone layer a provider stage writes.
    pub fn layer(self) -> Option<ZoneLayer> {
        match self {
            Stage::Wind => Some(ZoneLayer::Wind),
            Stage::Terrain => Some(ZoneLayer::Terrain),
            Stage::AirDensity => Some(ZoneLayer::AirDensity),
            Stage::PowerDensity => Some(ZoneLayer::PowerDensity),
            Stage::LandCover => Some(ZoneLayer::LandCover),
            Stage::Temperature | Stage::Potential | Stage::RegionMetrics => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

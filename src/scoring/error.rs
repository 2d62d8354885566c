use crate::types::ids::ZoneId;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScoringError {
    #[error("Zone {index} ({zone}) has no potential yet; score every zone before aggregating")]
    UnscoredZone { zone: ZoneId, index: u32 },

    #[error("Zones of different grids cannot be aggregated together")]
    MixedGrids,
}

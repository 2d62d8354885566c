use crate::types::ids::{GridId, PointId, RegionId, ZoneId};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to determine cache directory")]
    CacheDirResolution(#[source] std::io::Error),

    #[error("Failed to create cache directory '{0}'")]
    CacheDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to read snapshot file '{0}'")]
    SnapshotRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to write snapshot file '{0}'")]
    SnapshotWrite(PathBuf, #[source] std::io::Error),

    #[error("Failed to decode snapshot data from '{0}'")]
    SnapshotDecode(PathBuf, #[source] Box<bincode::error::DecodeError>),

    #[error("Failed to encode snapshot data")]
    SnapshotEncode(#[source] Box<bincode::error::EncodeError>),

    #[error("Unknown point {0}")]
    UnknownPoint(PointId),

    #[error("Unknown region {0}")]
    UnknownRegion(RegionId),

    #[error("Unknown grid {0}")]
    UnknownGrid(GridId),

    #[error("Unknown zone {0}")]
    UnknownZone(ZoneId),

    #[error("{0} has no corners")]
    MissingCorners(String),

    // Covers errors joining tokio blocking tasks
    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}

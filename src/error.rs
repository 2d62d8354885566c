use crate::config::ConfigError;
use crate::geometry::error::GeometryError;
use crate::provider::error::ProviderError;
use crate::scoring::error::ScoringError;
use crate::store::error::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SkywindError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Scoring(#[from] ScoringError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to serialize GeoJSON")]
    GeoJson(#[from] serde_json::Error),
}

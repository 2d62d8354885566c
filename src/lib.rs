pub mod config;
mod error;
pub mod geojson;
pub mod geometry;
pub mod pipeline;
pub mod provider;
pub mod scoring;
mod skywind;
pub mod store;
pub mod types;
mod utils;

pub use error::SkywindError;
pub use skywind::*;
pub use utils::default_cache_dir;

pub use config::{ApproximationLimits, ConfigError, ScoringConfig};

pub use geometry::corners::{compute_region_corners, edge_distortion};
pub use geometry::error::GeometryError;
pub use geometry::zone_grid::{generate_grid, generate_zone_grid, GridGeometry};

pub use types::compass::{compass_label_16, CompassSector};
pub use types::ids::{GridId, PointId, RegionId, ZoneId};
pub use types::land_cover::{LandCoverClass, LandCoverComposition, LandCoverShare};
pub use types::lat_lon::{Corners, LatLon};
pub use types::point::{Point, PointKey};
pub use types::region::{Grid, Region, RegionMetrics, WindRose};
pub use types::status::ComputationStatus;
pub use types::zone::{Zone, ZoneLayer, ZoneMetrics};

pub use provider::error::ProviderError;
pub use provider::raster_provider::{
    LandCoverHistogram, RasterProvider, TerrainStats, WindSample, ZonePolygon,
};

pub use pipeline::report::{PipelineReport, StageOutcome, StageReport};
pub use pipeline::runner::ScoringPipeline;
pub use pipeline::stage::Stage;

pub use scoring::error::ScoringError;
pub use scoring::region::RegionSummary;

pub use store::error::StoreError;
pub use store::point_cache::PointCache;
pub use store::region_store::{ComputedRegion, ComputedZone, RegionStore};
pub use store::zone_index::ZoneIndex;

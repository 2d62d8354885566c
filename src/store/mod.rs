pub mod error;
pub mod point_cache;
pub mod region_store;
pub mod snapshot;
pub mod zone_index;

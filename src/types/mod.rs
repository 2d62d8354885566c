pub mod compass;
pub mod ids;
pub mod land_cover;
pub mod lat_lon;
pub mod point;
pub mod region;
pub mod status;
pub mod zone;

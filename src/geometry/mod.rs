pub mod consistency;
pub mod corners;
pub mod error;
pub mod zone_grid;

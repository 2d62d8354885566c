pub mod error;
pub mod land;
pub mod potential;
pub mod region;
pub mod wind_rose;
pub mod zone_metrics;

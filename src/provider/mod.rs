pub mod error;
pub mod raster_provider;

#[cfg(test)]
pub(crate) mod fake;

use thiserror::Error;

/// Failure of a call to the raster/climate data provider.
///
/// "No data" for a point or polygon is *not* an error: providers simply leave that entry
/// out of their answer.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Provider request '{operation}' failed: {message}")]
    Request {
        operation: &'static str,
        message: String,
    },

    #[error("Provider request '{0}' timed out")]
    Timeout(&'static str),

    #[error("Provider quota exhausted during '{0}'")]
    QuotaExceeded(&'static str),

    #[error("Malformed provider response for '{operation}': {message}")]
    MalformedResponse {
        operation: &'static str,
        message: String,
    },
}

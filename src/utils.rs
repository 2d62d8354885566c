use crate::store::error::StoreError;
use log::info;
use std::io;
use std::path::{Path, PathBuf};

const CACHE_DIR_NAME: &str = "skywind_rs_cache";

/// `<system cache dir>/skywind_rs_cache`.
pub fn default_cache_dir() -> Result<PathBuf, StoreError> {
    dirs::cache_dir()
        .map(|p| p.join(CACHE_DIR_NAME))
        .ok_or_else(|| {
            StoreError::CacheDirResolution(io::Error::new(
                io::ErrorKind::NotFound,
                "could not determine system cache directory",
            ))
        })
}

pub async fn ensure_cache_dir_exists(path: &Path) -> Result<(), StoreError> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) => {
            if !metadata.is_dir() {
                return Err(StoreError::CacheDirCreation(
                    path.to_path_buf(),
                    io::Error::new(
                        io::ErrorKind::AlreadyExists,
                        "cache path exists but is not a directory",
                    ),
                ));
            }
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("Creating cache directory: {}", path.display());
            tokio::fs::create_dir_all(path)
                .await
                .map_err(|e| StoreError::CacheDirCreation(path.to_path_buf(), e))
        }
        Err(e) => Err(StoreError::CacheDirCreation(path.to_path_buf(), e)),
    }
}

/// Rounds half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

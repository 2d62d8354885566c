use crate::store::error::StoreError;
use crate::store::region_store::RegionStore;
use bincode::config::{Configuration, Fixint, LittleEndian};
use log::info;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const SNAPSHOT_FILE_NAME: &str = "region_store.bin";
const BINCODE_CONFIG: Configuration<LittleEndian, Fixint> =
    bincode::config::standard().with_fixed_int_encoding();

pub fn snapshot_path(cache_dir: &Path) -> PathBuf {
    cache_dir.join(SNAPSHOT_FILE_NAME)
}

/// Loads the snapshot from `cache_dir`, or `None` when there is none yet.
pub async fn load_snapshot(cache_dir: &Path) -> Result<Option<RegionStore>, StoreError> {
    let path = snapshot_path(cache_dir);
    if !path.exists() {
        return Ok(None);
    }
    let store = tokio::task::spawn_blocking(move || read_snapshot(&path)).await??;
    info!(
        "Loaded {} regions, {} grids, {} zones from snapshot",
        store.region_count(),
        store.grid_count(),
        store.zone_count()
    );
    Ok(Some(store))
}

fn read_snapshot(path: &Path) -> Result<RegionStore, StoreError> {
    let bytes = std::fs::read(path).map_err(|e| StoreError::SnapshotRead(path.to_path_buf(), e))?;
    let (store, _) = bincode::serde::decode_from_slice::<RegionStore, _>(&bytes, BINCODE_CONFIG)
        .map_err(|e| StoreError::SnapshotDecode(path.to_path_buf(), Box::from(e)))?;
    Ok(store)
}

/// Writes `store` to `cache_dir`, replacing any previous snapshot atomically.
pub async fn save_snapshot(store: &RegionStore, cache_dir: &Path) -> Result<(), StoreError> {
    let bytes = bincode::serde::encode_to_vec(store, BINCODE_CONFIG)
        .map_err(|e| StoreError::SnapshotEncode(Box::new(e)))?;
    let dir = cache_dir.to_path_buf();
    let path = snapshot_path(cache_dir);
    let written = bytes.len();
    tokio::task::spawn_blocking(move || write_atomically(&dir, &path, &bytes)).await??;
    info!(
        "Wrote snapshot ({} bytes) to {}",
        written,
        snapshot_path(cache_dir).display()
    );
    Ok(())
}

fn write_atomically(dir: &Path, path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let write_error = |e| StoreError::SnapshotWrite(path.to_path_buf(), e);
    let mut temp_file = NamedTempFile::new_in(dir).map_err(write_error)?;
    temp_file.write_all(bytes).map_err(write_error)?;
    temp_file.flush().map_err(write_error)?;
    temp_file
        .persist(path)
        .map_err(|e| StoreError::SnapshotWrite(path.to_path_buf(), e.error))?;
    Ok(())
}

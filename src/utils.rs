use crate::geocode::error::GeocodeCacheError;
use log::info;
use std::io;
use std::path::{Path, PathBuf};

const CACHE_DIR_NAME: &str = "wellwater_rs_cache";

pub fn get_cache_dir() -> Result<PathBuf, GeocodeCacheError> {
    dirs::cache_dir()
        .ok_or(GeocodeCacheError::CacheDirResolution)
        .map(|p| p.join(CACHE_DIR_NAME))
}

pub fn ensure_cache_dir_exists(path: &Path) -> Result<(), GeocodeCacheError> {
    match std::fs::metadata(path) {
        Ok(metadata) => {
            if !metadata.is_dir() {
                return Err(GeocodeCacheError::CacheDirCreation(
                    path.to_path_buf(),
                    io::Error::new(io::ErrorKind::AlreadyExists, "not a directory"),
                ));
            }
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("Creating cache directory: {}", path.display());
            std::fs::create_dir_all(path)
                .map_err(|e| GeocodeCacheError::CacheDirCreation(path.to_path_buf(), e))
        }
        Err(e) => Err(GeocodeCacheError::CacheDirCreation(path.to_path_buf(), e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ensure_cache_dir_creates_nested_dirs() -> Result<(), GeocodeCacheError> {
        let dir = TempDir::new().expect("temp dir");
        let nested = dir.path().join("a").join("b");
        ensure_cache_dir_exists(&nested)?;
        ensure_cache_dir_exists(&nested)?;
        assert!(nested.is_dir());
        Ok(())
    }

    #[test]
    fn test_ensure_cache_dir_rejects_files() {
        let dir = TempDir::new().expect("temp dir");
        let file = dir.path().join("plain");
        std::fs::write(&file, b"x").expect("write fixture");
        assert!(matches!(
            ensure_cache_dir_exists(&file),
            Err(GeocodeCacheError::CacheDirCreation(..))
        ));
    }
}

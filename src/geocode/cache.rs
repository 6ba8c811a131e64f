use crate::geocode::error::GeocodeCacheError;
use crate::geocode::Geocoder;
use crate::utils::{ensure_cache_dir_exists, get_cache_dir};
use bincode::config::{Configuration, Fixint, LittleEndian};
use log::{debug, info};
use ordered_float::OrderedFloat;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const BINCODE_CACHE_FILE_NAME: &str = "geocode.bin";
const BINCODE_CONFIG: Configuration<LittleEndian, Fixint> =
    bincode::config::standard().with_fixed_int_encoding();

type CoordinateKey = (OrderedFloat<f64>, OrderedFloat<f64>);

/// Remembers the regions another [`Geocoder`] found, keyed by exact coordinates.
///
/// Only successful lookups are remembered, so a coordinate that failed is asked again
/// next time. Call [`CachedGeocoder::save`] to persist the entries.
#[derive(Debug)]
pub struct CachedGeocoder<G> {
    inner: G,
    cache_file: PathBuf,
    entries: RefCell<HashMap<CoordinateKey, String>>,
}

impl<G: Geocoder> CachedGeocoder<G> {
    /// Uses `geocode.bin` in the user cache directory.
    pub fn new(inner: G) -> Result<Self, GeocodeCacheError> {
        let cache_dir = get_cache_dir()?;
        ensure_cache_dir_exists(&cache_dir)?;
        Self::with_cache_file(inner, cache_dir.join(BINCODE_CACHE_FILE_NAME))
    }

    /// Uses an explicit cache file. It is loaded if it exists.
    pub fn with_cache_file(
        inner: G,
        cache_file: impl Into<PathBuf>,
    ) -> Result<Self, GeocodeCacheError> {
        let cache_file = cache_file.into();
        let entries = if cache_file.exists() {
            Self::read_entries(&cache_file)?
        } else {
            HashMap::new()
        };
        debug!("Loaded {} cached regions from {:?}", entries.len(), cache_file);
        Ok(Self {
            inner,
            cache_file,
            entries: RefCell::new(entries),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn cache_file(&self) -> &Path {
        &self.cache_file
    }

    /// Writes every remembered region to the cache file.
    pub fn save(&self) -> Result<(), GeocodeCacheError> {
        let entries: Vec<((f64, f64), String)> = self
            .entries
            .borrow()
            .iter()
            .map(|((lat, lon), region)| ((lat.0, lon.0), region.clone()))
            .collect();
        let bytes = bincode::serde::encode_to_vec(&entries, BINCODE_CONFIG)
            .map_err(|e| GeocodeCacheError::CacheEncode(Box::new(e)))?;
        if let Some(parent) = self.cache_file.parent() {
            ensure_cache_dir_exists(parent)?;
        }
        std::fs::write(&self.cache_file, &bytes)
            .map_err(|e| GeocodeCacheError::CacheWrite(self.cache_file.clone(), e))?;
        info!(
            "Wrote {} cached regions ({} bytes) to {}",
            entries.len(),
            bytes.len(),
            self.cache_file.display()
        );
        Ok(())
    }

    fn read_entries(cache_file: &Path) -> Result<HashMap<CoordinateKey, String>, GeocodeCacheError> {
        let bytes = std::fs::read(cache_file)
            .map_err(|e| GeocodeCacheError::CacheRead(cache_file.to_path_buf(), e))?;
        let (decoded, _) = bincode::serde::decode_from_slice::<Vec<((f64, f64), String)>, _>(
            &bytes,
            BINCODE_CONFIG,
        )
        .map_err(|e| GeocodeCacheError::CacheDecode(cache_file.to_path_buf(), Box::from(e)))?;
        Ok(decoded
            .into_iter()
            .map(|((lat, lon), region)| ((OrderedFloat(lat), OrderedFloat(lon)), region))
            .collect())
    }
}

impl<G: Geocoder> Geocoder for CachedGeocoder<G> {
    fn region_code(&self, lat: f64, lon: f64) -> Option<String> {
        let key = (OrderedFloat(lat), OrderedFloat(lon));
        if let Some(region) = self.entries.borrow().get(&key) {
            return Some(region.clone());
        }
        let region = self.inner.region_code(lat, lon)?;
        self.entries.borrow_mut().insert(key, region.clone());
        Some(region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tempfile::TempDir;

    #[derive(Default)]
    struct CountingGeocoder {
        calls: Cell<usize>,
    }

    impl Geocoder for CountingGeocoder {
        fn region_code(&self, lat: f64, _lon: f64) -> Option<String> {
            self.calls.set(self.calls.get() + 1);
            (lat > 0.0).then(|| "IL".to_string())
        }
    }

    #[test]
    fn test_repeated_coordinates_hit_the_cache() -> Result<(), GeocodeCacheError> {
        let dir = TempDir::new().expect("temp dir");
        let cached =
            CachedGeocoder::with_cache_file(CountingGeocoder::default(), dir.path().join("g.bin"))?;

        assert_eq!(cached.region_code(40.0, -89.0), Some("IL".to_string()));
        assert_eq!(cached.region_code(40.0, -89.0), Some("IL".to_string()));
        assert_eq!(cached.inner.calls.get(), 1);

        // Failures are not remembered
        assert_eq!(cached.region_code(-1.0, 0.0), None);
        assert_eq!(cached.region_code(-1.0, 0.0), None);
        assert_eq!(cached.inner.calls.get(), 3);
        assert_eq!(cached.len(), 1);
        Ok(())
    }

    #[test]
    fn test_saved_entries_survive_reload() -> Result<(), GeocodeCacheError> {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("cache").join("geocode.bin");

        let first = CachedGeocoder::with_cache_file(CountingGeocoder::default(), &path)?;
        first.region_code(40.5, -88.25);
        first.save()?;

        let second = CachedGeocoder::with_cache_file(CountingGeocoder::default(), &path)?;
        assert_eq!(second.region_code(40.5, -88.25), Some("IL".to_string()));
        assert_eq!(second.inner.calls.get(), 0);
        Ok(())
    }

    #[test]
    fn test_corrupt_cache_file_is_reported() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("geocode.bin");
        std::fs::write(&path, [0xff, 0x01]).expect("write fixture");

        let result = CachedGeocoder::with_cache_file(CountingGeocoder::default(), &path);
        assert!(matches!(result, Err(GeocodeCacheError::CacheDecode(..))));
    }
}

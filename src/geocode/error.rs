use std::path::PathBuf;
use thiserror::Error;

/// Why a single reverse-geocoding lookup produced no region.
///
/// Never returned to callers: [`crate::Geocoder`] implementations log it and yield `None`.
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to parse geocoder response")]
    JsonParse(#[from] serde_json::Error),

    #[error("Geocoder answered with status '{0}'")]
    ServiceStatus(String),

    #[error("No first-level administrative area in geocoder response")]
    NoRegion,
}

#[derive(Debug, Error)]
pub enum GeocodeCacheError {
    #[error("Failed to determine cache directory")]
    CacheDirResolution,

    #[error("Failed to create cache directory '{0}'")]
    CacheDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to read cache file '{0}'")]
    CacheRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to write cache file '{0}'")]
    CacheWrite(PathBuf, #[source] std::io::Error),

    #[error("Failed to decode cache data from '{0}'")]
    CacheDecode(PathBuf, #[source] Box<bincode::error::DecodeError>),

    #[error("Failed to encode cache data")]
    CacheEncode(#[source] Box<bincode::error::EncodeError>),
}

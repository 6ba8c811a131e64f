use crate::config::ConfigError;
#[cfg(feature = "charts")]
use crate::export::chart::ChartError;
use crate::export::map::MapError;
use crate::geocode::error::GeocodeCacheError;
use crate::table::error::TableError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WellWaterError {
    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Map(#[from] MapError),

    #[error(transparent)]
    GeocodeCache(#[from] GeocodeCacheError),

    #[cfg(feature = "charts")]
    #[error(transparent)]
    Chart(#[from] ChartError),
}

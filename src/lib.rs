//! Groundwater well depth pipelines: load raw readings, clean them, aggregate per well
//! and period, reshape, and export tables, charts and maps.

mod aggregate;
mod config;
mod error;
mod export;
mod filtering;
mod geocode;
mod pivot;
mod table;
mod types;
mod utils;

pub mod pipelines;

pub use config::{
    ConfigError, DepthChangeYears, GeocoderConfig, WellWaterConfig, YearBounds,
    API_KEY_ENV_VAR, CONFIG_FILE_NAME,
};
pub use error::WellWaterError;

pub use table::error::TableError;
pub use table::loader::{load_table, Delimiter, RecordLoader};
pub use table::well_frame::WellFrame;

pub use types::column_kind::{ColumnKind, TableSchema};
pub use types::columns::*;

pub use pivot::PivotNaming;

pub use export::csv::{write_csv, write_delimited};
pub use export::map::{render_map, MapError, MapOptions, MarkerLayout, PLAIN_MARKER_LIMIT};
#[cfg(feature = "charts")]
pub use export::chart::{render_chart, render_single_series, ChartError, ChartOptions};

pub use geocode::cache::CachedGeocoder;
pub use geocode::error::GeocodeCacheError;
pub use geocode::google::{GoogleGeocoder, GOOGLE_GEOCODE_ENDPOINT};
pub use geocode::{annotate_regions, Geocoder};

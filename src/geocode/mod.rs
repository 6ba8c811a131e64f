//! Reverse geocoding of well coordinates to a region code.

pub mod cache;
pub mod error;
pub mod google;

use crate::table::error::TableError;
use crate::table::well_frame::WellFrame;
use log::info;
use polars::prelude::{NamedFrom, Series};

/// Finds the first-level administrative region (a US state code, for example) that
/// contains a coordinate.
///
/// Implementations fail open: a lookup that cannot be answered returns `None`.
pub trait Geocoder {
    fn region_code(&self, lat: f64, lon: f64) -> Option<String>;
}

impl<G: Geocoder + ?Sized> Geocoder for &G {
    fn region_code(&self, lat: f64, lon: f64) -> Option<String> {
        (**self).region_code(lat, lon)
    }
}

/// Appends a text column holding the region of every row.
///
/// The geocoder is asked once per row. Rows missing a coordinate are not looked up and
/// get a missing region.
pub fn annotate_regions<G: Geocoder + ?Sized>(
    table: &WellFrame,
    lat_column: &str,
    lon_column: &str,
    output_column: &str,
    geocoder: &G,
) -> Result<WellFrame, TableError> {
    let lats = table.float_values(lat_column)?;
    let lons = table.float_values(lon_column)?;

    let regions: Vec<Option<String>> = lats
        .into_iter()
        .zip(lons)
        .map(|coordinate| match coordinate {
            (Some(lat), Some(lon)) => geocoder.region_code(lat, lon),
            _ => None,
        })
        .collect();
    let found = regions.iter().flatten().count();
    info!("Found regions for {} of {} rows", found, regions.len());

    let mut frame = table.frame.clone();
    frame.with_column(Series::new(output_column.into(), regions))?;
    Ok(WellFrame::new(frame))
}

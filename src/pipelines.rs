//! The end-to-end jobs behind the binaries.
//!
//! Every job reads its inputs from the paths in [`WellWaterConfig`], writes its output
//! and returns the table it wrote.

use crate::config::WellWaterConfig;
use crate::export::csv::write_csv;
use crate::export::map::{render_map, MapError, MapOptions};
use crate::geocode::{annotate_regions, Geocoder};
use crate::pivot::PivotNaming;
use crate::table::error::TableError;
use crate::table::loader::{load_table, Delimiter, RecordLoader};
use crate::table::well_frame::WellFrame;
use crate::types::column_kind::{ColumnKind, TableSchema};
use crate::types::columns::{
    COL_DATETIME, COL_DEPTH_CHANGE, COL_LATITUDE, COL_LONGITUDE, COL_MONTH, COL_STATE,
    COL_STATION, COL_WATER_DEPTH, COL_YEAR, DEPTH_COLUMN_PREFIX, READING_COLUMNS,
    WELL_KEY_COLUMNS,
};
use log::info;
use polars::prelude::{lit, DataType, NULL};
use std::path::Path;

#[cfg(feature = "charts")]
use crate::export::chart::{render_chart, render_single_series, ChartError, ChartOptions};

/// Declared kinds for tables this crate wrote itself. Station names stay text even
/// when they look numeric.
fn derived_schema() -> TableSchema {
    TableSchema::new()
        .with_column(COL_STATION, ColumnKind::Text)
        .with_column(COL_LATITUDE, ColumnKind::Float)
        .with_column(COL_LONGITUDE, ColumnKind::Float)
}

fn load_derived(path: &Path) -> Result<WellFrame, TableError> {
    info!("Reading {:?}...", path);
    load_table(path, Delimiter::from_path(path), Some(&derived_schema()))
}

/// Loads raw readings and keeps only rows with a complete, numeric reading.
///
/// Rows missing any of the reading columns are dropped, then coordinates and depths
/// that do not parse as numbers are dropped. Columns the pipelines do not use are read
/// as text, so no value in them can fail the load.
pub fn clean_readings(input: &Path) -> Result<WellFrame, TableError> {
    info!("Reading {:?}...", input);
    let raw = RecordLoader::builder()
        .delimiter(Delimiter::from_path(input))
        .schema(TableSchema::well_readings())
        .infer_schema_length(0)
        .build()
        .load(input)?;
    info!("Loaded readings {:?}", raw.shape());

    let complete = raw.drop_missing(&READING_COLUMNS)?;
    info!("Complete readings {:?}", complete.shape());

    let numeric = complete
        .coerce_numeric(COL_LATITUDE)?
        .coerce_numeric(COL_LONGITUDE)?
        .coerce_numeric(COL_WATER_DEPTH)?
        .drop_missing(&[COL_LATITUDE, COL_LONGITUDE, COL_WATER_DEPTH])?;
    info!("Numeric readings {:?}", numeric.shape());
    Ok(numeric)
}

/// Mean depth per well and calendar year.
pub fn yearly_average(config: &WellWaterConfig) -> Result<WellFrame, TableError> {
    let yearly = clean_readings(&config.input_tsv)?
        .with_calendar_fields(COL_DATETIME)?
        .drop_missing(&[COL_YEAR])?
        .group_mean(
            &[COL_STATION, COL_LATITUDE, COL_LONGITUDE, COL_YEAR],
            COL_WATER_DEPTH,
        )?;
    write_csv(&yearly, &config.yearly_csv)?;
    info!("Yearly averages saved to {:?}", config.yearly_csv);
    Ok(yearly)
}

/// Mean depth per well, month and year, for years inside the configured bounds.
pub fn monthly_average(config: &WellWaterConfig) -> Result<WellFrame, TableError> {
    let bounds = config.monthly_years;
    let monthly = clean_readings(&config.input_tsv)?
        .filter_year_range(COL_DATETIME, bounds.min_exclusive, bounds.max_exclusive)?
        .with_calendar_fields(COL_DATETIME)?
        .group_mean(
            &[COL_STATION, COL_LATITUDE, COL_LONGITUDE, COL_MONTH, COL_YEAR],
            COL_WATER_DEPTH,
        )?;
    write_csv(&monthly, &config.monthly_csv)?;
    info!("Monthly averages saved to {:?}", config.monthly_csv);
    Ok(monthly)
}

/// Per well yearly depth in two years side by side, and their difference.
///
/// Reads the yearly averages table. A well missing either year gets a missing change.
pub fn depth_change(config: &WellWaterConfig) -> Result<WellFrame, TableError> {
    let years = config.depth_change_years;
    let naming = PivotNaming::prefixed(DEPTH_COLUMN_PREFIX);
    let from_column = naming.column_name(&years.from.to_string());
    let to_column = naming.column_name(&years.to.to_string());

    let mut wide = load_derived(&config.yearly_csv)?
        .filter_in(COL_YEAR, &[years.from, years.to])?
        .pivot(&WELL_KEY_COLUMNS, COL_YEAR, COL_WATER_DEPTH, &naming)?;

    // A year with no readings at all produces no pivot column
    for column in [&from_column, &to_column] {
        if !wide.has_column(column) {
            wide = wide.apply(|lf| {
                lf.with_column(lit(NULL).cast(DataType::Float64).alias(column.as_str()))
            })?;
        }
    }

    let changed = wide
        .select(&[
            COL_STATION,
            COL_LATITUDE,
            COL_LONGITUDE,
            from_column.as_str(),
            to_column.as_str(),
        ])?
        .derive_difference(&to_column, &from_column, COL_DEPTH_CHANGE)?;
    write_csv(&changed, &config.depth_change_csv)?;
    info!("Depth changes saved to {:?}", config.depth_change_csv);
    Ok(changed)
}

/// One row per distinct coordinate pair with the name of the first well seen there.
pub fn well_locations(config: &WellWaterConfig) -> Result<WellFrame, TableError> {
    let locations = clean_readings(&config.input_tsv)?
        .drop_duplicates(&[COL_LATITUDE, COL_LONGITUDE])?
        .select(&WELL_KEY_COLUMNS)?;
    write_csv(&locations, &config.locations_csv)?;
    info!("Cleaned locations saved to {:?}", config.locations_csv);
    Ok(locations)
}

/// The well locations table with a `state` column from `geocoder`.
pub fn well_states<G: Geocoder + ?Sized>(
    config: &WellWaterConfig,
    geocoder: &G,
) -> Result<WellFrame, TableError> {
    let locations = load_derived(&config.locations_csv)?;
    let with_state = annotate_regions(
        &locations,
        COL_LATITUDE,
        COL_LONGITUDE,
        COL_STATE,
        geocoder,
    )?;
    write_csv(&with_state, &config.locations_with_state_csv)?;
    Ok(with_state)
}

/// Clustered marker map of the well locations table.
///
/// Returns the wells that were placed on the map.
pub fn location_map(config: &WellWaterConfig) -> Result<WellFrame, MapError> {
    let locations = load_derived(&config.locations_csv)?;
    info!("Loaded locations {:?}", locations.shape());
    let located = locations.drop_missing(&[COL_LATITUDE, COL_LONGITUDE])?;
    info!("Located wells {:?}", located.shape());

    let options = MapOptions::builder()
        .layout(config.map_layout)
        .zoom_start(config.map_zoom_start)
        .build();
    render_map(
        &located,
        COL_LATITUDE,
        COL_LONGITUDE,
        COL_STATION,
        &config.map_html,
        &options,
    )?;
    Ok(located)
}

/// Mean of the per well yearly averages, per year.
pub fn overall_yearly_series(config: &WellWaterConfig) -> Result<WellFrame, TableError> {
    load_derived(&config.yearly_csv)?.group_mean(&[COL_YEAR], COL_WATER_DEPTH)
}

/// Mean of the per well monthly averages, per year and month.
pub fn overall_monthly_series(config: &WellWaterConfig) -> Result<WellFrame, TableError> {
    load_derived(&config.monthly_csv)?.group_mean(&[COL_YEAR, COL_MONTH], COL_WATER_DEPTH)
}

#[cfg(feature = "charts")]
pub fn overall_yearly_chart(config: &WellWaterConfig) -> Result<WellFrame, ChartError> {
    let series = overall_yearly_series(config)?;
    let options = ChartOptions::builder()
        .title("Yearly Average Well Depth")
        .x_title("Year")
        .y_title("Average Depth (ft)")
        .build();
    render_single_series(
        &series,
        COL_YEAR,
        COL_WATER_DEPTH,
        &config.yearly_chart_html,
        &options,
    )?;
    Ok(series)
}

#[cfg(feature = "charts")]
pub fn overall_monthly_chart(config: &WellWaterConfig) -> Result<WellFrame, ChartError> {
    let series = overall_monthly_series(config)?;
    let excluded: Vec<String> = config
        .excluded_chart_years
        .iter()
        .map(|year| year.to_string())
        .collect();
    let excluded: Vec<&str> = excluded.iter().map(String::as_str).collect();
    let options = ChartOptions::builder()
        .title("Monthly Average Well Depth by Year")
        .x_title("Month")
        .y_title("Average Depth")
        .build();
    render_chart(
        &series,
        COL_MONTH,
        COL_YEAR,
        COL_WATER_DEPTH,
        &excluded,
        &config.monthly_chart_html,
        &options,
    )?;
    Ok(series)
}

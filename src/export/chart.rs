//! Line charts written as standalone plotly HTML pages.

use crate::pivot::PivotNaming;
use crate::table::error::TableError;
use crate::table::well_frame::WellFrame;
use bon::Builder;
use log::{debug, info};
use plotlars::{LinePlot, Plot, Text};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error(transparent)]
    Table(#[from] TableError),

    #[error("No series left to draw after excluding {excluded:?}")]
    NoSeries { excluded: Vec<String> },

    #[error("I/O error preparing chart directory '{0}'")]
    Io(PathBuf, #[source] std::io::Error),
}

/// Titles shown on a chart.
#[derive(Debug, Clone, Builder)]
pub struct ChartOptions {
    #[builder(into)]
    pub title: String,
    #[builder(default = String::new(), into)]
    pub x_title: String,
    #[builder(default = String::new(), into)]
    pub y_title: String,
}

/// Draws one line per value of `series_column`, with `x_column` on the x axis.
///
/// Series listed in `excluded_series` are left out. The remaining series are drawn in
/// ascending order of their value, each labelled with that value.
pub fn render_chart(
    table: &WellFrame,
    x_column: &str,
    series_column: &str,
    y_column: &str,
    excluded_series: &[&str],
    path: &Path,
    options: &ChartOptions,
) -> Result<(), ChartError> {
    let (wide, series) = series_table(table, x_column, series_column, y_column, excluded_series)?;
    debug!("Charting {} series over {} x values", series.len(), wide.height());

    let Some((first, rest)) = series.split_first() else {
        return Err(ChartError::NoSeries {
            excluded: excluded_series.iter().map(|s| s.to_string()).collect(),
        });
    };
    prepare_dir(path)?;

    LinePlot::builder()
        .data(&wide.frame)
        .x(x_column)
        .y(first.as_str())
        .additional_lines(rest.iter().map(String::as_str).collect())
        .with_shape(true)
        .plot_title(Text::from(options.title.as_str()))
        .x_title(Text::from(options.x_title.as_str()))
        .y_title(Text::from(options.y_title.as_str()))
        .build()
        .write_html(path.to_string_lossy().into_owned());

    info!("Chart saved to {:?}", path);
    Ok(())
}

/// Draws a single line of `y_column` against `x_column`.
pub fn render_single_series(
    table: &WellFrame,
    x_column: &str,
    y_column: &str,
    path: &Path,
    options: &ChartOptions,
) -> Result<(), ChartError> {
    table.require_columns(&[x_column, y_column])?;
    prepare_dir(path)?;

    LinePlot::builder()
        .data(&table.frame)
        .x(x_column)
        .y(y_column)
        .with_shape(true)
        .plot_title(Text::from(options.title.as_str()))
        .x_title(Text::from(options.x_title.as_str()))
        .y_title(Text::from(options.y_title.as_str()))
        .build()
        .write_html(path.to_string_lossy().into_owned());

    info!("Chart saved to {:?}", path);
    Ok(())
}

/// Wide table with one column per kept series, plus the names of those columns.
pub(crate) fn series_table(
    table: &WellFrame,
    x_column: &str,
    series_column: &str,
    y_column: &str,
    excluded_series: &[&str],
) -> Result<(WellFrame, Vec<String>), TableError> {
    let kept: Vec<String> = table
        .distinct_values(series_column)?
        .into_iter()
        .filter(|value| !excluded_series.contains(&value.as_str()))
        .collect();

    let wide = table.filter_in(series_column, &kept)?.pivot(
        &[x_column],
        series_column,
        y_column,
        &PivotNaming::literal(),
    )?;
    Ok((wide, kept))
}

fn prepare_dir(path: &Path) -> Result<(), ChartError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| ChartError::Io(parent.to_path_buf(), e))
        }
        _ => Ok(()),
    }
}

//! Interactive marker map of well locations, written as a standalone Leaflet page.

use crate::table::error::TableError;
use crate::table::well_frame::WellFrame;
use bon::Builder;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tera::{Context, Tera};
use thiserror::Error;

const MAP_TEMPLATE: &str = include_str!("map.html.tera");

/// Above this many markers an unclustered map becomes unusable in a browser.
pub const PLAIN_MARKER_LIMIT: usize = 5_000;

const DEFAULT_ZOOM: u8 = 6;
const DEFAULT_TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
const DEFAULT_TILE_ATTRIBUTION: &str = "&copy; OpenStreetMap contributors";

#[derive(Debug, Error)]
pub enum MapError {
    #[error(transparent)]
    Table(#[from] TableError),

    #[error("No rows with both coordinates present, nothing to map")]
    NoMarkers,

    #[error("{count} markers exceed the unclustered limit of {limit}; use a clustered layout")]
    TooManyMarkers { count: usize, limit: usize },

    #[error("Failed to render map template")]
    Template(#[from] tera::Error),

    #[error("Failed to encode map markers")]
    Json(#[from] serde_json::Error),

    #[error("I/O error writing map to '{0}'")]
    Io(PathBuf, #[source] std::io::Error),
}

/// How markers are added to the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerLayout {
    /// Nearby markers merge into numbered clusters until zoomed in.
    #[default]
    Clustered,
    /// Every marker is drawn individually. Limited to [`MapOptions::plain_marker_limit`].
    Plain,
}

/// Presentation settings for [`render_map`].
#[derive(Debug, Clone, Builder)]
pub struct MapOptions {
    #[builder(default)]
    pub layout: MarkerLayout,
    #[builder(default = DEFAULT_ZOOM)]
    pub zoom_start: u8,
    #[builder(default = "Well locations".to_string(), into)]
    pub title: String,
    #[builder(default = DEFAULT_TILE_URL.to_string(), into)]
    pub tile_url: String,
    #[builder(default = DEFAULT_TILE_ATTRIBUTION.to_string(), into)]
    pub tile_attribution: String,
    #[builder(default = PLAIN_MARKER_LIMIT)]
    pub plain_marker_limit: usize,
}

impl Default for MapOptions {
    fn default() -> Self {
        MapOptions::builder().build()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct Marker {
    lat: f64,
    lon: f64,
    popup: String,
}

/// Writes an HTML map with one marker per row of `table`.
///
/// Each popup reads `"{label}: ({lat}, {lon})"`, coordinates always carrying a decimal
/// point (`-88.0`, not `-88`). Rows missing either coordinate are
/// skipped. The map is centered on the mean of the plotted coordinates.
///
/// # Errors
///
/// * [`MapError::NoMarkers`] when no row has both coordinates.
/// * [`MapError::TooManyMarkers`] for a [`MarkerLayout::Plain`] map above the limit.
pub fn render_map(
    table: &WellFrame,
    lat_column: &str,
    lon_column: &str,
    label_column: &str,
    path: &Path,
    options: &MapOptions,
) -> Result<usize, MapError> {
    let markers = collect_markers(table, lat_column, lon_column, label_column)?;
    if markers.is_empty() {
        return Err(MapError::NoMarkers);
    }
    let skipped = table.height() - markers.len();
    if skipped > 0 {
        warn!("Skipped {} rows without coordinates", skipped);
    }
    if options.layout == MarkerLayout::Plain && markers.len() > options.plain_marker_limit {
        return Err(MapError::TooManyMarkers {
            count: markers.len(),
            limit: options.plain_marker_limit,
        });
    }

    let html = render_html(&markers, options)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| MapError::Io(dir.to_path_buf(), e))?;
    let staging = NamedTempFile::new_in(dir).map_err(|e| MapError::Io(dir.to_path_buf(), e))?;
    fs::write(staging.path(), html).map_err(|e| MapError::Io(path.to_path_buf(), e))?;
    staging
        .persist(path)
        .map_err(|e| MapError::Io(path.to_path_buf(), e.error))?;

    info!("Map with {} markers saved to {:?}", markers.len(), path);
    Ok(markers.len())
}

fn collect_markers(
    table: &WellFrame,
    lat_column: &str,
    lon_column: &str,
    label_column: &str,
) -> Result<Vec<Marker>, TableError> {
    let lats = table.float_values(lat_column)?;
    let lons = table.float_values(lon_column)?;
    let labels = table.text_values(label_column)?;

    let markers = lats
        .into_iter()
        .zip(lons)
        .zip(labels)
        .filter_map(|((lat, lon), label)| match (lat, lon) {
            (Some(lat), Some(lon)) => Some(Marker {
                lat,
                lon,
                popup: escape_html(&format!(
                    "{}: ({:?}, {:?})",
                    label.unwrap_or_default(),
                    lat,
                    lon
                )),
            }),
            _ => None,
        })
        .collect();
    Ok(markers)
}

fn render_html(markers: &[Marker], options: &MapOptions) -> Result<String, MapError> {
    let count = markers.len() as f64;
    let center_lat = markers.iter().map(|m| m.lat).sum::<f64>() / count;
    let center_lon = markers.iter().map(|m| m.lon).sum::<f64>() / count;

    // serde_json leaves '/' alone, so a label could otherwise close the script tag
    let markers_json = serde_json::to_string(markers)?.replace("</", "<\\/");

    let mut context = Context::new();
    context.insert("title", &escape_html(&options.title));
    context.insert("center_lat", &center_lat);
    context.insert("center_lon", &center_lon);
    context.insert("zoom_start", &options.zoom_start);
    context.insert("tile_url", &options.tile_url);
    context.insert("tile_attribution", &options.tile_attribution);
    context.insert("clustered", &(options.layout == MarkerLayout::Clustered));
    context.insert("markers_json", &markers_json);

    Ok(Tera::one_off(MAP_TEMPLATE, &context, false)?)
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;
    use tempfile::TempDir;

    fn locations() -> WellFrame {
        WellFrame::new(
            df!(
                "station_nm" => [Some("WELL A"), Some("WELL <B>"), Some("WELL C")],
                "dec_lat_va" => [Some(40.0), Some(42.0), None],
                "dec_long_va" => [Some(-89.0), Some(-87.0), Some(-88.0)]
            )
            .expect("fixture frame"),
        )
    }

    #[test]
    fn test_clustered_map_contains_every_located_well() -> Result<(), MapError> {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("map.html");

        let written = render_map(
            &locations(),
            "dec_lat_va",
            "dec_long_va",
            "station_nm",
            &path,
            &MapOptions::default(),
        )?;

        assert_eq!(written, 2);
        let html = std::fs::read_to_string(&path).expect("read map");
        assert!(html.contains("L.markerClusterGroup()"));
        assert!(html.contains("WELL A: (40.0, -89.0)"));
        assert!(html.contains("WELL &lt;B&gt;: (42.0, -87.0)"));
        assert!(!html.contains("WELL C"));
        assert!(html.contains("setView([41"));
        assert!(html.contains("], 6);"));
        Ok(())
    }

    #[test]
    fn test_plain_layout_respects_limit() {
        let dir = TempDir::new().expect("temp dir");
        let options = MapOptions::builder()
            .layout(MarkerLayout::Plain)
            .plain_marker_limit(1)
            .build();

        let result = render_map(
            &locations(),
            "dec_lat_va",
            "dec_long_va",
            "station_nm",
            &dir.path().join("map.html"),
            &options,
        );

        assert!(matches!(
            result,
            Err(MapError::TooManyMarkers { count: 2, limit: 1 })
        ));
    }

    #[test]
    fn test_plain_layout_under_limit_uses_layer_group() -> Result<(), MapError> {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("plain.html");
        let options = MapOptions::builder().layout(MarkerLayout::Plain).build();

        render_map(&locations(), "dec_lat_va", "dec_long_va", "station_nm", &path, &options)?;

        let html = std::fs::read_to_string(&path).expect("read map");
        assert!(html.contains("L.layerGroup()"));
        assert!(!html.contains("leaflet.markercluster.js"));
        Ok(())
    }

    #[test]
    fn test_no_coordinates_is_an_error() {
        let dir = TempDir::new().expect("temp dir");
        let table = WellFrame::new(
            df!(
                "station_nm" => ["A"],
                "dec_lat_va" => [None::<f64>],
                "dec_long_va" => [Some(1.0)]
            )
            .expect("fixture frame"),
        );
        let result = render_map(
            &table,
            "dec_lat_va",
            "dec_long_va",
            "station_nm",
            &dir.path().join("map.html"),
            &MapOptions::default(),
        );
        assert!(matches!(result, Err(MapError::NoMarkers)));
    }
}

//! File locations and parameters shared by the pipelines.
//!
//! Every field has a default, so an empty or absent `wellwater.toml` reproduces the
//! stock layout: raw readings under `all_well_data/`, derived tables under
//! `preprocessed_data/` and pages in the working directory.
//!
//! ```toml
//! input_tsv = "data/illinois.tsv"
//! excluded_chart_years = [2004, 2005, 2009, 2012]
//!
//! [monthly_years]
//! min_exclusive = 2009
//! max_exclusive = 2024
//!
//! [geocoder]
//! api_key = "..."
//! ```

use crate::export::map::MarkerLayout;
use log::{debug, info};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = "wellwater.toml";

/// Read when `[geocoder] api_key` is left empty.
pub const API_KEY_ENV_VAR: &str = "WELLWATER_GEOCODER_API_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{0}'")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse config file '{0}'")]
    Parse(PathBuf, #[source] toml::de::Error),
}

/// Exclusive year bounds: a year `y` is kept when `min_exclusive < y < max_exclusive`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct YearBounds {
    pub min_exclusive: i32,
    pub max_exclusive: i32,
}

/// The two years compared by the depth change table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DepthChangeYears {
    pub from: i32,
    pub to: i32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeocoderConfig {
    pub api_key: String,
    pub endpoint: String,
    /// Remember lookups in the user cache directory between runs.
    pub cache: bool,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: crate::geocode::google::GOOGLE_GEOCODE_ENDPOINT.to_string(),
            cache: true,
        }
    }
}

impl GeocoderConfig {
    /// The configured key, else the value of [`API_KEY_ENV_VAR`], else an empty key.
    pub fn resolved_api_key(&self) -> String {
        if !self.api_key.is_empty() {
            return self.api_key.clone();
        }
        std::env::var(API_KEY_ENV_VAR).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WellWaterConfig {
    pub input_tsv: PathBuf,
    pub yearly_csv: PathBuf,
    pub monthly_csv: PathBuf,
    pub depth_change_csv: PathBuf,
    pub locations_csv: PathBuf,
    pub locations_with_state_csv: PathBuf,
    pub map_html: PathBuf,
    pub yearly_chart_html: PathBuf,
    pub monthly_chart_html: PathBuf,
    pub monthly_years: YearBounds,
    pub depth_change_years: DepthChangeYears,
    /// Years left out of the monthly chart.
    pub excluded_chart_years: Vec<i32>,
    pub map_layout: MarkerLayout,
    pub map_zoom_start: u8,
    pub geocoder: GeocoderConfig,
}

impl Default for WellWaterConfig {
    fn default() -> Self {
        Self {
            input_tsv: PathBuf::from("all_well_data/all_well_data.tsv"),
            yearly_csv: PathBuf::from("preprocessed_data/yearly_avg_water_depth.csv"),
            monthly_csv: PathBuf::from("preprocessed_data/monthly_avg_well_depth_since_2000.csv"),
            depth_change_csv: PathBuf::from("preprocessed_data/depth_change.csv"),
            locations_csv: PathBuf::from("preprocessed_data/wells_by_location.csv"),
            locations_with_state_csv: PathBuf::from(
                "preprocessed_data/wells_by_location_with_state.csv",
            ),
            map_html: PathBuf::from("map.html"),
            yearly_chart_html: PathBuf::from("yearly_avg_well_depth.html"),
            monthly_chart_html: PathBuf::from("monthly_avg_well_depth_since_2000.html"),
            monthly_years: YearBounds {
                min_exclusive: 1999,
                max_exclusive: 2024,
            },
            depth_change_years: DepthChangeYears {
                from: 2000,
                to: 2023,
            },
            excluded_chart_years: vec![2004, 2005, 2009],
            map_layout: MarkerLayout::Clustered,
            map_zoom_start: 6,
            geocoder: GeocoderConfig::default(),
        }
    }
}

impl WellWaterConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
        let config =
            toml::from_str(&content).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Like [`WellWaterConfig::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            debug!("No config file at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Reads `wellwater.toml` from the working directory when present.
    pub fn from_working_dir() -> Result<Self, ConfigError> {
        Self::load_or_default(Path::new(CONFIG_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() -> Result<(), ConfigError> {
        let dir = TempDir::new().expect("temp dir");
        let config = WellWaterConfig::load_or_default(&dir.path().join(CONFIG_FILE_NAME))?;
        assert_eq!(config, WellWaterConfig::default());
        assert_eq!(config.monthly_years.min_exclusive, 1999);
        assert_eq!(config.depth_change_years.to, 2023);
        Ok(())
    }

    #[test]
    fn test_partial_file_overrides_only_named_fields() -> Result<(), ConfigError> {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            r#"
input_tsv = "data/illinois.tsv"
excluded_chart_years = []
map_layout = "plain"

[monthly_years]
min_exclusive = 2009
max_exclusive = 2020

[geocoder]
api_key = "secret"
"#,
        )
        .expect("write config");

        let config = WellWaterConfig::load(&path)?;

        assert_eq!(config.input_tsv, PathBuf::from("data/illinois.tsv"));
        assert!(config.excluded_chart_years.is_empty());
        assert_eq!(config.map_layout, MarkerLayout::Plain);
        assert_eq!(
            config.monthly_years,
            YearBounds {
                min_exclusive: 2009,
                max_exclusive: 2020
            }
        );
        assert_eq!(config.geocoder.resolved_api_key(), "secret");
        assert!(config.geocoder.cache);
        assert_eq!(config.yearly_csv, WellWaterConfig::default().yearly_csv);
        Ok(())
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "input_csv = \"typo.tsv\"\n").expect("write config");

        assert!(matches!(
            WellWaterConfig::load(&path),
            Err(ConfigError::Parse(..))
        ));
    }
}

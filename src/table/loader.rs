use crate::table::error::TableError;
use crate::table::well_frame::WellFrame;
use crate::types::column_kind::TableSchema;
use bon::Builder;
use log::{debug, info};
use polars::prelude::*;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Rows scanned to infer the type of undeclared columns.
const DEFAULT_INFER_SCHEMA_LENGTH: usize = 10_000;

/// Field delimiter of a delimited text file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Delimiter {
    #[default]
    Comma,
    Tab,
}

impl Delimiter {
    pub fn as_byte(&self) -> u8 {
        match self {
            Delimiter::Comma => b',',
            Delimiter::Tab => b'\t',
        }
    }

    /// `.tsv` files are tab separated, everything else is read as CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("tsv") => Delimiter::Tab,
            _ => Delimiter::Comma,
        }
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Delimiter::Comma => write!(f, "comma"),
            Delimiter::Tab => write!(f, "tab"),
        }
    }
}

/// Reads delimited text files into a [`WellFrame`].
///
/// The first row is the header. Column order and raw values are preserved; empty
/// fields become missing values. A data row with fewer fields than the header is
/// padded with missing values, while a row with more fields fails the whole load with
/// [`TableError::CsvRead`].
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use wellwater::{Delimiter, RecordLoader, TableSchema};
///
/// # fn main() -> Result<(), wellwater::TableError> {
/// let loader = RecordLoader::builder()
///     .delimiter(Delimiter::Tab)
///     .schema(TableSchema::well_readings())
///     .build();
/// let readings = loader.load(Path::new("all_well_data/all_well_data.tsv"))?;
/// println!("{:?}", readings.shape());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, Builder)]
pub struct RecordLoader {
    #[builder(default)]
    delimiter: Delimiter,
    /// Column kinds pinned at load time. Undeclared columns are inferred.
    schema: Option<TableSchema>,
    /// Rows scanned for type inference, defaults to 10 000. Zero reads every undeclared
    /// column as text.
    infer_schema_length: Option<usize>,
}

impl RecordLoader {
    pub fn load(&self, path: &Path) -> Result<WellFrame, TableError> {
        if !path.exists() {
            return Err(TableError::InputMissing(path.to_path_buf()));
        }
        info!("Reading {} separated file {:?}", self.delimiter, path);

        let separator = self.delimiter.as_byte();
        let mut options = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(
                self.infer_schema_length
                    .unwrap_or(DEFAULT_INFER_SCHEMA_LENGTH),
            ))
            .map_parse_options(|parse| parse.with_separator(separator));

        if let Some(schema) = self.schema.as_ref().filter(|schema| !schema.is_empty()) {
            options = options.with_schema_overwrite(Some(Arc::new(schema.to_polars())));
        }

        let frame = options
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .map_err(|e| TableError::CsvRead {
                path: path.to_path_buf(),
                source: e,
            })?
            .finish()
            .map_err(|e| TableError::CsvRead {
                path: path.to_path_buf(),
                source: e,
            })?;

        debug!("Loaded {:?} with shape {:?}", path, frame.shape());
        Ok(WellFrame::new(frame))
    }
}

/// Loads a delimited file in one call. See [`RecordLoader`] for the parsing rules.
pub fn load_table(
    path: &Path,
    delimiter: Delimiter,
    schema: Option<&TableSchema>,
) -> Result<WellFrame, TableError> {
    RecordLoader::builder()
        .delimiter(delimiter)
        .maybe_schema(schema.cloned())
        .build()
        .load(path)
}

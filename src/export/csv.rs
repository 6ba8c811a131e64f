use crate::table::error::TableError;
use crate::table::loader::Delimiter;
use crate::table::well_frame::WellFrame;
use log::info;
use polars::prelude::{CsvWriter, SerWriter};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Writes a table as comma separated text with a header row.
///
/// See [`write_delimited`].
pub fn write_csv(table: &WellFrame, path: &Path) -> Result<(), TableError> {
    write_delimited(table, path, Delimiter::Comma)
}

/// Writes a table as delimited text with a header row.
///
/// The table is written to a temporary file next to `path` and then renamed over it,
/// so a reader never observes a half-written file. Missing parent directories are
/// created. Missing values are written as empty fields.
pub fn write_delimited(
    table: &WellFrame,
    path: &Path,
    delimiter: Delimiter,
) -> Result<(), TableError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| TableError::WriteIo(dir.to_path_buf(), e))?;

    let mut staging =
        NamedTempFile::new_in(dir).map_err(|e| TableError::WriteIo(dir.to_path_buf(), e))?;

    let mut frame = table.frame.clone();
    CsvWriter::new(staging.as_file_mut())
        .include_header(true)
        .with_separator(delimiter.as_byte())
        .finish(&mut frame)
        .map_err(|e| TableError::CsvWrite {
            path: path.to_path_buf(),
            source: e,
        })?;
    staging
        .as_file_mut()
        .flush()
        .map_err(|e| TableError::WriteIo(path.to_path_buf(), e))?;

    staging
        .persist(path)
        .map_err(|e| TableError::WriteIo(path.to_path_buf(), e.error))?;

    info!("Wrote {} rows to {:?}", table.height(), path);
    Ok(())
}

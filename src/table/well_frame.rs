//! Contains the `WellFrame` table type that flows through every pipeline stage.

use crate::table::error::TableError;
use crate::types::column_kind::ColumnKind;
use polars::prelude::{DataFrame, DataType, IntoLazy, LazyFrame};
use std::fmt;

/// An in-memory table of well readings or of anything derived from them.
///
/// A thin wrapper around a Polars `DataFrame`. Columns keep their order and their
/// semantic type ([`ColumnKind`]) from the moment the file is loaded. Every operation
/// borrows the table and returns a *new* `WellFrame`; the input is never modified, so a
/// stage can always be re-run against the table it was given.
///
/// Instances are obtained from [`crate::load_table`] or built from an existing
/// `DataFrame` with [`WellFrame::new`].
#[derive(Debug, Clone)]
pub struct WellFrame {
    /// The underlying Polars DataFrame.
    pub frame: DataFrame,
}

impl WellFrame {
    pub fn new(frame: DataFrame) -> Self {
        Self { frame }
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.frame.width()
    }

    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        self.frame.shape()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.frame.get_column_index(name).is_some()
    }

    /// The semantic type of a column.
    pub fn column_kind(&self, name: &str) -> Result<ColumnKind, TableError> {
        self.frame
            .column(name)
            .map(|column| ColumnKind::from_dtype(column.dtype()))
            .map_err(|_| TableError::MissingColumn(name.to_string()))
    }

    /// Every column with its semantic type, in table order.
    pub fn column_kinds(&self) -> Vec<(String, ColumnKind)> {
        self.frame
            .get_columns()
            .iter()
            .map(|column| {
                (
                    column.name().to_string(),
                    ColumnKind::from_dtype(column.dtype()),
                )
            })
            .collect()
    }

    /// Reads a column as floats. Values that are not numeric come back as `None`.
    pub fn float_values(&self, name: &str) -> Result<Vec<Option<f64>>, TableError> {
        self.require_columns(&[name])?;
        let floats = self.frame.column(name)?.cast(&DataType::Float64)?;
        let values = floats.f64()?.into_iter().collect();
        Ok(values)
    }

    /// Reads a column as text, rendering numbers and dates in their display form.
    pub fn text_values(&self, name: &str) -> Result<Vec<Option<String>>, TableError> {
        self.require_columns(&[name])?;
        let strings = self.frame.column(name)?.cast(&DataType::String)?;
        let values = strings
            .str()?
            .into_iter()
            .map(|value| value.map(str::to_string))
            .collect();
        Ok(values)
    }

    /// Fails with [`TableError::MissingColumn`] for the first name not in the table.
    pub(crate) fn require_columns(&self, names: &[&str]) -> Result<(), TableError> {
        match names.iter().find(|name| !self.has_column(name)) {
            Some(missing) => Err(TableError::MissingColumn(missing.to_string())),
            None => Ok(()),
        }
    }

    /// Fails with [`TableError::NonNumericColumn`] unless the column holds numbers.
    pub(crate) fn require_numeric(&self, name: &str) -> Result<(), TableError> {
        let kind = self.column_kind(name)?;
        if kind.is_numeric() {
            Ok(())
        } else {
            Err(TableError::NonNumericColumn {
                column: name.to_string(),
                kind,
            })
        }
    }

    /// Runs a lazy query over a copy of this table and materializes the result.
    pub(crate) fn apply(
        &self,
        query: impl FnOnce(LazyFrame) -> LazyFrame,
    ) -> Result<WellFrame, TableError> {
        let frame = query(self.frame.clone().lazy()).collect()?;
        Ok(WellFrame::new(frame))
    }
}

impl From<DataFrame> for WellFrame {
    fn from(frame: DataFrame) -> Self {
        WellFrame::new(frame)
    }
}

impl fmt::Display for WellFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    #[test]
    fn test_column_kinds_follow_dtypes() -> Result<(), TableError> {
        let table = WellFrame::new(df!(
            "station_nm" => ["A", "B"],
            "water_depth_ft" => [1.5, 2.5],
            "year" => [2000i32, 2001]
        )?);

        assert_eq!(table.shape(), (2, 3));
        assert_eq!(table.column_names(), ["station_nm", "water_depth_ft", "year"]);
        assert_eq!(
            table.column_kinds(),
            vec![
                ("station_nm".to_string(), ColumnKind::Text),
                ("water_depth_ft".to_string(), ColumnKind::Float),
                ("year".to_string(), ColumnKind::Integer),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_missing_column_is_reported_by_name() -> Result<(), TableError> {
        let table = WellFrame::new(df!("a" => [1.0])?);
        match table.column_kind("b") {
            Err(TableError::MissingColumn(name)) => assert_eq!(name, "b"),
            other => panic!("expected MissingColumn, got {:?}", other),
        }
        assert!(table.require_columns(&["a", "c"]).is_err());
        Ok(())
    }

    #[test]
    fn test_value_readers() -> Result<(), TableError> {
        let table = WellFrame::new(df!(
            "depth" => [Some(1.25), None],
            "year" => [2000i64, 2023]
        )?);
        assert_eq!(table.float_values("depth")?, vec![Some(1.25), None]);
        assert_eq!(
            table.text_values("year")?,
            vec![Some("2000".to_string()), Some("2023".to_string())]
        );
        Ok(())
    }
}

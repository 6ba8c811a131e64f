//! Semantic column types carried by every [`crate::WellFrame`], and the declared
//! schema used to pin them when a file is loaded.

use crate::types::columns::{
    COL_DATETIME, COL_LATITUDE, COL_LONGITUDE, COL_STATION, COL_WATER_DEPTH,
};
use polars::prelude::{DataType, Field, Schema};
use std::fmt;

/// The semantic type of a table column.
///
/// Every polars dtype a table can hold maps onto one of these. The mapping is lossy on
/// purpose: the pipeline only cares whether a column is text, a float measurement, an
/// integer (years, months), a calendar date, or entirely missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    /// Free text, e.g. station names or unparsed timestamps.
    Text,
    /// IEEE double precision values, e.g. depths and coordinates.
    Float,
    /// Whole numbers, e.g. derived years and months.
    Integer,
    /// Calendar dates (time of day is discarded).
    Date,
    /// A column in which no value is present at all.
    Missing,
}

impl ColumnKind {
    /// Classifies a polars dtype. Anything not listed (booleans, lists, ...) reads as text.
    pub fn from_dtype(dtype: &DataType) -> Self {
        match dtype {
            DataType::Float32 | DataType::Float64 => ColumnKind::Float,
            DataType::Date | DataType::Datetime(_, _) => ColumnKind::Date,
            DataType::Null => ColumnKind::Missing,
            dt if dt.is_integer() => ColumnKind::Integer,
            _ => ColumnKind::Text,
        }
    }

    /// The polars dtype used when a column of this kind is declared up front.
    pub fn dtype(&self) -> DataType {
        match self {
            ColumnKind::Text => DataType::String,
            ColumnKind::Float => DataType::Float64,
            ColumnKind::Integer => DataType::Int64,
            ColumnKind::Date => DataType::Date,
            ColumnKind::Missing => DataType::Null,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnKind::Float | ColumnKind::Integer)
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnKind::Text => "text",
            ColumnKind::Float => "float",
            ColumnKind::Integer => "integer",
            ColumnKind::Date => "date",
            ColumnKind::Missing => "missing",
        };
        write!(f, "{}", name)
    }
}

/// A declared schema: column names and the kind each should be read as.
///
/// Columns not named here are inferred by the loader. Declaring a column as
/// [`ColumnKind::Text`] keeps its raw strings intact, which is how the depth column
/// reaches [`crate::WellFrame::coerce_numeric`] unparsed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableSchema {
    columns: Vec<(String, ColumnKind)>,
}

impl TableSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares (or re-declares) a column.
    pub fn with_column(mut self, name: impl Into<String>, kind: ColumnKind) -> Self {
        let name = name.into();
        match self.columns.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = kind,
            None => self.columns.push((name, kind)),
        }
        self
    }

    pub fn kind_of(&self, name: &str) -> Option<ColumnKind> {
        self.columns
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, kind)| *kind)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Schema of the raw well readings export.
    ///
    /// Coordinates, depth and timestamp stay text so that malformed values survive
    /// loading and are dropped later by coercion instead of failing the whole file.
    pub fn well_readings() -> Self {
        TableSchema::new()
            .with_column(COL_STATION, ColumnKind::Text)
            .with_column(COL_LATITUDE, ColumnKind::Text)
            .with_column(COL_LONGITUDE, ColumnKind::Text)
            .with_column(COL_DATETIME, ColumnKind::Text)
            .with_column(COL_WATER_DEPTH, ColumnKind::Text)
    }

    pub(crate) fn to_polars(&self) -> Schema {
        Schema::from_iter(
            self.columns
                .iter()
                .map(|(name, kind)| Field::new(name.as_str().into(), kind.dtype())),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::TimeUnit;

    #[test]
    fn test_kind_from_dtype() {
        assert_eq!(ColumnKind::from_dtype(&DataType::String), ColumnKind::Text);
        assert_eq!(ColumnKind::from_dtype(&DataType::Float64), ColumnKind::Float);
        assert_eq!(ColumnKind::from_dtype(&DataType::Int32), ColumnKind::Integer);
        assert_eq!(ColumnKind::from_dtype(&DataType::UInt8), ColumnKind::Integer);
        assert_eq!(ColumnKind::from_dtype(&DataType::Date), ColumnKind::Date);
        assert_eq!(
            ColumnKind::from_dtype(&DataType::Datetime(TimeUnit::Milliseconds, None)),
            ColumnKind::Date
        );
        assert_eq!(ColumnKind::from_dtype(&DataType::Null), ColumnKind::Missing);
        assert_eq!(ColumnKind::from_dtype(&DataType::Boolean), ColumnKind::Text);
    }

    #[test]
    fn test_schema_redeclare_replaces_kind() {
        let schema = TableSchema::new()
            .with_column("depth", ColumnKind::Text)
            .with_column("depth", ColumnKind::Float);
        assert_eq!(schema.len(), 1);
        assert_eq!(schema.kind_of("depth"), Some(ColumnKind::Float));
        assert_eq!(schema.kind_of("other"), None);
    }

    #[test]
    fn test_well_readings_schema_keeps_measurements_as_text() {
        let schema = TableSchema::well_readings();
        assert_eq!(schema.len(), 5);
        assert_eq!(schema.kind_of(COL_WATER_DEPTH), Some(ColumnKind::Text));
        assert_eq!(schema.kind_of(COL_LATITUDE), Some(ColumnKind::Text));
        assert_eq!(schema.kind_of(COL_LONGITUDE), Some(ColumnKind::Text));
        assert_eq!(schema.to_polars().len(), 5);
    }
}

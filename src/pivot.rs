//! Long-to-wide reshaping and derived columns.

use crate::table::error::TableError;
use crate::table::well_frame::WellFrame;
use log::debug;
use polars::prelude::{
    col, lit, DataType, Expr, IntoLazy, JoinArgs, JoinType, SortMultipleOptions,
    UniqueKeepStrategy,
};
use std::collections::HashMap;

/// How pivoted columns are named.
///
/// A pivot value is first looked up in the explicit mapping. Values without a mapping
/// are named `prefix + value`; with the default empty prefix that is the literal value.
///
/// # Examples
///
/// ```
/// use wellwater::PivotNaming;
///
/// let literal = PivotNaming::literal();
/// assert_eq!(literal.column_name("2000"), "2000");
///
/// let depths = PivotNaming::prefixed("depth_");
/// assert_eq!(depths.column_name("2023"), "depth_2023");
///
/// let mapped = PivotNaming::literal().rename("2000", "baseline");
/// assert_eq!(mapped.column_name("2000"), "baseline");
/// assert_eq!(mapped.column_name("2023"), "2023");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PivotNaming {
    prefix: String,
    renames: HashMap<String, String>,
}

impl PivotNaming {
    /// Columns are named by the raw pivot value.
    pub fn literal() -> Self {
        Self::default()
    }

    /// Columns are named `prefix` followed by the raw pivot value.
    pub fn prefixed(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            renames: HashMap::new(),
        }
    }

    /// Maps one raw pivot value to an explicit column name.
    pub fn rename(mut self, raw_value: impl Into<String>, column: impl Into<String>) -> Self {
        self.renames.insert(raw_value.into(), column.into());
        self
    }

    pub fn column_name(&self, raw_value: &str) -> String {
        match self.renames.get(raw_value) {
            Some(name) => name.clone(),
            None => format!("{}{}", self.prefix, raw_value),
        }
    }
}

impl WellFrame {
    /// Reshapes long rows into one row per entity with one column per pivot value.
    ///
    /// Output columns are the entity columns, then one column per distinct non-missing
    /// value of `pivot_column` in ascending order, named through `naming`. A cell is
    /// missing when the entity has no row for that pivot value. Rows are sorted by the
    /// entity columns.
    ///
    /// # Errors
    ///
    /// [`TableError::DuplicatePivotEntry`] when two rows share an entity and a pivot
    /// value, since there would be no single value to place in the cell.
    pub fn pivot(
        &self,
        entity_columns: &[&str],
        pivot_column: &str,
        value_column: &str,
        naming: &PivotNaming,
    ) -> Result<WellFrame, TableError> {
        self.require_columns(entity_columns)?;
        self.require_columns(&[pivot_column, value_column])?;

        let entities: Vec<Expr> = entity_columns.iter().map(|name| col(*name)).collect();

        let mut key = entities.clone();
        key.push(col(pivot_column));
        let distinct_keys = self
            .frame
            .clone()
            .lazy()
            .select(key)
            .unique(None, UniqueKeepStrategy::Any)
            .collect()?
            .height();
        if distinct_keys != self.height() {
            return Err(TableError::DuplicatePivotEntry {
                pivot_column: pivot_column.to_string(),
                duplicates: self.height() - distinct_keys,
            });
        }

        let pivot_values = self.distinct_values(pivot_column)?;
        debug!(
            "Pivoting {} rows on '{}' into {} columns",
            self.height(),
            pivot_column,
            pivot_values.len()
        );

        let mut wide = self
            .frame
            .clone()
            .lazy()
            .select(entities.clone())
            .unique(None, UniqueKeepStrategy::Any);

        for raw_value in &pivot_values {
            let mut cells = entities.clone();
            cells.push(col(value_column).alias(naming.column_name(raw_value).as_str()));
            let slice = self
                .frame
                .clone()
                .lazy()
                .filter(col(pivot_column).cast(DataType::String).eq(lit(raw_value.clone())))
                .select(cells);
            wide = wide.join(
                slice,
                entities.clone(),
                entities.clone(),
                JoinArgs::new(JoinType::Left),
            );
        }

        let frame = wide
            .sort_by_exprs(entities, SortMultipleOptions::default())
            .collect()?;
        Ok(WellFrame::new(frame))
    }

    /// Appends `output_column = minuend_column - subtrahend_column`.
    ///
    /// If either operand is missing for a row, the result for that row is missing.
    pub fn derive_difference(
        &self,
        minuend_column: &str,
        subtrahend_column: &str,
        output_column: &str,
    ) -> Result<WellFrame, TableError> {
        self.require_columns(&[minuend_column, subtrahend_column])?;
        self.require_numeric(minuend_column)?;
        self.require_numeric(subtrahend_column)?;
        self.apply(|lf| {
            lf.with_column((col(minuend_column) - col(subtrahend_column)).alias(output_column))
        })
    }

    /// Distinct non-missing values of a column, ascending, in text form.
    pub(crate) fn distinct_values(&self, column: &str) -> Result<Vec<String>, TableError> {
        let distinct = self
            .frame
            .clone()
            .lazy()
            .select([col(column)])
            .filter(col(column).is_not_null())
            .unique(None, UniqueKeepStrategy::Any)
            .sort_by_exprs([col(column)], SortMultipleOptions::default())
            .collect()?;
        let as_text = distinct.column(column)?.cast(&DataType::String)?;
        let values = as_text
            .str()?
            .into_iter()
            .flatten()
            .map(str::to_string)
            .collect();
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::column_kind::ColumnKind;
    use polars::df;

    fn yearly() -> Result<WellFrame, TableError> {
        Ok(WellFrame::new(df!(
            "station_nm" => ["Y", "X", "X"],
            "year" => [2000i64, 2023, 2000],
            "water_depth_ft" => [3.0, 14.0, 10.0]
        )?))
    }

    #[test]
    fn test_pivot_then_difference() -> Result<(), TableError> {
        let naming = PivotNaming::prefixed("depth_");
        let wide = yearly()?.pivot(&["station_nm"], "year", "water_depth_ft", &naming)?;

        assert_eq!(wide.column_names(), ["station_nm", "depth_2000", "depth_2023"]);
        assert_eq!(
            wide.text_values("station_nm")?,
            vec![Some("X".to_string()), Some("Y".to_string())]
        );
        assert_eq!(wide.float_values("depth_2000")?, vec![Some(10.0), Some(3.0)]);
        assert_eq!(wide.float_values("depth_2023")?, vec![Some(14.0), None]);

        let changed = wide.derive_difference("depth_2023", "depth_2000", "depth_change")?;
        assert_eq!(changed.width(), 4);
        assert_eq!(changed.float_values("depth_change")?, vec![Some(4.0), None]);
        Ok(())
    }

    #[test]
    fn test_pivot_literal_and_mapped_names() -> Result<(), TableError> {
        let literal = yearly()?.pivot(&["station_nm"], "year", "water_depth_ft", &PivotNaming::literal())?;
        assert_eq!(literal.column_names(), ["station_nm", "2000", "2023"]);

        let mapped = PivotNaming::literal().rename("2000", "baseline");
        let renamed = yearly()?.pivot(&["station_nm"], "year", "water_depth_ft", &mapped)?;
        assert_eq!(renamed.column_names(), ["station_nm", "baseline", "2023"]);
        Ok(())
    }

    #[test]
    fn test_pivot_rejects_duplicate_cells() -> Result<(), TableError> {
        let table = WellFrame::new(df!(
            "station_nm" => ["X", "X"],
            "year" => [2000i64, 2000],
            "water_depth_ft" => [1.0, 2.0]
        )?);
        assert!(matches!(
            table.pivot(&["station_nm"], "year", "water_depth_ft", &PivotNaming::literal()),
            Err(TableError::DuplicatePivotEntry { duplicates: 1, .. })
        ));
        Ok(())
    }

    #[test]
    fn test_derive_difference_propagates_missing() -> Result<(), TableError> {
        let table = WellFrame::new(df!(
            "a" => [Some(5.0), None, Some(1.0)],
            "b" => [Some(2.0), Some(1.0), None]
        )?);

        let derived = table.derive_difference("a", "b", "a_minus_b")?;

        assert_eq!(derived.column_kind("a_minus_b")?, ColumnKind::Float);
        assert_eq!(derived.float_values("a_minus_b")?, vec![Some(3.0), None, None]);
        Ok(())
    }

    #[test]
    fn test_distinct_values_sort_numerically() -> Result<(), TableError> {
        let table = WellFrame::new(df!("year" => [Some(2023i64), Some(999), None, Some(2023)])?);
        assert_eq!(table.distinct_values("year")?, vec!["999", "2023"]);
        Ok(())
    }
}

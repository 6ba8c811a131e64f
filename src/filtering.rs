//! Row filters and column cleaners for [`WellFrame`].
//!
//! Each method borrows the table and returns a new one. Failures to parse a value
//! (numbers, dates) never surface as errors: the value becomes missing and a later
//! [`WellFrame::drop_missing`] removes the row.

use crate::table::error::TableError;
use crate::table::well_frame::WellFrame;
use crate::types::column_kind::ColumnKind;
use crate::types::columns::{COL_MONTH, COL_YEAR};
use polars::prelude::{col, lit, DataType, Expr, StrptimeOptions, UniqueKeepStrategy};

/// Leading date portion of a timestamp such as `2023-05-01` or `2023-05-01 12:30`.
const TIMESTAMP_DATE_FORMAT: &str = "%Y-%m-%d";

impl WellFrame {
    /// Keeps only rows in which every listed column holds a value.
    ///
    /// Row order is preserved. A `NaN` in a float column counts as missing.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::MissingColumn`] if a listed column does not exist.
    pub fn drop_missing(&self, required_columns: &[&str]) -> Result<WellFrame, TableError> {
        self.require_columns(required_columns)?;

        let mut conditions = Vec::with_capacity(required_columns.len());
        for name in required_columns {
            let mut present = col(*name).is_not_null();
            if self.column_kind(name)? == ColumnKind::Float {
                present = present.and(col(*name).is_not_nan());
            }
            conditions.push(present);
        }

        match conditions.into_iter().reduce(|all, next| all.and(next)) {
            Some(predicate) => self.apply(|lf| lf.filter(predicate)),
            None => Ok(self.clone()),
        }
    }

    /// Parses a column as floating point numbers.
    ///
    /// Values that do not parse become missing. Pair this with [`WellFrame::drop_missing`]
    /// on the same column to discard them.
    pub fn coerce_numeric(&self, column: &str) -> Result<WellFrame, TableError> {
        self.require_columns(&[column])?;
        self.apply(|lf| lf.with_column(col(column).cast(DataType::Float64)))
    }

    /// Keeps rows whose timestamp falls in a year strictly between the two bounds.
    ///
    /// Timestamps that cannot be read as a date are treated as missing and excluded.
    ///
    /// # Arguments
    ///
    /// * `timestamp_column` - text, date or datetime column.
    /// * `min_year_exclusive` - rows from this year or earlier are dropped.
    /// * `max_year_exclusive` - rows from this year or later are dropped.
    pub fn filter_year_range(
        &self,
        timestamp_column: &str,
        min_year_exclusive: i32,
        max_year_exclusive: i32,
    ) -> Result<WellFrame, TableError> {
        let year = self.date_expr(timestamp_column)?.dt().year();
        self.apply(|lf| {
            lf.filter(
                year.clone()
                    .gt(lit(min_year_exclusive))
                    .and(year.lt(lit(max_year_exclusive))),
            )
        })
    }

    /// Replaces the timestamp column with a parsed date and appends `year` and `month`.
    ///
    /// Unparseable timestamps leave all three values missing.
    pub fn with_calendar_fields(&self, timestamp_column: &str) -> Result<WellFrame, TableError> {
        let date = self.date_expr(timestamp_column)?;
        self.apply(|lf| {
            lf.with_columns([
                date.clone().alias(timestamp_column),
                date.clone().dt().year().alias(COL_YEAR),
                date.dt().month().cast(DataType::Int32).alias(COL_MONTH),
            ])
        })
    }

    /// Keeps rows whose value in `column` matches one of `values`.
    ///
    /// Values are compared by their text form, so `2000` matches an integer year column
    /// as well as a text one.
    pub fn filter_in<V: ToString>(
        &self,
        column: &str,
        values: &[V],
    ) -> Result<WellFrame, TableError> {
        self.require_columns(&[column])?;
        let predicate = values
            .iter()
            .map(|value| {
                col(column)
                    .cast(DataType::String)
                    .eq(lit(value.to_string()))
            })
            .reduce(|any, next| any.or(next))
            .unwrap_or_else(|| lit(false));
        self.apply(|lf| lf.filter(predicate))
    }

    /// Keeps the first row of every distinct combination of `subset` values.
    pub fn drop_duplicates(&self, subset: &[&str]) -> Result<WellFrame, TableError> {
        self.require_columns(subset)?;
        let subset = subset.iter().map(|name| (*name).into()).collect();
        self.apply(|lf| lf.unique_stable(Some(subset), UniqueKeepStrategy::First))
    }

    /// Projects the table onto `columns`, in the given order.
    pub fn select(&self, columns: &[&str]) -> Result<WellFrame, TableError> {
        self.require_columns(columns)?;
        let exprs: Vec<Expr> = columns.iter().map(|name| col(*name)).collect();
        self.apply(|lf| lf.select(exprs))
    }

    /// An expression evaluating `column` as a calendar date.
    pub(crate) fn date_expr(&self, column: &str) -> Result<Expr, TableError> {
        let expr = match self.column_kind(column)? {
            ColumnKind::Date => match self.frame.column(column)?.dtype() {
                DataType::Date => col(column),
                _ => col(column).dt().date(),
            },
            _ => col(column)
                .cast(DataType::String)
                .str()
                .to_date(StrptimeOptions {
                    format: Some(TIMESTAMP_DATE_FORMAT.into()),
                    strict: false,
                    exact: false,
                    cache: true,
                }),
        };
        Ok(expr)
    }
}

use crate::table::error::TableError;
use crate::table::well_frame::WellFrame;
use polars::prelude::{col, Expr, SortMultipleOptions};

impl WellFrame {
    /// Averages `value_column` within every group of identical `group_columns` values.
    ///
    /// The result has one row per distinct key: the group columns in the order given,
    /// then the mean, which keeps the name of `value_column`. Rows are sorted by the
    /// key, so the output does not depend on the order of the input rows. Keys are
    /// compared by exact value, coordinates included.
    ///
    /// With no group columns the whole table forms a single group.
    ///
    /// # Errors
    ///
    /// [`TableError::MissingColumn`] for unknown columns and
    /// [`TableError::NonNumericColumn`] if `value_column` does not hold numbers.
    pub fn group_mean(
        &self,
        group_columns: &[&str],
        value_column: &str,
    ) -> Result<WellFrame, TableError> {
        self.require_columns(group_columns)?;
        self.require_columns(&[value_column])?;
        self.require_numeric(value_column)?;

        if group_columns.is_empty() {
            return self.apply(|lf| lf.select([col(value_column).mean()]));
        }

        let keys: Vec<Expr> = group_columns.iter().map(|name| col(*name)).collect();
        self.apply(|lf| {
            lf.group_by(keys.clone())
                .agg([col(value_column).mean()])
                .sort_by_exprs(keys, SortMultipleOptions::default())
        })
    }
}

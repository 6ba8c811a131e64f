pub mod column_kind;
pub mod columns;

#[cfg(feature = "charts")]
pub mod chart;
pub mod csv;
pub mod map;

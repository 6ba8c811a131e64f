//! Column names shared by the well readings and every table derived from them.

// Raw readings
pub const COL_STATION: &str = "station_nm";
pub const COL_LATITUDE: &str = "dec_lat_va"; // Decimal latitude
pub const COL_LONGITUDE: &str = "dec_long_va"; // Decimal longitude
pub const COL_DATETIME: &str = "datetime";
pub const COL_WATER_DEPTH: &str = "water_depth_ft"; // Depth to water, feet

// Derived calendar fields
pub const COL_YEAR: &str = "year";
pub const COL_MONTH: &str = "month";

// Depth change table
pub const COL_DEPTH_CHANGE: &str = "depth_change";
pub const DEPTH_COLUMN_PREFIX: &str = "depth_";

// Geocoded region
pub const COL_STATE: &str = "state";

/// Every column a reading needs before it can take part in an aggregate.
pub const READING_COLUMNS: [&str; 5] = [
    COL_LATITUDE,
    COL_LONGITUDE,
    COL_STATION,
    COL_DATETIME,
    COL_WATER_DEPTH,
];

/// Columns identifying a physical well.
pub const WELL_KEY_COLUMNS: [&str; 3] = [COL_STATION, COL_LATITUDE, COL_LONGITUDE];

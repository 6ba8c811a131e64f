pub mod error;
pub mod loader;
pub mod well_frame;

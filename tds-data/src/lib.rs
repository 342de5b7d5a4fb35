//! Loading of alternate rule tables from CSV files.

mod loader;

pub use loader::{SlabScheduleLoader, SlabScheduleLoaderError, SlabScheduleRecord};

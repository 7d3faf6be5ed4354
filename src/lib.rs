pub mod cli;
pub mod gpx;
pub mod model;
pub mod schema;
pub mod store;

pub use gpx::{export_gpx, import_gpx, import_gpx_file, ExportOptions, ImportOptions};
pub use store::GeocacheDb;

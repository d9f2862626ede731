pub mod loader;
pub mod period;
pub mod records;
pub mod writer;

pub use loader::{load_dataset, DatasetPaths};
pub use records::*;
pub use writer::write_dataset;

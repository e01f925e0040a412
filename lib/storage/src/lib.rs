pub mod artifact;
pub mod csv_table;
pub mod loader;

pub use artifact::{ArtifactMetadata, LoadedModel, ModelArtifact, FORMAT_VERSION};
pub use csv_table::{CsvOptions, CsvTable};
pub use loader::{train_from_csv, DataPaths, Loader};

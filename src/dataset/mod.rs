//! Historical student dataset: the named-field schema and its CSV loader.

pub mod loader;
pub mod schema;

pub use loader::{DEFAULT_DATASET_FILE, Dataset, DatasetFingerprint, DatasetLoadError, load_dataset};
pub use schema::{FEATURE_COUNT, Feature, Outcome, StudentFeatures, StudentRecord};

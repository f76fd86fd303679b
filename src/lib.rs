//! Library exports for reuse in binaries, benchmarks and tests.
/// Resolution of the `.gradecast` application directory.
pub mod app_dirs;
/// Application settings stored as TOML.
pub mod config;
/// Student CSV schema and loader.
pub mod dataset;
/// Shared egui UI modules.
pub mod egui_app;
/// Form state and query vector assembly.
pub mod form;
/// Tracing setup with rotating log files.
pub mod logging;
/// Decision trees, random forests and evaluation metrics.
pub mod ml;
/// Trained model pair and the prediction service.
pub mod model;

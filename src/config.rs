//! Application settings stored as TOML in the `.gradecast` directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::app_dirs;
use crate::dataset::DEFAULT_DATASET_FILE;
use crate::model::TrainOptions;

/// Default filename used to store the app configuration.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Environment variable that overrides the configured dataset path.
pub const DATASET_ENV: &str = "GRADECAST_DATASET";

/// Errors that may occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No usable config directory found.
    #[error("No suitable config directory found")]
    NoConfigDir,
    /// Failed to create the config directory.
    #[error("Unable to create config directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to read a config file.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to parse TOML config.
    #[error("Invalid config at {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Training CSV; relative paths resolve against the working directory.
    pub dataset_path: PathBuf,
    pub training: TrainOptions,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from(DEFAULT_DATASET_FILE),
            training: TrainOptions::default(),
        }
    }
}

/// Resolve the configuration file path, ensuring the parent directory exists.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let dir = app_dirs::app_root_dir().map_err(map_app_dir_error)?;
    Ok(dir.join(CONFIG_FILE_NAME))
}

/// Load settings from the app directory, falling back to defaults when the
/// file is missing, then apply the `GRADECAST_DATASET` override.
pub fn load_or_default() -> Result<AppConfig, ConfigError> {
    let path = config_path()?;
    let mut config = load_from(&path)?;
    if let Some(dataset) = std::env::var_os(DATASET_ENV) {
        config.dataset_path = PathBuf::from(dataset);
    }
    Ok(config)
}

/// Load settings from `path`; a missing file yields defaults.
pub fn load_from(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: AppConfig = toml::from_str(&text).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Loaded settings from {}", path.display());
    Ok(config)
}

fn map_app_dir_error(error: app_dirs::AppDirError) -> ConfigError {
    match error {
        app_dirs::AppDirError::NoBaseDir => ConfigError::NoConfigDir,
        app_dirs::AppDirError::CreateDir { path, source } => ConfigError::CreateDir { path, source },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = load_from(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.dataset_path, PathBuf::from("student_data.csv"));
        assert_eq!(config.training.n_trees, 250);
        assert_eq!(config.training.seed, 42);
        assert_eq!(config.training.test_fraction, 0.2);
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            "dataset_path = \"data/students.csv\"\n\n[training]\nn_trees = 50\nmax_depth = 12\n",
        )
        .unwrap();
        let config = load_from(&path).unwrap();
        assert_eq!(config.dataset_path, PathBuf::from("data/students.csv"));
        assert_eq!(config.training.n_trees, 50);
        assert_eq!(config.training.max_depth, Some(12));
        assert_eq!(config.training.seed, 42);
        assert_eq!(config.training.min_samples_split, 2);
    }

    #[test]
    fn invalid_toml_is_reported_with_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[training\nseed = ").unwrap();
        match load_from(&path) {
            Err(ConfigError::ParseToml { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected ParseToml, got {other:?}"),
        }
    }

    #[test]
    fn config_path_lives_in_app_root() {
        let base = tempdir().unwrap();
        let _guard = app_dirs::OverrideGuard::set(base.path().to_path_buf());
        let path = config_path().unwrap();
        assert_eq!(
            path,
            base.path().join(app_dirs::APP_DIR_NAME).join(CONFIG_FILE_NAME)
        );
    }
}

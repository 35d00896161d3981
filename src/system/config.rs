// src/system/config.rs

use crate::{
    constants::{CONFIG_DIR_NAME, CONFIG_FILENAME, DEFAULT_COLUMNS},
    models::ShellConfig,
};
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("Failed to expand model path '{0}': {1}")]
    Expansion(String, String),
}

/// Returns `<config_dir>/modelsh/config.toml`, if the platform has a config directory.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILENAME))
}

/// Loads the shell configuration.
///
/// An explicit `path` must exist. Without one, the default location is tried and a missing
/// file there simply means the default configuration.
pub fn load_config(path: Option<&Path>) -> Result<ShellConfig, ConfigError> {
    let (path, required) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => match default_config_path() {
            Some(path) => (path, false),
            None => return Ok(ShellConfig::default()),
        },
    };

    if !required && !path.exists() {
        log::debug!("No config file at '{}', using defaults.", path.display());
        return Ok(ShellConfig::default());
    }

    let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

impl ShellConfig {
    /// Output width for column formatting.
    pub fn columns_or_default(&self) -> usize {
        self.columns.filter(|c| *c > 0).unwrap_or(DEFAULT_COLUMNS)
    }

    /// The model path with `~` and environment variables expanded.
    pub fn expanded_model_path(&self) -> Result<Option<PathBuf>, ConfigError> {
        let Some(template) = &self.model else {
            return Ok(None);
        };
        let expanded = shellexpand::full(template)
            .map_err(|e| ConfigError::Expansion(template.clone(), e.to_string()))?;
        Ok(Some(PathBuf::from(expanded.into_owned())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_explicit_config() {
        let file = write_config("model = \"/srv/model.json\"\ncolumns = 120\n");
        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.model.as_deref(), Some("/srv/model.json"));
        assert_eq!(config.columns_or_default(), 120);
        assert_eq!(
            config.expanded_model_path().unwrap(),
            Some(PathBuf::from("/srv/model.json"))
        );
    }

    #[test]
    fn test_missing_explicit_config_fails() {
        let result = load_config(Some(Path::new("does-not-exist.toml")));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_malformed_config_fails() {
        let file = write_config("columns = \"wide\"\n");
        let result = load_config(Some(file.path()));
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_defaults() {
        let config = ShellConfig::default();
        assert_eq!(config.columns_or_default(), DEFAULT_COLUMNS);
        assert_eq!(config.expanded_model_path().unwrap(), None);

        let zero = ShellConfig {
            columns: Some(0),
            ..ShellConfig::default()
        };
        assert_eq!(zero.columns_or_default(), DEFAULT_COLUMNS);
    }
}

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Hex color overrides, e.g. `accent = "#FFC107"`
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ThemeOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_dim: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bg_selected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inactive: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub danger: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PickerConfig {
    /// Dialog title
    pub title: String,

    /// Up/Down wrap around the ends of the list
    pub wrap_navigation: bool,

    /// Show "matches/total" next to the list title
    pub show_counts: bool,

    pub theme: ThemeOverrides,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            title: "Pick Entity".to_string(),
            wrap_navigation: true,
            show_counts: true,
            theme: ThemeOverrides::default(),
        }
    }
}

impl PickerConfig {
    /// Default config file path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("entity-picker").join("config.toml"))
    }

    /// Load from `path` (or the default location). A missing file gives
    /// defaults; an unreadable or malformed one is logged and also gives defaults.
    pub fn load(path: Option<&Path>) -> Self {
        let path = match path.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(p) => p,
            None => return Self::default(),
        };

        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Self::default();
        }

        match Self::read(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring config: {}", e);
                Self::default()
            }
        }
    }

    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serialization() {
        let config = PickerConfig {
            title: "Pick Spawn Point".to_string(),
            wrap_navigation: false,
            show_counts: true,
            theme: ThemeOverrides {
                accent: Some("#FFC107".to_string()),
                ..Default::default()
            },
        };

        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: PickerConfig = toml::from_str(&serialized).unwrap();

        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: PickerConfig = toml::from_str("wrap_navigation = false\n[theme]\ntext = \"#bebebe\"\n").unwrap();
        assert_eq!(config.title, "Pick Entity");
        assert!(!config.wrap_navigation);
        assert!(config.show_counts);
        assert_eq!(config.theme.text.as_deref(), Some("#bebebe"));
    }

    #[test]
    fn test_malformed_config_falls_back() {
        assert!(toml::from_str::<PickerConfig>("title = 3").is_err());

        let config = PickerConfig::load(Some(Path::new("/nonexistent/entity-picker.toml")));
        assert_eq!(config, PickerConfig::default());
    }
}

//! Configuration management for the content store
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (medatlas.toml)
//! - Environment variables (MEDATLAS__*)
//!
//! ## Example config file (medatlas.toml):
//! ```toml
//! [sources]
//! include_bundled = true
//! directories = ["./content-extra"]
//! skip_prefixes = ["drafts/"]
//!
//! [validation]
//! strict_references = true
//!
//! [output]
//! format = "compact"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::catalog::LoadConfig;

/// Main configuration for the content store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Where content modules come from
    #[serde(default)]
    pub sources: SourcesConfig,

    #[serde(default)]
    pub validation: ValidationConfig,

    /// CLI output settings
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Load the corpus compiled into the binary
    #[serde(default = "default_true")]
    pub include_bundled: bool,

    /// Directories of JSON modules, loaded after the bundled corpus
    #[serde(default)]
    pub directories: Vec<PathBuf>,

    #[serde(default)]
    pub skip_prefixes: Vec<String>,

    #[serde(default)]
    pub include_prefixes: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Refuse to open a store with dangling cross-references
    #[serde(default)]
    pub strict_references: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

fn default_true() -> bool {
    true
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            include_bundled: true,
            directories: Vec::new(),
            skip_prefixes: Vec::new(),
            include_prefixes: Vec::new(),
        }
    }
}

impl SourcesConfig {
    pub fn load_config(&self) -> LoadConfig {
        LoadConfig {
            skip_prefixes: self.skip_prefixes.clone(),
            include_prefixes: self.include_prefixes.clone(),
        }
    }
}

impl StoreConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, layering `config_path` over the default locations
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = ["medatlas.toml", ".medatlas.toml", "config/medatlas.toml"];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // XDG config directory
        if let Some(dirs) = directories::ProjectDirs::from("org", "medatlas", "medatlas") {
            let xdg_config = dirs.config_dir().join("medatlas.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        // MEDATLAS__VALIDATION__STRICT_REFERENCES=true
        builder = builder.add_source(
            Environment::with_prefix("MEDATLAS")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert!(config.sources.include_bundled);
        assert!(config.sources.directories.is_empty());
        assert!(!config.validation.strict_references);
        assert_eq!(config.output.format, OutputFormat::Pretty);
    }

    #[test]
    fn test_serialize_config() {
        let config = StoreConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[sources]"));
        assert!(toml_str.contains("[validation]"));
        assert!(toml_str.contains("[output]"));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "[sources]\ninclude_bundled = false\ndirectories = [\"extra\"]\n\n[validation]\nstrict_references = true\n",
        )
        .unwrap();

        let config = StoreConfig::load_from(Some(&path)).unwrap();
        assert!(!config.sources.include_bundled);
        assert_eq!(config.sources.directories, vec![PathBuf::from("extra")]);
        assert!(config.validation.strict_references);
    }

    #[test]
    fn test_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved.toml");
        let mut config = StoreConfig::default();
        config.output.format = OutputFormat::Compact;
        config.save(&path).unwrap();

        let loaded = StoreConfig::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.output.format, OutputFormat::Compact);
    }
}

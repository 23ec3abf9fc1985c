//! Configuration management for the record registry
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (registry.toml)
//! - Environment variables (RECORD_REGISTRY__*)
//!
//! ## Example config file (registry.toml):
//! ```toml
//! [registry]
//! policy = "strict"
//! builtins = true
//! definitions = ["types/points.toml", "types/mesh.json"]
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::registry::RegistrationPolicy;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Registry settings
    #[serde(default)]
    pub registry: RegistrySection,
}

/// `[registry]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrySection {
    /// Re-registration policy
    #[serde(default)]
    pub policy: RegistrationPolicy,

    /// Register the built-in record types
    #[serde(default = "default_true")]
    pub builtins: bool,

    /// Definition files loaded at startup, in order
    #[serde(default)]
    pub definitions: Vec<PathBuf>,
}

fn default_true() -> bool {
    true
}

impl Default for RegistrySection {
    fn default() -> Self {
        Self {
            policy: RegistrationPolicy::default(),
            builtins: true,
            definitions: Vec::new(),
        }
    }
}

impl RegistryConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, adding a specific file on top of the defaults
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = ["registry.toml", ".registry.toml", "config/registry.toml"];
        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "familiar", "record-registry") {
            let xdg_config = config_dir.config_dir().join("registry.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("RECORD_REGISTRY")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}

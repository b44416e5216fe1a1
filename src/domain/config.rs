use std::{path::Path, sync::Arc};

use serde::{Deserialize, Serialize};

use super::{
    canon::Canon,
    versification::{Versification, VersificationType},
};
use crate::storage::registry::{Registry, RegistryError};

/// Library settings read from a TOML file.
///
/// ```toml
/// _version = "1"
/// deuterocanon = false
/// default_versification = "English"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// Whether the compact reference type addresses the deuterocanon.
    pub deuterocanon: bool,

    /// The name of the versification used when a reference names none.
    default_versification: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            deuterocanon: false,
            default_versification: default_versification(),
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        let config: Self =
            toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))?;
        tracing::debug!(path = %path.display(), ?config, "Loaded config");
        Ok(config)
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// The canon for compact references.
    #[must_use]
    pub const fn canon(&self) -> Canon {
        Canon::new(self.deuterocanon)
    }

    /// The name of the default versification.
    #[must_use]
    pub fn default_versification_name(&self) -> &str {
        &self.default_versification
    }

    /// Sets the name of the default versification.
    pub fn set_default_versification(&mut self, name: impl Into<String>) {
        self.default_versification = name.into();
    }

    /// The default versification, fetched from the global registry.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty or its scheme cannot be loaded.
    pub fn default_versification(&self) -> Result<Arc<Versification>, RegistryError> {
        Registry::global().get_by_name(&self.default_versification)
    }
}

fn default_versification() -> String {
    VersificationType::English.name().to_string()
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default)]
        deuterocanon: bool,

        #[serde(default = "default_versification")]
        default_versification: String,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                deuterocanon,
                default_versification,
            } => Self {
                deuterocanon,
                default_versification,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            deuterocanon: config.deuterocanon,
            default_versification: config.default_versification,
        }
    }
}

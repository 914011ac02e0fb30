use std::path::Path;

use serde::{Deserialize, Serialize};

/// Configuration for a data directory.
///
/// These settings only provide defaults for the command line; the store
/// itself does not depend on them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// Commander name used for new requests when none is given.
    default_commander: Option<String>,

    /// Base name used for new requests when none is given.
    default_base: Option<String>,
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
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
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

    /// The configured default commander, if any.
    #[must_use]
    pub fn default_commander(&self) -> Option<&str> {
        non_blank(self.default_commander.as_deref())
    }

    /// The configured default base, if any.
    #[must_use]
    pub fn default_base(&self) -> Option<&str> {
        non_blank(self.default_base.as_deref())
    }

    /// Sets the default commander. `None` clears it.
    pub fn set_default_commander(&mut self, commander: Option<String>) {
        self.default_commander = commander;
    }

    /// Sets the default base. `None` clears it.
    pub fn set_default_base(&mut self, base: Option<String>) {
        self.default_base = base;
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default_commander: Option<String>,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        default_base: Option<String>,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                default_commander,
                default_base,
            } => Self {
                default_commander,
                default_base,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            default_commander: config.default_commander,
            default_base: config.default_base,
        }
    }
}

//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use sp_core::AssemblyPolicy;

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,

    /// Refuse to save a session while any component has no drills.
    #[serde(default = "default_require_drills")]
    pub require_drills: bool,

    /// Extra session components, merged over the built-in catalog.
    #[serde(default)]
    pub components: Vec<ComponentConfig>,
}

/// A user-defined component declared in the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentConfig {
    pub id: String,
    pub name: String,
    pub weight: f64,
}

const fn default_require_drills() -> bool {
    true
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_path", &self.database_path)
            .field("require_drills", &self.require_drills)
            .field("components", &self.components.len())
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("sp.db"),
            require_drills: default_require_drills(),
            components: Vec::new(),
        }
    }
}

impl Config {
    /// Loads configuration from default locations.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(None)
    }

    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (SP_*)
        figment = figment.merge(Env::prefixed("SP_"));

        figment.extract()
    }

    /// Assembly rules derived from this configuration.
    pub const fn assembly_policy(&self) -> AssemblyPolicy {
        AssemblyPolicy {
            require_drills: self.require_drills,
        }
    }
}

/// Returns the platform-specific config directory for sp.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("sp"))
}

/// Returns the platform-specific data directory for sp.
///
/// On Linux: `~/.local/share/sp`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("sp"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirs_data_path_ends_with_sp() {
        let path = dirs_data_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "sp");
    }

    #[test]
    fn test_default_config_uses_data_dir_for_db() {
        let config = Config::default();
        let data_dir = dirs_data_path().unwrap();
        assert_eq!(config.database_path, data_dir.join("sp.db"));
        assert!(config.require_drills);
        assert!(config.components.is_empty());
    }

    #[test]
    fn test_load_from_file_with_components() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
database_path = "/tmp/custom.db"
require_drills = false

[[components]]
id = "rondos"
name = "Rondos"
weight = 0.2
"#,
        )
        .unwrap();

        let config = Config::load_from(Some(&path)).unwrap();

        assert_eq!(config.database_path, PathBuf::from("/tmp/custom.db"));
        assert!(!config.assembly_policy().require_drills);
        assert_eq!(
            config.components,
            vec![ComponentConfig {
                id: "rondos".to_string(),
                name: "Rondos".to_string(),
                weight: 0.2,
            }]
        );
    }
}

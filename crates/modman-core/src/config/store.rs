//! Config store for loading and saving modman.toml.

use std::path::{Path, PathBuf};

use anyhow::Context;

use super::{ModmanConfig, parser};

const CONFIG_FILE: &str = "modman.toml";

#[derive(Debug, Clone)]
pub struct ConfigStore {
    config_path: PathBuf,
}

impl ConfigStore {
    pub fn from_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// `<config_dir>/modman/modman.toml`
    pub fn default_path() -> anyhow::Result<PathBuf> {
        Ok(dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
            .join("modman")
            .join(CONFIG_FILE))
    }

    pub fn from_default_path() -> anyhow::Result<Self> {
        Ok(Self::from_path(Self::default_path()?))
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Load the config, falling back to defaults when the file is missing.
    pub fn load(&self) -> anyhow::Result<ModmanConfig> {
        if !self.config_path.exists() {
            return Ok(ModmanConfig::new());
        }
        parser::parse_modman_toml(&self.config_path)
    }

    pub fn save(&self, config: &ModmanConfig) -> anyhow::Result<()> {
        let content = parser::to_toml(config).context("Failed to serialize config to TOML")?;
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        std::fs::write(&self.config_path, content).with_context(|| {
            format!(
                "Failed to write config file: {}",
                self.config_path.display()
            )
        })?;
        Ok(())
    }
}

//! Layered configuration loading

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;

pub use crate::domain::error::ConfigError;
use crate::domain::models::Config;

/// Project config file, created by hand
pub const CONFIG_FILE: &str = "rotolog.yaml";
/// Optional local overrides, usually not committed
pub const LOCAL_CONFIG_FILE: &str = "rotolog.local.yaml";
/// Prefix of environment overrides; `__` separates nested keys
pub const ENV_PREFIX: &str = "ROTOLOG_";

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. rotolog.yaml
    /// 3. rotolog.local.yaml (optional)
    /// 4. Environment variables (`ROTOLOG_*`, e.g. `ROTOLOG_LOGGER__LEVEL=debug`)
    pub fn load() -> Result<Config> {
        let config: Config = Self::figment(Yaml::file(CONFIG_FILE))
            .merge(Yaml::file(LOCAL_CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, still honoring env overrides
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        let config: Config = Self::figment(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        config.validate()
    }

    fn figment(file: figment::providers::Data<Yaml>) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(file)
    }
}

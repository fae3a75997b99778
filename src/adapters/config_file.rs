//! JSON file configuration adapter.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use log::{info, warn};

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::SystemConfig;

/// Environment variable naming the config file when no path is passed.
pub const CONFIG_ENV: &str = "SPRINKLER_CONFIG";

/// Loads [`SystemConfig`] from a JSON file.  Fields missing from the file
/// keep their defaults.
pub struct JsonConfigFile {
    path: PathBuf,
}

impl JsonConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path from the first CLI argument, else from [`CONFIG_ENV`].
    pub fn from_args_or_env(mut args: impl Iterator<Item = String>) -> Option<Self> {
        args.next()
            .or_else(|| std::env::var(CONFIG_ENV).ok())
            .filter(|p| !p.is_empty())
            .map(Self::new)
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl ConfigPort for JsonConfigFile {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        let text = fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ConfigError::NotFound,
            kind => ConfigError::IoError(kind),
        })?;
        let config: SystemConfig = serde_json::from_str(&text).map_err(|e| {
            warn!("{}: {}", self.path.display(), e);
            ConfigError::Corrupted
        })?;
        config.validate()?;
        info!("Config loaded from {}", self.path.display());
        Ok(config)
    }
}

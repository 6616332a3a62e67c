use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants;
use crate::error::{GuildOverlapError, Result};

/// Runtime settings. Every field has a default, so the settings file is optional.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Where the consolidated store is rebuilt each run
    pub central_db: PathBuf,
    /// File name suffix that marks a source export
    pub source_suffix: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            central_db: PathBuf::from(constants::CENTRAL_DB_PATH),
            source_suffix: constants::SOURCE_SUFFIX.to_string(),
        }
    }
}

impl Settings {
    /// Load `guild_overlap.toml` from `dir`, falling back to defaults when it is absent.
    pub fn load_from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let config_path = dir.as_ref().join(constants::CONFIG_FILE);
        if !config_path.exists() {
            debug!("No {} found, using defaults", constants::CONFIG_FILE);
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(&config_path).map_err(|e| {
            GuildOverlapError::Config(format!(
                "Failed to read config file '{}': {}",
                config_path.display(),
                e
            ))
        })?;

        let settings: Settings = toml::from_str(&config_content)?;
        settings.validate()?;
        debug!(?settings, "Loaded settings from {}", config_path.display());
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.source_suffix.is_empty() {
            return Err(GuildOverlapError::Config(
                "source_suffix must not be empty".to_string(),
            ));
        }
        if self.central_db.as_os_str().is_empty() {
            return Err(GuildOverlapError::Config(
                "central_db must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// The consolidated store path, resolved against the working directory `root`
    pub fn central_db_in(&self, root: &Path) -> PathBuf {
        if self.central_db.is_absolute() {
            self.central_db.clone()
        } else {
            root.join(&self.central_db)
        }
    }
}

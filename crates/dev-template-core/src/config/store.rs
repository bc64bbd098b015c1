//! On-disk location and persistence of `config.yaml`

use super::ResolvedConfig;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.yaml";
const APP_DIR: &str = "dev_template";

/// Resolve the configuration directory.
///
/// `override_env` names an environment variable that, when set, wins over the
/// platform default (`%LOCALAPPDATA%\dev_template` or `~/.config/dev_template`).
pub fn config_dir(override_env: &str) -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(override_env).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }

    let base = if cfg!(windows) {
        dirs::data_local_dir()
    } else {
        dirs::home_dir().map(|home| home.join(".config"))
    };

    base.map(|b| b.join(APP_DIR)).ok_or_else(|| Error::Config {
        path: PathBuf::from(APP_DIR),
        message: "could not determine home directory".to_string(),
    })
}

/// Handle on the configuration directory and the files kept in it
#[derive(Debug, Clone)]
pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE)
    }

    /// User-editable copy of the built-in templates
    pub fn templates_dir(&self) -> PathBuf {
        self.dir.join("templates")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.dir.join("logs")
    }

    /// Load the configuration, writing a default file first if none exists
    pub fn load(&self) -> Result<ResolvedConfig> {
        let path = self.config_path();
        if !path.exists() {
            let config = ResolvedConfig::default();
            self.save(&config)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(&path).map_err(|e| self.error(e))?;
        serde_yaml::from_str(&content).map_err(|e| self.error(e))
    }

    pub fn save(&self, config: &ResolvedConfig) -> Result<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| self.error(e))?;
        let content = serde_yaml::to_string(config).map_err(|e| self.error(e))?;
        std::fs::write(self.config_path(), content).map_err(|e| self.error(e))?;
        tracing::debug!(path = %self.config_path().display(), "configuration saved");
        Ok(())
    }

    fn error(&self, err: impl std::fmt::Display) -> Error {
        Error::Config {
            path: self.config_path(),
            message: err.to_string(),
        }
    }
}

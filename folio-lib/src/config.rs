use std::{fs, io, path::PathBuf, sync::Arc};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::fs::{config_dir, data_dir, state_dir};

const FILE_NAME: &str = "core.toml";

/// Handle to the core configuration
pub type Cfg = Arc<RwLock<CoreConfig>>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to access the configuration file: {0}")]
    Io(#[from] io::Error),
    #[error("Malformed configuration file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// The core configuration, serialized to TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Database file holding every saved portfolio
    pub storage_path: Option<PathBuf>,
    /// Directory exported PDFs are written to
    pub export_dir: Option<PathBuf>,
    pub log_level: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            storage_path: None,
            export_dir: None,
            log_level: "info".to_string(),
        }
    }
}

impl CoreConfig {
    /// Load the configuration from disk, writing the defaults if no file exists yet.
    pub fn load() -> Result<Self, Error> {
        let path = config_dir()?.join(FILE_NAME);

        if path.exists() {
            let contents = fs::read_to_string(&path)?;
            Ok(toml::from_str(&contents)?)
        } else {
            let cfg = Self::default();
            cfg.save()?;
            debug!("Wrote default configuration to {}", path.display());
            Ok(cfg)
        }
    }

    pub fn save(&self) -> Result<(), Error> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(config_dir()?.join(FILE_NAME), contents)?;

        Ok(())
    }

    pub fn storage_path(&self) -> Result<PathBuf, Error> {
        match &self.storage_path {
            Some(path) => Ok(path.clone()),
            None => Ok(state_dir()?.join("data.db")),
        }
    }

    pub fn export_dir(&self) -> Result<PathBuf, Error> {
        let dir = match &self.export_dir {
            Some(path) => path.clone(),
            None => data_dir()?.join("exports"),
        };
        fs::create_dir_all(&dir)?;

        Ok(dir)
    }

    /// Configuration that never touches the user's XDG directories
    pub fn mock(root: &std::path::Path) -> Self {
        Self {
            storage_path: Some(root.join("data.db")),
            export_dir: Some(root.join("exports")),
            log_level: "debug".to_string(),
        }
    }
}

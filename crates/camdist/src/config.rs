//! Persisted settings (`camdist.toml`).
//!
//! Every field is optional on disk; missing values are filled in by the
//! caller (prompting, discovery, fetching) and written back.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::anchor::DEFAULT_BASELINE;
use crate::error::Result;

/// Default config file name, relative to the working directory.
pub const CONFIG_FILE: &str = "camdist.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub camera: CameraConfig,
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Value written into the field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f32>,
    /// Value the shipped binary holds, used to place the wildcard.
    pub baseline: f32,
    /// Anchor hex string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hex_string: Option<String>,
    /// Refresh `hex_string` from the published copy on every run.
    pub fetch_anchor: bool,
    /// Treat short or baseline-first anchors as errors.
    pub strict_anchor: bool,
    pub autostart_game: bool,
    pub logging_level: String,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            distance: None,
            baseline: DEFAULT_BASELINE,
            hex_string: None,
            fetch_anchor: true,
            strict_anchor: false,
            autostart_game: true,
            logging_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steam_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steam_library_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_library_path: Option<PathBuf>,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load the config, starting over from defaults when it is missing or broken.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => {
                debug!("Loaded config from {}", path.display());
                config
            }
            Err(e) if e.is_not_found() => {
                info!("No config at {}, creating a new one", path.display());
                Self::default()
            }
            Err(e) => {
                warn!("Something is wrong with the config ({}), creating a new one", e);
                Self::default()
            }
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        info!("Updated config: {}", path.as_ref().display());
        Ok(())
    }
}

//! Booth defaults, optionally loaded from a JSON file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::backend::{
    compositor::{DeviceClass, DEFAULT_CAPTION},
    filters::Filter,
    pattern::PatternKind,
    session::{StripSettings, DEFAULT_BORDER_COLOR},
    slots::Template,
};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoothConfig {
    pub template: Template,
    pub filter: Filter,
    pub flipped: bool,
    pub pattern: PatternKind,
    pub border_color: String,
    pub device_class: DeviceClass,
    pub caption: String,
    /// Where strips are saved. Defaults to the user's picture directory.
    pub output_dir: Option<PathBuf>,
    /// Seconds counted down before each shot.
    pub countdown_secs: u64,
}

impl Default for BoothConfig {
    fn default() -> Self {
        Self {
            template: Template::default(),
            filter: Filter::default(),
            flipped: false,
            pattern: PatternKind::default(),
            border_color: DEFAULT_BORDER_COLOR.to_string(),
            device_class: DeviceClass::default(),
            caption: DEFAULT_CAPTION.to_string(),
            output_dir: None,
            countdown_secs: 3,
        }
    }
}

impl BoothConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .or_else(dirs::picture_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn strip_settings(&self) -> StripSettings {
        StripSettings {
            template: self.template,
            filter: self.filter,
            flipped: self.flipped,
            border_color: self.border_color.clone(),
            pattern: self.pattern,
            device_class: self.device_class,
            caption: self.caption.clone(),
        }
    }
}

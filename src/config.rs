//! Collector configuration and the `cellgc.toml` config file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gc::{MAX_CELLS, NODE_CELLS};

/// Name of the config file looked up in a project directory.
pub const CONFIG_FILE_NAME: &str = "cellgc.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse cellgc.toml: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize cellgc.toml: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid heap size {0}: must be an even number of cells, at least 4")]
    InvalidHeapSize(usize),
    #[error("invalid history limit 0: at least one collection report must be kept")]
    InvalidHistoryLimit,
    #[error("{} already exists", .0.display())]
    AlreadyExists(PathBuf),
}

/// Output format for demo reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    /// Human-readable transcript
    #[default]
    Human,
    /// Machine-readable JSON
    Json,
}

/// Construction-time settings for a [`Collector`](crate::gc::Collector).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Heap length in cells. Each node takes 2 cells and cells 0..2 are the
    /// reserved null node.
    pub heap_size: usize,
    /// How many collection reports the collector keeps
    pub history_limit: usize,
}

impl CollectorConfig {
    pub const DEFAULT_HEAP_SIZE: usize = 20;
    pub const DEFAULT_HISTORY_LIMIT: usize = 16;

    pub fn with_heap_size(heap_size: usize) -> Self {
        Self {
            heap_size,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.heap_size < 2 * NODE_CELLS
            || self.heap_size % NODE_CELLS != 0
            || self.heap_size > MAX_CELLS
        {
            return Err(ConfigError::InvalidHeapSize(self.heap_size));
        }
        if self.history_limit == 0 {
            return Err(ConfigError::InvalidHistoryLimit);
        }
        Ok(())
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            heap_size: Self::DEFAULT_HEAP_SIZE,
            history_limit: Self::DEFAULT_HISTORY_LIMIT,
        }
    }
}

/// A named linked list the demo builds, prints and drops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSpec {
    pub name: String,
    #[serde(default)]
    pub values: Vec<i32>,
}

impl ListSpec {
    pub fn new(name: &str, values: &[i32]) -> Self {
        Self {
            name: name.to_string(),
            values: values.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemoSection {
    #[serde(default)]
    pub lists: Vec<ListSpec>,
}

/// Config file (cellgc.toml)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub collector: CollectorConfig,
    #[serde(default)]
    pub demo: DemoSection,
}

impl ConfigFile {
    /// Load `cellgc.toml` from a directory
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        Self::load_path(&dir.join(CONFIG_FILE_NAME))
    }

    /// Load and validate a config file at an explicit path
    pub fn load_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file: ConfigFile = toml::from_str(&content)?;
        file.collector.validate()?;
        Ok(file)
    }

    /// Save `cellgc.toml` to a directory
    pub fn save(&self, dir: &Path) -> Result<(), ConfigError> {
        let path = dir.join(CONFIG_FILE_NAME);
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content).map_err(|source| ConfigError::Write { path, source })
    }
}

/// Write a default config file into `dir`, refusing to overwrite one.
pub fn init_config(dir: &Path) -> Result<PathBuf, ConfigError> {
    let path = dir.join(CONFIG_FILE_NAME);
    if path.exists() {
        return Err(ConfigError::AlreadyExists(path));
    }
    fs::create_dir_all(dir).map_err(|source| ConfigError::Write {
        path: dir.to_path_buf(),
        source,
    })?;

    let file = ConfigFile {
        collector: CollectorConfig::default(),
        demo: DemoSection {
            lists: crate::demo::default_lists(),
        },
    };
    file.save(dir)?;
    Ok(path)
}

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{EnsembleError, Result};
use crate::types::SlotPolicy;

/// Top-level configuration for the Ensemble dataset pipeline.
///
/// Loaded from a TOML file. Each section corresponds to one stage of the
/// pipeline; missing sections and fields fall back to defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnsembleConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            dataset: DatasetConfig::default(),
            retrieval: RetrievalConfig::default(),
        }
    }
}

impl EnsembleConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: EnsembleConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| EnsembleError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory holding the catalog and outfit source files.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Dataset construction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Split name: "train", "valid", or "test".
    pub split: String,
    /// Use the disjoint outfit partition instead of the nondisjoint one.
    pub disjoint: bool,
    /// Target fraction of visible items converted into prediction targets.
    pub masked_ratio: f32,
    /// Ordered category labels; each defines one slot.
    pub categories: Vec<String>,
    /// Resolution policy when two outfit items share a category.
    pub slot_policy: SlotPolicy,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            split: "train".to_string(),
            disjoint: false,
            masked_ratio: 0.3,
            categories: vec![
                "tops".to_string(),
                "bottoms".to_string(),
                "shoes".to_string(),
                "outerwear".to_string(),
                "bags".to_string(),
                "accessories".to_string(),
                "jewellery".to_string(),
                "hats".to_string(),
                "scarves".to_string(),
                "sunglasses".to_string(),
                "all-body".to_string(),
            ],
            slot_policy: SlotPolicy::KeepLast,
        }
    }
}

/// Retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of catalog items returned per query embedding.
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 5 }
    }
}

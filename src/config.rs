use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

use crate::models::LanguageProfile;
use crate::processing::extractor::ExtractionPolicy;
use crate::utils::ExtractionError;

/// Runtime configuration, built once at startup and handed to the extractor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
    pub upload: UploadConfig,
    pub extraction: ExtractionPolicy,
    pub profiles: ProfileConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Tesseract data directory. Falls back to TESSDATA_PREFIX, then to the library default.
    pub datapath: Option<PathBuf>,
    pub latin_language: String,
    pub arabic_language: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            datapath: None,
            latin_language: "fra".to_string(),
            arabic_language: "ara".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub allowed_extensions: Vec<String>,
    pub max_bytes: u64,
    /// Where uploads are staged for the OCR engine. System temp dir when unset.
    pub staging_dir: Option<PathBuf>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        UploadConfig {
            allowed_extensions: ["png", "jpg", "jpeg", "gif"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            max_bytes: 10 * 1024 * 1024,
            staging_dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    pub latin: LanguageProfile,
    pub arabic: LanguageProfile,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        ProfileConfig {
            latin: LanguageProfile::latin(),
            arabic: LanguageProfile::arabic(),
        }
    }
}

impl Config {
    /// Loads a JSON config file, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ExtractionError> {
        let mut config = match path {
            Some(path) => {
                let contents = fs::read_to_string(path).map_err(|e| {
                    ExtractionError::Config(format!("Failed to read {}: {}", path.display(), e))
                })?;
                let config = Self::from_json(&contents)?;
                info!("Loaded configuration from {}", path.display());
                config
            }
            None => Config::default(),
        };

        if config.engine.datapath.is_none() {
            config.engine.datapath = std::env::var_os("TESSDATA_PREFIX").map(PathBuf::from);
        }

        Ok(config)
    }

    pub fn from_json(contents: &str) -> Result<Self, ExtractionError> {
        serde_json::from_str(contents)
            .map_err(|e| ExtractionError::Config(format!("Invalid configuration: {}", e)))
    }
}

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::transcription::ModelSize;
use crate::{PipelineError, Result};

/// Configuration for the transcript search pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Caption/audio acquisition settings
    pub acquisition: AcquisitionConfig,

    /// Speech-to-text settings
    pub transcription: TranscriptionConfig,

    /// Keyword search settings
    pub search: SearchConfig,

    /// Output and artifact settings
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcquisitionConfig {
    /// Prefer existing caption tracks over transcription
    pub prefer_captions: bool,

    /// Downloader program name or path
    pub downloader: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionConfig {
    /// Model size selector
    pub model_size: ModelSize,

    /// Language hint (None = auto-detect)
    pub language: Option<String>,

    /// Directory holding whisper.cpp ggml models
    pub model_dir: PathBuf,

    /// Worker threads for whisper.cpp
    pub threads: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Characters of context kept around each match
    pub context_window: usize,

    /// Case-sensitive matching
    pub case_sensitive: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Base directory for per-request artifact directories
    pub base_dir: PathBuf,

    /// Log filter when RUST_LOG is not set
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            acquisition: AcquisitionConfig {
                prefer_captions: true,
                downloader: "yt-dlp".to_string(),
            },
            transcription: TranscriptionConfig {
                model_size: ModelSize::default(),
                language: None,
                model_dir: PathBuf::from("models"),
                threads: 4,
            },
            search: SearchConfig {
                context_window: crate::search::DEFAULT_CONTEXT_WINDOW,
                case_sensitive: false,
            },
            output: OutputConfig {
                base_dir: PathBuf::from("data"),
                log_level: "info".to_string(),
            },
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        let config_paths = [
            "transcript-search.toml",
            "config/transcript-search.toml",
            "/etc/transcript-search/config.toml",
        ];

        for path in &config_paths {
            if let Ok(config_str) = std::fs::read_to_string(path) {
                match toml::from_str(&config_str) {
                    Ok(config) => {
                        tracing::info!("📄 Loaded configuration from: {}", path);
                        return Ok(config);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {}: {}", path, e);
                    }
                }
            }
        }

        Err(PipelineError::Configuration(
            "no configuration file found".to_string(),
        ))
    }

    /// Load configuration from environment variables on top of defaults
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(model) = std::env::var("TRANSCRIPT_SEARCH_MODEL") {
            if let Ok(size) = model.parse() {
                config.transcription.model_size = size;
            }
        }

        if let Ok(language) = std::env::var("TRANSCRIPT_SEARCH_LANGUAGE") {
            config.transcription.language = Some(language);
        }

        if let Ok(output_dir) = std::env::var("TRANSCRIPT_SEARCH_OUTPUT_DIR") {
            config.output.base_dir = PathBuf::from(output_dir);
        }

        if let Ok(log_level) = std::env::var("TRANSCRIPT_SEARCH_LOG_LEVEL") {
            config.output.log_level = log_level;
        }

        config
    }

    /// Save configuration to file
    pub fn save(&self, path: &str) -> Result<()> {
        let config_str = toml::to_string_pretty(self)
            .map_err(|e| PipelineError::Configuration(e.to_string()))?;
        std::fs::write(path, config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path);
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.search.context_window == 0 {
            return Err(PipelineError::Configuration(
                "context_window must be greater than 0".to_string(),
            ));
        }

        if self.transcription.threads == 0 {
            return Err(PipelineError::Configuration(
                "threads must be greater than 0".to_string(),
            ));
        }

        if self.acquisition.downloader.is_empty() {
            return Err(PipelineError::Configuration(
                "downloader must not be empty".to_string(),
            ));
        }

        if self.output.base_dir.as_os_str().is_empty() {
            return Err(PipelineError::Configuration(
                "output base_dir must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert!(config.acquisition.prefer_captions);
        assert_eq!(config.transcription.model_size, ModelSize::Small);
        assert_eq!(config.search.context_window, 40);
    }

    #[test]
    fn test_validation_catches_bad_values() {
        let mut config = Config::default();
        config.search.context_window = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.acquisition.downloader = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.transcription.model_size = ModelSize::Medium;
        config.search.context_window = 25;
        config.save(path.to_str().unwrap()).unwrap();

        let loaded: Config =
            toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.transcription.model_size, ModelSize::Medium);
        assert_eq!(loaded.search.context_window, 25);
    }
}

//! Configuration management for Hafalan

pub mod session;

use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::verify::GeminiClient;

const APP_NAME: &str = "hafalan";

/// Remote verifier settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    /// Use Gemini when a key is stored
    pub enabled: bool,
    pub model: String,
    pub endpoint: String,
    pub timeout_seconds: u64,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: GeminiClient::DEFAULT_MODEL.to_string(),
            endpoint: GeminiClient::DEFAULT_ENDPOINT.to_string(),
            timeout_seconds: 15,
        }
    }
}

/// Voice quiz settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    pub question_count: usize,
    pub points_per_correct: u32,
    /// Recognizer attempts per question before it counts as wrong
    pub max_listen_attempts: u32,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self { question_count: 5, points_per_correct: 20, max_listen_attempts: 2 }
    }
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Curriculum JSON to load instead of the built-in juz 30 sample
    #[serde(skip_serializing_if = "Option::is_none")]
    pub curriculum_path: Option<PathBuf>,

    /// Fixed seed for question shuffling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    pub verifier: VerifierConfig,

    pub voice: VoiceConfig,

    /// How long answer feedback stays up before the next question
    pub feedback_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            curriculum_path: None,
            seed: None,
            verifier: VerifierConfig::default(),
            voice: VoiceConfig::default(),
            feedback_delay_ms: 1500,
        }
    }
}

impl Config {
    /// Load configuration from disk, or create default if not exists
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config from {:?}", config_path))?;
            serde_json::from_str(&contents).with_context(|| "Failed to parse config.json")
        } else {
            let config = Self::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        let contents =
            serde_json::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        std::fs::write(&config_path, contents)
            .with_context(|| format!("Failed to write config to {:?}", config_path))?;

        Ok(())
    }

    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let proj_dirs =
            ProjectDirs::from("", "", APP_NAME).context("Failed to determine config directory")?;
        Ok(proj_dirs.config_dir().join("config.json"))
    }

    /// Get the data directory path
    pub fn data_dir() -> Result<PathBuf> {
        let proj_dirs =
            ProjectDirs::from("", "", APP_NAME).context("Failed to determine data directory")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    /// Path of the learner profile store
    pub fn profiles_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join(crate::profile::JsonFileRepository::FILE_NAME))
    }

    /// Path of the log file
    pub fn log_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("hafalan.log"))
    }
}

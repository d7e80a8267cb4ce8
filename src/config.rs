use crate::defaults;
use crate::window::WindowConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub languages: LanguageConfig,
    pub session: SessionConfig,
}

/// Language tag configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LanguageConfig {
    /// Sign language tag for streaming sessions (e.g. "asl", "bsl").
    pub sign_language: String,
    /// Written-language tag streamed translations target.
    pub text_language: String,
}

/// Streaming session configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    /// Bound for session event channels.
    pub event_buffer: usize,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            sign_language: defaults::DEFAULT_SIGN_LANGUAGE.to_string(),
            text_language: defaults::DEFAULT_TEXT_LANGUAGE.to_string(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            event_buffer: defaults::EVENT_BUFFER,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                if e.downcast_ref::<std::io::Error>()
                    .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
                    .unwrap_or(false)
                {
                    Self::default()
                } else {
                    // Re-panic on invalid TOML or other errors
                    panic!("Failed to load config from {}: {}", path.display(), e);
                }
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - SIGNFLOW_SIGN_LANGUAGE → languages.sign_language
    /// - SIGNFLOW_TEXT_LANGUAGE → languages.text_language
    /// - SIGNFLOW_SILENCE_FRAMES → window.trailing_silence_frames
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(language) = std::env::var("SIGNFLOW_SIGN_LANGUAGE")
            && !language.is_empty()
        {
            self.languages.sign_language = language;
        }

        if let Ok(language) = std::env::var("SIGNFLOW_TEXT_LANGUAGE")
            && !language.is_empty()
        {
            self.languages.text_language = language;
        }

        if let Ok(frames) = std::env::var("SIGNFLOW_SILENCE_FRAMES")
            && let Ok(frames) = frames.parse::<u32>()
        {
            self.window.trailing_silence_frames = frames;
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/signflow/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("signflow")
            .join("config.toml")
    }
}

//! Configuration file parser for ~/.config/rss-ingest/config.toml.
//!
//! The config file is optional — a missing file yields `Config::default()`.
//! Unknown keys are accepted by serde and reported with a warning.
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::feed::TagWhitelist;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// How parsed feeds are written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Summary,
    Json,
}

/// Top-level configuration. Every key is optional.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Replaces the built-in field whitelist when set.
    pub tags: Option<Vec<String>>,

    /// Added to whichever whitelist is in effect.
    pub extra_tags: Vec<String>,

    /// Parse as a stream, skipping the buffer pre-checks.
    pub skip_validation: bool,

    pub format: OutputFormat,

    /// Column width for item titles in summary output.
    pub title_width: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tags: None,
            extra_tags: Vec::new(),
            skip_validation: false,
            format: OutputFormat::Summary,
            title_width: 72,
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 5] =
        ["tags", "extra_tags", "skip_validation", "format", "title_width"];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(content)?;
        tracing::debug!(
            custom_tags = config.tags.is_some(),
            extra_tags = config.extra_tags.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// The whitelist this configuration asks for.
    pub fn whitelist(&self) -> TagWhitelist {
        let base = match &self.tags {
            Some(tags) => TagWhitelist::new(tags.iter().cloned()),
            None => TagWhitelist::default(),
        };
        if self.extra_tags.is_empty() {
            base
        } else {
            base.extended(self.extra_tags.iter().cloned())
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

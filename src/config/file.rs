// src/config/file.rs
// File-based configuration from ~/.fixtrail/config.toml

use crate::config::tables::{DEFAULT_HASH_KEY_LEN, FeatureTables};
use crate::error::{FixtrailError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default revision range, matching the Linux stable release window
pub const DEFAULT_RANGE: &str = "v4.0...v5.19";

/// Default threshold for strict filtering (added + removed hunk lines)
pub const DEFAULT_MIN_CHANGED_LINES: usize = 5;

/// Top-level config structure
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct FixtrailConfig {
    #[serde(default)]
    pub extract: ExtractConfig,
    #[serde(default)]
    pub tables: FeatureTables,
}

/// Extraction section
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExtractConfig {
    /// Revision range used when none is given on the command line
    pub range: String,
    /// Number of hex characters kept in the commit join key
    pub hash_key_len: usize,
    /// Parse the unified diff when filtering commits
    pub strict: bool,
    /// Minimum hunk lines a commit needs under strict filtering
    pub min_changed_lines: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            range: DEFAULT_RANGE.to_string(),
            hash_key_len: DEFAULT_HASH_KEY_LEN,
            strict: false,
            min_changed_lines: DEFAULT_MIN_CHANGED_LINES,
        }
    }
}

impl FixtrailConfig {
    /// Load config from an explicit path, or fall back to ~/.fixtrail/config.toml.
    ///
    /// An explicit path must exist and parse. The default path is optional and a
    /// broken default file only logs a warning.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config = match explicit {
            Some(path) => Self::from_path(path)?,
            None => Self::load_default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            FixtrailError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config = toml::from_str(&contents)?;
        debug!(path = %path.display(), "Loaded config from file");
        Ok(config)
    }

    fn load_default() -> Self {
        let path = Self::config_path();

        match std::fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    debug!(path = %path.display(), "Loaded config from file");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to parse config file");
                    Self::default()
                }
            },
            Err(_) => {
                debug!(path = %path.display(), "Config file not found, using defaults");
                Self::default()
            }
        }
    }

    /// Get the default config file path
    fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".fixtrail")
            .join("config.toml")
    }

    fn validate(&self) -> Result<()> {
        if !(4..=40).contains(&self.extract.hash_key_len) {
            return Err(FixtrailError::Config(format!(
                "hash_key_len must be between 4 and 40, got {}",
                self.extract.hash_key_len
            )));
        }
        Ok(())
    }
}

// src/config/env.rs
// Environment-based configuration - single source of truth for all env vars

use std::path::PathBuf;
use tracing::debug;

/// Settings read from FIXTRAIL_* environment variables
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    /// Config file path (FIXTRAIL_CONFIG)
    pub config_path: Option<PathBuf>,
    /// Log level name (FIXTRAIL_LOG), e.g. "debug"
    pub log_level: Option<String>,
    /// Default revision range (FIXTRAIL_RANGE)
    pub range: Option<String>,
    /// Force strict filtering (FIXTRAIL_STRICT)
    pub strict: Option<bool>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let config = Self {
            config_path: read_var("FIXTRAIL_CONFIG").map(PathBuf::from),
            log_level: read_var("FIXTRAIL_LOG"),
            range: read_var("FIXTRAIL_RANGE"),
            strict: parse_bool_env("FIXTRAIL_STRICT"),
        };
        debug!(?config, "Environment configuration loaded");
        config
    }
}

/// Read a single variable from environment, filtering empty values
fn read_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Parse a boolean environment variable
fn parse_bool_env(name: &str) -> Option<bool> {
    parse_bool(&std::env::var(name).ok()?)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

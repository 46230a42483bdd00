//! Configuration for kilo.
//!
//! Settings are read from `~/.kilo/config.toml`. Every field is optional; a
//! missing or unreadable file means defaults.
//!
//! ```toml
//! # Inter-byte read timeout; rounded up to tenths of a second
//! read_timeout_ms = 100
//!
//! # Glyph drawn on rows past the end of the document
//! placeholder = "~"
//!
//! # Welcome banner at one third of the screen height
//! show_banner = true
//! banner = "Kilo editor -- version 0.1.0"
//!
//! # Log filter for ~/.kilo/kilo.log (overridden by KILO_LOG)
//! log_level = "info"
//! ```

use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Version string from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Main configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Read timeout in milliseconds
    pub read_timeout_ms: u64,
    /// Empty-row glyph
    pub placeholder: String,
    /// Whether to draw the welcome banner
    pub show_banner: bool,
    /// Banner override
    pub banner: Option<String>,
    /// Default log filter
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            read_timeout_ms: 100,
            placeholder: "~".to_string(),
            show_banner: true,
            banner: None,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load() -> Self {
        if let Some(path) = Self::get_config_path() {
            if path.exists() {
                match fs::read_to_string(&path) {
                    Ok(content) => return Self::from_toml_str(&content),
                    Err(e) => warn!("Cannot read {}: {}", path.display(), e),
                }
            }
        }
        Self::default()
    }

    /// Parse configuration text, falling back to defaults if it is invalid
    pub fn from_toml_str(content: &str) -> Self {
        toml::from_str(content).unwrap_or_else(|e| {
            warn!("Ignoring invalid config: {}", e);
            Self::default()
        })
    }

    /// Directory holding the config and log files
    pub fn dir() -> Option<PathBuf> {
        home_dir().map(|home| home.join(".kilo"))
    }

    /// Get config file path
    fn get_config_path() -> Option<PathBuf> {
        Self::dir().map(|dir| dir.join("config.toml"))
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// The banner to draw
    pub fn banner_text(&self) -> String {
        self.banner
            .clone()
            .unwrap_or_else(|| format!("Kilo editor -- version {}", VERSION))
    }
}

// Get home directory
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

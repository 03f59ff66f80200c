//! Form naming conventions
//!
//! Loaded from a TOML file such as:
//!
//! ```toml
//! alternate_suffix = "_alt"
//! error_prefix = "error-"
//! highlight_class = "error_highlight"
//! ```
//!
//! ## Priority Order (highest to lowest)
//!
//! 1. Environment variables (`OSIRIS_GUARDS_ALT_SUFFIX`, `OSIRIS_GUARDS_ERROR_PREFIX`)
//! 2. Config file
//! 3. Defaults

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GuardError, Result};

pub const DEFAULT_ALTERNATE_SUFFIX: &str = "_alt";
pub const DEFAULT_ERROR_PREFIX: &str = "error-";
pub const DEFAULT_HIGHLIGHT_CLASS: &str = "error_highlight";

pub const ENV_ALTERNATE_SUFFIX: &str = "OSIRIS_GUARDS_ALT_SUFFIX";
pub const ENV_ERROR_PREFIX: &str = "OSIRIS_GUARDS_ERROR_PREFIX";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FormConfig {
    /// Suffix naming a field's alternate-value shadow input
    pub alternate_suffix: String,

    /// Prefix naming a field's error region
    pub error_prefix: String,

    /// Class marking an errored field
    pub highlight_class: String,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            alternate_suffix: DEFAULT_ALTERNATE_SUFFIX.to_string(),
            error_prefix: DEFAULT_ERROR_PREFIX.to_string(),
            highlight_class: DEFAULT_HIGHLIGHT_CLASS.to_string(),
        }
    }
}

impl FormConfig {
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| GuardError::Config {
            reason: format!("Failed to parse config: {}", e),
        })
    }

    /// Load from `path`
    ///
    /// Returns defaults if the file doesn't exist, an error if it is malformed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| GuardError::Config {
            reason: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        Self::from_toml(&content)
    }

    /// Merge with environment variables
    pub fn with_env(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from a lookup (empty values are ignored)
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(suffix) = lookup(ENV_ALTERNATE_SUFFIX).filter(|v| !v.is_empty()) {
            self.alternate_suffix = suffix;
        }

        if let Some(prefix) = lookup(ENV_ERROR_PREFIX).filter(|v| !v.is_empty()) {
            self.error_prefix = prefix;
        }

        self
    }
}

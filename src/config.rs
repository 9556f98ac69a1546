//! Service configuration file.
//!
//! ```yaml
//! http:
//!   addr: 0.0.0.0:8080
//! dispatcher:
//!   debug: false
//!   base_path: /fn
//! ```
//!
//! Every key is optional. YAML and JSON files are both accepted; the format
//! is picked from the extension.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpConfig {
    /// Listen address
    pub addr: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DispatcherConfig {
    /// Tap every element stream into debug logs
    pub debug: bool,
    /// Prefix stripped before function names are matched
    pub base_path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub dispatcher: DispatcherConfig,
}

impl AppConfig {
    /// Read a YAML (or `.json`) configuration file.
    ///
    /// # Errors
    ///
    /// The file cannot be read or does not deserialize.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        let config = if is_json {
            serde_json::from_str(&content)
                .with_context(|| format!("Invalid JSON config {}", path.display()))?
        } else {
            Self::from_yaml(&content)
                .with_context(|| format!("Invalid YAML config {}", path.display()))?
        };
        Ok(config)
    }

    /// Parse YAML text; an empty document yields the defaults.
    ///
    /// # Errors
    ///
    /// The text is not valid YAML for this structure.
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Apply command line overrides; `None` keeps the file value.
    #[must_use]
    pub fn with_overrides(mut self, addr: Option<String>, debug: bool) -> Self {
        if let Some(addr) = addr {
            self.http.addr = addr;
        }
        self.dispatcher.debug |= debug;
        self
    }
}

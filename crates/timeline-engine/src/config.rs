//! Engine configuration, loadable from TOML.
//!
//! ```toml
//! default_region = "ES"
//! default_limit = 200
//! max_limit = 1000
//! timezone = "Europe/Madrid"
//! ```
//!
//! Every key is optional; missing keys take the [`Default`] values.

use std::path::Path;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TimelineError};
use crate::holiday::DEFAULT_REGION;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Holiday region used when the user has none or it is unsupported.
    pub default_region: String,
    /// Page size when the caller does not pass a limit.
    pub default_limit: usize,
    /// Upper bound for any requested page size.
    pub max_limit: usize,
    /// IANA zone whose calendar day defines "today".
    pub timezone: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_region: DEFAULT_REGION.to_string(),
            default_limit: 500,
            max_limit: 1000,
            timezone: "UTC".to_string(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML document.
    ///
    /// # Errors
    /// Returns `TimelineError::Config` if the document is not valid TOML for
    /// this struct or a setting is out of range, and
    /// `TimelineError::InvalidTimezone` for an unknown `timezone`.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw).map_err(|e| TimelineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    ///
    /// # Errors
    /// Returns `TimelineError::Config` if the file cannot be read, plus every
    /// error of [`EngineConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| TimelineError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        self.tz()?;
        if self.max_limit == 0 {
            return Err(TimelineError::Config("max_limit must be at least 1".to_string()));
        }
        if self.default_region.trim().is_empty() {
            return Err(TimelineError::Config("default_region must not be empty".to_string()));
        }
        Ok(())
    }

    /// The configured timezone, parsed.
    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse()
            .map_err(|_| TimelineError::InvalidTimezone(self.timezone.clone()))
    }
}

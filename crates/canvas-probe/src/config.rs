//! Probe configuration file.
//!
//! ```yaml
//! profile: livecode
//! browser:
//!   headless: true
//!   sandbox: false
//! load_timeout_ms: 90000
//! settle_delay_ms: 200
//! ```
//!
//! Every field is optional. A custom `layout` replaces the profile's built-in
//! table and is validated when the file is loaded.

use crate::browser::BrowserConfig;
use crate::layout::LayoutTable;
use crate::page::{PageOptions, DEFAULT_SETTLE_DELAY_MS};
use crate::profile::{CalculatorProfile, ProfileName};
use crate::result::{ProbeError, ProbeResult};
use crate::wait::DEFAULT_POLL_INTERVAL_MS;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Contents of a probe configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProbeConfig {
    /// Calculator profile
    pub profile: ProfileName,
    /// Browser settings
    pub browser: BrowserConfig,
    /// Readiness timeout override, in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_timeout_ms: Option<u64>,
    /// Sleep after each click, in milliseconds
    pub settle_delay_ms: u64,
    /// Readiness poll interval, in milliseconds
    pub poll_interval_ms: u64,
    /// Page URL override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Custom layout table
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<LayoutTable>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            profile: ProfileName::default(),
            browser: BrowserConfig::default(),
            load_timeout_ms: None,
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            url: None,
            layout: None,
        }
    }
}

impl ProbeConfig {
    /// Defaults for a profile
    #[must_use]
    pub fn for_profile(profile: ProfileName) -> Self {
        Self {
            profile,
            ..Self::default()
        }
    }

    /// Parse and validate YAML
    ///
    /// # Errors
    ///
    /// Returns error if the YAML is malformed or the configuration is invalid
    pub fn from_yaml(yaml: &str) -> ProbeResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or is invalid
    pub fn load(path: impl AsRef<Path>) -> ProbeResult<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&yaml)?;
        tracing::debug!(path = %path.display(), profile = %config.profile, "configuration loaded");
        Ok(config)
    }

    /// Serialize as YAML
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails
    pub fn to_yaml(&self) -> ProbeResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Write the configuration as YAML
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be written
    pub fn save(&self, path: impl AsRef<Path>) -> ProbeResult<()> {
        std::fs::write(path, self.to_yaml()?)?;
        Ok(())
    }

    /// Check field ranges and the custom layout
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Config`] or [`ProbeError::InvalidLayout`]
    pub fn validate(&self) -> ProbeResult<()> {
        if self.poll_interval_ms == 0 {
            return Err(ProbeError::Config {
                message: "poll_interval_ms must be greater than zero".to_string(),
            });
        }
        if self.browser.viewport_width == 0 || self.browser.viewport_height == 0 {
            return Err(ProbeError::Config {
                message: "browser viewport must not be empty".to_string(),
            });
        }
        if let Some(ref url) = self.url {
            if url.trim().is_empty() {
                return Err(ProbeError::Config {
                    message: "url must not be empty".to_string(),
                });
            }
        }
        self.profile()?;
        Ok(())
    }

    /// Built-in profile with this file's overrides applied
    ///
    /// # Errors
    ///
    /// Returns error if the custom layout is invalid
    pub fn profile(&self) -> ProbeResult<CalculatorProfile> {
        let mut profile = CalculatorProfile::builtin(self.profile);
        if let Some(ref url) = self.url {
            profile = profile.with_url(url.clone());
        }
        if let Some(timeout) = self.load_timeout_ms {
            profile = profile.with_load_timeout(timeout);
        }
        if let Some(ref layout) = self.layout {
            profile = profile.with_layout(layout.clone())?;
        }
        Ok(profile)
    }

    /// Page timing options
    #[must_use]
    pub const fn page_options(&self) -> PageOptions {
        PageOptions {
            settle_delay_ms: self.settle_delay_ms,
            poll_interval_ms: self.poll_interval_ms,
        }
    }
}

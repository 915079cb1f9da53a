//! Calculator profiles.
//!
//! A profile bundles everything that differs between the two supported
//! calculator skins: the page URL, the element ids of the canvas and its
//! loading indicator, the region layout, how the display is preprocessed for
//! OCR and what kind of value the display reading yields.

use crate::layout::LayoutTable;
use crate::ocr::Preprocess;
use crate::result::{ProbeError, ProbeResult};
use crate::wait::{WaitOptions, DEFAULT_LOAD_TIMEOUT_MS, DEFAULT_POLL_INTERVAL_MS};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// URL of the online-calculator skin
pub const ONLINE_CALCULATOR_URL: &str =
    "https://www.online-calculator.com/html5/online-calculator/index.php";

/// URL of the livecode demo calculator
pub const LIVECODE_URL: &str = "https://livecode.com/demo/html5/calculator/";

/// Element id of the calculator canvas on both pages
pub const CANVAS_ID: &str = "canvas";

/// Element id of the livecode loading spinner
pub const SPINNER_ID: &str = "spinner";

/// Identifier of the synthetic display widget
pub const DISPLAY_ID: &str = "display";

/// Readiness timeout for the online-calculator page (4 minutes)
pub const ONLINE_CALCULATOR_LOAD_TIMEOUT_MS: u64 = 240_000;

/// Built-in profile names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProfileName {
    /// online-calculator.com HTML5 calculator
    #[default]
    OnlineCalculator,
    /// livecode.com HTML5 demo calculator
    Livecode,
}

impl ProfileName {
    /// All built-in profiles
    pub const ALL: [Self; 2] = [Self::OnlineCalculator, Self::Livecode];

    /// Kebab-case name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OnlineCalculator => "online-calculator",
            Self::Livecode => "livecode",
        }
    }
}

impl fmt::Display for ProfileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProfileName {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| ProbeError::Config {
                message: format!(
                    "unknown profile '{s}' (expected one of: online-calculator, livecode)"
                ),
            })
    }
}

/// What reading the display yields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayKind {
    /// The trimmed recognized text
    Text,
    /// The recognized text parsed as a number
    Number,
}

/// Everything the page object needs to know about one calculator skin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatorProfile {
    /// Profile name
    pub name: ProfileName,
    /// Page URL
    pub url: String,
    /// Element id of the canvas
    pub canvas_id: String,
    /// Element id shown while the canvas loads, if the page has one
    pub loading_indicator_id: Option<String>,
    /// Region layout table
    pub layout: LayoutTable,
    /// OCR preprocessing of the display crop
    pub display_preprocess: Preprocess,
    /// Native value kind of the display
    pub display_kind: DisplayKind,
    /// Readiness timeout in milliseconds
    pub load_timeout_ms: u64,
}

impl CalculatorProfile {
    /// The online-calculator skin: dark digits on a light display
    #[must_use]
    pub fn online_calculator() -> Self {
        Self {
            name: ProfileName::OnlineCalculator,
            url: ONLINE_CALCULATOR_URL.to_string(),
            canvas_id: CANVAS_ID.to_string(),
            loading_indicator_id: None,
            layout: LayoutTable::online_calculator(),
            display_preprocess: Preprocess::threshold(),
            display_kind: DisplayKind::Text,
            load_timeout_ms: ONLINE_CALCULATOR_LOAD_TIMEOUT_MS,
        }
    }

    /// The livecode skin: light digits on a dark display
    #[must_use]
    pub fn livecode() -> Self {
        Self {
            name: ProfileName::Livecode,
            url: LIVECODE_URL.to_string(),
            canvas_id: CANVAS_ID.to_string(),
            loading_indicator_id: Some(SPINNER_ID.to_string()),
            layout: LayoutTable::livecode(),
            display_preprocess: Preprocess::Invert,
            display_kind: DisplayKind::Number,
            load_timeout_ms: DEFAULT_LOAD_TIMEOUT_MS,
        }
    }

    /// Built-in profile by name
    #[must_use]
    pub fn builtin(name: ProfileName) -> Self {
        match name {
            ProfileName::OnlineCalculator => Self::online_calculator(),
            ProfileName::Livecode => Self::livecode(),
        }
    }

    /// Override the page URL
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Replace the layout table
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::InvalidLayout`] if the table is invalid or has no
    /// display region
    pub fn with_layout(mut self, layout: LayoutTable) -> ProbeResult<Self> {
        layout.validate()?;
        if !layout.regions.iter().any(|r| r.id == DISPLAY_ID) {
            return Err(ProbeError::InvalidLayout {
                table: layout.name,
                message: format!("no '{DISPLAY_ID}' region"),
            });
        }
        self.layout = layout;
        Ok(self)
    }

    /// Override the readiness timeout
    #[must_use]
    pub const fn with_load_timeout(mut self, timeout_ms: u64) -> Self {
        self.load_timeout_ms = timeout_ms;
        self
    }

    /// Wait options for the readiness wait
    #[must_use]
    pub fn load_wait(&self) -> WaitOptions {
        WaitOptions::new()
            .with_timeout(self.load_timeout_ms)
            .with_poll_interval(DEFAULT_POLL_INTERVAL_MS)
    }
}

impl Default for CalculatorProfile {
    fn default() -> Self {
        Self::online_calculator()
    }
}

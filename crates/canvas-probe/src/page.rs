//! Calculator page object.
//!
//! Drives one calculator page through its lifecycle:
//!
//! ```text
//! Uninitialized ──get()──► Navigated ──wait_until_canvas_is_loaded()──► Ready
//!                              │                                         │
//!                              └───────────── click() ───────────────────┴──► Interacting
//! ```
//!
//! Clicking or reading before the page has been navigated is an
//! [`ProbeError::InvalidState`]. Every click is followed by a fixed settle
//! delay before anything is read back.

use crate::capture;
use crate::dom::{DomCache, SyntheticDom};
use crate::driver::CanvasDriver;
use crate::element::{SyntheticElement, Widget};
use crate::ocr::OcrEngine;
use crate::profile::{CalculatorProfile, DisplayKind, DISPLAY_ID};
use crate::result::{ProbeError, ProbeResult};
use crate::wait::{self, WaitOptions, WaitResult, DEFAULT_POLL_INTERVAL_MS};
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Delay after every click before the canvas is trusted again (200ms)
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 200;

/// Lifecycle state of a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PageState {
    /// Nothing loaded yet
    Uninitialized,
    /// URL requested; the canvas may still be loading
    Navigated,
    /// Canvas finished loading
    Ready,
    /// At least one click issued
    Interacting,
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::Navigated => "navigated",
            Self::Ready => "ready",
            Self::Interacting => "interacting",
        };
        f.write_str(name)
    }
}

/// Timing knobs of a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageOptions {
    /// Sleep after each click, in milliseconds
    pub settle_delay_ms: u64,
    /// Poll interval of the readiness wait, in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl PageOptions {
    /// Set the settle delay
    #[must_use]
    pub const fn with_settle_delay(mut self, ms: u64) -> Self {
        self.settle_delay_ms = ms;
        self
    }

    /// Set the readiness poll interval
    #[must_use]
    pub const fn with_poll_interval(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }
}

/// A display reading in the profile's native kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DisplayValue {
    /// Trimmed recognized text
    Text(String),
    /// Parsed number
    Number(f64),
}

impl DisplayValue {
    /// Whether this reading shows `expected`, compared as text or as a number
    #[must_use]
    pub fn matches(&self, expected: &str) -> bool {
        match self {
            Self::Text(text) => text == expected,
            Self::Number(value) => expected
                .trim()
                .parse::<f64>()
                .is_ok_and(|e| (e - value).abs() < f64::EPSILON),
        }
    }
}

impl fmt::Display for DisplayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(value) => write!(f, "{value}"),
        }
    }
}

/// Identifier of the button for a key name: `"4"` is `btn_4`, `"plus"` is `btn_plus`
#[must_use]
pub fn button_id(name: &str) -> String {
    format!("btn_{name}")
}

/// Key name of one character typed into the calculator
fn key_name(c: char) -> String {
    match c {
        '.' => "dot".to_string(),
        other => other.to_string(),
    }
}

/// Page object of a canvas-rendered calculator
pub struct CalculatorPage<D: CanvasDriver, O: OcrEngine> {
    driver: D,
    ocr: O,
    profile: CalculatorProfile,
    options: PageOptions,
    state: PageState,
    dom: DomCache,
}

impl<D: CanvasDriver, O: OcrEngine> fmt::Debug for CalculatorPage<D, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CalculatorPage")
            .field("profile", &self.profile.name)
            .field("state", &self.state)
            .field("options", &self.options)
            .field("dom_built", &self.dom.is_built())
            .finish_non_exhaustive()
    }
}

impl<D: CanvasDriver, O: OcrEngine> CalculatorPage<D, O> {
    /// Create a page object; nothing is loaded until [`Self::get`]
    pub fn new(driver: D, ocr: O, profile: CalculatorProfile) -> Self {
        let dom = DomCache::new(profile.layout.clone());
        Self {
            driver,
            ocr,
            profile,
            options: PageOptions::default(),
            state: PageState::Uninitialized,
            dom,
        }
    }

    /// Replace the timing options
    #[must_use]
    pub fn with_options(mut self, options: PageOptions) -> Self {
        self.options = options;
        self
    }

    /// Current lifecycle state
    #[must_use]
    pub const fn state(&self) -> PageState {
        self.state
    }

    /// Profile of this page
    #[must_use]
    pub const fn profile(&self) -> &CalculatorProfile {
        &self.profile
    }

    /// Timing options
    #[must_use]
    pub const fn options(&self) -> &PageOptions {
        &self.options
    }

    /// Underlying driver
    #[must_use]
    pub const fn driver(&self) -> &D {
        &self.driver
    }

    /// Underlying driver, mutably
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Give the driver back
    pub fn into_driver(self) -> D {
        self.driver
    }

    /// Navigate to the profile URL
    pub fn get(&mut self) -> ProbeResult<()> {
        tracing::info!(profile = %self.profile.name, url = %self.profile.url, "navigating");
        self.driver.navigate(&self.profile.url)?;
        self.dom.invalidate();
        self.state = PageState::Navigated;
        Ok(())
    }

    /// Block until the canvas has finished loading
    ///
    /// Waits for the profile's loading indicator to disappear, or for the
    /// canvas itself to be displayed when the page has no indicator. A
    /// timeout is fatal and leaves the page in its previous state.
    pub fn wait_until_canvas_is_loaded(&mut self, timeout_ms: u64) -> ProbeResult<WaitResult> {
        let options = self.profile.load_wait().with_timeout(timeout_ms);
        self.wait_for_canvas(options)
    }

    /// Navigate and wait for the canvas with the profile's timeout
    pub fn open(&mut self) -> ProbeResult<()> {
        self.get()?;
        self.wait_for_canvas(self.profile.load_wait())?;
        Ok(())
    }

    fn wait_for_canvas(&mut self, options: WaitOptions) -> ProbeResult<WaitResult> {
        self.require(PageState::Navigated, "wait for the canvas")?;
        let options = options.with_poll_interval(self.options.poll_interval_ms);

        let result = match self.profile.loading_indicator_id.as_deref() {
            Some(indicator) => wait::wait_until_hidden(&self.driver, indicator, &options)?,
            None => {
                let driver = &self.driver;
                let canvas_id = self.profile.canvas_id.as_str();
                wait::wait_until(
                    || driver.is_element_visible(canvas_id),
                    format!("#{canvas_id} to become visible"),
                    &options,
                )?
            }
        };

        tracing::info!(
            profile = %self.profile.name,
            elapsed_ms = result.elapsed.as_millis() as u64,
            "canvas loaded"
        );
        if self.state < PageState::Ready {
            self.state = PageState::Ready;
        }
        Ok(result)
    }

    /// Synthetic DOM of the canvas, built from its current size on first use
    pub fn canvas_dom(&mut self) -> ProbeResult<&SyntheticDom> {
        self.require(PageState::Navigated, "build the synthetic DOM")?;
        let driver = &self.driver;
        let canvas_id = self.profile.canvas_id.as_str();
        self.dom
            .get_or_build(|| Ok(driver.element_rect(canvas_id)?.pixel_size()))
    }

    /// Forget the synthetic DOM; the next access rebuilds it
    pub fn invalidate_dom(&mut self) {
        self.dom.invalidate();
    }

    /// Rebuild the synthetic DOM from the canvas's current size
    pub fn rebuild_dom(&mut self) -> ProbeResult<&SyntheticDom> {
        self.require(PageState::Navigated, "build the synthetic DOM")?;
        let size = self.driver.element_rect(&self.profile.canvas_id)?.pixel_size();
        Ok(self.dom.rebuild(size))
    }

    /// Resolve a widget to its synthetic element
    pub fn resolve(&mut self, widget: impl Into<Widget>) -> ProbeResult<SyntheticElement> {
        match widget.into() {
            Widget::Element(element) => Ok(element),
            Widget::Id(id) => Ok(self.canvas_dom()?.find_element_by_id(&id)?.clone()),
        }
    }

    /// Click the centroid of a widget, then wait the settle delay
    pub fn click(&mut self, widget: impl Into<Widget>) -> ProbeResult<()> {
        self.require(PageState::Navigated, "click")?;
        let element = self.resolve(widget)?;
        let center = element.centroid()?;
        tracing::debug!(widget = %element.id(), at = %center, "click");
        self.driver.click_at_offset(&self.profile.canvas_id, center)?;
        self.state = PageState::Interacting;
        wait::wait_timeout(self.options.settle_delay_ms);
        Ok(())
    }

    /// Click a button by key name (`"4"`, `"plus"`, `"clear"`)
    pub fn click_button(&mut self, name: &str) -> ProbeResult<()> {
        self.click(button_id(name))
    }

    /// Click the clear button
    pub fn clear(&mut self) -> ProbeResult<()> {
        self.click_button("clear")
    }

    /// Type a number by clicking one button per character
    pub fn insert_number(&mut self, number: impl fmt::Display) -> ProbeResult<()> {
        for c in number.to_string().chars() {
            self.click_button(&key_name(c))?;
        }
        Ok(())
    }

    /// Screenshot of the whole canvas at its rendered size
    pub fn capture_canvas(&self) -> ProbeResult<RgbaImage> {
        self.require(PageState::Navigated, "capture the canvas")?;
        capture::capture_canvas(&self.driver, &self.profile.canvas_id)
    }

    /// Cropped capture of one widget
    pub fn capture_widget(&mut self, widget: impl Into<Widget>) -> ProbeResult<RgbaImage> {
        let element = self.resolve(widget)?;
        element.crop(&self.capture_canvas()?)
    }

    /// OCR text of the display, trimmed
    pub fn display_text(&mut self) -> ProbeResult<String> {
        self.require(PageState::Navigated, "read the display")?;
        let display = self.resolve(DISPLAY_ID)?;
        let canvas = self.capture_canvas()?;
        let text = display.read_text(&canvas, self.profile.display_preprocess, &self.ocr)?;
        Ok(text.trim().to_string())
    }

    /// Display parsed as a number
    pub fn read_display(&mut self) -> ProbeResult<f64> {
        let text = self.display_text()?;
        text.parse::<f64>()
            .map_err(|_| ProbeError::DisplayParse { text })
    }

    /// Display in the profile's native value kind
    pub fn display_value(&mut self) -> ProbeResult<DisplayValue> {
        match self.profile.display_kind {
            DisplayKind::Text => self.display_text().map(DisplayValue::Text),
            DisplayKind::Number => self.read_display().map(DisplayValue::Number),
        }
    }

    fn require(&self, minimum: PageState, action: &str) -> ProbeResult<()> {
        if self.state < minimum {
            return Err(ProbeError::invalid_state(format!(
                "cannot {action} while the page is {}",
                self.state
            )));
        }
        Ok(())
    }
}

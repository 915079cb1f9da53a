//! canvas-probe: UI testing for canvas-rendered calculators
//!
//! An HTML5 canvas exposes no DOM for what it draws. canvas-probe builds a
//! *synthetic DOM* instead: a hand-authored layout table maps widget names
//! (`btn_7`, `display`) to fractional canvas regions, which are resolved to
//! pixel rectangles once the canvas size is known. Buttons are clicked at the
//! moment centroid of their region; the display is read by cropping a canvas
//! screenshot, binarizing it and running digit-only OCR.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  resolve   ┌──────────────┐  centroid  ┌──────────────┐
//! │ LayoutTable  │───────────►│ SyntheticDom │───────────►│ CanvasDriver │
//! │ (profile)    │ canvas px  │ (DomCache)   │   click    │ (chromium)   │
//! └──────────────┘            └──────┬───────┘            └──────┬───────┘
//!                                    │ crop                      │ screenshot
//!                                    ▼                           │
//!                             ┌──────────────┐   preprocess      │
//!                             │  OcrEngine   │◄──────────────────┘
//!                             │ (tesseract)  │
//!                             └──────────────┘
//! ```
//!
//! [`CalculatorPage`] ties these together behind a small lifecycle state
//! machine; [`scenario`] runs declarative end-to-end checks against it.

#![warn(missing_docs)]

pub mod browser;
pub mod capture;
pub mod config;
pub mod dom;
pub mod driver;
pub mod element;
pub mod geometry;
pub mod layout;
pub mod ocr;
pub mod overlay;
pub mod page;
pub mod profile;
mod result;
pub mod scenario;
pub mod wait;

#[cfg(feature = "browser")]
pub use browser::ChromiumDriver;
pub use browser::BrowserConfig;
pub use config::ProbeConfig;
pub use dom::{DomCache, SyntheticDom};
pub use driver::{CanvasDriver, ElementRect};
pub use element::{SyntheticElement, Widget};
pub use geometry::{Contour, Moments, PixelRect, Point, Size};
pub use layout::{FracRect, GridCell, LayoutGroup, LayoutRegion, LayoutTable, Placement};
#[cfg(feature = "ocr")]
pub use ocr::TesseractEngine;
pub use ocr::{OcrConfig, OcrEngine, Preprocess};
pub use page::{CalculatorPage, DisplayValue, PageOptions, PageState};
pub use profile::{CalculatorProfile, DisplayKind, ProfileName};
pub use result::{ProbeError, ProbeResult};
pub use scenario::{Outcome, Scenario, ScenarioReport, Step};
pub use wait::{WaitOptions, WaitResult};

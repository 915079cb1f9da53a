//! CanvasDriver - the browser automation boundary
//!
//! The page object only needs five capabilities from a browser: navigation,
//! element geometry, element visibility, element screenshots and a pointer
//! click at an offset inside an element. Keeping them behind a trait lets the
//! same page object run against chromium or an in-process fake canvas.
//!
//! Every call blocks the calling thread until the browser has answered.

use crate::geometry::{Point, Size};
use crate::result::ProbeResult;
use serde::{Deserialize, Serialize};

/// Element geometry as reported by the browser, in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ElementRect {
    /// Left edge in the viewport
    pub x: f64,
    /// Top edge in the viewport
    pub y: f64,
    /// Rendered width
    pub width: f64,
    /// Rendered height
    pub height: f64,
}

impl ElementRect {
    /// Create a new element rect
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rendered size in whole pixels, truncated
    #[must_use]
    pub fn pixel_size(&self) -> Size {
        Size::new(self.width.max(0.0) as u32, self.height.max(0.0) as u32)
    }

    /// Viewport coordinate of an offset from the element's top-left corner
    #[must_use]
    pub fn offset_to_viewport(&self, offset: Point) -> (f64, f64) {
        (self.x + f64::from(offset.x), self.y + f64::from(offset.y))
    }
}

/// Blocking browser automation driver
pub trait CanvasDriver {
    /// Navigate the page to a URL
    fn navigate(&mut self, url: &str) -> ProbeResult<()>;

    /// Location and rendered size of the element with this id
    fn element_rect(&self, element_id: &str) -> ProbeResult<ElementRect>;

    /// Whether the element with this id is displayed; a missing element counts
    /// as not visible
    fn is_element_visible(&self, element_id: &str) -> ProbeResult<bool>;

    /// PNG screenshot of the element with this id, at device resolution
    fn screenshot_element(&self, element_id: &str) -> ProbeResult<Vec<u8>>;

    /// Move the pointer to `offset` from the element's top-left corner and click
    fn click_at_offset(&mut self, element_id: &str, offset: Point) -> ProbeResult<()>;
}

impl<T: CanvasDriver + ?Sized> CanvasDriver for Box<T> {
    fn navigate(&mut self, url: &str) -> ProbeResult<()> {
        (**self).navigate(url)
    }

    fn element_rect(&self, element_id: &str) -> ProbeResult<ElementRect> {
        (**self).element_rect(element_id)
    }

    fn is_element_visible(&self, element_id: &str) -> ProbeResult<bool> {
        (**self).is_element_visible(element_id)
    }

    fn screenshot_element(&self, element_id: &str) -> ProbeResult<Vec<u8>> {
        (**self).screenshot_element(element_id)
    }

    fn click_at_offset(&mut self, element_id: &str, offset: Point) -> ProbeResult<()> {
        (**self).click_at_offset(element_id, offset)
    }
}

//! Synthetic Element
//!
//! A widget drawn inside the canvas, described only by its pixel location and
//! size. Geometry is held by value; the browser handle of the canvas is never
//! part of the element, callers pass the canvas capture in instead.

use crate::geometry::{Contour, PixelRect, Point, Size};
use crate::ocr::{self, OcrConfig, OcrEngine, Preprocess};
use crate::result::{ProbeError, ProbeResult};
use image::RgbaImage;
use serde::{Deserialize, Serialize};

/// A widget of the synthetic DOM
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntheticElement {
    id: String,
    location: Option<Point>,
    size: Option<Size>,
}

impl SyntheticElement {
    /// Create an element with no geometry yet
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            location: None,
            size: None,
        }
    }

    /// Create an element with location and size set
    #[must_use]
    pub fn positioned(id: impl Into<String>, location: Point, size: Size) -> Self {
        Self {
            id: id.into(),
            location: Some(location),
            size: Some(size),
        }
    }

    /// Element identifier
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Pixel location inside the canvas
    pub fn location(&self) -> ProbeResult<Point> {
        self.location.ok_or_else(|| ProbeError::ElementNotPositioned {
            id: self.id.clone(),
            attribute: "location",
        })
    }

    /// Set the pixel location
    pub fn set_location(&mut self, location: Point) {
        self.location = Some(location);
    }

    /// Pixel size
    pub fn size(&self) -> ProbeResult<Size> {
        self.size.ok_or_else(|| ProbeError::ElementNotPositioned {
            id: self.id.clone(),
            attribute: "size",
        })
    }

    /// Set the pixel size
    pub fn set_size(&mut self, size: Size) {
        self.size = Some(size);
    }

    /// Whether both location and size are set
    #[must_use]
    pub const fn is_positioned(&self) -> bool {
        self.location.is_some() && self.size.is_some()
    }

    /// Rectangle spanned by location and size
    pub fn rect(&self) -> ProbeResult<PixelRect> {
        let (location, size) = self.geometry("rectangle")?;
        Ok(PixelRect::new(location.x, location.y, size.width, size.height))
    }

    /// Rectangle contour, clockwise from the top-left corner
    pub fn contour(&self) -> ProbeResult<Contour> {
        let (location, size) = self.geometry("contour")?;
        Ok(Contour::rectangle(location, size))
    }

    /// Moment centroid of the contour, truncated toward zero
    pub fn centroid(&self) -> ProbeResult<Point> {
        let (location, size) = self.geometry("center")?;
        Contour::rectangle(location, size)
            .moments()
            .centroid()
            .ok_or_else(|| {
                ProbeError::geometry(&self.id, format!("center of a {size} element is undefined"))
            })
    }

    /// Bounding rectangle of the contour, as used for cropping
    pub fn bounding_rect(&self) -> ProbeResult<PixelRect> {
        Ok(self.contour()?.bounding_rect())
    }

    /// Crop this element out of a capture already scaled to canvas size
    ///
    /// The crop is clamped to the capture; an element entirely outside of it
    /// is a geometry error.
    pub fn crop(&self, canvas: &RgbaImage) -> ProbeResult<RgbaImage> {
        let rect = self.bounding_rect()?;
        let x0 = rect.x.max(0) as u32;
        let y0 = rect.y.max(0) as u32;
        let x1 = (i64::from(rect.x) + i64::from(rect.width)).clamp(0, i64::from(canvas.width()))
            as u32;
        let y1 = (i64::from(rect.y) + i64::from(rect.height)).clamp(0, i64::from(canvas.height()))
            as u32;
        if x0 >= x1 || y0 >= y1 {
            return Err(ProbeError::geometry(
                &self.id,
                format!(
                    "crop {rect:?} lies outside the {}x{} capture",
                    canvas.width(),
                    canvas.height()
                ),
            ));
        }
        Ok(image::imageops::crop_imm(canvas, x0, y0, x1 - x0, y1 - y0).to_image())
    }

    /// Crop, preprocess and recognize the text drawn inside this element
    pub fn read_text(
        &self,
        canvas: &RgbaImage,
        preprocess: Preprocess,
        engine: &dyn OcrEngine,
    ) -> ProbeResult<String> {
        let cropped = self.crop(canvas)?;
        let text = ocr::read_text(&cropped, preprocess, engine, &OcrConfig::digits())?;
        tracing::debug!(element = %self.id, ?preprocess, text = %text.trim(), "ocr");
        Ok(text)
    }

    fn geometry(&self, what: &str) -> ProbeResult<(Point, Size)> {
        match (self.location, self.size) {
            (Some(location), Some(size)) => Ok((location, size)),
            _ => Err(ProbeError::geometry(
                &self.id,
                format!("{what} cannot be calculated before location and size are set"),
            )),
        }
    }
}

/// Widget argument of click and lookup routines
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Widget {
    /// An element already resolved from the synthetic DOM
    Element(SyntheticElement),
    /// An identifier still to be resolved
    Id(String),
}

impl From<SyntheticElement> for Widget {
    fn from(element: SyntheticElement) -> Self {
        Self::Element(element)
    }
}

impl From<&SyntheticElement> for Widget {
    fn from(element: &SyntheticElement) -> Self {
        Self::Element(element.clone())
    }
}

impl From<&str> for Widget {
    fn from(id: &str) -> Self {
        Self::Id(id.to_string())
    }
}

impl From<String> for Widget {
    fn from(id: String) -> Self {
        Self::Id(id)
    }
}

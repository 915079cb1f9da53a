//! Canvas capture.
//!
//! Element screenshots come back at device resolution, which differs from
//! the rendered CSS size on high-density displays. Captures are always scaled
//! back to the rendered size so synthetic DOM coordinates apply to them.

use crate::driver::CanvasDriver;
use crate::element::SyntheticElement;
use crate::geometry::Size;
use crate::result::{ProbeError, ProbeResult};
use image::imageops::FilterType;
use image::RgbaImage;
use std::io::Cursor;

/// Decode a screenshot and scale it to exactly `canvas` pixels
pub fn decode_to_canvas(screenshot: &[u8], canvas: Size) -> ProbeResult<RgbaImage> {
    if screenshot.is_empty() {
        return Err(ProbeError::Screenshot {
            message: "empty screenshot".to_string(),
        });
    }
    if canvas.width == 0 || canvas.height == 0 {
        return Err(ProbeError::image(format!("cannot scale to a {canvas} canvas")));
    }
    let decoded = image::load_from_memory(screenshot)
        .map_err(|e| ProbeError::image(e.to_string()))?
        .to_rgba8();
    Ok(scale_to(decoded, canvas))
}

/// Scale a capture to `canvas` pixels with bilinear filtering; a capture
/// already at that size is returned untouched
#[must_use]
pub fn scale_to(capture: RgbaImage, canvas: Size) -> RgbaImage {
    if capture.dimensions() == (canvas.width, canvas.height) {
        return capture;
    }
    tracing::trace!(
        from = ?capture.dimensions(),
        to = %canvas,
        "scaling canvas capture"
    );
    image::imageops::resize(&capture, canvas.width, canvas.height, FilterType::Triangle)
}

/// Screenshot the canvas element and scale it to its rendered size
pub fn capture_canvas<D: CanvasDriver + ?Sized>(
    driver: &D,
    canvas_id: &str,
) -> ProbeResult<RgbaImage> {
    let size = driver.element_rect(canvas_id)?.pixel_size();
    let png = driver.screenshot_element(canvas_id)?;
    decode_to_canvas(&png, size)
}

/// Capture the canvas and crop one synthetic element out of it
pub fn capture_element<D: CanvasDriver + ?Sized>(
    driver: &D,
    canvas_id: &str,
    element: &SyntheticElement,
) -> ProbeResult<RgbaImage> {
    element.crop(&capture_canvas(driver, canvas_id)?)
}

/// Encode an image as PNG
pub fn encode_png(image: &RgbaImage) -> ProbeResult<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, image::ImageFormat::Png)
        .map_err(|e| ProbeError::image(e.to_string()))?;
    Ok(out.into_inner())
}

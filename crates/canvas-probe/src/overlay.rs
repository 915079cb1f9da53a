//! Debug overlay of the synthetic DOM.
//!
//! Draws every element's contour and a filled dot at its centroid onto a
//! canvas capture, to check by eye that a layout table lines up with what the
//! page actually renders.

use crate::dom::SyntheticDom;
use crate::geometry::{PixelRect, Point};
use image::{Rgba, RgbaImage};

/// Contour colour
pub const CONTOUR_COLOR: Rgba<u8> = Rgba([0, 255, 0, 255]);

/// Contour line thickness, in pixels
pub const CONTOUR_THICKNESS: u32 = 3;

/// Radius of the centroid dot, in pixels
pub const CENTER_RADIUS: i32 = 7;

/// Overlay drawing options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayStyle {
    /// Line and dot colour
    pub color: Rgba<u8>,
    /// Contour thickness
    pub thickness: u32,
    /// Centroid dot radius
    pub radius: i32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            color: CONTOUR_COLOR,
            thickness: CONTOUR_THICKNESS,
            radius: CENTER_RADIUS,
        }
    }
}

/// Copy of `capture` with every positioned element of `dom` drawn on it
#[must_use]
pub fn draw_dom(capture: &RgbaImage, dom: &SyntheticDom, style: OverlayStyle) -> RgbaImage {
    let mut out = capture.clone();
    for element in dom {
        let (Ok(rect), Ok(center)) = (element.rect(), element.centroid()) else {
            continue;
        };
        draw_rectangle_outline(&mut out, rect, style);
        draw_filled_circle(&mut out, center, style);
    }
    out
}

fn put(img: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>) {
    if x >= 0 && y >= 0 && x < i64::from(img.width()) && y < i64::from(img.height()) {
        img.put_pixel(x as u32, y as u32, color);
    }
}

/// Outline centred on the rectangle edges, `thickness` pixels wide
fn draw_rectangle_outline(img: &mut RgbaImage, rect: PixelRect, style: OverlayStyle) {
    let half = i64::from(style.thickness / 2);
    let x0 = i64::from(rect.x);
    let y0 = i64::from(rect.y);
    let x1 = x0 + i64::from(rect.width);
    let y1 = y0 + i64::from(rect.height);

    for t in -half..(i64::from(style.thickness) - half) {
        for x in (x0 - half)..=(x1 + half) {
            put(img, x, y0 + t, style.color);
            put(img, x, y1 + t, style.color);
        }
        for y in (y0 - half)..=(y1 + half) {
            put(img, x0 + t, y, style.color);
            put(img, x1 + t, y, style.color);
        }
    }
}

fn draw_filled_circle(img: &mut RgbaImage, center: Point, style: OverlayStyle) {
    let r = i64::from(style.radius);
    let (cx, cy) = (i64::from(center.x), i64::from(center.y));
    for dy in -r..=r {
        for dx in -r..=r {
            if dx * dx + dy * dy <= r * r {
                put(img, cx + dx, cy + dy, style.color);
            }
        }
    }
}

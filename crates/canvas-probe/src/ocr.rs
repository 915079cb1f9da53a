//! OCR over cropped widget captures.
//!
//! Captures are binarized before recognition. Which preprocessing works
//! depends on the skin: dark digits on a light display read best after a
//! fixed threshold, light digits on a dark display after inversion.

use crate::result::ProbeResult;
use image::{DynamicImage, GrayImage, Luma, RgbaImage};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default binarization cut-off for display crops
pub const DEFAULT_THRESHOLD: u8 = 127;

/// Image preparation before OCR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Preprocess {
    /// Grayscale, then `> threshold` becomes white and everything else black
    Threshold {
        /// Cut-off luma value
        threshold: u8,
    },
    /// Invert every colour channel
    Invert,
}

impl Preprocess {
    /// Fixed threshold at 127
    #[must_use]
    pub const fn threshold() -> Self {
        Self::Threshold {
            threshold: DEFAULT_THRESHOLD,
        }
    }

    /// Apply to a cropped capture
    #[must_use]
    pub fn apply(&self, image: &RgbaImage) -> DynamicImage {
        match *self {
            Self::Threshold { threshold } => DynamicImage::ImageLuma8(binarize(image, threshold)),
            Self::Invert => {
                let mut out = DynamicImage::ImageRgba8(image.clone());
                out.invert();
                out
            }
        }
    }
}

impl Default for Preprocess {
    fn default() -> Self {
        Self::threshold()
    }
}

/// Luma with OpenCV's `BGR2GRAY` fixed-point weights (0.299, 0.587, 0.114)
#[must_use]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    let weighted = u32::from(r) * 4899 + u32::from(g) * 9617 + u32::from(b) * 1868;
    ((weighted + (1 << 13)) >> 14) as u8
}

/// Grayscale and binarize: strictly black or white
#[must_use]
pub fn binarize(image: &RgbaImage, threshold: u8) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, _] = image.get_pixel(x, y).0;
        Luma([if luma(r, g, b) > threshold { 255 } else { 0 }])
    })
}

/// Engine settings for a recognition call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrConfig {
    /// Tesseract language
    pub lang: String,
    /// OCR engine mode (`--oem`)
    pub engine_mode: i32,
    /// Page segmentation mode (`--psm`)
    pub page_segmentation_mode: i32,
    /// Characters the engine may emit
    pub char_whitelist: Option<String>,
}

impl OcrConfig {
    /// Tesseract's `digits` set (sign and decimal point included), default
    /// engine, a single uniform block of text
    #[must_use]
    pub fn digits() -> Self {
        Self {
            lang: "eng".to_string(),
            engine_mode: 3,
            page_segmentation_mode: 6,
            char_whitelist: Some("0123456789-.".to_string()),
        }
    }

    /// Tesseract `-c` variables for this config
    #[must_use]
    pub fn config_variables(&self) -> HashMap<String, String> {
        self.char_whitelist
            .iter()
            .map(|w| ("tessedit_char_whitelist".to_string(), w.clone()))
            .collect()
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self::digits()
    }
}

/// Text recognition backend
pub trait OcrEngine {
    /// Recognize the text of a preprocessed image, returned unmodified
    fn recognize(&self, image: &DynamicImage, config: &OcrConfig) -> ProbeResult<String>;
}

impl<T: OcrEngine + ?Sized> OcrEngine for &T {
    fn recognize(&self, image: &DynamicImage, config: &OcrConfig) -> ProbeResult<String> {
        (**self).recognize(image, config)
    }
}

impl<T: OcrEngine + ?Sized> OcrEngine for Box<T> {
    fn recognize(&self, image: &DynamicImage, config: &OcrConfig) -> ProbeResult<String> {
        (**self).recognize(image, config)
    }
}

/// Preprocess a crop and recognize it
pub fn read_text(
    image: &RgbaImage,
    preprocess: Preprocess,
    engine: &dyn OcrEngine,
    config: &OcrConfig,
) -> ProbeResult<String> {
    let prepared = preprocess.apply(image);
    engine.recognize(&prepared, config)
}

#[cfg(feature = "ocr")]
mod tesseract {
    use super::{OcrConfig, OcrEngine};
    use crate::result::{ProbeError, ProbeResult};
    use image::{DynamicImage, ImageFormat};
    use rusty_tesseract::{Args, Image};

    /// OCR through the `tesseract` binary
    #[derive(Debug, Clone, Default)]
    pub struct TesseractEngine {
        dpi: Option<i32>,
    }

    impl TesseractEngine {
        /// Create an engine using tesseract's default resolution handling
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Tell tesseract the resolution of the captures
        #[must_use]
        pub const fn with_dpi(mut self, dpi: i32) -> Self {
            self.dpi = Some(dpi);
            self
        }

        fn args(&self, config: &OcrConfig) -> Args {
            Args {
                lang: config.lang.clone(),
                config_variables: config.config_variables(),
                dpi: self.dpi,
                psm: Some(config.page_segmentation_mode),
                oem: Some(config.engine_mode),
            }
        }
    }

    impl OcrEngine for TesseractEngine {
        fn recognize(&self, image: &DynamicImage, config: &OcrConfig) -> ProbeResult<String> {
            let ocr_err = |message: String| ProbeError::Ocr { message };

            let file = tempfile::Builder::new()
                .prefix("canvas-probe-")
                .suffix(".png")
                .tempfile()?;
            image
                .save_with_format(file.path(), ImageFormat::Png)
                .map_err(|e| ProbeError::image(e.to_string()))?;

            let input = Image::from_path(file.path().to_path_buf())
                .map_err(|e| ocr_err(e.to_string()))?;
            rusty_tesseract::image_to_string(&input, &self.args(config))
                .map_err(|e| ocr_err(e.to_string()))
        }
    }

}

#[cfg(feature = "ocr")]
pub use tesseract::TesseractEngine;

//! In-process stand-in for a calculator page.
//!
//! [`FakeCalculator`] renders a calculator onto an image following a layout
//! table, applies clicks to a tiny arithmetic engine and draws the display in
//! a 5x7 block font. [`GlyphOcr`] reads that font back. Together they let the
//! page object run end to end without a browser or tesseract.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use canvas_probe::capture::encode_png;
use canvas_probe::{
    CanvasDriver, ElementRect, LayoutTable, OcrConfig, OcrEngine, PixelRect, Point, ProbeError,
    ProbeResult, ProfileName, SyntheticDom,
};
use image::{DynamicImage, Rgba, RgbaImage};
use std::cell::Cell;

/// 5x7 block glyphs; every glyph has ink in all five columns and both the
/// first and last row
const FONT: [(char, [&str; 7]); 10] = [
    ('0', ["#####", "#...#", "#...#", "#...#", "#...#", "#...#", "#####"]),
    ('1', [".##..", "#.#..", "..#..", "..#..", "..#..", "..#..", "#####"]),
    ('2', ["#####", "....#", "....#", "#####", "#....", "#....", "#####"]),
    ('3', ["#####", "....#", "....#", ".####", "....#", "....#", "#####"]),
    ('4', ["#...#", "#...#", "#...#", "#####", "....#", "....#", "....#"]),
    ('5', ["#####", "#....", "#....", "#####", "....#", "....#", "#####"]),
    ('6', ["#####", "#....", "#....", "#####", "#...#", "#...#", "#####"]),
    ('7', ["#####", "....#", "....#", "...#.", "..#..", "..#..", "..#.."]),
    ('8', ["#####", "#...#", "#...#", "#####", "#...#", "#...#", "#####"]),
    ('9', ["#####", "#...#", "#...#", "#####", "....#", "....#", "#####"]),
];

const GLYPH_COLUMNS: u32 = 5;
const GLYPH_ROWS: u32 = 7;

fn glyph(c: char) -> Option<&'static [&'static str; 7]> {
    FONT.iter().find(|(g, _)| *g == c).map(|(_, rows)| rows)
}

/// Colours of one calculator skin
#[derive(Debug, Clone, Copy)]
pub struct Skin {
    pub background: Rgba<u8>,
    pub button: Rgba<u8>,
    pub display: Rgba<u8>,
    pub digits: Rgba<u8>,
}

impl Skin {
    /// Dark digits on a light display
    pub const LIGHT: Self = Self {
        background: Rgba([200, 200, 200, 255]),
        button: Rgba([170, 170, 190, 255]),
        display: Rgba([235, 240, 230, 255]),
        digits: Rgba([20, 20, 20, 255]),
    };

    /// Light digits on a dark display
    pub const DARK: Self = Self {
        background: Rgba([40, 40, 40, 255]),
        button: Rgba([70, 70, 80, 255]),
        display: Rgba([25, 25, 25, 255]),
        digits: Rgba([240, 240, 240, 255]),
    };

    pub const fn for_profile(name: ProfileName) -> Self {
        match name {
            ProfileName::OnlineCalculator => Self::LIGHT,
            ProfileName::Livecode => Self::DARK,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Op {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Op {
    fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            Self::Add => a + b,
            Self::Subtract => a - b,
            Self::Multiply => a * b,
            Self::Divide => a / b,
        }
    }
}

/// Immediate-execution four-function calculator
#[derive(Debug, Clone)]
pub struct Engine {
    display: String,
    accumulator: Option<f64>,
    pending: Option<Op>,
    fresh: bool,
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            display: "0".to_string(),
            accumulator: None,
            pending: None,
            fresh: true,
        }
    }
}

impl Engine {
    pub fn display(&self) -> &str {
        &self.display
    }

    fn current(&self) -> f64 {
        self.display.parse().unwrap_or(0.0)
    }

    fn show(&mut self, value: f64) {
        self.display = if value.fract() == 0.0 && value.abs() < 1e15 {
            format!("{}", value as i64)
        } else {
            format!("{value}")
        };
    }

    fn operator(&mut self, op: Op) {
        match (self.accumulator, self.pending) {
            (Some(acc), Some(pending)) if !self.fresh => {
                let result = pending.apply(acc, self.current());
                self.show(result);
                self.accumulator = Some(result);
            }
            _ => self.accumulator = Some(self.current()),
        }
        self.pending = Some(op);
        self.fresh = true;
    }

    /// Apply one key; returns false for keys the engine does not know
    pub fn press(&mut self, key: &str) -> bool {
        match key {
            d if d.len() == 1 && d.chars().all(|c| c.is_ascii_digit()) => {
                if self.fresh || self.display == "0" {
                    self.display = d.to_string();
                } else {
                    self.display.push_str(d);
                }
                self.fresh = false;
            }
            "dot" => {
                if self.fresh {
                    self.display = "0".to_string();
                    self.fresh = false;
                }
                if !self.display.contains('.') {
                    self.display.push('.');
                }
            }
            "plus" => self.operator(Op::Add),
            "minus" => self.operator(Op::Subtract),
            "multiply" => self.operator(Op::Multiply),
            "divide" => self.operator(Op::Divide),
            "equal" => {
                if let (Some(acc), Some(op)) = (self.accumulator, self.pending) {
                    let result = op.apply(acc, self.current());
                    self.show(result);
                }
                self.accumulator = None;
                self.pending = None;
                self.fresh = true;
            }
            "sign" => {
                let v = -self.current();
                self.show(v);
            }
            "percent" => {
                let v = self.current() / 100.0;
                self.show(v);
            }
            "clear" => *self = Self::default(),
            _ => return false,
        }
        true
    }
}

/// Browser stand-in serving one calculator canvas
#[derive(Debug)]
pub struct FakeCalculator {
    layout: LayoutTable,
    skin: Skin,
    canvas: ElementRect,
    device_scale: u32,
    engine: Engine,
    /// URLs navigated to
    pub urls: Vec<String>,
    /// Keys hit by clicks, in order; `None` for clicks outside every button
    pub presses: Vec<Option<String>>,
    /// Polls left before the spinner disappears
    pub spinner_polls: Cell<u32>,
    /// Number of screenshots taken
    pub screenshots: Cell<u32>,
}

impl FakeCalculator {
    pub fn new(profile: ProfileName, layout: LayoutTable, width: f64, height: f64) -> Self {
        Self {
            layout,
            skin: Skin::for_profile(profile),
            canvas: ElementRect::new(8.0, 120.0, width, height),
            device_scale: 1,
            engine: Engine::default(),
            urls: Vec::new(),
            presses: Vec::new(),
            spinner_polls: Cell::new(0),
            screenshots: Cell::new(0),
        }
    }

    /// Render screenshots at `scale` device pixels per CSS pixel
    pub fn with_device_scale(mut self, scale: u32) -> Self {
        self.device_scale = scale;
        self
    }

    /// Keep the loading spinner visible for `polls` visibility checks
    pub fn with_spinner_polls(self, polls: u32) -> Self {
        self.spinner_polls.set(polls);
        self
    }

    /// Change the rendered canvas size, as a window resize would
    pub fn resize(&mut self, width: f64, height: f64) {
        self.canvas.width = width;
        self.canvas.height = height;
    }

    pub fn display(&self) -> &str {
        self.engine.display()
    }

    pub fn pressed_keys(&self) -> Vec<String> {
        self.presses.iter().flatten().cloned().collect()
    }

    fn dom(&self) -> SyntheticDom {
        self.layout.resolve(self.canvas.pixel_size())
    }

    fn check_canvas(&self, element_id: &str) -> ProbeResult<()> {
        if element_id == "canvas" {
            Ok(())
        } else {
            Err(ProbeError::driver(format!("no element #{element_id}")))
        }
    }

    fn render(&self) -> RgbaImage {
        let s = self.device_scale;
        let size = self.canvas.pixel_size();
        let mut img = RgbaImage::from_pixel(size.width * s, size.height * s, self.skin.background);
        let dom = self.dom();

        for element in &dom {
            let Ok(rect) = element.rect() else { continue };
            if element.id().starts_with("btn_") {
                // leave a 2px gutter so neighbouring buttons stay apart
                let inset = PixelRect::new(
                    rect.x + 2,
                    rect.y + 2,
                    rect.width.saturating_sub(4),
                    rect.height.saturating_sub(4),
                );
                fill(&mut img, inset, s, self.skin.button);
            } else if element.id() == "display" {
                fill(&mut img, rect, s, self.skin.display);
                self.draw_text(&mut img, rect);
            }
        }
        img
    }

    fn draw_text(&self, img: &mut RgbaImage, display: PixelRect) {
        let cell = (display.height / 12).max(2);
        let glyph_height = GLYPH_ROWS * cell;
        let pitch = (GLYPH_COLUMNS + 1) * cell;
        let text = self.engine.display();
        let width = pitch * text.chars().count() as u32;

        let right = display.x + display.width as i32 - 2 * cell as i32;
        let mut x = right - width as i32 + cell as i32;
        let y = display.y + (display.height as i32 - glyph_height as i32) / 2;

        for c in text.chars() {
            if let Some(rows) = glyph(c) {
                for (row, line) in rows.iter().enumerate() {
                    for (col, bit) in line.chars().enumerate() {
                        if bit == '#' {
                            let px = PixelRect::new(
                                x + (col as u32 * cell) as i32,
                                y + (row as u32 * cell) as i32,
                                cell,
                                cell,
                            );
                            fill(img, px, self.device_scale, self.skin.digits);
                        }
                    }
                }
            }
            x += pitch as i32;
        }
    }
}

fn fill(img: &mut RgbaImage, rect: PixelRect, scale: u32, color: Rgba<u8>) {
    let x0 = rect.x.max(0) as u32 * scale;
    let y0 = rect.y.max(0) as u32 * scale;
    let x1 = ((rect.x.max(0) as u32 + rect.width) * scale).min(img.width());
    let y1 = ((rect.y.max(0) as u32 + rect.height) * scale).min(img.height());
    for y in y0..y1 {
        for x in x0..x1 {
            img.put_pixel(x, y, color);
        }
    }
}

impl CanvasDriver for FakeCalculator {
    fn navigate(&mut self, url: &str) -> ProbeResult<()> {
        self.urls.push(url.to_string());
        self.engine = Engine::default();
        Ok(())
    }

    fn element_rect(&self, element_id: &str) -> ProbeResult<ElementRect> {
        self.check_canvas(element_id)?;
        Ok(self.canvas)
    }

    fn is_element_visible(&self, element_id: &str) -> ProbeResult<bool> {
        match element_id {
            "canvas" => Ok(true),
            "spinner" => {
                let left = self.spinner_polls.get();
                self.spinner_polls.set(left.saturating_sub(1));
                Ok(left > 0)
            }
            _ => Ok(false),
        }
    }

    fn screenshot_element(&self, element_id: &str) -> ProbeResult<Vec<u8>> {
        self.check_canvas(element_id)?;
        self.screenshots.set(self.screenshots.get() + 1);
        encode_png(&self.render())
    }

    fn click_at_offset(&mut self, element_id: &str, offset: Point) -> ProbeResult<()> {
        self.check_canvas(element_id)?;
        let dom = self.dom();
        let key = dom
            .iter()
            .filter(|e| e.id().starts_with("btn_"))
            .find(|e| e.rect().is_ok_and(|r| r.contains(offset)))
            .map(|e| e.id().trim_start_matches("btn_").to_string());
        if let Some(ref key) = key {
            self.engine.press(key);
        }
        self.presses.push(key);
        Ok(())
    }
}

/// Reads the block font drawn by [`FakeCalculator`]
///
/// Expects dark glyphs on a light background, which is what both display
/// preprocessing modes produce for the two skins.
#[derive(Debug, Default)]
pub struct GlyphOcr;

impl GlyphOcr {
    fn classify(ink: &[Vec<bool>], x0: usize, x1: usize) -> Option<char> {
        let rows: Vec<usize> = (0..ink.len())
            .filter(|&y| (x0..=x1).any(|x| ink[y][x]))
            .collect();
        let (&y0, &y1) = (rows.first()?, rows.last()?);
        let cell_w = (x1 - x0 + 1) as f64 / f64::from(GLYPH_COLUMNS);
        let cell_h = (y1 - y0 + 1) as f64 / f64::from(GLYPH_ROWS);

        let sample: Vec<Vec<bool>> = (0..GLYPH_ROWS)
            .map(|r| {
                (0..GLYPH_COLUMNS)
                    .map(|c| {
                        let x = x0 + ((f64::from(c) + 0.5) * cell_w) as usize;
                        let y = y0 + ((f64::from(r) + 0.5) * cell_h) as usize;
                        ink[y][x]
                    })
                    .collect()
            })
            .collect();

        FONT.iter()
            .map(|(c, rows)| {
                let distance: usize = rows
                    .iter()
                    .zip(&sample)
                    .map(|(line, bits)| {
                        line.chars()
                            .zip(bits)
                            .filter(|(bit, ink)| (*bit == '#') != **ink)
                            .count()
                    })
                    .sum();
                (distance, *c)
            })
            .min()
            .map(|(_, c)| c)
    }
}

impl OcrEngine for GlyphOcr {
    fn recognize(&self, image: &DynamicImage, config: &OcrConfig) -> ProbeResult<String> {
        let luma = image.to_luma8();
        let (w, h) = (luma.width() as usize, luma.height() as usize);
        let ink: Vec<Vec<bool>> = (0..h)
            .map(|y| (0..w).map(|x| luma.get_pixel(x as u32, y as u32).0[0] < 128).collect())
            .collect();
        let column_has_ink = |x: usize| (0..h).any(|y| ink[y][x]);

        let mut text = String::new();
        let mut x = 0;
        while x < w {
            if !column_has_ink(x) {
                x += 1;
                continue;
            }
            let start = x;
            while x < w && column_has_ink(x) {
                x += 1;
            }
            if let Some(c) = Self::classify(&ink, start, x - 1) {
                let allowed = config
                    .char_whitelist
                    .as_ref()
                    .map_or(true, |list| list.contains(c));
                if allowed {
                    text.push(c);
                }
            }
        }
        text.push('\n');
        Ok(text)
    }
}

/// Engine-level sanity check used by the support tests
pub fn engine_after(keys: &[&str]) -> String {
    let mut engine = Engine::default();
    for key in keys {
        assert!(engine.press(key), "unknown key {key}");
    }
    engine.display().to_string()
}

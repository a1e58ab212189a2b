use std::path::Path;

use glam::Vec3;
use image::{DynamicImage, GrayImage, Luma};
use rand::Rng;

use crate::{config::GlyphConfig, Result};

const FONT_WIDTH: u32 = 3;
const FONT_HEIGHT: u32 = 5;
/// Fraction of the canvas the rendered text may cover along either axis.
const CANVAS_FILL: f32 = 0.8;

/// Canvas pixels whose brightness passed the threshold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlyphMask {
    width: u32,
    height: u32,
    pixels: Vec<(u32, u32)>,
}

impl GlyphMask {
    /// Collects every pixel of `canvas` brighter than `threshold`.
    pub fn from_canvas(canvas: &GrayImage, threshold: u8) -> Self {
        let pixels = canvas
            .enumerate_pixels()
            .filter(|(_, _, pixel)| pixel.0[0] > threshold)
            .map(|(x, y, _)| (x, y))
            .collect();

        Self {
            width: canvas.width(),
            height: canvas.height(),
            pixels,
        }
    }

    pub fn from_image(image: &DynamicImage, threshold: u8) -> Self {
        Self::from_canvas(&image.to_luma8(), threshold)
    }

    pub fn from_image_path(path: impl AsRef<Path>, threshold: u8) -> Result<Self> {
        let image = image::open(path)?;
        Ok(Self::from_image(&image, threshold))
    }

    /// Draws `text` with the built-in bitmap font, centred on a canvas of the
    /// configured size, and thresholds the result.
    pub fn rasterize_text(text: &str, config: &GlyphConfig) -> Self {
        let canvas = render_text(text, config.canvas_width, config.canvas_height);
        Self::from_canvas(&canvas, config.threshold)
    }

    /// Builds the mask described by `config`: the image file when one is set,
    /// otherwise the configured text.
    pub fn from_config(config: &GlyphConfig) -> Result<Self> {
        let mask = match &config.image_path {
            Some(path) => Self::from_image_path(path, config.threshold)?,
            None => Self::rasterize_text(&config.text, config),
        };

        if mask.is_empty() {
            tracing::warn!(
                text = %config.text,
                image = ?config.image_path,
                "glyph mask is empty; glyph targets collapse to the origin"
            );
        } else {
            tracing::debug!(pixels = mask.len(), "glyph mask ready");
        }

        Ok(mask)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[(u32, u32)] {
        &self.pixels
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Maps a canvas pixel into the glyph plane: centred on the origin, `y`
    /// pointing up, `scale` world units per pixel.
    pub fn to_world(&self, (px, py): (u32, u32), scale: f32) -> Vec3 {
        let x = (px as f32 - self.width as f32 / 2.0) * scale;
        let y = -(py as f32 - self.height as f32 / 2.0) * scale;
        Vec3::new(x, y, 0.0)
    }

    /// Picks one mask pixel uniformly (with replacement) and returns its
    /// world position with a random depth offset. `None` for an empty mask.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        scale: f32,
        depth_jitter: f32,
    ) -> Option<Vec3> {
        if self.pixels.is_empty() {
            return None;
        }

        let pixel = self.pixels[rng.random_range(0..self.pixels.len())];
        let mut point = self.to_world(pixel, scale);
        if depth_jitter > 0.0 {
            point.z = rng.random_range(-depth_jitter..depth_jitter);
        }
        Some(point)
    }
}

fn render_text(text: &str, width: u32, height: u32) -> GrayImage {
    let mut canvas = GrayImage::new(width, height);
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() || width == 0 || height == 0 {
        return canvas;
    }

    // 3 columns per character plus a 1 column gap between characters.
    let columns = chars.len() as u32 * (FONT_WIDTH + 1) - 1;
    let cell = ((width as f32 * CANVAS_FILL) / columns as f32)
        .min((height as f32 * CANVAS_FILL) / FONT_HEIGHT as f32)
        .floor()
        .max(1.0) as u32;

    let text_width = columns * cell;
    let text_height = FONT_HEIGHT * cell;
    let origin_x = width.saturating_sub(text_width) / 2;
    let origin_y = height.saturating_sub(text_height) / 2;

    for (index, ch) in chars.iter().enumerate() {
        let left = origin_x + index as u32 * (FONT_WIDTH + 1) * cell;
        for (row, bits) in font_rows(*ch).iter().enumerate() {
            for col in 0..FONT_WIDTH {
                if bits & (1 << (FONT_WIDTH - 1 - col)) == 0 {
                    continue;
                }
                let x0 = left + col * cell;
                let y0 = origin_y + row as u32 * cell;
                fill_block(&mut canvas, x0, y0, cell);
            }
        }
    }

    canvas
}

fn fill_block(canvas: &mut GrayImage, x0: u32, y0: u32, size: u32) {
    for y in y0..(y0 + size).min(canvas.height()) {
        for x in x0..(x0 + size).min(canvas.width()) {
            canvas.put_pixel(x, y, Luma([255]));
        }
    }
}

/// 3x5 bitmap font, one byte per row, most significant of the low three bits
/// on the left.
fn font_rows(c: char) -> [u8; 5] {
    match c.to_ascii_uppercase() {
        'A' => [0b010, 0b101, 0b111, 0b101, 0b101],
        'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'C' => [0b011, 0b100, 0b100, 0b100, 0b011],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b110, 0b100, 0b111],
        'F' => [0b111, 0b100, 0b110, 0b100, 0b100],
        'G' => [0b011, 0b100, 0b101, 0b101, 0b011],
        'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'J' => [0b001, 0b001, 0b001, 0b101, 0b010],
        'K' => [0b101, 0b110, 0b100, 0b110, 0b101],
        'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'M' => [0b101, 0b111, 0b111, 0b101, 0b101],
        'N' => [0b110, 0b101, 0b101, 0b101, 0b101],
        'O' => [0b010, 0b101, 0b101, 0b101, 0b010],
        'P' => [0b110, 0b101, 0b110, 0b100, 0b100],
        'Q' => [0b010, 0b101, 0b101, 0b110, 0b011],
        'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        'S' => [0b011, 0b100, 0b010, 0b001, 0b110],
        'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'V' => [0b101, 0b101, 0b101, 0b101, 0b010],
        'W' => [0b101, 0b101, 0b111, 0b111, 0b101],
        'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'Y' => [0b101, 0b101, 0b010, 0b010, 0b010],
        'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b110, 0b001, 0b010, 0b100, 0b111],
        '3' => [0b110, 0b001, 0b010, 0b001, 0b110],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b110, 0b001, 0b110],
        '6' => [0b011, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b010, 0b010, 0b010],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b110],
        '!' => [0b010, 0b010, 0b010, 0b000, 0b010],
        '?' => [0b110, 0b001, 0b010, 0b000, 0b010],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        '*' => [0b101, 0b010, 0b101, 0b000, 0b000],
        '<' => [0b001, 0b010, 0b100, 0b010, 0b001],
        '>' => [0b100, 0b010, 0b001, 0b010, 0b100],
        _ => [0; 5],
    }
}

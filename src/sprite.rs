//! Sprite decoding and half-block rendering.
//!
//! A terminal cell holds two stacked pixels: the upper one as the `▀`
//! foreground and the lower one as its background.

use image::{imageops, DynamicImage, RgbaImage};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// Pixels with less alpha than this are drawn as background.
const ALPHA_CUTOFF: u8 = 128;
const MAX_EDGE: u32 = 256;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteData {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 4]>,
}

impl SpriteData {
    pub fn from_rgba(image: &RgbaImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            pixels: image.pixels().map(|pixel| pixel.0).collect(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn sample(&self, x: u64, y: u64) -> Option<Color> {
        let index = y * u64::from(self.width) + x;
        let [r, g, b, a] = self.pixels.get(usize::try_from(index).ok()?).copied()?;
        (a >= ALPHA_CUTOFF).then_some(Color::Rgb(r, g, b))
    }

    /// Scale the sprite to `cols` x `rows` cells by nearest-neighbour sampling.
    pub fn half_blocks(&self, cols: u16, rows: u16) -> Vec<Line<'static>> {
        if self.width == 0 || self.height == 0 {
            return Vec::new();
        }
        let cols = u64::from(cols.max(1));
        let rows = u64::from(rows.max(1));
        let (width, height) = (u64::from(self.width), u64::from(self.height));
        (0..rows)
            .map(|row| {
                let top_y = (2 * row) * height / (2 * rows);
                let bottom_y = (2 * row + 1) * height / (2 * rows);
                let spans: Vec<Span<'static>> = (0..cols)
                    .map(|col| {
                        let x = col * width / cols;
                        cell(self.sample(x, top_y), self.sample(x, bottom_y))
                    })
                    .collect();
                Line::from(spans)
            })
            .collect()
    }
}

fn cell(top: Option<Color>, bottom: Option<Color>) -> Span<'static> {
    match (top, bottom) {
        (None, None) => Span::raw(" "),
        (Some(top), None) => Span::styled("▀", Style::default().fg(top)),
        (None, Some(bottom)) => Span::styled("▄", Style::default().fg(bottom)),
        (Some(top), Some(bottom)) => Span::styled("▀", Style::default().fg(top).bg(bottom)),
    }
}

/// Decode image bytes fetched from `url`, dropping the transparent margin
/// PokeAPI sprites carry.
pub fn decode_sprite(bytes: &[u8], url: &str) -> Result<SpriteData, FetchError> {
    let image = image::load_from_memory(bytes).map_err(|err| FetchError::Decode {
        url: url.to_string(),
        message: err.to_string(),
    })?;
    let image = if image.width() > MAX_EDGE || image.height() > MAX_EDGE {
        image.thumbnail(MAX_EDGE, MAX_EDGE)
    } else {
        image
    };
    Ok(SpriteData::from_rgba(&trim_transparent(image)))
}

fn trim_transparent(image: DynamicImage) -> RgbaImage {
    let image = image.to_rgba8();
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for (x, y, pixel) in image.enumerate_pixels() {
        if pixel.0[3] < ALPHA_CUTOFF {
            continue;
        }
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((left, top, right, bottom)) => {
                (left.min(x), top.min(y), right.max(x), bottom.max(y))
            }
        });
    }
    match bounds {
        Some((left, top, right, bottom)) => {
            imageops::crop_imm(&image, left, top, right - left + 1, bottom - top + 1).to_image()
        }
        None => image,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba};
    use std::io::Cursor;

    const RED: Rgba<u8> = Rgba([220, 40, 40, 255]);
    const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

    fn png(image: RgbaImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(image)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn decode_trims_transparent_margin() {
        // 2x3 opaque block inside a 10x10 transparent canvas
        let image = RgbaImage::from_fn(10, 10, |x, y| {
            if (4..6).contains(&x) && (3..6).contains(&y) {
                RED
            } else {
                CLEAR
            }
        });
        let sprite = decode_sprite(&png(image), "https://img.test/1.png").unwrap();
        assert_eq!((sprite.width(), sprite.height()), (2, 3));
    }

    #[test]
    fn fully_transparent_image_is_kept() {
        let sprite =
            decode_sprite(&png(RgbaImage::from_pixel(4, 4, CLEAR)), "https://img.test/0.png")
                .unwrap();
        assert_eq!((sprite.width(), sprite.height()), (4, 4));
    }

    #[test]
    fn garbage_bytes_are_a_decode_error() {
        let result = decode_sprite(b"not an image", "https://img.test/2.png");
        assert!(matches!(result, Err(FetchError::Decode { .. })));
    }

    #[test]
    fn half_blocks_pair_rows() {
        // top row red, bottom row transparent
        let image = RgbaImage::from_fn(2, 2, |_, y| if y == 0 { RED } else { CLEAR });
        let lines = SpriteData::from_rgba(&image).half_blocks(2, 1);
        assert_eq!(lines.len(), 1);
        let symbols: String = lines[0].spans.iter().map(|span| span.content.as_ref()).collect();
        assert_eq!(symbols, "▀▀");
        assert_eq!(lines[0].spans[0].style.fg, Some(Color::Rgb(220, 40, 40)));
        assert_eq!(lines[0].spans[0].style.bg, None);
    }

    #[test]
    fn half_blocks_lower_only_and_empty() {
        let image = RgbaImage::from_fn(2, 2, |x, y| if x == 0 && y == 1 { RED } else { CLEAR });
        let lines = SpriteData::from_rgba(&image).half_blocks(2, 1);
        let symbols: String = lines[0].spans.iter().map(|span| span.content.as_ref()).collect();
        assert_eq!(symbols, "▄ ");
    }
}

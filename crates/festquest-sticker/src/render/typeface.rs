//! Fonts used on stickers.
//!
//! TrueType fonts are rasterized with `rusttype`. When a font file is
//! missing or unreadable the built-in 5x7 bitmap face is used instead, so
//! text drawing never fails.

use std::fmt;
use std::path::Path;

use image::{Rgba, RgbaImage};
use rusttype::{Font, Scale, point};
use tracing::warn;

use super::blend_over;

/// Default bold face on Debian-based hosts.
pub const DEFAULT_BOLD_FONT: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf";
/// Default regular face on Debian-based hosts.
pub const DEFAULT_REGULAR_FONT: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf";

/// A face that can measure and draw a single line of text.
#[derive(Clone)]
pub enum Typeface {
    /// Scalable outline font.
    Outline(Font<'static>),
    /// Built-in blocky face; ASCII only, other characters render as boxes.
    Bitmap,
}

impl fmt::Debug for Typeface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Outline(_) => f.write_str("Typeface::Outline"),
            Self::Bitmap => f.write_str("Typeface::Bitmap"),
        }
    }
}

impl Typeface {
    /// Loads a TrueType/OpenType file, falling back to the bitmap face.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "font not readable; using bitmap face");
                return Self::Bitmap;
            }
        };
        match Font::try_from_vec(bytes) {
            Some(font) => Self::Outline(font),
            None => {
                warn!(path = %path.display(), "font not parseable; using bitmap face");
                Self::Bitmap
            }
        }
    }

    /// Horizontal advance of `text` at `px` pixels.
    #[must_use]
    pub fn text_width(&self, px: f32, text: &str) -> f32 {
        match self {
            Self::Outline(font) => {
                let scale = Scale::uniform(px);
                font.layout(text, scale, point(0.0, 0.0))
                    .last()
                    .map_or(0.0, |g| g.position().x + g.unpositioned().h_metrics().advance_width)
            }
            Self::Bitmap => {
                #[allow(clippy::cast_precision_loss)]
                let chars = text.chars().count() as f32;
                chars * bitmap::advance(px)
            }
        }
    }

    /// Draws `text` with its top-left corner at (`x`, `y`).
    pub fn draw_text(
        &self,
        canvas: &mut RgbaImage,
        px: f32,
        x: i32,
        y: i32,
        color: Rgba<u8>,
        text: &str,
    ) {
        let mut plot = |cx: i32, cy: i32, coverage: f32| {
            let (Ok(cx), Ok(cy)) = (u32::try_from(cx), u32::try_from(cy)) else {
                return;
            };
            if let Some(dst) = canvas.get_pixel_mut_checked(cx, cy) {
                blend_over(dst, color, coverage);
            }
        };
        match self {
            Self::Outline(font) => {
                let scale = Scale::uniform(px);
                let ascent = font.v_metrics(scale).ascent;
                #[allow(clippy::cast_precision_loss)]
                let origin = point(x as f32, y as f32 + ascent);
                for glyph in font.layout(text, scale, origin) {
                    if let Some(bb) = glyph.pixel_bounding_box() {
                        #[allow(clippy::cast_possible_wrap)]
                        glyph.draw(|gx, gy, v| plot(gx as i32 + bb.min.x, gy as i32 + bb.min.y, v));
                    }
                }
            }
            Self::Bitmap => bitmap::draw(px, x, y, text, &mut plot),
        }
    }
}

/// The bold and regular faces used by the template renderer.
#[derive(Debug, Clone)]
pub struct Fonts {
    /// Face for the tagline.
    pub bold: Typeface,
    /// Face for the brand line.
    pub regular: Typeface,
}

impl Fonts {
    /// Loads both faces from disk, each falling back independently.
    #[must_use]
    pub fn load(bold: &Path, regular: &Path) -> Self {
        Self {
            bold: Typeface::load(bold),
            regular: Typeface::load(regular),
        }
    }

    /// Bitmap faces only; needs no files.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            bold: Typeface::Bitmap,
            regular: Typeface::Bitmap,
        }
    }
}

mod bitmap {
    //! 5x7 pixel face covering digits, Latin capitals and common punctuation.

    const ROWS: usize = 7;
    const COLS: i32 = 5;

    // Each row is 5 bits wide, most significant bit on the left.
    const UNKNOWN: [u8; ROWS] = [0x1F, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1F];

    fn glyph(c: char) -> [u8; ROWS] {
        match c.to_ascii_uppercase() {
            ' ' => [0; ROWS],
            '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
            '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
            '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
            '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
            '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
            '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
            '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
            '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
            '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
            '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
            'A' => [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
            'B' => [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E],
            'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
            'D' => [0x1C, 0x12, 0x11, 0x11, 0x11, 0x12, 0x1C],
            'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
            'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
            'G' => [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F],
            'H' => [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
            'I' => [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
            'J' => [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C],
            'K' => [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11],
            'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
            'M' => [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
            'N' => [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11],
            'O' => [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
            'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
            'Q' => [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D],
            'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
            'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
            'T' => [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
            'U' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
            'V' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04],
            'W' => [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A],
            'X' | '×' => [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11],
            'Y' => [0x11, 0x11, 0x11, 0x0A, 0x04, 0x04, 0x04],
            'Z' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F],
            '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
            ',' => [0x00, 0x00, 0x00, 0x00, 0x0C, 0x04, 0x08],
            ':' => [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00],
            '!' => [0x04, 0x04, 0x04, 0x04, 0x04, 0x00, 0x04],
            '?' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x00, 0x04],
            '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
            '\'' => [0x0C, 0x04, 0x08, 0x00, 0x00, 0x00, 0x00],
            '&' => [0x0C, 0x12, 0x14, 0x08, 0x15, 0x12, 0x0D],
            '/' => [0x00, 0x01, 0x02, 0x04, 0x08, 0x10, 0x00],
            _ => UNKNOWN,
        }
    }

    /// Size of one font pixel for a requested line height.
    #[allow(clippy::cast_possible_truncation)]
    fn cell(px: f32) -> i32 {
        ((px / 8.0).round() as i32).max(1)
    }

    #[allow(clippy::cast_precision_loss)]
    pub(super) fn advance(px: f32) -> f32 {
        ((COLS + 1) * cell(px)) as f32
    }

    pub(super) fn draw(px: f32, x: i32, y: i32, text: &str, plot: &mut impl FnMut(i32, i32, f32)) {
        let cell = cell(px);
        let mut left = x;
        for c in text.chars() {
            for (row, bits) in (0..).zip(glyph(c)) {
                for col in 0..COLS {
                    if bits & (0x10 >> col) == 0 {
                        continue;
                    }
                    for dy in 0..cell {
                        for dx in 0..cell {
                            plot(left + col * cell + dx, y + row * cell + dy, 1.0);
                        }
                    }
                }
            }
            left += (COLS + 1) * cell;
        }
    }
}

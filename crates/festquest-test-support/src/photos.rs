//! Encoded sample images for imaging tests.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), format)
        .expect("in-memory encode should not fail");
    bytes
}

/// A PNG of `width` x `height` filled with `color`.
///
/// # Panics
///
/// Panics if encoding fails.
#[must_use]
pub fn solid_png(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    let image = RgbaImage::from_pixel(width, height, Rgba(color));
    encode(DynamicImage::ImageRgba8(image), ImageFormat::Png)
}

/// A JPEG of `width` x `height` filled with the RGB `color`.
///
/// # Panics
///
/// Panics if encoding fails.
#[must_use]
pub fn solid_jpeg(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
    let image = RgbaImage::from_pixel(width, height, Rgba([color[0], color[1], color[2], 255]));
    encode(
        DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(image).to_rgb8()),
        ImageFormat::Jpeg,
    )
}

/// A PNG that looks like a background-removal result: fully transparent
/// except for an opaque `color` disc centred in the frame.
///
/// # Panics
///
/// Panics if encoding fails.
#[must_use]
pub fn cutout_png(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
    let cx = f64::from(width) / 2.0;
    let cy = f64::from(height) / 2.0;
    let radius = cx.min(cy) * 0.8;
    let image = RgbaImage::from_fn(width, height, |x, y| {
        let dx = f64::from(x) + 0.5 - cx;
        let dy = f64::from(y) + 0.5 - cy;
        if dx * dx + dy * dy <= radius * radius {
            Rgba([color[0], color[1], color[2], 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    });
    encode(DynamicImage::ImageRgba8(image), ImageFormat::Png)
}

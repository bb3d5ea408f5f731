//! Compositor: puts the guest's photo on a rendered template and encodes the
//! result.

use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::{self, FilterType};
use image::{DynamicImage, ExtendedColorType, ImageEncoder, RgbaImage};

use super::blend_over;
use super::template::render_template;
use super::typeface::Fonts;
use crate::domain::errors::StickerError;
use crate::domain::layout::{CompositeMode, Placement, Size, place};
use crate::domain::template::TemplateDescriptor;

/// Decodes an uploaded photo or cutout (PNG, JPEG or WebP).
///
/// # Errors
///
/// Returns `StickerError::EmptyPhoto` for an empty buffer and
/// `StickerError::ImageProcessing` if the bytes are not a supported image.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, StickerError> {
    if bytes.is_empty() {
        return Err(StickerError::EmptyPhoto);
    }
    Ok(image::load_from_memory(bytes)?)
}

fn premultiply(layer: &mut RgbaImage) {
    for pixel in layer.pixels_mut() {
        let alpha = u32::from(pixel.0[3]);
        for channel in &mut pixel.0[..3] {
            *channel = u8::try_from((u32::from(*channel) * alpha + 127) / 255).unwrap_or(u8::MAX);
        }
    }
}

fn unpremultiply(layer: &mut RgbaImage) {
    for pixel in layer.pixels_mut() {
        let alpha = u32::from(pixel.0[3]);
        if alpha == 0 {
            pixel.0 = [0, 0, 0, 0];
            continue;
        }
        for channel in &mut pixel.0[..3] {
            *channel = u8::try_from((u32::from(*channel) * 255 + alpha / 2) / alpha).unwrap_or(u8::MAX);
        }
    }
}

/// Scales `layer` into the region for `mode`. Resampling runs on
/// premultiplied colour so transparent pixels do not bleed into edges.
fn fit(mut layer: RgbaImage, mode: CompositeMode) -> (RgbaImage, Placement) {
    let placement = place(Size::new(layer.width(), layer.height()), mode);
    let Size { width, height } = placement.size;
    if (width, height) == layer.dimensions() {
        return (layer, placement);
    }
    premultiply(&mut layer);
    let mut scaled = imageops::resize(&layer, width, height, FilterType::Lanczos3);
    unpremultiply(&mut scaled);
    (scaled, placement)
}

fn overlay(canvas: &mut RgbaImage, layer: &RgbaImage, x: u32, y: u32) {
    for (lx, ly, pixel) in layer.enumerate_pixels() {
        if let Some(dst) = canvas.get_pixel_mut_checked(x + lx, y + ly) {
            blend_over(dst, *pixel, 1.0);
        }
    }
}

/// Clears every pixel outside the ellipse inscribed in the image bounds.
fn mask_ellipse(layer: &mut RgbaImage) {
    let rx = f64::from(layer.width()) / 2.0;
    let ry = f64::from(layer.height()) / 2.0;
    for (x, y, pixel) in layer.enumerate_pixels_mut() {
        let dx = (f64::from(x) + 0.5 - rx) / rx;
        let dy = (f64::from(y) + 0.5 - ry) / ry;
        if dx * dx + dy * dy > 1.0 {
            pixel.0[3] = 0;
        }
    }
}

/// Pastes a background-removed subject onto a cutout-mode canvas, honouring
/// the subject's own transparency.
pub fn composite_cutout(canvas: &mut RgbaImage, cutout: &DynamicImage) -> Placement {
    let (layer, placement) = fit(cutout.to_rgba8(), CompositeMode::Cutout);
    overlay(canvas, &layer, placement.x, placement.y);
    placement
}

/// Pastes an elliptical crop of the original photo onto a fallback-mode
/// canvas. The photo is flattened first; the ellipse is the only
/// transparency in the pasted layer.
pub fn composite_fallback(canvas: &mut RgbaImage, photo: &DynamicImage) -> Placement {
    let opaque = DynamicImage::ImageRgb8(photo.to_rgb8()).to_rgba8();
    let (mut layer, placement) = fit(opaque, CompositeMode::Fallback);
    mask_ellipse(&mut layer);
    overlay(canvas, &layer, placement.x, placement.y);
    placement
}

/// Encodes a canvas as PNG at the strongest compression level.
///
/// # Errors
///
/// Returns `image::ImageError` if the encoder fails.
pub fn encode_png(canvas: &RgbaImage) -> Result<Vec<u8>, image::ImageError> {
    let mut out = Vec::new();
    PngEncoder::new_with_quality(&mut out, CompressionType::Best, PngFilter::Adaptive).write_image(
        canvas.as_raw(),
        canvas.width(),
        canvas.height(),
        ExtendedColorType::Rgba8,
    )?;
    Ok(out)
}

/// Renders the template for `mode`, composites `photo` and encodes the
/// sticker.
///
/// # Errors
///
/// Returns `StickerError::ImageProcessing` if encoding fails.
pub fn build_sticker(
    descriptor: &TemplateDescriptor,
    mode: CompositeMode,
    photo: &DynamicImage,
    fonts: &Fonts,
) -> Result<Vec<u8>, StickerError> {
    let mut canvas = render_template(descriptor, mode.canvas(), fonts);
    match mode {
        CompositeMode::Cutout => composite_cutout(&mut canvas, photo),
        CompositeMode::Fallback => composite_fallback(&mut canvas, photo),
    };
    Ok(encode_png(&canvas)?)
}

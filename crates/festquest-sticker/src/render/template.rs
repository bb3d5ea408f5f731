//! Template renderer: colour wash, border and the festival lines.

use image::{Rgba, RgbaImage};

use super::typeface::{Fonts, Typeface};
use crate::domain::layout::Size;
use crate::domain::template::TemplateDescriptor;

/// Line printed under every sticker.
pub const TAGLINE: &str = "Хорошие истории начинаются с тебя";
/// Brand line printed under the tagline.
pub const BRAND_LINE: &str = "Avito × Dikaya Myata";

/// Border thickness on all four edges.
pub const BORDER_WIDTH: u32 = 20;
const GRADIENT_STRENGTH: f64 = 0.8;

const TAGLINE_PX: f32 = 36.0;
const TAGLINE_FROM_BOTTOM: u32 = 120;
const TAGLINE_SHADOW: i32 = 2;

const BRAND_PX: f32 = 24.0;
const BRAND_FROM_BOTTOM: u32 = 60;
const BRAND_SHADOW: i32 = 1;

const SHADOW: Rgba<u8> = Rgba([0, 0, 0, 128]);

/// Alpha of the colour wash on row `y` of a canvas `height` rows tall.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
#[must_use]
pub fn wash_alpha(y: u32, height: u32) -> u8 {
    if height == 0 {
        return 0;
    }
    let fade = 1.0 - f64::from(y) / f64::from(height);
    (255.0 * fade * GRADIENT_STRENGTH) as u8
}

/// Renders the blank template for `descriptor` at `size`.
///
/// The wash fades from the primary colour at the top to transparent at the
/// bottom. The border is opaque primary colour. Both text lines are centred
/// on measured width and drawn over a translucent black shadow.
#[must_use]
pub fn render_template(descriptor: &TemplateDescriptor, size: Size, fonts: &Fonts) -> RgbaImage {
    let [r, g, b] = descriptor.primary_color.0;
    let mut canvas = RgbaImage::from_fn(size.width, size.height, |_, y| {
        Rgba([r, g, b, wash_alpha(y, size.height)])
    });

    draw_border(&mut canvas, Rgba([r, g, b, 255]));

    let [tr, tg, tb] = descriptor.text_color.0;
    let text = Rgba([tr, tg, tb, 255]);
    draw_centred_line(
        &mut canvas,
        &fonts.bold,
        TAGLINE_PX,
        size.height.saturating_sub(TAGLINE_FROM_BOTTOM),
        TAGLINE_SHADOW,
        text,
        TAGLINE,
    );
    draw_centred_line(
        &mut canvas,
        &fonts.regular,
        BRAND_PX,
        size.height.saturating_sub(BRAND_FROM_BOTTOM),
        BRAND_SHADOW,
        text,
        BRAND_LINE,
    );
    canvas
}

fn draw_border(canvas: &mut RgbaImage, color: Rgba<u8>) {
    let (w, h) = canvas.dimensions();
    for (x, y, pixel) in canvas.enumerate_pixels_mut() {
        let inside = x >= BORDER_WIDTH
            && y >= BORDER_WIDTH
            && x + BORDER_WIDTH < w
            && y + BORDER_WIDTH < h;
        if !inside {
            *pixel = color;
        }
    }
}

/// Largest size at or below `px` at which `text` fits in `max_width`.
fn fitting_px(face: &Typeface, px: f32, text: &str, max_width: f32) -> f32 {
    let mut px = px;
    while px > 1.0 && face.text_width(px, text) > max_width {
        px -= 1.0;
    }
    px
}

#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn draw_centred_line(
    canvas: &mut RgbaImage,
    face: &Typeface,
    px: f32,
    top: u32,
    shadow_offset: i32,
    color: Rgba<u8>,
    text: &str,
) {
    #[allow(clippy::cast_precision_loss)]
    let width = canvas.width() as f32;
    #[allow(clippy::cast_precision_loss)]
    let inner = canvas.width().saturating_sub(2 * BORDER_WIDTH) as f32;
    let px = fitting_px(face, px, text, inner);
    let free = width - face.text_width(px, text);
    let x = (free / 2.0).round() as i32;
    let y = top as i32;
    face.draw_text(canvas, px, x + shadow_offset, y + shadow_offset, SHADOW, text);
    face.draw_text(canvas, px, x, y, color, text);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::template::TEMPLATES;

    fn render(size: Size) -> RgbaImage {
        render_template(&TEMPLATES[1], size, &Fonts::builtin())
    }

    #[test]
    fn test_wash_alpha_fades_top_to_bottom() {
        assert_eq!(wash_alpha(0, 800), 204);
        assert_eq!(wash_alpha(400, 800), 102);
        assert_eq!(wash_alpha(800, 800), 0);
        assert_eq!(wash_alpha(5, 0), 0);
    }

    #[test]
    fn test_template_has_requested_size() {
        let canvas = render(Size::new(600, 800));

        assert_eq!(canvas.dimensions(), (600, 800));
    }

    #[test]
    fn test_border_is_opaque_primary_colour() {
        // Arrange
        let primary = TEMPLATES[1].primary_color.0;

        // Act
        let canvas = render(Size::new(800, 800));

        // Assert
        let expected = Rgba([primary[0], primary[1], primary[2], 255]);
        assert_eq!(*canvas.get_pixel(0, 0), expected);
        assert_eq!(*canvas.get_pixel(19, 400), expected);
        assert_eq!(*canvas.get_pixel(780, 400), expected);
        assert_eq!(*canvas.get_pixel(400, 799), expected);
    }

    #[test]
    fn test_interior_above_text_is_translucent_wash() {
        let primary = TEMPLATES[1].primary_color.0;

        let canvas = render(Size::new(800, 800));

        let pixel = canvas.get_pixel(400, 100);
        assert_eq!(pixel.0[..3], primary);
        assert_eq!(pixel.0[3], wash_alpha(100, 800));
    }

    #[test]
    fn test_text_band_contains_text_pixels() {
        // Arrange
        let canvas = render(Size::new(800, 800));
        let white = Rgba([255, 255, 255, 255]);

        // Act
        let text_pixels = (680..740)
            .flat_map(|y| (BORDER_WIDTH..800 - BORDER_WIDTH).map(move |x| (x, y)))
            .filter(|&(x, y)| *canvas.get_pixel(x, y) == white)
            .count();

        // Assert
        assert!(text_pixels > 0);
    }

    #[test]
    fn test_tagline_shrinks_to_fit_inside_border() {
        // Arrange
        let face = Fonts::builtin().bold;
        let inner = 600.0 - 2.0 * BORDER_WIDTH as f32;

        // Act
        let px = fitting_px(&face, TAGLINE_PX, TAGLINE, inner);

        // Assert
        assert!(face.text_width(TAGLINE_PX, TAGLINE) > inner);
        assert!(px < TAGLINE_PX);
        assert!(face.text_width(px, TAGLINE) <= inner);
    }

    #[test]
    fn test_fallback_canvas_text_stays_clear_of_the_border() {
        // Arrange
        let canvas = render(Size::new(600, 800));
        let white = Rgba([255, 255, 255, 255]);

        // Act
        let near_edges = (640..760)
            .flat_map(|y| {
                (BORDER_WIDTH..BORDER_WIDTH + 10)
                    .chain(600 - BORDER_WIDTH - 10..600 - BORDER_WIDTH)
                    .map(move |x| (x, y))
            })
            .filter(|&(x, y)| *canvas.get_pixel(x, y) == white)
            .count();

        // Assert
        assert_eq!(near_edges, 0);
    }

    #[test]
    fn test_tiny_canvas_renders_without_panicking() {
        let canvas = render(Size::new(10, 10));

        assert_eq!(canvas.dimensions(), (10, 10));
    }
}

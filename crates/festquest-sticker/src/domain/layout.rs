//! Canvas sizes and photo placement rules.
//!
//! Both modes reserve the bottom of the canvas for the tagline and keep the
//! photo inside a padded content region. Photos are only ever shrunk.

/// Pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Size {
    /// Creates a size.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Height kept free at the bottom of the canvas for text.
pub const BOTTOM_MARGIN: u32 = 200;
/// Total horizontal padding around the photo (split evenly).
pub const HORIZONTAL_PADDING: u32 = 100;
/// Extra offset from the top of the content region in cutout mode.
pub const CUTOUT_TOP_OFFSET: u32 = 50;
/// Fixed distance from the top of the canvas in fallback mode.
pub const FALLBACK_TOP: u32 = 80;

/// How the photo is put on the template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeMode {
    /// Background-removed subject, pasted with its own alpha.
    Cutout,
    /// Original photo cropped to an ellipse.
    Fallback,
}

impl CompositeMode {
    /// Canvas the template is rendered at for this mode.
    #[must_use]
    pub const fn canvas(self) -> Size {
        match self {
            Self::Cutout => Size::new(800, 800),
            Self::Fallback => Size::new(600, 800),
        }
    }

    /// Stable name for logs and headers.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cutout => "cutout",
            Self::Fallback => "fallback",
        }
    }
}

/// Where and how large the photo lands on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Scaled photo size.
    pub size: Size,
    /// Left edge on the canvas.
    pub x: u32,
    /// Top edge on the canvas.
    pub y: u32,
}

/// The area a photo may occupy on `canvas`.
#[must_use]
pub fn content_region(canvas: Size) -> Size {
    Size::new(
        canvas.width.saturating_sub(HORIZONTAL_PADDING),
        canvas.height.saturating_sub(BOTTOM_MARGIN),
    )
}

/// Uniform scale that fits `photo` into `region`, never above 1.0.
#[must_use]
pub fn fit_scale(photo: Size, region: Size) -> f64 {
    if photo.width == 0 || photo.height == 0 {
        return 1.0;
    }
    let w = f64::from(region.width) / f64::from(photo.width);
    let h = f64::from(region.height) / f64::from(photo.height);
    w.min(h).min(1.0)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn scaled(length: u32, scale: f64) -> u32 {
    ((f64::from(length) * scale).round() as u32).max(1)
}

/// Computes where a photo of size `photo` goes in `mode`.
///
/// The result is centred horizontally. In cutout mode it is centred
/// vertically in the content region and pushed down by
/// [`CUTOUT_TOP_OFFSET`]; in fallback mode its top sits at [`FALLBACK_TOP`].
#[must_use]
pub fn place(photo: Size, mode: CompositeMode) -> Placement {
    let canvas = mode.canvas();
    let region = content_region(canvas);
    let scale = fit_scale(photo, region);
    let size = Size::new(scaled(photo.width, scale), scaled(photo.height, scale));
    let x = canvas.width.saturating_sub(size.width) / 2;
    let y = match mode {
        CompositeMode::Cutout => region.height.saturating_sub(size.height) / 2 + CUTOUT_TOP_OFFSET,
        CompositeMode::Fallback => FALLBACK_TOP,
    };
    Placement { size, x, y }
}

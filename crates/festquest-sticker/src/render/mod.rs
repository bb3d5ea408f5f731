//! Pixel work: template rendering, text, compositing and encoding.
//!
//! Everything here is synchronous and CPU-bound. Callers on the async
//! runtime go through `tokio::task::spawn_blocking`.

pub mod compositor;
pub mod template;
pub mod typeface;

use image::Rgba;

/// Source-over blend of `src` onto `dst`, with `src` alpha further scaled by
/// `coverage` in `[0, 1]`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn blend_over(dst: &mut Rgba<u8>, src: Rgba<u8>, coverage: f32) {
    let sa = f32::from(src.0[3]) / 255.0 * coverage.clamp(0.0, 1.0);
    if sa <= 0.0 {
        return;
    }
    let da = f32::from(dst.0[3]) / 255.0;
    let out_a = sa + da * (1.0 - sa);
    for i in 0..3 {
        let c = (f32::from(src.0[i]) * sa + f32::from(dst.0[i]) * da * (1.0 - sa)) / out_a;
        dst.0[i] = c.round().clamp(0.0, 255.0) as u8;
    }
    dst.0[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opaque_source_replaces_destination() {
        let mut dst = Rgba([10, 20, 30, 255]);

        blend_over(&mut dst, Rgba([200, 100, 50, 255]), 1.0);

        assert_eq!(dst, Rgba([200, 100, 50, 255]));
    }

    #[test]
    fn test_zero_coverage_leaves_destination() {
        let mut dst = Rgba([10, 20, 30, 40]);

        blend_over(&mut dst, Rgba([200, 100, 50, 255]), 0.0);

        assert_eq!(dst, Rgba([10, 20, 30, 40]));
    }

    #[test]
    fn test_half_alpha_over_transparent_keeps_colour() {
        let mut dst = Rgba([0, 0, 0, 0]);

        blend_over(&mut dst, Rgba([0, 0, 0, 128]), 1.0);

        assert_eq!(dst, Rgba([0, 0, 0, 128]));
    }

    #[test]
    fn test_half_alpha_over_opaque_mixes() {
        let mut dst = Rgba([255, 255, 255, 255]);

        blend_over(&mut dst, Rgba([0, 0, 0, 255]), 0.5);

        assert_eq!(dst.0[3], 255);
        assert!((127..=128).contains(&dst.0[0]));
    }
}

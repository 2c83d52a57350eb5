//! Named photo filters and their pixel transforms.
//!
//! A filter lowers to a [`FilterPipeline`]: per-pixel color ops run first, in order, then
//! whole-image passes (softening). Preview and export both rasterize through this pipeline, so
//! the burned-in pixels are the previewed pixels.

mod blur;

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::foundation::error::{PhotoboothError, PhotoboothResult};

pub use blur::{MAX_SOFTEN_RADIUS, SoftenKernel, soften_rgb};

/// Filter picked for a session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    /// No change.
    #[default]
    Normal,
    /// Black and white with a contrast lift.
    Bw,
    /// Brighter, flatter, slightly blurred.
    Soft,
    /// Half-strength sepia with muted colors.
    Vintage,
}

/// Per-pixel color operation. Alpha is never touched.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ColorOp {
    /// Replace RGB with BT.601 luminance.
    Grayscale,
    /// Mix toward the standard sepia matrix by `amount` (0..1).
    Sepia(f32),
    /// Multiply channels.
    Brightness(f32),
    /// Contrast multiplier (1.0 = unchanged).
    Contrast(f32),
    /// Saturation multiplier (1.0 = unchanged, 0.0 = gray).
    Saturate(f32),
}

/// Whole-image operation applied after the color ops.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PassOp {
    /// Gaussian softening of the color channels.
    Soften {
        /// Sigma in strip units; the pixel sigma grows with the raster scale.
        sigma: f32,
    },
}

/// Ordered ops a filter lowers to.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterPipeline {
    /// Color ops in application order.
    pub color: Vec<ColorOp>,
    /// Passes in application order.
    pub passes: Vec<PassOp>,
}

impl FilterPipeline {
    /// `true` when the pipeline leaves pixels unchanged.
    pub fn is_identity(&self) -> bool {
        self.color.is_empty() && self.passes.is_empty()
    }
}

impl Filter {
    /// Every filter, in picker order.
    pub const ALL: [Filter; 4] = [Filter::Normal, Filter::Bw, Filter::Soft, Filter::Vintage];

    /// Stable lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Filter::Normal => "normal",
            Filter::Bw => "bw",
            Filter::Soft => "soft",
            Filter::Vintage => "vintage",
        }
    }

    /// Lower to concrete pixel ops.
    pub fn pipeline(self) -> FilterPipeline {
        match self {
            Filter::Normal => FilterPipeline::default(),
            Filter::Bw => FilterPipeline {
                color: vec![ColorOp::Grayscale, ColorOp::Contrast(1.2)],
                passes: Vec::new(),
            },
            Filter::Soft => FilterPipeline {
                color: vec![
                    ColorOp::Brightness(1.1),
                    ColorOp::Contrast(0.9),
                    ColorOp::Saturate(0.8),
                ],
                passes: vec![PassOp::Soften { sigma: 0.5 }],
            },
            Filter::Vintage => FilterPipeline {
                color: vec![
                    ColorOp::Sepia(0.5),
                    ColorOp::Contrast(1.1),
                    ColorOp::Saturate(0.8),
                ],
                passes: Vec::new(),
            },
        }
    }
}

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Filter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        Filter::ALL
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| format!("unknown filter '{s}' (expected normal, bw, soft or vintage)"))
    }
}

/// Apply `filter` to a copy of `src`.
pub fn apply_filter(src: &RgbaImage, filter: Filter) -> PhotoboothResult<RgbaImage> {
    let mut out = src.clone();
    apply_filter_in_place(&mut out, filter)?;
    Ok(out)
}

/// Apply `filter` to `img` in place, one pixel per strip unit.
pub fn apply_filter_in_place(img: &mut RgbaImage, filter: Filter) -> PhotoboothResult<()> {
    apply_filter_in_place_scaled(img, filter, 1.0)
}

/// Apply `filter` to a tile rasterized at `scale` pixels per strip unit.
///
/// Color ops ignore the scale; softening widens with it so a 2x export looks like the preview.
pub fn apply_filter_in_place_scaled(
    img: &mut RgbaImage,
    filter: Filter,
    scale: f64,
) -> PhotoboothResult<()> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(PhotoboothError::validation(
            "filter scale must be finite and > 0",
        ));
    }
    let pipeline = filter.pipeline();
    if pipeline.is_identity() {
        return Ok(());
    }

    if !pipeline.color.is_empty() {
        for px in img.pixels_mut() {
            let mut rgb = [f32::from(px[0]), f32::from(px[1]), f32::from(px[2])];
            for op in &pipeline.color {
                apply_color_op(&mut rgb, *op);
            }
            px[0] = to_u8(rgb[0]);
            px[1] = to_u8(rgb[1]);
            px[2] = to_u8(rgb[2]);
        }
    }

    for pass in &pipeline.passes {
        match *pass {
            PassOp::Soften { sigma } => {
                let kernel = SoftenKernel::for_sigma(sigma * scale as f32)?;
                soften_rgb(img, &kernel);
            }
        }
    }
    Ok(())
}

/// BT.601 luma on 0..255 channels.
pub fn luminance(r: f32, g: f32, b: f32) -> f32 {
    0.299 * r + 0.587 * g + 0.114 * b
}

/// Contrast factor for an offset `c` (multiplier minus one), on a 0..255 scale.
pub fn contrast_factor(c: f32) -> f32 {
    let c255 = c * 255.0;
    (259.0 * (c255 + 255.0)) / (255.0 * (259.0 - c255))
}

fn apply_color_op(rgb: &mut [f32; 3], op: ColorOp) {
    match op {
        ColorOp::Grayscale => {
            let y = luminance(rgb[0], rgb[1], rgb[2]);
            *rgb = [y, y, y];
        }
        ColorOp::Sepia(amount) => {
            let amount = amount.clamp(0.0, 1.0);
            let [r, g, b] = *rgb;
            let sepia = [
                0.393 * r + 0.769 * g + 0.189 * b,
                0.349 * r + 0.686 * g + 0.168 * b,
                0.272 * r + 0.534 * g + 0.131 * b,
            ];
            for (c, s) in rgb.iter_mut().zip(sepia) {
                *c = *c * (1.0 - amount) + s * amount;
            }
        }
        ColorOp::Brightness(k) => {
            for c in rgb.iter_mut() {
                *c *= k;
            }
        }
        ColorOp::Contrast(k) => {
            let factor = contrast_factor(k - 1.0);
            for c in rgb.iter_mut() {
                *c = factor * (*c - 128.0) + 128.0;
            }
        }
        ColorOp::Saturate(s) => {
            let gray = luminance(rgb[0], rgb[1], rgb[2]);
            let toward = 1.0 - s;
            for c in rgb.iter_mut() {
                *c += (gray - *c) * toward;
            }
        }
    }
    for c in rgb.iter_mut() {
        *c = c.clamp(0.0, 255.0);
    }
}

fn to_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_image() -> RgbaImage {
        RgbaImage::from_fn(6, 5, |x, y| {
            image::Rgba([(x * 40) as u8, (y * 50) as u8, ((x + y) * 20) as u8, 255])
        })
    }

    #[test]
    fn normal_is_identity() {
        let img = sample_image();
        assert_eq!(apply_filter(&img, Filter::Normal).unwrap(), img);
    }

    #[test]
    fn filters_are_deterministic() {
        let img = sample_image();
        for f in Filter::ALL {
            let a = apply_filter(&img, f).unwrap();
            let b = apply_filter(&img, f).unwrap();
            assert_eq!(a, b, "{f}");
        }
    }

    #[test]
    fn bw_is_gray_with_contrast() {
        let img = RgbaImage::from_pixel(1, 1, image::Rgba([200, 100, 50, 255]));
        let out = apply_filter(&img, Filter::Bw).unwrap();
        let px = out.get_pixel(0, 0).0;
        assert_eq!(px[0], px[1]);
        assert_eq!(px[1], px[2]);
        assert_eq!(px[3], 255);

        let y = luminance(200.0, 100.0, 50.0);
        let expected = (contrast_factor(0.2) * (y - 128.0) + 128.0)
            .round()
            .clamp(0.0, 255.0) as u8;
        assert_eq!(px[0], expected);
    }

    #[test]
    fn bw_contrast_uses_offset_curve() {
        // Contrast 1.2 is C = 0.2 in the 259/255 curve: slope ~1.494 around 128.
        let img = RgbaImage::from_pixel(1, 1, image::Rgba([200, 200, 200, 255]));
        let px = apply_filter(&img, Filter::Bw).unwrap().get_pixel(0, 0).0;
        assert_eq!(px, [236, 236, 236, 255]);
    }

    #[test]
    fn soft_chain_on_single_pixel() {
        // brightness 1.1, contrast 0.9, saturate 0.8; softening a 1x1 tile is a no-op.
        let cases: [([u8; 3], [u8; 3]); 2] = [
            ([200, 100, 50], [190, 118, 82]),
            ([30, 160, 90], [65, 159, 108]),
        ];
        for (rgb, expected) in cases {
            let img = RgbaImage::from_pixel(1, 1, image::Rgba([rgb[0], rgb[1], rgb[2], 255]));
            let px = apply_filter(&img, Filter::Soft).unwrap().get_pixel(0, 0).0;
            assert_eq!(px[..3], expected, "soft {rgb:?}");
            assert_eq!(px[3], 255);
        }
    }

    #[test]
    fn vintage_chain_on_single_pixel() {
        // sepia 0.5, contrast 1.1, saturate 0.8.
        let cases: [([u8; 3], [u8; 3]); 2] = [
            ([200, 100, 50], [183, 126, 85]),
            ([30, 160, 90], [91, 146, 98]),
        ];
        for (rgb, expected) in cases {
            let img = RgbaImage::from_pixel(1, 1, image::Rgba([rgb[0], rgb[1], rgb[2], 255]));
            let px = apply_filter(&img, Filter::Vintage).unwrap().get_pixel(0, 0).0;
            assert_eq!(px[..3], expected, "vintage {rgb:?}");
        }
    }

    #[test]
    fn soften_reach_grows_with_raster_scale() {
        let dot_row = || {
            RgbaImage::from_fn(9, 1, |x, _| {
                let v = if x == 4 { 255 } else { 0 };
                image::Rgba([v, v, v, 255])
            })
        };

        let mut preview = dot_row();
        apply_filter_in_place_scaled(&mut preview, Filter::Soft, 1.0).unwrap();
        assert_eq!(preview.get_pixel(2, 0), preview.get_pixel(0, 0));
        assert_ne!(preview.get_pixel(3, 0), preview.get_pixel(0, 0));

        let mut export = dot_row();
        apply_filter_in_place_scaled(&mut export, Filter::Soft, 2.0).unwrap();
        assert!(export.get_pixel(2, 0)[0] > export.get_pixel(0, 0)[0]);

        let mut same = dot_row();
        apply_filter_in_place(&mut same, Filter::Soft).unwrap();
        assert_eq!(same, preview);
    }

    #[test]
    fn filter_scale_must_be_positive() {
        let mut img = sample_image();
        assert!(apply_filter_in_place_scaled(&mut img, Filter::Soft, 0.0).is_err());
        assert!(apply_filter_in_place_scaled(&mut img, Filter::Bw, f64::NAN).is_err());
    }

    #[test]
    fn contrast_factor_matches_reference_points() {
        assert!((contrast_factor(0.0) - 1.0).abs() < 1e-6);
        assert!(contrast_factor(0.2) > 1.0);
        assert!(contrast_factor(-0.1) < 1.0);
    }

    #[test]
    fn mid_gray_survives_contrast_and_saturation() {
        let mut rgb = [128.0, 128.0, 128.0];
        apply_color_op(&mut rgb, ColorOp::Contrast(1.2));
        apply_color_op(&mut rgb, ColorOp::Saturate(0.5));
        for c in rgb {
            assert!((c - 128.0).abs() < 1e-3);
        }
    }

    #[test]
    fn saturate_zero_gives_luminance() {
        let mut rgb = [255.0, 0.0, 0.0];
        apply_color_op(&mut rgb, ColorOp::Saturate(0.0));
        let y = luminance(255.0, 0.0, 0.0);
        for c in rgb {
            assert!((c - y).abs() < 1e-3);
        }
    }

    #[test]
    fn vintage_warms_pure_blue() {
        let img = RgbaImage::from_pixel(1, 1, image::Rgba([0, 0, 255, 255]));
        let px = apply_filter(&img, Filter::Vintage).unwrap().get_pixel(0, 0).0;
        assert!(px[0] > 0, "sepia mix should pull red up: {px:?}");
        assert!(px[2] < 255);
    }

    #[test]
    fn alpha_is_preserved() {
        let img = RgbaImage::from_pixel(3, 3, image::Rgba([90, 120, 30, 77]));
        for f in Filter::ALL {
            let out = apply_filter(&img, f).unwrap();
            assert!(out.pixels().all(|p| p[3] == 77), "{f}");
        }
    }

    #[test]
    fn names_round_trip_through_from_str() {
        for f in Filter::ALL {
            assert_eq!(f.name().parse::<Filter>().unwrap(), f);
        }
        assert!("sepia".parse::<Filter>().is_err());
    }

    #[test]
    fn soft_blur_leaves_varying_alpha_alone() {
        let img = RgbaImage::from_fn(4, 4, |x, y| image::Rgba([200, 40, 90, (x * 60 + y) as u8]));
        let out = apply_filter(&img, Filter::Soft).unwrap();
        for (a, b) in img.pixels().zip(out.pixels()) {
            assert_eq!(a[3], b[3]);
        }
    }
}

use image::RgbaImage;

use crate::foundation::error::{PhotoboothError, PhotoboothResult};

/// Widest radius a softening kernel may reach, in pixels.
pub const MAX_SOFTEN_RADIUS: u32 = 64;

/// Normalized 1-D Gaussian taps; tap `i` samples offset `i - radius`.
#[derive(Clone, Debug, PartialEq)]
pub struct SoftenKernel {
    radius: u32,
    taps: Vec<f32>,
}

impl SoftenKernel {
    /// Kernel with an explicit pixel radius.
    pub fn new(radius: u32, sigma: f32) -> PhotoboothResult<Self> {
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(PhotoboothError::validation(
                "soften sigma must be finite and > 0",
            ));
        }
        if radius > MAX_SOFTEN_RADIUS {
            return Err(PhotoboothError::validation(format!(
                "soften radius {radius} exceeds {MAX_SOFTEN_RADIUS}"
            )));
        }
        let r = radius as i32;
        let two_var = 2.0 * sigma * sigma;
        let raw: Vec<f32> = (-r..=r)
            .map(|d| (-((d * d) as f32) / two_var).exp())
            .collect();
        let total: f32 = raw.iter().sum();
        Ok(Self {
            radius,
            taps: raw.into_iter().map(|t| t / total).collect(),
        })
    }

    /// Kernel for a pixel `sigma`, reaching two sigmas out (at least one pixel).
    pub fn for_sigma(sigma: f32) -> PhotoboothResult<Self> {
        let radius = if sigma.is_finite() && sigma > 0.0 {
            (sigma * 2.0)
                .ceil()
                .clamp(1.0, MAX_SOFTEN_RADIUS as f32) as u32
        } else {
            1
        };
        Self::new(radius, sigma)
    }

    /// Reach in pixels on each side of the centre.
    pub fn radius(&self) -> u32 {
        self.radius
    }

    /// Weights, summing to one.
    pub fn taps(&self) -> &[f32] {
        &self.taps
    }

    fn convolve<F>(&self, center: usize, len: usize, fetch: F) -> [f32; 3]
    where
        F: Fn(usize) -> [f32; 3],
    {
        let mut acc = [0.0f32; 3];
        for (i, &weight) in self.taps.iter().enumerate() {
            let pos = (center + i)
                .saturating_sub(self.radius as usize)
                .min(len - 1);
            for (a, c) in acc.iter_mut().zip(fetch(pos)) {
                *a += weight * c;
            }
        }
        acc
    }
}

/// Soften the color channels of `img` with `kernel`, rows then columns. Edges clamp; alpha is
/// left as it was.
pub fn soften_rgb(img: &mut RgbaImage, kernel: &SoftenKernel) {
    let (w, h) = (img.width() as usize, img.height() as usize);
    if kernel.radius == 0 || w == 0 || h == 0 {
        return;
    }

    let mut across = Vec::with_capacity(w * h);
    for y in 0..h {
        for x in 0..w {
            across.push(kernel.convolve(x, w, |sx| {
                let p = img.get_pixel(sx as u32, y as u32);
                [f32::from(p[0]), f32::from(p[1]), f32::from(p[2])]
            }));
        }
    }

    for y in 0..h {
        for x in 0..w {
            let rgb = kernel.convolve(y, h, |sy| across[sy * w + x]);
            let px = img.get_pixel_mut(x as u32, y as u32);
            for (dst, v) in px.0.iter_mut().zip(rgb) {
                *dst = v.round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}

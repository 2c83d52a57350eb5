use std::sync::Arc;

use image::RgbaImage;
use image::imageops::FilterType;
use tracing::trace;

use crate::filter::apply_filter_in_place_scaled;
use crate::foundation::error::{PhotoboothError, PhotoboothResult};
use crate::render::composite::{over_in_place, premultiply_in_place, unpremultiply_in_place};
use crate::render::overlay::{overlay_svg, rasterize_overlay, system_fontdb};
use crate::render::scene::{CompositeScene, PhotoSlot};

/// Largest raster edge a surface will allocate.
pub const MAX_RASTER_DIM: u32 = 8192;

/// Capability that turns a [`CompositeScene`] into pixels.
///
/// `scale` multiplies the scene's logical size; exports use 2.0 for sharper output.
pub trait RenderSurface {
    /// Rasterize to straight-alpha RGBA8.
    fn rasterize(&mut self, scene: &CompositeScene, scale: f64) -> PhotoboothResult<RgbaImage>;
}

/// Options for [`CpuSurface`].
#[derive(Clone, Copy, Debug)]
pub struct CpuSurfaceOpts {
    /// Resampling filter used when fitting photos into slots.
    pub resample: FilterType,
    /// Draw the header and stickers overlay.
    pub overlay: bool,
}

impl Default for CpuSurfaceOpts {
    fn default() -> Self {
        Self {
            resample: FilterType::Triangle,
            overlay: true,
        }
    }
}

/// Software rasterizer built on `image` for photos and `resvg` for text.
pub struct CpuSurface {
    opts: CpuSurfaceOpts,
    fontdb: Arc<usvg::fontdb::Database>,
}

impl CpuSurface {
    /// Surface with system fonts loaded for header and sticker glyphs.
    pub fn new(opts: CpuSurfaceOpts) -> Self {
        Self {
            opts,
            fontdb: system_fontdb(),
        }
    }

    /// Surface with an explicit font database.
    pub fn with_fontdb(opts: CpuSurfaceOpts, fontdb: Arc<usvg::fontdb::Database>) -> Self {
        Self { opts, fontdb }
    }

    fn draw_slot(
        &self,
        canvas: &mut RgbaImage,
        slot: &PhotoSlot,
        scene: &CompositeScene,
        scale: f64,
    ) -> PhotoboothResult<()> {
        let x0 = (slot.rect.x0 * scale).round();
        let y0 = (slot.rect.y0 * scale).round();
        let tw = ((slot.rect.x1 * scale).round() - x0).max(1.0) as u32;
        let th = ((slot.rect.y1 * scale).round() - y0).max(1.0) as u32;

        let photo = slot.still.decode().map_err(|e| {
            PhotoboothError::raster(format!(
                "decode burst {} frame {}: {e}",
                slot.burst, slot.frame
            ))
        })?;
        let mut tile = cover_fit(&photo, tw, th, self.opts.resample);
        apply_filter_in_place_scaled(&mut tile, scene.filter, scale)?;

        image::imageops::replace(canvas, &tile, x0 as i64, y0 as i64);
        Ok(())
    }
}

impl Default for CpuSurface {
    fn default() -> Self {
        Self::new(CpuSurfaceOpts::default())
    }
}

impl RenderSurface for CpuSurface {
    fn rasterize(&mut self, scene: &CompositeScene, scale: f64) -> PhotoboothResult<RgbaImage> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(PhotoboothError::validation(
                "raster scale must be finite and > 0",
            ));
        }
        let width = (scene.size.width * scale).round();
        let height = (scene.size.height * scale).round();
        if width < 1.0 || height < 1.0 {
            return Err(PhotoboothError::raster("scene has an empty raster size"));
        }
        let max = f64::from(MAX_RASTER_DIM);
        if width > max || height > max {
            return Err(PhotoboothError::raster(format!(
                "raster size too large: {width}x{height} (max {MAX_RASTER_DIM}x{MAX_RASTER_DIM})"
            )));
        }
        let (width, height) = (width as u32, height as u32);
        trace!(width, height, slots = scene.slots.len(), "rasterize scene");

        let mut canvas = RgbaImage::from_pixel(width, height, scene.border.to_rgba());
        for slot in &scene.slots {
            self.draw_slot(&mut canvas, slot, scene, scale)?;
        }

        if self.opts.overlay {
            let svg = overlay_svg(scene);
            let overlay = rasterize_overlay(&svg, self.fontdb.clone(), width, height)?;
            premultiply_in_place(&mut canvas);
            over_in_place(&mut canvas, &overlay)?;
            unpremultiply_in_place(&mut canvas);
        }
        Ok(canvas)
    }
}

/// Scale `src` to cover `tw` x `th` and crop the centre.
fn cover_fit(src: &RgbaImage, tw: u32, th: u32, filter: FilterType) -> RgbaImage {
    let (sw, sh) = src.dimensions();
    let k = (f64::from(tw) / f64::from(sw)).max(f64::from(th) / f64::from(sh));
    let rw = ((f64::from(sw) * k).ceil() as u32).max(tw);
    let rh = ((f64::from(sh) * k).ceil() as u32).max(th);

    let resized = if (rw, rh) == (sw, sh) {
        src.clone()
    } else {
        image::imageops::resize(src, rw, rh, filter)
    };
    let ox = (rw - tw) / 2;
    let oy = (rh - th) / 2;
    image::imageops::crop_imm(&resized, ox, oy, tw, th).to_image()
}

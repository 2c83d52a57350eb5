use image::RgbaImage;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::export::ExportGuard;
use crate::export::file::{ExportedFile, FILE_PREFIX};
use crate::export::progress::{ProgressObserver, ProgressTracker};
use crate::foundation::error::{PhotoboothError, PhotoboothResult};
use crate::render::surface::RenderSurface;
use crate::session::editor::EditorSession;

/// Options for [`export_gif`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GifExportOpts {
    /// Times the burst sequence is repeated inside the file.
    pub loops: u32,
    /// Display time of each frame. GIF stores centiseconds, so this is rounded down to 10 ms.
    pub frame_delay_ms: u32,
    /// Quantizer threads.
    pub workers: usize,
    /// Raster scale relative to the strip's logical size.
    pub scale: f64,
    /// Quantizer speed, 1 (best) ..= 30 (fastest).
    pub speed: i32,
}

impl Default for GifExportOpts {
    fn default() -> Self {
        Self {
            loops: 3,
            frame_delay_ms: 100,
            workers: 4,
            scale: 1.0,
            speed: 10,
        }
    }
}

impl GifExportOpts {
    /// Reject options the encoder cannot honor.
    pub fn validate(&self) -> PhotoboothResult<()> {
        if self.loops == 0 {
            return Err(PhotoboothError::validation("gif loops must be >= 1"));
        }
        if !(10..=655_350).contains(&self.frame_delay_ms) {
            return Err(PhotoboothError::validation(
                "gif frame_delay_ms must be in 10..=655350",
            ));
        }
        if self.workers == 0 {
            return Err(PhotoboothError::validation("gif workers must be >= 1"));
        }
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(PhotoboothError::validation(
                "gif scale must be finite and > 0",
            ));
        }
        if !(1..=30).contains(&self.speed) {
            return Err(PhotoboothError::validation("gif speed must be in 1..=30"));
        }
        Ok(())
    }

    fn delay_cs(&self) -> u16 {
        (self.frame_delay_ms / 10).clamp(1, u32::from(u16::MAX)) as u16
    }
}

/// Render frame indices in the order they are written: `0..burst_len`, `loops` times.
pub fn gif_frame_plan(burst_len: usize, loops: u32) -> Vec<usize> {
    (0..loops).flat_map(|_| 0..burst_len).collect()
}

/// Export every burst frame as an infinitely repeating animated GIF.
///
/// Frame `i` shows the `i`-th sample of every burst at once. Only the first
/// `shortest_burst()` samples are used, so every slot animates in lockstep.
#[tracing::instrument(skip_all, fields(loops = opts.loops, workers = opts.workers))]
pub fn export_gif(
    session: &mut EditorSession,
    surface: &mut dyn RenderSurface,
    opts: &GifExportOpts,
    progress: &mut dyn ProgressObserver,
) -> PhotoboothResult<ExportedFile> {
    opts.validate()?;
    let burst_len = session.photos().shortest_burst();
    if burst_len < 2 {
        warn!(burst_len, "bursts too short to animate");
        return Err(PhotoboothError::NotAnimatable(burst_len));
    }
    let pool = build_thread_pool(opts.workers)?;

    let mut guard = ExportGuard::begin(session);
    let mut tracker = ProgressTracker::new(progress);
    let plan = gif_frame_plan(burst_len, opts.loops);
    tracker.produced(0, plan.len());

    let mut unique: Vec<Option<RgbaImage>> = vec![None; burst_len];
    let mut dims: Option<(u32, u32)> = None;
    for (done, &frame) in plan.iter().enumerate() {
        let session = guard.session_mut();
        session.set_frame_index(Some(frame));
        let img = session.render_cached(surface, Some(frame), opts.scale)?;
        match dims {
            None => dims = Some(img.dimensions()),
            Some(d) if d != img.dimensions() => {
                return Err(PhotoboothError::raster(format!(
                    "frame {frame} rasterized at {:?}, expected {d:?}",
                    img.dimensions()
                )));
            }
            Some(_) => {}
        }
        if unique[frame].is_none() {
            unique[frame] = Some(img);
        }
        tracker.produced(done + 1, plan.len());
    }
    let stats = guard.session().cache().stats();
    debug!(
        frames = plan.len(),
        hits = stats.hits,
        misses = stats.misses,
        "gif frames produced"
    );

    let (width, height) = dims.unwrap_or((0, 0));
    let (w16, h16) = match (u16::try_from(width), u16::try_from(height)) {
        (Ok(w), Ok(h)) => (w, h),
        _ => {
            return Err(PhotoboothError::encode(format!(
                "gif frames are limited to 65535x65535, got {width}x{height}"
            )));
        }
    };

    let mut frames = Vec::with_capacity(burst_len);
    for (i, img) in unique.into_iter().enumerate() {
        frames.push(img.ok_or_else(|| {
            PhotoboothError::encode(format!("internal error: frame {i} was never rendered"))
        })?);
    }

    let chunk_size = opts.workers.saturating_mul(2).max(1);
    let delay = opts.delay_cs();
    let mut quantized = Vec::<gif::Frame<'static>>::with_capacity(burst_len);
    for chunk in frames.chunks_mut(chunk_size) {
        let out = pool.install(|| {
            chunk
                .par_iter_mut()
                .map(|img| {
                    let mut frame = gif::Frame::from_rgba_speed(w16, h16, img, opts.speed);
                    frame.delay = delay;
                    frame
                })
                .collect::<Vec<_>>()
        });
        quantized.extend(out);
        tracker.encoded(quantized.len(), burst_len);
    }

    let bytes = write_gif(&quantized, &plan, w16, h16)?;
    drop(guard);

    let file = ExportedFile::new(
        &format!("{FILE_PREFIX}-motion"),
        "gif",
        "image/gif",
        bytes,
    );
    info!(
        file = %file.file_name,
        frames = plan.len(),
        width,
        height,
        bytes = file.bytes.len(),
        "gif exported"
    );
    tracker.finish();
    Ok(file)
}

fn write_gif(
    quantized: &[gif::Frame<'static>],
    plan: &[usize],
    width: u16,
    height: u16,
) -> PhotoboothResult<Vec<u8>> {
    let mut out = Vec::new();
    let mut enc = gif::Encoder::new(&mut out, width, height, &[])
        .map_err(|e| PhotoboothError::encode(format!("gif header: {e}")))?;
    enc.set_repeat(gif::Repeat::Infinite)
        .map_err(|e| PhotoboothError::encode(format!("gif repeat: {e}")))?;
    for &idx in plan {
        let frame = quantized.get(idx).ok_or_else(|| {
            PhotoboothError::encode(format!("internal error: frame {idx} was never quantized"))
        })?;
        enc.write_frame(frame)
            .map_err(|e| PhotoboothError::encode(format!("gif frame {idx}: {e}")))?;
    }
    enc.into_inner()
        .map_err(|e| PhotoboothError::encode(format!("gif trailer: {e}")))?;
    Ok(out)
}

fn build_thread_pool(threads: usize) -> PhotoboothResult<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| PhotoboothError::encode(format!("failed to build gif worker pool: {e}")))
}

use std::sync::Arc;

use image::RgbaImage;
use kurbo::Point;
use tracing::debug;

use crate::capture::controller::CaptureOutcome;
use crate::capture::still::PhotoSet;
use crate::filter::Filter;
use crate::foundation::color::BorderColor;
use crate::foundation::error::PhotoboothResult;
use crate::layout::Layout;
use crate::render::scene::{CompositeRenderer, CompositeScene, HeaderSpec, StripStyle};
use crate::render::surface::RenderSurface;
use crate::session::cache::{FrameCache, FrameKey};
use crate::session::sticker::{Sticker, StickerBoard, StickerId};

/// Editing state for one captured photo set.
///
/// Owns the stickers, the strip style and the frame cache. Every mutation of filter, border or
/// stickers bumps the visual version, and the cache only ever holds rasters for the current
/// version.
#[derive(Debug)]
pub struct EditorSession {
    photos: Arc<PhotoSet>,
    style: StripStyle,
    stickers: StickerBoard,
    frame_index: Option<usize>,
    cache: FrameCache,
    visual_version: u64,
    exporting: bool,
}

impl EditorSession {
    /// Start editing `photos`.
    pub fn new(photos: Arc<PhotoSet>, filter: Filter, header: HeaderSpec) -> Self {
        Self {
            photos,
            style: StripStyle {
                filter,
                border: BorderColor::default(),
                header,
            },
            stickers: StickerBoard::new(),
            frame_index: None,
            cache: FrameCache::new(),
            visual_version: 0,
            exporting: false,
        }
    }

    /// Start editing the result of a capture run.
    pub fn from_capture(outcome: CaptureOutcome, header: HeaderSpec) -> Self {
        Self::new(Arc::new(outcome.photos), outcome.filter, header)
    }

    /// Captured photos.
    pub fn photos(&self) -> &Arc<PhotoSet> {
        &self.photos
    }

    /// Layout of the photo set.
    pub fn layout(&self) -> Layout {
        self.photos.layout()
    }

    /// Current strip style.
    pub fn style(&self) -> &StripStyle {
        &self.style
    }

    /// Active filter.
    pub fn filter(&self) -> Filter {
        self.style.filter
    }

    /// Active border color.
    pub fn border(&self) -> BorderColor {
        self.style.border
    }

    /// Placed stickers in draw order.
    pub fn stickers(&self) -> &[Sticker] {
        self.stickers.stickers()
    }

    /// Counter bumped by every visual change.
    pub fn visual_version(&self) -> u64 {
        self.visual_version
    }

    /// Rasters cached for the current visual version.
    pub fn cache(&self) -> &FrameCache {
        &self.cache
    }

    /// Whether an export is running.
    pub fn is_exporting(&self) -> bool {
        self.exporting
    }

    /// Frame shown in the live view (`None` = final shots).
    pub fn frame_index(&self) -> Option<usize> {
        self.frame_index
    }

    /// Select the frame shown in the live view. Cached rasters stay valid.
    pub fn set_frame_index(&mut self, frame_index: Option<usize>) {
        self.frame_index = frame_index;
    }

    /// Change the filter.
    pub fn set_filter(&mut self, filter: Filter) {
        if self.style.filter != filter {
            self.style.filter = filter;
            self.touch_visuals("filter");
        }
    }

    /// Change the border color.
    pub fn set_border(&mut self, border: BorderColor) {
        if self.style.border != border {
            self.style.border = border;
            self.touch_visuals("border");
        }
    }

    /// Replace the header contents.
    pub fn set_header(&mut self, header: HeaderSpec) {
        if self.style.header != header {
            self.style.header = header;
            self.touch_visuals("header");
        }
    }

    /// Place a sticker.
    pub fn add_sticker(
        &mut self,
        glyph: &str,
        position: Point,
        scale: f64,
    ) -> PhotoboothResult<StickerId> {
        let id = self.stickers.add(glyph, position, scale)?;
        self.touch_visuals("sticker added");
        Ok(id)
    }

    /// Commit a sticker drag.
    pub fn move_sticker(&mut self, id: StickerId, position: Point) -> PhotoboothResult<()> {
        self.stickers.move_to(id, position)?;
        self.touch_visuals("sticker moved");
        Ok(())
    }

    /// Resize a sticker by `delta`; the scale stays within bounds.
    pub fn resize_sticker(&mut self, id: StickerId, delta: f64) -> PhotoboothResult<f64> {
        let scale = self.stickers.resize_by(id, delta)?;
        self.touch_visuals("sticker resized");
        Ok(scale)
    }

    /// Set a sticker's scale; the scale stays within bounds.
    pub fn set_sticker_scale(&mut self, id: StickerId, scale: f64) -> PhotoboothResult<f64> {
        let scale = self.stickers.set_scale(id, scale)?;
        self.touch_visuals("sticker resized");
        Ok(scale)
    }

    /// Delete a sticker.
    pub fn remove_sticker(&mut self, id: StickerId) -> PhotoboothResult<Sticker> {
        let removed = self.stickers.remove(id)?;
        self.touch_visuals("sticker removed");
        Ok(removed)
    }

    /// Delete every sticker.
    pub fn clear_stickers(&mut self) {
        if self.stickers.clear() > 0 {
            self.touch_visuals("stickers cleared");
        }
    }

    /// Scene for the live view's current frame index.
    pub fn scene(&self) -> CompositeScene {
        self.scene_at(self.frame_index)
    }

    /// Scene with every burst showing `frame_index`.
    pub fn scene_at(&self, frame_index: Option<usize>) -> CompositeScene {
        CompositeRenderer.scene(&self.photos, &self.style, self.stickers.stickers(), frame_index)
    }

    /// Rasterize the live view, bypassing the cache.
    pub fn preview(
        &self,
        surface: &mut dyn RenderSurface,
        scale: f64,
    ) -> PhotoboothResult<RgbaImage> {
        surface.rasterize(&self.scene(), scale)
    }

    /// Raster for `frame_index` at `scale`, served from the cache when possible.
    pub fn render_cached(
        &mut self,
        surface: &mut dyn RenderSurface,
        frame_index: Option<usize>,
        scale: f64,
    ) -> PhotoboothResult<RgbaImage> {
        self.cache.sync_version(self.visual_version);
        let key = FrameKey::new(frame_index, self.style.filter, self.style.border, scale);
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit);
        }
        let img = surface.rasterize(&self.scene_at(frame_index), scale)?;
        self.cache.insert(key, img.clone());
        Ok(img)
    }

    pub(crate) fn set_exporting(&mut self, exporting: bool) {
        self.exporting = exporting;
    }

    fn touch_visuals(&mut self, what: &'static str) {
        self.visual_version += 1;
        self.cache.sync_version(self.visual_version);
        debug!(what, version = self.visual_version, "visual state changed");
    }
}

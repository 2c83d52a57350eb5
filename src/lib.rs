//! Photobooth capture and export pipeline.
//!
//! A session runs in three stages:
//!
//! - [`BurstCaptureController`] counts down each shot and samples a [`FrameSource`] into a
//!   [`Burst`], producing one burst per layout slot.
//! - [`EditorSession`] holds the captured [`PhotoSet`] together with filter, border color and
//!   stickers, and caches rasterized strips per frame.
//! - [`export_still`] and [`export_gif`] rasterize the strip through a [`RenderSurface`] and
//!   encode it as PNG, JPEG or an animated GIF.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Camera access and timed burst capture.
pub mod capture;
/// Still and animated exports.
pub mod export;
/// Named photo filters.
pub mod filter;
/// Strip layouts and slot geometry.
pub mod layout;
/// Strip composition and rasterization.
pub mod render;
/// Post-capture editing state.
pub mod session;

pub use crate::foundation::color::BorderColor;
pub use crate::foundation::error::{PhotoboothError, PhotoboothResult};

pub use crate::capture::{
    Burst, BurstCaptureController, CameraProvider, CancelToken, CaptureEvent, CaptureOutcome,
    CaptureSettings, Clock, DeviceInfo, DeviceKind, EncodedStill, FrameSource, ManualClock,
    PatternCamera, PhotoSet, ReplayCamera, StillFormat, SystemClock,
};
pub use crate::export::{
    ExportedFile, GifExportOpts, NoProgress, ProgressObserver, StillExportFormat,
    StillExportOpts, export_gif, export_still, gif_frame_plan,
};
pub use crate::filter::{
    Filter, apply_filter, apply_filter_in_place, apply_filter_in_place_scaled,
};
pub use crate::layout::{Layout, StripGeometry};
pub use crate::render::{
    CompositeRenderer, CompositeScene, CpuSurface, CpuSurfaceOpts, HeaderSpec, RenderSurface,
    StripStyle,
};
pub use crate::session::{
    EditorSession, FrameCache, SessionConfig, StickerConfig, Sticker, StickerBoard, StickerId,
};

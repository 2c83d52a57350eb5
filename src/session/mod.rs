//! Post-capture editing: stickers, strip style, frame cache and session config.

/// Rasterized strip cache.
pub mod cache;
/// JSON session configuration.
pub mod config;
/// The editor session.
pub mod editor;
/// Sticker placement.
pub mod sticker;

pub use cache::{FrameCache, FrameCacheStats, FrameKey};
pub use config::{SessionConfig, StickerConfig};
pub use editor::EditorSession;
pub use sticker::{
    MAX_STICKER_SCALE, MIN_STICKER_SCALE, STICKER_BASE_SIZE, STICKER_RESIZE_STEP, STICKER_TRAY,
    Sticker, StickerBoard, StickerId,
};

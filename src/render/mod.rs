//! Strip composition and rasterization.

/// Premultiplied compositing helpers.
pub mod composite;
pub(crate) mod overlay;
/// Visual description of a strip.
pub mod scene;
/// Rasterization capability and the CPU surface.
pub mod surface;

pub use scene::{
    CompositeRenderer, CompositeScene, DEFAULT_BRAND, HeaderSpec, HeaderView, PhotoSlot,
    StripStyle,
};
pub use surface::{CpuSurface, CpuSurfaceOpts, MAX_RASTER_DIM, RenderSurface};

use chrono::NaiveDate;
use kurbo::{Rect, Size};

use crate::capture::still::{EncodedStill, PhotoSet};
use crate::filter::Filter;
use crate::foundation::color::BorderColor;
use crate::session::sticker::Sticker;

/// Brand text printed in the header when none is configured.
pub const DEFAULT_BRAND: &str = "photobooth";

/// Header contents: brand line plus date stamp.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeaderSpec {
    /// Brand line.
    pub brand: String,
    /// Session date.
    pub date: NaiveDate,
}

impl HeaderSpec {
    /// Header stamped with today's local date.
    pub fn today(brand: impl Into<String>) -> Self {
        Self {
            brand: brand.into(),
            date: chrono::Local::now().date_naive(),
        }
    }

    /// `YYYY.MM.DD`.
    pub fn date_stamp(&self) -> String {
        self.date.format("%Y.%m.%d").to_string()
    }
}

impl Default for HeaderSpec {
    fn default() -> Self {
        Self::today(DEFAULT_BRAND)
    }
}

/// Everything that styles a strip apart from the photos and stickers.
#[derive(Clone, Debug, PartialEq)]
pub struct StripStyle {
    /// Filter burned into every photo.
    pub filter: Filter,
    /// Strip background and border.
    pub border: BorderColor,
    /// Header contents.
    pub header: HeaderSpec,
}

/// One photo cell of the strip.
#[derive(Clone, Debug, PartialEq)]
pub struct PhotoSlot {
    /// Placement in strip coordinates.
    pub rect: Rect,
    /// Burst this slot shows.
    pub burst: usize,
    /// Frame index inside that burst, already clamped.
    pub frame: usize,
    /// The selected frame.
    pub still: EncodedStill,
}

/// Header as it is drawn.
#[derive(Clone, Debug, PartialEq)]
pub struct HeaderView {
    /// Header band placement.
    pub rect: Rect,
    /// Brand line.
    pub brand: String,
    /// Formatted date stamp.
    pub date_stamp: String,
}

/// Fully resolved visual description of a strip at one render frame index.
///
/// This is the boundary between layout logic and pixels: a [`RenderSurface`] turns it into a
/// raster.
///
/// [`RenderSurface`]: crate::render::RenderSurface
#[derive(Clone, Debug, PartialEq)]
pub struct CompositeScene {
    /// Strip size in logical units.
    pub size: Size,
    /// Strip background.
    pub border: BorderColor,
    /// Filter applied to every photo.
    pub filter: Filter,
    /// Header band.
    pub header: HeaderView,
    /// One slot per burst, in shot order.
    pub slots: Vec<PhotoSlot>,
    /// Stickers in draw order.
    pub stickers: Vec<Sticker>,
}

/// Builds [`CompositeScene`]s from session state.
#[derive(Clone, Copy, Debug, Default)]
pub struct CompositeRenderer;

impl CompositeRenderer {
    /// Describe the strip with each burst showing `frame_index` (`None` = final shot).
    pub fn scene(
        &self,
        photos: &PhotoSet,
        style: &StripStyle,
        stickers: &[Sticker],
        frame_index: Option<usize>,
    ) -> CompositeScene {
        let geometry = photos.layout().geometry();

        let slots = geometry
            .slots
            .iter()
            .zip(photos.bursts())
            .enumerate()
            .map(|(i, (rect, burst))| {
                let frame = frame_index.map_or(burst.len() - 1, |f| f.min(burst.len() - 1));
                PhotoSlot {
                    rect: *rect,
                    burst: i,
                    frame,
                    still: burst.select(frame_index).clone(),
                }
            })
            .collect();

        CompositeScene {
            size: geometry.size,
            border: style.border,
            filter: style.filter,
            header: HeaderView {
                rect: geometry.header,
                brand: style.header.brand.clone(),
                date_stamp: style.header.date_stamp(),
            },
            slots,
            stickers: stickers.to_vec(),
        }
    }
}

use std::sync::Arc;

use anyhow::Context as _;

use crate::foundation::error::{PhotoboothError, PhotoboothResult};
use crate::layout::Layout;

/// Encoding of a captured still.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StillFormat {
    /// Lossy JPEG, what cameras hand out by default.
    Jpeg,
    /// Lossless PNG.
    Png,
}

/// One self-contained encoded camera frame.
///
/// Cloning is cheap: the encoded bytes are shared.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedStill {
    format: StillFormat,
    width: u32,
    height: u32,
    bytes: Arc<[u8]>,
}

impl EncodedStill {
    /// Wrap already-encoded bytes, reading the format and dimensions from the header.
    pub fn from_encoded(bytes: impl Into<Arc<[u8]>>) -> PhotoboothResult<Self> {
        let bytes: Arc<[u8]> = bytes.into();
        let format = match image::guess_format(&bytes).context("sniff still format")? {
            image::ImageFormat::Jpeg => StillFormat::Jpeg,
            image::ImageFormat::Png => StillFormat::Png,
            other => {
                return Err(PhotoboothError::validation(format!(
                    "unsupported still format {other:?} (expected jpeg or png)"
                )));
            }
        };
        let (width, height) = image::ImageReader::new(std::io::Cursor::new(&bytes[..]))
            .with_guessed_format()
            .context("read still header")?
            .into_dimensions()
            .context("read still dimensions")?;
        Ok(Self {
            format,
            width,
            height,
            bytes,
        })
    }

    /// Encode RGBA pixels as a JPEG still.
    pub fn encode_jpeg(pixels: &image::RgbaImage, quality: u8) -> PhotoboothResult<Self> {
        let rgb = image::DynamicImage::ImageRgba8(pixels.clone()).into_rgb8();
        let mut out = Vec::new();
        let encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100));
        rgb.write_with_encoder(encoder)
            .map_err(|e| PhotoboothError::encode(format!("jpeg still: {e}")))?;
        Ok(Self {
            format: StillFormat::Jpeg,
            width: pixels.width(),
            height: pixels.height(),
            bytes: out.into(),
        })
    }

    /// Encoding of the bytes.
    pub fn format(&self) -> StillFormat {
        self.format
    }

    /// Pixel width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Pixel height.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Encoded bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Decode to straight-alpha RGBA8.
    pub fn decode(&self) -> PhotoboothResult<image::RgbaImage> {
        let fmt = match self.format {
            StillFormat::Jpeg => image::ImageFormat::Jpeg,
            StillFormat::Png => image::ImageFormat::Png,
        };
        let img = image::load_from_memory_with_format(&self.bytes, fmt)
            .context("decode captured still")?;
        Ok(img.into_rgba8())
    }
}

/// Ordered frames sampled during one shot's countdown.
///
/// Never empty; all frames share the same dimensions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Burst {
    frames: Vec<EncodedStill>,
}

impl Burst {
    /// Validate and wrap a committed frame buffer.
    pub fn new(frames: Vec<EncodedStill>) -> PhotoboothResult<Self> {
        let Some(first) = frames.first() else {
            return Err(PhotoboothError::validation("a burst needs at least one frame"));
        };
        let (w, h) = (first.width(), first.height());
        if let Some((i, f)) = frames
            .iter()
            .enumerate()
            .find(|(_, f)| f.width() != w || f.height() != h)
        {
            return Err(PhotoboothError::validation(format!(
                "burst frame {i} is {}x{}, expected {w}x{h}",
                f.width(),
                f.height()
            )));
        }
        Ok(Self { frames })
    }

    /// Number of frames, always >= 1.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always `false`; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frames in capture order.
    pub fn frames(&self) -> &[EncodedStill] {
        &self.frames
    }

    /// The final (forced) capture of the shot.
    pub fn last(&self) -> &EncodedStill {
        &self.frames[self.frames.len() - 1]
    }

    /// Frame shown for a render frame index.
    ///
    /// `None` picks the last frame; `Some(i)` is clamped to the burst length.
    pub fn select(&self, frame_index: Option<usize>) -> &EncodedStill {
        match frame_index {
            None => self.last(),
            Some(i) => &self.frames[i.min(self.frames.len() - 1)],
        }
    }
}

/// All bursts of a completed session, one per layout slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhotoSet {
    layout: Layout,
    bursts: Vec<Burst>,
}

impl PhotoSet {
    /// Bundle bursts for `layout`; the count must match the layout's shot count.
    pub fn new(layout: Layout, bursts: Vec<Burst>) -> PhotoboothResult<Self> {
        if bursts.len() != layout.shot_count() {
            return Err(PhotoboothError::validation(format!(
                "layout {layout} needs {} bursts, got {}",
                layout.shot_count(),
                bursts.len()
            )));
        }
        Ok(Self { layout, bursts })
    }

    /// Layout the set was captured for.
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Bursts in shot order.
    pub fn bursts(&self) -> &[Burst] {
        &self.bursts
    }

    /// Length of the shortest burst; this bounds GIF animation length.
    pub fn shortest_burst(&self) -> usize {
        self.bursts.iter().map(Burst::len).min().unwrap_or(0)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub(crate) fn solid_still(w: u32, h: u32, rgb: [u8; 3]) -> EncodedStill {
        let img = image::RgbaImage::from_pixel(w, h, image::Rgba([rgb[0], rgb[1], rgb[2], 255]));
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        EncodedStill::from_encoded(buf).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::solid_still;
    use super::*;

    #[test]
    fn from_encoded_reads_format_and_size() {
        let s = solid_still(6, 4, [1, 2, 3]);
        assert_eq!(s.format(), StillFormat::Png);
        assert_eq!((s.width(), s.height()), (6, 4));
        assert_eq!(s.decode().unwrap().get_pixel(0, 0).0, [1, 2, 3, 255]);
    }

    #[test]
    fn from_encoded_rejects_garbage() {
        assert!(EncodedStill::from_encoded(vec![0u8, 1, 2, 3]).is_err());
    }

    #[test]
    fn jpeg_encode_keeps_dimensions() {
        let img = image::RgbaImage::from_pixel(8, 6, image::Rgba([200, 10, 10, 255]));
        let s = EncodedStill::encode_jpeg(&img, 90).unwrap();
        assert_eq!(s.format(), StillFormat::Jpeg);
        assert_eq!((s.width(), s.height()), (8, 6));
        let round = EncodedStill::from_encoded(s.bytes().to_vec()).unwrap();
        assert_eq!((round.width(), round.height()), (8, 6));
    }

    #[test]
    fn burst_rejects_empty_and_mixed_sizes() {
        assert!(Burst::new(Vec::new()).is_err());
        let err = Burst::new(vec![solid_still(4, 4, [0; 3]), solid_still(5, 4, [0; 3])]);
        assert!(err.is_err());
    }

    #[test]
    fn select_none_matches_last_index() {
        let frames: Vec<_> = (0..5u8).map(|i| solid_still(2, 2, [i, i, i])).collect();
        let burst = Burst::new(frames).unwrap();
        assert_eq!(burst.select(None), burst.select(Some(burst.len() - 1)));
        assert_eq!(burst.select(Some(99)), burst.last());
        assert_eq!(burst.select(Some(0)), &burst.frames()[0]);
    }

    #[test]
    fn photo_set_enforces_shot_count() {
        let burst = Burst::new(vec![solid_still(2, 2, [0; 3])]).unwrap();
        assert!(PhotoSet::new(Layout::FourSquare, vec![burst.clone(); 3]).is_err());
        let set = PhotoSet::new(Layout::ThreeDiagonal, vec![burst; 3]).unwrap();
        assert_eq!(set.shortest_burst(), 1);
    }
}

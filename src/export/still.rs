use std::str::FromStr;

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::export::ExportGuard;
use crate::export::file::{ExportedFile, FILE_PREFIX};
use crate::export::progress::{ProgressObserver, ProgressTracker};
use crate::foundation::error::{PhotoboothError, PhotoboothResult};
use crate::render::surface::RenderSurface;
use crate::session::editor::EditorSession;

/// Container for a single-image export.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StillExportFormat {
    /// Lossless PNG with alpha.
    #[default]
    #[serde(rename = "png")]
    Png,
    /// Baseline JPEG; alpha is dropped.
    #[serde(rename = "jpg", alias = "jpeg")]
    Jpeg,
}

impl StillExportFormat {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }

    /// MIME type of the encoded bytes.
    pub fn media_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }
}

impl FromStr for StillExportFormat {
    type Err = PhotoboothError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            other => Err(PhotoboothError::validation(format!(
                "unknown still format '{other}' (expected png or jpg)"
            ))),
        }
    }
}

/// Options for [`export_still`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StillExportOpts {
    /// Output container.
    pub format: StillExportFormat,
    /// Raster scale relative to the strip's logical size.
    pub scale: f64,
    /// JPEG quality, 1..=100. Ignored for PNG.
    pub jpeg_quality: u8,
}

impl Default for StillExportOpts {
    fn default() -> Self {
        Self {
            format: StillExportFormat::Png,
            scale: 2.0,
            jpeg_quality: 92,
        }
    }
}

impl StillExportOpts {
    /// Reject options the encoders cannot honor.
    pub fn validate(&self) -> PhotoboothResult<()> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(PhotoboothError::validation(
                "still export scale must be finite and > 0",
            ));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(PhotoboothError::validation(
                "jpeg_quality must be in 1..=100",
            ));
        }
        Ok(())
    }
}

/// Export the strip with the final shot of every burst as one image.
#[tracing::instrument(skip_all, fields(format = ?opts.format, scale = opts.scale))]
pub fn export_still(
    session: &mut EditorSession,
    surface: &mut dyn RenderSurface,
    opts: &StillExportOpts,
    progress: &mut dyn ProgressObserver,
) -> PhotoboothResult<ExportedFile> {
    opts.validate()?;
    let guard = ExportGuard::begin(session);
    let mut tracker = ProgressTracker::new(progress);

    tracker.produced(0, 1);
    let scene = guard.session().scene_at(None);
    let img = surface.rasterize(&scene, opts.scale)?;
    tracker.produced(1, 1);

    let bytes = encode_still(&img, opts)?;
    tracker.encoded(1, 1);
    drop(guard);

    let file = ExportedFile::new(
        FILE_PREFIX,
        opts.format.extension(),
        opts.format.media_type(),
        bytes,
    );
    info!(
        file = %file.file_name,
        width = img.width(),
        height = img.height(),
        bytes = file.bytes.len(),
        "still exported"
    );
    tracker.finish();
    Ok(file)
}

fn encode_still(img: &RgbaImage, opts: &StillExportOpts) -> PhotoboothResult<Vec<u8>> {
    let mut out = Vec::new();
    match opts.format {
        StillExportFormat::Png => {
            let encoder = image::codecs::png::PngEncoder::new(&mut out);
            img.write_with_encoder(encoder)
                .map_err(|e| PhotoboothError::encode(format!("png export: {e}")))?;
        }
        StillExportFormat::Jpeg => {
            let rgb = image::DynamicImage::ImageRgba8(img.clone()).into_rgb8();
            let encoder =
                image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, opts.jpeg_quality);
            rgb.write_with_encoder(encoder)
                .map_err(|e| PhotoboothError::encode(format!("jpeg export: {e}")))?;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_names_parse_both_ways() {
        assert_eq!("PNG".parse::<StillExportFormat>().unwrap(), StillExportFormat::Png);
        assert_eq!("jpeg".parse::<StillExportFormat>().unwrap(), StillExportFormat::Jpeg);
        assert!("bmp".parse::<StillExportFormat>().is_err());
        let f: StillExportFormat = serde_json::from_str("\"jpg\"").unwrap();
        assert_eq!(f.extension(), "jpg");
        assert_eq!(f.media_type(), "image/jpeg");
    }

    #[test]
    fn defaults_are_png_at_double_scale() {
        let o = StillExportOpts::default();
        assert_eq!(o.format, StillExportFormat::Png);
        assert_eq!(o.scale, 2.0);
        assert_eq!(o.jpeg_quality, 92);
        o.validate().unwrap();
    }

    #[test]
    fn encoded_bytes_sniff_as_requested_format() {
        let img = RgbaImage::from_pixel(6, 4, image::Rgba([10, 20, 30, 255]));
        let png = encode_still(&img, &StillExportOpts::default()).unwrap();
        assert_eq!(image::guess_format(&png).unwrap(), image::ImageFormat::Png);

        let jpg = encode_still(
            &img,
            &StillExportOpts {
                format: StillExportFormat::Jpeg,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(image::guess_format(&jpg).unwrap(), image::ImageFormat::Jpeg);
    }

    #[test]
    fn bad_options_are_rejected() {
        let o = StillExportOpts {
            scale: 0.0,
            ..Default::default()
        };
        assert!(o.validate().is_err());
        let o = StillExportOpts {
            jpeg_quality: 0,
            ..Default::default()
        };
        assert!(o.validate().is_err());
    }
}

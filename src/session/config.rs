use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use kurbo::Point;
use serde::{Deserialize, Serialize};

use crate::capture::controller::CaptureSettings;
use crate::export::motion::GifExportOpts;
use crate::export::still::StillExportOpts;
use crate::filter::Filter;
use crate::foundation::color::BorderColor;
use crate::foundation::error::{PhotoboothError, PhotoboothResult};
use crate::layout::Layout;
use crate::render::scene::{DEFAULT_BRAND, HeaderSpec};
use crate::session::editor::EditorSession;
use crate::session::sticker::{MAX_STICKER_SCALE, MIN_STICKER_SCALE, StickerId};

/// A sticker placed from configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StickerConfig {
    /// Glyph drawn on the strip.
    pub glyph: String,
    /// Strip-space x of the glyph centre.
    pub x: f64,
    /// Strip-space y of the glyph centre.
    pub y: f64,
    /// Initial scale.
    #[serde(default = "default_sticker_scale")]
    pub scale: f64,
}

fn default_sticker_scale() -> f64 {
    1.0
}

/// JSON-facing description of one photobooth session.
///
/// Every field is optional; omitted fields take the documented defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Strip layout.
    pub layout: Layout,
    /// Filter chosen before shooting.
    pub filter: Filter,
    /// Countdown per shot, 1..=10 seconds.
    pub timer_secs: u32,
    /// Burst samples per countdown second, 1..=30.
    pub samples_per_sec: u32,
    /// Flash acknowledgment after each shot.
    pub flash_ms: u64,
    /// Strip background.
    pub border: BorderColor,
    /// Header brand line.
    pub brand: String,
    /// Stickers placed before export.
    pub stickers: Vec<StickerConfig>,
    /// Still export options.
    pub still: StillExportOpts,
    /// Animated export options.
    pub gif: GifExportOpts,
}

impl Default for SessionConfig {
    fn default() -> Self {
        let capture = CaptureSettings::default();
        Self {
            layout: capture.layout,
            filter: capture.filter,
            timer_secs: capture.timer_secs,
            samples_per_sec: capture.samples_per_sec,
            flash_ms: capture.flash.as_millis() as u64,
            border: BorderColor::default(),
            brand: DEFAULT_BRAND.to_owned(),
            stickers: Vec::new(),
            still: StillExportOpts::default(),
            gif: GifExportOpts::default(),
        }
    }
}

impl SessionConfig {
    /// Parse a config from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> PhotoboothResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| PhotoboothError::validation(format!("parse session config JSON: {e}")))
    }

    /// Parse a config from a JSON string.
    pub fn from_json_str(s: &str) -> PhotoboothResult<Self> {
        serde_json::from_str(s)
            .map_err(|e| PhotoboothError::validation(format!("parse session config JSON: {e}")))
    }

    /// Parse a config from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> PhotoboothResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            PhotoboothError::validation(format!("open session config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check ranges that serde cannot express.
    pub fn validate(&self) -> PhotoboothResult<()> {
        self.capture_settings().validate()?;
        if self.brand.chars().count() > 64 {
            return Err(PhotoboothError::validation(
                "brand must be at most 64 characters",
            ));
        }
        for (i, s) in self.stickers.iter().enumerate() {
            if s.glyph.trim().is_empty() {
                return Err(PhotoboothError::validation(format!(
                    "stickers[{i}].glyph must not be empty"
                )));
            }
            if !s.x.is_finite() || !s.y.is_finite() {
                return Err(PhotoboothError::validation(format!(
                    "stickers[{i}] position must be finite"
                )));
            }
            if !(MIN_STICKER_SCALE..=MAX_STICKER_SCALE).contains(&s.scale) {
                return Err(PhotoboothError::validation(format!(
                    "stickers[{i}].scale must be in {MIN_STICKER_SCALE}..={MAX_STICKER_SCALE}"
                )));
            }
        }
        self.still.validate()?;
        self.gif.validate()
    }

    /// Capture settings described by this config.
    pub fn capture_settings(&self) -> CaptureSettings {
        CaptureSettings {
            layout: self.layout,
            filter: self.filter,
            timer_secs: self.timer_secs,
            samples_per_sec: self.samples_per_sec,
            flash: Duration::from_millis(self.flash_ms),
        }
    }

    /// Header carrying the configured brand and today's date.
    pub fn header(&self) -> HeaderSpec {
        HeaderSpec::today(self.brand.clone())
    }

    /// Apply border and stickers to a freshly captured session.
    pub fn apply_to(&self, session: &mut EditorSession) -> PhotoboothResult<Vec<StickerId>> {
        session.set_border(self.border);
        self.stickers
            .iter()
            .map(|s| session.add_sticker(&s.glyph, Point::new(s.x, s.y), s.scale))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::still::StillExportFormat;

    #[test]
    fn empty_object_yields_defaults() {
        let cfg = SessionConfig::from_json_str("{}").unwrap();
        assert_eq!(cfg, SessionConfig::default());
        assert_eq!(cfg.timer_secs, 3);
        assert_eq!(cfg.samples_per_sec, 10);
        assert_eq!(cfg.brand, "photobooth");
        assert_eq!(cfg.gif.loops, 3);
        cfg.validate().unwrap();
    }

    #[test]
    fn full_config_parses() {
        let cfg = SessionConfig::from_json_str(
            r##"{
                "layout": "6-grid",
                "filter": "vintage",
                "timer_secs": 5,
                "border": "#ff8800",
                "brand": "Sam & Alex",
                "stickers": [{"glyph": "⭐", "x": 40, "y": 80}],
                "still": {"format": "jpg"},
                "gif": {"loops": 2, "workers": 1}
            }"##,
        )
        .unwrap();
        cfg.validate().unwrap();
        assert_eq!(cfg.layout, Layout::SixGrid);
        assert_eq!(cfg.filter, Filter::Vintage);
        assert_eq!(cfg.border, BorderColor::rgb(0xff, 0x88, 0x00));
        assert_eq!(cfg.stickers[0].scale, 1.0);
        assert_eq!(cfg.still.format, StillExportFormat::Jpeg);
        assert_eq!(cfg.still.scale, 2.0);
        assert_eq!(cfg.gif.loops, 2);
        assert_eq!(cfg.gif.frame_delay_ms, 100);

        let settings = cfg.capture_settings();
        assert_eq!(settings.timer_secs, 5);
        assert_eq!(settings.flash, Duration::from_millis(200));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(SessionConfig::from_json_str(r#"{"timer": 3}"#).is_err());
        assert!(SessionConfig::from_json_str(r#"{"gif": {"fps": 10}}"#).is_err());
    }

    #[test]
    fn out_of_range_values_fail_validation() {
        for json in [
            r#"{"timer_secs": 0}"#,
            r#"{"samples_per_sec": 31}"#,
            r#"{"stickers": [{"glyph": "x", "x": 0, "y": 0, "scale": 4.0}]}"#,
            r#"{"stickers": [{"glyph": " ", "x": 0, "y": 0}]}"#,
            r#"{"gif": {"workers": 0}}"#,
        ] {
            let cfg = SessionConfig::from_json_str(json).unwrap();
            assert!(cfg.validate().is_err(), "{json}");
        }
    }

    #[test]
    fn from_path_reports_missing_file() {
        let err = SessionConfig::from_path("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, PhotoboothError::Validation(_)));
    }
}

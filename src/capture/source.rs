use std::collections::VecDeque;
use std::path::Path;

use anyhow::Context as _;
use tracing::debug;

use crate::capture::still::EncodedStill;
use crate::foundation::error::{PhotoboothError, PhotoboothResult};

/// Kind of an enumerated media device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceKind {
    /// Camera.
    VideoInput,
    /// Microphone; listed by some platforms but never opened here.
    AudioInput,
}

/// One entry of the platform's device list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Opaque id accepted by [`CameraProvider::open`].
    pub id: String,
    /// Human-readable label.
    pub label: String,
    /// Device kind.
    pub kind: DeviceKind,
}

/// A live camera stream that can hand out the current frame.
pub trait FrameSource {
    /// Grab the frame currently on screen.
    ///
    /// Returns `None` when the stream has nothing to give yet (camera warming up, dropped
    /// frame). Callers treat that as a miss, not an error.
    fn capture_still(&mut self) -> Option<EncodedStill>;
}

/// Platform camera access: device enumeration plus stream opening.
pub trait CameraProvider {
    /// All media devices currently visible.
    fn devices(&self) -> Vec<DeviceInfo>;

    /// Open a stream on a video input.
    fn open(&mut self, device_id: &str) -> PhotoboothResult<Box<dyn FrameSource>>;

    /// Video inputs only.
    fn video_inputs(&self) -> Vec<DeviceInfo> {
        self.devices()
            .into_iter()
            .filter(|d| d.kind == DeviceKind::VideoInput)
            .collect()
    }

    /// Open `preferred` when given, otherwise the first video input.
    ///
    /// Fails with [`PhotoboothError::DeviceUnavailable`] when no video input is listed.
    fn open_default(&mut self, preferred: Option<&str>) -> PhotoboothResult<Box<dyn FrameSource>> {
        let inputs = self.video_inputs();
        let Some(first) = inputs.first() else {
            return Err(PhotoboothError::device("no video input devices found"));
        };
        let id = match preferred {
            Some(p) => inputs
                .iter()
                .find(|d| d.id == p)
                .map(|d| d.id.clone())
                .ok_or_else(|| PhotoboothError::device(format!("camera '{p}' not found")))?,
            None => first.id.clone(),
        };
        debug!(device = %id, "opening camera");
        self.open(&id)
    }
}

/// Synthetic camera producing moving color bars as JPEG stills.
///
/// `miss_every` makes every n-th grab return nothing, which is handy for exercising the
/// dropped-sample path.
#[derive(Clone, Debug)]
pub struct PatternCamera {
    width: u32,
    height: u32,
    miss_every: Option<u32>,
    jpeg_quality: u8,
}

impl PatternCamera {
    /// Camera with the given output size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            miss_every: None,
            jpeg_quality: 85,
        }
    }

    /// Drop every n-th grab (n >= 1; n == 1 drops everything).
    pub fn with_miss_every(mut self, n: u32) -> Self {
        self.miss_every = Some(n.max(1));
        self
    }
}

impl Default for PatternCamera {
    fn default() -> Self {
        Self::new(320, 240)
    }
}

impl CameraProvider for PatternCamera {
    fn devices(&self) -> Vec<DeviceInfo> {
        vec![DeviceInfo {
            id: "pattern:0".to_owned(),
            label: format!("Test pattern {}x{}", self.width, self.height),
            kind: DeviceKind::VideoInput,
        }]
    }

    fn open(&mut self, device_id: &str) -> PhotoboothResult<Box<dyn FrameSource>> {
        if device_id != "pattern:0" {
            return Err(PhotoboothError::device(format!(
                "camera '{device_id}' not found"
            )));
        }
        Ok(Box::new(PatternStream {
            cam: self.clone(),
            tick: 0,
        }))
    }
}

struct PatternStream {
    cam: PatternCamera,
    tick: u32,
}

impl FrameSource for PatternStream {
    fn capture_still(&mut self) -> Option<EncodedStill> {
        self.tick = self.tick.wrapping_add(1);
        if let Some(n) = self.cam.miss_every
            && self.tick % n == 0
        {
            return None;
        }

        let (w, h) = (self.cam.width, self.cam.height);
        let shift = self.tick.wrapping_mul(7);
        let img = image::RgbaImage::from_fn(w, h, |x, y| {
            let band = ((x + shift) * 6 / w.max(1)) % 6;
            let base: [u8; 3] = match band {
                0 => [230, 60, 60],
                1 => [240, 170, 40],
                2 => [240, 230, 80],
                3 => [70, 190, 90],
                4 => [60, 120, 220],
                _ => [150, 80, 200],
            };
            let shade = (y * 80 / h.max(1)) as u8;
            image::Rgba([
                base[0].saturating_sub(shade),
                base[1].saturating_sub(shade),
                base[2].saturating_sub(shade),
                255,
            ])
        });
        // A failed encode is indistinguishable from a dropped frame for callers.
        EncodedStill::encode_jpeg(&img, self.cam.jpeg_quality).ok()
    }
}

/// Camera that replays a fixed list of grabs in order, then repeats the last one.
///
/// `None` entries model misses.
#[derive(Clone, Debug, Default)]
pub struct ReplayCamera {
    grabs: Vec<Option<EncodedStill>>,
}

impl ReplayCamera {
    /// Replay exactly these grabs.
    pub fn new(grabs: Vec<Option<EncodedStill>>) -> Self {
        Self { grabs }
    }

    /// Load every `.jpg`/`.jpeg`/`.png` in `dir`, sorted by file name.
    pub fn from_dir(dir: &Path) -> PhotoboothResult<Self> {
        let rd = std::fs::read_dir(dir)
            .with_context(|| format!("read frame directory '{}'", dir.display()))?;

        let mut paths = Vec::new();
        for entry in rd.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
                continue;
            };
            let ext = ext.to_ascii_lowercase();
            if ext == "jpg" || ext == "jpeg" || ext == "png" {
                paths.push(path);
            }
        }
        paths.sort();

        let mut grabs = Vec::with_capacity(paths.len());
        for path in paths {
            let bytes = std::fs::read(&path)
                .with_context(|| format!("read frame '{}'", path.display()))?;
            grabs.push(Some(EncodedStill::from_encoded(bytes)?));
        }
        debug!(dir = %dir.display(), frames = grabs.len(), "loaded replay frames");
        Ok(Self { grabs })
    }
}

impl CameraProvider for ReplayCamera {
    fn devices(&self) -> Vec<DeviceInfo> {
        if self.grabs.is_empty() {
            return Vec::new();
        }
        vec![DeviceInfo {
            id: "replay:0".to_owned(),
            label: format!("Replay ({} grabs)", self.grabs.len()),
            kind: DeviceKind::VideoInput,
        }]
    }

    fn open(&mut self, device_id: &str) -> PhotoboothResult<Box<dyn FrameSource>> {
        if device_id != "replay:0" || self.grabs.is_empty() {
            return Err(PhotoboothError::device(format!(
                "camera '{device_id}' not found"
            )));
        }
        Ok(Box::new(ReplayStream {
            pending: self.grabs.iter().cloned().collect(),
            last: None,
        }))
    }
}

struct ReplayStream {
    pending: VecDeque<Option<EncodedStill>>,
    last: Option<EncodedStill>,
}

impl FrameSource for ReplayStream {
    fn capture_still(&mut self) -> Option<EncodedStill> {
        match self.pending.pop_front() {
            Some(grab) => {
                if let Some(still) = &grab {
                    self.last = Some(still.clone());
                }
                grab
            }
            None => self.last.clone(),
        }
    }
}

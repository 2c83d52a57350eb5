use std::time::Duration;

use tracing::{debug, info, trace, warn};

use crate::capture::clock::{CancelToken, Clock};
use crate::capture::source::{CameraProvider, FrameSource};
use crate::capture::still::{Burst, EncodedStill, PhotoSet};
use crate::filter::Filter;
use crate::foundation::error::{PhotoboothError, PhotoboothResult};
use crate::layout::Layout;

/// Timing and layout for one capture run.
#[derive(Clone, Debug, PartialEq)]
pub struct CaptureSettings {
    /// Decides how many shots are taken.
    pub layout: Layout,
    /// Filter active while shooting; handed on to the editor.
    pub filter: Filter,
    /// Countdown length per shot, in seconds.
    pub timer_secs: u32,
    /// Interval samples taken per countdown second.
    pub samples_per_sec: u32,
    /// How long the flash acknowledgment stays up after each shot.
    pub flash: Duration,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            layout: Layout::FourDiagonal,
            filter: Filter::Normal,
            timer_secs: 3,
            samples_per_sec: 10,
            flash: Duration::from_millis(200),
        }
    }
}

impl CaptureSettings {
    /// Reject timings that cannot produce a sensible countdown.
    pub fn validate(&self) -> PhotoboothResult<()> {
        if !(1..=10).contains(&self.timer_secs) {
            return Err(PhotoboothError::validation("timer_secs must be in 1..=10"));
        }
        if !(1..=30).contains(&self.samples_per_sec) {
            return Err(PhotoboothError::validation(
                "samples_per_sec must be in 1..=30",
            ));
        }
        Ok(())
    }

    /// Nominal frames per burst when no sample misses.
    pub fn nominal_burst_len(&self) -> usize {
        (self.timer_secs * self.samples_per_sec) as usize
    }
}

/// Progress notifications emitted while shooting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CaptureEvent {
    /// Countdown display for `shot` (0-based) now reads `remaining` seconds.
    Countdown {
        /// Shot index.
        shot: usize,
        /// Seconds left on the display.
        remaining: u32,
    },
    /// The forced capture happened; show the flash.
    Flash {
        /// Shot index.
        shot: usize,
    },
    /// A burst was committed.
    BurstCommitted {
        /// Shot index.
        shot: usize,
        /// Frames in the committed burst.
        frames: usize,
        /// Samples that yielded no frame.
        dropped: usize,
    },
    /// Every shot is done.
    Completed {
        /// Number of bursts captured.
        bursts: usize,
    },
}

/// Result of a finished capture run.
#[derive(Clone, Debug)]
pub struct CaptureOutcome {
    /// One burst per layout slot.
    pub photos: PhotoSet,
    /// Filter chosen during capture.
    pub filter: Filter,
}

/// Drives countdowns, samples the frame source and commits bursts.
#[derive(Clone, Debug, Default)]
pub struct BurstCaptureController {
    settings: CaptureSettings,
    cancel: CancelToken,
}

impl BurstCaptureController {
    /// Controller with validated settings.
    pub fn new(settings: CaptureSettings) -> PhotoboothResult<Self> {
        settings.validate()?;
        Ok(Self {
            settings,
            cancel: CancelToken::new(),
        })
    }

    /// Settings in effect.
    pub fn settings(&self) -> &CaptureSettings {
        &self.settings
    }

    /// Token that abandons the run between timer ticks.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Enumerate cameras, open one and run the capture.
    ///
    /// No video input means [`PhotoboothError::DeviceUnavailable`] before any timer starts.
    #[tracing::instrument(skip_all, fields(layout = %self.settings.layout))]
    pub fn run_with_camera(
        &self,
        camera: &mut dyn CameraProvider,
        device: Option<&str>,
        clock: &mut dyn Clock,
        on_event: &mut dyn FnMut(&CaptureEvent),
    ) -> PhotoboothResult<CaptureOutcome> {
        let mut source = camera.open_default(device)?;
        self.run(source.as_mut(), clock, on_event)
    }

    /// Capture every shot of the layout from an already open source.
    #[tracing::instrument(skip_all, fields(layout = %self.settings.layout))]
    pub fn run(
        &self,
        source: &mut dyn FrameSource,
        clock: &mut dyn Clock,
        on_event: &mut dyn FnMut(&CaptureEvent),
    ) -> PhotoboothResult<CaptureOutcome> {
        let shots = self.settings.layout.shot_count();
        let mut bursts = Vec::with_capacity(shots);

        for shot in 0..shots {
            let burst = self.capture_shot(shot, source, clock, on_event)?;
            bursts.push(burst);
        }

        on_event(&CaptureEvent::Completed {
            bursts: bursts.len(),
        });
        info!(bursts = bursts.len(), "capture complete");

        Ok(CaptureOutcome {
            photos: PhotoSet::new(self.settings.layout, bursts)?,
            filter: self.settings.filter,
        })
    }

    fn capture_shot(
        &self,
        shot: usize,
        source: &mut dyn FrameSource,
        clock: &mut dyn Clock,
        on_event: &mut dyn FnMut(&CaptureEvent),
    ) -> PhotoboothResult<Burst> {
        let rate = self.settings.samples_per_sec;
        let timer = self.settings.timer_secs;
        let ticks = timer * rate;
        let interval = Duration::from_secs(1) / rate;

        let mut buffer = BurstBuffer::with_capacity(ticks as usize);
        on_event(&CaptureEvent::Countdown {
            shot,
            remaining: timer,
        });

        for tick in 1..=ticks {
            if self.cancel.is_cancelled() {
                debug!(shot, tick, "capture cancelled");
                return Err(PhotoboothError::Cancelled);
            }
            clock.wait(interval);

            if tick % rate == 0 {
                on_event(&CaptureEvent::Countdown {
                    shot,
                    remaining: timer - tick / rate,
                });
            }
            // The last tick is the forced capture below.
            if tick < ticks {
                buffer.offer(source.capture_still());
            }
        }

        let forced = source.capture_still();
        if forced.is_none() {
            warn!(shot, "forced capture yielded no frame");
        }
        buffer.offer(forced);

        on_event(&CaptureEvent::Flash { shot });
        if self.cancel.is_cancelled() {
            debug!(shot, "capture cancelled during flash");
            return Err(PhotoboothError::Cancelled);
        }
        if !self.settings.flash.is_zero() {
            clock.wait(self.settings.flash);
        }

        let dropped = buffer.dropped;
        if buffer.frames.is_empty() {
            return Err(PhotoboothError::capture(format!(
                "shot {shot} produced no frames"
            )));
        }
        let burst = Burst::new(buffer.frames)?;
        debug!(shot, frames = burst.len(), dropped, "burst committed");
        on_event(&CaptureEvent::BurstCommitted {
            shot,
            frames: burst.len(),
            dropped,
        });
        Ok(burst)
    }
}

struct BurstBuffer {
    frames: Vec<EncodedStill>,
    dropped: usize,
}

impl BurstBuffer {
    fn with_capacity(n: usize) -> Self {
        Self {
            frames: Vec::with_capacity(n),
            dropped: 0,
        }
    }

    fn offer(&mut self, grab: Option<EncodedStill>) {
        let Some(still) = grab else {
            self.dropped += 1;
            return;
        };
        if let Some(first) = self.frames.first()
            && (first.width(), first.height()) != (still.width(), still.height())
        {
            trace!(
                got_w = still.width(),
                got_h = still.height(),
                "dropping frame with mismatched size"
            );
            self.dropped += 1;
            return;
        }
        self.frames.push(still);
    }
}

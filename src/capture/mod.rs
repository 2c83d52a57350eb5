//! Camera access and timed burst capture.
//!
//! A capture run counts down each shot, samples the [`FrameSource`] about ten times per second,
//! forces one last grab at zero and commits the samples as a [`Burst`]. A run ends with a
//! [`PhotoSet`] holding exactly one burst per layout slot.

/// Timer and cancellation capabilities.
pub mod clock;
/// The burst capture controller.
pub mod controller;
/// Camera enumeration and frame sources.
pub mod source;
/// Encoded stills, bursts and photo sets.
pub mod still;

pub use clock::{CancelToken, Clock, ManualClock, SystemClock};
pub use controller::{BurstCaptureController, CaptureEvent, CaptureOutcome, CaptureSettings};
pub use source::{CameraProvider, DeviceInfo, DeviceKind, FrameSource, PatternCamera, ReplayCamera};
pub use still::{Burst, EncodedStill, PhotoSet, StillFormat};

/// Crate-wide result alias.
pub type PhotoboothResult<T> = Result<T, PhotoboothError>;

/// Error taxonomy for capture, rendering and export.
///
/// Every variant is terminal for the operation that produced it; nothing in the crate retries
/// automatically.
#[derive(thiserror::Error, Debug)]
pub enum PhotoboothError {
    /// Invalid configuration or input data.
    #[error("validation error: {0}")]
    Validation(String),

    /// No video input could be enumerated or opened.
    #[error("camera unavailable: {0}")]
    DeviceUnavailable(String),

    /// A shot could not produce a single frame.
    #[error("capture error: {0}")]
    Capture(String),

    /// The capture run was abandoned through its cancel token.
    #[error("capture cancelled")]
    Cancelled,

    /// Turning a composite scene into pixels failed.
    #[error("rasterization error: {0}")]
    Raster(String),

    /// Still or GIF encoding failed.
    #[error("encoding error: {0}")]
    Encode(String),

    /// Bursts are too short to animate.
    #[error("bursts hold {0} frame(s); at least 2 are needed for an animation")]
    NotAnimatable(usize),

    /// Wrapped lower-level error (I/O, decode).
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PhotoboothError {
    /// Build a [`PhotoboothError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PhotoboothError::DeviceUnavailable`].
    pub fn device(msg: impl Into<String>) -> Self {
        Self::DeviceUnavailable(msg.into())
    }

    /// Build a [`PhotoboothError::Capture`].
    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture(msg.into())
    }

    /// Build a [`PhotoboothError::Raster`].
    pub fn raster(msg: impl Into<String>) -> Self {
        Self::Raster(msg.into())
    }

    /// Build a [`PhotoboothError::Encode`].
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}

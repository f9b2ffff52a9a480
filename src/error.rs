use thiserror::Error;

/// Errors raised when validating a motion at an input boundary.
///
/// The transform engine itself never returns these; `apply` is total over
/// IEEE-754 doubles and lets NaN/Inf propagate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MotionError {
    /// Rotation angle is NaN or infinite
    #[error("Rotation angle must be finite, got {0}")]
    NonFiniteAngle(f64),

    /// Translation component is NaN or infinite
    #[error("Translation must be finite, got ({dx}, {dy})")]
    NonFiniteTranslation { dx: f64, dy: f64 },
}

/// Errors related to the viewer extent and its registrations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ViewerError {
    /// Viewer has zero width or height
    #[error("Viewer extent must be non-empty, got {width}x{height}")]
    EmptyExtent { width: u32, height: u32 },

    /// Viewer extent does not fit in signed 32-bit pixel coordinates
    #[error("Viewer extent {width}x{height} exceeds the addressable pixel range")]
    ExtentTooLarge { width: u32, height: u32 },

    /// Initial slide offset is NaN or infinite
    #[error("Initial offset must be finite, got ({ox}, {oy})")]
    NonFiniteOffset { ox: f64, oy: f64 },

    /// Viewer pixel lies outside the viewer extent
    #[error("Viewer pixel ({vx}, {vy}) is outside the {width}x{height} viewer")]
    PixelOutOfBounds {
        vx: i64,
        vy: i64,
        width: u32,
        height: u32,
    },

    /// Undo requested with an empty motion history
    #[error("No motion to undo")]
    NothingToUndo,
}

/// Errors that can occur when managing viewer sessions
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    /// No live session with this identifier
    #[error("Viewer not found: {viewer_id}")]
    NotFound { viewer_id: String },

    /// Requested viewer exceeds the configured pixel budget
    #[error("Viewer of {requested} pixels exceeds the limit of {limit} pixels")]
    TooLarge { requested: u64, limit: u64 },

    /// Invalid motion submitted to a session
    #[error("Invalid motion: {0}")]
    Motion(#[from] MotionError),

    /// Viewer-level error
    #[error("Viewer error: {0}")]
    Viewer(#[from] ViewerError),

    /// Background computation failed to complete
    #[error("Worker failed: {message}")]
    Worker { message: String },
}

/// Errors that can occur when rendering a view of a slide image
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    /// The slide image could not be read or decoded
    #[error("Failed to decode slide image: {message}")]
    DecodeError { message: String },

    /// The rendered view could not be encoded
    #[error("Failed to encode view: {message}")]
    EncodeError { message: String },

    /// JPEG quality outside 1-100
    #[error("Invalid quality: {quality} (must be 1-100)")]
    InvalidQuality { quality: u8 },

    /// Viewer-level error
    #[error("Viewer error: {0}")]
    Viewer(#[from] ViewerError),
}

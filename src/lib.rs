//! # Slide Viewer
//!
//! Maps viewer pixels to slide coordinates as a slide image is rotated and
//! translated relative to the viewer.
//!
//! Every displayed pixel holds a registration: the viewer pixel and the
//! slide coordinate it currently shows. Each user motion (a rotation about
//! the slide-space origin, optionally followed by a translation) is folded
//! into every registration independently, which makes whole-image updates
//! embarrassingly parallel.
//!
//! ## Architecture
//!
//! - [`transform`] - the coordinate-transform engine (`TransformState`, `BatchMapper`, precision policy)
//! - [`viewer`] - one registration per pixel of a viewport, with undo
//! - [`render`] - nearest-neighbour rendering of a viewer frame from a slide image
//! - [`session`] - LRU registry of live viewers
//! - [`server`] - Axum-based HTTP API over sessions
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust
//! use slide_viewer::{Motion, TransformState, Tolerance, SlideCoordinate};
//!
//! // Viewer pixel (2,3) initially shows slide pixel (2,3).
//! let mut state = TransformState::new(2, 3);
//!
//! // Rotate the slide by 45 degrees and shift it by (1, -1).
//! let motion = Motion::new(45f64.to_radians(), 1.0, -1.0);
//! let moved = state.apply(&motion);
//!
//! let expected = SlideCoordinate::new(4.535533905932738, -0.2928932188134524);
//! assert!(Tolerance::default().matches_coordinate(moved, expected));
//! ```

pub mod config;
pub mod error;
pub mod render;
pub mod server;
pub mod session;
pub mod transform;
pub mod viewer;

// Re-export commonly used types
pub use config::{Cli, Command, MapConfig, MotionSpec, RenderConfig, ServeConfig};
pub use error::{MotionError, RenderError, SessionError, ViewerError};
pub use render::{render_view, sample_nearest, ViewEncoder};
pub use server::{create_router, AppState, ErrorResponse, RouterConfig};
pub use session::{SessionId, SessionInfo, SessionRegistry};
pub use transform::{
    approx_eq, BatchMapper, Motion, PreparedMotion, SlideCoordinate, Tolerance, TransformState,
    Translation, ViewerPixel,
};
pub use viewer::{Region, Viewer};

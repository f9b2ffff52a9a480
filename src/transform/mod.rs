//! Coordinate-transform engine.
//!
//! Maps viewer pixels to slide coordinates as the slide is rotated and
//! translated relative to the viewer.
//!
//! # Components
//!
//! - [`TransformState`]: one registration (viewer pixel + slide coordinate), mutated by motions
//! - [`BatchMapper`]: applies one motion to every registration of an image
//! - [`Motion`]: a rotation about the slide-space origin plus optional translation
//! - [`Tolerance`]: the comparison policy for floating-point coordinates
//!
//! # Example
//!
//! ```
//! use slide_viewer::transform::{Motion, TransformState};
//!
//! let mut state = TransformState::initialize(1, 0, 1.0, 0.0);
//! let moved = state.apply(&Motion::from_degrees(90.0, None));
//! assert!(moved.sx.abs() < 1e-9);
//! assert!((moved.sy + 1.0).abs() < 1e-9);
//! ```

mod batch;
mod motion;
pub mod precision;
mod state;

pub use batch::{BatchMapper, DEFAULT_MIN_CHUNK};
pub use motion::{Motion, PreparedMotion, Translation};
pub use precision::{approx_eq, Tolerance};
pub use state::{SlideCoordinate, TransformState, ViewerPixel};

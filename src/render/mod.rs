//! Rendering of viewer frames from a slide image.
//!
//! The transform engine only produces slide coordinates; this module turns
//! them into pixels. Sampling is nearest-neighbour: each registered
//! coordinate is rounded to the closest slide pixel, and coordinates that
//! land off the slide are painted with a fill colour.
//!
//! ```text
//! slide image ──decode──► RgbImage ──┐
//!                                    ├──► render_view ──► RgbImage ──encode──► JPEG
//! Viewer (registrations) ────────────┘
//! ```

mod encoder;
mod sampler;

pub use encoder::{
    is_valid_quality, ViewEncoder, DEFAULT_JPEG_QUALITY, MAX_JPEG_QUALITY, MIN_JPEG_QUALITY,
};
pub use sampler::{render_view, sample_nearest, DEFAULT_FILL};

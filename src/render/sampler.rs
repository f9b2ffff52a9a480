//! Nearest-neighbour sampling of a slide image at registered coordinates.

use image::{Rgb, RgbImage};
use rayon::prelude::*;
use tracing::debug;

use crate::transform::SlideCoordinate;
use crate::viewer::Viewer;

/// Colour used for viewer pixels whose slide coordinate falls off the slide.
pub const DEFAULT_FILL: Rgb<u8> = Rgb([255, 255, 255]);

/// Look up the slide pixel nearest to `coord`.
///
/// Returns `None` when the rounded coordinate is outside the slide or not finite.
pub fn sample_nearest(slide: &RgbImage, coord: SlideCoordinate) -> Option<Rgb<u8>> {
    if !coord.is_finite() {
        return None;
    }
    let x = coord.sx.round();
    let y = coord.sy.round();
    if x < 0.0 || y < 0.0 || x >= f64::from(slide.width()) || y >= f64::from(slide.height()) {
        return None;
    }
    Some(*slide.get_pixel(x as u32, y as u32))
}

/// Render the viewer's current registrations against a slide image.
///
/// The output has the viewer's dimensions; each output pixel shows the slide
/// pixel its registration points at, or `fill` when that lies off the slide.
/// Rows are rendered in parallel.
pub fn render_view(viewer: &Viewer, slide: &RgbImage, fill: Rgb<u8>) -> RgbImage {
    let width = viewer.width() as usize;
    let mut buffer = vec![0u8; width * viewer.height() as usize * 3];

    buffer
        .par_chunks_mut(width * 3)
        .zip(viewer.registrations().par_chunks(width))
        .for_each(|(row, states)| {
            for (pixel, state) in row.chunks_exact_mut(3).zip(states) {
                let value = sample_nearest(slide, state.current()).unwrap_or(fill);
                pixel.copy_from_slice(&value.0);
            }
        });

    debug!(
        width = viewer.width(),
        height = viewer.height(),
        motions = viewer.motion_count(),
        "Rendered view"
    );

    // The buffer length always matches width * height * 3.
    RgbImage::from_raw(viewer.width(), viewer.height(), buffer)
        .unwrap_or_else(|| RgbImage::new(viewer.width(), viewer.height()))
}

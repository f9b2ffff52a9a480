//! Whole-image application of a motion.
//!
//! Registrations are pairwise independent: each update reads and writes only
//! its own element, the motion is shared read-only, and there is no
//! accumulator across pixels. The parallel path splits the slice into
//! disjoint mutable chunks with rayon and needs no locking.

use rayon::prelude::*;
use tracing::debug;

use super::motion::Motion;
use super::state::TransformState;

/// Minimum number of registrations handed to one rayon task.
pub const DEFAULT_MIN_CHUNK: usize = 4096;

/// Applies one motion to every registration of an image.
#[derive(Debug, Clone, Copy)]
pub struct BatchMapper {
    min_chunk: usize,
}

impl BatchMapper {
    /// Create a mapper with the default parallel chunk size.
    pub fn new() -> Self {
        Self {
            min_chunk: DEFAULT_MIN_CHUNK,
        }
    }

    /// Create a mapper that hands at least `min_chunk` registrations to each task.
    pub fn with_min_chunk(min_chunk: usize) -> Self {
        Self {
            min_chunk: min_chunk.max(1),
        }
    }

    /// Apply `motion` to every registration, one after another.
    pub fn apply_to_all(&self, registrations: &mut [TransformState], motion: &Motion) {
        let prepared = motion.prepare();
        for state in registrations.iter_mut() {
            state.apply_prepared(&prepared);
        }
    }

    /// Apply `motion` to every registration across the rayon thread pool.
    ///
    /// Produces the same per-pixel results as [`BatchMapper::apply_to_all`].
    pub fn par_apply_to_all(&self, registrations: &mut [TransformState], motion: &Motion) {
        let prepared = motion.prepare();
        debug!(
            count = registrations.len(),
            theta = motion.theta,
            "Applying motion to registrations"
        );
        registrations
            .par_iter_mut()
            .with_min_len(self.min_chunk)
            .for_each(|state| {
                state.apply_prepared(&prepared);
            });
    }

    /// Fold a sequence of motions over every registration, in order.
    pub fn apply_sequence(&self, registrations: &mut [TransformState], motions: &[Motion]) {
        for motion in motions {
            self.par_apply_to_all(registrations, motion);
        }
    }
}

impl Default for BatchMapper {
    fn default() -> Self {
        Self::new()
    }
}

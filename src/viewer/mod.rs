//! Viewer extent: one registration per displayed pixel.
//!
//! A [`Viewer`] owns the registrations for a `width x height` viewport in
//! row-major order. Every user-issued motion updates all of them exactly
//! once; registrations are never added or removed after construction.
//!
//! The viewer also keeps a bounded motion history so recent motions can be
//! undone by applying their inverses. Once the history is full the oldest
//! motion is dropped and can no longer be undone.

use std::collections::VecDeque;

use serde::Serialize;
use tracing::debug;

use crate::error::ViewerError;
use crate::transform::{BatchMapper, Motion, SlideCoordinate, TransformState};

/// Default number of motions a viewer remembers for undo.
pub const DEFAULT_MAX_HISTORY: usize = 1024;

/// Registrations for a full viewport, plus the motions applied so far.
#[derive(Debug, Clone)]
pub struct Viewer {
    width: u32,
    height: u32,
    registrations: Vec<TransformState>,
    history: VecDeque<Motion>,
    max_history: usize,
    mapper: BatchMapper,
}

/// A rectangular, clipped view of a viewer's registrations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub registrations: Vec<TransformState>,
}

impl Viewer {
    /// Create a viewer with the identity mapping (`sx = vx`, `sy = vy`).
    pub fn new(width: u32, height: u32) -> Result<Self, ViewerError> {
        Self::with_offset(width, height, 0.0, 0.0)
    }

    /// Create a viewer whose pixel `(vx, vy)` initially displays `(vx + ox, vy + oy)`.
    pub fn with_offset(width: u32, height: u32, ox: f64, oy: f64) -> Result<Self, ViewerError> {
        if width == 0 || height == 0 {
            return Err(ViewerError::EmptyExtent { width, height });
        }
        if i32::try_from(width).is_err() || i32::try_from(height).is_err() {
            return Err(ViewerError::ExtentTooLarge { width, height });
        }

        let mut registrations = Vec::with_capacity(width as usize * height as usize);
        for vy in 0..height as i32 {
            for vx in 0..width as i32 {
                registrations.push(TransformState::initialize(
                    vx,
                    vy,
                    f64::from(vx) + ox,
                    f64::from(vy) + oy,
                ));
            }
        }

        debug!(width, height, ox, oy, "Created viewer");

        Ok(Self {
            width,
            height,
            registrations,
            history: VecDeque::new(),
            max_history: DEFAULT_MAX_HISTORY,
            mapper: BatchMapper::new(),
        })
    }

    /// Remember at most `max_history` motions for undo (at least one).
    pub fn with_history_limit(mut self, max_history: usize) -> Self {
        self.max_history = max_history.max(1);
        while self.history.len() > self.max_history {
            self.history.pop_front();
        }
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of registrations (always `width * height`).
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Number of motions currently in the history.
    ///
    /// Never exceeds the history limit, even when more motions were applied.
    pub fn motion_count(&self) -> usize {
        self.history.len()
    }

    /// Maximum number of motions kept for undo.
    pub fn history_limit(&self) -> usize {
        self.max_history
    }

    /// Apply a motion to every registration and record it.
    pub fn apply(&mut self, motion: Motion) {
        self.mapper.par_apply_to_all(&mut self.registrations, &motion);
        if self.history.len() == self.max_history {
            self.history.pop_front();
        }
        self.history.push_back(motion);
    }

    /// Undo the most recent motion by applying its inverse.
    ///
    /// Only the last [`history_limit`](Self::history_limit) motions can be
    /// undone; older ones were dropped from the history and stay applied.
    /// Returns the undone motion, or `None` when the history is empty.
    pub fn undo(&mut self) -> Option<Motion> {
        let motion = self.history.pop_back()?;
        self.mapper
            .par_apply_to_all(&mut self.registrations, &motion.inverse());
        Some(motion)
    }

    /// All registrations in row-major order.
    pub fn registrations(&self) -> &[TransformState] {
        &self.registrations
    }

    /// Registration for viewer pixel `(vx, vy)`, if it lies inside the extent.
    pub fn registration(&self, vx: i64, vy: i64) -> Option<&TransformState> {
        let index = self.index_of(vx, vy)?;
        self.registrations.get(index)
    }

    /// Slide coordinate displayed at `(vx, vy)`.
    pub fn slide_coordinate(&self, vx: i64, vy: i64) -> Result<SlideCoordinate, ViewerError> {
        self.registration(vx, vy)
            .map(TransformState::current)
            .ok_or(ViewerError::PixelOutOfBounds {
                vx,
                vy,
                width: self.width,
                height: self.height,
            })
    }

    /// Registrations inside the rectangle `(x, y, width, height)`, clipped to the extent.
    ///
    /// Fails if the rectangle's origin lies outside the viewer.
    pub fn region(&self, x: u32, y: u32, width: u32, height: u32) -> Result<Region, ViewerError> {
        if x >= self.width || y >= self.height {
            return Err(ViewerError::PixelOutOfBounds {
                vx: i64::from(x),
                vy: i64::from(y),
                width: self.width,
                height: self.height,
            });
        }

        let width = width.min(self.width - x);
        let height = height.min(self.height - y);
        let stride = self.width as usize;

        let mut registrations = Vec::with_capacity(width as usize * height as usize);
        for row in y..y + height {
            let start = row as usize * stride + x as usize;
            registrations.extend_from_slice(&self.registrations[start..start + width as usize]);
        }

        Ok(Region {
            x,
            y,
            width,
            height,
            registrations,
        })
    }

    fn index_of(&self, vx: i64, vy: i64) -> Option<usize> {
        if vx < 0 || vy < 0 || vx >= i64::from(self.width) || vy >= i64::from(self.height) {
            return None;
        }
        Some(vy as usize * self.width as usize + vx as usize)
    }
}

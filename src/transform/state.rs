//! Per-pixel registration between viewer space and slide space.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::motion::{Motion, PreparedMotion};
use super::precision::format_display;

/// Fixed integer pixel in viewer space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewerPixel {
    pub vx: i32,
    pub vy: i32,
}

impl ViewerPixel {
    pub const fn new(vx: i32, vy: i32) -> Self {
        Self { vx, vy }
    }
}

impl fmt::Display for ViewerPixel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.vx, self.vy)
    }
}

/// Slide-space location registered to a viewer pixel.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SlideCoordinate {
    pub sx: f64,
    pub sy: f64,
}

impl SlideCoordinate {
    pub const fn new(sx: f64, sy: f64) -> Self {
        Self { sx, sy }
    }

    /// Squared distance from the slide-space origin.
    pub fn norm_squared(&self) -> f64 {
        self.sx * self.sx + self.sy * self.sy
    }

    pub fn is_finite(&self) -> bool {
        self.sx.is_finite() && self.sy.is_finite()
    }
}

impl fmt::Display for SlideCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {})",
            format_display(self.sx),
            format_display(self.sy)
        )
    }
}

/// One registration: a viewer pixel and the slide coordinate it displays.
///
/// Applying a motion folds it into the current slide coordinate. Each call
/// starts from the coordinate left by the previous call, so a sequence of
/// motions is not equivalent to one motion with the summed angle once
/// translations are involved.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformState {
    pixel: ViewerPixel,
    coordinate: SlideCoordinate,
}

impl TransformState {
    /// Register a viewer pixel with an explicit initial slide coordinate.
    pub const fn initialize(vx: i32, vy: i32, sx0: f64, sy0: f64) -> Self {
        Self {
            pixel: ViewerPixel::new(vx, vy),
            coordinate: SlideCoordinate::new(sx0, sy0),
        }
    }

    /// Register a viewer pixel with the identity mapping (`sx = vx`, `sy = vy`).
    pub fn new(vx: i32, vy: i32) -> Self {
        Self::initialize(vx, vy, f64::from(vx), f64::from(vy))
    }

    /// Apply a motion, overwrite the held coordinate and return it.
    pub fn apply(&mut self, motion: &Motion) -> SlideCoordinate {
        self.apply_prepared(&motion.prepare())
    }

    /// Apply a motion whose trigonometry was evaluated by the caller.
    #[inline]
    pub fn apply_prepared(&mut self, motion: &PreparedMotion) -> SlideCoordinate {
        let (sx, sy) = motion.map(self.coordinate.sx, self.coordinate.sy);
        self.coordinate = SlideCoordinate::new(sx, sy);
        self.coordinate
    }

    /// Current slide coordinate.
    pub fn current(&self) -> SlideCoordinate {
        self.coordinate
    }

    /// The viewer pixel this registration belongs to.
    pub fn viewer_pixel(&self) -> ViewerPixel {
        self.pixel
    }
}

impl fmt::Display for TransformState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Viewer pixel {} displays slide pixel {}",
            self.pixel, self.coordinate
        )
    }
}

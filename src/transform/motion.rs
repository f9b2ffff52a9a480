//! Motion values: one user-issued rigid transform.

use serde::{Deserialize, Serialize};

use super::precision::all_finite;
use crate::error::MotionError;

/// Translation component of a motion, in slide pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Translation {
    pub dx: f64,
    pub dy: f64,
}

impl Translation {
    pub const fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }
}

/// One incremental rigid transform: rotation by `theta` radians about the
/// slide-space origin, followed by an optional translation.
///
/// Motions are immutable once issued. The same value is broadcast read-only
/// to every registration of a viewer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Motion {
    /// Rotation angle in radians
    pub theta: f64,

    /// Translation applied after the rotation, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<Translation>,
}

impl Motion {
    /// The motion that leaves every coordinate unchanged.
    pub const fn identity() -> Self {
        Self {
            theta: 0.0,
            translation: None,
        }
    }

    /// A pure rotation by `theta` radians.
    pub const fn rotation(theta: f64) -> Self {
        Self {
            theta,
            translation: None,
        }
    }

    /// A rotation by `theta` radians followed by a translation of `(dx, dy)`.
    pub const fn new(theta: f64, dx: f64, dy: f64) -> Self {
        Self {
            theta,
            translation: Some(Translation::new(dx, dy)),
        }
    }

    /// Build a motion from an angle in degrees, as entered by a user.
    pub fn from_degrees(angle: f64, translation: Option<Translation>) -> Self {
        Self {
            theta: angle.to_radians(),
            translation,
        }
    }

    /// Rotation angle in degrees.
    pub fn degrees(&self) -> f64 {
        self.theta.to_degrees()
    }

    /// Reject non-finite angles or translations.
    ///
    /// The engine accepts any double; input boundaries call this before a
    /// motion reaches it.
    pub fn validate(&self) -> Result<(), MotionError> {
        if !all_finite(&[self.theta]) {
            return Err(MotionError::NonFiniteAngle(self.theta));
        }
        if let Some(t) = self.translation {
            if !all_finite(&[t.dx, t.dy]) {
                return Err(MotionError::NonFiniteTranslation { dx: t.dx, dy: t.dy });
            }
        }
        Ok(())
    }

    /// The motion that undoes this one.
    ///
    /// A motion maps `s` to `R(theta)·s + t`, so its inverse maps `s'` to
    /// `R(-theta)·s' - R(-theta)·t`: rotate by `-theta`, then translate by
    /// the rotated, negated translation.
    pub fn inverse(&self) -> Self {
        let translation = self.translation.map(|t| {
            let back = PreparedMotion::new(&Motion::rotation(-self.theta));
            let (rx, ry) = back.rotate(t.dx, t.dy);
            Translation::new(-rx, -ry)
        });
        Self {
            theta: -self.theta,
            translation,
        }
    }

    /// Evaluate the trigonometry of this motion once.
    pub fn prepare(&self) -> PreparedMotion {
        PreparedMotion::new(self)
    }
}

impl Default for Motion {
    fn default() -> Self {
        Self::identity()
    }
}

/// A motion with `sin(theta)` and `cos(theta)` already evaluated.
///
/// Every application path goes through this type, so applying a motion to a
/// single registration and to a whole batch yields bit-identical results.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreparedMotion {
    sin: f64,
    cos: f64,
    dx: f64,
    dy: f64,
    translate: bool,
}

impl PreparedMotion {
    pub fn new(motion: &Motion) -> Self {
        let (sin, cos) = motion.theta.sin_cos();
        let (dx, dy, translate) = match motion.translation {
            Some(t) => (t.dx, t.dy, true),
            None => (0.0, 0.0, false),
        };
        Self {
            sin,
            cos,
            dx,
            dy,
            translate,
        }
    }

    /// Rotate `(x, y)` by `-theta` about the origin.
    ///
    /// The slide turns by `+theta` in the viewer's frame, so the viewer's
    /// view of slide space turns by `-theta`.
    #[inline]
    pub fn rotate(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.cos * x + self.sin * y,
            -self.sin * x + self.cos * y,
        )
    }

    /// Rotate, then translate if the motion carries a translation.
    #[inline]
    pub fn map(&self, x: f64, y: f64) -> (f64, f64) {
        let (rx, ry) = self.rotate(x, y);
        if self.translate {
            (rx + self.dx, ry + self.dy)
        } else {
            (rx, ry)
        }
    }
}

//! Numeric precision policy for the transform engine.
//!
//! All engine arithmetic is carried out in `f64`. Repeated rotations
//! accumulate rounding error, so coordinate comparisons go through a
//! [`Tolerance`] combining an absolute and a relative bound rather than
//! exact equality.

use super::state::SlideCoordinate;

/// Default absolute tolerance for coordinate comparisons.
pub const DEFAULT_ABSOLUTE_TOLERANCE: f64 = 1e-9;

/// Default relative tolerance for coordinate comparisons.
pub const DEFAULT_RELATIVE_TOLERANCE: f64 = 1e-9;

/// Number of decimals used when coordinates are displayed to users.
pub const DISPLAY_DECIMALS: usize = 2;

/// Combined absolute/relative comparison bound.
///
/// Two values `a` and `b` are considered equal when
/// `|a - b| <= absolute + relative * max(|a|, |b|)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    pub absolute: f64,
    pub relative: f64,
}

impl Tolerance {
    /// Create a tolerance with explicit bounds.
    pub const fn new(absolute: f64, relative: f64) -> Self {
        Self { absolute, relative }
    }

    /// Compare two scalars under this tolerance.
    ///
    /// Non-finite values are only equal to themselves (same infinity);
    /// NaN is never equal to anything.
    pub fn matches(&self, a: f64, b: f64) -> bool {
        if a == b {
            return true;
        }
        if !a.is_finite() || !b.is_finite() {
            return false;
        }
        let scale = a.abs().max(b.abs());
        (a - b).abs() <= self.absolute + self.relative * scale
    }

    /// Compare two slide coordinates component-wise.
    pub fn matches_coordinate(&self, a: SlideCoordinate, b: SlideCoordinate) -> bool {
        self.matches(a.sx, b.sx) && self.matches(a.sy, b.sy)
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::new(DEFAULT_ABSOLUTE_TOLERANCE, DEFAULT_RELATIVE_TOLERANCE)
    }
}

/// Compare two scalars under the default tolerance.
pub fn approx_eq(a: f64, b: f64) -> bool {
    Tolerance::default().matches(a, b)
}

/// Check that every value is finite.
pub fn all_finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}

/// Format a coordinate value for display (two decimals, `-0.00` folded to `0.00`).
pub fn format_display(value: f64) -> String {
    let formatted = format!("{:.*}", DISPLAY_DECIMALS, value);
    if formatted.trim_start_matches('-').chars().all(|c| c == '0' || c == '.') {
        formatted.trim_start_matches('-').to_string()
    } else {
        formatted
    }
}

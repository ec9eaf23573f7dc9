// File: crates/stream-core/src/types.rs
// Summary: Shared types and constants (layout sizes, margins).

use serde::Deserialize;

/// Default chart layout width in logical units.
pub const WIDTH: f64 = 500.0;
/// Default chart layout height in logical units.
pub const HEIGHT: f64 = 600.0;
/// Default drawing surface size in pixels. Wider than the layout so the legend fits.
pub const SURFACE_WIDTH: i32 = 700;
pub const SURFACE_HEIGHT: i32 = 800;

/// Layout margins, in logical units.
/// Contract: all fields are non-negative.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct Insets {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Insets {
    pub const fn new(left: f64, right: f64, top: f64, bottom: f64) -> Self {
        Self { left, right, top, bottom }
    }
    /// Total horizontal inset (left + right).
    pub fn hsum(&self) -> f64 { self.left + self.right }
    /// Total vertical inset (top + bottom).
    pub fn vsum(&self) -> f64 { self.top + self.bottom }

    pub fn is_valid(&self) -> bool {
        [self.left, self.right, self.top, self.bottom]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0)
    }
}

impl Default for Insets {
    fn default() -> Self {
        Self::new(40.0, 30.0, 100.0, 40.0)
    }
}

//! Planar points and rotation helpers

use serde::{Deserialize, Serialize};

/// A point in working-frame pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position (pixels from the left edge)
    pub x: f64,
    /// Vertical position (pixels from the top edge)
    pub y: f64,
}

impl Point {
    /// Create a new point
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy)
    }

    /// Offset this point by a vector
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Precomputed sine and cosine of a screen rotation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    sin: f64,
    cos: f64,
    radians: f64,
}

impl Rotation {
    /// Build a rotation from an angle in radians
    pub fn from_radians(radians: f64) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self { sin, cos, radians }
    }

    /// Build a rotation from an angle in degrees
    pub fn from_degrees(degrees: f64) -> Self {
        Self::from_radians(degrees.to_radians())
    }

    /// Rotation angle in radians
    pub const fn radians(&self) -> f64 {
        self.radians
    }

    /// Rotate a frame-relative offset into screen space
    pub fn apply(&self, dx: f64, dy: f64) -> (f64, f64) {
        (
            dx.mul_add(self.cos, -(dy * self.sin)),
            dx.mul_add(self.sin, dy * self.cos),
        )
    }

    /// Map a screen-space offset back into frame-relative coordinates
    pub fn invert(&self, rx: f64, ry: f64) -> (f64, f64) {
        (
            rx.mul_add(self.cos, ry * self.sin),
            (-rx).mul_add(self.sin, ry * self.cos),
        )
    }
}

/// Squared distance from `p` to the segment `a`-`b`
pub fn segment_distance_squared(p: Point, a: Point, b: Point) -> f64 {
    let abx = b.x - a.x;
    let aby = b.y - a.y;
    let length_squared = abx.mul_add(abx, aby * aby);
    if length_squared <= f64::EPSILON {
        return p.distance_squared(a);
    }
    let t = ((p.x - a.x).mul_add(abx, (p.y - a.y) * aby) / length_squared).clamp(0.0, 1.0);
    p.distance_squared(Point::new(t.mul_add(abx, a.x), t.mul_add(aby, a.y)))
}

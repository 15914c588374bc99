//! Frame membership tests shared by the compositor, tracer and mesh builder
//!
//! Every output path asks the same [`FrameMask::contains`] question with the same
//! center-relative coordinates, so raster, vector and mesh output clip
//! identically at the frame edge and around the center hole.

use crate::io::configuration::{MAX_ASPECT_COMPONENT, MAX_CENTER_HOLE};
use crate::io::error::{Result, invalid_parameter};
use bitvec::vec::BitVec;
use serde::{Deserialize, Serialize};

// Distance kept from the frame edge when pulling a point inside
const EDGE_INSET: f64 = 1e-6;

/// Outline of the printable area
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FrameShape {
    /// Disc inscribed in a square frame
    #[default]
    Circle,
    /// Full square frame
    Square,
    /// Rectangle with the given width:height ratio
    CustomAspect {
        /// Horizontal ratio component
        width: f64,
        /// Vertical ratio component
        height: f64,
    },
}

/// Frame outline plus optional center hole
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameGeometry {
    /// Outline of the frame
    pub shape: FrameShape,
    /// Hole radius as a fraction of the frame half-extent
    pub center_hole: f64,
}

impl FrameGeometry {
    /// Frame with no center hole
    pub const fn new(shape: FrameShape) -> Self {
        Self {
            shape,
            center_hole: 0.0,
        }
    }

    /// Builder-style center hole
    #[must_use]
    pub const fn with_hole(mut self, center_hole: f64) -> Self {
        self.center_hole = center_hole;
        self
    }

    /// Reject out-of-range hole fractions and degenerate aspect ratios
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` when the hole lies outside `0..=0.8` or an
    /// aspect component is non-positive or non-finite
    pub fn validate(&self) -> Result<()> {
        if !self.center_hole.is_finite() || !(0.0..=MAX_CENTER_HOLE).contains(&self.center_hole) {
            return Err(invalid_parameter(
                "center_hole",
                &self.center_hole,
                &format!("must be within 0..={MAX_CENTER_HOLE}"),
            ));
        }
        if let FrameShape::CustomAspect { width, height } = self.shape {
            for (name, value) in [("aspect_width", width), ("aspect_height", height)] {
                if !value.is_finite() || value <= 0.0 || value > MAX_ASPECT_COMPONENT {
                    return Err(invalid_parameter(
                        name,
                        &value,
                        &format!("must be within (0, {MAX_ASPECT_COMPONENT}]"),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Frame size in pixels for a given longer-side length
    pub fn dimensions(&self, base: u32) -> (u32, u32) {
        let base = base.max(1);
        match self.shape {
            FrameShape::Circle | FrameShape::Square => (base, base),
            FrameShape::CustomAspect { width, height } => {
                let ratio = width / height;
                if ratio >= 1.0 {
                    (base, ((f64::from(base) / ratio).round() as u32).max(1))
                } else {
                    (((f64::from(base) * ratio).round() as u32).max(1), base)
                }
            }
        }
    }

    /// Resolve the mask for a frame of the given pixel size
    pub fn mask(&self, width: u32, height: u32) -> FrameMask {
        let half_width = f64::from(width) / 2.0;
        let half_height = f64::from(height) / 2.0;
        let half = half_width.min(half_height);
        let hole = match self.shape {
            FrameShape::Circle | FrameShape::Square => self.center_hole * half,
            FrameShape::CustomAspect { .. } => 0.0,
        };
        FrameMask {
            circular: matches!(self.shape, FrameShape::Circle),
            width,
            height,
            half_width,
            half_height,
            half,
            hole_radius_squared: hole * hole,
        }
    }
}

/// Frame geometry resolved against a concrete raster size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameMask {
    circular: bool,
    width: u32,
    height: u32,
    half_width: f64,
    half_height: f64,
    half: f64,
    hole_radius_squared: f64,
}

impl FrameMask {
    /// Frame width in pixels
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in pixels
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Half of the shorter frame side; the pattern length scale
    pub const fn half(&self) -> f64 {
        self.half
    }

    /// Half of the frame width
    pub const fn half_width(&self) -> f64 {
        self.half_width
    }

    /// Half of the frame height
    pub const fn half_height(&self) -> f64 {
        self.half_height
    }

    /// Whether the frame is a disc
    pub const fn is_circular(&self) -> bool {
        self.circular
    }

    /// Membership of a center-relative offset
    pub fn contains(&self, dx: f64, dy: f64) -> bool {
        let distance_squared = dx.mul_add(dx, dy * dy);
        let inside = if self.circular {
            distance_squared <= self.half * self.half
        } else {
            dx.abs() <= self.half_width && dy.abs() <= self.half_height
        };
        inside && distance_squared >= self.hole_radius_squared
    }

    /// Membership of a whole disc at a center-relative offset
    pub fn contains_disc(&self, dx: f64, dy: f64, radius: f64) -> bool {
        let distance = dx.hypot(dy);
        let inside = if self.circular {
            distance + radius <= self.half
        } else {
            dx.abs() + radius <= self.half_width && dy.abs() + radius <= self.half_height
        };
        inside && (self.hole_radius_squared <= 0.0 || distance - radius >= self.hole_radius())
    }

    /// Closest frame position inside the mask
    ///
    /// Positions already inside are returned unchanged; others land just inside
    /// the outer edge or just outside the center hole.
    pub fn nearest_inside(&self, x: f64, y: f64) -> (f64, f64) {
        if self.contains_point(x, y) {
            return (x, y);
        }
        let (mut dx, mut dy) = self.offset_of(x, y);
        if self.circular {
            let distance = dx.hypot(dy);
            let limit = self.half - EDGE_INSET;
            if distance > limit {
                dx *= limit / distance;
                dy *= limit / distance;
            }
        } else {
            let (limit_x, limit_y) = (self.half_width - EDGE_INSET, self.half_height - EDGE_INSET);
            dx = dx.clamp(-limit_x, limit_x);
            dy = dy.clamp(-limit_y, limit_y);
        }
        if self.hole_radius_squared > 0.0 {
            let distance = dx.hypot(dy);
            let hole = self.hole_radius() + EDGE_INSET;
            if distance < hole {
                if distance > 0.0 {
                    dx *= hole / distance;
                    dy *= hole / distance;
                } else {
                    (dx, dy) = (hole, 0.0);
                }
            }
        }
        self.position_of(dx, dy)
    }

    fn hole_radius(&self) -> f64 {
        self.hole_radius_squared.sqrt()
    }

    /// Center-relative offset of a frame position
    pub fn offset_of(&self, x: f64, y: f64) -> (f64, f64) {
        (x - self.half_width, y - self.half_height)
    }

    /// Frame position of a center-relative offset
    pub fn position_of(&self, dx: f64, dy: f64) -> (f64, f64) {
        (dx + self.half_width, dy + self.half_height)
    }

    /// Membership of a frame position (pixel corners for integer inputs)
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        let (dx, dy) = self.offset_of(x, y);
        self.contains(dx, dy)
    }

    /// Membership of an integer pixel
    pub fn contains_pixel(&self, x: u32, y: u32) -> bool {
        self.contains_point(f64::from(x), f64::from(y))
    }

    /// Row-major membership bitmap over the whole frame
    pub fn bitmap(&self) -> BitVec {
        let mut bits = BitVec::with_capacity(self.width as usize * self.height as usize);
        for y in 0..self.height {
            for x in 0..self.width {
                bits.push(self.contains_pixel(x, y));
            }
        }
        bits
    }
}

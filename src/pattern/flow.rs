//! Contour hatching along image isophotes
//!
//! A coarse grid of sample points each contributes one short stroke
//! perpendicular to the local tone gradient, so strokes follow lines of equal
//! brightness. Flow has no duty concept and only produces strokes.

use crate::io::configuration::{FLOW_LENGTH_FACTOR, FLOW_SKIP_TONE};
use crate::math::geometry::Point;
use crate::pattern::constraint::FeatureFloor;
use crate::sampling::mask::FrameMask;
use crate::sampling::tone::ToneField;
use std::f64::consts::FRAC_PI_2;

/// One hatching stroke in frame coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowSegment {
    /// Stroke start
    pub start: Point,
    /// Stroke end
    pub end: Point,
}

impl FlowSegment {
    /// Midpoint of the stroke
    pub fn center(&self) -> Point {
        Point::new(
            (self.start.x + self.end.x) / 2.0,
            (self.start.y + self.end.y) / 2.0,
        )
    }

    /// Stroke length in pixels
    pub fn length(&self) -> f64 {
        self.start.distance_squared(self.end).sqrt()
    }
}

/// Stroke width for flow output
pub fn stroke_width(floor: &FeatureFloor) -> f64 {
    floor.apply_width(1.0)
}

/// Stroke direction at a grid point: gradient angle plus a quarter turn
pub fn stroke_angle(field: &ToneField, x: i64, y: i64) -> f64 {
    let gx = (field.at(x + 1, y) - field.at(x - 1, y)) / 2.0;
    let gy = (field.at(x, y + 1) - field.at(x, y - 1)) / 2.0;
    gy.atan2(gx) + FRAC_PI_2
}

/// All strokes for one layer
pub fn flow_segments(
    field: &ToneField,
    mask: &FrameMask,
    density: f64,
    thickness: f64,
) -> Vec<FlowSegment> {
    let grid = mask.half() / density.max(1.0);
    if grid <= 0.0 || !grid.is_finite() {
        return Vec::new();
    }
    let length = grid * thickness * FLOW_LENGTH_FACTOR;
    let half_length = length / 2.0;
    let width = f64::from(mask.width());
    let height = f64::from(mask.height());

    let mut segments = Vec::new();
    let mut y = grid / 2.0;
    while y < height {
        let mut x = grid / 2.0;
        while x < width {
            let (px, py) = (x.floor() as i64, y.floor() as i64);
            let tone = field.at(px, py);
            if mask.contains_point(x, y) && !field.is_transparent(px, py) && tone < FLOW_SKIP_TONE
            {
                let (sin, cos) = stroke_angle(field, px, py).sin_cos();
                segments.push(FlowSegment {
                    start: Point::new(x - cos * half_length, y - sin * half_length),
                    end: Point::new(x + cos * half_length, y + sin * half_length),
                });
            }
            x += grid;
        }
        y += grid;
    }
    segments
}

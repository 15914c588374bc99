//! Deterministic stochastic stipple
//!
//! Sample `i` draws its position from two hash streams and its keep threshold
//! from a third. Darker tone keeps more samples. The per-layer seed offsets
//! keep CMYK plates from stacking their dots on the same spots.

use crate::io::configuration::{
    MAX_STIPPLE_SAMPLES, MIN_STIPPLE_RADIUS, STIPPLE_RADIUS_FACTOR,
    STIPPLE_SAMPLES_PER_DENSITY_SQUARED,
};
use crate::math::geometry::Point;
use crate::math::hash::{Stream, unit_draw};
use crate::pattern::constraint::FeatureFloor;
use crate::sampling::mask::FrameMask;
use crate::sampling::tone::ToneField;

/// One kept stipple mark
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StippleDot {
    /// Mark center in frame coordinates
    pub center: Point,
    /// Mark radius in pixels
    pub radius: f64,
}

/// Candidate count for a density, capped
pub fn sample_count(density: f64) -> usize {
    let wanted = density * density * STIPPLE_SAMPLES_PER_DENSITY_SQUARED;
    if !wanted.is_finite() || wanted <= 0.0 {
        return 0;
    }
    (wanted.round() as usize).min(MAX_STIPPLE_SAMPLES)
}

/// Mark radius for a frame half-extent, density and thickness
pub fn dot_radius(half: f64, density: f64, thickness: f64, floor: &FeatureFloor) -> f64 {
    let spacing = half / density.max(1.0);
    let radius = (thickness * spacing * STIPPLE_RADIUS_FACTOR).max(MIN_STIPPLE_RADIUS);
    floor.apply_width(radius * 2.0) / 2.0
}

/// Kept marks for one layer, in sample order
pub fn stipple_dots(
    field: &ToneField,
    mask: &FrameMask,
    density: f64,
    thickness: f64,
    seed: u32,
    floor: &FeatureFloor,
) -> Vec<StippleDot> {
    let radius = dot_radius(mask.half(), density, thickness, floor);
    let width = f64::from(mask.width());
    let height = f64::from(mask.height());
    let count = u32::try_from(sample_count(density)).unwrap_or(u32::MAX);

    (0..count)
        .filter_map(|index| {
            let x = unit_draw(index, Stream::X, seed) * width;
            let y = unit_draw(index, Stream::Y, seed) * height;
            if !mask.contains_point(x, y) || field.sample_transparent(x, y) {
                return None;
            }
            let threshold = unit_draw(index, Stream::Threshold, seed);
            (threshold > field.sample(x, y)).then_some(StippleDot {
                center: Point::new(x, y),
                radius,
            })
        })
        .collect()
}

//! Mathematical utilities shared by the samplers, pattern evaluators and exporters

/// Points, rotations and segment distance helpers
pub mod geometry;
/// Versioned integer hashing for reproducible stochastic sampling
pub mod hash;

use num_traits::Float;
use std::f64::consts::PI;

/// Clamp a value into the closed unit interval
///
/// NaN inputs map to zero so a degenerate sample can never leak into geometry.
pub fn clamp_unit<T: Float>(value: T) -> T {
    if value.is_nan() {
        return T::zero();
    }
    value.max(T::zero()).min(T::one())
}

/// Linear interpolation between `a` and `b`
pub fn lerp<T: Float>(a: T, b: T, t: T) -> T {
    (b - a).mul_add(t, a)
}

/// Half-width, in phase radians, of the foreground band of a sine screen
///
/// A pixel is foreground when `(sin(phase) + 1) / 2 < duty`. Around the wave
/// minimum at `3π/2` this holds for `|phase - 3π/2| < acos(1 - 2·duty)`, so the
/// raster test and the traced band width derive from the same expression.
pub fn band_half_phase(duty: f64) -> f64 {
    let cosine = 2.0f64.mul_add(-duty, 1.0).clamp(-1.0, 1.0);
    cosine.acos()
}

/// Smallest duty whose band spans `fraction` of a period
///
/// Inverse of [`band_half_phase`] scaled to a period: a band of this duty is
/// `fraction · spacing` wide. Fractions at or above one give full coverage.
pub fn duty_for_band_fraction(fraction: f64) -> f64 {
    let fraction = clamp_unit(fraction);
    (1.0 - (PI * fraction).cos()) / 2.0
}

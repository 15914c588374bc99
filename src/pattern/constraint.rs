//! Minimum printable feature width
//!
//! When fabrication safety is on, every band, dot and stipple mark that is
//! drawn at all is widened to at least the physical minimum thickness. Marks
//! whose computed size is zero stay absent.

use crate::io::configuration::{DEFAULT_MIN_THICKNESS_MM, DEFAULT_PRINT_WIDTH_MM};
use crate::io::error::{Result, invalid_parameter};
use crate::math::duty_for_band_fraction;
use serde::{Deserialize, Serialize};

/// Physical feature-size requirement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConstraint {
    /// Whether the floor is applied
    pub enabled: bool,
    /// Physical width of the whole output (millimetres)
    pub physical_width_mm: f64,
    /// Thinnest printable feature (millimetres)
    pub min_thickness_mm: f64,
}

impl Default for FeatureConstraint {
    fn default() -> Self {
        Self {
            enabled: false,
            physical_width_mm: DEFAULT_PRINT_WIDTH_MM,
            min_thickness_mm: DEFAULT_MIN_THICKNESS_MM,
        }
    }
}

impl FeatureConstraint {
    /// Enabled constraint for the given physical dimensions
    pub const fn enabled(physical_width_mm: f64, min_thickness_mm: f64) -> Self {
        Self {
            enabled: true,
            physical_width_mm,
            min_thickness_mm,
        }
    }

    /// Reject non-positive physical sizes
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` when either size is non-finite or not positive
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("physical_width_mm", self.physical_width_mm),
            ("min_thickness_mm", self.min_thickness_mm),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(invalid_parameter(name, &value, &"must be a positive length"));
            }
        }
        Ok(())
    }

    /// Minimum feature width in pixels for a raster of the given width
    pub fn min_feature_pixels(&self, raster_width: u32) -> f64 {
        self.min_thickness_mm * (f64::from(raster_width) / self.physical_width_mm)
    }

    /// Resolve against a raster width
    pub fn floor_for(&self, raster_width: u32) -> FeatureFloor {
        if self.enabled {
            FeatureFloor::pixels(self.min_feature_pixels(raster_width))
        } else {
            FeatureFloor::none()
        }
    }
}

/// Constraint resolved to pixels for one render
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FeatureFloor {
    min_pixels: Option<f64>,
}

impl FeatureFloor {
    /// No floor
    pub const fn none() -> Self {
        Self { min_pixels: None }
    }

    /// Floor of `min_pixels` pixels
    pub const fn pixels(min_pixels: f64) -> Self {
        Self {
            min_pixels: Some(min_pixels),
        }
    }

    /// Whether a floor is active
    pub const fn is_constrained(&self) -> bool {
        self.min_pixels.is_some()
    }

    /// Minimum feature width in pixels (zero when unconstrained)
    pub fn min_pixels(&self) -> f64 {
        self.min_pixels.unwrap_or(0.0)
    }

    /// Smallest allowed fraction of a period `spacing` pixels long
    pub fn min_fraction(&self, spacing: f64) -> f64 {
        match self.min_pixels {
            Some(min) if spacing > 0.0 => min / spacing,
            _ => 0.0,
        }
    }

    /// Raise a non-zero band duty until its phase window is the floor wide
    ///
    /// A band of duty `d` on a period of `spacing` pixels is
    /// `spacing · acos(1 − 2d) / π` wide, so the floor is applied to that width
    /// rather than to the duty itself.
    pub fn apply_duty(&self, duty: f64, spacing: f64) -> f64 {
        if duty <= 0.0 {
            return duty;
        }
        duty.max(duty_for_band_fraction(self.min_fraction(spacing)))
    }

    /// Raise a non-zero width in pixels to the floor
    pub fn apply_width(&self, width: f64) -> f64 {
        if width <= 0.0 {
            return width;
        }
        width.max(self.min_pixels())
    }
}

//! Pattern mode selection and per-mode parameters

use crate::io::configuration::{
    DEFAULT_DENSITY, DEFAULT_THICKNESS, MAX_DENSITY, MAX_THICKNESS, MIN_DENSITY,
};
use crate::io::error::{Result, invalid_parameter};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Footprint of a halftone dot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DotShape {
    /// Euclidean distance
    #[default]
    Circle,
    /// Chebyshev distance
    Square,
    /// Manhattan distance
    Diamond,
    /// Upward-pointing triangle
    Triangle,
}

/// Pattern family without parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum PatternMode {
    /// Single continuous Archimedean spiral
    #[default]
    Spiral,
    /// Rotatable parallel line screen
    Lines,
    /// Amplitude-modulated dot screen
    Dots,
    /// Contour hatching along isophotes
    Flow,
    /// Hashed stochastic stipple
    Stipple,
    /// Adjusted photo painted as continuous ink
    Photo,
}

/// Fully resolved pattern with only the fields its mode uses
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PatternConfig {
    /// Single continuous spiral
    Spiral {
        /// Turns from center to frame edge
        density: f64,
        /// Stroke weight multiplier
        thickness: f64,
        /// Spiral rotation in degrees
        rotation: f64,
    },
    /// Parallel line screen
    Lines {
        /// Line pairs across the frame
        density: f64,
        /// Stroke weight multiplier
        thickness: f64,
        /// Screen angle in degrees
        rotation: f64,
    },
    /// AM halftone dots
    Dots {
        /// Cells across the frame
        density: f64,
        /// Dot growth multiplier
        thickness: f64,
        /// Screen angle in degrees
        rotation: f64,
        /// Dot footprint
        shape: DotShape,
    },
    /// Isophote hatching
    Flow {
        /// Grid points across the frame half-extent
        density: f64,
        /// Segment length multiplier
        thickness: f64,
    },
    /// Stochastic stipple
    Stipple {
        /// Sample density
        density: f64,
        /// Dot radius multiplier
        thickness: f64,
    },
    /// Adjusted photo without screening
    PhotoPassthrough,
}

impl Default for PatternConfig {
    fn default() -> Self {
        ModeSettings::default().resolve(PatternMode::Spiral)
    }
}

impl PatternConfig {
    /// Mode of this configuration
    pub const fn mode(&self) -> PatternMode {
        match self {
            Self::Spiral { .. } => PatternMode::Spiral,
            Self::Lines { .. } => PatternMode::Lines,
            Self::Dots { .. } => PatternMode::Dots,
            Self::Flow { .. } => PatternMode::Flow,
            Self::Stipple { .. } => PatternMode::Stipple,
            Self::PhotoPassthrough => PatternMode::Photo,
        }
    }

    /// Density floored at one
    pub fn density(&self) -> f64 {
        self.raw_density().max(MIN_DENSITY)
    }

    const fn raw_density(&self) -> f64 {
        match *self {
            Self::Spiral { density, .. }
            | Self::Lines { density, .. }
            | Self::Dots { density, .. }
            | Self::Flow { density, .. }
            | Self::Stipple { density, .. } => density,
            Self::PhotoPassthrough => MIN_DENSITY,
        }
    }

    /// Thickness multiplier (zero for passthrough)
    pub const fn thickness(&self) -> f64 {
        match *self {
            Self::Spiral { thickness, .. }
            | Self::Lines { thickness, .. }
            | Self::Dots { thickness, .. }
            | Self::Flow { thickness, .. }
            | Self::Stipple { thickness, .. } => thickness,
            Self::PhotoPassthrough => 0.0,
        }
    }

    /// Screen rotation in degrees (zero for unrotated modes)
    pub const fn rotation(&self) -> f64 {
        match *self {
            Self::Spiral { rotation, .. }
            | Self::Lines { rotation, .. }
            | Self::Dots { rotation, .. } => rotation,
            _ => 0.0,
        }
    }

    /// Reject values that would produce NaN or degenerate geometry
    ///
    /// Densities below one are floored rather than rejected.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for non-finite fields, density above the
    /// maximum, or thickness outside `(0, 2]`
    pub fn validate(&self) -> Result<()> {
        if matches!(self, Self::PhotoPassthrough) {
            return Ok(());
        }
        let density = self.raw_density();
        if !density.is_finite() || density > MAX_DENSITY {
            return Err(invalid_parameter(
                "density",
                &density,
                &format!("must be within {MIN_DENSITY}..={MAX_DENSITY}"),
            ));
        }
        let thickness = self.thickness();
        if !thickness.is_finite() || thickness <= 0.0 || thickness > MAX_THICKNESS {
            return Err(invalid_parameter(
                "thickness",
                &thickness,
                &format!("must be within (0, {MAX_THICKNESS}]"),
            ));
        }
        if !self.rotation().is_finite() {
            return Err(invalid_parameter(
                "rotation",
                &self.rotation(),
                &"must be finite",
            ));
        }
        Ok(())
    }
}

/// Stored slider values for one mode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeSettings {
    /// Density slider
    pub density: f64,
    /// Thickness slider
    pub thickness: f64,
    /// Rotation slider in degrees
    pub rotation: f64,
    /// Dot shape selector
    pub dot_shape: DotShape,
}

impl Default for ModeSettings {
    fn default() -> Self {
        Self {
            density: DEFAULT_DENSITY,
            thickness: DEFAULT_THICKNESS,
            rotation: 0.0,
            dot_shape: DotShape::Circle,
        }
    }
}

impl ModeSettings {
    /// Build the configuration for `mode` from these values
    pub const fn resolve(&self, mode: PatternMode) -> PatternConfig {
        let Self {
            density,
            thickness,
            rotation,
            dot_shape,
        } = *self;
        match mode {
            PatternMode::Spiral => PatternConfig::Spiral {
                density,
                thickness,
                rotation,
            },
            PatternMode::Lines => PatternConfig::Lines {
                density,
                thickness,
                rotation,
            },
            PatternMode::Dots => PatternConfig::Dots {
                density,
                thickness,
                rotation,
                shape: dot_shape,
            },
            PatternMode::Flow => PatternConfig::Flow { density, thickness },
            PatternMode::Stipple => PatternConfig::Stipple { density, thickness },
            PatternMode::Photo => PatternConfig::PhotoPassthrough,
        }
    }
}

/// Independent slider memory per mode
///
/// Switching modes keeps each mode's values, so returning to a mode restores
/// exactly what was set there.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternSettings {
    /// Currently selected mode
    pub active: PatternMode,
    /// Spiral values
    pub spiral: ModeSettings,
    /// Line screen values
    pub lines: ModeSettings,
    /// Dot screen values
    pub dots: ModeSettings,
    /// Flow values
    pub flow: ModeSettings,
    /// Stipple values
    pub stipple: ModeSettings,
}

impl PatternSettings {
    /// Values stored for a mode (passthrough shares the spiral slot)
    pub const fn settings(&self, mode: PatternMode) -> &ModeSettings {
        match mode {
            PatternMode::Spiral | PatternMode::Photo => &self.spiral,
            PatternMode::Lines => &self.lines,
            PatternMode::Dots => &self.dots,
            PatternMode::Flow => &self.flow,
            PatternMode::Stipple => &self.stipple,
        }
    }

    /// Mutable values stored for a mode
    pub const fn settings_mut(&mut self, mode: PatternMode) -> &mut ModeSettings {
        match mode {
            PatternMode::Spiral | PatternMode::Photo => &mut self.spiral,
            PatternMode::Lines => &mut self.lines,
            PatternMode::Dots => &mut self.dots,
            PatternMode::Flow => &mut self.flow,
            PatternMode::Stipple => &mut self.stipple,
        }
    }

    /// Restore the active mode's defaults
    pub fn reset_active(&mut self) {
        *self.settings_mut(self.active) = ModeSettings::default();
    }

    /// Configuration for the active mode
    pub const fn resolve(&self) -> PatternConfig {
        self.settings(self.active).resolve(self.active)
    }
}

//! Per-pixel tone extraction for mono and CMYK ink layers
//!
//! Tone is a lightness value in `[0, 1]`: 1 means the layer puts no ink on the
//! pixel and 0 means full coverage. Transparent source pixels are always 1.

use crate::io::configuration::{MAX_BRIGHTNESS, MAX_CONTRAST, MID_GRAY};
use crate::io::error::{Result, invalid_parameter};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

const LUMA_WEIGHTS: [f64; 3] = [0.299, 0.587, 0.114];

/// Contrast, brightness and inversion applied before any pattern decision
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToneAdjustment {
    /// Contrast multiplier pivoting around mid-gray
    pub contrast: f64,
    /// Offset added on the 0-255 scale before contrast
    pub brightness: f64,
    /// Swap light and dark
    pub invert: bool,
}

impl Default for ToneAdjustment {
    fn default() -> Self {
        Self {
            contrast: 1.0,
            brightness: 0.0,
            invert: false,
        }
    }
}

impl ToneAdjustment {
    /// Apply brightness then contrast to a 0-255 level, returning `[0, 1]`
    pub fn level(&self, value: f64) -> f64 {
        let adjusted = (value + self.brightness - MID_GRAY).mul_add(self.contrast, MID_GRAY);
        adjusted.clamp(0.0, 255.0) / 255.0
    }

    /// Reject out-of-range or non-finite values
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for negative, too large or non-finite contrast,
    /// and for brightness outside `±255`
    pub fn validate(&self) -> Result<()> {
        if !self.contrast.is_finite() || !(0.0..=MAX_CONTRAST).contains(&self.contrast) {
            return Err(invalid_parameter(
                "contrast",
                &self.contrast,
                &format!("must be within 0..={MAX_CONTRAST}"),
            ));
        }
        if !self.brightness.is_finite() || self.brightness.abs() > MAX_BRIGHTNESS {
            return Err(invalid_parameter(
                "brightness",
                &self.brightness,
                &format!("must be within ±{MAX_BRIGHTNESS}"),
            ));
        }
        Ok(())
    }
}

/// Which separation a tone query reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// Mono luma
    Luma,
    /// Cyan plate
    Cyan,
    /// Magenta plate
    Magenta,
    /// Yellow plate
    Yellow,
    /// Key (black) plate
    Key,
}

/// Tone of one RGBA pixel for a channel
pub fn tone_of(pixel: [u8; 4], channel: Channel, adjustment: &ToneAdjustment) -> f64 {
    let [r, g, b, a] = pixel;
    if a == 0 {
        return 1.0;
    }
    let (r, g, b) = (f64::from(r), f64::from(g), f64::from(b));

    if channel == Channel::Luma {
        let luma = LUMA_WEIGHTS[0].mul_add(r, LUMA_WEIGHTS[1].mul_add(g, LUMA_WEIGHTS[2] * b));
        let tone = adjustment.level(luma);
        return if adjustment.invert { 1.0 - tone } else { tone };
    }

    let adjust = |v: f64| {
        let level = adjustment.level(v);
        if adjustment.invert { 1.0 - level } else { level }
    };
    let (r, g, b) = (adjust(r), adjust(g), adjust(b));
    1.0 - plate_ink(r, g, b, channel)
}

/// Ink coverage of one CMYK plate for adjusted RGB in `[0, 1]`
///
/// Chromatic plates carry their separated ink plus the key component, so a
/// neutral gray lands identically on every plate.
pub fn plate_ink(r: f64, g: f64, b: f64, channel: Channel) -> f64 {
    let key = 1.0 - r.max(g).max(b);
    let separated = |v: f64| {
        if key >= 1.0 - f64::EPSILON {
            0.0
        } else {
            (1.0 - v - key) / (1.0 - key)
        }
    };
    let ink = match channel {
        Channel::Luma => {
            1.0 - LUMA_WEIGHTS[0].mul_add(r, LUMA_WEIGHTS[1].mul_add(g, LUMA_WEIGHTS[2] * b))
        }
        Channel::Key => key,
        Channel::Cyan => separated(r).mul_add(1.0 - key, key),
        Channel::Magenta => separated(g).mul_add(1.0 - key, key),
        Channel::Yellow => separated(b).mul_add(1.0 - key, key),
    };
    ink.clamp(0.0, 1.0)
}

/// Dense tone plane for one channel over the working frame
///
/// Indexed `[row, col]`; both raster and vector passes sample this one plane so
/// they see the same tone at the same pixel.
#[derive(Debug, Clone)]
pub struct ToneField {
    tones: Array2<f64>,
    transparent: Array2<bool>,
}

impl ToneField {
    /// Wrap precomputed tone and transparency planes
    pub const fn new(tones: Array2<f64>, transparent: Array2<bool>) -> Self {
        Self {
            tones,
            transparent,
        }
    }

    /// Frame width in pixels
    pub fn width(&self) -> usize {
        self.tones.ncols()
    }

    /// Frame height in pixels
    pub fn height(&self) -> usize {
        self.tones.nrows()
    }

    /// Tone at an integer pixel; outside pixels read as background
    pub fn at(&self, x: i64, y: i64) -> f64 {
        if x < 0 || y < 0 {
            return 1.0;
        }
        self.tones
            .get((y as usize, x as usize))
            .copied()
            .unwrap_or(1.0)
    }

    /// Whether the source contributes nothing at this pixel
    pub fn is_transparent(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 {
            return true;
        }
        self.transparent
            .get((y as usize, x as usize))
            .copied()
            .unwrap_or(true)
    }

    /// Tone at a continuous frame position, using the covering pixel
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        self.at(x.floor() as i64, y.floor() as i64)
    }

    /// Transparency at a continuous frame position
    pub fn sample_transparent(&self, x: f64, y: f64) -> bool {
        self.is_transparent(x.floor() as i64, y.floor() as i64)
    }
}

//! Ink layers, paint colours and CMYK plate order

use crate::io::error::{EngineError, Result, invalid_parameter};
use crate::sampling::tone::Channel;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque paint colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    /// Red component
    pub r: u8,
    /// Green component
    pub g: u8,
    /// Blue component
    pub b: u8,
}

impl Rgb {
    /// Black
    pub const BLACK: Self = Self::new(0, 0, 0);
    /// White
    pub const WHITE: Self = Self::new(255, 255, 255);

    /// Colour from components
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Components as an array
    pub const fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl FromStr for Rgb {
    type Err = EngineError;

    fn from_str(text: &str) -> Result<Self> {
        let digits = text.strip_prefix('#').unwrap_or(text);
        let parse = |range: std::ops::Range<usize>| {
            digits
                .get(range)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
        };
        match (digits.len(), parse(0..2), parse(2..4), parse(4..6)) {
            (6, Some(r), Some(g), Some(b)) => Ok(Self::new(r, g, b)),
            _ => Err(invalid_parameter("color", &text, &"expected #rrggbb")),
        }
    }
}

impl TryFrom<String> for Rgb {
    type Error = EngineError;

    fn try_from(text: String) -> Result<Self> {
        text.parse()
    }
}

impl From<Rgb> for String {
    fn from(color: Rgb) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// One printable separation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InkLayer {
    /// Single-colour output
    Mono(Rgb),
    /// Cyan plate
    Cyan,
    /// Magenta plate
    Magenta,
    /// Yellow plate
    Yellow,
    /// Key plate
    Key,
}

impl InkLayer {
    /// Blend order of the CMYK plates; later plates multiply onto earlier ones
    pub const CMYK_ORDER: [Self; 4] = [Self::Cyan, Self::Magenta, Self::Yellow, Self::Key];

    /// Tone channel read for this layer
    pub const fn channel(self) -> Channel {
        match self {
            Self::Mono(_) => Channel::Luma,
            Self::Cyan => Channel::Cyan,
            Self::Magenta => Channel::Magenta,
            Self::Yellow => Channel::Yellow,
            Self::Key => Channel::Key,
        }
    }

    /// Paint colour
    pub const fn color(self) -> Rgb {
        match self {
            Self::Mono(color) => color,
            Self::Cyan => Rgb::new(0, 255, 255),
            Self::Magenta => Rgb::new(255, 0, 255),
            Self::Yellow => Rgb::new(255, 255, 0),
            Self::Key => Rgb::BLACK,
        }
    }

    /// Screen angle added to the user rotation (degrees)
    pub const fn screen_angle(self) -> f64 {
        match self {
            Self::Mono(_) => 0.0,
            Self::Cyan => 15.0,
            Self::Magenta => 75.0,
            Self::Yellow => 0.0,
            Self::Key => 45.0,
        }
    }

    /// Stipple seed offset keeping plates from co-locating
    pub const fn stipple_seed(self) -> u32 {
        match self {
            Self::Mono(_) => 0,
            Self::Cyan => 7_919,
            Self::Magenta => 15_887,
            Self::Yellow => 23_873,
            Self::Key => 31_847,
        }
    }

    /// Group name used in vector output
    pub const fn name(self) -> &'static str {
        match self {
            Self::Mono(_) => "mono",
            Self::Cyan => "cyan",
            Self::Magenta => "magenta",
            Self::Yellow => "yellow",
            Self::Key => "key",
        }
    }
}

/// Which CMYK plates are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CmykPlates {
    /// Cyan plate enabled
    pub cyan: bool,
    /// Magenta plate enabled
    pub magenta: bool,
    /// Yellow plate enabled
    pub yellow: bool,
    /// Key plate enabled
    pub key: bool,
}

impl Default for CmykPlates {
    fn default() -> Self {
        Self {
            cyan: true,
            magenta: true,
            yellow: true,
            key: true,
        }
    }
}

/// Mono or CMYK output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColorMode {
    /// One layer in the given colour
    Mono {
        /// Paint colour
        color: Rgb,
    },
    /// Up to four process plates
    Cmyk {
        /// Enabled plates
        plates: CmykPlates,
    },
}

impl Default for ColorMode {
    fn default() -> Self {
        Self::Mono { color: Rgb::BLACK }
    }
}

impl ColorMode {
    /// Active layers in blend order (C, M, Y, K for process colour)
    pub fn layers(&self) -> Vec<InkLayer> {
        match *self {
            Self::Mono { color } => vec![InkLayer::Mono(color)],
            Self::Cmyk { plates } => InkLayer::CMYK_ORDER
                .into_iter()
                .filter(|layer| match layer {
                    InkLayer::Cyan => plates.cyan,
                    InkLayer::Magenta => plates.magenta,
                    InkLayer::Yellow => plates.yellow,
                    InkLayer::Key => plates.key,
                    InkLayer::Mono(_) => false,
                })
                .collect(),
        }
    }

    /// Colour used for the frame ring
    pub const fn ring_color(&self) -> Rgb {
        match *self {
            Self::Mono { color } => color,
            Self::Cmyk { .. } => Rgb::BLACK,
        }
    }

    /// Reject process colour with every plate switched off
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` when no layer would be printed
    pub fn validate(&self) -> Result<()> {
        if self.layers().is_empty() {
            return Err(invalid_parameter(
                "plates",
                &"none",
                &"at least one CMYK plate must be enabled",
            ));
        }
        Ok(())
    }
}

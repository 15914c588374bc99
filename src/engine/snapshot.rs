//! Immutable render inputs
//!
//! A [`Snapshot`] pairs the shared source pixels with fully resolved settings.
//! It is validated once at construction and then handed to render passes or
//! export workers by value.

use crate::io::configuration::{
    DEFAULT_BORDER_WIDTH, MAX_BORDER_WIDTH, MAX_FRAME_DIMENSION, PREVIEW_MAX_DIMENSION,
};
use crate::io::error::{Result, invalid_parameter};
use crate::pattern::config::PatternConfig;
use crate::pattern::constraint::{FeatureConstraint, FeatureFloor};
use crate::render::compositor::{Background, LayerCompositor};
use crate::render::ink::ColorMode;
use crate::render::mesh::LithophaneParams;
use crate::render::vector::VectorTracer;
use crate::sampling::frame::{FrameRaster, Resample, SourceRaster, ViewTransform};
use crate::sampling::mask::{FrameGeometry, FrameMask};
use crate::sampling::tone::ToneAdjustment;
use serde::{Deserialize, Serialize};

/// Every user-facing setting the engine consumes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Frame outline and center hole
    pub frame: FrameGeometry,
    /// Source placement within the frame
    pub view: ViewTransform,
    /// Pattern mode and its parameters
    pub pattern: PatternConfig,
    /// Contrast, brightness and inversion
    pub tone: ToneAdjustment,
    /// Mono colour or active CMYK plates
    pub color: ColorMode,
    /// Fabrication feature-size floor
    pub constraint: FeatureConstraint,
    /// Frame ring width in pixels
    pub border_width: f64,
    /// Paper under uninked pixels
    pub background: Background,
    /// Mesh and lithophane preview settings
    pub lithophane: LithophaneParams,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            frame: FrameGeometry::default(),
            view: ViewTransform::default(),
            pattern: PatternConfig::default(),
            tone: ToneAdjustment::default(),
            color: ColorMode::default(),
            constraint: FeatureConstraint::default(),
            border_width: DEFAULT_BORDER_WIDTH,
            background: Background::default(),
            lithophane: LithophaneParams::default(),
        }
    }
}

impl RenderSettings {
    /// Range-check every field
    ///
    /// # Errors
    ///
    /// Returns the first `InvalidParameter` found
    pub fn validate(&self) -> Result<()> {
        self.frame.validate()?;
        self.view.validate()?;
        self.pattern.validate()?;
        self.tone.validate()?;
        self.color.validate()?;
        self.constraint.validate()?;
        self.lithophane.validate()?;
        if !self.border_width.is_finite() || !(0.0..=MAX_BORDER_WIDTH).contains(&self.border_width)
        {
            return Err(invalid_parameter(
                "border_width",
                &self.border_width,
                &format!("must be within 0..={MAX_BORDER_WIDTH}"),
            ));
        }
        Ok(())
    }

    /// Parse settings from JSON; missing fields take their defaults
    ///
    /// # Errors
    ///
    /// Returns `ConfigParse` for malformed JSON
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Serialize to pretty-printed JSON
    ///
    /// # Errors
    ///
    /// Returns `ConfigParse` if serialization fails
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Resolution class of a render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quality {
    /// Capped resolution, nearest sampling
    Preview,
    /// Native resolution, bilinear sampling
    #[default]
    Export,
}

impl Quality {
    /// Source filtering for this quality
    pub const fn resample(self) -> Resample {
        match self {
            Self::Preview => Resample::Nearest,
            Self::Export => Resample::Bilinear,
        }
    }

    /// Longer frame side for a source of the given native size
    pub fn base_size(self, native: u32) -> u32 {
        let cap = match self {
            Self::Preview => PREVIEW_MAX_DIMENSION,
            Self::Export => MAX_FRAME_DIMENSION,
        };
        native.clamp(1, cap)
    }
}

/// Source plus validated settings
#[derive(Debug, Clone)]
pub struct Snapshot {
    source: SourceRaster,
    settings: RenderSettings,
}

impl Snapshot {
    /// Validate and capture
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` when any setting is out of range
    pub fn new(source: SourceRaster, settings: RenderSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self { source, settings })
    }

    /// Shared source pixels
    pub const fn source(&self) -> &SourceRaster {
        &self.source
    }

    /// Resolved settings
    pub const fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Frame size in pixels at a quality
    pub fn frame_size(&self, quality: Quality) -> (u32, u32) {
        let base = quality.base_size(self.source.native_size());
        self.settings.frame.dimensions(base)
    }

    /// Place the source into the frame and resolve the mask
    pub fn frame(&self, quality: Quality) -> (FrameRaster, FrameMask) {
        let (width, height) = self.frame_size(quality);
        let raster = FrameRaster::compose(
            &self.source,
            &self.settings.view,
            width,
            height,
            quality.resample(),
        );
        (raster, self.settings.frame.mask(width, height))
    }

    /// Feature floor for a frame of the given width
    pub fn floor(&self, frame_width: u32) -> FeatureFloor {
        self.settings.constraint.floor_for(frame_width)
    }

    /// Compositor configured for a frame of the given width
    pub fn compositor(&self, frame_width: u32) -> LayerCompositor {
        LayerCompositor {
            pattern: self.settings.pattern,
            adjustment: self.settings.tone,
            color: self.settings.color,
            floor: self.floor(frame_width),
            border_width: self.settings.border_width,
            background: self.settings.background,
        }
    }

    /// Tracer configured for a frame of the given width
    pub fn tracer(&self, frame_width: u32) -> VectorTracer {
        VectorTracer {
            pattern: self.settings.pattern,
            adjustment: self.settings.tone,
            color: self.settings.color,
            floor: self.floor(frame_width),
        }
    }
}

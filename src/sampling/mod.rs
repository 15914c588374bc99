//! Source placement, tone extraction and frame membership
//!
//! This module contains everything that turns a caller's source raster into
//! per-pixel inputs for the pattern evaluators:
//! - Placing the source into the working frame
//! - Converting pixels into per-layer tone
//! - Deciding frame and center-hole membership

/// Source placement into the working frame
pub mod frame;
/// Frame membership tests
pub mod mask;
/// Per-pixel tone extraction
pub mod tone;

pub use frame::{FrameRaster, Resample, SourceRaster, ViewTransform};
pub use mask::{FrameGeometry, FrameMask, FrameShape};
pub use tone::{Channel, ToneAdjustment, ToneField};

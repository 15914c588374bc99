//! Photo-to-pattern engine for print and fabrication
//!
//! A source photo is placed in a circular, square or custom frame and redrawn
//! as a continuous spiral, a rotated line screen, AM halftone dots, isophote
//! hatching or stochastic stipple, in one colour or as CMYK plates. The same
//! settings drive a composited raster, per-layer vector paths and a lithophane
//! height-field mesh.

#![forbid(unsafe_code)]

/// Render entry points, immutable snapshots and the export queue
pub mod engine;
/// Input/output operations and error handling
pub mod io;
/// Clamping, interpolation, geometry and hashing helpers
pub mod math;
/// Pattern screens, hatching, stipple and the feature-size floor
pub mod pattern;
/// Raster compositing, vector tracing and mesh generation
pub mod render;
/// Source placement, tone extraction and frame membership
pub mod sampling;

pub use io::error::{EngineError, Result};

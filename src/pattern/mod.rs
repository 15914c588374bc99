//! Pattern synthesis: screens, hatching, stipple and the feature-size floor

/// Pattern mode selection and per-mode parameters
pub mod config;
/// Minimum printable feature width
pub mod constraint;
/// Spiral, line and dot screens
pub mod evaluator;
/// Contour hatching along isophotes
pub mod flow;
/// Deterministic stochastic stipple
pub mod stipple;

pub use config::{DotShape, ModeSettings, PatternConfig, PatternMode, PatternSettings};
pub use constraint::{FeatureConstraint, FeatureFloor};
pub use evaluator::{Screen, ScreenKind};

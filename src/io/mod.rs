//! Input/output surfaces: import, encoders, CLI, progress and shared error types

/// Command-line interface and export orchestration
pub mod cli;
/// Engine constants and defaults
pub mod configuration;
/// Error types and context helpers
pub mod error;
/// Source import and PNG output
pub mod image;
/// Export progress display
pub mod progress;
/// Binary STL serialization
pub mod stl;
/// SVG serialization
pub mod svg;

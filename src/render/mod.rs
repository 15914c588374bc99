//! Output synthesis: raster compositing, vector tracing and height-field meshes
//!
//! All three outputs read the same tone fields, frame mask and pattern
//! formulas; none of them consumes another's result.

/// Per-layer rasterization and subtractive compositing
pub mod compositor;
/// Ink layers, paint colours and plate order
pub mod ink;
/// Backlit lithophane preview shading
pub mod lithophane;
/// Height-field triangulation
pub mod mesh;
/// Resolution-independent path extraction
pub mod vector;

pub use compositor::{Background, Composite, LayerCompositor, LayerPlane};
pub use ink::{CmykPlates, ColorMode, InkLayer, Rgb};
pub use mesh::{HeightfieldMesh, LithophaneParams, MeshBuilder, Triangle};
pub use vector::{PathGroup, Primitive, VectorDocument, VectorTracer};

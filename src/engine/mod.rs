//! Engine entry points
//!
//! Each entry point is a pure function of a [`Snapshot`]. Raster and vector
//! output are derived independently from the same placed frame and mask. The
//! mesh is built from the export-quality composite and the lithophane preview
//! from the composite at its requested quality. Passes run behind an unwind
//! guard so a failing pass yields a retryable error and no partial output.

/// Off-thread export queue with last-wins semantics
pub mod jobs;
/// Immutable render inputs
pub mod snapshot;

pub use jobs::{Artifact, ArtifactKind, ExportHandle, ExportQueue, ExportRequest};
pub use snapshot::{Quality, RenderSettings, Snapshot};

use crate::io::error::{Result, computation_error};
use crate::render::compositor::Composite;
use crate::render::lithophane::lithophane_preview;
use crate::render::mesh::{HeightfieldMesh, LithophaneParams, MeshBuilder};
use crate::render::vector::VectorDocument;
use image::RgbaImage;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Instant;

// Runs one pass, turning a panic into a retryable computation error
fn guarded<T>(operation: &'static str, pass: impl FnOnce() -> Result<T>) -> Result<T> {
    let started = Instant::now();
    let outcome = catch_unwind(AssertUnwindSafe(pass)).unwrap_or_else(|payload| {
        let reason = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "pass aborted".to_string());
        Err(computation_error(operation, &reason))
    });
    log::debug!("{operation} finished in {:?}", started.elapsed());
    outcome
}

/// Composited raster with its per-layer planes
///
/// # Errors
///
/// Returns a computation error if the pass fails
pub fn render_composite(snapshot: &Snapshot, quality: Quality) -> Result<Composite> {
    guarded("render", || {
        let (frame, mask) = snapshot.frame(quality);
        snapshot.compositor(frame.width()).render(&frame, &mask)
    })
}

/// Composited RGBA raster at a quality
///
/// # Errors
///
/// Returns a computation error if the pass fails
pub fn render_raster(snapshot: &Snapshot, quality: Quality) -> Result<RgbaImage> {
    render_composite(snapshot, quality).map(|composite| composite.image)
}

/// Capped-resolution raster for interactive display
///
/// # Errors
///
/// Returns a computation error if the pass fails
pub fn render_preview(snapshot: &Snapshot) -> Result<RgbaImage> {
    render_raster(snapshot, Quality::Preview)
}

/// Backlit impression of the composited raster
///
/// # Errors
///
/// Returns a computation error if either pass fails
pub fn render_lithophane_preview(snapshot: &Snapshot, quality: Quality) -> Result<RgbaImage> {
    let composite = render_composite(snapshot, quality)?;
    let params = snapshot.settings().lithophane;
    guarded("lithophane preview", || {
        Ok(lithophane_preview(&composite.image, &params))
    })
}

/// Per-layer vector geometry at native resolution
///
/// # Errors
///
/// Returns `Unsupported` for photo passthrough and a computation error if the
/// pass fails
pub fn trace_vectors(snapshot: &Snapshot) -> Result<VectorDocument> {
    guarded("trace", || {
        let (frame, mask) = snapshot.frame(Quality::Export);
        let physical_width = snapshot.settings().constraint.physical_width_mm;
        snapshot
            .tracer(frame.width())
            .trace(&frame, &mask, physical_width)
    })
}

/// Clipped height-field mesh of the native-resolution raster
///
/// # Errors
///
/// Returns `InvalidParameter` for bad lithophane parameters and a computation
/// error if either pass fails
pub fn build_mesh(snapshot: &Snapshot, params: &LithophaneParams) -> Result<HeightfieldMesh> {
    params.validate()?;
    let composite = render_composite(snapshot, Quality::Export)?;
    guarded("mesh", || {
        let (width, height) = (composite.image.width(), composite.image.height());
        let mask = snapshot.settings().frame.mask(width, height);
        MeshBuilder::new(*params).build(&composite.image, &mask)
    })
}

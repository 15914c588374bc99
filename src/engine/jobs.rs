//! Off-thread exports with last-wins supersession
//!
//! Every submission takes a ticket from a shared counter and runs on its own
//! named worker thread against a snapshot it owns. Only the newest ticket's
//! result is accepted; older handles report `JobSuperseded` instead of bytes.

use crate::engine::snapshot::{Quality, Snapshot};
use crate::engine::{build_mesh, render_lithophane_preview, render_raster, trace_vectors};
use crate::io::configuration::EXPORT_THREAD_NAME;
use crate::io::error::{EngineError, Result, WithContext, computation_error};
use crate::io::image::encode_png;
use crate::io::stl::encode_stl;
use crate::io::svg::encode_svg;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{Receiver, TryRecvError, sync_channel};
use std::thread;

/// Output an export produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportRequest {
    /// Native-resolution composited PNG
    Raster,
    /// Per-layer SVG
    Vector,
    /// Binary STL height field
    Mesh,
    /// Backlit lithophane impression as PNG
    LithophanePreview,
}

impl ExportRequest {
    /// Encoding of the finished artifact
    pub const fn kind(self) -> ArtifactKind {
        match self {
            Self::Raster | Self::LithophanePreview => ArtifactKind::Png,
            Self::Vector => ArtifactKind::Svg,
            Self::Mesh => ArtifactKind::Stl,
        }
    }
}

/// File encoding of an artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// Compressed RGBA raster
    Png,
    /// XML vector document
    Svg,
    /// Binary triangle mesh
    Stl,
}

impl ArtifactKind {
    /// Conventional file extension
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Svg => "svg",
            Self::Stl => "stl",
        }
    }
}

/// Finished export, ready to be written out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Encoding of `bytes`
    pub kind: ArtifactKind,
    /// Encoded file contents
    pub bytes: Vec<u8>,
}

/// Run one export synchronously
///
/// # Errors
///
/// Propagates render, trace, mesh or encoding failures
pub fn run_export(snapshot: &Snapshot, request: ExportRequest) -> Result<Artifact> {
    let bytes = match request {
        ExportRequest::Raster => render_raster(snapshot, Quality::Export)
            .and_then(|image| encode_png(&image))
            .with_operation("raster export")?,
        ExportRequest::Vector => trace_vectors(snapshot)
            .map(|document| encode_svg(&document).into_bytes())
            .with_operation("vector export")?,
        ExportRequest::Mesh => build_mesh(snapshot, &snapshot.settings().lithophane)
            .map(|mesh| encode_stl(&mesh))
            .with_operation("mesh export")?,
        ExportRequest::LithophanePreview => {
            render_lithophane_preview(snapshot, Quality::Export)
                .and_then(|image| encode_png(&image))
                .with_operation("lithophane export")?
        }
    };
    Ok(Artifact {
        kind: request.kind(),
        bytes,
    })
}

/// Issues export tickets and spawns workers
#[derive(Debug, Clone, Default)]
pub struct ExportQueue {
    latest: Arc<AtomicU64>,
}

impl ExportQueue {
    /// Empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticket of the most recent submission (0 before the first)
    pub fn latest_ticket(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    /// Start an export, superseding every earlier one
    ///
    /// # Errors
    ///
    /// Returns a computation error if the worker thread cannot be spawned
    pub fn submit(&self, snapshot: Snapshot, request: ExportRequest) -> Result<ExportHandle> {
        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let latest = Arc::clone(&self.latest);
        let (result_tx, result_rx) = sync_channel(1);

        let worker_latest = Arc::clone(&latest);
        thread::Builder::new()
            .name(format!("{EXPORT_THREAD_NAME}-{ticket}"))
            .spawn(move || {
                let result = if worker_latest.load(Ordering::SeqCst) == ticket {
                    run_export(&snapshot, request)
                } else {
                    Err(EngineError::JobSuperseded { ticket })
                };
                // The handle may already be gone; nothing to report then
                let _ = result_tx.send(result);
            })
            .map_err(|e| computation_error("export", &format!("cannot spawn worker: {e}")))?;

        log::debug!("export {ticket} submitted ({request:?})");
        Ok(ExportHandle {
            ticket,
            latest,
            receiver: result_rx,
        })
    }
}

/// Pending export result
#[derive(Debug)]
pub struct ExportHandle {
    ticket: u64,
    latest: Arc<AtomicU64>,
    receiver: Receiver<Result<Artifact>>,
}

impl ExportHandle {
    /// Ticket of this export
    pub const fn ticket(&self) -> u64 {
        self.ticket
    }

    /// Whether no newer export has been submitted
    pub fn is_current(&self) -> bool {
        self.latest.load(Ordering::SeqCst) == self.ticket
    }

    /// Result if the worker has finished, without blocking
    pub fn try_result(&self) -> Option<Result<Artifact>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(self.accept(result)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(EngineError::JobFailed {
                ticket: self.ticket,
            })),
        }
    }

    /// Block until the worker finishes
    ///
    /// # Errors
    ///
    /// Returns `JobSuperseded` when a newer export was submitted, `JobFailed`
    /// when the worker vanished, or the export's own error
    pub fn wait(self) -> Result<Artifact> {
        match self.receiver.recv() {
            Ok(result) => self.accept(result),
            Err(_) => Err(EngineError::JobFailed {
                ticket: self.ticket,
            }),
        }
    }

    fn accept(&self, result: Result<Artifact>) -> Result<Artifact> {
        if self.is_current() {
            return result;
        }
        log::warn!("discarding result of superseded export {}", self.ticket);
        Err(EngineError::JobSuperseded {
            ticket: self.ticket,
        })
    }
}

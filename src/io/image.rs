//! Source import with deterministic downscaling, PNG encoding and artifact writing

use crate::io::configuration::MAX_IMPORT_DIMENSION;
use crate::io::error::{EngineError, Result, computation_error, io_error};
use crate::sampling::frame::SourceRaster;
use image::imageops::{self, FilterType};
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;
use std::path::Path;

/// Shrink an image so its longer side fits `cap`, keeping the aspect ratio
///
/// Images already within the cap are returned untouched. The filter is fixed,
/// so the same input always yields the same pixels.
pub fn downscale_to_cap(image: RgbaImage, cap: u32) -> RgbaImage {
    let (width, height) = image.dimensions();
    let longer = width.max(height);
    if longer <= cap || cap == 0 {
        return image;
    }
    let ratio = f64::from(cap) / f64::from(longer);
    let target_w = ((f64::from(width) * ratio).round() as u32).clamp(1, cap);
    let target_h = ((f64::from(height) * ratio).round() as u32).clamp(1, cap);
    log::info!("downscaling {width}x{height} source to {target_w}x{target_h}");
    imageops::resize(&image, target_w, target_h, FilterType::Lanczos3)
}

/// Decode an in-memory image into a source raster
///
/// # Errors
///
/// Returns `ImageDecode` when the bytes are not a supported image and
/// `InvalidSourceData` when the image has no pixels
pub fn decode_source(bytes: &[u8]) -> Result<SourceRaster> {
    let decoded = image::load_from_memory(bytes)?.to_rgba8();
    SourceRaster::new(downscale_to_cap(decoded, MAX_IMPORT_DIMENSION))
}

/// Load an image file into a source raster
///
/// # Errors
///
/// Returns `ImageLoad` when the file cannot be read or decoded and
/// `InvalidSourceData` when the image has no pixels
pub fn load_source(path: &Path) -> Result<SourceRaster> {
    let decoded = image::open(path)
        .map_err(|e| EngineError::ImageLoad {
            path: path.to_path_buf(),
            source: e,
        })?
        .to_rgba8();
    SourceRaster::new(downscale_to_cap(decoded, MAX_IMPORT_DIMENSION))
}

/// Encode a raster as PNG, alpha preserved
///
/// # Errors
///
/// Returns a computation error if the encoder fails
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut bytes = Cursor::new(Vec::new());
    image
        .write_to(&mut bytes, ImageFormat::Png)
        .map_err(|e| computation_error("png encode", &e))?;
    Ok(bytes.into_inner())
}

/// Write encoded output, creating parent directories as needed
///
/// # Errors
///
/// Returns `FileSystem` if a directory cannot be created or the file cannot be
/// written
pub fn write_artifact(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| io_error(parent, "create directory", e))?;
    }
    std::fs::write(path, bytes).map_err(|e| io_error(path, "write", e))
}

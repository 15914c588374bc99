//! Backlit lithophane approximation for previews
//!
//! Light through a slab falls off exponentially with thickness; a Sobel term
//! over the same thickness field adds the relief shading a printed panel shows
//! under raking light. The depth field is read, never written, so previews
//! cannot drift from the mesh.

use crate::io::configuration::{LITHO_ATTENUATION, LITHO_RELIEF_GAIN};
use crate::render::mesh::{LithophaneParams, depth_field};
use image::{Rgba, RgbaImage};
use ndarray::Array2;
use rayon::prelude::{IndexedParallelIterator, ParallelIterator};
use rayon::slice::ParallelSliceMut;

/// Sobel gradient magnitude of a field at a cell, edges clamped
pub fn sobel_magnitude(field: &Array2<f64>, x: usize, y: usize) -> f64 {
    let (rows, cols) = field.dim();
    if rows == 0 || cols == 0 {
        return 0.0;
    }
    let at = |ox: isize, oy: isize| {
        let sx = x.saturating_add_signed(ox).min(cols - 1);
        let sy = y.saturating_add_signed(oy).min(rows - 1);
        field.get((sy, sx)).copied().unwrap_or(0.0)
    };
    let gx = (at(1, -1) + 2.0 * at(1, 0) + at(1, 1)) - (at(-1, -1) + 2.0 * at(-1, 0) + at(-1, 1));
    let gy = (at(-1, 1) + 2.0 * at(0, 1) + at(1, 1)) - (at(-1, -1) + 2.0 * at(0, -1) + at(1, -1));
    gx.hypot(gy)
}

/// Grayscale impression of the image printed as a lithophane and backlit
pub fn lithophane_preview(image: &RgbaImage, params: &LithophaneParams) -> RgbaImage {
    let (width, height) = image.dimensions();
    let depth = depth_field(image, params);
    let max_depth = params.max_depth_mm.max(f64::EPSILON);

    let mut pixels = vec![0u8; width as usize * height as usize * 4];
    pixels
        .par_chunks_mut((width as usize * 4).max(1))
        .enumerate()
        .for_each(|(y, row)| {
            for (x, pixel) in row.chunks_exact_mut(4).enumerate() {
                let thickness = depth.get((y, x)).copied().unwrap_or(0.0) / max_depth;
                let transmitted = (-LITHO_ATTENUATION * thickness).exp();
                // Sobel weights sum to 8 per axis
                let relief = sobel_magnitude(&depth, x, y) / (8.0 * max_depth);
                let light = LITHO_RELIEF_GAIN.mul_add(-relief, transmitted).clamp(0.0, 1.0);
                let level = (light * 255.0).round() as u8;
                pixel.copy_from_slice(&[level, level, level, 255]);
            }
        });

    RgbaImage::from_raw(width, height, pixels)
        .unwrap_or_else(|| RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255])))
}

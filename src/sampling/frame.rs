//! Source placement into the working frame
//!
//! The caller's crop settings (zoom plus percentage pan) position the source
//! over the frame with cover fitting. Every downstream pass reads the resulting
//! [`FrameRaster`] instead of the source, so raster, vector and mesh output
//! agree on which source pixel lies under each frame pixel.

use crate::io::configuration::{CENTERED_PAN, MAX_PAN, MAX_VIEW_SCALE, MIN_VIEW_SCALE};
use crate::io::error::{EngineError, Result, invalid_parameter};
use crate::sampling::tone::{Channel, ToneAdjustment, ToneField, tone_of};
use image::RgbaImage;
use ndarray::Array2;
use rayon::prelude::{IndexedParallelIterator, ParallelIterator};
use rayon::slice::ParallelSliceMut;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Immutable RGBA source shared between the caller and queued exports
#[derive(Debug, Clone)]
pub struct SourceRaster {
    pixels: Arc<RgbaImage>,
}

impl SourceRaster {
    /// Wrap a decoded image
    ///
    /// # Errors
    ///
    /// Returns `InvalidSourceData` for zero-sized images
    pub fn new(pixels: RgbaImage) -> Result<Self> {
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(EngineError::InvalidSourceData {
                reason: "source image has no pixels".to_string(),
            });
        }
        Ok(Self {
            pixels: Arc::new(pixels),
        })
    }

    /// Build from raw row-major RGBA bytes
    ///
    /// # Errors
    ///
    /// Returns `InvalidSourceData` when the byte count doesn't match the size
    pub fn from_rgba(width: u32, height: u32, bytes: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        let actual = bytes.len();
        let pixels = RgbaImage::from_raw(width, height, bytes).ok_or_else(|| {
            EngineError::InvalidSourceData {
                reason: format!("expected {expected} RGBA bytes for {width}x{height}, got {actual}"),
            }
        })?;
        Self::new(pixels)
    }

    /// Source width in pixels
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Source height in pixels
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Shorter side; the native export frame size
    pub fn native_size(&self) -> u32 {
        self.width().min(self.height())
    }

    /// Borrow the decoded pixels
    pub fn image(&self) -> &RgbaImage {
        &self.pixels
    }
}

/// Crop settings mapping the source onto the frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewTransform {
    /// Zoom on top of cover fitting
    pub scale: f64,
    /// Horizontal pan percentage, 50 is centered
    pub pan_x: f64,
    /// Vertical pan percentage, 50 is centered
    pub pan_y: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            pan_x: CENTERED_PAN,
            pan_y: CENTERED_PAN,
        }
    }
}

impl ViewTransform {
    /// Reject zooms outside the supported range and pans outside `0..=100`
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` naming the first offending field
    pub fn validate(&self) -> Result<()> {
        if !self.scale.is_finite() || !(MIN_VIEW_SCALE..=MAX_VIEW_SCALE).contains(&self.scale) {
            return Err(invalid_parameter(
                "scale",
                &self.scale,
                &format!("must be within {MIN_VIEW_SCALE}..={MAX_VIEW_SCALE}"),
            ));
        }
        for (name, value) in [("pan_x", self.pan_x), ("pan_y", self.pan_y)] {
            if !value.is_finite() || !(0.0..=MAX_PAN).contains(&value) {
                return Err(invalid_parameter(name, &value, &"must be within 0..=100"));
            }
        }
        Ok(())
    }

    /// Placement of a source of the given size inside a frame
    pub fn placement(&self, source: (u32, u32), frame: (u32, u32)) -> Placement {
        let (src_w, src_h) = (f64::from(source.0), f64::from(source.1));
        let (frame_w, frame_h) = (f64::from(frame.0), f64::from(frame.1));
        let factor = (frame_w / src_w).max(frame_h / src_h) * self.scale;
        let draw_w = src_w * factor;
        let draw_h = src_h * factor;
        let shift_x = (self.pan_x - CENTERED_PAN) / 100.0 * frame_w * 2.0;
        let shift_y = (self.pan_y - CENTERED_PAN) / 100.0 * frame_h * 2.0;
        Placement {
            origin_x: frame_w / 2.0 - draw_w / 2.0 + shift_x,
            origin_y: frame_h / 2.0 - draw_h / 2.0 + shift_y,
            factor,
        }
    }
}

/// Resolved source rectangle within the frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Frame x of the source's left edge
    pub origin_x: f64,
    /// Frame y of the source's top edge
    pub origin_y: f64,
    /// Frame pixels per source pixel
    pub factor: f64,
}

impl Placement {
    /// Continuous source coordinate under a frame pixel center
    pub fn source_coordinate(&self, x: u32, y: u32) -> (f64, f64) {
        (
            (f64::from(x) + 0.5 - self.origin_x) / self.factor - 0.5,
            (f64::from(y) + 0.5 - self.origin_y) / self.factor - 0.5,
        )
    }
}

/// Source filtering used while placing the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resample {
    /// Nearest pixel; interactive previews
    Nearest,
    /// Bilinear blend of four pixels; exports
    #[default]
    Bilinear,
}

/// Source pixels placed into the working frame
#[derive(Debug, Clone)]
pub struct FrameRaster {
    pixels: RgbaImage,
}

impl FrameRaster {
    /// Place `source` into a `width`×`height` frame
    ///
    /// Frame pixels not covered by the source are fully transparent.
    pub fn compose(
        source: &SourceRaster,
        view: &ViewTransform,
        width: u32,
        height: u32,
        resample: Resample,
    ) -> Self {
        let image = source.image();
        let placement = view.placement((image.width(), image.height()), (width, height));
        let row_len = width as usize * 4;
        let mut buffer = vec![0u8; row_len * height as usize];

        buffer
            .par_chunks_mut(row_len.max(1))
            .enumerate()
            .for_each(|(row, pixels)| {
                for (col, out) in pixels.chunks_exact_mut(4).enumerate() {
                    let (sx, sy) = placement.source_coordinate(col as u32, row as u32);
                    let value = match resample {
                        Resample::Nearest => sample_nearest(image, sx, sy),
                        Resample::Bilinear => sample_bilinear(image, sx, sy),
                    };
                    out.copy_from_slice(&value);
                }
            });

        let pixels = RgbaImage::from_raw(width, height, buffer)
            .unwrap_or_else(|| RgbaImage::new(width, height));
        Self { pixels }
    }

    /// Wrap pixels that already match the frame
    pub const fn from_image(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    /// Frame width in pixels
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Frame height in pixels
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Borrow the placed pixels
    pub const fn image(&self) -> &RgbaImage {
        &self.pixels
    }

    /// RGBA at an integer pixel; outside reads as transparent
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.pixels
            .get_pixel_checked(x, y)
            .map_or([0, 0, 0, 0], |p| p.0)
    }

    /// Tone plane for one channel
    pub fn tone_field(&self, channel: Channel, adjustment: &ToneAdjustment) -> ToneField {
        let (width, height) = (self.width() as usize, self.height() as usize);
        let tones = Array2::from_shape_fn((height, width), |(y, x)| {
            tone_of(self.pixel(x as u32, y as u32), channel, adjustment)
        });
        let transparent =
            Array2::from_shape_fn((height, width), |(y, x)| self.pixel(x as u32, y as u32)[3] == 0);
        ToneField::new(tones, transparent)
    }
}

fn sample_nearest(image: &RgbaImage, sx: f64, sy: f64) -> [u8; 4] {
    let (x, y) = (sx.round(), sy.round());
    if x < 0.0 || y < 0.0 {
        return [0, 0, 0, 0];
    }
    image
        .get_pixel_checked(x as u32, y as u32)
        .map_or([0, 0, 0, 0], |p| p.0)
}

fn sample_bilinear(image: &RgbaImage, sx: f64, sy: f64) -> [u8; 4] {
    let max_x = f64::from(image.width()) - 0.5;
    let max_y = f64::from(image.height()) - 0.5;
    if sx < -0.5 || sy < -0.5 || sx >= max_x || sy >= max_y {
        return [0, 0, 0, 0];
    }
    let last_x = image.width().saturating_sub(1);
    let last_y = image.height().saturating_sub(1);
    let x0f = sx.floor();
    let y0f = sy.floor();
    let tx = sx - x0f;
    let ty = sy - y0f;
    let clamp_x = |v: f64| (v.max(0.0) as u32).min(last_x);
    let clamp_y = |v: f64| (v.max(0.0) as u32).min(last_y);
    let (x0, x1) = (clamp_x(x0f), clamp_x(x0f + 1.0));
    let (y0, y1) = (clamp_y(y0f), clamp_y(y0f + 1.0));

    let fetch = |x: u32, y: u32| image.get_pixel_checked(x, y).map_or([0, 0, 0, 0], |p| p.0);
    let corners = [fetch(x0, y0), fetch(x1, y0), fetch(x0, y1), fetch(x1, y1)];
    let weights = [(1.0 - tx) * (1.0 - ty), tx * (1.0 - ty), (1.0 - tx) * ty, tx * ty];

    let mut out = [0u8; 4];
    for (channel, value) in out.iter_mut().enumerate() {
        let blended: f64 = corners
            .iter()
            .zip(weights.iter())
            .map(|(pixel, weight)| f64::from(pixel.get(channel).copied().unwrap_or(0)) * weight)
            .sum();
        *value = blended.round().clamp(0.0, 255.0) as u8;
    }
    out
}

//! Per-layer pattern rasterization and subtractive compositing
//!
//! Each ink layer is rendered to its own coverage plane, then the planes are
//! stacked in layer order: the first paints directly and every later plate
//! multiplies onto what is already there. The frame ring goes on last.

use crate::io::error::{Result, computation_error};
use crate::math::geometry::{Point, segment_distance_squared};
use crate::pattern::config::PatternConfig;
use crate::pattern::constraint::FeatureFloor;
use crate::pattern::evaluator::Screen;
use crate::pattern::flow::{flow_segments, stroke_width};
use crate::pattern::stipple::stipple_dots;
use crate::render::ink::{ColorMode, InkLayer, Rgb};
use crate::sampling::frame::FrameRaster;
use crate::sampling::mask::FrameMask;
use crate::sampling::tone::{ToneAdjustment, ToneField};
use bitvec::vec::BitVec;
use image::{Rgba, RgbaImage};
use rayon::prelude::{IndexedParallelIterator, ParallelIterator};
use rayon::slice::ParallelSliceMut;
use serde::{Deserialize, Serialize};

/// What lies under pixels that receive no ink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Background {
    /// Fully transparent
    #[default]
    Transparent,
    /// Opaque white paper
    White,
}

/// Coverage of one ink layer, row-major, 0 = no ink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerPlane {
    layer: InkLayer,
    width: u32,
    height: u32,
    alpha: Vec<u8>,
}

impl LayerPlane {
    /// Layer this plane belongs to
    pub const fn layer(&self) -> InkLayer {
        self.layer
    }

    /// Plane width in pixels
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Plane height in pixels
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Coverage at a pixel
    pub fn alpha_at(&self, x: u32, y: u32) -> u8 {
        if x >= self.width {
            return 0;
        }
        let index = y as usize * self.width as usize + x as usize;
        self.alpha.get(index).copied().unwrap_or(0)
    }

    /// Number of pixels carrying any ink
    pub fn ink_pixels(&self) -> usize {
        self.alpha.iter().filter(|&&a| a > 0).count()
    }

    /// Raw coverage values
    pub fn coverage(&self) -> &[u8] {
        &self.alpha
    }
}

/// Composited raster plus the planes it was built from
#[derive(Debug, Clone)]
pub struct Composite {
    /// Final RGBA output
    pub image: RgbaImage,
    /// Per-layer coverage in blend order
    pub planes: Vec<LayerPlane>,
}

/// Raster renderer for one resolved configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerCompositor {
    /// Pattern to draw
    pub pattern: PatternConfig,
    /// Tone adjustment before pattern decisions
    pub adjustment: ToneAdjustment,
    /// Mono or process colour
    pub color: ColorMode,
    /// Feature-size floor resolved for this raster
    pub floor: FeatureFloor,
    /// Frame ring width in pixels (0 disables)
    pub border_width: f64,
    /// Paper under uninked pixels
    pub background: Background,
}

impl LayerCompositor {
    /// Render every active layer and composite them
    ///
    /// # Errors
    ///
    /// Returns a computation error when the frame and mask sizes disagree
    pub fn render(&self, frame: &FrameRaster, mask: &FrameMask) -> Result<Composite> {
        if frame.width() != mask.width() || frame.height() != mask.height() {
            return Err(computation_error(
                "composite",
                &format!(
                    "frame {}x{} does not match mask {}x{}",
                    frame.width(),
                    frame.height(),
                    mask.width(),
                    mask.height()
                ),
            ));
        }
        let inside = mask.bitmap();
        let planes: Vec<LayerPlane> = self
            .color
            .layers()
            .into_iter()
            .map(|layer| {
                let field = frame.tone_field(layer.channel(), &self.adjustment);
                self.render_layer(&field, mask, &inside, layer)
            })
            .collect();

        let mut image = composite(&planes, frame.width(), frame.height(), self.background);
        draw_ring(&mut image, mask, self.border_width, self.color.ring_color());
        log::debug!(
            "composited {} layer(s) at {}x{}",
            planes.len(),
            frame.width(),
            frame.height()
        );
        Ok(Composite { image, planes })
    }

    /// Coverage plane for one layer
    pub fn render_layer(
        &self,
        field: &ToneField,
        mask: &FrameMask,
        inside: &BitVec,
        layer: InkLayer,
    ) -> LayerPlane {
        let width = mask.width();
        let height = mask.height();
        let mut alpha = vec![0u8; width as usize * height as usize];
        let visible = |x: u32, y: u32| {
            let index = y as usize * width as usize + x as usize;
            inside.get(index).is_some_and(|bit| *bit)
                && !field.is_transparent(i64::from(x), i64::from(y))
        };

        match self.pattern {
            PatternConfig::Spiral { .. }
            | PatternConfig::Lines { .. }
            | PatternConfig::Dots { .. } => {
                if let Some(screen) =
                    Screen::new(&self.pattern, mask.half(), layer.screen_angle(), self.floor)
                {
                    fill_rows(&mut alpha, width, |x, y| {
                        if !visible(x, y) {
                            return 0;
                        }
                        let (dx, dy) = mask.offset_of(f64::from(x), f64::from(y));
                        let tone = field.at(i64::from(x), i64::from(y));
                        if screen.is_foreground(dx, dy, tone) { 255 } else { 0 }
                    });
                }
            }
            PatternConfig::PhotoPassthrough => {
                fill_rows(&mut alpha, width, |x, y| {
                    if !visible(x, y) {
                        return 0;
                    }
                    let tone = field.at(i64::from(x), i64::from(y));
                    (crate::math::clamp_unit(1.0 - tone) * 255.0).round() as u8
                });
            }
            PatternConfig::Flow { density, thickness } => {
                let stroke = stroke_width(&self.floor) / 2.0;
                for segment in flow_segments(field, mask, density, thickness) {
                    stamp_capsule(&mut alpha, width, height, segment.start, segment.end, stroke, &visible);
                }
            }
            PatternConfig::Stipple { density, thickness } => {
                let dots = stipple_dots(
                    field,
                    mask,
                    density,
                    thickness,
                    layer.stipple_seed(),
                    &self.floor,
                );
                for dot in dots {
                    stamp_capsule(&mut alpha, width, height, dot.center, dot.center, dot.radius, &visible);
                }
            }
        }

        LayerPlane {
            layer,
            width,
            height,
            alpha,
        }
    }
}

fn fill_rows<F>(alpha: &mut [u8], width: u32, coverage: F)
where
    F: Fn(u32, u32) -> u8 + Sync,
{
    alpha
        .par_chunks_mut((width as usize).max(1))
        .enumerate()
        .for_each(|(row, values)| {
            for (col, value) in values.iter_mut().enumerate() {
                *value = coverage(col as u32, row as u32);
            }
        });
}

// Marks every visible pixel whose center lies within `radius` of segment a-b
fn stamp_capsule<V>(
    alpha: &mut [u8],
    width: u32,
    height: u32,
    a: Point,
    b: Point,
    radius: f64,
    visible: &V,
) where
    V: Fn(u32, u32) -> bool,
{
    let radius_squared = radius * radius;
    let min_x = (a.x.min(b.x) - radius).floor().max(0.0) as u32;
    let min_y = (a.y.min(b.y) - radius).floor().max(0.0) as u32;
    let max_x = ((a.x.max(b.x) + radius).ceil().max(0.0) as u32).min(width);
    let max_y = ((a.y.max(b.y) + radius).ceil().max(0.0) as u32).min(height);

    for y in min_y..max_y {
        for x in min_x..max_x {
            let center = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
            if segment_distance_squared(center, a, b) <= radius_squared && visible(x, y) {
                let index = y as usize * width as usize + x as usize;
                if let Some(value) = alpha.get_mut(index) {
                    *value = 255;
                }
            }
        }
    }
}

/// Stack planes in order: first paints, the rest multiply
pub fn composite(planes: &[LayerPlane], width: u32, height: u32, background: Background) -> RgbaImage {
    let mut image = match background {
        Background::Transparent => RgbaImage::new(width, height),
        Background::White => RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255])),
    };

    for (order, plane) in planes.iter().enumerate() {
        let color = plane.layer.color();
        for (pixel, &coverage) in image.pixels_mut().zip(plane.alpha.iter()) {
            if coverage == 0 {
                continue;
            }
            if order == 0 || pixel.0[3] == 0 {
                paint(pixel, color, coverage, background);
            } else {
                multiply(pixel, color, coverage);
            }
        }
    }
    image
}

fn paint(pixel: &mut Rgba<u8>, color: Rgb, coverage: u8, background: Background) {
    let [r, g, b] = color.channels();
    *pixel = match background {
        Background::Transparent => Rgba([r, g, b, coverage]),
        Background::White => {
            let t = f64::from(coverage) / 255.0;
            let over_white = |c: u8| crate::math::lerp(255.0, f64::from(c), t).round() as u8;
            Rgba([over_white(r), over_white(g), over_white(b), 255])
        }
    };
}

fn multiply(pixel: &mut Rgba<u8>, color: Rgb, coverage: u8) {
    let t = f64::from(coverage) / 255.0;
    let Rgba([r, g, b, a]) = *pixel;
    let blend = |dest: u8, ink: u8| {
        let factor = crate::math::lerp(1.0, f64::from(ink) / 255.0, t);
        (f64::from(dest) * factor).round().clamp(0.0, 255.0) as u8
    };
    let [ir, ig, ib] = color.channels();
    *pixel = Rgba([blend(r, ir), blend(g, ig), blend(b, ib), a.max(coverage)]);
}

/// Stroke the frame outline, inside the frame, over everything else
pub fn draw_ring(image: &mut RgbaImage, mask: &FrameMask, width: f64, color: Rgb) {
    if width <= 0.0 {
        return;
    }
    let [r, g, b] = color.channels();
    let half = mask.half();
    let (half_width, half_height) = (mask.half_width(), mask.half_height());
    for (x, y, pixel) in image.enumerate_pixels_mut() {
        let (dx, dy) = mask.offset_of(f64::from(x) + 0.5, f64::from(y) + 0.5);
        let on_ring = if mask.is_circular() {
            let radius = dx.hypot(dy);
            radius <= half && radius >= half - width
        } else {
            dx.abs() >= half_width - width || dy.abs() >= half_height - width
        };
        if on_ring {
            *pixel = Rgba([r, g, b, 255]);
        }
    }
}

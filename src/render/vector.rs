//! Resolution-independent path extraction
//!
//! The tracer re-derives every pattern from the same tone field, mask and
//! screen formulas the compositor uses, but emits geometry instead of pixels.
//! Spiral and line screens become filled band polygons built from paired edge
//! sequences; dots, flow strokes and stipple marks become one primitive each.

use crate::io::configuration::{MIN_VISIBLE_WIDTH, TRACE_STEP};
use crate::io::error::{EngineError, ErrorContext, Result, WithContext, computation_error};
use crate::math::geometry::Point;
use crate::pattern::config::{DotShape, PatternConfig};
use crate::pattern::constraint::FeatureFloor;
use crate::pattern::evaluator::{Screen, ScreenKind, triangle_vertices};
use crate::pattern::flow::{flow_segments, stroke_width};
use crate::pattern::stipple::stipple_dots;
use crate::render::ink::{ColorMode, InkLayer};
use crate::sampling::frame::FrameRaster;
use crate::sampling::mask::FrameMask;
use crate::sampling::tone::{ToneAdjustment, ToneField};
use std::f64::consts::{FRAC_PI_2, TAU};

// Bisection rounds when pulling an edge point back inside the frame
const CLIP_ITERATIONS: u32 = 12;
// Fewest vertices in a clipped circle outline
const MIN_OUTLINE_VERTICES: usize = 16;

/// One drawable shape in frame pixel coordinates
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// Closed filled outline
    Polygon(Vec<Point>),
    /// Filled disc
    Circle {
        /// Disc center
        center: Point,
        /// Disc radius
        radius: f64,
    },
    /// Axis-aligned filled rectangle
    Rect {
        /// Left edge
        x: f64,
        /// Top edge
        y: f64,
        /// Horizontal extent
        width: f64,
        /// Vertical extent
        height: f64,
    },
    /// Stroked segment
    Line {
        /// Segment start
        start: Point,
        /// Segment end
        end: Point,
        /// Stroke width
        width: f64,
    },
}

impl Primitive {
    /// Whether every coordinate and size is finite
    pub fn is_finite(&self) -> bool {
        let finite = |p: &Point| p.x.is_finite() && p.y.is_finite();
        match self {
            Self::Polygon(points) => points.iter().all(finite),
            Self::Circle { center, radius } => finite(center) && radius.is_finite(),
            Self::Rect {
                x,
                y,
                width,
                height,
            } => [x, y, width, height].iter().all(|v| v.is_finite()),
            Self::Line { start, end, width } => finite(start) && finite(end) && width.is_finite(),
        }
    }

    /// Smallest printed dimension of the mark
    ///
    /// Polygons report `None`; their width varies along the band.
    pub fn feature_width(&self) -> Option<f64> {
        match self {
            Self::Polygon(_) => None,
            Self::Circle { radius, .. } => Some(radius * 2.0),
            Self::Rect { width, height, .. } => Some(width.min(*height)),
            Self::Line { width, .. } => Some(*width),
        }
    }
}

/// Primitives of one ink layer
#[derive(Debug, Clone, PartialEq)]
pub struct PathGroup {
    /// Layer the geometry belongs to
    pub layer: InkLayer,
    /// Geometry in drawing order
    pub primitives: Vec<Primitive>,
}

/// Per-layer geometry for a whole frame
#[derive(Debug, Clone, PartialEq)]
pub struct VectorDocument {
    /// Frame width in pixels (viewBox width)
    pub width: u32,
    /// Frame height in pixels (viewBox height)
    pub height: u32,
    /// Physical output width (millimetres)
    pub physical_width_mm: f64,
    /// Physical output height (millimetres)
    pub physical_height_mm: f64,
    /// One group per active layer, in blend order
    pub groups: Vec<PathGroup>,
}

impl VectorDocument {
    /// Total primitive count across layers
    pub fn primitive_count(&self) -> usize {
        self.groups.iter().map(|g| g.primitives.len()).sum()
    }

    /// Whether no layer carries any geometry
    pub fn is_empty(&self) -> bool {
        self.primitive_count() == 0
    }

    /// Whether every primitive is finite
    pub fn is_finite(&self) -> bool {
        self.groups
            .iter()
            .flat_map(|g| g.primitives.iter())
            .all(Primitive::is_finite)
    }
}

/// Width in pixels of a spiral or line band at a tone
///
/// The phase window the raster test paints, with any feature floor already
/// folded into the duty, so both outputs agree on every band.
pub fn band_width(screen: &Screen, tone: f64) -> f64 {
    screen.feature_width(tone)
}

/// Path extractor for one resolved configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VectorTracer {
    /// Pattern to trace
    pub pattern: PatternConfig,
    /// Tone adjustment before pattern decisions
    pub adjustment: ToneAdjustment,
    /// Mono or process colour
    pub color: ColorMode,
    /// Feature-size floor resolved for this frame
    pub floor: FeatureFloor,
}

impl VectorTracer {
    /// Trace every active layer
    ///
    /// # Errors
    ///
    /// Returns `Unsupported` for photo passthrough, and a computation error
    /// when frame and mask disagree or a layer has non-finite coordinates
    pub fn trace(
        &self,
        frame: &FrameRaster,
        mask: &FrameMask,
        physical_width_mm: f64,
    ) -> Result<VectorDocument> {
        if matches!(self.pattern, PatternConfig::PhotoPassthrough) {
            return Err(EngineError::Unsupported {
                output: "vector paths",
                reason: "photo passthrough is continuous tone and has no geometry".into(),
            });
        }
        if frame.width() != mask.width() || frame.height() != mask.height() {
            return Err(computation_error(
                "trace",
                &format!(
                    "frame {}x{} does not match mask {}x{}",
                    frame.width(),
                    frame.height(),
                    mask.width(),
                    mask.height()
                ),
            ));
        }

        let groups = self
            .color
            .layers()
            .into_iter()
            .map(|layer| {
                let field = frame.tone_field(layer.channel(), &self.adjustment);
                let group = PathGroup {
                    layer,
                    primitives: self.trace_layer(&field, mask, layer),
                };
                if group.primitives.iter().all(Primitive::is_finite) {
                    Ok(group)
                } else {
                    Err(computation_error("trace", &"non-finite coordinate")).with_context(
                        ErrorContext {
                            operation: None,
                            layer: Some(layer.name()),
                        },
                    )
                }
            })
            .collect::<Result<Vec<_>>>()?;

        let document = VectorDocument {
            width: mask.width(),
            height: mask.height(),
            physical_width_mm,
            physical_height_mm: physical_width_mm * f64::from(mask.height())
                / f64::from(mask.width().max(1)),
            groups,
        };
        log::debug!(
            "traced {} primitive(s) across {} layer(s)",
            document.primitive_count(),
            document.groups.len()
        );
        Ok(document)
    }

    /// Geometry for one layer
    pub fn trace_layer(&self, field: &ToneField, mask: &FrameMask, layer: InkLayer) -> Vec<Primitive> {
        match self.pattern {
            PatternConfig::Spiral { .. } | PatternConfig::Lines { .. } | PatternConfig::Dots { .. } => {
                let Some(screen) =
                    Screen::new(&self.pattern, mask.half(), layer.screen_angle(), self.floor)
                else {
                    return Vec::new();
                };
                let tracer = ScreenTracer {
                    screen,
                    field,
                    mask,
                };
                match screen.kind() {
                    ScreenKind::Spiral => tracer.spiral(),
                    ScreenKind::Lines => tracer.lines(),
                    ScreenKind::Dots(shape) => tracer.dots(shape),
                }
            }
            PatternConfig::Flow { density, thickness } => {
                let width = stroke_width(&self.floor);
                flow_segments(field, mask, density, thickness)
                    .into_iter()
                    .map(|segment| {
                        let center = segment.center();
                        Primitive::Line {
                            start: clip_to_mask(mask, center, segment.start),
                            end: clip_to_mask(mask, center, segment.end),
                            width,
                        }
                    })
                    .collect()
            }
            PatternConfig::Stipple { density, thickness } => stipple_dots(
                field,
                mask,
                density,
                thickness,
                layer.stipple_seed(),
                &self.floor,
            )
            .into_iter()
            .map(|dot| Primitive::Circle {
                center: dot.center,
                radius: dot.radius,
            })
            .collect(),
            PatternConfig::PhotoPassthrough => Vec::new(),
        }
    }
}

// Pull `edge` toward `anchor` until it lies inside the frame; `anchor` must be inside
fn clip_to_mask(mask: &FrameMask, anchor: Point, edge: Point) -> Point {
    if mask.contains_point(edge.x, edge.y) {
        return edge;
    }
    let (mut inside, mut outside) = (0.0, 1.0);
    for _ in 0..CLIP_ITERATIONS {
        let t = (inside + outside) / 2.0;
        let point = Point::new(
            crate::math::lerp(anchor.x, edge.x, t),
            crate::math::lerp(anchor.y, edge.y, t),
        );
        if mask.contains_point(point.x, point.y) {
            inside = t;
        } else {
            outside = t;
        }
    }
    Point::new(
        crate::math::lerp(anchor.x, edge.x, inside),
        crate::math::lerp(anchor.y, edge.y, inside),
    )
}

// Accumulates paired band edges and closes them into polygons
#[derive(Default)]
struct BandBuilder {
    outer: Vec<Point>,
    inner: Vec<Point>,
    bands: Vec<Primitive>,
}

impl BandBuilder {
    fn push(&mut self, outer: Point, inner: Point) {
        self.outer.push(outer);
        self.inner.push(inner);
    }

    fn close(&mut self) {
        if self.outer.len() >= 2 {
            let mut outline: Vec<Point> = self.outer.drain(..).collect();
            outline.extend(self.inner.drain(..).rev());
            self.bands.push(Primitive::Polygon(outline));
        }
        self.outer.clear();
        self.inner.clear();
    }

    fn finish(mut self) -> Vec<Primitive> {
        self.close();
        self.bands
    }
}

struct ScreenTracer<'a> {
    screen: Screen,
    field: &'a ToneField,
    mask: &'a FrameMask,
}

impl ScreenTracer<'_> {
    // Radius of the smallest circle around the frame center covering the frame
    fn reach(&self) -> f64 {
        self.mask.half_width().hypot(self.mask.half_height())
    }

    // Edge pair for a band centered at `center` (frame offset) across unit `normal`
    //
    // `inner_reach` caps how far the inner edge may extend, keeping spiral
    // edges from crossing the frame center.
    fn edges(&self, center: (f64, f64), normal: (f64, f64), inner_reach: f64) -> Option<(Point, Point)> {
        let (dx, dy) = center;
        if !self.mask.contains(dx, dy) {
            return None;
        }
        let (x, y) = self.mask.position_of(dx, dy);
        if self.field.sample_transparent(x, y) {
            return None;
        }
        let width = band_width(&self.screen, self.field.sample(x, y));
        if width < MIN_VISIBLE_WIDTH {
            return None;
        }
        let half = width / 2.0;
        let inner_half = half.min(inner_reach);
        let anchor = Point::new(x, y);
        let outer = Point::new(x + normal.0 * half, y + normal.1 * half);
        let inner = Point::new(x - normal.0 * inner_half, y - normal.1 * inner_half);
        Some((
            clip_to_mask(self.mask, anchor, outer),
            clip_to_mask(self.mask, anchor, inner),
        ))
    }

    // Follows the wave minimum `phase = 3π/2 (mod 2π)` outward from the center
    fn spiral(&self) -> Vec<Primitive> {
        let scale = self.screen.half() / (TAU * self.screen.density());
        let limit = self.reach() / scale;
        let start_angle = 3.0f64.mul_add(FRAC_PI_2, -self.screen.rotation().radians());
        let mut builder = BandBuilder::default();
        let mut u = 0.0;
        while u <= limit {
            let radius = scale * u;
            let (sin, cos) = (start_angle - u).sin_cos();
            match self.edges((radius * cos, radius * sin), (cos, sin), radius) {
                Some((outer, inner)) => builder.push(outer, inner),
                None => builder.close(),
            }
            u += TRACE_STEP / scale.hypot(radius);
        }
        builder.finish()
    }

    // One band per wave minimum, marched along the rotated x axis
    fn lines(&self) -> Vec<Primitive> {
        let spacing = self.screen.spacing();
        let reach = self.reach();
        let rotation = self.screen.rotation();
        let normal = rotation.invert(0.0, 1.0);
        let first = ((-reach / spacing) - 0.75).floor() as i64;
        let last = ((reach / spacing) - 0.75).ceil() as i64;
        let mut bands = Vec::new();
        for band in first..=last {
            let ry = (band as f64 + 0.75) * spacing;
            let mut builder = BandBuilder::default();
            let mut rx = -reach;
            while rx <= reach {
                match self.edges(rotation.invert(rx, ry), normal, f64::INFINITY) {
                    Some((outer, inner)) => builder.push(outer, inner),
                    None => builder.close(),
                }
                rx += TRACE_STEP;
            }
            bands.extend(builder.finish());
        }
        bands
    }

    // One primitive per grid cell whose dot reaches into the frame
    //
    // Dots lying wholly inside keep their exact shape. Dots crossing the outer
    // edge or the center hole become densely sampled outlines pulled onto the
    // mask, matching the per-pixel clip of the raster.
    fn dots(&self, shape: DotShape) -> Vec<Primitive> {
        let grid = self.screen.spacing();
        let cell_half = grid / 2.0;
        let rotation = self.screen.rotation();
        let last = (self.reach() / grid).ceil() as i64 + 1;
        let axis_aligned = {
            let quarter_turns = rotation.radians() / FRAC_PI_2;
            (quarter_turns - quarter_turns.round()).abs() < 1e-9
        };
        let to_frame = |rx: f64, ry: f64| {
            let (dx, dy) = rotation.invert(rx, ry);
            let (x, y) = self.mask.position_of(dx, dy);
            Point::new(x, y)
        };

        let mut primitives = Vec::new();
        for j in -last..last {
            for i in -last..last {
                let cx = (i as f64 + 0.5) * grid;
                let cy = (j as f64 + 0.5) * grid;
                let center = to_frame(cx, cy);
                // Cells centered off the frame take the tone of the nearest framed point
                let (sx, sy) = self.mask.nearest_inside(center.x, center.y);
                if self.field.sample_transparent(sx, sy) {
                    continue;
                }
                let extent = self.screen.dot_extent(self.field.sample(sx, sy));
                if extent * grid < MIN_VISIBLE_WIDTH {
                    continue;
                }
                let size = extent * cell_half;
                let corners: Vec<(f64, f64)> = match shape {
                    DotShape::Circle => Vec::new(),
                    DotShape::Square => {
                        vec![(-size, -size), (size, -size), (size, size), (-size, size)]
                    }
                    DotShape::Diamond => vec![(0.0, -size), (size, 0.0), (0.0, size), (-size, 0.0)],
                    DotShape::Triangle => triangle_vertices(extent)
                        .into_iter()
                        .map(|(ox, oy)| (ox * cell_half, oy * cell_half))
                        .collect(),
                };
                let offsets = if corners.is_empty() {
                    circle_outline(size)
                } else {
                    subdivide(&corners)
                };
                let outline: Vec<Point> = offsets
                    .into_iter()
                    .map(|(ox, oy)| to_frame(cx + ox, cy + oy))
                    .collect();

                let (dx, dy) = rotation.invert(cx, cy);
                let whole = if matches!(shape, DotShape::Circle) {
                    self.mask.contains_disc(dx, dy, size)
                } else {
                    outline.iter().all(|p| self.mask.contains_point(p.x, p.y))
                };
                if whole {
                    primitives.push(match shape {
                        DotShape::Circle => Primitive::Circle {
                            center,
                            radius: size,
                        },
                        DotShape::Square if axis_aligned => Primitive::Rect {
                            x: center.x - size,
                            y: center.y - size,
                            width: size * 2.0,
                            height: size * 2.0,
                        },
                        _ => Primitive::Polygon(
                            corners
                                .into_iter()
                                .map(|(ox, oy)| to_frame(cx + ox, cy + oy))
                                .collect(),
                        ),
                    });
                    continue;
                }
                let reaches_in = self.mask.contains(dx, dy)
                    || outline.iter().any(|p| self.mask.contains_point(p.x, p.y));
                if reaches_in {
                    primitives.push(Primitive::Polygon(
                        outline
                            .into_iter()
                            .map(|p| {
                                let (x, y) = self.mask.nearest_inside(p.x, p.y);
                                Point::new(x, y)
                            })
                            .collect(),
                    ));
                }
            }
        }
        primitives
    }
}

// Closed circle outline with vertices at most `TRACE_STEP` apart
fn circle_outline(radius: f64) -> Vec<(f64, f64)> {
    let count = ((TAU * radius / TRACE_STEP).ceil() as usize).max(MIN_OUTLINE_VERTICES);
    (0..count)
        .map(|k| {
            let (sin, cos) = (TAU * k as f64 / count as f64).sin_cos();
            (radius * cos, radius * sin)
        })
        .collect()
}

// Polygon outline with extra vertices so no edge is longer than `TRACE_STEP`
fn subdivide(corners: &[(f64, f64)]) -> Vec<(f64, f64)> {
    let mut outline = Vec::new();
    for (index, &(x0, y0)) in corners.iter().enumerate() {
        let (x1, y1) = corners
            .get((index + 1) % corners.len())
            .copied()
            .unwrap_or((x0, y0));
        let pieces = (((x1 - x0).hypot(y1 - y0) / TRACE_STEP).ceil() as usize).max(1);
        for piece in 0..pieces {
            let t = piece as f64 / pieces as f64;
            outline.push((crate::math::lerp(x0, x1, t), crate::math::lerp(y0, y1, t)));
        }
    }
    outline
}

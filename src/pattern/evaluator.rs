//! Screen modulation for spiral, line and dot patterns
//!
//! Each screen answers two questions from one set of formulas: whether a pixel
//! is ink (raster form) and how wide the local feature is (continuous form used
//! by the vector tracer and the feature-size floor).

use crate::io::configuration::{
    MIN_DUTY, SPIRAL_CONNECTIVITY_DUTY, SPIRAL_CONNECTIVITY_MIN_THICKNESS,
};
use crate::math::band_half_phase;
use crate::math::geometry::Rotation;
use crate::pattern::config::{DotShape, PatternConfig};
use crate::pattern::constraint::FeatureFloor;
use std::f64::consts::{FRAC_1_SQRT_2, PI, TAU};

const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// Screen family evaluated per pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenKind {
    /// Archimedean spiral
    Spiral,
    /// Parallel lines
    Lines,
    /// Dot grid with the given footprint
    Dots(DotShape),
}

/// A periodic screen resolved for one ink layer and frame size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Screen {
    kind: ScreenKind,
    density: f64,
    thickness: f64,
    half: f64,
    rotation: Rotation,
    floor: FeatureFloor,
}

impl Screen {
    /// Resolve a screen; `None` for modes that aren't periodic screens
    ///
    /// `layer_angle` (degrees) is added to the configured rotation.
    pub fn new(
        config: &PatternConfig,
        half: f64,
        layer_angle: f64,
        floor: FeatureFloor,
    ) -> Option<Self> {
        let kind = match *config {
            PatternConfig::Spiral { .. } => ScreenKind::Spiral,
            PatternConfig::Lines { .. } => ScreenKind::Lines,
            PatternConfig::Dots { shape, .. } => ScreenKind::Dots(shape),
            _ => return None,
        };
        Some(Self {
            kind,
            density: config.density(),
            thickness: config.thickness(),
            half: half.max(f64::MIN_POSITIVE),
            rotation: Rotation::from_degrees(config.rotation() + layer_angle),
            floor,
        })
    }

    /// Screen family
    pub const fn kind(&self) -> ScreenKind {
        self.kind
    }

    /// Screen rotation including the layer angle
    pub const fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Half-extent the screen is scaled against
    pub const fn half(&self) -> f64 {
        self.half
    }

    /// Density floored at one
    pub const fn density(&self) -> f64 {
        self.density
    }

    /// Length of one modulation period in pixels
    ///
    /// Spiral: radial distance between turns. Lines: distance between line
    /// centers. Dots: cell size.
    pub fn spacing(&self) -> f64 {
        match self.kind {
            ScreenKind::Spiral => self.half / self.density,
            ScreenKind::Lines | ScreenKind::Dots(_) => self.half * 2.0 / self.density,
        }
    }

    /// Band duty for spiral and line screens
    pub fn duty(&self, tone: f64) -> f64 {
        let raw = (1.0 - tone) * self.thickness * 2.0;
        if raw <= MIN_DUTY {
            return 0.0;
        }
        if self.floor.is_constrained() {
            return self.floor.apply_duty(raw, self.spacing());
        }
        if self.kind == ScreenKind::Spiral && self.thickness > SPIRAL_CONNECTIVITY_MIN_THICKNESS {
            return raw.max(SPIRAL_CONNECTIVITY_DUTY);
        }
        raw
    }

    /// Dome threshold for dot screens
    ///
    /// With the floor active the cutoff is capped so any dot that appears
    /// spans at least the minimum feature width across its narrowest side.
    pub fn cutoff(&self, tone: f64) -> f64 {
        let cutoff = tone / self.thickness;
        if cutoff >= 1.0 || !self.floor.is_constrained() {
            return cutoff;
        }
        let ScreenKind::Dots(shape) = self.kind else {
            return cutoff;
        };
        cutoff.min(1.0 - self.floor.min_fraction(self.spacing()) / narrowest_width(shape))
    }

    /// Dot extent as a fraction of the cell (0 = no dot, 1 = full cell)
    pub fn dot_extent(&self, tone: f64) -> f64 {
        (1.0 - self.cutoff(tone)).clamp(0.0, 1.0)
    }

    /// Width of the local feature in pixels
    ///
    /// Bands measure the phase window the raster test paints; dots measure
    /// their narrowest side.
    pub fn feature_width(&self, tone: f64) -> f64 {
        match self.kind {
            ScreenKind::Spiral | ScreenKind::Lines => {
                self.spacing() * band_half_phase(self.duty(tone)) / PI
            }
            ScreenKind::Dots(shape) => {
                self.dot_extent(tone) * self.spacing() * narrowest_width(shape)
            }
        }
    }

    /// Wave phase of spiral and line screens at a center-relative offset
    pub fn phase(&self, dx: f64, dy: f64) -> f64 {
        match self.kind {
            ScreenKind::Spiral => {
                let radius = dx.hypot(dy);
                let theta = dy.atan2(dx) + self.rotation.radians();
                (radius / self.half).mul_add(self.density * TAU, theta)
            }
            ScreenKind::Lines | ScreenKind::Dots(_) => {
                let (_, ry) = self.rotation.apply(dx, dy);
                ry / self.half * self.density * PI
            }
        }
    }

    /// Dome height of the dot covering an offset
    ///
    /// In `(0, 1]` inside the footprint of a full-size dot, 0 outside.
    pub fn dome(&self, dx: f64, dy: f64) -> f64 {
        let ScreenKind::Dots(shape) = self.kind else {
            return 0.0;
        };
        let grid = self.spacing();
        let cell_half = grid / 2.0;
        let (rx, ry) = self.rotation.apply(dx, dy);
        let nx = (rx.rem_euclid(grid) - cell_half) / cell_half;
        let ny = (ry.rem_euclid(grid) - cell_half) / cell_half;
        (1.0 - dot_distance(shape, nx, ny)).max(0.0)
    }

    /// Raster decision at a center-relative offset
    pub fn is_foreground(&self, dx: f64, dy: f64, tone: f64) -> bool {
        match self.kind {
            ScreenKind::Spiral | ScreenKind::Lines => {
                let duty = self.duty(tone);
                duty > 0.0 && (self.phase(dx, dy).sin() + 1.0) / 2.0 < duty
            }
            ScreenKind::Dots(_) => self.dome(dx, dy) > self.cutoff(tone),
        }
    }
}

/// Normalised distance from a cell center for a dot footprint
///
/// `nx`, `ny` are in `[-1, 1]` across the cell; 1 is the edge of a full dot.
pub fn dot_distance(shape: DotShape, nx: f64, ny: f64) -> f64 {
    match shape {
        DotShape::Circle => nx.hypot(ny),
        DotShape::Square => nx.abs().max(ny.abs()),
        DotShape::Diamond => nx.abs() + ny.abs(),
        // Apex up; image y grows downward
        DotShape::Triangle => (2.0 * ny).max(SQRT_3.mul_add(nx.abs(), -ny)),
    }
}

/// Narrowest width of a dot as a fraction of its extent across the cell
///
/// Circles and squares span the full extent; a diamond's side-to-side width is
/// its diagonal over √2 and a triangle's height is three quarters of its span.
pub const fn narrowest_width(shape: DotShape) -> f64 {
    match shape {
        DotShape::Circle | DotShape::Square => 1.0,
        DotShape::Diamond => FRAC_1_SQRT_2,
        DotShape::Triangle => 0.75,
    }
}

/// Triangle vertices for a dot of normalised extent `extent`
///
/// Returned in cell-normalised units: apex then the two base corners.
pub fn triangle_vertices(extent: f64) -> [(f64, f64); 3] {
    let base_half = SQRT_3 / 2.0 * extent;
    [
        (0.0, -extent),
        (base_half, extent / 2.0),
        (-base_half, extent / 2.0),
    ]
}

//! Height-field mesh generation for lithophanes and relief prints
//!
//! A regular vertex grid samples the depth raster; every grid cell whose four
//! corners lie inside the frame becomes two upward-facing triangles. Cells
//! straddling the frame edge or the center hole are dropped whole.

use crate::io::configuration::{
    DEFAULT_MAX_DEPTH_MM, DEFAULT_MESH_RESOLUTION, DEFAULT_MIN_DEPTH_MM, DEFAULT_PRINT_WIDTH_MM,
    MAX_MESH_GRID,
};
use crate::io::error::{Result, computation_error, invalid_parameter};
use crate::sampling::mask::FrameMask;
use image::RgbaImage;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Physical lithophane settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LithophaneParams {
    /// Thickness where the image is white (millimetres)
    pub min_depth_mm: f64,
    /// Thickness where the image is black (millimetres)
    pub max_depth_mm: f64,
    /// Physical width of the print (millimetres)
    pub physical_width_mm: f64,
    /// Fraction of the raster resolution used for the vertex grid
    pub resolution: f64,
}

impl Default for LithophaneParams {
    fn default() -> Self {
        Self {
            min_depth_mm: DEFAULT_MIN_DEPTH_MM,
            max_depth_mm: DEFAULT_MAX_DEPTH_MM,
            physical_width_mm: DEFAULT_PRINT_WIDTH_MM,
            resolution: DEFAULT_MESH_RESOLUTION,
        }
    }
}

impl LithophaneParams {
    /// Reject inverted depth ranges, non-positive sizes and out-of-range resolution
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` naming the first offending field
    pub fn validate(&self) -> Result<()> {
        if !self.min_depth_mm.is_finite() || self.min_depth_mm < 0.0 {
            return Err(invalid_parameter(
                "min_depth_mm",
                &self.min_depth_mm,
                &"must be a non-negative length",
            ));
        }
        if !self.max_depth_mm.is_finite() || self.max_depth_mm <= self.min_depth_mm {
            return Err(invalid_parameter(
                "max_depth_mm",
                &self.max_depth_mm,
                &"must exceed min_depth_mm",
            ));
        }
        if !self.physical_width_mm.is_finite() || self.physical_width_mm <= 0.0 {
            return Err(invalid_parameter(
                "physical_width_mm",
                &self.physical_width_mm,
                &"must be a positive length",
            ));
        }
        if !self.resolution.is_finite() || self.resolution <= 0.0 || self.resolution > 1.0 {
            return Err(invalid_parameter(
                "resolution",
                &self.resolution,
                &"must be within (0, 1]",
            ));
        }
        Ok(())
    }

    /// Thickness for a normalised gray level
    pub fn depth_for(&self, gray: f64) -> f64 {
        (1.0 - gray).mul_add(self.max_depth_mm - self.min_depth_mm, self.min_depth_mm)
    }
}

/// Per-pixel thickness in millimetres, `[row, col]`
///
/// Gray is the channel mean seen over white paper, so partially covered ink
/// reads lighter. Fully transparent pixels are through-holes.
pub fn depth_field(image: &RgbaImage, params: &LithophaneParams) -> Array2<f64> {
    let (width, height) = (image.width() as usize, image.height() as usize);
    Array2::from_shape_fn((height, width), |(y, x)| {
        let [r, g, b, a] = image
            .get_pixel_checked(x as u32, y as u32)
            .map_or([0, 0, 0, 0], |p| p.0);
        if a == 0 {
            return 0.0;
        }
        let mean = (f64::from(r) + f64::from(g) + f64::from(b)) / 3.0 / 255.0;
        let gray = crate::math::lerp(1.0, mean, f64::from(a) / 255.0);
        params.depth_for(gray)
    })
}

/// One facet with its flat normal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// Unit facet normal
    pub normal: [f32; 3],
    /// Counter-clockwise vertices seen from above (millimetres)
    pub vertices: [[f32; 3]; 3],
}

impl Triangle {
    fn new(vertices: [[f64; 3]; 3]) -> Self {
        let [a, b, c] = vertices;
        let u = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
        let v = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
        let n = [
            u[1].mul_add(v[2], -(u[2] * v[1])),
            u[2].mul_add(v[0], -(u[0] * v[2])),
            u[0].mul_add(v[1], -(u[1] * v[0])),
        ];
        let length = (n[0].mul_add(n[0], n[1].mul_add(n[1], n[2] * n[2]))).sqrt();
        let normal = if length > f64::EPSILON {
            [n[0] / length, n[1] / length, n[2] / length]
        } else {
            [0.0, 0.0, 1.0]
        };
        let narrow = |p: [f64; 3]| [p[0] as f32, p[1] as f32, p[2] as f32];
        Self {
            normal: narrow(normal),
            vertices: [narrow(a), narrow(b), narrow(c)],
        }
    }
}

/// Triangulated height field
#[derive(Debug, Clone, PartialEq)]
pub struct HeightfieldMesh {
    triangles: Vec<Triangle>,
    step: u32,
    columns: u32,
    rows: u32,
    mm_per_pixel: f64,
}

impl HeightfieldMesh {
    /// All facets
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Number of facets
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Number of emitted grid cells
    pub fn cell_count(&self) -> usize {
        self.triangles.len() / 2
    }

    /// Pixels between grid vertices
    pub const fn step(&self) -> u32 {
        self.step
    }

    /// Grid cells along each axis (columns, rows), before clipping
    pub const fn grid(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Millimetres per source pixel
    pub const fn mm_per_pixel(&self) -> f64 {
        self.mm_per_pixel
    }
}

/// Height-field builder for one set of lithophane parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshBuilder {
    params: LithophaneParams,
}

impl MeshBuilder {
    /// Builder for the given parameters
    pub const fn new(params: LithophaneParams) -> Self {
        Self { params }
    }

    /// Pixels between grid vertices for a raster with the given longer side
    pub fn grid_step(&self, longer_side: u32) -> u32 {
        let longer = f64::from(longer_side.max(1));
        let cells = (longer * self.params.resolution)
            .round()
            .clamp(1.0, f64::from(MAX_MESH_GRID));
        ((longer / cells).ceil() as u32).max(1)
    }

    /// Triangulate a depth raster clipped to the frame
    ///
    /// # Errors
    ///
    /// Returns a computation error when the raster and mask sizes disagree or
    /// a vertex comes out non-finite
    pub fn build(&self, image: &RgbaImage, mask: &FrameMask) -> Result<HeightfieldMesh> {
        let (width, height) = (image.width(), image.height());
        if width != mask.width() || height != mask.height() {
            return Err(computation_error(
                "mesh",
                &format!(
                    "depth raster {width}x{height} does not match frame {}x{}",
                    mask.width(),
                    mask.height()
                ),
            ));
        }
        let depth = depth_field(image, &self.params);
        let step = self.grid_step(width.max(height));
        let columns = width / step;
        let rows = height / step;
        let mm_per_pixel = self.params.physical_width_mm / f64::from(width.max(1));

        let vertex = |x: u32, y: u32| -> [f64; 3] {
            let sample_x = x.min(width.saturating_sub(1)) as usize;
            let sample_y = y.min(height.saturating_sub(1)) as usize;
            let z = depth.get((sample_y, sample_x)).copied().unwrap_or(0.0);
            let (dx, dy) = mask.offset_of(f64::from(x), f64::from(y));
            [dx * mm_per_pixel, -dy * mm_per_pixel, z]
        };

        let mut triangles = Vec::new();
        for row in 0..rows {
            for col in 0..columns {
                let (x0, y0) = (col * step, row * step);
                let (x1, y1) = (x0 + step, y0 + step);
                let corners = [(x0, y0), (x1, y0), (x1, y1), (x0, y1)];
                if !corners
                    .iter()
                    .all(|&(x, y)| mask.contains_pixel(x, y))
                {
                    continue;
                }
                let top_left = vertex(x0, y0);
                let top_right = vertex(x1, y0);
                let bottom_right = vertex(x1, y1);
                let bottom_left = vertex(x0, y1);
                triangles.push(Triangle::new([top_left, bottom_left, bottom_right]));
                triangles.push(Triangle::new([top_left, bottom_right, top_right]));
            }
        }

        let finite = triangles
            .iter()
            .flat_map(|t| t.vertices.iter().flatten())
            .all(|v| v.is_finite());
        if !finite {
            return Err(computation_error("mesh", &"non-finite vertex"));
        }

        log::debug!(
            "mesh: {} triangles on a {columns}x{rows} grid (step {step}px)",
            triangles.len()
        );
        Ok(HeightfieldMesh {
            triangles,
            step,
            columns,
            rows,
            mm_per_pixel,
        })
    }
}

//! Engine constants, valid parameter ranges and runtime configuration defaults

// Pattern parameter ranges
/// Default number of rings, lines or cells across the frame
pub const DEFAULT_DENSITY: f64 = 60.0;
/// Lowest accepted density (avoids division by zero in spacing)
pub const MIN_DENSITY: f64 = 1.0;
/// Highest accepted density
pub const MAX_DENSITY: f64 = 400.0;
/// Default stroke thickness multiplier
pub const DEFAULT_THICKNESS: f64 = 0.5;
/// Highest accepted thickness multiplier (lower bound is exclusive zero)
pub const MAX_THICKNESS: f64 = 2.0;

// Frame and view ranges
/// Largest center hole, as a fraction of the frame half-extent
pub const MAX_CENTER_HOLE: f64 = 0.8;
/// Smallest accepted view zoom
pub const MIN_VIEW_SCALE: f64 = 0.1;
/// Largest accepted view zoom
pub const MAX_VIEW_SCALE: f64 = 10.0;
/// Pan value that centers the source in the frame
pub const CENTERED_PAN: f64 = 50.0;
/// Largest pan value (pan is a percentage)
pub const MAX_PAN: f64 = 100.0;
/// Largest custom aspect component
pub const MAX_ASPECT_COMPONENT: f64 = 100.0;

// Tone adjustment ranges
/// Largest accepted contrast multiplier
pub const MAX_CONTRAST: f64 = 10.0;
/// Largest brightness offset magnitude (0-255 scale)
pub const MAX_BRIGHTNESS: f64 = 255.0;
/// Contrast pivot on the 0-255 scale
pub const MID_GRAY: f64 = 128.0;

// Resolution caps
/// Longest side of interactive previews
pub const PREVIEW_MAX_DIMENSION: u32 = 800;
/// Longest side accepted at import; larger sources are downscaled
pub const MAX_IMPORT_DIMENSION: u32 = 4096;
/// Longest side of any rendered frame
pub const MAX_FRAME_DIMENSION: u32 = 8192;

// Pattern tuning
/// Band duty treated as no ink; absorbs luma rounding on pure white
pub const MIN_DUTY: f64 = 1e-9;
/// Duty floor keeping spiral strokes connected when unconstrained
pub const SPIRAL_CONNECTIVITY_DUTY: f64 = 0.05;
/// Thickness above which the spiral connectivity floor applies
pub const SPIRAL_CONNECTIVITY_MIN_THICKNESS: f64 = 0.1;
/// Tone at or above which flow skips a grid point
pub const FLOW_SKIP_TONE: f64 = 0.95;
/// Flow segment length in grid cells per unit thickness
pub const FLOW_LENGTH_FACTOR: f64 = 3.0;
/// Stipple candidates per squared density unit
pub const STIPPLE_SAMPLES_PER_DENSITY_SQUARED: f64 = 8.0;
/// Hard cap on stipple candidates per layer
pub const MAX_STIPPLE_SAMPLES: usize = 400_000;
/// Stipple dot radius per unit thickness, as a fraction of the grid spacing
pub const STIPPLE_RADIUS_FACTOR: f64 = 0.25;
/// Smallest stipple dot radius in pixels
pub const MIN_STIPPLE_RADIUS: f64 = 0.5;

// Vector tracing
/// Narrowest band or dot emitted into a vector document (pixels)
pub const MIN_VISIBLE_WIDTH: f64 = 0.5;
/// Arc length between samples along traced bands (pixels)
pub const TRACE_STEP: f64 = 1.0;
/// Decimal places written for vector coordinates
pub const VECTOR_PRECISION: usize = 2;

// Fabrication defaults
/// Default physical width of the output (millimetres)
pub const DEFAULT_PRINT_WIDTH_MM: f64 = 200.0;
/// Default thinnest printable feature (millimetres)
pub const DEFAULT_MIN_THICKNESS_MM: f64 = 0.32;
/// Default lithophane thickness for white (millimetres)
pub const DEFAULT_MIN_DEPTH_MM: f64 = 0.8;
/// Default lithophane thickness for black (millimetres)
pub const DEFAULT_MAX_DEPTH_MM: f64 = 3.0;
/// Default fraction of the raster resolution used for the mesh grid
pub const DEFAULT_MESH_RESOLUTION: f64 = 0.5;
/// Largest number of mesh cells along one axis
pub const MAX_MESH_GRID: u32 = 512;

// Lithophane preview
/// Light attenuation per normalised thickness unit
pub const LITHO_ATTENUATION: f64 = 2.2;
/// Strength of the Sobel relief term
pub const LITHO_RELIEF_GAIN: f64 = 0.35;

// Frame ring
/// Default frame ring width in pixels (0 disables the ring)
pub const DEFAULT_BORDER_WIDTH: f64 = 0.0;
/// Widest accepted frame ring in pixels
pub const MAX_BORDER_WIDTH: f64 = 200.0;

// Batch exports
/// Name given to export worker threads
pub const EXPORT_THREAD_NAME: &str = "export";

// Output settings
/// Suffix added to output filenames
pub const OUTPUT_SUFFIX: &str = "_pattern";
/// Spinner refresh interval for export progress (milliseconds)
pub const PROGRESS_TICK_MS: u64 = 80;

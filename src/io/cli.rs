//! Command-line interface: settings assembly and export orchestration

use crate::engine::jobs::{ExportQueue, ExportRequest};
use crate::engine::snapshot::{RenderSettings, Snapshot};
use crate::io::configuration::OUTPUT_SUFFIX;
use crate::io::error::{Result, invalid_parameter, io_error};
use crate::io::image::{load_source, write_artifact};
use crate::io::progress::ProgressManager;
use crate::pattern::config::{DotShape, ModeSettings, PatternConfig, PatternMode};
use crate::render::compositor::Background;
use crate::render::ink::{CmykPlates, ColorMode, Rgb};
use crate::sampling::mask::FrameShape;
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Frame outline selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FrameKind {
    /// Disc
    Circle,
    /// Square
    Square,
    /// Rectangle with the ratio given by `--aspect`
    Custom,
}

#[derive(Parser, Debug)]
#[command(name = "halftone-forge")]
#[command(
    author,
    version,
    about = "Turn a photo into spiral, line, dot, flow or stipple artwork with SVG and STL export"
)]
/// Command-line arguments for the pattern engine
// Rendering exposes many independent switches
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Source image
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// JSON settings file applied before any flag
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write the resolved settings as JSON
    #[arg(long, value_name = "FILE")]
    pub save_config: Option<PathBuf>,

    /// Pattern mode
    #[arg(short, long, value_enum)]
    pub mode: Option<PatternMode>,

    /// Rings, lines or cells across the frame
    #[arg(short, long)]
    pub density: Option<f64>,

    /// Stroke weight multiplier in (0, 2]
    #[arg(short, long)]
    pub thickness: Option<f64>,

    /// Screen rotation in degrees
    #[arg(short, long, allow_negative_numbers = true)]
    pub rotation: Option<f64>,

    /// Dot footprint for the dots mode
    #[arg(long, value_enum)]
    pub dot_shape: Option<DotShape>,

    /// Frame outline
    #[arg(short, long, value_enum)]
    pub frame: Option<FrameKind>,

    /// Custom frame ratio as W:H
    #[arg(long, value_parser = parse_aspect)]
    pub aspect: Option<(f64, f64)>,

    /// Center hole as a fraction of the frame radius
    #[arg(long)]
    pub hole: Option<f64>,

    /// Source zoom on top of cover fitting
    #[arg(long)]
    pub scale: Option<f64>,

    /// Horizontal pan percentage (50 is centered)
    #[arg(long)]
    pub pan_x: Option<f64>,

    /// Vertical pan percentage (50 is centered)
    #[arg(long)]
    pub pan_y: Option<f64>,

    /// Contrast multiplier
    #[arg(long)]
    pub contrast: Option<f64>,

    /// Brightness offset on the 0-255 scale
    #[arg(long, allow_negative_numbers = true)]
    pub brightness: Option<f64>,

    /// Swap light and dark
    #[arg(short, long)]
    pub invert: bool,

    /// Print CMYK plates instead of a single colour
    #[arg(long)]
    pub cmyk: bool,

    /// Active CMYK plates, e.g. `cmyk` or `ck`
    #[arg(long, value_parser = parse_plates)]
    pub plates: Option<CmykPlates>,

    /// Mono ink colour as #rrggbb
    #[arg(long)]
    pub color: Option<Rgb>,

    /// Frame ring width in pixels
    #[arg(long)]
    pub border: Option<f64>,

    /// Paint uninked pixels white instead of transparent
    #[arg(long)]
    pub white_background: bool,

    /// Enforce the minimum printable feature width
    #[arg(long)]
    pub constrain: bool,

    /// Thinnest printable feature in millimetres
    #[arg(long)]
    pub min_thickness: Option<f64>,

    /// Physical output width in millimetres
    #[arg(long)]
    pub print_width: Option<f64>,

    /// Export the composited raster
    #[arg(long)]
    pub png: bool,

    /// Export per-layer vector paths
    #[arg(long)]
    pub svg: bool,

    /// Export a lithophane height-field mesh
    #[arg(long)]
    pub stl: bool,

    /// Export a backlit lithophane impression
    #[arg(long)]
    pub lithophane_preview: bool,

    /// Lithophane thickness for white in millimetres
    #[arg(long)]
    pub min_depth: Option<f64>,

    /// Lithophane thickness for black in millimetres
    #[arg(long)]
    pub max_depth: Option<f64>,

    /// Fraction of the raster resolution used for the mesh grid
    #[arg(long)]
    pub mesh_resolution: Option<f64>,

    /// Directory for outputs (defaults to the input's directory)
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Log pass timings and sizes
    #[arg(short, long)]
    pub verbose: bool,
}

/// Parse a `W:H` frame ratio
///
/// # Errors
///
/// Returns a message when the text is not two positive numbers around `:`
pub fn parse_aspect(text: &str) -> std::result::Result<(f64, f64), String> {
    let (w, h) = text
        .split_once(':')
        .ok_or_else(|| format!("expected W:H, got '{text}'"))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v > 0.0)
            .ok_or_else(|| format!("'{part}' is not a positive number"))
    };
    Ok((parse(w)?, parse(h)?))
}

/// Parse a plate list such as `cmyk`, `cm` or `k`
///
/// # Errors
///
/// Returns a message for letters other than c, m, y, k or an empty list
pub fn parse_plates(text: &str) -> std::result::Result<CmykPlates, String> {
    let mut plates = CmykPlates {
        cyan: false,
        magenta: false,
        yellow: false,
        key: false,
    };
    for letter in text.chars() {
        match letter.to_ascii_lowercase() {
            'c' => plates.cyan = true,
            'm' => plates.magenta = true,
            'y' => plates.yellow = true,
            'k' => plates.key = true,
            other => return Err(format!("unknown plate '{other}'")),
        }
    }
    if plates.cyan || plates.magenta || plates.yellow || plates.key {
        Ok(plates)
    } else {
        Err("at least one plate is required".to_string())
    }
}

impl Cli {
    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    /// Default log filter for the binary
    pub const fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "warn" }
    }

    /// Requested exports; a plain raster when none is named
    pub fn requests(&self) -> Vec<ExportRequest> {
        let mut requests = Vec::new();
        if self.png {
            requests.push(ExportRequest::Raster);
        }
        if self.svg {
            requests.push(ExportRequest::Vector);
        }
        if self.stl {
            requests.push(ExportRequest::Mesh);
        }
        if self.lithophane_preview {
            requests.push(ExportRequest::LithophanePreview);
        }
        if requests.is_empty() {
            requests.push(ExportRequest::Raster);
        }
        requests
    }

    /// Settings from the config file (if any) with flags applied on top
    ///
    /// # Errors
    ///
    /// Returns `FileSystem` or `ConfigParse` for an unreadable config file and
    /// `InvalidParameter` for inconsistent flags
    pub fn settings(&self) -> Result<RenderSettings> {
        let mut settings = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .map_err(|e| io_error(path, "read config", e))?;
                RenderSettings::from_json(&text)?
            }
            None => RenderSettings::default(),
        };
        self.apply_pattern(&mut settings);
        self.apply_frame(&mut settings)?;
        self.apply_tone_and_color(&mut settings);
        self.apply_fabrication(&mut settings);
        Ok(settings)
    }

    fn apply_pattern(&self, settings: &mut RenderSettings) {
        let current = settings.pattern;
        let shape = match current {
            PatternConfig::Dots { shape, .. } => shape,
            _ => DotShape::default(),
        };
        let values = ModeSettings {
            density: self.density.unwrap_or_else(|| current.density()),
            thickness: self.thickness.unwrap_or_else(|| {
                if matches!(current, PatternConfig::PhotoPassthrough) {
                    ModeSettings::default().thickness
                } else {
                    current.thickness()
                }
            }),
            rotation: self.rotation.unwrap_or_else(|| current.rotation()),
            dot_shape: self.dot_shape.unwrap_or(shape),
        };
        settings.pattern = values.resolve(self.mode.unwrap_or_else(|| current.mode()));
    }

    fn apply_frame(&self, settings: &mut RenderSettings) -> Result<()> {
        match (self.frame, self.aspect) {
            (Some(FrameKind::Circle), _) => settings.frame.shape = FrameShape::Circle,
            (Some(FrameKind::Square), _) => settings.frame.shape = FrameShape::Square,
            (Some(FrameKind::Custom) | None, Some((width, height))) => {
                settings.frame.shape = FrameShape::CustomAspect { width, height };
            }
            (Some(FrameKind::Custom), None) => {
                return Err(invalid_parameter(
                    "frame",
                    &"custom",
                    &"a custom frame needs --aspect W:H",
                ));
            }
            (None, None) => {}
        }
        if let Some(hole) = self.hole {
            settings.frame.center_hole = hole;
        }
        if let Some(scale) = self.scale {
            settings.view.scale = scale;
        }
        if let Some(pan_x) = self.pan_x {
            settings.view.pan_x = pan_x;
        }
        if let Some(pan_y) = self.pan_y {
            settings.view.pan_y = pan_y;
        }
        Ok(())
    }

    fn apply_tone_and_color(&self, settings: &mut RenderSettings) {
        if let Some(contrast) = self.contrast {
            settings.tone.contrast = contrast;
        }
        if let Some(brightness) = self.brightness {
            settings.tone.brightness = brightness;
        }
        if self.invert {
            settings.tone.invert = true;
        }
        if self.cmyk || self.plates.is_some() {
            settings.color = ColorMode::Cmyk {
                plates: self.plates.unwrap_or_default(),
            };
        } else if let Some(color) = self.color {
            settings.color = ColorMode::Mono { color };
        }
        if let Some(border) = self.border {
            settings.border_width = border;
        }
        if self.white_background {
            settings.background = Background::White;
        }
    }

    fn apply_fabrication(&self, settings: &mut RenderSettings) {
        if self.constrain {
            settings.constraint.enabled = true;
        }
        if let Some(min_thickness) = self.min_thickness {
            settings.constraint.min_thickness_mm = min_thickness;
        }
        if let Some(print_width) = self.print_width {
            settings.constraint.physical_width_mm = print_width;
            settings.lithophane.physical_width_mm = print_width;
        }
        if let Some(min_depth) = self.min_depth {
            settings.lithophane.min_depth_mm = min_depth;
        }
        if let Some(max_depth) = self.max_depth {
            settings.lithophane.max_depth_mm = max_depth;
        }
        if let Some(resolution) = self.mesh_resolution {
            settings.lithophane.resolution = resolution;
        }
    }
}

/// Runs the requested exports for one input through the batch queue
pub struct JobRunner {
    cli: Cli,
    progress_manager: Option<ProgressManager>,
}

impl JobRunner {
    /// Create a new runner with the given CLI arguments
    pub fn new(cli: Cli) -> Self {
        let progress_manager = cli.should_show_progress().then(ProgressManager::new);

        Self {
            cli,
            progress_manager,
        }
    }

    /// Load the input, validate settings and write every requested export
    ///
    /// # Errors
    ///
    /// Returns the first settings, import, export or write failure
    pub fn run(&mut self) -> Result<()> {
        let settings = self.cli.settings()?;
        if let Some(path) = &self.cli.save_config {
            write_artifact(path, settings.to_json()?.as_bytes())?;
        }
        let source = load_source(&self.cli.input)?;
        let snapshot = Snapshot::new(source, settings)?;
        let queue = ExportQueue::new();

        for request in self.cli.requests() {
            self.export(&queue, &snapshot, request)?;
        }

        if let Some(ref pm) = self.progress_manager {
            pm.finish();
        }
        Ok(())
    }

    fn export(
        &mut self,
        queue: &ExportQueue,
        snapshot: &Snapshot,
        request: ExportRequest,
    ) -> Result<()> {
        let start_time = Instant::now();
        let output_path = self.output_path(request);
        let label = format!("{request:?}");
        let bar = self
            .progress_manager
            .as_mut()
            .map(|pm| pm.start(&label, &output_path.display().to_string()));

        let outcome = queue
            .submit(snapshot.clone(), request)
            .and_then(|handle| handle.wait())
            .and_then(|artifact| write_artifact(&output_path, &artifact.bytes));

        if let Some(error) = outcome.as_ref().err().filter(|e| e.is_retryable()) {
            log::warn!("{label} export failed and may succeed on retry: {error}");
        }
        if let (Some(pm), Some(index)) = (&self.progress_manager, bar) {
            match &outcome {
                Ok(()) => pm.complete(index, &output_path.display().to_string()),
                Err(error) => pm.fail(index, &error.to_string()),
            }
        }
        log::info!("{label} export finished in {:?}", start_time.elapsed());
        outcome
    }

    /// Destination of an export next to the input (or in `--output-dir`)
    pub fn output_path(&self, request: ExportRequest) -> PathBuf {
        output_path_for(&self.cli.input, self.cli.output_dir.as_deref(), request)
    }
}

/// `<stem>_pattern.<ext>` (lithophane previews add `_lithophane`)
pub fn output_path_for(
    input: &Path,
    output_dir: Option<&Path>,
    request: ExportRequest,
) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let variant = match request {
        ExportRequest::LithophanePreview => "_lithophane",
        _ => "",
    };
    let name = format!(
        "{stem}{OUTPUT_SUFFIX}{variant}.{}",
        request.kind().extension()
    );
    match output_dir.or_else(|| input.parent()) {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}

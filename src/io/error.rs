//! Error types and context management for engine operations

use std::fmt;
use std::path::PathBuf;

/// Main error type for all engine operations
#[derive(Debug)]
pub enum EngineError {
    /// Failed to read a source image from the filesystem
    ImageLoad {
        /// Path to the image file
        path: PathBuf,
        /// Underlying image loading error
        source: image::ImageError,
    },

    /// Source bytes are not a decodable image
    ImageDecode {
        /// Underlying decoder error
        source: image::ImageError,
    },

    /// Source raster doesn't meet engine requirements
    InvalidSourceData {
        /// Description of what's wrong with the source data
        reason: String,
    },

    /// Configuration value validation failed
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// The requested output cannot be produced for this configuration
    Unsupported {
        /// Output that was requested
        output: &'static str,
        /// Why the configuration cannot produce it
        reason: String,
    },

    /// A render or export pass failed part-way
    ///
    /// No output is produced; the caller may retry with adjusted parameters.
    Computation {
        /// Name of the pass that failed
        operation: &'static str,
        /// Description of the failure
        reason: String,
    },

    /// Failed to save an export to disk
    ImageExport {
        /// Path where export was attempted
        path: PathBuf,
        /// Underlying image export error
        source: image::ImageError,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Configuration file could not be parsed
    ConfigParse {
        /// Underlying JSON error
        source: serde_json::Error,
    },

    /// A newer export replaced this job before it completed
    JobSuperseded {
        /// Ticket of the stale job
        ticket: u64,
    },

    /// The export worker stopped without delivering a result
    JobFailed {
        /// Ticket of the lost job
        ticket: u64,
    },
}

impl EngineError {
    /// Whether retrying with adjusted parameters may succeed
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Computation { .. } | Self::JobSuperseded { .. } | Self::JobFailed { .. }
        )
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImageLoad { path, source } => {
                write!(f, "Failed to load image '{}': {source}", path.display())
            }
            Self::ImageDecode { source } => {
                write!(f, "Source data is not a readable image: {source}")
            }
            Self::InvalidSourceData { reason } => {
                write!(f, "Invalid source data: {reason}")
            }
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
            Self::Unsupported { output, reason } => {
                write!(f, "Cannot produce {output}: {reason}")
            }
            Self::Computation { operation, reason } => {
                write!(f, "Computation error in {operation}: {reason}")
            }
            Self::ImageExport { path, source } => {
                write!(
                    f,
                    "Failed to export image to '{}': {source}",
                    path.display()
                )
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
            Self::ConfigParse { source } => {
                write!(f, "Failed to parse configuration: {source}")
            }
            Self::JobSuperseded { ticket } => {
                write!(f, "Export job {ticket} was superseded by a newer request")
            }
            Self::JobFailed { ticket } => {
                write!(f, "Export job {ticket} stopped without a result")
            }
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ImageLoad { source, .. }
            | Self::ImageExport { source, .. }
            | Self::ImageDecode { source } => Some(source),
            Self::FileSystem { source, .. } => Some(source),
            Self::ConfigParse { source } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for engine results
pub type Result<T> = std::result::Result<T, EngineError>;

/// Additional context to enrich error messages
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Pass being performed
    pub operation: Option<&'static str>,
    /// Ink layer being processed
    pub layer: Option<&'static str>,
}

/// Enriches error messages with pass information
pub trait WithContext<T> {
    /// Add error context to a Result
    ///
    /// # Errors
    ///
    /// Propagates the original error with additional context applied
    fn with_context(self, context: ErrorContext) -> Result<T>;

    /// Add just the operation context
    ///
    /// # Errors
    ///
    /// Propagates the original error with the operation context applied
    fn with_operation(self, operation: &'static str) -> Result<T>;
}

impl<T, E> WithContext<T> for std::result::Result<T, E>
where
    E: Into<EngineError>,
{
    fn with_context(self, context: ErrorContext) -> Result<T> {
        self.map_err(|e| {
            let mut error = e.into();
            // Only pass failures carry a pass name worth rewriting
            if let EngineError::Computation { operation, reason } = &mut error {
                if let Some(op) = context.operation {
                    *operation = op;
                }
                if let Some(layer) = context.layer {
                    *reason = format!("{reason} (layer {layer})");
                }
            }
            error
        })
    }

    fn with_operation(self, operation: &'static str) -> Result<T> {
        self.with_context(ErrorContext {
            operation: Some(operation),
            ..Default::default()
        })
    }
}

impl From<image::ImageError> for EngineError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageDecode { source: err }
    }
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("<unknown>"),
            operation: "unknown",
            source: err,
        }
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        Self::ConfigParse { source: err }
    }
}

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> EngineError {
    EngineError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Create a computation error
pub fn computation_error(operation: &'static str, reason: &impl ToString) -> EngineError {
    EngineError::Computation {
        operation,
        reason: reason.to_string(),
    }
}

/// Create a filesystem error for a path-producing operation
pub fn io_error(
    path: impl Into<PathBuf>,
    operation: &'static str,
    source: std::io::Error,
) -> EngineError {
    EngineError::FileSystem {
        path: path.into(),
        operation,
        source,
    }
}

//! # Error Handling
//!
//! Error types for the ink normalization library.
//!
//! ## Absence Is Not an Error
//!
//! A raster without ink, or with too little ink to classify, is a normal outcome
//! and is reported through [`crate::processing::NoContent`], never through this
//! module. Errors here cover contract violations (bad target resolution, malformed
//! rasters, invalid configuration) and failures of the collaborators around the
//! core (file sources, sinks, classifiers).
//!
//! ## Architecture
//!
//! - **Error Types**: one enum, every variant carrying an [`ErrorContext`]
//! - **Error Context**: timestamp, operation, free-form context, recovery suggestion,
//!   severity and key-value metadata
//! - **Classification**: [`HasSeverity`], [`HasRecoverySuggestion`] and the
//!   [`classify`] helpers
//!
//! ## Usage
//!
//! ```rust
//! use ink_normalize::error::{classify, HasRecoverySuggestion, NormalizeError};
//!
//! let error = NormalizeError::invalid_target(0, 28)
//!     .with_context("building the 28x28 pipeline")
//!     .with_recovery_suggestion("Pass a target of at least 1x1");
//!
//! assert!(classify::is_contract_violation(&error));
//! assert_eq!(error.recovery_suggestion(), Some("Pass a target of at least 1x1"));
//! ```

use std::{error::Error as StdError, fmt, time::SystemTime};

use ink_scale::raster::ScaleError;

/// Severity levels for errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Informational errors
    Info,
    /// Warnings that may indicate potential issues
    Warning,
    /// Errors that affect one request but leave the library usable
    Error,
    /// Contract violations: the caller has a bug
    Fatal,
}

/// Metadata about when and where an error occurred
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// When the error occurred
    pub timestamp: SystemTime,
    /// The operation being performed when the error occurred
    pub operation: Option<String>,
    /// Additional context about the error
    pub context: Option<String>,
    /// Suggested recovery action
    pub recovery_suggestion: Option<String>,
    /// Error severity level
    pub severity: ErrorSeverity,
    /// Additional metadata as key-value pairs
    pub metadata: std::collections::HashMap<String, String>,
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self {
            timestamp: SystemTime::now(),
            operation: None,
            context: None,
            recovery_suggestion: None,
            severity: ErrorSeverity::Error,
            metadata: std::collections::HashMap::new(),
        }
    }
}

impl ErrorContext {
    /// Create a new error context
    pub fn new() -> Self {
        Self::default()
    }

    /// Context for contract violations
    pub fn fatal() -> Self {
        Self {
            severity: ErrorSeverity::Fatal,
            ..Self::default()
        }
    }
}

/// Base error type for the ink normalization library
#[derive(Debug)]
pub enum NormalizeError {
    /// Configuration validation errors
    Config {
        field: String,
        value: String,
        reason: String,
        context: ErrorContext,
    },
    /// Target resolution with a zero dimension
    InvalidTargetResolution {
        width: u32,
        height: u32,
        context: ErrorContext,
    },
    /// Malformed raster (zero dimensions, sample count mismatch, bad crop)
    Raster {
        reason: String,
        source: Option<ScaleError>,
        context: ErrorContext,
    },
    /// Raster source failures (unreadable or malformed input files)
    Source {
        source_name: String,
        reason: String,
        context: ErrorContext,
    },
    /// Feature sink failures
    Sink {
        sink: String,
        reason: String,
        context: ErrorContext,
    },
    /// Classifier failures
    Classifier {
        reason: String,
        context: ErrorContext,
    },
    /// I/O errors
    Io {
        operation: String,
        path: Option<String>,
        source: std::io::Error,
        context: ErrorContext,
    },
    /// External library errors
    External {
        library: String,
        source: Box<dyn StdError + Send + Sync>,
        context: ErrorContext,
    },
}

impl NormalizeError {
    /// Create a configuration error
    pub fn config(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Config {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create an invalid target resolution error (fatal)
    pub fn invalid_target(width: u32, height: u32) -> Self {
        Self::InvalidTargetResolution {
            width,
            height,
            context: ErrorContext::fatal(),
        }
    }

    /// Create a raster error (fatal)
    pub fn raster(reason: impl Into<String>) -> Self {
        Self::Raster {
            reason: reason.into(),
            source: None,
            context: ErrorContext::fatal(),
        }
    }

    /// Create a raster source error
    pub fn source_failed(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Source {
            source_name: source_name.into(),
            reason: reason.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create a sink error
    pub fn sink(sink: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Sink {
            sink: sink.into(),
            reason: reason.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create a classifier error
    pub fn classifier(reason: impl Into<String>) -> Self {
        Self::Classifier {
            reason: reason.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create an I/O error
    pub fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            path: None,
            source,
            context: ErrorContext::new(),
        }
    }

    /// Create an I/O error tied to a file path
    pub fn io_at(
        operation: impl Into<String>,
        path: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Self::Io {
            operation: operation.into(),
            path: Some(path.into()),
            source,
            context: ErrorContext::new(),
        }
    }

    /// Create an external library error
    pub fn external(
        library: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::External {
            library: library.into(),
            source: Box::new(source),
            context: ErrorContext::new(),
        }
    }

    /// Add context to the error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context_mut().context = Some(context.into());
        self
    }

    /// Add operation context
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.context_mut().operation = Some(operation.into());
        self
    }

    /// Add recovery suggestion
    pub fn with_recovery_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.context_mut().recovery_suggestion = Some(suggestion.into());
        self
    }

    /// Set severity
    pub fn with_severity(mut self, severity: ErrorSeverity) -> Self {
        self.context_mut().severity = severity;
        self
    }

    /// Add metadata
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context_mut().metadata.insert(key.into(), value.into());
        self
    }

    /// Get the error context
    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::Config { context, .. } => context,
            Self::InvalidTargetResolution { context, .. } => context,
            Self::Raster { context, .. } => context,
            Self::Source { context, .. } => context,
            Self::Sink { context, .. } => context,
            Self::Classifier { context, .. } => context,
            Self::Io { context, .. } => context,
            Self::External { context, .. } => context,
        }
    }

    fn context_mut(&mut self) -> &mut ErrorContext {
        match self {
            Self::Config { context, .. } => context,
            Self::InvalidTargetResolution { context, .. } => context,
            Self::Raster { context, .. } => context,
            Self::Source { context, .. } => context,
            Self::Sink { context, .. } => context,
            Self::Classifier { context, .. } => context,
            Self::Io { context, .. } => context,
            Self::External { context, .. } => context,
        }
    }

    /// Get the error category as a string
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config { .. } => "config",
            Self::InvalidTargetResolution { .. } => "invalid_target_resolution",
            Self::Raster { .. } => "raster",
            Self::Source { .. } => "source",
            Self::Sink { .. } => "sink",
            Self::Classifier { .. } => "classifier",
            Self::Io { .. } => "io",
            Self::External { .. } => "external",
        }
    }
}

impl fmt::Display for NormalizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizeError::Config {
                field,
                value,
                reason,
                ..
            } => {
                write!(
                    f,
                    "Configuration error in '{}': {} (value: {})",
                    field, reason, value
                )
            }
            NormalizeError::InvalidTargetResolution { width, height, .. } => {
                write!(
                    f,
                    "Invalid target resolution {}x{}: both dimensions must be at least 1",
                    width, height
                )
            }
            NormalizeError::Raster { reason, .. } => {
                write!(f, "Malformed raster: {}", reason)
            }
            NormalizeError::Source {
                source_name,
                reason,
                ..
            } => {
                write!(f, "Raster source '{}' failed: {}", source_name, reason)
            }
            NormalizeError::Sink { sink, reason, .. } => {
                write!(f, "Sink '{}' failed: {}", sink, reason)
            }
            NormalizeError::Classifier { reason, .. } => {
                write!(f, "Classifier failed: {}", reason)
            }
            NormalizeError::Io {
                operation,
                path,
                source,
                ..
            } => {
                if let Some(path) = path {
                    write!(
                        f,
                        "I/O error during {} on '{}': {}",
                        operation, path, source
                    )
                } else {
                    write!(f, "I/O error during {}: {}", operation, source)
                }
            }
            NormalizeError::External {
                library, source, ..
            } => {
                write!(f, "External library error in {}: {}", library, source)
            }
        }
    }
}

impl StdError for NormalizeError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Raster {
                source: Some(source),
                ..
            } => Some(source),
            Self::Io { source, .. } => Some(source),
            Self::External { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// Result type alias using our custom error type
pub type NormalizeResult<T> = Result<T, NormalizeError>;

/// Trait for errors with severity levels
pub trait HasSeverity {
    /// Get the severity level of this error
    fn severity(&self) -> ErrorSeverity;
}

impl HasSeverity for NormalizeError {
    fn severity(&self) -> ErrorSeverity {
        self.context().severity
    }
}

/// Trait for errors that provide recovery suggestions
pub trait HasRecoverySuggestion {
    /// Get recovery suggestion for this error
    fn recovery_suggestion(&self) -> Option<&str>;
}

impl HasRecoverySuggestion for NormalizeError {
    fn recovery_suggestion(&self) -> Option<&str> {
        self.context().recovery_suggestion.as_deref()
    }
}

/// Error classification utilities
pub mod classify {
    use super::*;

    /// Errors caused by the caller breaking an input contract
    pub fn is_contract_violation(error: &NormalizeError) -> bool {
        matches!(
            error,
            NormalizeError::InvalidTargetResolution { .. } | NormalizeError::Raster { .. }
        )
    }

    /// Errors no retry or fallback can fix
    pub fn is_fatal(error: &NormalizeError) -> bool {
        is_contract_violation(error)
            || matches!(error, NormalizeError::Config { .. })
            || error.severity() == ErrorSeverity::Fatal
    }

    /// Get error priority (higher numbers = higher priority)
    pub fn priority(error: &NormalizeError) -> u8 {
        match error.severity() {
            ErrorSeverity::Info => 0,
            ErrorSeverity::Warning => 1,
            ErrorSeverity::Error => 2,
            ErrorSeverity::Fatal => 3,
        }
    }
}

impl From<std::io::Error> for NormalizeError {
    fn from(error: std::io::Error) -> Self {
        Self::io("unknown", error)
    }
}

impl From<serde_json::Error> for NormalizeError {
    fn from(error: serde_json::Error) -> Self {
        Self::external("serde_json", error)
    }
}

impl From<image::ImageError> for NormalizeError {
    fn from(error: image::ImageError) -> Self {
        Self::external("image", error)
    }
}

impl From<ScaleError> for NormalizeError {
    fn from(error: ScaleError) -> Self {
        match error {
            ScaleError::InvalidTargetResolution { w, h } => Self::invalid_target(w, h),
            ScaleError::Fir(_) | ScaleError::ImageBuf(_) => Self::external("fast_image_resize", error),
            other => Self::Raster {
                reason: other.to_string(),
                source: Some(other),
                context: ErrorContext::fatal(),
            },
        }
    }
}

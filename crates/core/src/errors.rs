//! Core error types for Finboard.
//!
//! Transport and API errors live in the `finboard-api` crate; this module only
//! covers what can go wrong before a request is ever built (form validation)
//! and while producing export files.

use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the core crate.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Export failed: {0}")]
    Export(#[from] ExportError),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Form-level validation errors.
///
/// Every variant is scoped to the field that failed so presentation code can
/// attach the message to the right input. These are raised before any network
/// call and never reach the query cache.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field '{field}' is missing")]
    MissingField { field: &'static str },

    #[error("Field '{field}' is out of range: {message}")]
    OutOfRange {
        field: &'static str,
        message: String,
    },

    #[error("Field '{field}' has an invalid format: {message}")]
    InvalidFormat {
        field: &'static str,
        message: String,
    },
}

impl ValidationError {
    pub fn missing(field: &'static str) -> Self {
        Self::MissingField { field }
    }

    pub fn out_of_range(field: &'static str, message: impl Into<String>) -> Self {
        Self::OutOfRange {
            field,
            message: message.into(),
        }
    }

    pub fn invalid_format(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            field,
            message: message.into(),
        }
    }

    /// Name of the offending field (wire name, camelCase).
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingField { field }
            | Self::OutOfRange { field, .. }
            | Self::InvalidFormat { field, .. } => field,
        }
    }
}

/// Errors raised while serializing or writing export payloads.
///
/// The public export entry points swallow these and return `false`; they are
/// exposed for callers that drive the lower-level writers directly.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Nothing to export")]
    Empty,

    #[error("CSV serialization failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("Workbook serialization failed: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),

    #[error("Failed to write export file: {0}")]
    Io(#[from] std::io::Error),
}

//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// uniqueness, missing records). Storage failures belong to the desktop layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// An item with this barcode is already in the store.
    ///
    /// Recoverable: callers typically ask the user whether to merge instead.
    #[error("barcode {0} already exists")]
    DuplicateBarcode(String),

    /// The targeted item (or edit target) does not exist.
    #[error("not found")]
    NotFound,

    /// A single input field failed validation.
    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// A CSV import line could not be turned into a record.
    #[error("malformed import line {line}: {reason}")]
    MalformedImportLine { line: usize, reason: String },

    /// A request was rejected before touching any item.
    #[error("validation failed: {0}")]
    Validation(String),
}

impl DomainError {
    pub fn duplicate(barcode: impl Into<String>) -> Self {
        Self::DuplicateBarcode(barcode.into())
    }

    pub fn invalid_field(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }

    pub fn malformed_line(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedImportLine {
            line,
            reason: reason.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }
}

//! Error types for the payroll engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while computing payroll,
//! payslips, loans, leave entitlements and ratings.

use thiserror::Error;

/// The main error type for the payroll engine.
///
/// Every engine operation returns this error type. The variants mirror the
/// failure classes a caller has to distinguish: malformed input, missing
/// records, cross-tenant access, arithmetic that cannot be carried out and
/// illegal state-machine transitions.
///
/// # Example
///
/// ```
/// use payroll_engine::error::EngineError;
///
/// let error = EngineError::NotFound {
///     entity: "employee",
///     id: "emp_404".to_string(),
/// };
/// assert_eq!(error.to_string(), "employee not found: emp_404");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Request input was malformed or a required field was missing.
    ///
    /// Raised before any write takes place.
    #[error("Invalid field '{field}': {message}")]
    Validation {
        /// The offending field.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// A referenced record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of record (e.g. "employee", "payslip").
        entity: &'static str,
        /// The identifier that was looked up.
        id: String,
    },

    /// A referenced record exists but belongs to a different tenant.
    #[error("{entity} {id} belongs to another tenant")]
    Forbidden {
        /// The kind of record.
        entity: &'static str,
        /// The identifier that was looked up.
        id: String,
    },

    /// A calculation could not be carried out (e.g. zero loan tenure).
    #[error("Computation error: {message}")]
    Computation {
        /// A description of the failed computation.
        message: String,
    },

    /// A state-machine transition is not allowed from the current state.
    #[error("Cannot move {entity} {id} from '{from}' to '{to}'")]
    InvalidTransition {
        /// The kind of record.
        entity: &'static str,
        /// The record identifier.
        id: String,
        /// The current state.
        from: String,
        /// The requested state.
        to: String,
    },
}

impl EngineError {
    /// Shorthand for a [`EngineError::Validation`] error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Shorthand for a [`EngineError::Computation`] error.
    pub fn computation(message: impl Into<String>) -> Self {
        EngineError::Computation {
            message: message.into(),
        }
    }

    /// Machine-readable error code, as reported in API errors and row errors.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::ConfigNotFound { .. } => "CONFIG_NOT_FOUND",
            EngineError::ConfigParseError { .. } => "CONFIG_PARSE_ERROR",
            EngineError::Validation { .. } => "VALIDATION_ERROR",
            EngineError::NotFound { .. } => "NOT_FOUND",
            EngineError::Forbidden { .. } => "FORBIDDEN",
            EngineError::Computation { .. } => "COMPUTATION_ERROR",
            EngineError::InvalidTransition { .. } => "INVALID_TRANSITION",
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

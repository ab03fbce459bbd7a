// Lawful Error Handling Framework
// Central location for error types, traits, and handling utilities

use std::any::Any;
use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

// Re-export common error handling tools for convenience
pub use anyhow;
pub use thiserror;

// Module structure
mod common;
mod macros;

// Public exports
pub use common::*; // Includes helper functions like missing_capability etc.

/// Error domains representing different components of the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorDomain {
    Derivation,
    Interpreter,
    Structure,
    Procedure,
}

impl fmt::Display for ErrorDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorDomain::Derivation => write!(f, "derivation"),
            ErrorDomain::Interpreter => write!(f, "interpreter"),
            ErrorDomain::Structure => write!(f, "structure"),
            ErrorDomain::Procedure => write!(f, "procedure"),
        }
    }
}

/// Error code structure for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ErrorCode(pub u32);

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

/// Error codes, grouped by domain
pub mod codes {
    use crate::ErrorCode;

    // Derivation codes start with 1000
    pub const MISSING_CAPABILITY: ErrorCode = ErrorCode(1001);

    // Interpreter codes start with 2000
    pub const UNSUPPORTED_STRUCTURE: ErrorCode = ErrorCode(2001);
    pub const CURSOR_EXHAUSTED: ErrorCode = ErrorCode(2002);
    pub const REPLAY_DIVERGED: ErrorCode = ErrorCode(2003);

    // Structure codes start with 3000
    pub const TYPE_MISMATCH: ErrorCode = ErrorCode(3001);
    pub const INVALID_ARGUMENT: ErrorCode = ErrorCode(3002);

    // Procedure codes start with 4000
    pub const PROCEDURE_FAULT: ErrorCode = ErrorCode(4001);
}

/// Standard error message format for serialization
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ErrorMessage {
    pub code: ErrorCode,
    pub domain: ErrorDomain,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Errors raised while deriving, calling, or interpreting algebraic structures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AlgebraError {
    /// An operation was invoked on a structure that neither supplies nor derives it.
    #[error("Missing capability: {structure} has no `{operation}`")]
    MissingCapability {
        structure: String,
        operation: &'static str,
    },

    /// The interpreter cannot bind over the given structure.
    #[error("Unsupported structure: {structure} ({reason})")]
    UnsupportedStructure { structure: String, reason: String },

    /// A procedure was resumed after it had already returned.
    #[error("Cursor exhausted: procedure already finished after {steps} steps")]
    CursorExhausted { steps: usize },

    /// Replaying a checkpoint's history finished the procedure early.
    #[error("Replay diverged: procedure returned at step {step} of a {history}-step history")]
    ReplayDiverged { step: usize, history: usize },

    /// A value had the wrong shape for the operation consuming it.
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// Invalid argument passed to a structure operation
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Raised by an interpreted procedure; passed through untouched.
    #[error("Procedure fault: {0}")]
    ProcedureFault(String),
}

/// Convenient Result type for algebra operations
pub type Result<T> = std::result::Result<T, AlgebraError>;

/// Base trait for all errors in the lawful toolkit.
pub trait LawfulError: StdError + fmt::Debug + fmt::Display + Send + Sync + Any + 'static {
    /// Returns the numeric code of this error.
    fn code(&self) -> ErrorCode;

    /// Returns the component this error belongs to.
    fn domain(&self) -> ErrorDomain;

    /// Returns a unique static string code for this error type.
    fn error_code(&self) -> &'static str;

    /// Provides context specific to the error (optional).
    fn context(&self) -> Option<String> {
        None
    }

    /// Indicates if the error is temporary and retrying might succeed.
    fn is_transient(&self) -> bool {
        false
    }

    /// Render the error as a serialisable message.
    fn to_message(&self) -> ErrorMessage {
        ErrorMessage {
            code: self.code(),
            domain: self.domain(),
            message: self.to_string(),
            details: self.context().map(serde_json::Value::String),
        }
    }

    /// Returns this error as a `&dyn Any` to allow downcasting.
    fn as_any(&self) -> &dyn Any;
}

impl LawfulError for AlgebraError {
    fn code(&self) -> ErrorCode {
        use codes::*;
        match self {
            AlgebraError::MissingCapability { .. } => MISSING_CAPABILITY,
            AlgebraError::UnsupportedStructure { .. } => UNSUPPORTED_STRUCTURE,
            AlgebraError::CursorExhausted { .. } => CURSOR_EXHAUSTED,
            AlgebraError::ReplayDiverged { .. } => REPLAY_DIVERGED,
            AlgebraError::TypeMismatch { .. } => TYPE_MISMATCH,
            AlgebraError::InvalidArgument(_) => INVALID_ARGUMENT,
            AlgebraError::ProcedureFault(_) => PROCEDURE_FAULT,
        }
    }

    fn domain(&self) -> ErrorDomain {
        match self {
            AlgebraError::MissingCapability { .. } => ErrorDomain::Derivation,
            AlgebraError::UnsupportedStructure { .. }
            | AlgebraError::CursorExhausted { .. }
            | AlgebraError::ReplayDiverged { .. } => ErrorDomain::Interpreter,
            AlgebraError::TypeMismatch { .. } | AlgebraError::InvalidArgument(_) => {
                ErrorDomain::Structure
            }
            AlgebraError::ProcedureFault(_) => ErrorDomain::Procedure,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AlgebraError::MissingCapability { .. } => "DERIVATION_MISSING_CAPABILITY",
            AlgebraError::UnsupportedStructure { .. } => "INTERPRETER_UNSUPPORTED_STRUCTURE",
            AlgebraError::CursorExhausted { .. } => "INTERPRETER_CURSOR_EXHAUSTED",
            AlgebraError::ReplayDiverged { .. } => "INTERPRETER_REPLAY_DIVERGED",
            AlgebraError::TypeMismatch { .. } => "STRUCTURE_TYPE_MISMATCH",
            AlgebraError::InvalidArgument(_) => "STRUCTURE_INVALID_ARGUMENT",
            AlgebraError::ProcedureFault(_) => "PROCEDURE_FAULT",
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            AlgebraError::MissingCapability { structure, .. }
            | AlgebraError::UnsupportedStructure { structure, .. } => Some(structure.clone()),
            _ => None,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl AlgebraError {
    /// Whether this error names a missing operation.
    pub fn is_missing_capability(&self) -> bool {
        matches!(self, AlgebraError::MissingCapability { .. })
    }

    /// The operation named by a `MissingCapability` error.
    pub fn missing_operation(&self) -> Option<&'static str> {
        match self {
            AlgebraError::MissingCapability { operation, .. } => Some(*operation),
            _ => None,
        }
    }
}

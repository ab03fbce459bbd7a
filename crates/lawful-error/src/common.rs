// Common error utilities and helper functions
// Provides common error constructors used across the workspace

use crate::AlgebraError;

/// Create a "missing capability" error for an operation absent from a structure
pub fn missing_capability(structure: impl Into<String>, operation: &'static str) -> AlgebraError {
    let structure = structure.into();
    tracing::trace!(%structure, operation, "capability missing at call time");
    AlgebraError::MissingCapability { structure, operation }
}

/// Create an "unsupported structure" error with the given reason
pub fn unsupported_structure(
    structure: impl Into<String>,
    reason: impl Into<String>,
) -> AlgebraError {
    AlgebraError::UnsupportedStructure {
        structure: structure.into(),
        reason: reason.into(),
    }
}

/// Create a type mismatch error
pub fn type_mismatch(expected: impl Into<String>, found: impl Into<String>) -> AlgebraError {
    AlgebraError::TypeMismatch {
        expected: expected.into(),
        found: found.into(),
    }
}

/// Create an invalid argument error with the given reason
pub fn invalid_argument(reason: impl Into<String>) -> AlgebraError {
    AlgebraError::InvalidArgument(reason.into())
}

/// Create a fault raised from inside an interpreted procedure
pub fn fault(reason: impl Into<String>) -> AlgebraError {
    AlgebraError::ProcedureFault(reason.into())
}


//! Error types for QSched
//!
//! Every error here is detected while validating input, before any
//! scheduling pass runs. No partial schedule is ever returned.

// Error variant fields are self-documenting via error messages
#![allow(missing_docs)]

use crate::types::{OpId, Resource};
use thiserror::Error;

/// Main error type for QSched
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScheduleError {
    // ========================================================================
    // Operation Errors
    // ========================================================================
    /// Duration is zero, negative, or not finite
    #[error("Operation {op} has invalid duration {duration}: must be finite and > 0")]
    InvalidDuration { op: OpId, duration: f64 },

    /// Resource index outside the declared register size
    #[error("Operation {op} touches {resource} but only {limit} are declared")]
    UnknownResource {
        op: OpId,
        resource: Resource,
        limit: usize,
    },

    /// Same resource listed twice in one operation (e.g. a CNOT on 1,1)
    #[error("Operation {op} lists {resource} more than once")]
    DuplicateResource { op: OpId, resource: Resource },

    /// Operation touches no resources at all
    #[error("Operation {op} ('{kind}') touches no resources")]
    EmptyOperation { op: OpId, kind: String },

    /// Classical read of a bit that no earlier operation writes
    #[error("Operation {op} reads classical bit c[{clbit}] before any operation writes it")]
    MalformedClassicalDependency { op: OpId, clbit: usize },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Trial count (`repeat_num`) below one
    #[error("Invalid trial count {0}: must be >= 1")]
    InvalidTrialCount(usize),

    /// Duration table entry out of range
    #[error("Invalid duration for '{kind}': {duration} (must be finite and > 0)")]
    InvalidTableDuration { kind: String, duration: f64 },

    /// Generic configuration problem
    #[error("Configuration error: {0}")]
    InvalidConfig(String),

    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(String),

    /// File I/O error
    #[error("File error: {0}")]
    FileError(String),
}

/// Result type alias for QSched operations
pub type ScheduleResult<T> = Result<T, ScheduleError>;

// ============================================================================
// Error Conversion Helpers
// ============================================================================

impl From<serde_json::Error> for ScheduleError {
    fn from(err: serde_json::Error) -> Self {
        ScheduleError::JsonError(err.to_string())
    }
}

impl From<std::io::Error> for ScheduleError {
    fn from(err: std::io::Error) -> Self {
        ScheduleError::FileError(err.to_string())
    }
}

// ============================================================================
// Error Helpers
// ============================================================================

impl ScheduleError {
    /// Check if error was caused by a malformed operation
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            ScheduleError::InvalidDuration { .. }
                | ScheduleError::UnknownResource { .. }
                | ScheduleError::DuplicateResource { .. }
                | ScheduleError::EmptyOperation { .. }
                | ScheduleError::MalformedClassicalDependency { .. }
        )
    }

    /// Check if error was caused by scheduler configuration
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ScheduleError::InvalidTrialCount(_)
                | ScheduleError::InvalidTableDuration { .. }
                | ScheduleError::InvalidConfig(_)
        )
    }

    /// Index of the offending operation, if the error concerns one
    pub fn operation(&self) -> Option<OpId> {
        match self {
            ScheduleError::InvalidDuration { op, .. }
            | ScheduleError::UnknownResource { op, .. }
            | ScheduleError::DuplicateResource { op, .. }
            | ScheduleError::EmptyOperation { op, .. }
            | ScheduleError::MalformedClassicalDependency { op, .. } => Some(*op),
            _ => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ScheduleError::InvalidDuration {
            op: 3,
            duration: -1.5,
        };
        assert!(err.to_string().contains("-1.5"));
        assert!(err.to_string().contains('3'));
    }

    #[test]
    fn test_unknown_resource_display() {
        let err = ScheduleError::UnknownResource {
            op: 0,
            resource: Resource::Qubit(9),
            limit: 4,
        };
        assert!(err.to_string().contains("q[9]"));
        assert!(err.to_string().contains('4'));
    }

    #[test]
    fn test_classification() {
        assert!(ScheduleError::InvalidTrialCount(0).is_config_error());
        assert!(!ScheduleError::InvalidTrialCount(0).is_validation_error());

        let err = ScheduleError::MalformedClassicalDependency { op: 2, clbit: 0 };
        assert!(err.is_validation_error());
        assert_eq!(err.operation(), Some(2));
    }

    #[test]
    fn test_from_json_error() {
        let bad: Result<u32, _> = serde_json::from_str("not json");
        let err: ScheduleError = bad.unwrap_err().into();
        assert!(matches!(err, ScheduleError::JsonError(_)));
    }
}

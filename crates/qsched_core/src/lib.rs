//! # QSched Core
//!
//! Operation descriptors, the resource model, duration tables, and error
//! types shared by the QSched scheduler.
//!
//! ## Quick Start
//!
//! ```rust
//! use qsched_core::prelude::*;
//!
//! let ops = SequenceBuilder::new(3)
//!     .x(0)
//!     .iswap(1, 2)
//!     .duration(3.5)
//!     .measure(0, 0)
//!     .conditioned("X", &[2], &[0])
//!     .build_validated()
//!     .unwrap();
//!
//! assert_eq!(ops.len(), 4);
//! assert!(ops[3].touches(Resource::Clbit(0)));
//! ```
//!
//! ## Durations
//!
//! ```rust
//! use qsched_core::prelude::*;
//!
//! let table = DurationTable::superconducting();
//! let cx = Operation::controlled("CNOT", &[0], &[1]);
//! assert_eq!(table.duration_of(&cx), 300.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Core types (resources, roles, limits)
pub mod types;

/// Constants
pub mod constants;

/// Error types
pub mod error;

/// Operation descriptors and validation
pub mod operation;

/// Sequence builder
pub mod builder;

/// Duration table
pub mod durations;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::SequenceBuilder;
pub use durations::DurationTable;
pub use error::{ScheduleError, ScheduleResult};
pub use operation::{validate_sequence, Operation};
pub use types::{ClbitId, OpId, QubitId, Resource, ResourceLimits, ResourceUse, Role};

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Convenient imports for common use cases
    //!
    //! ```rust
    //! use qsched_core::prelude::*;
    //! ```

    pub use crate::builder::SequenceBuilder;
    pub use crate::durations::DurationTable;
    pub use crate::error::{ScheduleError, ScheduleResult};
    pub use crate::operation::{validate_sequence, Operation};
    pub use crate::types::{
        ClbitId, OpId, QubitId, Resource, ResourceLimits, ResourceUse, Role,
    };
}

// ============================================================================
// Version Information
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

// ============================================================================
// Integration Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_measurement_then_feed_forward() {
        let ops = SequenceBuilder::new(2)
            .snot(0)
            .measure(0, 0)
            .conditioned("X", &[1], &[0])
            .build_validated()
            .unwrap();

        // Conditioned X shares c[0] with the measurement, not a qubit
        let shared = ops[1].shared_resources(&ops[2]);
        assert_eq!(shared, vec![Resource::Clbit(0)]);
    }

    #[test]
    fn test_remeasurement_is_valid() {
        let ops = SequenceBuilder::new(1)
            .measure(0, 0)
            .conditioned("X", &[0], &[0])
            .measure(0, 0)
            .conditioned("X", &[0], &[0])
            .build();

        assert!(validate_sequence(&ops, &ResourceLimits::new(1, 1)).is_ok());
    }

    #[test]
    fn test_weighted_durations_for_sequence() {
        let ops = SequenceBuilder::new(3)
            .x(0)
            .iswap(1, 2)
            .build();

        let table = DurationTable::unit().with_kind("iswap", 3.5);
        assert_eq!(table.resolve(&ops), vec![1.0, 3.5]);
    }

    #[test]
    fn test_operation_json_roundtrip() {
        let ops = SequenceBuilder::new(2)
            .cnot(0, 1)
            .duration(2.0)
            .measure(1, 0)
            .build();

        let json = serde_json::to_string(&ops).unwrap();
        let parsed: Vec<Operation> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, ops);
    }
}

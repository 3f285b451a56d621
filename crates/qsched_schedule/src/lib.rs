//! # QSched Schedule
//!
//! Commutation-aware dependency graphs, ASAP/ALAP list scheduling, and
//! randomized tie-break search over quantum operation sequences.
//!
//! ## Quick Start
//!
//! ```rust
//! use qsched_schedule::prelude::*;
//! use qsched_core::SequenceBuilder;
//!
//! let ops = SequenceBuilder::new(3)
//!     .x(0)
//!     .iswap(1, 2)
//!     .x(2)
//!     .y(0)
//!     .x(0)
//!     .build();
//!
//! let schedule = Scheduler::default().schedule(&ops).unwrap();
//!
//! assert_eq!(schedule.start_times(), vec![0.0, 0.0, 1.0, 1.0, 2.0]);
//! println!("{}", schedule);
//! ```
//!
//! ## Commutation and Search
//!
//! ```rust
//! use qsched_schedule::prelude::*;
//! use qsched_core::SequenceBuilder;
//!
//! // The two CNOTs share only their control and may be reordered
//! let ops = SequenceBuilder::new(3)
//!     .snot(0)
//!     .cnot(0, 1)
//!     .cnot(0, 2)
//!     .snot(2)
//!     .build();
//!
//! let config = SchedulerConfig::gate_level()
//!     .with_random_shuffle(20)
//!     .with_seed(7);
//! let schedule = Scheduler::new(config).schedule(&ops).unwrap();
//!
//! assert_eq!(schedule.makespan(), 3.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Scheduler configuration
pub mod config;

/// Commutation rules
pub mod commutation;

/// Dependency graph builder
pub mod graph;

/// List scheduling passes
pub mod list;

/// Randomized tie-break search
pub mod search;

/// Scheduled operation with timing
pub mod scheduled_operation;

/// Operation schedule and timing analysis
pub mod operation_schedule;

/// Scheduler facade
pub mod scheduler;

// ============================================================================
// Re-exports
// ============================================================================

pub use commutation::{
    CommutationRule, CommutationRules, IdenticalRule, KindPairRule, SharedControlRule,
    SharedReadRule,
};
pub use config::{Mode, Policy, SchedulerConfig};
pub use graph::DependencyGraph;
pub use list::{ListScheduler, PassResult, TieBreak};
pub use operation_schedule::Schedule;
pub use scheduled_operation::{ScheduledOperation, TimeSlot};
pub use scheduler::{schedule, Scheduler};
pub use search::{RandomizedSearch, SearchOutcome};

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Convenient imports for common use cases
    //!
    //! ```rust
    //! use qsched_schedule::prelude::*;
    //! ```

    pub use crate::commutation::{CommutationRule, CommutationRules};
    pub use crate::config::{Mode, Policy, SchedulerConfig};
    pub use crate::graph::DependencyGraph;
    pub use crate::operation_schedule::Schedule;
    pub use crate::scheduled_operation::{ScheduledOperation, TimeSlot};
    pub use crate::scheduler::{schedule, Scheduler};
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

//! # QSched Bench
//!
//! Workload generators, a strategy-comparison suite, and reports for the
//! QSched scheduler.
//!
//! ## Quick Start
//!
//! ```rust
//! use qsched_bench::prelude::*;
//!
//! let mut suite = BenchSuite::with_seed(42);
//! let results = suite.run_standard(4, 10).unwrap();
//!
//! let report = Reporter::to_markdown(&results);
//! println!("{}", report);
//! ```
//!
//! ## Sequence Generation
//!
//! ```rust
//! use qsched_bench::prelude::*;
//!
//! let gen = SequenceGenerator::with_seed(42);
//!
//! let ghz = gen.ghz(5);
//! let fan = gen.fan_out(5);
//! let feed = gen.feed_forward(3);
//! let random = gen.random(5, 4);
//!
//! assert_eq!(ghz.len(), 5);
//! ```

#![warn(missing_docs)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Sequence generators
pub mod generators;

/// Benchmark suite
pub mod suite;

/// Reporting
pub mod reporter;

// ============================================================================
// Re-exports
// ============================================================================

pub use generators::SequenceGenerator;
pub use reporter::{ReportFormat, Reporter};
pub use suite::{BenchSuite, BenchmarkResult, BenchmarkStatistics, Strategy};

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Convenient imports for common use cases
    //!
    //! ```rust
    //! use qsched_bench::prelude::*;
    //! ```

    pub use crate::generators::SequenceGenerator;
    pub use crate::reporter::{ReportFormat, Reporter};
    pub use crate::suite::{BenchSuite, BenchmarkResult, BenchmarkStatistics, Strategy};
}

// ============================================================================
// Integration Tests
// ============================================================================

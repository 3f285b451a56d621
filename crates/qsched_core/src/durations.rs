//! Instruction duration table for QSched
//!
//! Supplies durations for operations that do not declare one. Lookup
//! order: explicit duration on the operation, per-kind override, then
//! a class default (measurement, single-qubit, multi-qubit).

use crate::constants::hardware;
use crate::constants::timing::DEFAULT_DURATION;
use crate::error::{ScheduleError, ScheduleResult};
use crate::operation::Operation;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Duration configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DurationTable {
    /// Single-qubit operation duration
    pub single_qubit: f64,

    /// Duration of operations touching two or more qubits
    pub multi_qubit: f64,

    /// Measurement duration
    pub measurement: f64,

    /// Per-kind overrides, keyed by lowercase kind
    #[serde(default)]
    overrides: BTreeMap<String, f64>,
}

impl DurationTable {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create a new duration table
    pub fn new(single_qubit: f64, multi_qubit: f64, measurement: f64) -> Self {
        Self {
            single_qubit,
            multi_qubit,
            measurement,
            overrides: BTreeMap::new(),
        }
    }

    /// Every operation lasts one cycle
    pub fn unit() -> Self {
        Self::new(DEFAULT_DURATION, DEFAULT_DURATION, DEFAULT_DURATION)
    }

    /// Superconducting processor timings (ns)
    pub fn superconducting() -> Self {
        Self::new(
            hardware::SUPERCONDUCTING_1Q_NS,
            hardware::SUPERCONDUCTING_2Q_NS,
            hardware::SUPERCONDUCTING_MEASURE_NS,
        )
        .with_kind("swap", hardware::SUPERCONDUCTING_2Q_NS * 3.0) // 3 CNOTs
        .with_kind("reset", 1000.0)
    }

    /// Trapped ion processor timings (ns)
    pub fn trapped_ion() -> Self {
        Self::new(
            hardware::TRAPPED_ION_1Q_NS,
            hardware::TRAPPED_ION_2Q_NS,
            hardware::TRAPPED_ION_MEASURE_NS,
        )
    }

    // ========================================================================
    // Overrides
    // ========================================================================

    /// Set a duration for one kind (case-insensitive)
    pub fn with_kind(mut self, kind: &str, duration: f64) -> Self {
        self.overrides.insert(kind.to_lowercase(), duration);
        self
    }

    /// Override for `kind`, if any
    pub fn kind_duration(&self, kind: &str) -> Option<f64> {
        self.overrides.get(&kind.to_lowercase()).copied()
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Resolve the duration of one operation
    pub fn duration_of(&self, op: &Operation) -> f64 {
        if let Some(d) = op.duration() {
            return d;
        }
        if let Some(d) = self.kind_duration(op.kind()) {
            return d;
        }

        if op.is_measurement() {
            self.measurement
        } else if op.num_qubits() >= 2 {
            self.multi_qubit
        } else {
            self.single_qubit
        }
    }

    /// Resolve durations for a whole sequence, index-aligned
    pub fn resolve(&self, operations: &[Operation]) -> Vec<f64> {
        operations.iter().map(|op| self.duration_of(op)).collect()
    }

    /// Total duration with no parallelism at all
    pub fn sequential_duration(&self, operations: &[Operation]) -> f64 {
        operations.iter().map(|op| self.duration_of(op)).sum()
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Check that every entry is finite and positive
    pub fn validate(&self) -> ScheduleResult<()> {
        let defaults = [
            ("<single_qubit>", self.single_qubit),
            ("<multi_qubit>", self.multi_qubit),
            ("<measurement>", self.measurement),
        ];
        let overrides = self.overrides.iter().map(|(k, &v)| (k.as_str(), v));

        for (kind, duration) in defaults.into_iter().chain(overrides) {
            if !duration.is_finite() || duration <= 0.0 {
                return Err(ScheduleError::InvalidTableDuration {
                    kind: kind.to_string(),
                    duration,
                });
            }
        }
        Ok(())
    }
}

impl Default for DurationTable {
    fn default() -> Self {
        Self::unit()
    }
}

impl fmt::Display for DurationTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DurationTable(1Q={}, multi={}, meas={}, overrides={})",
            self.single_qubit,
            self.multi_qubit,
            self.measurement,
            self.overrides.len()
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

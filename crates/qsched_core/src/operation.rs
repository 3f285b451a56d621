//! Operation descriptors for QSched
//!
//! An operation is an opaque unit of work: a kind name, the qubits it
//! targets or is controlled by, the classical bits it reads or writes,
//! and an optional explicit duration. The scheduler never looks at what
//! an operation computes.

use crate::constants::timing::MEASURE_KIND;
use crate::error::{ScheduleError, ScheduleResult};
use crate::types::{ClbitId, OpId, QubitId, Resource, ResourceLimits, ResourceUse, Role};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// A declared gate or timed instruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Gate name or instruction type
    kind: String,

    /// Qubits acted upon
    targets: Vec<QubitId>,

    /// Control qubits
    #[serde(default)]
    controls: Vec<QubitId>,

    /// Classical bits this operation is conditioned on
    #[serde(default)]
    classical_reads: Vec<ClbitId>,

    /// Classical bits this operation writes
    #[serde(default)]
    classical_writes: Vec<ClbitId>,

    /// Explicit duration; falls back to the duration table when absent
    #[serde(default)]
    duration: Option<f64>,
}

impl Operation {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create an operation acting on `targets`
    pub fn new(kind: impl Into<String>, targets: &[QubitId]) -> Self {
        Self {
            kind: kind.into(),
            targets: targets.to_vec(),
            controls: Vec::new(),
            classical_reads: Vec::new(),
            classical_writes: Vec::new(),
            duration: None,
        }
    }

    /// Create a controlled operation
    pub fn controlled(kind: impl Into<String>, controls: &[QubitId], targets: &[QubitId]) -> Self {
        Self::new(kind, targets).with_controls(controls)
    }

    /// Measure `qubit` into classical bit `clbit`
    pub fn measure(qubit: QubitId, clbit: ClbitId) -> Self {
        Self::new(MEASURE_KIND, &[qubit]).with_classical_writes(&[clbit])
    }

    // ========================================================================
    // Builder Methods
    // ========================================================================

    /// Set control qubits
    pub fn with_controls(mut self, controls: &[QubitId]) -> Self {
        self.controls = controls.to_vec();
        self
    }

    /// Condition on classical bits
    pub fn with_classical_reads(mut self, clbits: &[ClbitId]) -> Self {
        self.classical_reads = clbits.to_vec();
        self
    }

    /// Write classical bits
    pub fn with_classical_writes(mut self, clbits: &[ClbitId]) -> Self {
        self.classical_writes = clbits.to_vec();
        self
    }

    /// Set explicit duration
    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = Some(duration);
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Kind name
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Target qubits
    pub fn targets(&self) -> &[QubitId] {
        &self.targets
    }

    /// Control qubits
    pub fn controls(&self) -> &[QubitId] {
        &self.controls
    }

    /// Classical bits read
    pub fn classical_reads(&self) -> &[ClbitId] {
        &self.classical_reads
    }

    /// Classical bits written
    pub fn classical_writes(&self) -> &[ClbitId] {
        &self.classical_writes
    }

    /// Explicit duration, if any
    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    /// Has at least one control qubit
    pub fn is_controlled(&self) -> bool {
        !self.controls.is_empty()
    }

    /// Writes classical state or is named as a measurement
    pub fn is_measurement(&self) -> bool {
        !self.classical_writes.is_empty() || self.kind.eq_ignore_ascii_case(MEASURE_KIND)
    }

    /// Number of qubits touched (targets + controls)
    pub fn num_qubits(&self) -> usize {
        self.targets.len() + self.controls.len()
    }

    // ========================================================================
    // Resource Model
    // ========================================================================

    /// Normalized resource set with roles
    ///
    /// Order is controls, targets, classical reads, classical writes.
    /// Classical bits appear once each; a bit that is both read and
    /// written is held as a write.
    pub fn resources(&self) -> Vec<ResourceUse> {
        let controls = self
            .controls
            .iter()
            .map(|&q| ResourceUse::new(Resource::Qubit(q), Role::Control));
        let targets = self
            .targets
            .iter()
            .map(|&q| ResourceUse::new(Resource::Qubit(q), Role::Target));

        let writes = distinct(&self.classical_writes);
        let reads: Vec<ClbitId> = distinct(&self.classical_reads)
            .into_iter()
            .filter(|c| !writes.contains(c))
            .collect();

        controls
            .chain(targets)
            .chain(reads.into_iter().map(|c| ResourceUse::new(Resource::Clbit(c), Role::Read)))
            .chain(writes.into_iter().map(|c| ResourceUse::new(Resource::Clbit(c), Role::Write)))
            .collect()
    }

    /// Resource identifiers without roles
    pub fn resource_ids(&self) -> Vec<Resource> {
        self.resources().into_iter().map(|u| u.resource).collect()
    }

    /// Role this operation holds `resource` in
    pub fn role_of(&self, resource: Resource) -> Option<Role> {
        self.resources()
            .into_iter()
            .find(|u| u.resource == resource)
            .map(|u| u.role)
    }

    /// Check if this operation touches `resource`
    pub fn touches(&self, resource: Resource) -> bool {
        self.role_of(resource).is_some()
    }

    /// Resources touched by both operations
    pub fn shared_resources(&self, other: &Operation) -> Vec<Resource> {
        let mine: HashSet<Resource> = self.resource_ids().into_iter().collect();
        other
            .resource_ids()
            .into_iter()
            .filter(|r| mine.contains(r))
            .collect()
    }

    /// Check if the two resource sets intersect
    pub fn overlaps(&self, other: &Operation) -> bool {
        !self.shared_resources(other).is_empty()
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Validate this operation in isolation
    ///
    /// `id` is only used to label errors.
    pub fn validate(&self, id: OpId, limits: &ResourceLimits) -> ScheduleResult<()> {
        if let Some(duration) = self.duration {
            if !duration.is_finite() || duration <= 0.0 {
                return Err(ScheduleError::InvalidDuration { op: id, duration });
            }
        }

        let uses = self.resources();
        if uses.is_empty() {
            return Err(ScheduleError::EmptyOperation {
                op: id,
                kind: self.kind.clone(),
            });
        }

        let mut seen = HashSet::with_capacity(uses.len());
        for u in &uses {
            if !seen.insert(u.resource) {
                return Err(ScheduleError::DuplicateResource {
                    op: id,
                    resource: u.resource,
                });
            }
            if let Some(limit) = limits.limit_for(u.resource) {
                if u.resource.index() >= limit {
                    return Err(ScheduleError::UnknownResource {
                        op: id,
                        resource: u.resource,
                        limit,
                    });
                }
            }
        }

        Ok(())
    }
}

/// Bits in first-seen order without repeats
fn distinct(bits: &[ClbitId]) -> Vec<ClbitId> {
    let mut seen = HashSet::with_capacity(bits.len());
    bits.iter().copied().filter(|&c| seen.insert(c)).collect()
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if !self.controls.is_empty() {
            write!(f, " ctrl{:?}", self.controls)?;
        }
        write!(f, " {:?}", self.targets)?;
        if !self.classical_reads.is_empty() {
            write!(f, " if c{:?}", self.classical_reads)?;
        }
        if !self.classical_writes.is_empty() {
            write!(f, " -> c{:?}", self.classical_writes)?;
        }
        if let Some(d) = self.duration {
            write!(f, " ({})", d)?;
        }
        Ok(())
    }
}

// ============================================================================
// Sequence Validation
// ============================================================================

/// Validate a whole operation sequence
///
/// Checks each operation, then checks that every classical read is
/// preceded by a write of the same bit.
pub fn validate_sequence(operations: &[Operation], limits: &ResourceLimits) -> ScheduleResult<()> {
    let mut written: HashSet<ClbitId> = HashSet::new();

    for (id, op) in operations.iter().enumerate() {
        op.validate(id, limits)?;

        for &clbit in op.classical_reads() {
            if !written.contains(&clbit) {
                return Err(ScheduleError::MalformedClassicalDependency { op: id, clbit });
            }
        }
        written.extend(op.classical_writes().iter().copied());
    }

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

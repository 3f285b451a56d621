//! Operation sequence builder for QSched
//!
//! Fluent builder (consuming self pattern) for the ordered operation
//! lists the scheduler consumes.

use crate::error::ScheduleResult;
use crate::operation::{validate_sequence, Operation};
use crate::types::{ClbitId, QubitId, ResourceLimits};

/// Fluent sequence builder
pub struct SequenceBuilder {
    /// Register width used by layer helpers and validation
    num_qubits: usize,

    /// Operations added so far
    operations: Vec<Operation>,
}

impl SequenceBuilder {
    // ========================================================================
    // Constructor
    // ========================================================================

    /// Create a new builder for `num_qubits` qubits
    pub fn new(num_qubits: usize) -> Self {
        Self {
            num_qubits,
            operations: Vec::new(),
        }
    }

    // ========================================================================
    // Generic Operations
    // ========================================================================

    /// Append an already-built operation
    pub fn push(mut self, op: Operation) -> Self {
        self.operations.push(op);
        self
    }

    /// Add an uncontrolled gate
    pub fn gate(self, kind: &str, targets: &[QubitId]) -> Self {
        self.push(Operation::new(kind, targets))
    }

    /// Add a controlled gate
    pub fn controlled(self, kind: &str, controls: &[QubitId], targets: &[QubitId]) -> Self {
        self.push(Operation::controlled(kind, controls, targets))
    }

    /// Add a gate conditioned on classical bits
    pub fn conditioned(self, kind: &str, targets: &[QubitId], clbits: &[ClbitId]) -> Self {
        self.push(Operation::new(kind, targets).with_classical_reads(clbits))
    }

    /// Set the duration of the most recently added operation
    pub fn duration(mut self, duration: f64) -> Self {
        if let Some(last) = self.operations.pop() {
            self.operations.push(last.with_duration(duration));
        }
        self
    }

    // ========================================================================
    // Named Gates
    // ========================================================================

    /// Add Pauli-X gate
    pub fn x(self, qubit: QubitId) -> Self {
        self.gate("X", &[qubit])
    }

    /// Add Pauli-Y gate
    pub fn y(self, qubit: QubitId) -> Self {
        self.gate("Y", &[qubit])
    }

    /// Add Pauli-Z gate
    pub fn z(self, qubit: QubitId) -> Self {
        self.gate("Z", &[qubit])
    }

    /// Add Hadamard gate
    pub fn snot(self, qubit: QubitId) -> Self {
        self.gate("SNOT", &[qubit])
    }

    /// Add CNOT gate
    pub fn cnot(self, control: QubitId, target: QubitId) -> Self {
        self.controlled("CNOT", &[control], &[target])
    }

    /// Add controlled-Z gate
    pub fn cz(self, control: QubitId, target: QubitId) -> Self {
        self.controlled("CZ", &[control], &[target])
    }

    /// Add iSWAP gate
    pub fn iswap(self, a: QubitId, b: QubitId) -> Self {
        self.gate("ISWAP", &[a, b])
    }

    /// Add SWAP gate
    pub fn swap(self, a: QubitId, b: QubitId) -> Self {
        self.gate("SWAP", &[a, b])
    }

    /// Add Toffoli gate
    pub fn toffoli(self, c1: QubitId, c2: QubitId, target: QubitId) -> Self {
        self.controlled("TOFFOLI", &[c1, c2], &[target])
    }

    // ========================================================================
    // Measurement
    // ========================================================================

    /// Measure `qubit` into `clbit`
    pub fn measure(self, qubit: QubitId, clbit: ClbitId) -> Self {
        self.push(Operation::measure(qubit, clbit))
    }

    /// Measure every qubit into the classical bit with the same index
    pub fn measure_all(mut self) -> Self {
        for q in 0..self.num_qubits {
            self = self.measure(q, q);
        }
        self
    }

    // ========================================================================
    // Layers
    // ========================================================================

    /// Hadamard on every qubit
    pub fn snot_layer(mut self) -> Self {
        for q in 0..self.num_qubits {
            self = self.snot(q);
        }
        self
    }

    /// CNOT ladder 0→1, 1→2, ...
    pub fn cnot_chain(mut self) -> Self {
        for q in 0..self.num_qubits.saturating_sub(1) {
            self = self.cnot(q, q + 1);
        }
        self
    }

    /// CNOT fan-out from `control` to every other qubit
    pub fn cnot_fan_out(mut self, control: QubitId) -> Self {
        for q in (0..self.num_qubits).filter(|&q| q != control) {
            self = self.cnot(control, q);
        }
        self
    }

    // ========================================================================
    // Build
    // ========================================================================

    /// Build and return the sequence
    pub fn build(self) -> Vec<Operation> {
        self.operations
    }

    /// Build with validation against the builder's register width
    pub fn build_validated(self) -> ScheduleResult<Vec<Operation>> {
        let limits = ResourceLimits {
            num_qubits: Some(self.num_qubits),
            num_clbits: None,
        };
        validate_sequence(&self.operations, &limits)?;
        Ok(self.operations)
    }

    /// Get reference to current operations
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Get number of qubits
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }
}

// ============================================================================
// Tests
// ============================================================================

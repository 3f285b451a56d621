//! Sequence generators for benchmarking
//!
//! Structured workloads (GHZ ladders, fan-outs, feed-forward) and seeded
//! random sequences that always pass validation.

use qsched_core::{ClbitId, Operation, SequenceBuilder};
use rand::prelude::*;
use rand::rngs::StdRng;

/// Operation sequence generator for benchmarks
pub struct SequenceGenerator {
    /// Random seed
    seed: Option<u64>,
}

impl SequenceGenerator {
    /// Create new generator
    pub fn new() -> Self {
        Self { seed: None }
    }

    /// Create generator with seed
    pub fn with_seed(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }

    // ========================================================================
    // Structured Sequences
    // ========================================================================

    /// Bell pair preparation
    pub fn bell(&self) -> Vec<Operation> {
        SequenceBuilder::new(2).snot(0).cnot(0, 1).build()
    }

    /// GHZ preparation: Hadamard then a CNOT ladder
    pub fn ghz(&self, num_qubits: usize) -> Vec<Operation> {
        SequenceBuilder::new(num_qubits).snot(0).cnot_chain().build()
    }

    /// Hadamard on the control, CNOT fan-out, Hadamard layer on the targets
    ///
    /// The fan-out CNOTs share only their control and may be reordered.
    pub fn fan_out(&self, num_qubits: usize) -> Vec<Operation> {
        let mut builder = SequenceBuilder::new(num_qubits).snot(0).cnot_fan_out(0);
        for q in 1..num_qubits {
            builder = builder.snot(q);
        }
        builder.build()
    }

    /// Measure qubit 0, correct every other qubit on the result, measure all
    pub fn feed_forward(&self, num_qubits: usize) -> Vec<Operation> {
        let mut builder = SequenceBuilder::new(num_qubits).snot_layer().measure(0, 0);
        for q in 1..num_qubits {
            builder = builder.conditioned("X", &[q], &[0]);
        }
        builder.measure_all().build()
    }

    /// `depth` rounds of a Hadamard layer followed by a CNOT ladder
    pub fn layered(&self, num_qubits: usize, depth: usize) -> Vec<Operation> {
        let mut builder = SequenceBuilder::new(num_qubits);
        for _ in 0..depth {
            builder = builder.snot_layer().cnot_chain();
        }
        builder.build()
    }

    /// Single-qubit gates on qubit 0 only
    pub fn chain(&self, length: usize) -> Vec<Operation> {
        let mut builder = SequenceBuilder::new(1);
        let mut rng = self.get_rng();
        for _ in 0..length {
            builder = match rng.gen_range(0..4) {
                0 => builder.x(0),
                1 => builder.y(0),
                2 => builder.z(0),
                _ => builder.snot(0),
            };
        }
        builder.build()
    }

    // ========================================================================
    // Random Sequences
    // ========================================================================

    /// Random sequence of single-qubit gates, CNOTs, measurements and
    /// classically conditioned gates
    pub fn random(&self, num_qubits: usize, depth: usize) -> Vec<Operation> {
        let mut builder = SequenceBuilder::new(num_qubits);
        let mut rng = self.get_rng();
        let mut written: Vec<ClbitId> = Vec::new();

        for _ in 0..depth {
            // Single-qubit layer
            for q in 0..num_qubits {
                builder = match rng.gen_range(0..7) {
                    0 => builder.snot(q),
                    1 => builder.x(q),
                    2 => builder.y(q),
                    3 => builder.z(q),
                    4 if !written.is_empty() => {
                        let c = written[rng.gen_range(0..written.len())];
                        builder.conditioned("X", &[q], &[c])
                    }
                    5 => {
                        if !written.contains(&q) {
                            written.push(q);
                        }
                        builder.measure(q, q)
                    }
                    _ => builder.z(q),
                };
            }

            // Two-qubit gates between random pairs
            for _ in 0..num_qubits.saturating_sub(1) {
                if rng.gen::<f64>() < 0.5 {
                    let control = rng.gen_range(0..num_qubits);
                    let target = (control + rng.gen_range(1..num_qubits)) % num_qubits;
                    builder = builder.cnot(control, target);
                }
            }
        }

        builder.build()
    }

    /// Random sequence with an explicit duration on every operation
    ///
    /// Durations are multiples of 0.5 between 0.5 and 4.0.
    pub fn random_weighted(&self, num_qubits: usize, depth: usize) -> Vec<Operation> {
        let mut rng = self.get_rng();
        self.random(num_qubits, depth)
            .into_iter()
            .map(|op| op.with_duration(rng.gen_range(1..=8) as f64 * 0.5))
            .collect()
    }

    /// GHZ ladders from 2 to `max_qubits` qubits
    pub fn qubit_scaling(&self, max_qubits: usize) -> Vec<Vec<Operation>> {
        (2..=max_qubits).map(|n| self.ghz(n)).collect()
    }

    /// Random sequences of depth 1 to `max_depth`
    pub fn depth_scaling(&self, num_qubits: usize, max_depth: usize) -> Vec<Vec<Operation>> {
        (1..=max_depth).map(|d| self.random(num_qubits, d)).collect()
    }

    // ========================================================================
    // Utility
    // ========================================================================

    /// Get RNG with optional seed
    fn get_rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

impl Default for SequenceGenerator {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use qsched_core::{validate_sequence, ResourceLimits};

    #[test]
    fn test_ghz() {
        let ops = SequenceGenerator::new().ghz(5);

        assert_eq!(ops.len(), 5);
        assert_eq!(ops.iter().filter(|o| o.is_controlled()).count(), 4);
    }

    #[test]
    fn test_bell() {
        let ops = SequenceGenerator::new().bell();
        assert_eq!(ops.len(), 2);
        assert!(ops[1].is_controlled());
    }

    #[test]
    fn test_fan_out() {
        let ops = SequenceGenerator::new().fan_out(4);

        // SNOT + 3 CNOT + 3 SNOT
        assert_eq!(ops.len(), 7);
        assert!(ops[1..4].iter().all(|o| o.controls() == [0]));
    }

    #[test]
    fn test_feed_forward_is_valid() {
        let ops = SequenceGenerator::new().feed_forward(4);

        assert!(validate_sequence(&ops, &ResourceLimits::new(4, 4)).is_ok());
        assert_eq!(ops.iter().filter(|o| o.is_measurement()).count(), 5);
    }

    #[test]
    fn test_layered() {
        let ops = SequenceGenerator::new().layered(3, 2);
        assert_eq!(ops.len(), 2 * (3 + 2));
    }

    #[test]
    fn test_chain_uses_one_qubit() {
        let ops = SequenceGenerator::with_seed(1).chain(10);

        assert_eq!(ops.len(), 10);
        assert!(ops.iter().all(|o| o.targets() == [0]));
    }

    #[test]
    fn test_random_is_valid() {
        for seed in 0..20 {
            let ops = SequenceGenerator::with_seed(seed).random(5, 6);
            assert!(
                validate_sequence(&ops, &ResourceLimits::new(5, 5)).is_ok(),
                "seed {} produced an invalid sequence",
                seed
            );
        }
    }

    #[test]
    fn test_random_reproducibility() {
        let a = SequenceGenerator::with_seed(42).random(5, 3);
        let b = SequenceGenerator::with_seed(42).random(5, 3);
        assert_eq!(a, b);
    }

    #[test]
    fn test_random_weighted_durations() {
        let ops = SequenceGenerator::with_seed(7).random_weighted(4, 4);

        assert!(!ops.is_empty());
        for op in &ops {
            let d = op.duration().unwrap();
            assert!((0.5..=4.0).contains(&d));
        }
    }

    #[test]
    fn test_single_qubit_random() {
        // No CNOTs possible on one qubit
        let ops = SequenceGenerator::with_seed(3).random(1, 5);
        assert!(ops.iter().all(|o| !o.is_controlled()));
    }

    #[test]
    fn test_qubit_scaling() {
        let sequences = SequenceGenerator::new().qubit_scaling(6);

        assert_eq!(sequences.len(), 5);
        for (i, ops) in sequences.iter().enumerate() {
            assert_eq!(ops.len(), i + 2);
        }
    }

    #[test]
    fn test_depth_scaling() {
        let sequences = SequenceGenerator::with_seed(42).depth_scaling(3, 4);

        assert_eq!(sequences.len(), 4);
        // Each round adds one operation per qubit at least
        for (i, ops) in sequences.iter().enumerate() {
            assert!(ops.len() >= 3 * (i + 1));
        }
    }
}

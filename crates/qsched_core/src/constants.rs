//! Constants for QSched
//!
//! Timing defaults and hardware presets used by the duration table.

// ============================================================================
// Timing Constants
// ============================================================================

pub mod timing {
    //! Scheduling time units

    /// Duration assumed when nothing else is known (one cycle)
    pub const DEFAULT_DURATION: f64 = 1.0;

    /// Tolerance when comparing start times for cycle grouping
    pub const TIME_EPSILON: f64 = 1e-9;

    /// Kind name treated as a measurement by the duration table
    pub const MEASURE_KIND: &str = "measure";
}

// ============================================================================
// Hardware Presets
// ============================================================================

pub mod hardware {
    //! Representative instruction durations in nanoseconds

    /// Superconducting single-qubit gate (SX pulse)
    pub const SUPERCONDUCTING_1Q_NS: f64 = 35.0;

    /// Superconducting two-qubit gate (CX / ECR)
    pub const SUPERCONDUCTING_2Q_NS: f64 = 300.0;

    /// Superconducting readout
    pub const SUPERCONDUCTING_MEASURE_NS: f64 = 5000.0;

    /// Trapped-ion single-qubit gate
    pub const TRAPPED_ION_1Q_NS: f64 = 10_000.0;

    /// Trapped-ion two-qubit (Mølmer–Sørensen) gate
    pub const TRAPPED_ION_2Q_NS: f64 = 200_000.0;

    /// Trapped-ion readout
    pub const TRAPPED_ION_MEASURE_NS: f64 = 100_000.0;
}

// ============================================================================
// Search Constants
// ============================================================================

pub mod search {
    //! Randomized search defaults

    /// Trials run when shuffling is enabled without an explicit count
    pub const DEFAULT_REPEAT_NUM: usize = 1;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_ordering() {
        assert!(hardware::SUPERCONDUCTING_2Q_NS > hardware::SUPERCONDUCTING_1Q_NS);
        assert!(hardware::TRAPPED_ION_2Q_NS > hardware::SUPERCONDUCTING_2Q_NS);
        assert_eq!(timing::DEFAULT_DURATION, 1.0);
    }
}

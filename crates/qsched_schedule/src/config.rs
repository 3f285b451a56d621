//! Scheduler configuration
//!
//! Policy, duration mode, randomized search parameters, declared
//! register sizes, and the duration table.

use qsched_core::{DurationTable, ResourceLimits, ScheduleError, ScheduleResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// List-scheduling policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Policy {
    /// As soon as possible
    #[default]
    Asap,
    /// As late as possible
    Alap,
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Policy::Asap => write!(f, "ASAP"),
            Policy::Alap => write!(f, "ALAP"),
        }
    }
}

/// Duration mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Mode {
    /// Every operation takes one cycle; start times are cycle indices
    #[default]
    UnitCycle,
    /// Declared durations; start times are real-valued
    Weighted,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::UnitCycle => write!(f, "unit-cycle"),
            Mode::Weighted => write!(f, "weighted"),
        }
    }
}

/// Scheduler configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// ASAP or ALAP
    pub policy: Policy,

    /// Unit-cycle or weighted durations
    pub mode: Mode,

    /// Run randomized tie-break trials after the deterministic one
    pub random_shuffle: bool,

    /// Total trial count when shuffling (>= 1)
    pub repeat_num: usize,

    /// Seed for the trial permutations; entropy when `None`
    pub seed: Option<u64>,

    /// Declared qubit count, if any
    pub num_qubits: Option<usize>,

    /// Declared classical bit count, if any
    pub num_clbits: Option<usize>,

    /// Order ready operations by longest remaining path before id
    pub critical_path_priority: bool,

    /// Durations for operations that carry none (weighted mode only)
    pub durations: DurationTable,
}

impl SchedulerConfig {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Gate-level scheduling: unit cycles, ASAP
    pub fn gate_level() -> Self {
        Self {
            policy: Policy::Asap,
            mode: Mode::UnitCycle,
            random_shuffle: false,
            repeat_num: 1,
            seed: None,
            num_qubits: None,
            num_clbits: None,
            critical_path_priority: false,
            durations: DurationTable::unit(),
        }
    }

    /// Instruction-level scheduling: weighted durations, ASAP
    pub fn instruction_level(durations: DurationTable) -> Self {
        Self {
            mode: Mode::Weighted,
            durations,
            ..Self::gate_level()
        }
    }

    // ========================================================================
    // Builder Methods
    // ========================================================================

    /// Set policy
    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    /// Set duration mode
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Enable randomized search with `repeat_num` total trials
    pub fn with_random_shuffle(mut self, repeat_num: usize) -> Self {
        self.random_shuffle = true;
        self.repeat_num = repeat_num;
        self
    }

    /// Set seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Declare register sizes
    pub fn with_registers(mut self, num_qubits: usize, num_clbits: usize) -> Self {
        self.num_qubits = Some(num_qubits);
        self.num_clbits = Some(num_clbits);
        self
    }

    /// Enable/disable critical-path priority
    pub fn with_critical_path_priority(mut self, enabled: bool) -> Self {
        self.critical_path_priority = enabled;
        self
    }

    /// Set duration table
    pub fn with_durations(mut self, durations: DurationTable) -> Self {
        self.durations = durations;
        self
    }

    // ========================================================================
    // Derived Values
    // ========================================================================

    /// Number of trials the search driver runs
    pub fn trials(&self) -> usize {
        if self.random_shuffle {
            self.repeat_num
        } else {
            1
        }
    }

    /// Declared register sizes
    pub fn limits(&self) -> ResourceLimits {
        ResourceLimits {
            num_qubits: self.num_qubits,
            num_clbits: self.num_clbits,
        }
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Validate configuration
    pub fn validate(&self) -> ScheduleResult<()> {
        if self.repeat_num == 0 {
            return Err(ScheduleError::InvalidTrialCount(self.repeat_num));
        }
        self.durations.validate()
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Parse from JSON and validate
    pub fn from_json(json: &str) -> ScheduleResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> ScheduleResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> ScheduleResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Save to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> ScheduleResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::gate_level()
    }
}

impl fmt::Display for SchedulerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SchedulerConfig({}, {}, trials={}, seed={:?})",
            self.policy,
            self.mode,
            self.trials(),
            self.seed
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

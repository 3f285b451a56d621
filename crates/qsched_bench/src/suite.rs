//! Benchmark suite for QSched
//!
//! Schedules workloads under several strategies and records makespans
//! against the critical-path lower bound.

use crate::generators::SequenceGenerator;
use log::info;
use qsched_core::{DurationTable, Operation, ScheduleResult};
use qsched_schedule::{Mode, Policy, Scheduler, SchedulerConfig};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

/// How ready-operation ties are broken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strategy {
    /// Ascending id, single trial
    Deterministic,
    /// Longest remaining path first, single trial
    CriticalPath,
    /// Randomized search with this many trials
    Randomized(usize),
}

impl Strategy {
    /// Strategies compared by [`BenchSuite::compare`]
    pub fn all(trials: usize) -> [Strategy; 3] {
        [
            Strategy::Deterministic,
            Strategy::CriticalPath,
            Strategy::Randomized(trials),
        ]
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Deterministic => write!(f, "deterministic"),
            Strategy::CriticalPath => write!(f, "critical-path"),
            Strategy::Randomized(trials) => write!(f, "random({})", trials),
        }
    }
}

/// Single benchmark result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkResult {
    /// Workload name
    pub name: String,

    /// Number of operations
    pub operations: usize,

    /// Policy
    pub policy: Policy,

    /// Tie-break strategy
    pub strategy: Strategy,

    /// Makespan found
    pub makespan: f64,

    /// Critical-path length (lower bound on the makespan)
    pub critical_path: f64,

    /// Distinct start times
    pub depth: usize,

    /// Sequential duration over makespan
    pub parallelism: f64,

    /// Winning trial
    pub best_trial: usize,

    /// Execution time (microseconds)
    pub time_us: u64,
}

impl BenchmarkResult {
    /// Critical path over makespan (1.0 is optimal)
    pub fn efficiency(&self) -> f64 {
        if self.makespan <= 0.0 {
            return 1.0;
        }
        self.critical_path / self.makespan
    }
}

/// Benchmark suite
pub struct BenchSuite {
    /// Seed for randomized strategies
    seed: u64,

    /// Duration mode
    mode: Mode,

    /// Durations used in weighted mode
    durations: DurationTable,

    /// Results
    results: Vec<BenchmarkResult>,

    /// Log each benchmark at info level
    verbose: bool,
}

impl BenchSuite {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create new benchmark suite (unit-cycle mode)
    pub fn new() -> Self {
        Self::with_seed(42)
    }

    /// Create with seed
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            mode: Mode::UnitCycle,
            durations: DurationTable::unit(),
            results: Vec::new(),
            verbose: false,
        }
    }

    /// Switch to weighted mode with `durations`
    pub fn with_durations(mut self, durations: DurationTable) -> Self {
        self.mode = Mode::Weighted;
        self.durations = durations;
        self
    }

    /// Enable verbose output
    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }

    fn config(&self, policy: Policy, strategy: Strategy) -> SchedulerConfig {
        let base = match self.mode {
            Mode::UnitCycle => SchedulerConfig::gate_level(),
            Mode::Weighted => SchedulerConfig::instruction_level(self.durations.clone()),
        }
        .with_policy(policy)
        .with_seed(self.seed);

        match strategy {
            Strategy::Deterministic => base,
            Strategy::CriticalPath => base.with_critical_path_priority(true),
            Strategy::Randomized(trials) => base.with_random_shuffle(trials),
        }
    }

    // ========================================================================
    // Individual Benchmarks
    // ========================================================================

    /// Schedule one workload with one policy and strategy
    pub fn bench(
        &mut self,
        name: &str,
        operations: &[Operation],
        policy: Policy,
        strategy: Strategy,
    ) -> ScheduleResult<BenchmarkResult> {
        let scheduler = Scheduler::new(self.config(policy, strategy));

        let start = Instant::now();
        let graph = scheduler.build_graph(operations)?;
        let schedule = scheduler.schedule_graph(operations, &graph)?;
        let time_us = start.elapsed().as_micros() as u64;

        let result = BenchmarkResult {
            name: name.to_string(),
            operations: operations.len(),
            policy,
            strategy,
            makespan: schedule.makespan(),
            critical_path: graph.critical_path_length(&scheduler.durations(operations)),
            depth: schedule.depth(),
            parallelism: schedule.parallelism_factor(),
            best_trial: schedule.best_trial(),
            time_us,
        };

        if self.verbose {
            info!(
                "{} [{} {}]: makespan {:.2} (critical path {:.2})",
                name, policy, strategy, result.makespan, result.critical_path
            );
        }

        self.results.push(result.clone());
        Ok(result)
    }

    /// Schedule one workload under every strategy and both policies
    pub fn compare(
        &mut self,
        name: &str,
        operations: &[Operation],
        trials: usize,
    ) -> ScheduleResult<Vec<BenchmarkResult>> {
        let mut results = Vec::new();
        for policy in [Policy::Asap, Policy::Alap] {
            for strategy in Strategy::all(trials) {
                results.push(self.bench(name, operations, policy, strategy)?);
            }
        }
        Ok(results)
    }

    // ========================================================================
    // Benchmark Suites
    // ========================================================================

    /// Compare strategies on the structured workloads
    pub fn run_standard(
        &mut self,
        num_qubits: usize,
        trials: usize,
    ) -> ScheduleResult<Vec<BenchmarkResult>> {
        let gen = SequenceGenerator::with_seed(self.seed);
        let workloads = [
            ("ghz", gen.ghz(num_qubits)),
            ("fan_out", gen.fan_out(num_qubits)),
            ("feed_forward", gen.feed_forward(num_qubits)),
            ("layered", gen.layered(num_qubits, 3)),
            ("random", gen.random(num_qubits, 5)),
        ];

        let mut results = Vec::new();
        for (name, ops) in &workloads {
            results.extend(self.compare(name, ops, trials)?);
        }
        Ok(results)
    }

    /// Randomized ASAP search on fan-outs of growing width
    pub fn run_qubit_scaling(
        &mut self,
        max_qubits: usize,
        trials: usize,
    ) -> ScheduleResult<Vec<BenchmarkResult>> {
        let gen = SequenceGenerator::with_seed(self.seed);
        let mut results = Vec::new();

        for n in 2..=max_qubits {
            let name = format!("fan_out_{}q", n);
            let ops = gen.fan_out(n);
            results.push(self.bench(&name, &ops, Policy::Asap, Strategy::Randomized(trials))?);
        }

        Ok(results)
    }

    // ========================================================================
    // Results
    // ========================================================================

    /// Get all results
    pub fn results(&self) -> &[BenchmarkResult] {
        &self.results
    }

    /// Clear results
    pub fn clear(&mut self) {
        self.results.clear();
    }

    /// Get statistics
    pub fn statistics(&self) -> BenchmarkStatistics {
        BenchmarkStatistics::from_results(&self.results)
    }
}

impl Default for BenchSuite {
    fn default() -> Self {
        Self::new()
    }
}

/// Benchmark statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkStatistics {
    /// Number of benchmarks
    pub count: usize,

    /// Average makespan
    pub avg_makespan: f64,

    /// Average critical path / makespan
    pub avg_efficiency: f64,

    /// Worst critical path / makespan
    pub min_efficiency: f64,

    /// Results where a random trial beat the deterministic one
    pub improved_by_search: usize,

    /// Total execution time (microseconds)
    pub total_time_us: u64,
}

impl BenchmarkStatistics {
    /// Compute statistics from results
    pub fn from_results(results: &[BenchmarkResult]) -> Self {
        if results.is_empty() {
            return Self {
                count: 0,
                avg_makespan: 0.0,
                avg_efficiency: 0.0,
                min_efficiency: 0.0,
                improved_by_search: 0,
                total_time_us: 0,
            };
        }

        let count = results.len();
        let efficiencies: Vec<f64> = results.iter().map(|r| r.efficiency()).collect();

        Self {
            count,
            avg_makespan: results.iter().map(|r| r.makespan).sum::<f64>() / count as f64,
            avg_efficiency: efficiencies.iter().sum::<f64>() / count as f64,
            min_efficiency: efficiencies.iter().cloned().fold(f64::INFINITY, f64::min),
            improved_by_search: results.iter().filter(|r| r.best_trial > 0).count(),
            total_time_us: results.iter().map(|r| r.time_us).sum(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_bench_single() {
        let mut suite = BenchSuite::with_seed(1);
        let ops = SequenceGenerator::new().ghz(4);
        let result = suite
            .bench("ghz", &ops, Policy::Asap, Strategy::Deterministic)
            .unwrap();

        assert_eq!(result.operations, 4);
        assert_relative_eq!(result.makespan, 4.0);
        assert_relative_eq!(result.efficiency(), 1.0);
        assert_eq!(suite.results().len(), 1);
    }

    #[test]
    fn test_compare_runs_every_combination() {
        let mut suite = BenchSuite::with_seed(5);
        let ops = SequenceGenerator::new().fan_out(4);
        let results = suite.compare("fan_out", &ops, 10).unwrap();

        assert_eq!(results.len(), 6);
        for r in &results {
            assert!(r.makespan + 1e-9 >= r.critical_path);
        }
    }

    #[test]
    fn test_weighted_suite() {
        let mut suite = BenchSuite::with_seed(3).with_durations(DurationTable::superconducting());
        let ops = SequenceGenerator::new().bell();
        let result = suite
            .bench("bell", &ops, Policy::Asap, Strategy::Deterministic)
            .unwrap();

        assert_relative_eq!(result.makespan, 335.0);
    }

    #[test]
    fn test_run_standard() {
        let mut suite = BenchSuite::with_seed(42);
        let results = suite.run_standard(4, 5).unwrap();

        // 5 workloads x 2 policies x 3 strategies
        assert_eq!(results.len(), 30);
        assert_eq!(suite.statistics().count, 30);
    }

    #[test]
    fn test_qubit_scaling() {
        let mut suite = BenchSuite::with_seed(42);
        let results = suite.run_qubit_scaling(5, 8).unwrap();

        assert_eq!(results.len(), 4);
        assert!(results.iter().all(|r| r.strategy == Strategy::Randomized(8)));
    }

    #[test]
    fn test_statistics() {
        let mut suite = BenchSuite::with_seed(42);
        assert_eq!(suite.statistics().count, 0);

        let ops = SequenceGenerator::new().ghz(3);
        suite.compare("ghz", &ops, 4).unwrap();

        let stats = suite.statistics();
        assert_eq!(stats.count, 6);
        assert!(stats.min_efficiency > 0.0 && stats.min_efficiency <= 1.0 + 1e-9);

        suite.clear();
        assert!(suite.results().is_empty());
    }

    #[test]
    fn test_strategy_display() {
        assert_eq!(Strategy::Deterministic.to_string(), "deterministic");
        assert_eq!(Strategy::CriticalPath.to_string(), "critical-path");
        assert_eq!(Strategy::Randomized(20).to_string(), "random(20)");
    }
}

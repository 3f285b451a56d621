//! QSched Strategy Comparison
//!
//! Schedules the standard workloads under every tie-break strategy, in
//! unit-cycle and superconducting-duration modes, and prints the reports.

use anyhow::{ensure, Context};
use qsched_bench::prelude::*;
use qsched_core::DurationTable;
use qsched_schedule::{Policy, Scheduler, SchedulerConfig};

fn main() -> anyhow::Result<()> {
    let seed = 42u64;
    let qubits = 6;
    let trials = 50;

    println!("QSched Scheduling Benchmark");
    println!("===========================\n");
    println!("Configuration:");
    println!("  Qubits: {}", qubits);
    println!("  Search trials: {}", trials);
    println!("  Seed: {}\n", seed);

    // =========================================================================
    // Unit-cycle comparison
    // =========================================================================
    let mut unit = BenchSuite::with_seed(seed);
    let unit_results = unit
        .run_standard(qubits, trials)
        .context("unit-cycle benchmark failed")?;

    println!("{}", Reporter::to_text(&unit_results));
    println!("{}", Reporter::comparison_table(&unit_results));

    // =========================================================================
    // Superconducting durations
    // =========================================================================
    let mut weighted = BenchSuite::with_seed(seed).with_durations(DurationTable::superconducting());
    let weighted_results = weighted
        .run_standard(qubits, trials)
        .context("weighted benchmark failed")?;

    println!("{}", Reporter::to_markdown(&weighted_results));

    // =========================================================================
    // Fan-out scaling
    // =========================================================================
    let scaling = unit
        .run_qubit_scaling(qubits + 4, trials)
        .context("scaling benchmark failed")?;
    println!("{}", Reporter::report(&scaling, ReportFormat::Csv));

    for r in unit_results.iter().chain(&weighted_results) {
        ensure!(
            r.makespan + 1e-9 >= r.critical_path,
            "{} beat its critical path",
            r.name
        );
    }

    // =========================================================================
    // One schedule in detail
    // =========================================================================
    let ops = SequenceGenerator::with_seed(seed).fan_out(4);
    let config = SchedulerConfig::gate_level()
        .with_policy(Policy::Alap)
        .with_random_shuffle(trials)
        .with_seed(seed);
    let schedule = Scheduler::new(config).schedule(&ops)?;

    println!("{}", schedule);
    for op in schedule.operations() {
        println!("  {}", op);
    }
    if let Some(cycles) = schedule.cycle_partition() {
        println!("  Cycles: {:?}", cycles);
    }

    Ok(())
}

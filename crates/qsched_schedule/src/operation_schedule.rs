//! Operation schedule for QSched
//!
//! The result of a scheduling run: per-operation start and finish times,
//! the makespan, and timing analysis (cycle partition, parallelism,
//! per-resource occupancy, precedence and overlap checks).

use crate::config::{Mode, Policy};
use crate::graph::DependencyGraph;
use crate::list::PassResult;
use crate::scheduled_operation::{ScheduledOperation, TimeSlot};
use qsched_core::constants::timing::TIME_EPSILON;
use qsched_core::{OpId, Operation, Resource};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Complete schedule with timing analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// Scheduled operations, indexed by id
    operations: Vec<ScheduledOperation>,

    /// Latest finish time, 0 when empty
    makespan: f64,

    /// Policy that produced the schedule
    policy: Policy,

    /// Duration mode
    mode: Mode,

    /// Trial that produced the schedule (0 = deterministic)
    best_trial: usize,

    /// Trials executed
    trials_run: usize,
}

impl Schedule {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create a schedule from operation records indexed by id
    pub fn new(operations: Vec<ScheduledOperation>, policy: Policy, mode: Mode) -> Self {
        let makespan = operations.iter().map(|o| o.finish).fold(0.0, f64::max);
        Self {
            operations,
            makespan,
            policy,
            mode,
            best_trial: 0,
            trials_run: 1,
        }
    }

    /// Create a schedule from a list-scheduling pass
    pub fn from_pass(
        operations: &[Operation],
        pass: &PassResult,
        policy: Policy,
        mode: Mode,
    ) -> Self {
        let scheduled = operations
            .iter()
            .enumerate()
            .map(|(id, op)| ScheduledOperation::new(id, op, pass.start[id], pass.finish[id]))
            .collect();
        let mut schedule = Self::new(scheduled, policy, mode);
        schedule.makespan = pass.makespan;
        schedule
    }

    /// Record which search trial won
    pub fn with_search(mut self, best_trial: usize, trials_run: usize) -> Self {
        self.best_trial = best_trial;
        self.trials_run = trials_run;
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Get scheduled operations, indexed by id
    pub fn operations(&self) -> &[ScheduledOperation] {
        &self.operations
    }

    /// Get one scheduled operation
    pub fn get(&self, id: OpId) -> Option<&ScheduledOperation> {
        self.operations.get(id)
    }

    /// Number of operations
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Check if schedule is empty
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Start time per operation id
    pub fn start_times(&self) -> Vec<f64> {
        self.operations.iter().map(|o| o.start).collect()
    }

    /// Finish time per operation id
    pub fn finish_times(&self) -> Vec<f64> {
        self.operations.iter().map(|o| o.finish).collect()
    }

    /// Latest finish time
    pub fn makespan(&self) -> f64 {
        self.makespan
    }

    /// Policy
    pub fn policy(&self) -> Policy {
        self.policy
    }

    /// Duration mode
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Winning trial
    pub fn best_trial(&self) -> usize {
        self.best_trial
    }

    /// Trials executed
    pub fn trials_run(&self) -> usize {
        self.trials_run
    }

    // ========================================================================
    // Cycle Analysis
    // ========================================================================

    /// Start cycle per operation (unit-cycle mode only)
    pub fn start_cycles(&self) -> Option<Vec<usize>> {
        if self.mode != Mode::UnitCycle {
            return None;
        }
        Some(
            self.operations
                .iter()
                .map(|o| o.start.round() as usize)
                .collect(),
        )
    }

    /// Operation ids grouped by start cycle, ascending (unit-cycle mode only)
    ///
    /// Cycles with no starting operation are omitted.
    pub fn cycle_partition(&self) -> Option<Vec<Vec<OpId>>> {
        let cycles = self.start_cycles()?;
        let mut groups: BTreeMap<usize, Vec<OpId>> = BTreeMap::new();
        for (id, cycle) in cycles.into_iter().enumerate() {
            groups.entry(cycle).or_default().push(id);
        }
        Some(groups.into_values().collect())
    }

    /// Number of distinct start times
    pub fn depth(&self) -> usize {
        let mut starts = self.start_times();
        starts.sort_by(|a, b| a.total_cmp(b));
        starts.dedup_by(|a, b| (*a - *b).abs() < TIME_EPSILON);
        starts.len()
    }

    // ========================================================================
    // Parallelism Analysis
    // ========================================================================

    /// Sum of all durations
    pub fn sequential_duration(&self) -> f64 {
        self.operations.iter().map(|o| o.duration()).sum()
    }

    /// Sequential duration over makespan
    pub fn parallelism_factor(&self) -> f64 {
        if self.makespan <= 0.0 || self.operations.is_empty() {
            return 1.0;
        }
        self.sequential_duration() / self.makespan
    }

    /// Count operations executing at `time`
    pub fn concurrent_at(&self, time: f64) -> usize {
        self.operations
            .iter()
            .filter(|o| o.start <= time && o.finish > time)
            .count()
    }

    /// Maximum number of operations executing at once
    pub fn max_concurrent(&self) -> usize {
        self.operations
            .iter()
            .map(|o| self.concurrent_at(o.start))
            .max()
            .unwrap_or(0)
    }

    // ========================================================================
    // Resource Analysis
    // ========================================================================

    /// Resources used by any operation
    pub fn resources(&self) -> BTreeSet<Resource> {
        self.operations
            .iter()
            .flat_map(|o| o.resources.iter().map(|u| u.resource))
            .collect()
    }

    /// Get operations using `resource`
    pub fn ops_on_resource(&self, resource: Resource) -> Vec<&ScheduledOperation> {
        self.operations
            .iter()
            .filter(|o| o.touches(resource))
            .collect()
    }

    /// Get operations overlapping `[start, end)`
    pub fn ops_in_range(&self, start: f64, end: f64) -> Vec<&ScheduledOperation> {
        self.operations
            .iter()
            .filter(|o| o.overlaps(start, end))
            .collect()
    }

    /// Occupancy slots on `resource`, by start time
    pub fn occupancy(&self, resource: Resource) -> Vec<TimeSlot> {
        let mut slots: Vec<TimeSlot> = self
            .operations
            .iter()
            .filter_map(|o| o.slot(resource))
            .collect();
        slots.sort_by(|a, b| a.start.total_cmp(&b.start).then(a.op.cmp(&b.op)));
        slots
    }

    /// Time between 0 and the makespan during which `resource` is unused
    pub fn idle_time(&self, resource: Resource) -> f64 {
        let mut busy = 0.0;
        let mut covered_until = 0.0_f64;
        for slot in self.occupancy(resource) {
            let from = slot.start.max(covered_until);
            if slot.end > from {
                busy += slot.end - from;
            }
            covered_until = covered_until.max(slot.end);
        }
        (self.makespan - busy).max(0.0)
    }

    // ========================================================================
    // Consistency Checks
    // ========================================================================

    /// Check that every edge `u → v` has `start(v) >= finish(u)`
    pub fn respects(&self, graph: &DependencyGraph) -> bool {
        graph.edges().iter().all(|&(u, v)| {
            self.operations[v].start + TIME_EPSILON >= self.operations[u].finish
        })
    }

    /// Pairs `(a, b)`, `a < b`, that overlap in time on a resource
    /// at least one of them holds exclusively
    pub fn conflicts(&self) -> Vec<(OpId, OpId)> {
        let mut pairs = BTreeSet::new();
        for resource in self.resources() {
            let slots = self.occupancy(resource);
            for (i, a) in slots.iter().enumerate() {
                for b in &slots[i + 1..] {
                    if b.start >= a.end - TIME_EPSILON {
                        continue;
                    }
                    let oa = &self.operations[a.op];
                    let ob = &self.operations[b.op];
                    if oa.holds_exclusively(resource) || ob.holds_exclusively(resource) {
                        pairs.insert((a.op.min(b.op), a.op.max(b.op)));
                    }
                }
            }
        }
        pairs.into_iter().collect()
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Schedule ({}, {}):", self.policy, self.mode)?;
        writeln!(f, "  Operations: {}", self.operations.len())?;
        writeln!(f, "  Makespan: {:.2}", self.makespan)?;
        writeln!(f, "  Depth: {}", self.depth())?;
        writeln!(f, "  Parallelism: {:.2}x", self.parallelism_factor())?;
        writeln!(f, "  Best trial: {} of {}", self.best_trial, self.trials_run)?;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use qsched_core::SequenceBuilder;

    fn make_test_schedule() -> Schedule {
        // SNOT[0], SNOT[1], CNOT(0→1), measure q0 → c0
        let ops = SequenceBuilder::new(2)
            .snot(0)
            .snot(1)
            .cnot(0, 1)
            .measure(0, 0)
            .build();
        let records = vec![
            ScheduledOperation::new(0, &ops[0], 0.0, 35.0),
            ScheduledOperation::new(1, &ops[1], 0.0, 35.0),
            ScheduledOperation::new(2, &ops[2], 35.0, 335.0),
            ScheduledOperation::new(3, &ops[3], 335.0, 5335.0),
        ];
        Schedule::new(records, Policy::Asap, Mode::Weighted)
    }

    fn unit_schedule(starts: &[f64]) -> Schedule {
        let records = starts
            .iter()
            .enumerate()
            .map(|(id, &s)| ScheduledOperation::new(id, &Operation::new("X", &[id]), s, s + 1.0))
            .collect();
        Schedule::new(records, Policy::Alap, Mode::UnitCycle)
    }

    #[test]
    fn test_schedule_basic() {
        let schedule = make_test_schedule();

        assert_eq!(schedule.len(), 4);
        assert_eq!(schedule.makespan(), 5335.0);
        assert_eq!(schedule.start_times(), vec![0.0, 0.0, 35.0, 335.0]);
        assert_eq!(schedule.best_trial(), 0);
        assert_eq!(schedule.trials_run(), 1);
    }

    #[test]
    fn test_cycle_partition() {
        let schedule = unit_schedule(&[0.0, 2.0, 1.0, 2.0]);

        assert_eq!(schedule.start_cycles(), Some(vec![0, 2, 1, 2]));
        assert_eq!(
            schedule.cycle_partition(),
            Some(vec![vec![0], vec![2], vec![1, 3]])
        );
    }

    #[test]
    fn test_cycle_partition_skips_empty_cycles() {
        let schedule = unit_schedule(&[0.0, 3.0]);
        assert_eq!(schedule.cycle_partition(), Some(vec![vec![0], vec![1]]));
    }

    #[test]
    fn test_no_cycles_in_weighted_mode() {
        assert_eq!(make_test_schedule().cycle_partition(), None);
        assert_eq!(make_test_schedule().start_cycles(), None);
    }

    #[test]
    fn test_depth() {
        // Layers: 0 (SNOT, SNOT), 35 (CNOT), 335 (measure)
        assert_eq!(make_test_schedule().depth(), 3);
    }

    #[test]
    fn test_parallelism_factor() {
        let schedule = make_test_schedule();

        // Sequential: 35+35+300+5000 = 5370
        assert_relative_eq!(schedule.sequential_duration(), 5370.0);
        assert_relative_eq!(schedule.parallelism_factor(), 5370.0 / 5335.0);

        let empty = Schedule::new(Vec::new(), Policy::Asap, Mode::UnitCycle);
        assert_eq!(empty.parallelism_factor(), 1.0);
        assert_eq!(empty.makespan(), 0.0);
    }

    #[test]
    fn test_concurrency() {
        let schedule = make_test_schedule();

        assert_eq!(schedule.concurrent_at(0.0), 2);
        assert_eq!(schedule.concurrent_at(100.0), 1);
        assert_eq!(schedule.max_concurrent(), 2);
    }

    #[test]
    fn test_resource_queries() {
        let schedule = make_test_schedule();

        assert_eq!(schedule.ops_on_resource(Resource::Qubit(0)).len(), 3);
        assert_eq!(schedule.ops_on_resource(Resource::Clbit(0)).len(), 1);
        assert_eq!(schedule.ops_in_range(30.0, 40.0).len(), 3);

        let slots = schedule.occupancy(Resource::Qubit(1));
        assert_eq!(slots.iter().map(|s| s.op).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_idle_time() {
        let schedule = make_test_schedule();

        // q1 busy 0..335, idle for the measurement
        assert_relative_eq!(schedule.idle_time(Resource::Qubit(1)), 5000.0);
        assert_relative_eq!(schedule.idle_time(Resource::Qubit(0)), 0.0);
    }

    #[test]
    fn test_conflicts() {
        assert!(make_test_schedule().conflicts().is_empty());

        let ops = vec![Operation::new("X", &[0]), Operation::new("Y", &[0])];
        let records = vec![
            ScheduledOperation::new(0, &ops[0], 0.0, 2.0),
            ScheduledOperation::new(1, &ops[1], 1.0, 2.0),
        ];
        let bad = Schedule::new(records, Policy::Asap, Mode::Weighted);
        assert_eq!(bad.conflicts(), vec![(0, 1)]);
    }

    #[test]
    fn test_shared_reads_are_not_conflicts() {
        let ops = vec![
            Operation::new("X", &[1]).with_classical_reads(&[0]),
            Operation::new("X", &[2]).with_classical_reads(&[0]),
        ];
        let records = vec![
            ScheduledOperation::new(0, &ops[0], 1.0, 2.0),
            ScheduledOperation::new(1, &ops[1], 1.0, 2.0),
        ];
        let schedule = Schedule::new(records, Policy::Asap, Mode::UnitCycle);
        assert!(schedule.conflicts().is_empty());
    }

    #[test]
    fn test_with_search() {
        let schedule = unit_schedule(&[0.0]).with_search(3, 5);
        assert_eq!(schedule.best_trial(), 3);
        assert_eq!(schedule.trials_run(), 5);
    }

    #[test]
    fn test_display() {
        let text = make_test_schedule().to_string();
        assert!(text.contains("Schedule (ASAP, weighted):"));
        assert!(text.contains("Makespan: 5335.00"));
    }

    #[test]
    fn test_json_roundtrip() {
        let schedule = unit_schedule(&[0.0, 1.0]);
        let json = serde_json::to_string(&schedule).unwrap();
        let parsed: Schedule = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, schedule);
    }
}

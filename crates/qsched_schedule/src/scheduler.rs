//! Operation scheduler for QSched
//!
//! Ties configuration, commutation rules, graph construction, list
//! scheduling, and the randomized search together.

use crate::commutation::CommutationRules;
use crate::config::{Mode, Policy, SchedulerConfig};
use crate::graph::DependencyGraph;
use crate::list::{ListScheduler, TieBreak};
use crate::operation_schedule::Schedule;
use crate::search::RandomizedSearch;
use log::{debug, info};
use qsched_core::{Operation, ScheduleError, ScheduleResult};

/// Operation scheduler
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    config: SchedulerConfig,
    rules: CommutationRules,
}

impl Scheduler {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Scheduler with the standard commutation rules
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            rules: CommutationRules::standard(),
        }
    }

    /// Replace the commutation rules
    pub fn with_rules(mut self, rules: CommutationRules) -> Self {
        self.rules = rules;
        self
    }

    /// Get configuration
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Get commutation rules
    pub fn rules(&self) -> &CommutationRules {
        &self.rules
    }

    // ========================================================================
    // Graph Construction
    // ========================================================================

    /// Validate `operations` against the declared registers and build
    /// their dependency graph
    pub fn build_graph(&self, operations: &[Operation]) -> ScheduleResult<DependencyGraph> {
        DependencyGraph::build_with_limits(operations, &self.rules, &self.config.limits())
    }

    /// Duration per operation for the configured mode
    pub fn durations(&self, operations: &[Operation]) -> Vec<f64> {
        match self.config.mode {
            Mode::UnitCycle => vec![1.0; operations.len()],
            Mode::Weighted => self.config.durations.resolve(operations),
        }
    }

    // ========================================================================
    // Scheduling
    // ========================================================================

    /// Schedule `operations` with the configured policy
    pub fn schedule(&self, operations: &[Operation]) -> ScheduleResult<Schedule> {
        self.config.validate()?;
        let graph = self.build_graph(operations)?;
        self.schedule_graph(operations, &graph)
    }

    /// Schedule with a graph built earlier by [`Scheduler::build_graph`]
    ///
    /// Lets ASAP and ALAP share one graph.
    pub fn schedule_graph(
        &self,
        operations: &[Operation],
        graph: &DependencyGraph,
    ) -> ScheduleResult<Schedule> {
        self.config.validate()?;
        if graph.len() != operations.len() {
            return Err(ScheduleError::InvalidConfig(format!(
                "graph has {} operations, sequence has {}",
                graph.len(),
                operations.len()
            )));
        }

        let scheduler = ListScheduler::new(graph, self.durations(operations))
            .with_critical_path_priority(self.config.critical_path_priority);
        let search = RandomizedSearch::from_config(&self.config)?;
        let outcome = search.run(&scheduler, self.config.policy);

        info!(
            "scheduled {} operations ({}, {}): makespan {}",
            operations.len(),
            self.config.policy,
            self.config.mode,
            outcome.pass.makespan
        );

        Ok(
            Schedule::from_pass(operations, &outcome.pass, self.config.policy, self.config.mode)
                .with_search(outcome.best_trial, outcome.trials_run),
        )
    }

    /// ASAP schedule regardless of the configured policy
    pub fn asap(&self, operations: &[Operation]) -> ScheduleResult<Schedule> {
        self.with_policy(Policy::Asap).schedule(operations)
    }

    /// ALAP schedule regardless of the configured policy
    pub fn alap(&self, operations: &[Operation]) -> ScheduleResult<Schedule> {
        self.with_policy(Policy::Alap).schedule(operations)
    }

    fn with_policy(&self, policy: Policy) -> Self {
        Self {
            config: self.config.clone().with_policy(policy),
            rules: self.rules.clone(),
        }
    }

    // ========================================================================
    // Analysis
    // ========================================================================

    /// Per-operation slack: deterministic ALAP start minus ASAP start
    ///
    /// Both passes share one graph, the id tie-break and the ASAP
    /// makespan, so every entry is non-negative.
    pub fn slack(&self, operations: &[Operation]) -> ScheduleResult<Vec<f64>> {
        self.config.validate()?;
        let graph = self.build_graph(operations)?;
        let scheduler = ListScheduler::new(&graph, self.durations(operations))
            .with_critical_path_priority(self.config.critical_path_priority);

        let asap = scheduler.asap(&TieBreak::ById);
        let alap = scheduler.alap(&TieBreak::ById);
        debug!("slack against makespan {}", asap.makespan);

        Ok(asap
            .start
            .iter()
            .zip(&alap.start)
            .map(|(early, late)| late - early)
            .collect())
    }

    /// Critical-path length of `operations` under the configured mode
    pub fn critical_path_length(&self, operations: &[Operation]) -> ScheduleResult<f64> {
        let graph = self.build_graph(operations)?;
        Ok(graph.critical_path_length(&self.durations(operations)))
    }
}

/// Schedule `operations` with the standard commutation rules
///
/// Weighted mode takes durations from the operations themselves, falling
/// back to one time unit. `trials > 1` enables the randomized search.
pub fn schedule(
    operations: &[Operation],
    policy: Policy,
    mode: Mode,
    trials: usize,
    seed: u64,
) -> ScheduleResult<Schedule> {
    let mut config = SchedulerConfig::gate_level()
        .with_policy(policy)
        .with_mode(mode)
        .with_seed(seed);
    if trials != 1 {
        config = config.with_random_shuffle(trials);
    }
    Scheduler::new(config).schedule(operations)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use qsched_core::{DurationTable, SequenceBuilder};

    fn chain_ops() -> Vec<Operation> {
        SequenceBuilder::new(3)
            .x(0)
            .iswap(1, 2)
            .duration(3.5)
            .x(2)
            .y(0)
            .x(0)
            .build()
    }

    #[test]
    fn test_unit_mode_ignores_durations() {
        let scheduler = Scheduler::default();
        let schedule = scheduler.schedule(&chain_ops()).unwrap();

        assert_eq!(schedule.start_times(), vec![0.0, 0.0, 1.0, 1.0, 2.0]);
        assert_relative_eq!(schedule.makespan(), 3.0);
    }

    #[test]
    fn test_weighted_mode() {
        let config = SchedulerConfig::instruction_level(DurationTable::unit());
        let schedule = Scheduler::new(config).schedule(&chain_ops()).unwrap();

        assert_eq!(schedule.start_times(), vec![0.0, 0.0, 3.5, 1.0, 2.0]);
        assert_relative_eq!(schedule.makespan(), 4.5);
    }

    #[test]
    fn test_weighted_mode_uses_table() {
        let ops = SequenceBuilder::new(2).snot(0).cnot(0, 1).build();
        let config = SchedulerConfig::instruction_level(DurationTable::superconducting());
        let schedule = Scheduler::new(config).schedule(&ops).unwrap();

        assert_eq!(schedule.start_times(), vec![0.0, 35.0]);
        assert_relative_eq!(schedule.makespan(), 335.0);
    }

    #[test]
    fn test_asap_and_alap() {
        let ops = SequenceBuilder::new(3).snot(0).cnot(0, 1).cnot(0, 2).snot(2).build();
        let scheduler = Scheduler::default();

        let alap = scheduler.alap(&ops).unwrap();
        assert_eq!(alap.start_times(), vec![1.0, 3.0, 2.0, 3.0]);
        assert_eq!(alap.policy(), Policy::Alap);

        let asap = scheduler.asap(&ops).unwrap();
        assert_relative_eq!(asap.makespan(), 4.0);
    }

    #[test]
    fn test_shared_graph() {
        let ops = chain_ops();
        let scheduler = Scheduler::default();
        let graph = scheduler.build_graph(&ops).unwrap();

        let direct = scheduler.schedule(&ops).unwrap();
        let cached = scheduler.schedule_graph(&ops, &graph).unwrap();
        assert_eq!(direct, cached);

        let err = scheduler.schedule_graph(&ops[..2], &graph).unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_registers_enforced() {
        let config = SchedulerConfig::default().with_registers(2, 0);
        let err = Scheduler::new(config).schedule(&chain_ops()).unwrap_err();
        assert!(matches!(err, ScheduleError::UnknownResource { op: 1, .. }));
    }

    #[test]
    fn test_custom_rules() {
        let ops = SequenceBuilder::new(3).snot(0).cnot(0, 1).cnot(0, 2).build();
        let scheduler = Scheduler::default().with_rules(CommutationRules::new());
        let graph = scheduler.build_graph(&ops).unwrap();

        assert!(graph.has_edge(1, 2));
        assert!(scheduler.rules().is_empty());
    }

    #[test]
    fn test_slack() {
        let scheduler = Scheduler::default();
        let slack = scheduler.slack(&chain_ops()).unwrap();

        // q0 chain is three cycles long; the q1/q2 branch has one to spare
        assert_eq!(slack, vec![0.0, 1.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_slack_with_contended_control() {
        let ops = SequenceBuilder::new(3).snot(0).cnot(0, 1).cnot(0, 2).snot(2).build();
        let slack = Scheduler::default().slack(&ops).unwrap();

        assert_eq!(slack, vec![1.0, 2.0, 0.0, 0.0]);
    }

    #[test]
    fn test_critical_path_length() {
        let config = SchedulerConfig::instruction_level(DurationTable::unit());
        let length = Scheduler::new(config)
            .critical_path_length(&chain_ops())
            .unwrap();
        assert_relative_eq!(length, 4.5);
    }

    #[test]
    fn test_schedule_function() {
        let ops = chain_ops();

        let unit = schedule(&ops, Policy::Asap, Mode::UnitCycle, 1, 0).unwrap();
        assert_eq!(unit.start_times(), vec![0.0, 0.0, 1.0, 1.0, 2.0]);
        assert_eq!(unit.trials_run(), 1);

        let weighted = schedule(&ops, Policy::Asap, Mode::Weighted, 1, 0).unwrap();
        assert_eq!(weighted.start_times(), vec![0.0, 0.0, 3.5, 1.0, 2.0]);

        assert_eq!(
            schedule(&ops, Policy::Asap, Mode::UnitCycle, 0, 0).unwrap_err(),
            ScheduleError::InvalidTrialCount(0)
        );
    }
}

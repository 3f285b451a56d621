//! List scheduling passes
//!
//! Places operations in a topological order of the dependency graph. Each
//! operation starts at the latest of its predecessors' finish times and the
//! time its exclusive resources become free, so commuting operations that
//! share a qubit are serialized in placement order rather than overlapped.
//!
//! ALAP runs the same pass on the reversed graph and mirrors the result
//! against the ASAP makespan. The reversed pass may serialize commuting
//! operations in a different order than ASAP did; if the mirrored times
//! would start any operation before its ASAP start, or overrun the ASAP
//! horizon, the ASAP placement is instead retimed backwards with every
//! exclusive resource keeping its ASAP order.

use crate::config::Policy;
use crate::graph::DependencyGraph;
use log::{debug, trace};
use qsched_core::constants::timing::TIME_EPSILON;
use qsched_core::{OpId, Resource};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;

/// Ordering among operations that are ready at the same time
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TieBreak {
    /// Ascending operation id
    #[default]
    ById,
    /// `ranks[id]`, lowest first
    Ranked(Vec<usize>),
}

impl TieBreak {
    /// Uniformly random ranks for `n` operations
    pub fn shuffled<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Self {
        let mut ranks: Vec<usize> = (0..n).collect();
        ranks.shuffle(rng);
        TieBreak::Ranked(ranks)
    }

    fn rank(&self, id: OpId) -> usize {
        match self {
            TieBreak::ById => id,
            TieBreak::Ranked(ranks) => ranks[id],
        }
    }
}

/// Outcome of one list-scheduling pass
#[derive(Debug, Clone, PartialEq)]
pub struct PassResult {
    /// Start time per operation id
    pub start: Vec<f64>,
    /// Finish time per operation id
    pub finish: Vec<f64>,
    /// Latest finish, 0 when empty
    pub makespan: f64,
    /// Placement order
    pub order: Vec<OpId>,
}

/// List scheduler over a borrowed dependency graph
#[derive(Debug, Clone)]
pub struct ListScheduler<'g> {
    graph: &'g DependencyGraph,
    durations: Vec<f64>,
    critical_path_priority: bool,
}

impl<'g> ListScheduler<'g> {
    /// Scheduler with one duration per operation
    ///
    /// # Panics
    /// If `durations` does not match the graph size.
    pub fn new(graph: &'g DependencyGraph, durations: Vec<f64>) -> Self {
        assert_eq!(
            durations.len(),
            graph.len(),
            "one duration per operation is required"
        );
        Self {
            graph,
            durations,
            critical_path_priority: false,
        }
    }

    /// Scheduler with every duration set to one cycle
    pub fn unit(graph: &'g DependencyGraph) -> Self {
        Self::new(graph, vec![1.0; graph.len()])
    }

    /// Prefer ready operations with the longest remaining path
    pub fn with_critical_path_priority(mut self, enabled: bool) -> Self {
        self.critical_path_priority = enabled;
        self
    }

    /// Durations in use
    pub fn durations(&self) -> &[f64] {
        &self.durations
    }

    /// Graph being scheduled
    pub fn graph(&self) -> &DependencyGraph {
        self.graph
    }

    /// Run the pass for `policy`
    pub fn run(&self, policy: Policy, tie_break: &TieBreak) -> PassResult {
        match policy {
            Policy::Asap => self.asap(tie_break),
            Policy::Alap => self.alap(tie_break),
        }
    }

    /// Earliest-start pass
    pub fn asap(&self, tie_break: &TieBreak) -> PassResult {
        self.forward_pass(self.graph, tie_break)
    }

    /// Latest-start pass against the ASAP horizon
    ///
    /// Every operation starts no earlier than in [`ListScheduler::asap`]
    /// with the same tie-break, and both passes share one makespan.
    pub fn alap(&self, tie_break: &TieBreak) -> PassResult {
        let early = self.forward_pass(self.graph, tie_break);
        let reversed = self.graph.reversed();
        let mirror = self.forward_pass(&reversed, tie_break);
        let horizon = early.makespan;

        let start: Vec<f64> = mirror.finish.iter().map(|&f| horizon - f).collect();
        let mirrored_fits = mirror.makespan <= horizon + TIME_EPSILON
            && start
                .iter()
                .zip(&early.start)
                .all(|(late, asap)| late + TIME_EPSILON >= *asap);

        if !mirrored_fits {
            debug!(
                "mirrored ALAP (makespan {}) does not fit ASAP horizon {}, retiming",
                mirror.makespan, horizon
            );
            return self.backward_pass(&early);
        }

        let finish = start
            .iter()
            .zip(&self.durations)
            .map(|(s, d)| s + d)
            .collect();

        PassResult {
            start,
            finish,
            makespan: horizon,
            order: mirror.order,
        }
    }

    fn forward_pass(&self, graph: &DependencyGraph, tie_break: &TieBreak) -> PassResult {
        let n = graph.len();
        let priority = if self.critical_path_priority {
            descending_ranks(&graph.tail_lengths(&self.durations))
        } else {
            vec![0; n]
        };
        let order = graph.topological_order_by(|v| (priority[v], tie_break.rank(v)));

        let mut start = vec![0.0; n];
        let mut finish = vec![0.0; n];
        let mut busy_until: HashMap<Resource, f64> = HashMap::new();

        for &v in &order {
            let ready = graph
                .predecessors(v)
                .iter()
                .map(|&u| finish[u])
                .fold(0.0, f64::max);
            let free = graph
                .exclusive_resources(v)
                .iter()
                .filter_map(|r| busy_until.get(r))
                .copied()
                .fold(0.0, f64::max);

            start[v] = ready.max(free);
            finish[v] = start[v] + self.durations[v];

            for &r in graph.exclusive_resources(v) {
                let slot = busy_until.entry(r).or_insert(0.0);
                *slot = slot.max(finish[v]);
            }
            trace!(
                "placed op {} at {} (deps ready {}, resources free {})",
                v,
                start[v],
                ready,
                free
            );
        }

        let makespan = finish.iter().copied().fold(0.0, f64::max);
        PassResult {
            start,
            finish,
            makespan,
            order,
        }
    }

    /// Push each operation of an ASAP pass as late as its successors, its
    /// exclusive resources and the ASAP makespan allow
    ///
    /// Operations are visited by descending ASAP start, so each resource is
    /// handed back in the order ASAP used it and no start moves earlier.
    fn backward_pass(&self, early: &PassResult) -> PassResult {
        let n = self.graph.len();
        let horizon = early.makespan;
        let mut order: Vec<OpId> = (0..n).collect();
        order.sort_by(|&a, &b| early.start[b].total_cmp(&early.start[a]).then(b.cmp(&a)));

        let mut start = vec![0.0; n];
        let mut finish = vec![0.0; n];
        let mut free_from: HashMap<Resource, f64> = HashMap::new();

        for &v in &order {
            let due = self
                .graph
                .successors(v)
                .iter()
                .map(|&w| start[w])
                .fold(horizon, f64::min);
            let held = self
                .graph
                .exclusive_resources(v)
                .iter()
                .filter_map(|r| free_from.get(r))
                .copied()
                .fold(horizon, f64::min);

            finish[v] = due.min(held);
            start[v] = finish[v] - self.durations[v];

            for &r in self.graph.exclusive_resources(v) {
                let slot = free_from.entry(r).or_insert(horizon);
                *slot = slot.min(start[v]);
            }
        }

        order.reverse();
        PassResult {
            start,
            finish,
            makespan: horizon,
            order,
        }
    }
}

/// Dense ranks, largest value first; values within epsilon share a rank
fn descending_ranks(values: &[f64]) -> Vec<usize> {
    let mut ids: Vec<usize> = (0..values.len()).collect();
    ids.sort_by(|&a, &b| values[b].total_cmp(&values[a]).then(a.cmp(&b)));

    let mut ranks = vec![0; values.len()];
    let mut rank = 0;
    for (i, &id) in ids.iter().enumerate() {
        if i > 0 && (values[ids[i - 1]] - values[id]).abs() > TIME_EPSILON {
            rank += 1;
        }
        ranks[id] = rank;
    }
    ranks
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commutation::CommutationRules;
    use approx::assert_relative_eq;
    use qsched_core::{Operation, SequenceBuilder};

    fn graph(ops: &[Operation]) -> DependencyGraph {
        DependencyGraph::build(ops, &CommutationRules::standard()).unwrap()
    }

    fn chain_ops() -> Vec<Operation> {
        SequenceBuilder::new(3).x(0).iswap(1, 2).x(2).y(0).x(0).build()
    }

    fn fan_ops() -> Vec<Operation> {
        SequenceBuilder::new(3).snot(0).cnot(0, 1).cnot(0, 2).snot(2).build()
    }

    #[test]
    fn test_unit_asap() {
        let g = graph(&chain_ops());
        let pass = ListScheduler::unit(&g).asap(&TieBreak::ById);

        assert_eq!(pass.start, vec![0.0, 0.0, 1.0, 1.0, 2.0]);
        assert_relative_eq!(pass.makespan, 3.0);
    }

    #[test]
    fn test_weighted_asap() {
        let g = graph(&chain_ops());
        let pass = ListScheduler::new(&g, vec![1.0, 3.5, 1.0, 1.0, 1.0]).asap(&TieBreak::ById);

        assert_eq!(pass.start, vec![0.0, 0.0, 3.5, 1.0, 2.0]);
        assert_relative_eq!(pass.makespan, 4.5);
    }

    #[test]
    fn test_unit_alap() {
        let g = graph(&fan_ops());
        let pass = ListScheduler::unit(&g).alap(&TieBreak::ById);

        // Measured against the ASAP horizon of 4
        assert_eq!(pass.start, vec![1.0, 3.0, 2.0, 3.0]);
        assert_relative_eq!(pass.makespan, 4.0);
    }

    #[test]
    fn test_alap_never_starts_before_asap() {
        let g = graph(&fan_ops());
        let scheduler = ListScheduler::unit(&g);

        for tie_break in [TieBreak::ById, TieBreak::Ranked(vec![0, 2, 1, 3])] {
            let early = scheduler.asap(&tie_break);
            let late = scheduler.alap(&tie_break);

            assert_relative_eq!(early.makespan, late.makespan);
            for (e, l) in early.start.iter().zip(&late.start) {
                assert!(l >= e, "ALAP {:?} before ASAP {:?}", late.start, early.start);
            }
        }
    }

    #[test]
    fn test_backward_pass_keeps_asap_resource_order() {
        let g = graph(&fan_ops());
        let scheduler = ListScheduler::unit(&g);
        let early = scheduler.asap(&TieBreak::ById);
        let late = scheduler.backward_pass(&early);

        // CNOT(0,1) keeps q0 ahead of CNOT(0,2), so nothing can move
        assert_eq!(late.start, early.start);
        assert_relative_eq!(late.makespan, 4.0);
    }

    #[test]
    fn test_backward_pass_weighted() {
        let g = graph(&chain_ops());
        let scheduler = ListScheduler::new(&g, vec![1.0, 3.5, 1.0, 1.0, 1.0]);
        let late = scheduler.backward_pass(&scheduler.asap(&TieBreak::ById));

        assert_eq!(late.start, vec![1.5, 0.0, 3.5, 2.5, 3.5]);
        assert_eq!(late.order.len(), 5);
    }

    #[test]
    fn test_alap_chain_matches_asap() {
        let ops = SequenceBuilder::new(1).x(0).y(0).z(0).build();
        let g = graph(&ops);
        let scheduler = ListScheduler::unit(&g);

        assert_eq!(
            scheduler.asap(&TieBreak::ById).start,
            scheduler.alap(&TieBreak::ById).start
        );
    }

    #[test]
    fn test_weighted_alap_pushes_short_branch_late() {
        let g = graph(&chain_ops());
        let pass = ListScheduler::new(&g, vec![1.0, 3.5, 1.0, 1.0, 1.0]).alap(&TieBreak::ById);

        // q0 chain (3 cycles) finishes with the ISWAP branch at 4.5
        assert_eq!(pass.start, vec![1.5, 0.0, 3.5, 2.5, 3.5]);
        assert_relative_eq!(pass.makespan, 4.5);
    }

    #[test]
    fn test_commuting_ops_do_not_overlap() {
        let g = graph(&fan_ops());
        let pass = ListScheduler::unit(&g).asap(&TieBreak::ById);

        // The two CNOTs share control q0 and run back to back
        assert_eq!(pass.start, vec![0.0, 1.0, 2.0, 3.0]);
        assert_relative_eq!(pass.makespan, 4.0);
    }

    #[test]
    fn test_tie_break_changes_makespan() {
        let g = graph(&fan_ops());
        let pass = ListScheduler::unit(&g).asap(&TieBreak::Ranked(vec![0, 2, 1, 3]));

        assert_eq!(pass.start, vec![0.0, 2.0, 1.0, 2.0]);
        assert_relative_eq!(pass.makespan, 3.0);
    }

    #[test]
    fn test_critical_path_priority() {
        let g = graph(&fan_ops());
        let pass = ListScheduler::unit(&g)
            .with_critical_path_priority(true)
            .asap(&TieBreak::ById);

        assert_relative_eq!(pass.makespan, 3.0);
        assert_eq!(pass.order, vec![0, 2, 1, 3]);
    }

    #[test]
    fn test_shared_reads_may_overlap() {
        let ops = SequenceBuilder::new(3)
            .measure(0, 0)
            .conditioned("X", &[1], &[0])
            .conditioned("X", &[2], &[0])
            .build();
        let g = graph(&ops);
        let pass = ListScheduler::unit(&g).asap(&TieBreak::ById);

        assert_eq!(pass.start, vec![0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_shuffled_is_a_permutation() {
        use rand::SeedableRng;
        use rand_chacha::ChaCha8Rng;

        let mut rng = ChaCha8Rng::seed_from_u64(3);
        match TieBreak::shuffled(6, &mut rng) {
            TieBreak::Ranked(mut ranks) => {
                ranks.sort_unstable();
                assert_eq!(ranks, vec![0, 1, 2, 3, 4, 5]);
            }
            TieBreak::ById => panic!("expected ranks"),
        }
    }

    #[test]
    fn test_descending_ranks() {
        assert_eq!(descending_ranks(&[1.0, 3.0, 2.0, 3.0]), vec![2, 0, 1, 0]);
        assert!(descending_ranks(&[]).is_empty());
    }

    #[test]
    fn test_empty_graph() {
        let g = graph(&[]);
        let pass = ListScheduler::unit(&g).alap(&TieBreak::ById);

        assert!(pass.start.is_empty());
        assert_eq!(pass.makespan, 0.0);
    }
}

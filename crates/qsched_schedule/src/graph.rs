//! Dependency graph builder
//!
//! Builds the precedence DAG over operation ids from the input sequence
//! and a commutation rule set, in one linear scan.
//!
//! Per resource the builder keeps a *chain*: the group of mutually
//! commuting operations seen since the last non-commuting one, and the
//! anchors that group depends on. A new operation either joins the group
//! (inheriting the anchors as predecessors) or closes it (depending on
//! every member, which become the new anchors). Edges only point from
//! earlier to later positions, so the graph is acyclic.

use crate::commutation::CommutationRules;
use log::debug;
use qsched_core::{
    validate_sequence, OpId, Operation, Resource, ResourceLimits, Role, ScheduleResult,
};
use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap, HashMap};

/// Per-resource bookkeeping during construction
#[derive(Debug, Default)]
struct ResourceChain {
    /// Operations the current group must follow
    anchors: Vec<OpId>,
    /// Mutually commuting operations since the last non-commuting one
    group: Vec<OpId>,
}

/// Precedence DAG over operation ids
#[derive(Debug, Clone, PartialEq)]
pub struct DependencyGraph {
    predecessors: Vec<Vec<OpId>>,
    successors: Vec<Vec<OpId>>,
    /// Resources each operation holds exclusively while it runs
    exclusive: Vec<Vec<Resource>>,
    num_edges: usize,
}

impl DependencyGraph {
    // ========================================================================
    // Construction
    // ========================================================================

    /// Validate `operations` and build their dependency graph
    pub fn build(operations: &[Operation], rules: &CommutationRules) -> ScheduleResult<Self> {
        Self::build_with_limits(operations, rules, &ResourceLimits::unbounded())
    }

    /// Validate against declared register sizes, then build
    pub fn build_with_limits(
        operations: &[Operation],
        rules: &CommutationRules,
        limits: &ResourceLimits,
    ) -> ScheduleResult<Self> {
        validate_sequence(operations, limits)?;
        Ok(Self::from_validated(operations, rules))
    }

    fn from_validated(operations: &[Operation], rules: &CommutationRules) -> Self {
        let n = operations.len();
        let mut predecessors = vec![Vec::new(); n];
        let mut successors = vec![Vec::new(); n];
        let mut chains: HashMap<Resource, ResourceChain> = HashMap::new();
        let mut num_edges = 0;

        for (v, op) in operations.iter().enumerate() {
            let mut preds: BTreeSet<OpId> = BTreeSet::new();

            for resource in op.resource_ids() {
                let chain = chains.entry(resource).or_default();

                let commutes_with_group = chain
                    .group
                    .iter()
                    .all(|&u| rules.may_reorder(&operations[u], op));

                if commutes_with_group {
                    preds.extend(chain.anchors.iter().copied());
                    chain.group.push(v);
                } else {
                    preds.extend(chain.group.iter().copied());
                    chain.anchors = std::mem::replace(&mut chain.group, vec![v]);
                }
            }

            for u in preds {
                predecessors[v].push(u);
                successors[u].push(v);
                num_edges += 1;
            }
        }

        let exclusive = operations
            .iter()
            .map(|op| {
                op.resources()
                    .into_iter()
                    .filter(|u| u.role != Role::Read)
                    .map(|u| u.resource)
                    .collect()
            })
            .collect();

        debug!(
            "built dependency graph: {} operations, {} edges, {} resources",
            n,
            num_edges,
            chains.len()
        );

        Self {
            predecessors,
            successors,
            exclusive,
            num_edges,
        }
    }

    /// Same graph with every edge reversed
    pub fn reversed(&self) -> Self {
        Self {
            predecessors: self.successors.clone(),
            successors: self.predecessors.clone(),
            exclusive: self.exclusive.clone(),
            num_edges: self.num_edges,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Number of operations
    pub fn len(&self) -> usize {
        self.predecessors.len()
    }

    /// Check if graph has no operations
    pub fn is_empty(&self) -> bool {
        self.predecessors.is_empty()
    }

    /// Number of edges
    pub fn num_edges(&self) -> usize {
        self.num_edges
    }

    /// Direct predecessors of `id`, ascending
    pub fn predecessors(&self, id: OpId) -> &[OpId] {
        &self.predecessors[id]
    }

    /// Direct successors of `id`, ascending
    pub fn successors(&self, id: OpId) -> &[OpId] {
        &self.successors[id]
    }

    /// Resources `id` holds exclusively (everything but classical reads)
    pub fn exclusive_resources(&self, id: OpId) -> &[Resource] {
        &self.exclusive[id]
    }

    /// Check for a direct edge `from → to`
    pub fn has_edge(&self, from: OpId, to: OpId) -> bool {
        self.successors
            .get(from)
            .map_or(false, |s| s.binary_search(&to).is_ok())
    }

    /// All edges as `(from, to)`, ordered by `to` then `from`
    pub fn edges(&self) -> Vec<(OpId, OpId)> {
        self.predecessors
            .iter()
            .enumerate()
            .flat_map(|(v, preds)| preds.iter().map(move |&u| (u, v)))
            .collect()
    }

    /// Operations with no predecessors
    pub fn roots(&self) -> Vec<OpId> {
        (0..self.len())
            .filter(|&v| self.predecessors[v].is_empty())
            .collect()
    }

    /// Operations with no successors
    pub fn leaves(&self) -> Vec<OpId> {
        (0..self.len())
            .filter(|&v| self.successors[v].is_empty())
            .collect()
    }

    // ========================================================================
    // Traversal
    // ========================================================================

    /// Topological order with ascending-id tie-break
    pub fn topological_order(&self) -> Vec<OpId> {
        self.topological_order_by(|v| v)
    }

    /// Topological order; among ready operations the smallest key goes first
    ///
    /// # Panics
    /// If the graph has a cycle. The builder never produces one.
    pub fn topological_order_by<K, F>(&self, key: F) -> Vec<OpId>
    where
        K: Ord,
        F: Fn(OpId) -> K,
    {
        let n = self.len();
        let mut indegree: Vec<usize> = self.predecessors.iter().map(Vec::len).collect();
        let mut ready: BinaryHeap<Reverse<(K, OpId)>> = (0..n)
            .filter(|&v| indegree[v] == 0)
            .map(|v| Reverse((key(v), v)))
            .collect();
        let mut order = Vec::with_capacity(n);

        while let Some(Reverse((_, v))) = ready.pop() {
            order.push(v);
            for &w in &self.successors[v] {
                indegree[w] -= 1;
                if indegree[w] == 0 {
                    ready.push(Reverse((key(w), w)));
                }
            }
        }

        assert_eq!(
            order.len(),
            n,
            "dependency graph contains a cycle: a commutation rule is defective"
        );
        order
    }

    /// Longest path from each operation to a sink, including its own duration
    pub fn tail_lengths(&self, durations: &[f64]) -> Vec<f64> {
        let mut tail = vec![0.0; self.len()];
        for &v in self.topological_order().iter().rev() {
            let longest_after = self.successors[v]
                .iter()
                .map(|&w| tail[w])
                .fold(0.0, f64::max);
            tail[v] = durations[v] + longest_after;
        }
        tail
    }

    /// Length of the longest weighted path (lower bound on any makespan)
    pub fn critical_path_length(&self, durations: &[f64]) -> f64 {
        self.tail_lengths(durations).into_iter().fold(0.0, f64::max)
    }
}

// ============================================================================
// Tests
// ============================================================================

//! Commutation rules for QSched
//!
//! A rule set decides whether two operations that share at least one
//! resource may be reordered. Rules are evaluated in registration order
//! and the first rule with an opinion wins; with no opinion the pair is
//! non-commuting.
//!
//! Built-in rules (in `CommutationRules::standard()` order):
//! - [`IdenticalRule`]: same kind on the same resources with the same
//!   roles. Commutes only for kinds whitelisted as repeat-safe.
//! - [`SharedControlRule`]: two controlled operations that overlap only
//!   on resources both of them use as controls.
//! - [`SharedReadRule`]: two operations that overlap only on classical
//!   bits both of them only read.
//!
//! Domain-specific claims are registered as [`KindPairRule`]s or custom
//! [`CommutationRule`] implementations. Claims are trusted, not checked.

use log::trace;
use qsched_core::{Operation, Resource, ResourceUse, Role};
use std::collections::BTreeSet;
use std::fmt::Debug;
use std::sync::Arc;

/// A commutation predicate over two overlapping operations
///
/// `earlier` precedes `later` in the input sequence.
pub trait CommutationRule: Send + Sync + Debug {
    /// Rule name, used in logs
    fn name(&self) -> &str;

    /// `Some(true)` commute, `Some(false)` must not commute,
    /// `None` no opinion (defer to the next rule).
    fn evaluate(&self, earlier: &Operation, later: &Operation) -> Option<bool>;
}

// ============================================================================
// Built-in Rules
// ============================================================================

/// Identical operations repeat safely only when whitelisted
#[derive(Debug, Clone, Default)]
pub struct IdenticalRule {
    /// Lowercase kinds allowed to commute with an identical copy
    repeat_safe: BTreeSet<String>,
}

impl IdenticalRule {
    /// Rule with an empty whitelist
    pub fn new() -> Self {
        Self::default()
    }

    /// Whitelist `kind` (case-insensitive)
    pub fn allow(mut self, kind: &str) -> Self {
        self.repeat_safe.insert(kind.to_lowercase());
        self
    }

    fn sorted_uses(op: &Operation) -> Vec<ResourceUse> {
        let mut uses = op.resources();
        uses.sort();
        uses
    }
}

impl CommutationRule for IdenticalRule {
    fn name(&self) -> &str {
        "identical"
    }

    fn evaluate(&self, earlier: &Operation, later: &Operation) -> Option<bool> {
        if !earlier.kind().eq_ignore_ascii_case(later.kind()) {
            return None;
        }
        if Self::sorted_uses(earlier) != Self::sorted_uses(later) {
            return None;
        }
        Some(self.repeat_safe.contains(&earlier.kind().to_lowercase()))
    }
}

/// Every shared resource must have the same role in both operations,
/// and that role must be one of `roles`
fn shared_only_in_roles(earlier: &Operation, later: &Operation, roles: &[Role]) -> bool {
    let shared = earlier.shared_resources(later);
    !shared.is_empty()
        && shared.iter().all(|&r: &Resource| {
            match (earlier.role_of(r), later.role_of(r)) {
                (Some(a), Some(b)) => a == b && roles.contains(&a),
                _ => false,
            }
        })
}

/// Controlled operations sharing only control resources commute
#[derive(Debug, Clone, Copy, Default)]
pub struct SharedControlRule;

impl CommutationRule for SharedControlRule {
    fn name(&self) -> &str {
        "shared-control"
    }

    fn evaluate(&self, earlier: &Operation, later: &Operation) -> Option<bool> {
        if !earlier.is_controlled() || !later.is_controlled() {
            return None;
        }
        // Classical conditions read by both count as shared controls too
        let only_controls = shared_only_in_roles(earlier, later, &[Role::Control, Role::Read]);
        let shares_qubit_control = earlier
            .shared_resources(later)
            .iter()
            .any(|&r| earlier.role_of(r) == Some(Role::Control));

        (only_controls && shares_qubit_control).then_some(true)
    }
}

/// Operations that only read the classical bits they share commute
#[derive(Debug, Clone, Copy, Default)]
pub struct SharedReadRule;

impl CommutationRule for SharedReadRule {
    fn name(&self) -> &str {
        "shared-read"
    }

    fn evaluate(&self, earlier: &Operation, later: &Operation) -> Option<bool> {
        shared_only_in_roles(earlier, later, &[Role::Read]).then_some(true)
    }
}

/// Data-driven claim: operations of these two kinds commute
///
/// Symmetric and case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindPairRule {
    label: String,
    first: String,
    second: String,
}

impl KindPairRule {
    /// Declare that `first` and `second` commute whenever they overlap
    pub fn new(first: &str, second: &str) -> Self {
        let first = first.to_lowercase();
        let second = second.to_lowercase();
        Self {
            label: format!("kind-pair({},{})", first, second),
            first,
            second,
        }
    }
}

impl CommutationRule for KindPairRule {
    fn name(&self) -> &str {
        &self.label
    }

    fn evaluate(&self, earlier: &Operation, later: &Operation) -> Option<bool> {
        let a = earlier.kind().to_lowercase();
        let b = later.kind().to_lowercase();
        let matches = (a == self.first && b == self.second) || (a == self.second && b == self.first);
        matches.then_some(true)
    }
}

// ============================================================================
// Rule Set
// ============================================================================

/// Ordered, injectable set of commutation rules
#[derive(Clone)]
pub struct CommutationRules {
    rules: Vec<Arc<dyn CommutationRule>>,
}

impl CommutationRules {
    /// Empty rule set: every overlapping pair is non-commuting
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Built-in rules in order: identical, shared-control, shared-read
    pub fn standard() -> Self {
        Self::new()
            .with_rule(IdenticalRule::new())
            .with_rule(SharedControlRule)
            .with_rule(SharedReadRule)
    }

    /// Append a rule
    pub fn with_rule<R: CommutationRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Append a kind-pair claim
    pub fn with_commuting_kinds(self, first: &str, second: &str) -> Self {
        self.with_rule(KindPairRule::new(first, second))
    }

    /// Number of registered rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if no rules are registered
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Registered rule names, in evaluation order
    pub fn names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Decide whether `earlier` and `later` may be reordered
    ///
    /// Disjoint operations always commute.
    pub fn may_reorder(&self, earlier: &Operation, later: &Operation) -> bool {
        if !earlier.overlaps(later) {
            return true;
        }

        for rule in &self.rules {
            if let Some(decision) = rule.evaluate(earlier, later) {
                trace!(
                    "rule {} decided {} for '{}' / '{}'",
                    rule.name(),
                    decision,
                    earlier,
                    later
                );
                return decision;
            }
        }
        false
    }
}

impl Default for CommutationRules {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for CommutationRules {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommutationRules")
            .field("rules", &self.names())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

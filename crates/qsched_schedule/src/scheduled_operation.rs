//! Scheduled operation representation for QSched
//!
//! Time-tagged operation records and per-resource occupancy slots.

use qsched_core::{OpId, Operation, Resource, ResourceUse, Role};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An operation with timing information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledOperation {
    /// Index in the input sequence
    pub id: OpId,

    /// Operation kind
    pub kind: String,

    /// Resources and roles
    pub resources: Vec<ResourceUse>,

    /// Start time (cycle index in unit mode)
    pub start: f64,

    /// Finish time
    pub finish: f64,
}

impl ScheduledOperation {
    /// Create a new scheduled operation
    pub fn new(id: OpId, op: &Operation, start: f64, finish: f64) -> Self {
        Self {
            id,
            kind: op.kind().to_string(),
            resources: op.resources(),
            start,
            finish,
        }
    }

    /// Duration
    pub fn duration(&self) -> f64 {
        self.finish - self.start
    }

    /// Check if this operation overlaps with a time interval
    pub fn overlaps(&self, start: f64, end: f64) -> bool {
        self.start < end && self.finish > start
    }

    /// Check if this operation uses `resource`
    pub fn touches(&self, resource: Resource) -> bool {
        self.resources.iter().any(|u| u.resource == resource)
    }

    /// Check if this operation holds `resource` in a non-read role
    pub fn holds_exclusively(&self, resource: Resource) -> bool {
        self.resources
            .iter()
            .any(|u| u.resource == resource && u.role != Role::Read)
    }

    /// Occupancy slot on `resource`, if used
    pub fn slot(&self, resource: Resource) -> Option<TimeSlot> {
        self.touches(resource)
            .then(|| TimeSlot::new(resource, self.id, self.start, self.finish))
    }
}

impl fmt::Display for ScheduledOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let resources: Vec<String> = self.resources.iter().map(|u| u.to_string()).collect();
        write!(
            f,
            "[{:.2}-{:.2}] #{} {} on {}",
            self.start,
            self.finish,
            self.id,
            self.kind,
            resources.join(", ")
        )
    }
}

// ============================================================================
// TimeSlot - Resource occupancy
// ============================================================================

/// Interval during which an operation uses a resource
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSlot {
    /// Resource
    pub resource: Resource,
    /// Operation occupying it
    pub op: OpId,
    /// Start time
    pub start: f64,
    /// End time
    pub end: f64,
}

impl TimeSlot {
    /// Create a new time slot
    pub fn new(resource: Resource, op: OpId, start: f64, end: f64) -> Self {
        Self {
            resource,
            op,
            start,
            end,
        }
    }

    /// Check overlap with another slot
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.resource == other.resource && self.start < other.end && self.end > other.start
    }

    /// Duration
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

// ============================================================================
// Tests
// ============================================================================

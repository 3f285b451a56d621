//! Core types for QSched
//!
//! Resource identifiers and the roles an operation can hold them in.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Type Aliases
// ============================================================================

/// Qubit identifier (0-indexed)
pub type QubitId = usize;

/// Classical bit identifier (0-indexed)
pub type ClbitId = usize;

/// Operation identifier: position in the input sequence
pub type OpId = usize;

// ============================================================================
// Resource
// ============================================================================

/// An exclusive-use unit for conflict detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Resource {
    /// Quantum register slot
    Qubit(QubitId),
    /// Classical register slot
    Clbit(ClbitId),
}

impl Resource {
    /// Check if this is a qubit
    pub fn is_qubit(&self) -> bool {
        matches!(self, Resource::Qubit(_))
    }

    /// Check if this is a classical bit
    pub fn is_clbit(&self) -> bool {
        matches!(self, Resource::Clbit(_))
    }

    /// Raw register index
    pub fn index(&self) -> usize {
        match self {
            Resource::Qubit(q) => *q,
            Resource::Clbit(c) => *c,
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Qubit(q) => write!(f, "q[{}]", q),
            Resource::Clbit(c) => write!(f, "c[{}]", c),
        }
    }
}

// ============================================================================
// Role
// ============================================================================

/// How an operation uses a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    /// Qubit acted upon
    Target,
    /// Qubit used as a control
    Control,
    /// Classical bit read (classical control)
    Read,
    /// Classical bit written (measurement result)
    Write,
}

impl Role {
    /// Only reads classical state
    pub fn is_read_only(&self) -> bool {
        matches!(self, Role::Read)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::Target => "target",
            Role::Control => "control",
            Role::Read => "read",
            Role::Write => "write",
        };
        write!(f, "{}", s)
    }
}

/// A resource together with the role it is held in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceUse {
    /// The resource
    pub resource: Resource,
    /// Role the operation holds it in
    pub role: Role,
}

impl ResourceUse {
    /// Create a new resource use
    pub fn new(resource: Resource, role: Role) -> Self {
        Self { resource, role }
    }
}

impl fmt::Display for ResourceUse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.resource, self.role)
    }
}

// ============================================================================
// ResourceLimits
// ============================================================================

/// Declared register sizes; `None` means unbounded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResourceLimits {
    /// Number of qubits, if declared
    pub num_qubits: Option<usize>,
    /// Number of classical bits, if declared
    pub num_clbits: Option<usize>,
}

impl ResourceLimits {
    /// No declared sizes
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Declare both register sizes
    pub fn new(num_qubits: usize, num_clbits: usize) -> Self {
        Self {
            num_qubits: Some(num_qubits),
            num_clbits: Some(num_clbits),
        }
    }

    /// Declared size for the register `resource` belongs to
    pub fn limit_for(&self, resource: Resource) -> Option<usize> {
        match resource {
            Resource::Qubit(_) => self.num_qubits,
            Resource::Clbit(_) => self.num_clbits,
        }
    }

    /// Check whether `resource` lies inside the declared registers
    pub fn contains(&self, resource: Resource) -> bool {
        self.limit_for(resource)
            .map_or(true, |limit| resource.index() < limit)
    }
}

// ============================================================================
// Tests
// ============================================================================

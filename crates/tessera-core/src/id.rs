//! Strongly-typed identifiers and the [`DofIndices`] type alias.

use smallvec::SmallVec;
use std::fmt;

/// Identifies a variable within a subproblem.
///
/// Variables are registered once and assigned sequential IDs that are
/// identical on every thread. `VariableId(n)` is the n-th registered
/// variable regardless of its arity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariableId(pub u32);

impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for VariableId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Index of a worker thread's computation context.
///
/// Each thread owns its own variable store and assembly context; the
/// index is captured by bindings at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ThreadId(pub usize);

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for ThreadId {
    fn from(v: usize) -> Self {
        Self(v)
    }
}

/// Identifies a boundary region of the mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoundaryId(pub u16);

impl fmt::Display for BoundaryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u16> for BoundaryId {
    fn from(v: u16) -> Self {
        Self(v)
    }
}

/// Identifies a subdomain (block) of the mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubdomainId(pub u16);

impl fmt::Display for SubdomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies a mesh node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for NodeId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Global degree-of-freedom indices of the entity a variable is
/// currently reinitialized on.
///
/// Uses `SmallVec<[usize; 8]>` so a node (one dof) or a first-order
/// hexahedron (eight dofs) never touches the heap.
pub type DofIndices = SmallVec<[usize; 8]>;

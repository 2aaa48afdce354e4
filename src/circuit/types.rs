//! Core types for circuit representation.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// A unique identifier for a node (electrical junction) in one solve.
/// Node 0 is always the ground reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The ground node (always index 0).
    pub const GROUND: NodeId = NodeId(0);

    /// Check if this is the ground node.
    pub fn is_ground(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ground() {
            write!(f, "GND")
        } else {
            write!(f, "N{}", self.0)
        }
    }
}

/// A unique identifier for a component in the circuit.
///
/// Ids are handed out in insertion order, so comparing two ids compares
/// their insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ComponentId(pub usize);

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C{}", self.0)
    }
}

/// One pin of one component: `(component id, terminal index)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TerminalRef {
    pub component: ComponentId,
    pub index: usize,
}

impl TerminalRef {
    pub fn new(component: ComponentId, index: usize) -> Self {
        Self { component, index }
    }
}

impl fmt::Display for TerminalRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.component, self.index)
    }
}

/// Kind-specific component parameters, keyed by catalog parameter name.
pub type Params = BTreeMap<String, f64>;

/// Build a [`Params`] map from `(name, value)` pairs.
///
/// ```
/// use circuit_copilot_core::circuit::params;
///
/// let p = params([("resistance", 220.0)]);
/// assert_eq!(p["resistance"], 220.0);
/// ```
pub fn params<const N: usize>(pairs: [(&str, f64); N]) -> Params {
    pairs
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

/// Disjoint-set forest over dense indices.
///
/// `find` never rewrites parents, so two forests built from the same
/// sequence of unions compare equal no matter how often they were queried.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct DisjointSet {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl DisjointSet {
    pub fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            size: vec![1; len],
        }
    }

    /// Append a fresh singleton set and return its index.
    pub fn push(&mut self) -> usize {
        let index = self.parent.len();
        self.parent.push(index);
        self.size.push(1);
        index
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn find(&self, mut x: usize) -> usize {
        while self.parent[x] != x {
            x = self.parent[x];
        }
        x
    }

    /// Merge the sets holding `a` and `b`. Returns false if they were
    /// already the same set.
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let (mut ra, mut rb) = (self.find(a), self.find(b));
        if ra == rb {
            return false;
        }
        // Union by size; ties keep the lower root so results are deterministic
        if self.size[ra] < self.size[rb] || (self.size[ra] == self.size[rb] && rb < ra) {
            std::mem::swap(&mut ra, &mut rb);
        }
        self.parent[rb] = ra;
        self.size[ra] += self.size[rb];
        true
    }

    pub fn same(&self, a: usize, b: usize) -> bool {
        self.find(a) == self.find(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_display() {
        assert_eq!(NodeId::GROUND.to_string(), "GND");
        assert_eq!(NodeId(3).to_string(), "N3");
    }

    #[test]
    fn test_disjoint_set_union_is_idempotent() {
        let mut once = DisjointSet::new(4);
        once.union(0, 2);

        let mut twice = once.clone();
        assert!(!twice.union(2, 0));
        assert_eq!(once, twice);
        assert!(twice.same(0, 2));
        assert!(!twice.same(1, 2));
    }
}

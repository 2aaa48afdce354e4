//! Structural analysis done before any numerics: short detection and
//! partitioning of the circuit into independently solvable islands.

use crate::circuit::{Circuit, ComponentId, DisjointSet, NetMap, NodeId};
use crate::components::Element;

/// A source that cannot be solved because nothing limits its current.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortedSource {
    pub component: ComponentId,
    pub reason: String,
}

/// Find sources shorted by zero-resistance paths.
///
/// Wire-like elements (closed switches, inductors) join nodes into
/// super-nodes. A source is shorted when both of its terminals land in one
/// super-node, or when it closes a loop made only of sources and wires.
pub fn find_short_circuits(circuit: &Circuit, map: &NetMap) -> Vec<ShortedSource> {
    let mut wires = DisjointSet::new(map.len());
    for c in circuit.components() {
        if c.element.is_wire_like() {
            let nodes = map.nodes_of(c.id);
            wires.union(nodes[0].0, nodes[1].0);
        }
    }

    let mut loops = DisjointSet::new(map.len());
    let mut shorts = Vec::new();
    for c in circuit.components().iter().filter(|c| c.is_source()) {
        let nodes = map.nodes_of(c.id);
        let (pos, neg) = (wires.find(nodes[0].0), wires.find(nodes[1].0));
        if pos == neg {
            shorts.push(ShortedSource {
                component: c.id,
                reason: format!(
                    "{} is shorted: a zero-resistance path connects its + and - terminals",
                    c.name
                ),
            });
        } else if !loops.union(pos, neg) {
            shorts.push(ShortedSource {
                component: c.id,
                reason: format!(
                    "{} closes a loop of sources with no resistance to limit the current",
                    c.name
                ),
            });
        }
    }
    shorts
}

/// Whether an element carries DC current given the assumed diode state.
pub fn conducts(element: &Element, diode_on: Option<bool>) -> bool {
    match element {
        Element::Diode(_) => diode_on.unwrap_or(false),
        other => other.conducts_dc(),
    }
}

/// Connected groups of nodes under the currently conducting elements.
#[derive(Debug)]
pub struct Islands {
    /// Island index of each node
    pub of_node: Vec<usize>,
    /// Nodes of each island, ascending
    pub members: Vec<Vec<NodeId>>,
}

impl Islands {
    /// Partition nodes given one `bool` per diode (`diode_on[i]` for the
    /// i-th entry of `diodes`).
    pub fn partition(
        circuit: &Circuit,
        map: &NetMap,
        diodes: &[ComponentId],
        diode_on: &[bool],
    ) -> Self {
        let mut set = DisjointSet::new(map.len());
        for c in circuit.components() {
            let state = diodes
                .iter()
                .position(|&d| d == c.id)
                .map(|i| diode_on[i]);
            if !conducts(&c.element, state) {
                continue;
            }
            let nodes = map.nodes_of(c.id);
            for pair in nodes.windows(2) {
                set.union(pair[0].0, pair[1].0);
            }
        }

        let mut of_node = vec![usize::MAX; map.len()];
        let mut members: Vec<Vec<NodeId>> = Vec::new();
        let mut island_of_root = vec![usize::MAX; map.len()];
        for node in 0..map.len() {
            let root = set.find(node);
            if island_of_root[root] == usize::MAX {
                island_of_root[root] = members.len();
                members.push(Vec::new());
            }
            of_node[node] = island_of_root[root];
            members[island_of_root[root]].push(NodeId(node));
        }

        Self { of_node, members }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

//! Circuit topology validation.

use std::collections::VecDeque;

use super::{Circuit, NodeId, TerminalRef};
use crate::error::TopologyIssue;

/// Validate a circuit's structure before solving.
///
/// Checks:
/// - At least one independent source is present
/// - A ground reference is designated
/// - Every terminal is tied to at least one other terminal
/// - Every source's positive terminal reaches ground through DC-conducting
///   elements other than the source itself
///
/// Issues are returned, not raised; the caller decides whether to solve.
pub fn validate_topology(circuit: &Circuit) -> Vec<TopologyIssue> {
    let mut issues = Vec::new();
    let map = circuit.net_map();

    let sources: Vec<_> = circuit
        .components()
        .iter()
        .filter(|c| c.is_source())
        .collect();
    if sources.is_empty() {
        issues.push(TopologyIssue::NoSource);
    }
    if circuit.ground().is_none() {
        issues.push(TopologyIssue::NoGround);
    }

    for terminal in circuit.terminal_refs() {
        if map.members(map.node(terminal)).len() < 2 {
            issues.push(TopologyIssue::DanglingTerminal {
                terminal,
                label: circuit.terminal_label(terminal),
            });
        }
    }

    if circuit.ground().is_some() {
        for source in sources {
            let positive = map.node(TerminalRef::new(source.id, 0));
            if !reaches(circuit, &map, positive, NodeId::GROUND, source.id) {
                issues.push(TopologyIssue::NoPathToGround {
                    component: source.id,
                    name: source.name.clone(),
                });
            }
        }
    }

    issues
}

/// Breadth-first search over nodes, stepping through DC-conducting
/// components other than `skip`.
fn reaches(
    circuit: &Circuit,
    map: &super::NetMap,
    from: NodeId,
    to: NodeId,
    skip: super::ComponentId,
) -> bool {
    let mut adjacency: Vec<Vec<NodeId>> = vec![Vec::new(); map.len()];
    for c in circuit.components() {
        if c.id == skip || !c.element.conducts_dc() {
            continue;
        }
        let nodes = map.nodes_of(c.id);
        for (i, &a) in nodes.iter().enumerate() {
            for &b in &nodes[i + 1..] {
                adjacency[a.0].push(b);
                adjacency[b.0].push(a);
            }
        }
    }

    let mut seen = vec![false; map.len()];
    let mut queue = VecDeque::from([from]);
    seen[from.0] = true;
    while let Some(node) = queue.pop_front() {
        if node == to {
            return true;
        }
        for &next in &adjacency[node.0] {
            if !seen[next.0] {
                seen[next.0] = true;
                queue.push_back(next);
            }
        }
    }
    false
}

impl Circuit {
    /// Check for missing source, missing ground, dangling terminals and
    /// sources with no path to ground. See [`validate_topology`].
    pub fn validate_topology(&self) -> Vec<TopologyIssue> {
        validate_topology(self)
    }
}

//! Individual safety rules.

use std::collections::VecDeque;

use crate::circuit::{Circuit, ComponentId, DisjointSet, NodeId};
use crate::solver::SolvedState;
use crate::units::format_reading;

use super::{Diagnostic, Rule, Severity};

/// LED-like components in a loop with a source that has nothing resistive
/// in it.
///
/// Purely topological: the LED's two nets are merged through every
/// non-resistive conducting element (wires, switches, other diodes), then a
/// breadth-first search looks for a chain of sources between them.
pub(super) fn led_without_resistor(circuit: &Circuit, out: &mut Vec<Diagnostic>) {
    let map = circuit.net_map();

    for led in circuit.components().iter().filter(|c| c.spec.requires_current_limit) {
        let mut joined = DisjointSet::new(map.len());
        for c in circuit.components() {
            if c.id == led.id || c.is_source() || c.element.is_resistive() || !c.element.conducts_dc() {
                continue;
            }
            let nodes = map.nodes_of(c.id);
            for pair in nodes.windows(2) {
                joined.union(pair[0].0, pair[1].0);
            }
        }

        let ends = map.nodes_of(led.id);
        let (from, to) = (joined.find(ends[0].0), joined.find(ends[1].0));
        if from == to {
            continue;
        }

        let sources: Vec<(ComponentId, usize, usize)> = circuit
            .components()
            .iter()
            .filter(|c| c.is_source())
            .map(|c| {
                let nodes = map.nodes_of(c.id);
                (c.id, joined.find(nodes[0].0), joined.find(nodes[1].0))
            })
            .collect();

        if let Some(path) = source_chain(&sources, from, to, map.len()) {
            let names: Vec<&str> = path
                .iter()
                .filter_map(|&id| circuit.component(id).map(|c| c.name.as_str()))
                .collect();
            out.push(
                Diagnostic::new(
                    Severity::Critical,
                    Rule::LedWithoutResistor,
                    format!(
                        "{} is wired straight across {} with nothing to limit its current. LED without resistor risks burnout.",
                        led.name,
                        names.join(" + ")
                    ),
                )
                .on(std::iter::once(led.id).chain(path)),
            );
        }
    }
}

/// Shortest chain of sources joining two super-nodes.
fn source_chain(
    sources: &[(ComponentId, usize, usize)],
    from: usize,
    to: usize,
    len: usize,
) -> Option<Vec<ComponentId>> {
    let mut via: Vec<Option<(usize, ComponentId)>> = vec![None; len];
    let mut seen = vec![false; len];
    let mut queue = VecDeque::from([from]);
    seen[from] = true;

    while let Some(node) = queue.pop_front() {
        if node == to {
            let mut path = Vec::new();
            let mut at = to;
            while let Some((prev, id)) = via[at] {
                path.push(id);
                at = prev;
            }
            path.reverse();
            return Some(path);
        }
        for &(id, a, b) in sources {
            let next = if a == node {
                b
            } else if b == node {
                a
            } else {
                continue;
            };
            if !seen[next] {
                seen[next] = true;
                via[next] = Some((node, id));
                queue.push_back(next);
            }
        }
    }
    None
}

/// Non-convergent and shorted components, reason passed through as is.
pub(super) fn solver_faults(circuit: &Circuit, state: &SolvedState, out: &mut Vec<Diagnostic>) {
    for (solution, reason) in state.faults() {
        if circuit.component(solution.id).is_none() {
            continue;
        }
        out.push(Diagnostic::new(Severity::Critical, Rule::SolverFault, reason).on([solution.id]));
    }
}

pub(super) fn over_current(circuit: &Circuit, state: &SolvedState, out: &mut Vec<Diagnostic>) {
    for c in circuit.components() {
        let (Some(rated), Some(current)) = (c.rated_current(), state.current(c.id)) else {
            continue;
        };
        let measured = current.abs();
        if measured > rated {
            out.push(
                Diagnostic::new(
                    Severity::Warning,
                    Rule::OverCurrent,
                    format!(
                        "{} draws {} > {} rated",
                        c.name,
                        format_reading(measured, "A"),
                        format_reading(rated, "A")
                    ),
                )
                .on([c.id])
                .with_condition(measured, rated, "A"),
            );
        }
    }
}

pub(super) fn over_power(circuit: &Circuit, state: &SolvedState, out: &mut Vec<Diagnostic>) {
    for c in circuit.components() {
        let (Some(rating), Some(power)) = (c.power_rating(), state.power(c.id)) else {
            continue;
        };
        if power > rating {
            out.push(
                Diagnostic::new(
                    Severity::Warning,
                    Rule::OverPower,
                    format!(
                        "{} dissipates {} > {} rated",
                        c.name,
                        format_reading(power, "W"),
                        format_reading(rating, "W")
                    ),
                )
                .on([c.id])
                .with_condition(power, rating, "W"),
            );
        }
    }
}

/// One diagnostic per node above the threshold, naming every component
/// touching it.
pub(super) fn high_voltage(circuit: &Circuit, state: &SolvedState, threshold: f64, out: &mut Vec<Diagnostic>) {
    for node in state.nodes() {
        let Some(voltage) = node.voltage else {
            continue;
        };
        if voltage.abs() <= threshold {
            continue;
        }
        let mut touching: Vec<ComponentId> = node.terminals.iter().map(|t| t.component).collect();
        touching.sort();
        touching.dedup();

        out.push(
            Diagnostic::new(
                Severity::Warning,
                Rule::HighVoltage,
                format!(
                    "{} sits at {}, above the {} safety threshold",
                    node_label(circuit, node.id, &touching),
                    format_reading(voltage, "V"),
                    format_reading(threshold, "V")
                ),
            )
            .on(touching)
            .with_condition(voltage.abs(), threshold, "V"),
        );
    }
}

fn node_label(circuit: &Circuit, node: NodeId, touching: &[ComponentId]) -> String {
    let names: Vec<&str> = touching
        .iter()
        .filter_map(|&id| circuit.component(id).map(|c| c.name.as_str()))
        .collect();
    if names.is_empty() {
        format!("Node {node}")
    } else {
        format!("Node {node} ({})", names.join(", "))
    }
}

pub(super) fn reverse_biased(circuit: &Circuit, state: &SolvedState, out: &mut Vec<Diagnostic>) {
    for c in circuit.components().iter().filter(|c| c.spec.requires_current_limit) {
        let Some(solution) = state.component(c.id) else {
            continue;
        };
        if solution.is_valid() && solution.conducting == Some(false) {
            out.push(
                Diagnostic::new(
                    Severity::Info,
                    Rule::ReverseBiased,
                    format!("{} is not lit: no forward current flows through it", c.name),
                )
                .on([c.id]),
            );
        }
    }
}

pub(super) fn open_circuit(state: &SolvedState, out: &mut Vec<Diagnostic>) {
    if state.is_open_circuit() {
        out.push(Diagnostic::new(
            Severity::Info,
            Rule::OpenCircuit,
            "No current flows: the circuit is open",
        ));
    }
}

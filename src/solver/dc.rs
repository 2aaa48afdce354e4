//! DC operating point: diode state iteration over island-wise MNA solves.

use crate::circuit::{Circuit, ComponentId, NetMap, NodeId};
use crate::components::{Component, Element};
use crate::error::{CircuitError, Result};

use super::mna::MnaMatrix;
use super::state::{ComponentSolution, NodeSolution, SolveStatus, SolvedState};
use super::topology::{conducts, find_short_circuits, Islands, ShortedSource};
use super::SolverConfig;

/// DC solver for resistive circuits with forward-voltage diodes.
#[derive(Debug, Clone, Default)]
pub struct DcSolver {
    config: SolverConfig,
}

/// Node voltages and source branch currents of one linear solve.
#[derive(Debug, Clone)]
struct LinearSolution {
    voltages: Vec<f64>,
    /// Current leaving the positive terminal, per component (0 for non-sources)
    source_current: Vec<f64>,
    /// Island of every node
    island_of: Vec<usize>,
}

impl DcSolver {
    /// Create a solver with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Compute the DC operating point of `circuit`.
    ///
    /// Fails with [`CircuitError::Topology`] when the circuit has no source
    /// or no ground, unless `allow_incomplete` is set. Short circuits and
    /// diodes that never settle are reported inside the returned state.
    pub fn solve(&self, circuit: &Circuit) -> Result<SolvedState> {
        let _span = tracing::info_span!("dc_solve", components = circuit.len()).entered();

        let issues = circuit.validate_topology();
        if issues.iter().any(|issue| issue.is_blocking()) && !self.config.allow_incomplete {
            tracing::warn!(issues = issues.len(), "refusing to solve incomplete circuit");
            return Err(CircuitError::Topology { issues });
        }
        for issue in &issues {
            tracing::debug!(%issue, "topology issue");
        }

        let map = circuit.net_map();

        let shorts = find_short_circuits(circuit, &map);
        if !shorts.is_empty() {
            for short in &shorts {
                tracing::warn!(component = %short.component, reason = %short.reason, "short circuit");
            }
            return Ok(shorted_state(circuit, &map, &shorts));
        }

        if !circuit.components().iter().any(|c| c.is_source()) {
            tracing::info!("no source, all voltages are zero");
            let zero = LinearSolution {
                voltages: vec![0.0; map.len()],
                source_current: vec![0.0; circuit.len()],
                island_of: vec![0; map.len()],
            };
            let diodes = diode_ids(circuit);
            let off = vec![false; diodes.len()];
            return Ok(self.assemble(circuit, &map, &diodes, &off, &[], &zero, 0));
        }

        let diodes = diode_ids(circuit);
        let mut state = vec![true; diodes.len()];
        let mut previous: Option<Vec<f64>> = None;
        let mut iteration = 0;

        loop {
            iteration += 1;
            let _iter_span = tracing::debug_span!("diode_iter", iteration).entered();

            let solution = self.solve_linear(circuit, &map, &diodes, &state)?;
            let (next, flipped) = self.update_states(circuit, &map, &diodes, state.clone(), &solution);
            let drift = previous
                .as_deref()
                .map(|prev| max_difference(prev, &solution.voltages))
                .unwrap_or(0.0);
            let flips = flipped.iter().filter(|&&f| f).count();
            tracing::debug!(flips, drift, "diode states checked");

            if flips == 0 && drift <= self.config.voltage_tolerance {
                tracing::info!(iterations = iteration, "DC operating point converged");
                return Ok(self.assemble(circuit, &map, &diodes, &state, &[], &solution, iteration));
            }

            if iteration >= self.config.max_iterations {
                let stuck: Vec<ComponentId> = diodes
                    .iter()
                    .zip(&flipped)
                    .filter(|(_, flipped)| **flipped)
                    .map(|(&id, _)| id)
                    .collect();
                tracing::warn!(
                    iterations = iteration,
                    stuck = stuck.len(),
                    "diode states did not converge"
                );
                return Ok(self.assemble(circuit, &map, &diodes, &state, &stuck, &solution, iteration));
            }

            previous = Some(solution.voltages);
            state = next;
        }
    }

    /// Re-evaluate each diode against the solution just found.
    ///
    /// An off diode whose terminals sit in different islands stays off: with
    /// no other conducting path between them it would carry no current.
    /// Returns the new state and which diodes flipped.
    fn update_states(
        &self,
        circuit: &Circuit,
        map: &NetMap,
        diodes: &[ComponentId],
        mut state: Vec<bool>,
        solution: &LinearSolution,
    ) -> (Vec<bool>, Vec<bool>) {
        let voltages = &solution.voltages;
        let mut flipped = vec![false; diodes.len()];
        for (i, &id) in diodes.iter().enumerate() {
            let Some(Element::Diode(diode)) = circuit.component(id).map(|c| &c.element) else {
                continue;
            };
            let nodes = map.nodes_of(id);
            let v = voltages[nodes[0].0] - voltages[nodes[1].0];
            let bridging = solution.island_of[nodes[0].0] != solution.island_of[nodes[1].0];
            if !state[i] && bridging {
                continue;
            }
            if !diode.is_consistent(v, state[i], self.config.voltage_tolerance, self.config.current_tolerance) {
                state[i] = !state[i];
                flipped[i] = true;
            }
        }
        (state, flipped)
    }

    /// Solve every island for the given diode states.
    fn solve_linear(
        &self,
        circuit: &Circuit,
        map: &NetMap,
        diodes: &[ComponentId],
        diode_on: &[bool],
    ) -> Result<LinearSolution> {
        let islands = Islands::partition(circuit, map, diodes, diode_on);
        let links = open_links(circuit, map, &islands, diodes, diode_on);

        let mut solution = LinearSolution {
            voltages: vec![0.0; map.len()],
            source_current: vec![0.0; circuit.len()],
            island_of: islands.of_node.clone(),
        };
        let mut solved = vec![false; islands.len()];

        while let Some((island, reference, anchor)) = next_island(&islands, &links, &solved, &solution.voltages) {
            self.solve_island(circuit, map, &islands, island, reference, anchor, diodes, diode_on, &mut solution)?;
            solved[island] = true;
        }

        Ok(solution)
    }

    /// Stamp and solve one island, with `reference` held at `anchor` volts.
    #[allow(clippy::too_many_arguments)]
    fn solve_island(
        &self,
        circuit: &Circuit,
        map: &NetMap,
        islands: &Islands,
        island: usize,
        reference: NodeId,
        anchor: f64,
        diodes: &[ComponentId],
        diode_on: &[bool],
        solution: &mut LinearSolution,
    ) -> Result<()> {
        let members = &islands.members[island];

        // Local index of every node except the reference
        let mut local = vec![None; map.len()];
        let mut next = 0;
        for &node in members {
            if node != reference {
                local[node.0] = Some(next);
                next += 1;
            }
        }

        let elements: Vec<&Component> = circuit
            .components()
            .iter()
            .filter(|c| {
                let on = diode_state(diodes, diode_on, c.id);
                conducts(&c.element, on) && islands.of_node[map.nodes_of(c.id)[0].0] == island
            })
            .collect();

        let sources: Vec<ComponentId> = elements
            .iter()
            .filter(|c| c.is_source())
            .map(|c| c.id)
            .collect();

        let size = next + sources.len();
        if size == 0 {
            solution.voltages[reference.0] = anchor;
            return Ok(());
        }

        let mut matrix = MnaMatrix::new(size);
        let at = |node: NodeId| local[node.0];
        for c in &elements {
            let nodes = map.nodes_of(c.id);
            match &c.element {
                Element::Battery(battery) => {
                    let branch = next + sources.iter().position(|&id| id == c.id).unwrap_or(0);
                    matrix.stamp_voltage_source(at(nodes[0]), at(nodes[1]), branch, battery.voltage);
                }
                Element::Resistor(r) => {
                    matrix.stamp_conductance(at(nodes[0]), at(nodes[1]), r.conductance());
                }
                Element::Potentiometer(pot) => {
                    matrix.stamp_conductance(at(nodes[0]), at(nodes[1]), pot.g1());
                    matrix.stamp_conductance(at(nodes[1]), at(nodes[2]), pot.g2());
                }
                Element::Inductor(l) => {
                    matrix.stamp_conductance(at(nodes[0]), at(nodes[1]), l.conductance());
                }
                Element::Switch(s) => {
                    if let Some(g) = s.conductance() {
                        matrix.stamp_conductance(at(nodes[0]), at(nodes[1]), g);
                    }
                }
                Element::Diode(d) => {
                    let (g, i_eq) = d.norton();
                    matrix.stamp_conductance(at(nodes[0]), at(nodes[1]), g);
                    matrix.stamp_current_source(at(nodes[1]), at(nodes[0]), i_eq);
                }
                Element::Capacitor(_) | Element::Placeholder => {}
            }
        }

        matrix.factor_and_solve()?;

        for &node in members {
            solution.voltages[node.0] = anchor + matrix.voltage(at(node));
        }
        for (k, id) in sources.iter().enumerate() {
            // The branch unknown enters the positive terminal
            solution.source_current[id.0] = -matrix.x[next + k];
        }
        Ok(())
    }

    /// Build the solved state from the final linear solution.
    #[allow(clippy::too_many_arguments)]
    fn assemble(
        &self,
        circuit: &Circuit,
        map: &NetMap,
        diodes: &[ComponentId],
        diode_on: &[bool],
        stuck: &[ComponentId],
        solution: &LinearSolution,
        iterations: usize,
    ) -> SolvedState {
        let v = &solution.voltages;
        let nodes = node_solutions(map, |node| Some(v[node.0]));

        let components = circuit
            .components()
            .iter()
            .map(|c| {
                let ids = map.nodes_of(c.id).to_vec();
                let drop = v[ids[0].0] - v[ids[1].0];
                let on = diode_state(diodes, diode_on, c.id);

                let (current, power) = match &c.element {
                    Element::Battery(battery) => {
                        let i = solution.source_current[c.id.0];
                        (i, battery.absorbed_power(i))
                    }
                    Element::Resistor(r) => {
                        let i = drop * r.conductance();
                        (i, drop * i)
                    }
                    Element::Potentiometer(pot) => {
                        let i1 = drop * pot.g1();
                        let i2 = (v[ids[1].0] - v[ids[2].0]) * pot.g2();
                        (i1, i1 * i1 * pot.r1() + i2 * i2 * pot.r2())
                    }
                    Element::Inductor(l) => {
                        let i = drop * l.conductance();
                        (i, drop * i)
                    }
                    Element::Switch(s) => {
                        let i = s.conductance().map_or(0.0, |g| drop * g);
                        (i, drop * i)
                    }
                    Element::Diode(d) => {
                        let i = d.current(drop, on.unwrap_or(false));
                        (i, drop * i)
                    }
                    Element::Capacitor(_) | Element::Placeholder => (0.0, 0.0),
                };

                if stuck.contains(&c.id) {
                    return ComponentSolution {
                        id: c.id,
                        nodes: ids,
                        voltage_drop: Some(drop),
                        current: None,
                        power: None,
                        conducting: None,
                        status: SolveStatus::NonConvergent {
                            reason: format!(
                                "{} kept switching between conducting and blocking after {} iterations",
                                c.name, iterations
                            ),
                        },
                    };
                }

                ComponentSolution {
                    id: c.id,
                    nodes: ids,
                    voltage_drop: Some(drop),
                    current: Some(current),
                    power: Some(power),
                    conducting: on,
                    status: SolveStatus::Solved,
                }
            })
            .collect();

        let open_circuit = circuit
            .components()
            .iter()
            .filter(|c| c.is_source())
            .all(|c| solution.source_current[c.id.0].abs() <= self.config.current_tolerance);

        SolvedState::new(nodes, components, iterations, open_circuit)
    }
}

/// Non-linear components in insertion order.
fn diode_ids(circuit: &Circuit) -> Vec<ComponentId> {
    circuit
        .components()
        .iter()
        .filter(|c| c.is_nonlinear())
        .map(|c| c.id)
        .collect()
}

fn diode_state(diodes: &[ComponentId], diode_on: &[bool], id: ComponentId) -> Option<bool> {
    diodes.iter().position(|&d| d == id).map(|i| diode_on[i])
}

fn max_difference(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}

fn node_solutions(map: &NetMap, voltage: impl Fn(NodeId) -> Option<f64>) -> Vec<NodeSolution> {
    (0..map.len())
        .map(|n| {
            let id = NodeId(n);
            NodeSolution {
                id,
                voltage: voltage(id),
                is_ground: id.is_ground() && map.is_grounded(),
                terminals: map.members(id).to_vec(),
            }
        })
        .collect()
}

/// Pairs of nodes in different islands joined by a non-conducting element,
/// in both directions.
///
/// Links across off diodes come last, so a floating island takes the
/// voltage on the source side of an open switch or capacitor before the
/// far side of a blocking diode.
fn open_links(
    circuit: &Circuit,
    map: &NetMap,
    islands: &Islands,
    diodes: &[ComponentId],
    diode_on: &[bool],
) -> Vec<(NodeId, NodeId)> {
    let mut links = Vec::new();
    let mut across_diodes = Vec::new();
    for c in circuit.components() {
        let on = diode_state(diodes, diode_on, c.id);
        if conducts(&c.element, on) {
            continue;
        }
        let out = if on.is_some() { &mut across_diodes } else { &mut links };
        let nodes = map.nodes_of(c.id);
        for (i, &a) in nodes.iter().enumerate() {
            for &b in &nodes[i + 1..] {
                if islands.of_node[a.0] != islands.of_node[b.0] {
                    out.push((a, b));
                    out.push((b, a));
                }
            }
        }
    }
    links.extend(across_diodes);
    links
}

/// Pick the next island to solve and its anchor.
///
/// The island holding node 0 goes first at 0 V. Then islands reachable
/// across an open element from a solved one take that node's voltage.
/// Anything left floating is anchored at 0 V.
fn next_island(
    islands: &Islands,
    links: &[(NodeId, NodeId)],
    solved: &[bool],
    voltages: &[f64],
) -> Option<(usize, NodeId, f64)> {
    if islands.is_empty() {
        return None;
    }
    let ground = islands.of_node[NodeId::GROUND.0];
    if !solved[ground] {
        return Some((ground, NodeId::GROUND, 0.0));
    }

    let adjacent = links.iter().find_map(|&(from, to)| {
        let (a, b) = (islands.of_node[from.0], islands.of_node[to.0]);
        (solved[a] && !solved[b]).then(|| (b, to, voltages[from.0]))
    });
    adjacent.or_else(|| {
        let island = solved.iter().position(|&s| !s)?;
        Some((island, islands.members[island][0], 0.0))
    })
}

/// State returned when a source is shorted: nothing is valid.
fn shorted_state(circuit: &Circuit, map: &NetMap, shorts: &[ShortedSource]) -> SolvedState {
    let nodes = node_solutions(map, |_| None);
    let components = circuit
        .components()
        .iter()
        .map(|c| {
            let status = match shorts.iter().find(|s| s.component == c.id) {
                Some(short) => SolveStatus::ShortCircuit {
                    reason: short.reason.clone(),
                },
                None => SolveStatus::Unsolved,
            };
            ComponentSolution {
                id: c.id,
                nodes: map.nodes_of(c.id).to_vec(),
                voltage_drop: None,
                current: None,
                power: None,
                conducting: None,
                status,
            }
        })
        .collect();
    SolvedState::new(nodes, components, 0, false)
}

impl Circuit {
    /// Solve with the default [`SolverConfig`]. See [`DcSolver::solve`].
    pub fn solve(&self) -> Result<SolvedState> {
        DcSolver::new().solve(self)
    }
}

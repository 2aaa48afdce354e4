//! Solved operating point.

use serde::Serialize;

use crate::circuit::{ComponentId, NodeId, TerminalRef};
use crate::error::{CircuitError, Result};

/// Outcome of the solve for one component.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SolveStatus {
    /// Values are valid
    Solved,
    /// Diode state never settled; values for this element are withheld
    NonConvergent { reason: String },
    /// Source with nothing limiting its current
    ShortCircuit { reason: String },
    /// Solve was aborted before this component got values
    Unsolved,
}

impl SolveStatus {
    pub fn is_solved(&self) -> bool {
        matches!(self, SolveStatus::Solved)
    }

    /// Reason text of a solver fault, verbatim.
    pub fn fault_reason(&self) -> Option<&str> {
        match self {
            SolveStatus::NonConvergent { reason } | SolveStatus::ShortCircuit { reason } => {
                Some(reason.as_str())
            }
            _ => None,
        }
    }
}

/// Voltage at one node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSolution {
    pub id: NodeId,
    /// Voltage relative to ground; `None` when the solve was aborted
    pub voltage: Option<f64>,
    pub is_ground: bool,
    pub terminals: Vec<TerminalRef>,
}

/// Operating point of one component.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentSolution {
    pub id: ComponentId,
    /// Node of each terminal, in terminal order
    pub nodes: Vec<NodeId>,
    /// Voltage of the first terminal minus the second
    pub voltage_drop: Option<f64>,
    /// Signed current, per the kind's current convention
    pub current: Option<f64>,
    /// Absorbed power (negative for a source delivering energy)
    pub power: Option<f64>,
    /// Conduction state for diode-like elements
    pub conducting: Option<bool>,
    pub status: SolveStatus,
}

impl ComponentSolution {
    pub fn is_valid(&self) -> bool {
        self.status.is_solved()
    }
}

/// DC operating point of a circuit.
///
/// Created fresh by every solve and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolvedState {
    nodes: Vec<NodeSolution>,
    components: Vec<ComponentSolution>,
    iterations: usize,
    open_circuit: bool,
}

impl SolvedState {
    pub(crate) fn new(
        nodes: Vec<NodeSolution>,
        components: Vec<ComponentSolution>,
        iterations: usize,
        open_circuit: bool,
    ) -> Self {
        Self {
            nodes,
            components,
            iterations,
            open_circuit,
        }
    }

    pub fn nodes(&self) -> &[NodeSolution] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeSolution> {
        self.nodes.get(id.0)
    }

    pub fn components(&self) -> &[ComponentSolution] {
        &self.components
    }

    pub fn component(&self, id: ComponentId) -> Option<&ComponentSolution> {
        self.components.get(id.0)
    }

    /// Voltage at a node, if valid.
    pub fn node_voltage(&self, id: NodeId) -> Option<f64> {
        self.node(id).and_then(|n| n.voltage)
    }

    /// Absolute voltage at a terminal, if valid.
    pub fn terminal_voltage(&self, terminal: TerminalRef) -> Option<f64> {
        let node = *self.component(terminal.component)?.nodes.get(terminal.index)?;
        self.node_voltage(node)
    }

    /// Branch current of a component, if valid.
    pub fn current(&self, id: ComponentId) -> Option<f64> {
        self.component(id).and_then(|c| c.current)
    }

    /// Absorbed power of a component, if valid.
    pub fn power(&self, id: ComponentId) -> Option<f64> {
        self.component(id).and_then(|c| c.power)
    }

    /// Number of diode-state iterations used.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// True when no source delivers current (no closed path).
    pub fn is_open_circuit(&self) -> bool {
        self.open_circuit
    }

    /// Components the solver could not produce values for, with the reason.
    pub fn faults(&self) -> impl Iterator<Item = (&ComponentSolution, &str)> {
        self.components
            .iter()
            .filter_map(|c| c.status.fault_reason().map(|reason| (c, reason)))
    }

    /// Turn solver faults into an error, for callers that cannot use
    /// partial results.
    pub fn ensure_valid(&self) -> Result<()> {
        let shorted: Vec<_> = self
            .components
            .iter()
            .filter(|c| matches!(c.status, SolveStatus::ShortCircuit { .. }))
            .collect();
        if let Some(first) = shorted.first() {
            return Err(CircuitError::ShortCircuit {
                components: shorted.iter().map(|c| c.id).collect(),
                reason: first.status.fault_reason().unwrap_or_default().to_string(),
            });
        }

        let stuck: Vec<_> = self
            .components
            .iter()
            .filter(|c| matches!(c.status, SolveStatus::NonConvergent { .. }))
            .map(|c| c.id)
            .collect();
        if !stuck.is_empty() {
            return Err(CircuitError::NonConvergent {
                components: stuck,
                iterations: self.iterations,
            });
        }
        Ok(())
    }
}

//! Renderer-neutral view of a solved circuit.
//!
//! A [`Projection`] flattens the circuit graph, its solved state and the
//! diagnostics into plain serializable records that a schematic renderer,
//! a breadboard view or an exporter can consume without knowing anything
//! about nets or the solver.

mod bom;

use serde::Serialize;

pub use bom::{bill_of_materials, BomLine};

use crate::catalog::CurrentConvention;
use crate::circuit::{Circuit, ComponentId, NodeId};
use crate::components::Component;
use crate::safety::Diagnostic;
use crate::solver::{SolveStatus, SolvedState};

/// One pin of a projected component.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TerminalView {
    pub name: String,
    pub node: NodeId,
    /// Absolute voltage; `None` when invalid
    pub voltage: Option<f64>,
}

/// One projected component.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentView {
    pub id: ComponentId,
    pub name: String,
    pub kind: &'static str,
    pub terminals: Vec<TerminalView>,
    pub current: Option<f64>,
    /// Direction `current` is measured in
    pub convention: CurrentConvention,
    pub voltage_drop: Option<f64>,
    pub power: Option<f64>,
    pub conducting: Option<bool>,
    pub valid: bool,
    pub status: SolveStatus,
    /// `|I| / nominal`, clamped to `[0, 1]`; drives animation speed
    pub intensity: f64,
}

/// One projected node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeView {
    pub id: NodeId,
    pub voltage: Option<f64>,
    pub is_ground: bool,
    /// `"R1.end"` style labels of the joined terminals
    pub terminals: Vec<String>,
}

/// Everything a renderer needs about a solved circuit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projection {
    pub components: Vec<ComponentView>,
    pub nodes: Vec<NodeView>,
    pub diagnostics: Vec<Diagnostic>,
    pub open_circuit: bool,
    pub iterations: usize,
}

impl Projection {
    pub fn component(&self, name: &str) -> Option<&ComponentView> {
        self.components.iter().find(|c| c.name == name)
    }
}

/// Build the projection. Pure: the same inputs give the same record.
pub fn project(circuit: &Circuit, state: &SolvedState, diagnostics: &[Diagnostic]) -> Projection {
    let components = circuit
        .components()
        .iter()
        .filter_map(|c| state.component(c.id).map(|s| view_component(c, state, s)))
        .collect();

    let nodes = state
        .nodes()
        .iter()
        .map(|n| NodeView {
            id: n.id,
            voltage: n.voltage,
            is_ground: n.is_ground,
            terminals: n.terminals.iter().map(|&t| circuit.terminal_label(t)).collect(),
        })
        .collect();

    Projection {
        components,
        nodes,
        diagnostics: diagnostics.to_vec(),
        open_circuit: state.is_open_circuit(),
        iterations: state.iterations(),
    }
}

fn view_component(
    component: &Component,
    state: &SolvedState,
    solution: &crate::solver::ComponentSolution,
) -> ComponentView {
    let terminals = component
        .terminals
        .iter()
        .zip(&solution.nodes)
        .map(|(name, &node)| TerminalView {
            name: name.clone(),
            node,
            voltage: state.node_voltage(node),
        })
        .collect();

    let valid = solution.is_valid();
    ComponentView {
        id: component.id,
        name: component.name.clone(),
        kind: component.kind(),
        terminals,
        current: solution.current,
        convention: component.spec.convention,
        voltage_drop: solution.voltage_drop,
        power: solution.power,
        conducting: solution.conducting,
        valid,
        status: solution.status.clone(),
        intensity: if valid {
            intensity(solution.current, component.nominal_current())
        } else {
            0.0
        },
    }
}

/// Animation intensity for a current against its full-scale value.
pub fn intensity(current: Option<f64>, nominal: f64) -> f64 {
    match current {
        Some(i) if nominal > 0.0 && i.is_finite() => (i.abs() / nominal).clamp(0.0, 1.0),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::{params, TerminalRef};
    use crate::safety::{check, SafetyConfig};
    use approx::assert_relative_eq;

    fn t(component: ComponentId, index: usize) -> TerminalRef {
        TerminalRef::new(component, index)
    }

    fn worked_example() -> Circuit {
        let mut c = Circuit::new();
        let v = c.add_component("battery", &params([("voltage", 9.0)])).unwrap();
        let r = c.add_component("resistor", &params([("resistance", 220.0)])).unwrap();
        let led = c.add_component("led", &params([])).unwrap();
        c.connect(t(v, 0), t(r, 0)).unwrap();
        c.connect(t(r, 1), t(led, 0)).unwrap();
        c.connect(t(led, 1), t(v, 1)).unwrap();
        c.set_ground(t(v, 1)).unwrap();
        c
    }

    #[test]
    fn test_projection_of_worked_example() {
        let c = worked_example();
        let state = c.solve().unwrap();
        let diagnostics = check(&c, &state, &SafetyConfig::default());
        let p = project(&c, &state, &diagnostics);

        let led = p.component("LED1").unwrap();
        assert_eq!(led.kind, "led");
        assert!(led.valid);
        assert_eq!(led.convention, CurrentConvention::FirstToSecond);
        // Over its rating, so the animation is pinned at full scale
        assert_eq!(led.intensity, 1.0);
        assert_eq!(led.terminals[1].node, NodeId::GROUND);
        assert_eq!(led.terminals[1].voltage, Some(0.0));

        let battery = p.component("V1").unwrap();
        assert_eq!(battery.convention, CurrentConvention::OutOfPositive);
        assert!(battery.current.unwrap() > 0.0);
        assert!(battery.power.unwrap() < 0.0);

        assert_eq!(p.diagnostics, diagnostics);
        assert!(!p.open_circuit);
        assert!(p.nodes[0].is_ground);
        assert!(p.nodes[0].terminals.contains(&"V1.neg".to_string()));
    }

    #[test]
    fn test_intensity_scales_and_clamps() {
        assert_relative_eq!(intensity(Some(0.01), 0.02), 0.5);
        assert_eq!(intensity(Some(-0.05), 0.02), 1.0);
        assert_eq!(intensity(None, 0.02), 0.0);
        assert_eq!(intensity(Some(0.01), 0.0), 0.0);
    }

    #[test]
    fn test_invalid_components_have_zero_intensity() {
        let mut c = Circuit::new();
        let v = c.add_component("battery", &params([("voltage", 9.0)])).unwrap();
        let sw = c.add_component("switch", &params([])).unwrap();
        c.connect(t(v, 0), t(sw, 0)).unwrap();
        c.connect(t(sw, 1), t(v, 1)).unwrap();
        c.set_ground(t(v, 1)).unwrap();
        let state = c.solve().unwrap();
        let p = project(&c, &state, &[]);

        assert!(p.components.iter().all(|v| !v.valid && v.intensity == 0.0));
        assert!(p.nodes.iter().all(|n| n.voltage.is_none()));
    }

    #[test]
    fn test_projection_serializes() {
        let c = worked_example();
        let state = c.solve().unwrap();
        let p = project(&c, &state, &[]);
        let json = serde_json::to_value(&p).unwrap();

        assert_eq!(json["components"][0]["kind"], "battery");
        assert_eq!(json["components"][0]["convention"], "out_of_positive");
        assert_eq!(json["components"][2]["status"]["status"], "solved");
    }
}

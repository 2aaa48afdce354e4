//! Component models for DC analysis.
//!
//! This module provides the closed set of element models the solver knows:
//! - Sources: Battery
//! - Linear: Resistor, Potentiometer, Capacitor (open), Inductor (wire)
//! - Nonlinear: Diode (diodes and LEDs)
//! - Controls: Switch, placeholders for ICs and transistors (open)
//!
//! A [`Component`] pairs one of these [`Element`]s with its catalog spec and
//! validated parameters. The element is chosen by the spec's [`DcModel`] tag,
//! never by inspecting the kind name.

mod controls;
mod diode;
mod linear;
mod sources;

use std::sync::Arc;

pub use controls::Switch;
pub use diode::Diode;
pub use linear::{Capacitor, Inductor, Potentiometer, Resistor, MIN_SEGMENT_RESISTANCE};
pub use sources::Battery;

use crate::catalog::{ComponentSpec, DcModel};
use crate::circuit::{ComponentId, Params};
use crate::error::{CircuitError, Result};

/// DC behaviour of a placed component.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Battery(Battery),
    Resistor(Resistor),
    Potentiometer(Potentiometer),
    Capacitor(Capacitor),
    Inductor(Inductor),
    Diode(Diode),
    Switch(Switch),
    /// Pins without a DC model (ICs, transistors)
    Placeholder,
}

impl Element {
    /// Build the element for `spec` from already-resolved parameters.
    pub fn from_spec(spec: &ComponentSpec, params: &Params, component: &str) -> Result<Self> {
        let get = |name: &str| {
            params.get(name).copied().ok_or_else(|| {
                CircuitError::invalid_parameter(
                    component,
                    name,
                    format!("'{}' model needs this parameter", spec.name),
                )
            })
        };

        let element = match spec.model {
            DcModel::VoltageSource => Element::Battery(Battery::new(get("voltage")?)),
            DcModel::Resistance => Element::Resistor(Resistor::new(get("resistance")?)),
            DcModel::Divider => {
                Element::Potentiometer(Potentiometer::new(get("resistance")?, get("position")?))
            }
            DcModel::ForwardDrop => {
                Element::Diode(Diode::new(get("forward_voltage")?, get("on_resistance")?))
            }
            DcModel::Switch => {
                Element::Switch(Switch::new(get("closed")? >= 0.5, get("contact_resistance")?))
            }
            DcModel::Wire => Element::Inductor(Inductor {
                inductance: get("inductance")?,
                dc_resistance: get("dc_resistance")?,
            }),
            DcModel::Open => match spec.param("capacitance") {
                Some(_) => Element::Capacitor(Capacitor {
                    capacitance: get("capacitance")?,
                }),
                None => Element::Placeholder,
            },
        };
        Ok(element)
    }

    /// Near-zero resistance: treated as a wire when looking for shorts.
    pub fn is_wire_like(&self) -> bool {
        match self {
            Element::Inductor(_) => true,
            Element::Switch(s) => s.closed,
            _ => false,
        }
    }

    /// Limits current through a resistance of its own.
    pub fn is_resistive(&self) -> bool {
        matches!(self, Element::Resistor(_) | Element::Potentiometer(_))
    }

    /// Whether DC current can flow through the element at all, ignoring
    /// diode polarity.
    pub fn conducts_dc(&self) -> bool {
        match self {
            Element::Capacitor(_) | Element::Placeholder => false,
            Element::Switch(s) => s.closed,
            _ => true,
        }
    }
}

/// A component placed in a circuit.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub id: ComponentId,
    /// Unique display name (`R1`, `LED1`)
    pub name: String,
    pub spec: Arc<ComponentSpec>,
    /// Validated parameters with defaults filled in
    pub params: Params,
    /// Pin names, in terminal-index order
    pub terminals: Vec<String>,
    pub element: Element,
}

impl Component {
    /// Validate `params` against `spec` and build the component.
    pub fn new(id: ComponentId, name: String, spec: Arc<ComponentSpec>, params: &Params) -> Result<Self> {
        let params = spec.resolve_params(&name, params)?;
        let element = Element::from_spec(&spec, &params, &name)?;
        let terminals = spec.terminal_names(&params);
        if terminals.len() < 2 {
            return Err(CircuitError::invalid_parameter(
                &name,
                "terminals",
                "a component needs at least two terminals",
            ));
        }
        Ok(Self {
            id,
            name,
            spec,
            params,
            terminals,
            element,
        })
    }

    /// Canonical kind name.
    pub fn kind(&self) -> &'static str {
        self.spec.name
    }

    /// Check if this component is nonlinear (needs the diode state iteration).
    pub fn is_nonlinear(&self) -> bool {
        self.spec.is_non_linear()
    }

    pub fn is_source(&self) -> bool {
        self.spec.is_source()
    }

    /// Rated maximum current, if the kind declares one.
    pub fn rated_current(&self) -> Option<f64> {
        self.spec.rated_current(&self.params)
    }

    /// Rated maximum power, if the kind declares one.
    pub fn power_rating(&self) -> Option<f64> {
        self.spec.power_rating(&self.params)
    }

    /// Full-scale current for animation: the rating, else the catalog nominal.
    pub fn nominal_current(&self) -> f64 {
        self.rated_current().unwrap_or(self.spec.nominal_current)
    }

    /// `"R1.end"` style label for one of this component's pins.
    pub fn terminal_label(&self, index: usize) -> String {
        match self.terminals.get(index) {
            Some(pin) => format!("{}.{}", self.name, pin),
            None => format!("{}.{}", self.name, index + 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::circuit::params;

    fn build(kind: &str, p: Params) -> Result<Component> {
        let spec = Catalog::builtin().lookup(kind)?.clone();
        Component::new(ComponentId(0), "X1".to_string(), spec, &p)
    }

    #[test]
    fn test_elements_follow_model_tag() {
        let led = build("led", params([])).unwrap();
        assert!(matches!(led.element, Element::Diode(ref d) if d.forward_voltage == 2.0));
        assert!(led.is_nonlinear() && !led.is_source());
        assert!(build("battery", params([("voltage", 9.0)])).unwrap().is_source());

        let cap = build("capacitor", params([("capacitance", 1e-6)])).unwrap();
        assert!(!cap.element.conducts_dc());

        let ic = build("ic", params([("pins", 14.0)])).unwrap();
        assert_eq!(ic.element, Element::Placeholder);
        assert_eq!(ic.terminals.len(), 14);
        assert_eq!(ic.terminals[13], "pin14");
    }

    #[test]
    fn test_switch_state_and_wire_behaviour() {
        let open = build("switch", params([("closed", 0.0)])).unwrap();
        assert!(!open.element.conducts_dc());
        assert!(!open.element.is_wire_like());

        let closed = build("switch", params([])).unwrap();
        assert!(closed.element.is_wire_like());
        assert!(build("inductor", params([])).unwrap().element.is_wire_like());
    }

    #[test]
    fn test_invalid_parameter_rejected() {
        let err = build("led", params([("forward_voltage", 5.0)])).unwrap_err();
        assert!(matches!(err, CircuitError::InvalidParameter { ref param, .. } if param == "forward_voltage"));
        assert!(build("battery", params([])).is_err());
    }

    #[test]
    fn test_nominal_current_prefers_rating() {
        let led = build("led", params([("max_current", 0.03)])).unwrap();
        assert_eq!(led.nominal_current(), 0.03);
        let r = build("resistor", params([("resistance", 100.0)])).unwrap();
        assert_eq!(r.nominal_current(), 0.02);
        assert_eq!(r.terminal_label(1), "X1.end");
    }
}

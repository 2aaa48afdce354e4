//! Loading normalized JSON circuit descriptions.
//!
//! The natural-language front end emits a JSON document listing components,
//! point-to-point connections and named nets:
//!
//! ```json
//! {
//!   "components": [
//!     {"id": "V1", "type": "battery", "value": "9V"},
//!     {"id": "R1", "type": "resistor", "value": "220Ω"},
//!     {"id": "LED1", "type": "led", "value": "red"},
//!     {"id": "GND1", "type": "ground"}
//!   ],
//!   "connections": [
//!     {"from": "V1.pos", "to": "R1.start"},
//!     {"from": "R1.end", "to": "LED1.anode"},
//!     {"from": "LED1.cathode", "to": "GND1.top"},
//!     {"from": "V1.neg", "to": "GND1.top"}
//!   ]
//! }
//! ```
//!
//! [`CircuitDescription::build`] turns it into a [`Circuit`]. Layout fields
//! (`x`, `y`, `orientation`, `label`) are ignored. Ground symbols are not
//! components: every terminal tied to one joins the ground net.

mod value;

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

pub use value::{led_forward_voltage, resolve_params, Value};

use crate::analysis::AnalysisConfig;
use crate::catalog::Catalog;
use crate::circuit::{Circuit, TerminalRef};
use crate::error::{CircuitError, Result};

/// Kind names that mark a ground reference symbol.
const GROUND_KINDS: &[&str] = &["ground", "gnd", "earth"];

/// Net names that mark the ground net.
const GROUND_NETS: &[&str] = &["gnd", "ground", "0"];

/// A complete circuit description.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CircuitDescription {
    #[serde(default)]
    pub title: Option<String>,
    pub components: Vec<ComponentDescription>,
    #[serde(default)]
    pub connections: Vec<Connection>,
    #[serde(default)]
    pub nets: Vec<NetDescription>,
    /// Explicit ground terminal (`"V1.neg"`)
    #[serde(default)]
    pub ground: Option<String>,
    /// Analysis settings carried with the description
    #[serde(default)]
    pub config: Option<AnalysisConfig>,
}

/// One component entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ComponentDescription {
    pub id: String,
    #[serde(rename = "type", alias = "kind")]
    pub kind: String,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub params: BTreeMap<String, Value>,
}

/// A wire between two terminals.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Connection {
    pub from: String,
    pub to: String,
}

/// A named group of terminals that are all tied together.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NetDescription {
    #[serde(default)]
    pub name: Option<String>,
    pub nodes: Vec<String>,
}

/// What a `"Name.pin"` reference resolves to.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Endpoint {
    Terminal(TerminalRef),
    Ground,
}

impl CircuitDescription {
    /// Parse a description from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build the circuit using the built-in catalog.
    pub fn build(&self) -> Result<Circuit> {
        self.build_with_catalog(Catalog::builtin())
    }

    /// Build the circuit against a custom catalog.
    pub fn build_with_catalog(&self, catalog: Arc<Catalog>) -> Result<Circuit> {
        let mut circuit = Circuit::with_catalog(catalog.clone());
        let mut symbols: Vec<&str> = Vec::new();

        for entry in &self.components {
            let name = entry.id.trim();
            if symbols.contains(&name) || circuit.find_component(name).is_some() {
                return Err(CircuitError::DuplicateComponent {
                    name: name.to_string(),
                });
            }
            if GROUND_KINDS.iter().any(|k| k.eq_ignore_ascii_case(entry.kind.trim())) {
                symbols.push(name);
                continue;
            }
            let spec = catalog.lookup(&entry.kind)?;
            let params = resolve_params(spec, name, entry.value.as_ref(), &entry.params)?;
            circuit.add_named_component(name, &entry.kind, &params)?;
        }

        let mut grounded: Vec<TerminalRef> = Vec::new();

        for connection in &self.connections {
            let from = endpoint(&circuit, &symbols, &connection.from)?;
            let to = endpoint(&circuit, &symbols, &connection.to)?;
            match (from, to) {
                (Endpoint::Terminal(a), Endpoint::Terminal(b)) => circuit.connect(a, b)?,
                (Endpoint::Terminal(t), Endpoint::Ground) | (Endpoint::Ground, Endpoint::Terminal(t)) => {
                    grounded.push(t)
                }
                (Endpoint::Ground, Endpoint::Ground) => {}
            }
        }

        for net in &self.nets {
            let mut is_ground = net
                .name
                .as_deref()
                .is_some_and(|name| GROUND_NETS.iter().any(|g| g.eq_ignore_ascii_case(name.trim())));
            let mut first: Option<TerminalRef> = None;
            for node in &net.nodes {
                match endpoint(&circuit, &symbols, node)? {
                    Endpoint::Terminal(t) => match first {
                        Some(f) => circuit.connect(f, t)?,
                        None => first = Some(t),
                    },
                    Endpoint::Ground => is_ground = true,
                }
            }
            if let (true, Some(t)) = (is_ground, first) {
                grounded.push(t);
            }
        }

        let explicit = match &self.ground {
            Some(reference) => match endpoint(&circuit, &symbols, reference)? {
                Endpoint::Terminal(t) => Some(t),
                Endpoint::Ground => None,
            },
            None => None,
        };

        for pair in grounded.windows(2) {
            circuit.connect(pair[0], pair[1])?;
        }
        if let (Some(e), Some(&g)) = (explicit, grounded.first()) {
            circuit.connect(e, g)?;
        }

        let ground = explicit.or_else(|| grounded.first().copied()).or_else(|| {
            circuit
                .components()
                .iter()
                .find(|c| c.is_source())
                .map(|c| TerminalRef::new(c.id, 1))
        });
        if let Some(ground) = ground {
            circuit.set_ground(ground)?;
        }

        tracing::debug!(
            components = circuit.len(),
            symbols = symbols.len(),
            grounded = ground.is_some(),
            "built circuit from description"
        );
        Ok(circuit)
    }
}

/// Resolve `"Name.pin"`. A bare name is accepted only for ground symbols.
fn endpoint(circuit: &Circuit, symbols: &[&str], reference: &str) -> Result<Endpoint> {
    let reference = reference.trim();
    let (name, pin) = match reference.split_once('.') {
        Some((name, pin)) => (name.trim(), Some(pin)),
        None => (reference, None),
    };
    if symbols.contains(&name) {
        return Ok(Endpoint::Ground);
    }
    let pin = pin.ok_or_else(|| {
        CircuitError::invalid_description(format!(
            "'{reference}' must name a terminal as Component.pin"
        ))
    })?;
    circuit.terminal(name, pin).map(Endpoint::Terminal)
}

/// Read and parse a description file.
pub fn load(path: impl AsRef<Path>) -> Result<CircuitDescription> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| CircuitError::FileReadError {
        path: path.display().to_string(),
        source,
    })?;
    CircuitDescription::from_json(&text)
}

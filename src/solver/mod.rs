//! MNA (Modified Nodal Analysis) DC solver.
//!
//! This module computes the DC operating point of a [`Circuit`].
//!
//! ## Modified Nodal Analysis
//!
//! MNA assembles a system of equations Ax = z where:
//! - x contains node voltages and battery branch currents
//! - A is the conductance/coefficient matrix
//! - z is the source vector
//!
//! The matrix structure is:
//! ```text
//! [ G   B ] [ v ]   [ i ]
//! [ C   D ] [ j ] = [ e ]
//! ```
//!
//! where:
//! - G is the conductance matrix (node equations)
//! - B, C connect batteries to nodes
//! - D is 0 (ideal batteries)
//! - v is the vector of node voltages
//! - j is the vector of battery currents
//! - i is the sum of current sources into each node (diode Norton terms)
//! - e is the vector of battery voltages
//!
//! ## Diodes
//!
//! Diodes and LEDs are either conducting (a fixed drop in series with a
//! small on-resistance) or open. The solver starts with every diode
//! conducting, solves, and re-checks every diode: a conducting one without
//! forward current turns off, an off one that sees more than its forward
//! voltage across a closed loop turns on. It repeats until nothing flips and
//! the voltages stop moving.
//!
//! Elements that are open in the current state split the circuit into
//! islands; each island is its own small system.
//!
//! [`Circuit`]: crate::circuit::Circuit

mod dc;
mod mna;
mod state;
mod topology;

use serde::{Deserialize, Serialize};

pub use dc::DcSolver;
pub use mna::MnaMatrix;
pub use state::{ComponentSolution, NodeSolution, SolveStatus, SolvedState};
pub use topology::{find_short_circuits, ShortedSource};

/// Maximum diode-state iterations.
pub const DEFAULT_MAX_ITERATIONS: usize = 10;

/// Voltage agreement required between iterations, and the slack allowed
/// around a diode's forward voltage.
pub const DEFAULT_VOLTAGE_TOLERANCE: f64 = 1e-6;

/// Source current at or below which a circuit counts as open.
pub const DEFAULT_CURRENT_TOLERANCE: f64 = 1e-9;

/// Solver settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub max_iterations: usize,
    pub voltage_tolerance: f64,
    pub current_tolerance: f64,
    /// Solve circuits with no source or no ground instead of refusing
    pub allow_incomplete: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            voltage_tolerance: DEFAULT_VOLTAGE_TOLERANCE,
            current_tolerance: DEFAULT_CURRENT_TOLERANCE,
            allow_incomplete: false,
        }
    }
}

impl SolverConfig {
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    pub fn with_voltage_tolerance(mut self, tolerance: f64) -> Self {
        self.voltage_tolerance = tolerance;
        self
    }

    pub fn with_current_tolerance(mut self, tolerance: f64) -> Self {
        self.current_tolerance = tolerance;
        self
    }

    pub fn with_allow_incomplete(mut self, allow: bool) -> Self {
        self.allow_incomplete = allow;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults_and_builders() {
        let config = SolverConfig::default();
        assert_eq!(config.max_iterations, 10);
        assert!(!config.allow_incomplete);

        let config = config.with_max_iterations(0).with_allow_incomplete(true);
        assert_eq!(config.max_iterations, 1);
        assert!(config.allow_incomplete);
    }

    #[test]
    fn test_config_deserializes_partially() {
        let config: SolverConfig = serde_json::from_str(r#"{"max_iterations": 25}"#).unwrap();
        assert_eq!(config.max_iterations, 25);
        assert_eq!(config.voltage_tolerance, DEFAULT_VOLTAGE_TOLERANCE);
    }
}

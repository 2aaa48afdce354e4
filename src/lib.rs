//! # Circuit Copilot Core
//!
//! DC operating-point engine and safety checker for beginner circuits.
//!
//! This library provides:
//! - A catalog of hobby components (batteries, resistors, LEDs, switches...)
//! - A circuit graph with union-find nets and a ground reference
//! - Modified Nodal Analysis (MNA) based DC solving with forward-voltage diodes
//! - Safety diagnostics (missing LED resistors, over-current, high voltage)
//! - A renderer-neutral projection of the results and a bill of materials
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`catalog`] - Static definitions of the supported component kinds
//! - [`circuit`] - Circuit graph representation and validation
//! - [`components`] - DC element models (battery, resistor, diode, ...)
//! - [`ingest`] - Loader for normalized JSON circuit descriptions
//! - [`solver`] - MNA matrix assembly and the DC operating point
//! - [`safety`] - Rules over a solved circuit
//! - [`projection`] - Serializable views for renderers and exporters
//! - [`analysis`] - The whole pipeline in one call
//!
//! ## Usage
//!
//! ### Native CLI
//!
//! ```bash
//! copilot circuit.json --pretty
//! ```
//!
//! ### Library
//!
//! ```
//! use circuit_copilot_core::circuit::{params, Circuit, TerminalRef};
//!
//! let mut circuit = Circuit::new();
//! let v = circuit.add_component("battery", &params([("voltage", 9.0)])).unwrap();
//! let r = circuit.add_component("resistor", &params([("resistance", 1000.0)])).unwrap();
//! circuit.connect(TerminalRef::new(v, 0), TerminalRef::new(r, 0)).unwrap();
//! circuit.connect(TerminalRef::new(r, 1), TerminalRef::new(v, 1)).unwrap();
//! circuit.set_ground(TerminalRef::new(v, 1)).unwrap();
//!
//! let state = circuit.solve().unwrap();
//! assert!((state.current(r).unwrap() - 9e-3).abs() < 1e-9);
//! ```
//!
//! ### WASM
//!
//! ```javascript
//! import { analyze } from 'circuit_copilot_core';
//!
//! const report = JSON.parse(analyze(descriptionJson));
//! ```
//!
//! ## Solution Method
//!
//! Every solve is a fresh DC operating point:
//!
//! 1. Validate the topology and look for sources shorted by wires
//! 2. Assume every diode conducts, assemble Ax = z per island and solve
//! 3. Flip diodes whose voltage contradicts their state, repeat until stable
//!
//! Capacitors are open and inductors are wires at DC.

pub mod analysis;
pub mod catalog;
pub mod circuit;
pub mod components;
pub mod error;
pub mod ingest;
pub mod projection;
pub mod safety;
pub mod solver;
pub mod units;

// Re-export main types for convenience
pub use analysis::{analyze, analyze_description, Analysis, AnalysisConfig, Report};
pub use circuit::Circuit;
pub use error::{CircuitError, Result};
pub use solver::{DcSolver, SolvedState};

// WASM bindings
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::WasmAnalyzer;

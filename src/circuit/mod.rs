//! Circuit graph representation and validation.
//!
//! This module provides the in-memory representation of a circuit. The
//! [`Circuit`] struct owns all components and their nets, plus the ground
//! designation. Nodes are derived per solve through [`NetMap`].

mod graph;
mod types;
mod validate;

pub use graph::{Circuit, Net, NetMap};
pub use types::*;
pub use validate::validate_topology;

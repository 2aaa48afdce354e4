//! Error types for the circuit engine.
//!
//! This module provides a unified error type [`CircuitError`] that covers
//! every error condition that can occur while loading a circuit description,
//! building the circuit graph, and solving it.
//!
//! Structural problems found by topology validation are reported as a list of
//! [`TopologyIssue`] values rather than as a single error, so the caller can
//! decide whether to solve anyway.

use serde::Serialize;
use thiserror::Error;

use crate::circuit::{ComponentId, TerminalRef};

/// Result type alias using [`CircuitError`].
pub type Result<T> = std::result::Result<T, CircuitError>;

/// Unified error type for all circuit operations.
#[derive(Error, Debug)]
pub enum CircuitError {
    // ============ Construction Errors ============
    /// Component kind is not in the catalog
    #[error("Unknown component kind '{kind}'")]
    UnknownKind { kind: String },

    /// Missing, unknown or out-of-range parameter
    #[error("Invalid parameter '{param}' for component '{component}': {message}")]
    InvalidParameter {
        component: String,
        param: String,
        message: String,
    },

    /// Duplicate component name
    #[error("Duplicate component name '{name}'")]
    DuplicateComponent { name: String },

    /// Component referenced by name does not exist
    #[error("Component '{name}' not found in circuit")]
    UnknownComponent { name: String },

    /// Terminal referenced does not exist on its component
    #[error("Component '{component}' has no terminal '{terminal}'")]
    UnknownTerminal { component: String, terminal: String },

    // ============ Topology Errors ============
    /// Blocking topology issues prevented the solve
    #[error("Circuit topology rejected: {}", summarize(.issues))]
    Topology { issues: Vec<TopologyIssue> },

    // ============ Solver Errors ============
    /// Zero-resistance path across a source
    #[error("Short circuit across {}: {reason}", list_ids(.components))]
    ShortCircuit {
        components: Vec<ComponentId>,
        reason: String,
    },

    /// Diode conduction states did not settle within the iteration cap
    #[error("Diode states did not converge after {iterations} iterations for {}", list_ids(.components))]
    NonConvergent {
        components: Vec<ComponentId>,
        iterations: usize,
    },

    /// Matrix is singular and cannot be solved
    #[error("Singular matrix - circuit may contain an unreferenced source loop")]
    SingularMatrix,

    // ============ Ingest Errors ============
    /// Description is well-formed JSON but semantically wrong
    #[error("Invalid circuit description: {message}")]
    InvalidDescription { message: String },

    /// Description is not valid JSON for the expected schema
    #[error("Failed to parse circuit description: {source}")]
    DescriptionParse {
        #[source]
        source: serde_json::Error,
    },

    // ============ I/O Errors ============
    /// Error reading a description file
    #[error("Failed to read circuit file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl CircuitError {
    /// Create an invalid parameter error
    pub fn invalid_parameter(
        component: impl Into<String>,
        param: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            component: component.into(),
            param: param.into(),
            message: message.into(),
        }
    }

    /// Create an invalid description error
    pub fn invalid_description(message: impl Into<String>) -> Self {
        Self::InvalidDescription {
            message: message.into(),
        }
    }

    /// Create an unknown terminal error
    pub fn unknown_terminal(component: impl Into<String>, terminal: impl Into<String>) -> Self {
        Self::UnknownTerminal {
            component: component.into(),
            terminal: terminal.into(),
        }
    }
}

impl From<serde_json::Error> for CircuitError {
    fn from(source: serde_json::Error) -> Self {
        Self::DescriptionParse { source }
    }
}

/// A structural problem found by topology validation.
///
/// Issues are data, not failures: the solver only refuses to run for the
/// blocking ones (see [`TopologyIssue::is_blocking`]).
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum TopologyIssue {
    /// No battery or other independent source
    #[error("Circuit has no independent source (battery)")]
    NoSource,

    /// No terminal was designated as the 0V reference
    #[error("Circuit has no ground reference")]
    NoGround,

    /// Terminal not tied to any other terminal
    #[error("Terminal '{label}' is not connected to anything")]
    DanglingTerminal { terminal: TerminalRef, label: String },

    /// Source positive terminal cannot reach ground
    #[error("No path from the positive terminal of '{name}' to ground")]
    NoPathToGround { component: ComponentId, name: String },
}

impl TopologyIssue {
    /// Whether this issue stops the solver unless explicitly overridden.
    pub fn is_blocking(&self) -> bool {
        matches!(self, TopologyIssue::NoSource | TopologyIssue::NoGround)
    }
}

fn summarize(issues: &[TopologyIssue]) -> String {
    issues
        .iter()
        .map(|issue| issue.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

fn list_ids(ids: &[ComponentId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

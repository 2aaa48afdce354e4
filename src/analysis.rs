//! One-call pipeline: solve, check, project.

use serde::{Deserialize, Serialize};

use crate::circuit::Circuit;
use crate::error::{Result, TopologyIssue};
use crate::ingest::CircuitDescription;
use crate::projection::{bill_of_materials, project, BomLine, Projection};
use crate::safety::{check, Diagnostic, SafetyConfig};
use crate::solver::{DcSolver, SolverConfig, SolvedState};

/// Settings for the whole pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub solver: SolverConfig,
    pub safety: SafetyConfig,
}

impl AnalysisConfig {
    pub fn with_solver(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    pub fn with_safety(mut self, safety: SafetyConfig) -> Self {
        self.safety = safety;
        self
    }
}

/// Everything derived from one circuit.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Topology findings, including informational ones the solver tolerated
    pub issues: Vec<TopologyIssue>,
    pub state: SolvedState,
    pub diagnostics: Vec<Diagnostic>,
    pub projection: Projection,
}

/// Solve `circuit`, run the safety rules and project the result.
pub fn analyze(circuit: &Circuit, config: &AnalysisConfig) -> Result<Analysis> {
    let _span = tracing::info_span!("analyze", components = circuit.len()).entered();

    let issues = circuit.validate_topology();
    let state = DcSolver::with_config(config.solver.clone()).solve(circuit)?;
    let diagnostics = check(circuit, &state, &config.safety);
    let projection = project(circuit, &state, &diagnostics);

    tracing::info!(
        diagnostics = diagnostics.len(),
        faults = state.faults().count(),
        open_circuit = state.is_open_circuit(),
        "analysis complete"
    );
    Ok(Analysis {
        issues,
        state,
        diagnostics,
        projection,
    })
}

/// Serializable summary handed to renderers and exporters.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub issues: Vec<TopologyIssue>,
    pub projection: Projection,
    pub bill_of_materials: Vec<BomLine>,
}

impl Report {
    pub fn new(title: Option<String>, circuit: &Circuit, analysis: Analysis) -> Self {
        Self {
            title,
            issues: analysis.issues,
            projection: analysis.projection,
            bill_of_materials: bill_of_materials(circuit),
        }
    }

    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}

/// Build, analyze and report a parsed description.
///
/// Settings embedded in the description override `config`.
pub fn analyze_description(description: &CircuitDescription, config: &AnalysisConfig) -> Result<Report> {
    let circuit = description.build()?;
    let config = description.config.as_ref().unwrap_or(config);
    let analysis = analyze(&circuit, config)?;
    Ok(Report::new(description.title.clone(), &circuit, analysis))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CircuitError;
    use crate::safety::Rule;

    const WORKED: &str = r#"{
      "title": "LED Circuit",
      "components": [
        {"id":"V1","type":"battery","value":"9V"},
        {"id":"R1","type":"resistor","value":"220Ω"},
        {"id":"LED1","type":"led","value":"red"}
      ],
      "connections": [
        {"from":"V1.pos","to":"R1.start"},
        {"from":"R1.end","to":"LED1.anode"},
        {"from":"LED1.cathode","to":"V1.neg"}
      ]
    }"#;

    #[test]
    fn test_pipeline_on_worked_example() {
        let description = CircuitDescription::from_json(WORKED).unwrap();
        let circuit = description.build().unwrap();
        let analysis = analyze(&circuit, &AnalysisConfig::default()).unwrap();

        assert!(analysis.issues.is_empty());
        assert_eq!(analysis.diagnostics.len(), 1);
        assert_eq!(analysis.diagnostics[0].rule, Rule::OverCurrent);
        assert_eq!(analysis.projection.diagnostics, analysis.diagnostics);
    }

    #[test]
    fn test_report_json() {
        let description = CircuitDescription::from_json(WORKED).unwrap();
        let report = analyze_description(&description, &AnalysisConfig::default()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&report.to_json(false).unwrap()).unwrap();

        assert_eq!(json["title"], "LED Circuit");
        assert_eq!(json["bill_of_materials"].as_array().unwrap().len(), 3);
        assert_eq!(json["projection"]["diagnostics"][0]["rule"], "over-current");
        assert_eq!(json["projection"]["diagnostics"][0]["severity"], "warning");
    }

    #[test]
    fn test_embedded_config_overrides() {
        let json = r#"{
          "components": [{"id":"R1","type":"resistor","value":"1k"}],
          "connections": [{"from":"R1.start","to":"R1.end"}],
          "config": {"solver": {"allow_incomplete": true}}
        }"#;
        let description = CircuitDescription::from_json(json).unwrap();
        assert!(analyze_description(&description, &AnalysisConfig::default()).is_ok());

        let strict = CircuitDescription {
            config: None,
            ..description
        };
        assert!(matches!(
            analyze_description(&strict, &AnalysisConfig::default()),
            Err(CircuitError::Topology { .. })
        ));
    }
}

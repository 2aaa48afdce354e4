//! Safety and design-rule diagnostics over a solved circuit.
//!
//! [`check`] runs every rule against the circuit graph and its solved
//! state and returns a sorted list of [`Diagnostic`]s. It never fails and
//! never mutates its inputs; a circuit with problems simply yields more
//! diagnostics.
//!
//! Ordering: critical before warning before info, then by the lowest
//! offending component id (circuit-wide diagnostics last).

mod rules;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::circuit::{Circuit, ComponentId};
use crate::solver::SolvedState;

/// Node voltage magnitude above which a circuit is flagged, in volts.
pub const DEFAULT_HIGH_VOLTAGE_THRESHOLD: f64 = 50.0;

/// How urgent a diagnostic is. Orders most urgent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Critical => "critical",
            Severity::Warning => "warning",
            Severity::Info => "info",
        };
        f.write_str(name)
    }
}

/// Which rule produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rule {
    LedWithoutResistor,
    OverCurrent,
    OverPower,
    HighVoltage,
    SolverFault,
    ReverseBiased,
    OpenCircuit,
}

impl Rule {
    /// Stable rule code.
    pub fn code(&self) -> &'static str {
        match self {
            Rule::LedWithoutResistor => "led-without-resistor",
            Rule::OverCurrent => "over-current",
            Rule::OverPower => "over-power",
            Rule::HighVoltage => "high-voltage",
            Rule::SolverFault => "solver-fault",
            Rule::ReverseBiased => "reverse-biased",
            Rule::OpenCircuit => "open-circuit",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// The number that tripped a rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Condition {
    pub measured: f64,
    pub limit: f64,
    pub unit: &'static str,
}

/// One finding about a circuit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub rule: Rule,
    pub message: String,
    /// Offending components; empty for circuit-wide findings
    pub components: Vec<ComponentId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
}

impl Diagnostic {
    pub(crate) fn new(severity: Severity, rule: Rule, message: impl Into<String>) -> Self {
        Self {
            severity,
            rule,
            message: message.into(),
            components: Vec::new(),
            condition: None,
        }
    }

    pub(crate) fn on(mut self, components: impl IntoIterator<Item = ComponentId>) -> Self {
        self.components.extend(components);
        self
    }

    pub(crate) fn with_condition(mut self, measured: f64, limit: f64, unit: &'static str) -> Self {
        self.condition = Some(Condition { measured, limit, unit });
        self
    }

    fn sort_key(&self) -> (Severity, usize) {
        let first = self.components.iter().min().map_or(usize::MAX, |id| id.0);
        (self.severity, first)
    }
}

/// Safety checker settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyConfig {
    pub high_voltage_threshold: f64,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            high_voltage_threshold: DEFAULT_HIGH_VOLTAGE_THRESHOLD,
        }
    }
}

impl SafetyConfig {
    pub fn with_high_voltage_threshold(mut self, volts: f64) -> Self {
        self.high_voltage_threshold = volts;
        self
    }
}

/// Run every rule and return the findings, most urgent first.
pub fn check(circuit: &Circuit, state: &SolvedState, config: &SafetyConfig) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    rules::led_without_resistor(circuit, &mut diagnostics);
    rules::solver_faults(circuit, state, &mut diagnostics);
    rules::over_current(circuit, state, &mut diagnostics);
    rules::over_power(circuit, state, &mut diagnostics);
    rules::high_voltage(circuit, state, config.high_voltage_threshold, &mut diagnostics);
    rules::reverse_biased(circuit, state, &mut diagnostics);
    rules::open_circuit(state, &mut diagnostics);

    diagnostics.sort_by_key(Diagnostic::sort_key);
    tracing::debug!(count = diagnostics.len(), "safety check finished");
    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::{params, TerminalRef};
    use crate::solver::{DcSolver, SolverConfig};

    fn t(component: ComponentId, index: usize) -> TerminalRef {
        TerminalRef::new(component, index)
    }

    fn led_loop(voltage: f64, resistance: Option<f64>) -> (Circuit, ComponentId) {
        let mut c = Circuit::new();
        let v = c.add_component("battery", &params([("voltage", voltage)])).unwrap();
        let led = c.add_component("led", &params([("forward_voltage", 2.0)])).unwrap();
        match resistance {
            Some(r) => {
                let r = c.add_component("resistor", &params([("resistance", r)])).unwrap();
                c.connect(t(v, 0), t(r, 0)).unwrap();
                c.connect(t(r, 1), t(led, 0)).unwrap();
            }
            None => c.connect(t(v, 0), t(led, 0)).unwrap(),
        }
        c.connect(t(led, 1), t(v, 1)).unwrap();
        c.set_ground(t(v, 1)).unwrap();
        (c, led)
    }

    fn run(c: &Circuit) -> Vec<Diagnostic> {
        let state = c.solve().unwrap();
        check(c, &state, &SafetyConfig::default())
    }

    #[test]
    fn test_led_across_battery_is_one_critical() {
        let (c, led) = led_loop(9.0, None);
        let diagnostics = run(&c);

        let critical: Vec<_> = diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Critical)
            .collect();
        assert_eq!(critical.len(), 1);
        assert_eq!(critical[0].rule, Rule::LedWithoutResistor);
        assert!(critical[0].message.contains("without resistor"));
        assert!(critical[0].components.contains(&led));
        assert_eq!(diagnostics[0].severity, Severity::Critical);
    }

    #[test]
    fn test_worked_example_over_current_warning() {
        let (c, led) = led_loop(9.0, Some(220.0));
        let diagnostics = run(&c);

        assert!(diagnostics.iter().all(|d| d.severity != Severity::Critical));
        let warnings: Vec<_> = diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .collect();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].rule, Rule::OverCurrent);
        assert_eq!(warnings[0].components, vec![led]);
        assert!(warnings[0].message.contains("31.8mA > 20.0mA rated"));
        let condition = warnings[0].condition.as_ref().unwrap();
        assert_eq!(condition.unit, "A");
        assert_eq!(condition.limit, 0.02);
    }

    #[test]
    fn test_safe_circuit_is_quiet() {
        let (c, _) = led_loop(5.0, Some(330.0));
        assert!(run(&c).is_empty());
    }

    #[test]
    fn test_over_power_on_small_resistor() {
        let mut c = Circuit::new();
        let v = c.add_component("battery", &params([("voltage", 12.0)])).unwrap();
        let r = c.add_component("resistor", &params([("resistance", 100.0)])).unwrap();
        c.connect(t(v, 0), t(r, 0)).unwrap();
        c.connect(t(r, 1), t(v, 1)).unwrap();
        c.set_ground(t(v, 1)).unwrap();

        let diagnostics = run(&c);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].rule, Rule::OverPower);
        assert!(diagnostics[0].message.contains("1.4W > 250.0mW rated"));
    }

    #[test]
    fn test_high_voltage_threshold_is_configurable() {
        let mut c = Circuit::new();
        let v = c.add_component("battery", &params([("voltage", 60.0)])).unwrap();
        let r = c
            .add_component("resistor", &params([("resistance", 1e6), ("power_rating", 1.0)]))
            .unwrap();
        c.connect(t(v, 0), t(r, 0)).unwrap();
        c.connect(t(r, 1), t(v, 1)).unwrap();
        c.set_ground(t(v, 1)).unwrap();
        let state = c.solve().unwrap();

        let flagged = check(&c, &state, &SafetyConfig::default());
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].rule, Rule::HighVoltage);
        assert!(flagged[0].message.contains("60.0V"));

        let relaxed = SafetyConfig::default().with_high_voltage_threshold(100.0);
        assert!(check(&c, &state, &relaxed).is_empty());
    }

    #[test]
    fn test_short_surfaces_reason_verbatim() {
        let mut c = Circuit::new();
        let v = c.add_component("battery", &params([("voltage", 9.0)])).unwrap();
        let sw = c.add_component("switch", &params([])).unwrap();
        c.connect(t(v, 0), t(sw, 0)).unwrap();
        c.connect(t(sw, 1), t(v, 1)).unwrap();
        c.set_ground(t(v, 1)).unwrap();
        let state = c.solve().unwrap();

        let diagnostics = check(&c, &state, &SafetyConfig::default());
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].rule, Rule::SolverFault);
        assert_eq!(
            diagnostics[0].message,
            state.component(v).unwrap().status.fault_reason().unwrap()
        );
    }

    #[test]
    fn test_non_convergent_reason_verbatim() {
        let mut c = Circuit::new();
        let v = c.add_component("battery", &params([("voltage", 9.0)])).unwrap();
        let r = c.add_component("resistor", &params([("resistance", 220.0)])).unwrap();
        let led = c.add_component("led", &params([])).unwrap();
        c.connect(t(v, 0), t(r, 0)).unwrap();
        c.connect(t(r, 1), t(led, 1)).unwrap();
        c.connect(t(led, 0), t(v, 1)).unwrap();
        c.set_ground(t(v, 1)).unwrap();

        let capped = DcSolver::with_config(SolverConfig::default().with_max_iterations(1));
        let state = capped.solve(&c).unwrap();
        let diagnostics = check(&c, &state, &SafetyConfig::default());

        let fault = &diagnostics[0];
        assert_eq!(fault.severity, Severity::Critical);
        assert_eq!(fault.rule, Rule::SolverFault);
        assert_eq!(fault.components, vec![led]);
        assert_eq!(
            fault.message,
            state.component(led).unwrap().status.fault_reason().unwrap()
        );
        assert!(fault.message.contains("kept switching"));
    }

    #[test]
    fn test_same_severity_follows_insertion_order() {
        let mut c = Circuit::new();
        let v = c.add_component("battery", &params([("voltage", 9.0)])).unwrap();
        let r = c.add_component("resistor", &params([("resistance", 100.0)])).unwrap();
        let second = c.add_named_component("LED2", "led", &params([])).unwrap();
        let first = c.add_named_component("LED1", "led", &params([])).unwrap();
        c.connect(t(v, 0), t(r, 0)).unwrap();
        for led in [second, first] {
            c.connect(t(r, 1), t(led, 0)).unwrap();
            c.connect(t(led, 1), t(v, 1)).unwrap();
        }
        c.set_ground(t(v, 1)).unwrap();

        let diagnostics = run(&c);
        let order: Vec<_> = diagnostics.iter().map(|d| (d.rule, d.components.clone())).collect();
        // 70mA split over two LEDs; the resistor burns 0.49W
        assert_eq!(
            order,
            vec![
                (Rule::OverPower, vec![r]),
                (Rule::OverCurrent, vec![second]),
                (Rule::OverCurrent, vec![first]),
            ]
        );
        assert!(diagnostics[1].message.starts_with("LED2 draws 35.0mA"));
    }

    #[test]
    fn test_blocked_led_reports_info() {
        let (c, led) = led_loop(1.5, Some(100.0));
        let diagnostics = run(&c);

        let rules: Vec<_> = diagnostics.iter().map(|d| d.rule).collect();
        assert_eq!(rules, vec![Rule::ReverseBiased, Rule::OpenCircuit]);
        assert_eq!(diagnostics[0].components, vec![led]);
        assert!(diagnostics[1].components.is_empty());
    }

    #[test]
    fn test_rule_codes_serialize_kebab_case() {
        let json = serde_json::to_string(&Rule::LedWithoutResistor).unwrap();
        assert_eq!(json, "\"led-without-resistor\"");
        assert_eq!(Rule::OverCurrent.to_string(), "over-current");
        assert!(Severity::Critical < Severity::Info);
    }
}

//! End-to-end tests: description -> circuit -> solve -> check -> project.

use approx::assert_relative_eq;
use circuit_copilot_core::analysis::{analyze, analyze_description, AnalysisConfig};
use circuit_copilot_core::ingest::CircuitDescription;
use circuit_copilot_core::safety::{Rule, Severity};
use circuit_copilot_core::solver::SolveStatus;
use circuit_copilot_core::CircuitError;

fn build(json: &str) -> circuit_copilot_core::Circuit {
    CircuitDescription::from_json(json)
        .expect("parse failed")
        .build()
        .expect("build failed")
}

// ── Worked Example ──────────────────────────────────────────────────

const LED_WITH_RESISTOR: &str = r#"{
  "components": [
    {"id":"V1","type":"battery","value":"9V","x":0,"y":1,"orientation":"up"},
    {"id":"R1","type":"resistor","value":"220Ω","x":1,"y":0,"orientation":"right"},
    {"id":"LED1","type":"led","value":"red","x":2,"y":0,"orientation":"right"},
    {"id":"GND1","type":"ground","value":"","x":2,"y":2,"orientation":"down"}
  ],
  "connections":[
    {"from":"V1.pos","to":"R1.start"},
    {"from":"R1.end","to":"LED1.anode"},
    {"from":"LED1.cathode","to":"GND1.top"},
    {"from":"V1.neg","to":"GND1.top"}
  ],
  "title":"LED Circuit"
}"#;

#[test]
fn test_led_with_resistor_end_to_end() {
    let circuit = build(LED_WITH_RESISTOR);
    let analysis = analyze(&circuit, &AnalysisConfig::default()).expect("analysis failed");
    let p = &analysis.projection;

    let led = p.component("LED1").unwrap();
    assert_relative_eq!(led.current.unwrap(), 0.0318, epsilon = 1e-4);
    assert_relative_eq!(led.voltage_drop.unwrap(), 2.0, epsilon = 1e-3);
    assert_relative_eq!(led.power.unwrap(), 0.0636, epsilon = 1e-3);

    let r = p.component("R1").unwrap();
    assert_relative_eq!(r.power.unwrap(), 0.2227, epsilon = 1e-3);
    assert_relative_eq!(r.intensity, 1.0);

    // Energy balance: the battery delivers what the loads absorb
    let total: f64 = p.components.iter().map(|c| c.power.unwrap()).sum();
    assert!(total.abs() < 1e-9);

    assert_eq!(analysis.diagnostics.len(), 1);
    let warning = &analysis.diagnostics[0];
    assert_eq!(warning.severity, Severity::Warning);
    assert_eq!(warning.rule, Rule::OverCurrent);
    assert!(warning.message.contains("31.8mA > 20.0mA rated"));
}

#[test]
fn test_report_is_renderable_json() {
    let description = CircuitDescription::from_json(LED_WITH_RESISTOR).unwrap();
    let report = analyze_description(&description, &AnalysisConfig::default()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&report.to_json(true).unwrap()).unwrap();

    assert_eq!(json["title"], "LED Circuit");
    let components = json["projection"]["components"].as_array().unwrap();
    assert_eq!(components.len(), 3);
    assert_eq!(components[2]["name"], "LED1");
    assert_eq!(components[2]["terminals"][0]["name"], "anode");
    assert_eq!(json["bill_of_materials"][1]["value"], "220Ω");
}

// ── Safety Scenarios ────────────────────────────────────────────────

#[test]
fn test_led_straight_across_battery() {
    let circuit = build(
        r#"{
      "components": [
        {"id":"V1","type":"battery","value":"9V"},
        {"id":"LED1","type":"led","value":"red"}
      ],
      "connections": [
        {"from":"V1.pos","to":"LED1.anode"},
        {"from":"LED1.cathode","to":"V1.neg"}
      ]
    }"#,
    );
    let analysis = analyze(&circuit, &AnalysisConfig::default()).unwrap();

    let critical: Vec<_> = analysis
        .diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Critical)
        .collect();
    assert_eq!(critical.len(), 1);
    assert!(critical[0].message.contains("without resistor"));
}

#[test]
fn test_closed_switch_shorts_battery() {
    let circuit = build(
        r#"{
      "components": [
        {"id":"V1","type":"battery","value":"6V"},
        {"id":"S1","type":"switch","value":"on"},
        {"id":"R1","type":"resistor","value":"1k"}
      ],
      "nets": [
        {"nodes":["V1.pos","S1.start","R1.start"]},
        {"nodes":["V1.neg","S1.end","R1.end"]}
      ]
    }"#,
    );
    let analysis = analyze(&circuit, &AnalysisConfig::default()).unwrap();

    assert!(analysis.projection.components.iter().all(|c| c.current.is_none()));
    assert!(matches!(
        analysis.state.components()[0].status,
        SolveStatus::ShortCircuit { .. }
    ));
    assert_eq!(analysis.diagnostics[0].rule, Rule::SolverFault);
    assert!(matches!(
        analysis.state.ensure_valid(),
        Err(CircuitError::ShortCircuit { .. })
    ));
}

#[test]
fn test_open_switch_leaves_led_dark() {
    let circuit = build(
        r#"{
      "components": [
        {"id":"V1","type":"battery","value":"9V"},
        {"id":"S1","type":"switch","value":"off"},
        {"id":"R1","type":"resistor","value":"470"},
        {"id":"LED1","type":"led","value":"green"}
      ],
      "connections": [
        {"from":"V1.pos","to":"S1.start"},
        {"from":"S1.end","to":"R1.start"},
        {"from":"R1.end","to":"LED1.anode"},
        {"from":"LED1.cathode","to":"V1.neg"}
      ]
    }"#,
    );
    let analysis = analyze(&circuit, &AnalysisConfig::default()).unwrap();
    let p = &analysis.projection;

    assert!(p.open_circuit);
    // Nothing closes the loop through the LED, so it carries no current
    let led = p.component("LED1").unwrap();
    assert_eq!(led.intensity, 0.0);
    assert_eq!(led.current, Some(0.0));
    assert_relative_eq!(p.component("S1").unwrap().terminals[0].voltage.unwrap(), 9.0, epsilon = 1e-9);
    for terminal in &p.component("R1").unwrap().terminals {
        assert_relative_eq!(terminal.voltage.unwrap(), 9.0, epsilon = 1e-9);
    }
    let rules: Vec<_> = analysis.diagnostics.iter().map(|d| d.rule).collect();
    assert_eq!(rules, vec![Rule::ReverseBiased, Rule::OpenCircuit]);
    assert!(analysis.diagnostics.iter().all(|d| d.severity == Severity::Info));
}

#[test]
fn test_circuit_without_source_is_rejected() {
    let circuit = build(
        r#"{
      "components": [
        {"id":"R1","type":"resistor","value":"1k"},
        {"id":"R2","type":"resistor","value":"2k"}
      ],
      "nets": [{"nodes":["R1.start","R2.start"]}, {"nodes":["R1.end","R2.end"]}]
    }"#,
    );
    assert!(matches!(
        analyze(&circuit, &AnalysisConfig::default()),
        Err(CircuitError::Topology { .. })
    ));
}

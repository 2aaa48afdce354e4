//! Turning loose description values into catalog parameters.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::catalog::{ComponentSpec, DcModel};
use crate::circuit::Params;
use crate::error::{CircuitError, Result};
use crate::units::parse_quantity;

/// A value as written in a description: a bare number or a string such as
/// `"220Ω"`, `"4.7k"` or `"red"`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
}

impl Value {
    fn is_blank(&self) -> bool {
        matches!(self, Value::Text(s) if s.trim().is_empty())
    }
}

/// Forward voltage of an LED by colour.
pub fn led_forward_voltage(colour: &str) -> Option<f64> {
    let colour = colour.to_lowercase();
    colour
        .split(|ch: char| !ch.is_alphanumeric())
        .find_map(|word| match word {
            "red" => Some(2.0),
            "orange" | "amber" | "yellow" => Some(2.1),
            "green" => Some(2.2),
            "blue" | "white" => Some(3.2),
            _ => None,
        })
}

/// Switch state words.
fn switch_state(text: &str) -> Option<f64> {
    match text.trim().to_lowercase().as_str() {
        "on" | "closed" | "close" | "true" => Some(1.0),
        "off" | "open" | "false" => Some(0.0),
        _ => None,
    }
}

/// Combine a component's bare value and explicit params into catalog
/// parameters. Explicit params win over the bare value.
///
/// A value on a kind with no primary parameter (an IC's part number) is
/// ignored. Range checks are left to the catalog.
pub fn resolve_params(
    spec: &ComponentSpec,
    component: &str,
    value: Option<&Value>,
    explicit: &BTreeMap<String, Value>,
) -> Result<Params> {
    let mut params = Params::new();

    if let (Some(primary), Some(value)) = (spec.primary_param(), value.filter(|v| !v.is_blank())) {
        let number = match value {
            Value::Number(n) => *n,
            Value::Text(text) => {
                let parsed = match spec.model {
                    DcModel::ForwardDrop if spec.requires_current_limit => {
                        led_forward_voltage(text).or_else(|| parse_quantity(text))
                    }
                    DcModel::Switch => switch_state(text).or_else(|| parse_quantity(text)),
                    _ => parse_quantity(text),
                };
                parsed.ok_or_else(|| {
                    CircuitError::invalid_parameter(
                        component,
                        primary.name,
                        format!("cannot read '{text}' as a value"),
                    )
                })?
            }
        };
        params.insert(primary.name.to_string(), number);
    }

    for (name, value) in explicit {
        let number = match value {
            Value::Number(n) => *n,
            Value::Text(text) => parse_quantity(text).ok_or_else(|| {
                CircuitError::invalid_parameter(component, name.as_str(), format!("cannot read '{text}' as a value"))
            })?,
        };
        params.insert(name.clone(), number);
    }

    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    fn resolve(kind: &str, value: Option<Value>, explicit: &[(&str, Value)]) -> Result<Params> {
        let catalog = Catalog::builtin();
        let spec = catalog.lookup(kind)?;
        let explicit = explicit
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        resolve_params(spec, "X1", value.as_ref(), &explicit)
    }

    #[test]
    fn test_led_colours() {
        assert_eq!(led_forward_voltage("red"), Some(2.0));
        assert_eq!(led_forward_voltage("Bright Blue"), Some(3.2));
        assert_eq!(led_forward_voltage("5mm"), None);

        let p = resolve("led", Some(text("green")), &[]).unwrap();
        assert_eq!(p["forward_voltage"], 2.2);
    }

    #[test]
    fn test_value_strings_map_to_primary() {
        assert_eq!(resolve("resistor", Some(text("4.7k")), &[]).unwrap()["resistance"], 4700.0);
        assert_eq!(resolve("battery", Some(Value::Number(9.0)), &[]).unwrap()["voltage"], 9.0);
        assert_eq!(resolve("switch", Some(text("open")), &[]).unwrap()["closed"], 0.0);
        // Part numbers on kinds without a primary value are dropped
        assert!(resolve("ic", Some(text("NE555")), &[]).unwrap().is_empty());
    }

    #[test]
    fn test_explicit_params_win() {
        let p = resolve(
            "led",
            Some(text("red")),
            &[("forward_voltage", Value::Number(1.8)), ("max_current", text("30mA"))],
        )
        .unwrap();
        assert_eq!(p["forward_voltage"], 1.8);
        assert!((p["max_current"] - 0.03).abs() < 1e-12);
    }

    #[test]
    fn test_unreadable_value_is_an_error() {
        let err = resolve("resistor", Some(text("big")), &[]).unwrap_err();
        assert!(matches!(err, CircuitError::InvalidParameter { ref param, .. } if param == "resistance"));
        assert!(resolve("led", None, &[("max_current", text("lots"))]).is_err());
    }

    #[test]
    fn test_untagged_value_deserializes() {
        let v: Vec<Value> = serde_json::from_str(r#"[9, "9V"]"#).unwrap();
        assert_eq!(v, vec![Value::Number(9.0), text("9V")]);
    }
}

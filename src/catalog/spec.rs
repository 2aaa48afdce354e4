//! Component specifications: terminals, parameters and DC behaviour.

use serde::{Deserialize, Serialize};

use crate::circuit::Params;
use crate::error::{CircuitError, Result};

/// Broad role of a component kind in the circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Independent source (battery)
    Source,
    /// Linear element (resistor, capacitor, inductor, loads)
    Passive,
    /// Diode-like element with a forward-voltage model
    NonLinear,
    /// Switches and IC placeholders
    Control,
}

/// DC behaviour the solver uses for a kind.
///
/// This is the closed set of element models; every catalog entry maps to
/// exactly one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DcModel {
    /// Ideal fixed-voltage source between terminals 0 (+) and 1 (-)
    VoltageSource,
    /// Linear resistance between terminals 0 and 1
    Resistance,
    /// Three-terminal divider (potentiometer): start, wiper, end
    Divider,
    /// Near-zero resistance at DC (inductor)
    Wire,
    /// No DC current path (capacitor, placeholders)
    Open,
    /// Two-state forward-voltage element (diode, LED)
    ForwardDrop,
    /// Closed: near-zero resistance, open: no path
    Switch,
}

/// Positive direction of the reported branch current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurrentConvention {
    /// Current flowing from the first terminal to the second through the element
    FirstToSecond,
    /// Current leaving the positive terminal into the circuit
    OutOfPositive,
}

/// A named pin.
#[derive(Debug, Clone, PartialEq)]
pub struct TerminalSpec {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
}

impl TerminalSpec {
    pub const fn new(name: &'static str, aliases: &'static [&'static str]) -> Self {
        Self { name, aliases }
    }

    fn matches(&self, pin: &str) -> bool {
        self.name.eq_ignore_ascii_case(pin) || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(pin))
    }
}

/// Pin layout of a kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Terminals {
    /// Fixed named pins
    Fixed(Vec<TerminalSpec>),
    /// `pin1..pinN`, with N read from the named parameter
    Numbered { count_param: &'static str },
}

/// Bound of a parameter's valid range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    Inclusive(f64),
    Exclusive(f64),
}

/// Specification of one component parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    /// Display unit (`"Ω"`, `"V"`, `"A"`…); empty for dimensionless values
    pub unit: &'static str,
    /// Default value; `None` means the parameter is required
    pub default: Option<f64>,
    pub min: Option<Bound>,
    pub max: Option<Bound>,
    /// Must hold a whole number
    pub integer: bool,
    /// A bare value string (`"220Ω"`) maps to this parameter
    pub primary: bool,
}

impl ParamSpec {
    /// A parameter the caller must supply.
    pub const fn required(name: &'static str, unit: &'static str) -> Self {
        Self {
            name,
            unit,
            default: None,
            min: None,
            max: None,
            integer: false,
            primary: false,
        }
    }

    /// A parameter that falls back to `default`.
    pub const fn optional(name: &'static str, unit: &'static str, default: f64) -> Self {
        Self {
            name,
            unit,
            default: Some(default),
            min: None,
            max: None,
            integer: false,
            primary: false,
        }
    }

    /// Require a strictly positive value.
    pub const fn positive(mut self) -> Self {
        self.min = Some(Bound::Exclusive(0.0));
        self
    }

    /// Require a value in `[lo, hi]`.
    pub const fn range(mut self, lo: f64, hi: f64) -> Self {
        self.min = Some(Bound::Inclusive(lo));
        self.max = Some(Bound::Inclusive(hi));
        self
    }

    /// Cap the value at `hi` (inclusive).
    pub const fn at_most(mut self, hi: f64) -> Self {
        self.max = Some(Bound::Inclusive(hi));
        self
    }

    pub const fn integer(mut self) -> Self {
        self.integer = true;
        self
    }

    pub const fn primary(mut self) -> Self {
        self.primary = true;
        self
    }

    /// Check a value against this parameter's range.
    pub fn check(&self, value: f64) -> std::result::Result<(), String> {
        if !value.is_finite() {
            return Err(format!("value {value} is not a finite number"));
        }
        match self.min {
            Some(Bound::Inclusive(lo)) if value < lo => {
                return Err(format!("{value}{} is below the minimum {lo}{}", self.unit, self.unit))
            }
            Some(Bound::Exclusive(lo)) if value <= lo => {
                return Err(format!("{value}{} must be greater than {lo}{}", self.unit, self.unit))
            }
            _ => {}
        }
        match self.max {
            Some(Bound::Inclusive(hi)) if value > hi => {
                return Err(format!("{value}{} is above the maximum {hi}{}", self.unit, self.unit))
            }
            Some(Bound::Exclusive(hi)) if value >= hi => {
                return Err(format!("{value}{} must be less than {hi}{}", self.unit, self.unit))
            }
            _ => {}
        }
        if self.integer && value.fract() != 0.0 {
            return Err(format!("{value} must be a whole number"));
        }
        Ok(())
    }
}

/// Static definition of a supported component kind.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentSpec {
    /// Canonical kind name (`"resistor"`)
    pub name: &'static str,
    /// Alternative names accepted by lookup
    pub aliases: &'static [&'static str],
    /// Prefix for generated display names (`"R"` → `R1`, `R2`)
    pub prefix: &'static str,
    /// Human-readable description used by the BOM projection
    pub description: &'static str,
    pub classification: Classification,
    pub model: DcModel,
    pub terminals: Terminals,
    pub params: Vec<ParamSpec>,
    /// Parameter holding the rated maximum current, if the kind has one
    pub rated_current_param: Option<&'static str>,
    /// Parameter holding the rated maximum power, if the kind has one
    pub power_rating_param: Option<&'static str>,
    /// Full-scale current for animation intensity when no rating is declared
    pub nominal_current: f64,
    /// Burns out without a series current limit (LEDs)
    pub requires_current_limit: bool,
    pub convention: CurrentConvention,
}

impl ComponentSpec {
    pub fn is_source(&self) -> bool {
        self.classification == Classification::Source
    }

    pub fn is_non_linear(&self) -> bool {
        self.classification == Classification::NonLinear
    }

    /// Sources are exactly the voltage-source kinds and non-linear kinds
    /// exactly the forward-drop ones.
    pub fn check_classification(&self) -> Result<()> {
        let source = self.model == DcModel::VoltageSource;
        let forward = self.model == DcModel::ForwardDrop;
        if source != self.is_source() || forward != self.is_non_linear() {
            return Err(CircuitError::invalid_parameter(
                self.name,
                "classification",
                format!("{:?} does not fit the {:?} model", self.classification, self.model),
            ));
        }
        Ok(())
    }

    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    /// The parameter a bare value string maps to.
    pub fn primary_param(&self) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.primary)
    }

    /// Validate `given` against this spec and fill in defaults.
    ///
    /// Fails on unknown names, missing required parameters and out-of-range
    /// values.
    pub fn resolve_params(&self, component: &str, given: &Params) -> Result<Params> {
        if let Some(unknown) = given.keys().find(|key| self.param(key).is_none()) {
            return Err(CircuitError::invalid_parameter(
                component,
                unknown.as_str(),
                format!("'{}' does not take this parameter", self.name),
            ));
        }

        let mut resolved = Params::new();
        for spec in &self.params {
            let value = match (given.get(spec.name), spec.default) {
                (Some(&value), _) => value,
                (None, Some(default)) => default,
                (None, None) => {
                    return Err(CircuitError::invalid_parameter(
                        component,
                        spec.name,
                        "required parameter is missing",
                    ))
                }
            };
            spec.check(value)
                .map_err(|message| CircuitError::invalid_parameter(component, spec.name, message))?;
            resolved.insert(spec.name.to_string(), value);
        }
        Ok(resolved)
    }

    /// Pin names for a component built from already-resolved parameters.
    pub fn terminal_names(&self, params: &Params) -> Vec<String> {
        match &self.terminals {
            Terminals::Fixed(pins) => pins.iter().map(|pin| pin.name.to_string()).collect(),
            Terminals::Numbered { count_param } => {
                let count = params.get(*count_param).copied().unwrap_or(0.0) as usize;
                (1..=count).map(|n| format!("pin{n}")).collect()
            }
        }
    }

    /// Resolve a pin name, alias or 1-based pin number to a terminal index.
    pub fn terminal_index(&self, params: &Params, pin: &str) -> Option<usize> {
        let pin = pin.trim();
        let names = self.terminal_names(params);
        if let Ok(number) = pin.parse::<usize>() {
            return (1..=names.len()).contains(&number).then(|| number - 1);
        }
        match &self.terminals {
            Terminals::Fixed(pins) => pins.iter().position(|spec| spec.matches(pin)),
            Terminals::Numbered { .. } => names.iter().position(|name| name.eq_ignore_ascii_case(pin)),
        }
    }

    /// Rated maximum current for a component with these parameters.
    pub fn rated_current(&self, params: &Params) -> Option<f64> {
        self.rated_current_param.and_then(|name| params.get(name).copied())
    }

    /// Rated maximum power for a component with these parameters.
    pub fn power_rating(&self, params: &Params) -> Option<f64> {
        self.power_rating_param.and_then(|name| params.get(name).copied())
    }
}

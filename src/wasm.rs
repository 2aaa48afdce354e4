//! WASM bindings for Circuit Copilot Core.
//!
//! This module provides JavaScript-friendly bindings for the web frontend.
//! Descriptions go in and reports come out as JSON strings.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmAnalyzer } from 'circuit_copilot_core';
//!
//! await init();
//!
//! const analyzer = new WasmAnalyzer();
//! analyzer.set_high_voltage_threshold(24);
//!
//! const report = JSON.parse(analyzer.analyze(JSON.stringify(schema)));
//! for (const d of report.projection.diagnostics) {
//!   console.log(d.severity, d.message);
//! }
//! ```

use wasm_bindgen::prelude::*;

use crate::analysis::{analyze_description, AnalysisConfig};
use crate::catalog::Catalog;
use crate::ingest::CircuitDescription;

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

fn to_js(e: crate::error::CircuitError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Circuit analyzer holding settings between calls.
#[wasm_bindgen]
pub struct WasmAnalyzer {
    config: AnalysisConfig,
}

impl Default for WasmAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl WasmAnalyzer {
    /// Create an analyzer with the default settings.
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmAnalyzer {
        WasmAnalyzer {
            config: AnalysisConfig::default(),
        }
    }

    /// Node voltage above which a high-voltage warning is raised.
    #[wasm_bindgen]
    pub fn set_high_voltage_threshold(&mut self, volts: f64) {
        self.config.safety = self.config.safety.clone().with_high_voltage_threshold(volts);
    }

    /// Maximum diode-state iterations (default: 10).
    #[wasm_bindgen]
    pub fn set_max_iterations(&mut self, max_iterations: usize) {
        self.config.solver = self.config.solver.clone().with_max_iterations(max_iterations);
    }

    /// Solve circuits that lack a source or a ground instead of rejecting them.
    #[wasm_bindgen]
    pub fn set_allow_incomplete(&mut self, allow: bool) {
        self.config.solver = self.config.solver.clone().with_allow_incomplete(allow);
    }

    /// Analyze a JSON circuit description and return the JSON report.
    ///
    /// # Returns
    /// The report, or an error string if the description is invalid or
    /// its topology is rejected.
    #[wasm_bindgen]
    pub fn analyze(&self, description_json: &str) -> Result<String, JsValue> {
        let description = CircuitDescription::from_json(description_json).map_err(to_js)?;
        let report = analyze_description(&description, &self.config).map_err(to_js)?;
        report.to_json(false).map_err(to_js)
    }
}

/// Analyze a JSON circuit description with default settings.
#[wasm_bindgen]
pub fn analyze(description_json: &str) -> Result<String, JsValue> {
    WasmAnalyzer::new().analyze(description_json)
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Component kinds the built-in catalog understands.
#[wasm_bindgen]
pub fn supported_kinds() -> Vec<String> {
    Catalog::builtin().kinds().map(|spec| spec.name.to_string()).collect()
}

//! Independent sources.

/// An ideal battery.
///
/// Batteries take an extra row/column in the MNA matrix for their branch
/// current. The source enforces: V+ - V- = voltage
#[derive(Debug, Clone, PartialEq)]
pub struct Battery {
    pub voltage: f64,
}

impl Battery {
    /// Create a new battery.
    pub fn new(voltage: f64) -> Self {
        Self { voltage }
    }

    /// Power absorbed when `current` leaves the positive terminal.
    ///
    /// Negative while the battery is discharging.
    pub fn absorbed_power(&self, current: f64) -> f64 {
        -self.voltage * current
    }
}

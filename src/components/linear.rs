//! Linear passive components: Resistor, Potentiometer, Capacitor, Inductor.
//!
//! At DC a capacitor is an open branch and an inductor is a wire with its
//! winding resistance.

/// Smallest resistance a potentiometer segment may take, so a wiper at
/// either end does not produce an infinite conductance.
pub const MIN_SEGMENT_RESISTANCE: f64 = 1e-3;

/// A resistor (also used for resistive loads such as buzzers and motors).
#[derive(Debug, Clone, PartialEq)]
pub struct Resistor {
    pub resistance: f64,
}

impl Resistor {
    /// Create a new resistor.
    pub fn new(resistance: f64) -> Self {
        Self { resistance }
    }

    /// Get the conductance (1/R).
    pub fn conductance(&self) -> f64 {
        1.0 / self.resistance
    }
}

/// A three-terminal potentiometer: start, wiper, end.
///
/// Modeled as two resistors: start-wiper and wiper-end.
#[derive(Debug, Clone, PartialEq)]
pub struct Potentiometer {
    /// Total resistance between start and end
    pub resistance: f64,
    /// Wiper position (0.0 = at start, 1.0 = at end)
    pub position: f64,
}

impl Potentiometer {
    /// Create a new potentiometer.
    pub fn new(resistance: f64, position: f64) -> Self {
        Self {
            resistance,
            position: position.clamp(0.0, 1.0),
        }
    }

    /// Resistance between start and wiper.
    pub fn r1(&self) -> f64 {
        (self.resistance * self.position).max(MIN_SEGMENT_RESISTANCE)
    }

    /// Resistance between wiper and end.
    pub fn r2(&self) -> f64 {
        (self.resistance * (1.0 - self.position)).max(MIN_SEGMENT_RESISTANCE)
    }

    /// Conductance between start and wiper.
    pub fn g1(&self) -> f64 {
        1.0 / self.r1()
    }

    /// Conductance between wiper and end.
    pub fn g2(&self) -> f64 {
        1.0 / self.r2()
    }
}

/// A capacitor. Blocks DC.
#[derive(Debug, Clone, PartialEq)]
pub struct Capacitor {
    pub capacitance: f64,
}

/// An inductor. Passes DC through its winding resistance.
#[derive(Debug, Clone, PartialEq)]
pub struct Inductor {
    pub inductance: f64,
    pub dc_resistance: f64,
}

impl Inductor {
    pub fn conductance(&self) -> f64 {
        1.0 / self.dc_resistance
    }
}

//! Forward-voltage diode model (diodes and LEDs).
//!
//! The element has two states:
//!
//! - **conducting**: a fixed drop `Vf` in series with a small on-resistance,
//!   `I = (V - Vf) / R_on`
//! - **off**: an open branch, `I = 0`
//!
//! The solver picks the state iteratively; this type only answers what each
//! state means and whether a solved voltage is consistent with it.

/// A diode-like element.
#[derive(Debug, Clone, PartialEq)]
pub struct Diode {
    /// Forward voltage drop when conducting
    pub forward_voltage: f64,
    /// Series resistance when conducting
    pub on_resistance: f64,
}

impl Diode {
    /// Create a new diode.
    pub fn new(forward_voltage: f64, on_resistance: f64) -> Self {
        Self {
            forward_voltage,
            on_resistance,
        }
    }

    /// Conductance of the conducting branch.
    pub fn conductance(&self) -> f64 {
        1.0 / self.on_resistance
    }

    /// Norton equivalent of the conducting branch: `(G, I_eq)` such that
    /// `I = G * V - I_eq`, with `I_eq` pushed from cathode to anode.
    pub fn norton(&self) -> (f64, f64) {
        let g = self.conductance();
        (g, self.forward_voltage * g)
    }

    /// Anode-to-cathode current at voltage `v` for the given state.
    pub fn current(&self, v: f64, conducting: bool) -> f64 {
        if conducting {
            (v - self.forward_voltage) / self.on_resistance
        } else {
            0.0
        }
    }

    /// Whether a solved anode-cathode voltage agrees with the assumed state.
    ///
    /// A conducting diode must carry forward current above
    /// `current_tolerance`; zero or reverse current means it is off. An off
    /// diode must not see more than `Vf + voltage_tolerance`.
    pub fn is_consistent(&self, v: f64, conducting: bool, voltage_tolerance: f64, current_tolerance: f64) -> bool {
        if conducting {
            self.current(v, true) > current_tolerance
        } else {
            v <= self.forward_voltage + voltage_tolerance
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_conducting_current() {
        let d = Diode::new(2.0, 1e-3);
        assert_relative_eq!(d.current(2.0318, true), 31.8, epsilon = 1e-9);
        assert_eq!(d.current(5.0, false), 0.0);
    }

    #[test]
    fn test_norton_matches_branch_equation() {
        let d = Diode::new(0.7, 0.5);
        let (g, i_eq) = d.norton();
        let v = 1.2;
        assert_relative_eq!(g * v - i_eq, d.current(v, true), epsilon = 1e-12);
    }

    #[test]
    fn test_state_consistency() {
        let d = Diode::new(2.0, 1e-3);
        assert!(d.is_consistent(2.5, true, 1e-6, 1e-9));
        assert!(!d.is_consistent(1.5, true, 1e-6, 1e-9));
        assert!(d.is_consistent(1.5, false, 1e-6, 1e-9));
        assert!(!d.is_consistent(2.5, false, 1e-6, 1e-9));
    }

    #[test]
    fn test_no_forward_current_means_off() {
        let d = Diode::new(2.0, 1e-3);
        // Sitting exactly at the knee carries nothing
        assert!(!d.is_consistent(2.0, true, 1e-6, 1e-9));
        assert!(d.is_consistent(2.0, false, 1e-6, 1e-9));
        // Slightly below Vf is reverse current, even inside the voltage tolerance
        assert!(!d.is_consistent(2.0 - 5e-7, true, 1e-6, 1e-9));
    }
}

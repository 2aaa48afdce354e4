//! Control components: switches.

/// A switch component.
///
/// Modeled as:
/// - Closed: its contact resistance (zero-resistance for short detection)
/// - Open: no current path
#[derive(Debug, Clone, PartialEq)]
pub struct Switch {
    pub closed: bool,
    pub contact_resistance: f64,
}

impl Switch {
    /// Create a new switch.
    pub fn new(closed: bool, contact_resistance: f64) -> Self {
        Self {
            closed,
            contact_resistance,
        }
    }

    /// Conductance when closed, `None` when open.
    pub fn conductance(&self) -> Option<f64> {
        self.closed.then(|| 1.0 / self.contact_resistance)
    }
}

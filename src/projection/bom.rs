//! Bill of materials.

use serde::Serialize;

use crate::circuit::{Circuit, Params};
use crate::units::format_si;

/// One purchasable line: identical parts grouped together.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BomLine {
    pub kind: &'static str,
    pub description: String,
    /// Formatted primary value (`220Ω`, `9V`); empty when the kind has none
    pub value: String,
    pub params: Params,
    /// Display names of the grouped components, in circuit order
    pub references: Vec<String>,
    pub quantity: usize,
}

/// Group components by kind and parameters. Solved values play no part.
pub fn bill_of_materials(circuit: &Circuit) -> Vec<BomLine> {
    let mut lines: Vec<BomLine> = Vec::new();
    for c in circuit.components() {
        if let Some(line) = lines
            .iter_mut()
            .find(|line| line.kind == c.kind() && line.params == c.params)
        {
            line.references.push(c.name.clone());
            line.quantity += 1;
            continue;
        }

        let value = c
            .spec
            .primary_param()
            .filter(|p| !p.unit.is_empty())
            .and_then(|p| c.params.get(p.name).map(|&v| format_si(v, p.unit)))
            .unwrap_or_default();
        let description = if value.is_empty() {
            c.spec.description.to_string()
        } else {
            format!("{} {}", c.spec.description, value)
        };

        lines.push(BomLine {
            kind: c.kind(),
            description,
            value,
            params: c.params.clone(),
            references: vec![c.name.clone()],
            quantity: 1,
        });
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::params;

    #[test]
    fn test_identical_parts_are_grouped() {
        let mut c = Circuit::new();
        c.add_component("battery", &params([("voltage", 9.0)])).unwrap();
        c.add_component("resistor", &params([("resistance", 220.0)])).unwrap();
        c.add_component("resistor", &params([("resistance", 4700.0)])).unwrap();
        c.add_component("resistor", &params([("resistance", 220.0)])).unwrap();
        c.add_component("capacitor", &params([("capacitance", 100e-9)])).unwrap();

        let bom = bill_of_materials(&c);
        assert_eq!(bom.len(), 4);
        assert_eq!(bom[0].value, "9V");
        assert_eq!(bom[1].references, vec!["R1", "R3"]);
        assert_eq!(bom[1].quantity, 2);
        assert_eq!(bom[1].value, "220Ω");
        assert_eq!(bom[2].value, "4.7kΩ");
        assert_eq!(bom[3].value, "100nF");
    }

    #[test]
    fn test_differing_ratings_stay_separate() {
        let mut c = Circuit::new();
        c.add_component("resistor", &params([("resistance", 220.0)])).unwrap();
        c.add_component("resistor", &params([("resistance", 220.0), ("power_rating", 1.0)]))
            .unwrap();
        assert_eq!(bill_of_materials(&c).len(), 2);
    }
}

//! Engineering quantities: parsing value strings like `"4.7kΩ"` and
//! formatting numbers with SI prefixes.

/// Unit words and symbols that may trail a value, longest first.
const UNITS: &[&str] = &["ohms", "ohm", "Ω", "V", "A", "F", "H", "W"];

/// SI prefixes used for display, largest first.
const PREFIXES: &[(f64, &str)] = &[
    (1e9, "G"),
    (1e6, "M"),
    (1e3, "k"),
    (1.0, ""),
    (1e-3, "m"),
    (1e-6, "µ"),
    (1e-9, "n"),
    (1e-12, "p"),
];

/// Parse a value with optional SI suffix and unit.
///
/// Handles: `10k`, `100n`, `4.7u`, `1M`, `2.2`, `1e-9`, `220Ω`, `9V`,
/// `20mA`, `100 nF`, `4.7 kohm`.
pub fn parse_quantity(text: &str) -> Option<f64> {
    let text = strip_unit(text.trim()).trim_end();
    if text.is_empty() {
        return None;
    }

    let (num_str, multiplier) = if let Some(last) = text.chars().last() {
        let mult = match last {
            'p' => 1e-12,
            'n' => 1e-9,
            'u' | 'µ' | 'μ' => 1e-6,
            'm' => 1e-3,
            'k' | 'K' => 1e3,
            'M' => 1e6,
            'G' => 1e9,
            _ => 1.0,
        };
        if mult != 1.0 {
            (&text[..text.len() - last.len_utf8()], mult)
        } else {
            (text, 1.0)
        }
    } else {
        (text, 1.0)
    };

    num_str
        .trim_end()
        .parse::<f64>()
        .ok()
        .map(|v| v * multiplier)
        .filter(|v| v.is_finite())
}

/// Remove one trailing unit, matched case-insensitively.
fn strip_unit(text: &str) -> &str {
    let lower = text.to_lowercase();
    for unit in UNITS {
        if lower.ends_with(&unit.to_lowercase()) && lower.len() == text.len() {
            let rest = &text[..text.len() - unit.len()];
            // Keep at least one character for the number
            if !rest.trim().is_empty() {
                return rest;
            }
        }
    }
    text
}

/// Split a value into a mantissa and SI prefix.
fn scale(value: f64) -> (f64, &'static str) {
    if value == 0.0 || !value.is_finite() {
        return (value, "");
    }
    let magnitude = value.abs();
    for &(factor, prefix) in PREFIXES {
        if magnitude >= factor {
            return (value / factor, prefix);
        }
    }
    (value / 1e-12, "p")
}

/// Compact engineering notation for part values: `220Ω`, `4.7kΩ`, `100nF`.
pub fn format_si(value: f64, unit: &str) -> String {
    let (mantissa, prefix) = scale(value);
    let digits = format!("{:.3}", mantissa);
    let digits = digits.trim_end_matches('0').trim_end_matches('.');
    format!("{}{}{}", digits, prefix, unit)
}

/// Fixed one-decimal notation for measured values: `31.8mA`, `20.0mA`.
pub fn format_reading(value: f64, unit: &str) -> String {
    let (mantissa, prefix) = scale(value);
    format!("{:.1}{}{}", mantissa, prefix, unit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn close(text: &str, expected: f64) {
        let value = parse_quantity(text).unwrap_or_else(|| panic!("'{text}' did not parse"));
        assert_relative_eq!(value, expected, max_relative = 1e-10);
    }

    #[test]
    fn test_parse_plain_and_prefixed() {
        close("10k", 10_000.0);
        close("100n", 100e-9);
        close("4.7u", 4.7e-6);
        close("1M", 1_000_000.0);
        close("2.2", 2.2);
        close("1e-9", 1e-9);
    }

    #[test]
    fn test_parse_with_units() {
        close("220Ω", 220.0);
        close("9V", 9.0);
        close("20mA", 0.02);
        close("100 nF", 100e-9);
        close("4.7 kohm", 4700.0);
        close("1MΩ", 1e6);
        close("10 ohms", 10.0);
        close("0.25W", 0.25);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_quantity(""), None);
        assert_eq!(parse_quantity("red"), None);
        assert_eq!(parse_quantity("V"), None);
        assert_eq!(parse_quantity("k"), None);
    }

    #[test]
    fn test_format_si() {
        assert_eq!(format_si(220.0, "Ω"), "220Ω");
        assert_eq!(format_si(4700.0, "Ω"), "4.7kΩ");
        assert_eq!(format_si(100e-9, "F"), "100nF");
        assert_eq!(format_si(9.0, "V"), "9V");
        assert_eq!(format_si(0.0, "A"), "0A");
    }

    #[test]
    fn test_format_reading() {
        assert_eq!(format_reading(7.0 / 220.001, "A"), "31.8mA");
        assert_eq!(format_reading(0.02, "A"), "20.0mA");
        assert_eq!(format_reading(75.0, "V"), "75.0V");
    }
}

//! Number formatting for table cells.

/// Group thousands with `,` and keep at most three decimals.
///
/// Trailing zeros and a dangling decimal point are trimmed, so `1500.0`
/// renders as `1,500` and `0.1250` as `0.125`.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return "-".to_string();
    }

    let scaled = value * 1000.0;
    // Past ~1.8e305 the scaled value overflows; such magnitudes have no fraction.
    let rounded = if scaled.is_finite() {
        scaled.round() / 1000.0
    } else {
        value
    };
    let fixed = format!("{:.3}", rounded.abs());
    let (integer, fraction) = match fixed.split_once('.') {
        Some((integer, fraction)) => (integer, fraction.trim_end_matches('0')),
        None => (fixed.as_str(), ""),
    };

    let mut out = String::with_capacity(fixed.len() + integer.len() / 3 + 1);
    if rounded < 0.0 && (integer != "0" || !fraction.is_empty()) {
        out.push('-');
    }
    for (idx, ch) in integer.chars().enumerate() {
        if idx > 0 && (integer.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if !fraction.is_empty() {
        out.push('.');
        out.push_str(fraction);
    }
    out
}

/// Parse a value produced by [`format_number`].
pub fn parse_number(text: &str) -> Option<f64> {
    let cleaned: String = text.trim().chars().filter(|ch| *ch != ',').collect();
    cleaned.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands_and_trims_fraction() {
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(15.0), "15");
        assert_eq!(format_number(999.0), "999");
        assert_eq!(format_number(1000.0), "1,000");
        assert_eq!(format_number(1234567.5), "1,234,567.5");
        assert_eq!(format_number(0.125), "0.125");
        assert_eq!(format_number(2.10), "2.1");
    }

    #[test]
    fn rounds_to_three_decimals() {
        assert_eq!(format_number(1.23456), "1.235");
        assert_eq!(format_number(0.0004), "0");
        assert_eq!(format_number(-0.0004), "0");
        assert_eq!(format_number(-1234.5), "-1,234.5");
    }

    #[test]
    fn huge_finite_values_are_grouped() {
        let formatted = format_number(1e306);
        assert!(formatted.contains(','), "{formatted}");
        assert!(!formatted.contains('.'));
        assert_eq!(parse_number(&formatted), Some(1e306));

        let max = format_number(f64::MAX);
        assert!(max.starts_with("179,769,313"), "{max}");
        assert_eq!(parse_number(&max), Some(f64::MAX));
        assert_eq!(format_number(-f64::MAX), format!("-{max}"));
        assert_eq!(format_number(f64::INFINITY), "-");
        assert_eq!(format_number(f64::NAN), "-");
    }

    #[test]
    fn parse_reads_formatted_output() {
        for value in [0.0, 7.0, 15.25, 1000.0, 98765.432, -1500.5] {
            let parsed = parse_number(&format_number(value)).unwrap();
            assert!((parsed - value).abs() < 1e-9, "{value} -> {parsed}");
        }
        assert_eq!(parse_number("n/a"), None);
    }
}

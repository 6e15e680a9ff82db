//! Number formatting for legends and cell labels.

/// Format with thousands separators and `precision` decimals.
///
/// ```
/// use cheshire_render::output::format_thousands;
///
/// assert_eq!(format_thousands(1234567.0, 0), "1,234,567");
/// assert_eq!(format_thousands(-1234.5, 1), "-1,234.5");
/// ```
#[must_use]
pub fn format_thousands(value: f64, precision: usize) -> String {
    let formatted = format!("{:.*}", precision, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3 + 2);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let negative = value < 0.0 && formatted.chars().any(|c| c.is_ascii_digit() && c != '0');
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Human-scaled value: `1.5M`, `2.3K`, or a grouped integer below 1,000.
#[must_use]
pub fn format_human(value: f64) -> String {
    if value >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("{:.1}K", value / 1_000.0)
    } else {
        format_thousands(value, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0.0, 0), "0");
        assert_eq!(format_thousands(999.0, 0), "999");
        assert_eq!(format_thousands(1000.0, 0), "1,000");
        assert_eq!(format_thousands(1_234_567.891, 2), "1,234,567.89");
        assert_eq!(format_thousands(-0.2, 0), "0");
    }

    #[test]
    fn test_format_human() {
        assert_eq!(format_human(42.0), "42");
        assert_eq!(format_human(1_500.0), "1.5K");
        assert_eq!(format_human(2_500_000.0), "2.5M");
    }
}

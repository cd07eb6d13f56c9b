//! Number formatting for dashboard output.

/// Rendered in place of an undefined or absent value.
pub const PLACEHOLDER: &str = "—";

const MILLION: f64 = 1_000_000.0;

/// Format `value` with `decimals` places and comma thousands separators.
pub fn group_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3 + 4);
    if value.is_sign_negative() && formatted.bytes().any(|b| b != b'0' && b != b'.') {
        grouped.push('-');
    }
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(frac_part) = frac_part {
        grouped.push('.');
        grouped.push_str(frac_part);
    }
    grouped
}

fn defined(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// A value already in millions, e.g. `1,234.56 mn`.
pub fn fmt_mn(value: Option<f64>) -> String {
    defined(value).map_or_else(
        || PLACEHOLDER.to_string(),
        |v| format!("{} mn", group_thousands(v, 2)),
    )
}

/// A currency amount: whole units below one million, millions above.
pub fn fmt_cur(value: Option<f64>) -> String {
    match defined(value) {
        None => PLACEHOLDER.to_string(),
        Some(v) if v.abs() < MILLION => group_thousands(v, 0),
        Some(v) => fmt_mn(Some(v / MILLION)),
    }
}

/// A count with thousands separators.
pub fn fmt_count(value: usize) -> String {
    group_thousands(value as f64, 0)
}

/// A signed delta in whole units, e.g. `+1,250` or `-300`.
pub fn fmt_delta(value: Option<f64>) -> String {
    match defined(value) {
        None => PLACEHOLDER.to_string(),
        Some(v) if v > 0.0 => format!("+{}", group_thousands(v, 0)),
        Some(v) => group_thousands(v, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, 2, "0.00")]
    #[case(999.0, 0, "999")]
    #[case(1234.5678, 2, "1,234.57")]
    #[case(1_000_000.0, 0, "1,000,000")]
    #[case(-12_345.4, 0, "-12,345")]
    #[case(-0.001, 2, "0.00")]
    fn test_group_thousands(#[case] value: f64, #[case] decimals: usize, #[case] expected: &str) {
        assert_eq!(group_thousands(value, decimals), expected);
    }

    #[rstest]
    #[case(Some(1234.56), "1,234.56 mn")]
    #[case(Some(0.0), "0.00 mn")]
    #[case(None, "—")]
    #[case(Some(f64::NAN), "—")]
    fn test_fmt_mn(#[case] value: Option<f64>, #[case] expected: &str) {
        assert_eq!(fmt_mn(value), expected);
    }

    #[rstest]
    #[case(Some(12_345.0), "12,345")]
    #[case(Some(-999_999.0), "-999,999")]
    #[case(Some(1_230_000.0), "1.23 mn")]
    #[case(Some(-2_500_000.0), "-2.50 mn")]
    #[case(None, "—")]
    fn test_fmt_cur(#[case] value: Option<f64>, #[case] expected: &str) {
        assert_eq!(fmt_cur(value), expected);
    }

    #[test]
    fn test_fmt_delta_and_count() {
        assert_eq!(fmt_delta(Some(1250.0)), "+1,250");
        assert_eq!(fmt_delta(Some(-300.0)), "-300");
        assert_eq!(fmt_delta(None), PLACEHOLDER);
        assert_eq!(fmt_count(1200), "1,200");
    }
}

//! Number formatting shared by factor renderings and result cards.

/// Signed percentage with two decimals, e.g. `+2.50%` / `-1.20%`
pub fn signed_pct(value: f64) -> String {
    format!("{value:+.2}%")
}

/// Whole-dollar amount with thousands separators, e.g. `$97,500`
pub fn usd(value: f64) -> String {
    format!("${}", group_thousands(value.round()))
}

/// Dollar amount scaled to billions, e.g. `$25.00B`
pub fn usd_billions(value: f64) -> String {
    format!("${:.2}B", value / 1e9)
}

/// Dollar amount scaled to trillions, e.g. `$3.41T`
pub fn usd_trillions(value: f64) -> String {
    format!("${:.2}T", value / 1e12)
}

/// Round to two decimals the way displayed values are stored
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[allow(clippy::cast_possible_truncation)]
fn group_thousands(value: f64) -> String {
    let negative = value < 0.0;
    let digits = format!("{}", value.abs() as i128);
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if negative { format!("-{out}") } else { out }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_pct() {
        assert_eq!(signed_pct(2.5), "+2.50%");
        assert_eq!(signed_pct(-1.234), "-1.23%");
    }

    #[test]
    fn test_usd_grouping() {
        assert_eq!(usd(97_500.4), "$97,500");
        assert_eq!(usd(950.0), "$950");
        assert_eq!(usd(1_234_567.0), "$1,234,567");
    }

    #[test]
    fn test_compact_units() {
        assert_eq!(usd_billions(25_000_000_000.0), "$25.00B");
        assert_eq!(usd_trillions(3_410_000_000_000.0), "$3.41T");
    }

    #[test]
    fn test_round2() {
        assert!((round2(1.23456) - 1.23).abs() < 1e-9);
    }
}

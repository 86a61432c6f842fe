//! Decimal-string arithmetic
//!
//! Prices and amounts travel as strings. Whenever a value has to be derived
//! (remaining size, cost, balance totals) the operands are parsed into
//! `rust_decimal::Decimal`, combined, and rendered back to text. Any missing
//! or unparsable operand yields `None`.

use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse plain or scientific decimal text
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    let text = text.trim();
    Decimal::from_str(text)
        .ok()
        .or_else(|| Decimal::from_scientific(text).ok())
}

fn render(value: Decimal) -> String {
    value.normalize().to_string()
}

fn binary(
    a: Option<&str>,
    b: Option<&str>,
    op: impl Fn(Decimal, Decimal) -> Option<Decimal>,
) -> Option<String> {
    let a = parse_decimal(a?)?;
    let b = parse_decimal(b?)?;
    op(a, b).map(render)
}

pub fn string_add(a: Option<&str>, b: Option<&str>) -> Option<String> {
    binary(a, b, |a, b| a.checked_add(b))
}

pub fn string_sub(a: Option<&str>, b: Option<&str>) -> Option<String> {
    binary(a, b, |a, b| a.checked_sub(b))
}

pub fn string_mul(a: Option<&str>, b: Option<&str>) -> Option<String> {
    binary(a, b, |a, b| a.checked_mul(b))
}

pub fn string_div(a: Option<&str>, b: Option<&str>) -> Option<String> {
    binary(a, b, |a, b| a.checked_div(b))
}

pub fn string_eq(a: &str, b: &str) -> bool {
    matches!((parse_decimal(a), parse_decimal(b)), (Some(x), Some(y)) if x == y)
}

pub fn string_gt(a: &str, b: &str) -> bool {
    matches!((parse_decimal(a), parse_decimal(b)), (Some(x), Some(y)) if x > y)
}

/// `None` for numerically zero text (vendors use 0 for "not set")
pub fn omit_zero(text: Option<String>) -> Option<String> {
    text.filter(|t| parse_decimal(t).map(|d| !d.is_zero()).unwrap_or(true))
}

/// Tick size for a number of decimal places: `"3"` gives `"0.001"`
pub fn parse_precision(digits: Option<&str>) -> Option<String> {
    let places: u32 = digits?.trim().parse().ok()?;
    if places > 28 {
        return None;
    }
    Some(render(Decimal::new(1, places)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_add_sub() {
        assert_eq!(string_add(Some("7.72"), Some("22.27")).as_deref(), Some("29.99"));
        assert_eq!(string_sub(Some("1.00"), Some("0.25")).as_deref(), Some("0.75"));
        assert_eq!(string_sub(Some("1"), None), None);
    }

    #[test]
    fn test_mul_div() {
        assert_eq!(string_mul(Some("16.5"), Some("2")).as_deref(), Some("33"));
        assert_eq!(string_div(Some("1"), Some("4")).as_deref(), Some("0.25"));
        assert_eq!(string_div(Some("1"), Some("0")), None);
    }

    #[test]
    fn test_scientific_input() {
        assert_eq!(parse_decimal("1e-8"), Some(Decimal::new(1, 8)));
    }

    #[test]
    fn test_parse_precision() {
        assert_eq!(parse_precision(Some("3")).as_deref(), Some("0.001"));
        assert_eq!(parse_precision(Some("0")).as_deref(), Some("1"));
        assert_eq!(parse_precision(None), None);
    }

    #[test]
    fn test_omit_zero() {
        assert_eq!(omit_zero(Some("0.0".into())), None);
        assert_eq!(omit_zero(Some("5".into())).as_deref(), Some("5"));
        assert_eq!(omit_zero(None), None);
    }

    proptest! {
        #[test]
        fn prop_add_then_sub_is_identity(a in 0i64..1_000_000_000, b in 0i64..1_000_000_000, scale in 0u32..8) {
            let a = Decimal::new(a, scale).to_string();
            let b = Decimal::new(b, scale).to_string();
            let sum = string_add(Some(&a), Some(&b)).unwrap();
            let back = string_sub(Some(&sum), Some(&b)).unwrap();
            prop_assert!(string_eq(&back, &a));
        }
    }
}

//! Option-returning accessors over vendor JSON
//!
//! Vendor payloads are loosely typed: a price may arrive as a JSON number or
//! a string, a flag as a bool or "true". Every accessor returns `None` for a
//! missing key, JSON `null` or an empty string; callers decide the default.

use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::str::FromStr;

/// Open per-call parameter bag forwarded to the venue.
pub type Params = Map<String, Value>;

/// Text form of a scalar value. Numbers keep their exact source text.
pub fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn value_to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| Decimal::from_str(&n.to_string()).ok().and_then(|d| trunc_i64(d))),
        Value::String(s) => s
            .parse::<i64>()
            .ok()
            .or_else(|| Decimal::from_str(s).ok().and_then(trunc_i64)),
        _ => None,
    }
}

fn trunc_i64(d: Decimal) -> Option<i64> {
    i64::try_from(d.trunc()).ok()
}

/// Non-null value under `key`
pub fn safe_value<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value.get(key).filter(|v| !v.is_null())
}

pub fn safe_string(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(value_to_string)
}

/// First present key wins
pub fn safe_string_n(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| safe_string(value, key))
}

pub fn safe_string_lower(value: &Value, key: &str) -> Option<String> {
    safe_string(value, key).map(|s| s.to_lowercase())
}

pub fn safe_string_upper(value: &Value, key: &str) -> Option<String> {
    safe_string(value, key).map(|s| s.to_uppercase())
}

/// Element `index` of a JSON array as text
pub fn safe_string_at(value: &Value, index: usize) -> Option<String> {
    value.get(index).and_then(value_to_string)
}

pub fn safe_integer(value: &Value, key: &str) -> Option<i64> {
    value.get(key).and_then(value_to_i64)
}

pub fn safe_integer_n(value: &Value, keys: &[&str]) -> Option<i64> {
    keys.iter().find_map(|key| safe_integer(value, key))
}

pub fn safe_integer_at(value: &Value, index: usize) -> Option<i64> {
    value.get(index).and_then(value_to_i64)
}

/// Seconds-valued field (possibly fractional) converted to milliseconds
pub fn safe_timestamp(value: &Value, key: &str) -> Option<i64> {
    let text = safe_string(value, key)?;
    let seconds = Decimal::from_str(&text).ok()?;
    trunc_i64(seconds * Decimal::from(1000))
}

/// Microsecond-valued field converted to milliseconds
pub fn safe_timestamp_micros(value: &Value, key: &str) -> Option<i64> {
    safe_integer(value, key).map(|us| us / 1000)
}

pub fn safe_bool(value: &Value, key: &str) -> Option<bool> {
    match value.get(key)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

pub fn safe_list<'a>(value: &'a Value, key: &str) -> Option<&'a Vec<Value>> {
    value.get(key).and_then(Value::as_array)
}

pub fn safe_dict<'a>(value: &'a Value, key: &str) -> Option<&'a Map<String, Value>> {
    value.get(key).and_then(Value::as_object)
}

// =============================================================================
// Params helpers
// =============================================================================

pub fn param_string(params: &Params, key: &str) -> Option<String> {
    params.get(key).and_then(value_to_string)
}

pub fn param_string_n(params: &Params, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| param_string(params, key))
}

pub fn param_integer(params: &Params, key: &str) -> Option<i64> {
    params.get(key).and_then(value_to_i64)
}

pub fn param_bool(params: &Params, key: &str) -> Option<bool> {
    match params.get(key)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Copy of `params` without `keys`
pub fn omit(params: &Params, keys: &[&str]) -> Params {
    params
        .iter()
        .filter(|(k, _)| !keys.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// `base` overlaid with `overrides` (overrides win)
pub fn extend(base: Params, overrides: &Params) -> Params {
    let mut merged = base;
    for (k, v) in overrides {
        merged.insert(k.clone(), v.clone());
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numbers_keep_source_text() {
        let v: Value = serde_json::from_str(r#"{"a":30.0,"b":7.72,"c":"0.00012"}"#).unwrap();
        assert_eq!(safe_string(&v, "a").as_deref(), Some("30.0"));
        assert_eq!(safe_string(&v, "b").as_deref(), Some("7.72"));
        assert_eq!(safe_string(&v, "c").as_deref(), Some("0.00012"));
    }

    #[test]
    fn test_missing_null_and_empty_are_none() {
        let v = json!({"a": null, "b": ""});
        assert_eq!(safe_string(&v, "a"), None);
        assert_eq!(safe_string(&v, "b"), None);
        assert_eq!(safe_string(&v, "zzz"), None);
        assert_eq!(safe_integer(&v, "zzz"), None);
        assert!(safe_value(&v, "a").is_none());
    }

    #[test]
    fn test_integer_from_string_and_float() {
        let v = json!({"a": "1744018168213", "b": 12.9, "c": "abc"});
        assert_eq!(safe_integer(&v, "a"), Some(1_744_018_168_213));
        assert_eq!(safe_integer(&v, "b"), Some(12));
        assert_eq!(safe_integer(&v, "c"), None);
    }

    #[test]
    fn test_timestamps() {
        let v = json!({"s": 1700000000, "us": "1677844033163585"});
        assert_eq!(safe_timestamp(&v, "s"), Some(1_700_000_000_000));
        assert_eq!(safe_timestamp_micros(&v, "us"), Some(1_677_844_033_163));
    }

    #[test]
    fn test_string_n_takes_first_present() {
        let v = json!({"b": "2", "c": "3"});
        assert_eq!(safe_string_n(&v, &["a", "b", "c"]).as_deref(), Some("2"));
    }

    #[test]
    fn test_bool_accepts_text() {
        let v = json!({"a": true, "b": "false", "c": 1});
        assert_eq!(safe_bool(&v, "a"), Some(true));
        assert_eq!(safe_bool(&v, "b"), Some(false));
        assert_eq!(safe_bool(&v, "c"), None);
    }

    #[test]
    fn test_omit_and_extend() {
        let mut p = Params::new();
        p.insert("a".into(), json!(1));
        p.insert("b".into(), json!(2));
        let omitted = omit(&p, &["a"]);
        assert!(omitted.get("a").is_none());
        let mut o = Params::new();
        o.insert("b".into(), json!(3));
        let merged = extend(p, &o);
        assert_eq!(merged.get("b"), Some(&json!(3)));
    }
}

//! Type inference for raw query values.

use std::sync::LazyLock;

use regex::Regex;

use crate::record::Value;

/// Integer-like value.
pub static INT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^[0-9-]$|^[0-9-][0-9]*$)").expect("valid int pattern"));

/// Float-like value: digits, a dot, optional fraction.
pub static FLOAT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(^[0-9-]+\.$|^[0-9-]+\.[0-9]*$)").expect("valid float pattern")
});

/// Whether `raw` looks like an integer or a float.
pub fn is_numeric(raw: &str) -> bool {
    INT_PATTERN.is_match(raw) || FLOAT_PATTERN.is_match(raw)
}

/// Infer the value a raw string stands for.
///
/// Tries integer, then float, then a comma-separated list of trimmed
/// strings. Anything else stays a string; that fallback is not an error.
pub fn convert_type(raw: &str) -> Value {
    if INT_PATTERN.is_match(raw)
        && let Ok(i) = raw.parse::<i64>()
    {
        return Value::Int(i);
    }
    if FLOAT_PATTERN.is_match(raw)
        && let Ok(f) = raw.parse::<f64>()
    {
        return Value::Float(f);
    }
    if raw.contains(',') {
        return Value::List(raw.split(',').map(|s| Value::from(s.trim())).collect());
    }
    Value::from(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_int() {
        assert_eq!(convert_type("123"), Value::Int(123));
        assert_eq!(convert_type("-7"), Value::Int(-7));
        assert_eq!(convert_type("0"), Value::Int(0));
    }

    #[test]
    fn test_convert_float() {
        assert_eq!(convert_type("1.5"), Value::Float(1.5));
        assert_eq!(convert_type("3."), Value::Float(3.0));
    }

    #[test]
    fn test_convert_list() {
        assert_eq!(convert_type("a, b ,c"), Value::from(vec!["a", "b", "c"]));
    }

    #[test]
    fn test_convert_fallbacks() {
        assert_eq!(convert_type("alice"), Value::from("alice"));
        // Matches the integer shape but is not a number.
        assert_eq!(convert_type("-"), Value::from("-"));
        assert_eq!(convert_type("1-2"), Value::from("1-2"));
        assert_eq!(convert_type("1e5"), Value::from("1e5"));
    }

    #[test]
    fn test_is_numeric() {
        assert!(is_numeric("123"));
        assert!(is_numeric("12.5"));
        assert!(!is_numeric("12a"));
        assert!(!is_numeric(".5"));
    }
}
